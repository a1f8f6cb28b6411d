use serde::Serialize;
use time::{Duration, OffsetDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

/// Transient toast shown after an action; dropped from views once expired.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl Notification {
    pub fn success(message: impl Into<String>, ttl: Duration) -> Self {
        Self::new(NotificationKind::Success, message.into(), ttl)
    }

    pub fn error(message: impl Into<String>, ttl: Duration) -> Self {
        Self::new(NotificationKind::Error, message.into(), ttl)
    }

    fn new(kind: NotificationKind, message: String, ttl: Duration) -> Self {
        Self {
            kind,
            message,
            expires_at: OffsetDateTime::now_utc() + ttl,
        }
    }

    pub fn is_active(&self, now: OffsetDateTime) -> bool {
        now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_after_ttl() {
        let n = Notification::success("Saved", Duration::seconds(3));
        let now = OffsetDateTime::now_utc();
        assert!(n.is_active(now));
        assert!(!n.is_active(now + Duration::seconds(4)));
    }

    #[test]
    fn serializes_kind_in_lowercase() {
        let n = Notification::error("Nope", Duration::seconds(1));
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["kind"], "error");
        assert_eq!(json["message"], "Nope");
        assert!(json["expiresAt"].is_string());
    }
}
