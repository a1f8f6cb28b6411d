//! Where upstream bearer tokens live between requests.

use std::{collections::HashMap, path::PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

/// Fixed key the token is stored under.
pub const TOKEN_KEY: &str = "authToken";

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self, session: Uuid) -> anyhow::Result<Option<String>>;
    /// Stores `token` for `session` until `expires_at` (unix seconds).
    async fn save(&self, session: Uuid, token: &str, expires_at: i64) -> anyhow::Result<()>;
    async fn clear(&self, session: Uuid) -> anyhow::Result<()>;
    /// Drops every entry expired at `now`, returning the sessions removed.
    async fn sweep(&self, now: i64) -> anyhow::Result<Vec<Uuid>>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSession {
    #[serde(rename = "authToken")]
    auth_token: String,
    #[serde(rename = "expiresAt")]
    expires_at: i64,
}

fn drain_expired(entries: &mut HashMap<Uuid, StoredSession>, now: i64) -> Vec<Uuid> {
    let expired: Vec<Uuid> = entries
        .iter()
        .filter(|(_, s)| s.expires_at <= now)
        .map(|(id, _)| *id)
        .collect();
    for id in &expired {
        entries.remove(id);
    }
    expired
}

#[derive(Default)]
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<Uuid, StoredSession>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self, session: Uuid) -> anyhow::Result<Option<String>> {
        Ok(self
            .entries
            .read()
            .await
            .get(&session)
            .map(|s| s.auth_token.clone()))
    }

    async fn save(&self, session: Uuid, token: &str, expires_at: i64) -> anyhow::Result<()> {
        self.entries.write().await.insert(
            session,
            StoredSession {
                auth_token: token.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn clear(&self, session: Uuid) -> anyhow::Result<()> {
        self.entries.write().await.remove(&session);
        Ok(())
    }

    async fn sweep(&self, now: i64) -> anyhow::Result<Vec<Uuid>> {
        Ok(drain_expired(&mut *self.entries.write().await, now))
    }
}

/// JSON file store: `{ "<session>": { "authToken": "...", "expiresAt": 0 } }`.
pub struct FileTokenStore {
    path: PathBuf,
    entries: Mutex<HashMap<Uuid, StoredSession>>,
}

impl FileTokenStore {
    pub async fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) if !bytes.is_empty() => serde_json::from_slice(&bytes)
                .with_context(|| format!("parse token store {}", path.display()))?,
            Ok(_) => HashMap::new(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("read token store {}", path.display()))
            }
        };
        debug!(path = %path.display(), "token store opened");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    async fn persist(&self, entries: &HashMap<Uuid, StoredSession>) -> anyhow::Result<()> {
        let bytes = serde_json::to_vec_pretty(entries).context("encode token store")?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .with_context(|| format!("write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replace {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self, session: Uuid) -> anyhow::Result<Option<String>> {
        Ok(self
            .entries
            .lock()
            .await
            .get(&session)
            .map(|s| s.auth_token.clone()))
    }

    async fn save(&self, session: Uuid, token: &str, expires_at: i64) -> anyhow::Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(
            session,
            StoredSession {
                auth_token: token.to_string(),
                expires_at,
            },
        );
        self.persist(&entries).await
    }

    async fn clear(&self, session: Uuid) -> anyhow::Result<()> {
        let mut entries = self.entries.lock().await;
        if entries.remove(&session).is_some() {
            self.persist(&entries).await?;
        }
        Ok(())
    }

    async fn sweep(&self, now: i64) -> anyhow::Result<Vec<Uuid>> {
        let mut entries = self.entries.lock().await;
        let expired = drain_expired(&mut entries, now);
        if !expired.is_empty() {
            self.persist(&entries).await?;
        }
        Ok(expired)
    }
}
