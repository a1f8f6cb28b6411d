//! Client side of the external nutrition REST API.
//!
//! [`RestApi`] is the seam: handlers and list managers only ever see
//! `Arc<dyn RestApi>`, the production implementation is [`http::HttpApi`].

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::{PortalError, PortalResult};

#[cfg(test)]
pub mod fake;
pub mod http;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiBody {
    Empty,
    Json(Value),
    /// Text fields sent as `multipart/form-data`.
    Form(Vec<(String, String)>),
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub token: Option<String>,
    pub body: ApiBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            token: None,
            body: ApiBody::Empty,
        }
    }

    pub fn bearer(mut self, token: Option<&str>) -> Self {
        self.token = token.map(str::to_string);
        self
    }

    pub fn json<B: Serialize>(mut self, body: &B) -> PortalResult<Self> {
        let value = serde_json::to_value(body).map_err(|e| PortalError::Decode(e.to_string()))?;
        self.body = ApiBody::Json(value);
        Ok(self)
    }

    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = ApiBody::Form(fields);
        self
    }
}

#[async_trait]
pub trait RestApi: Send + Sync {
    /// Sends one request. Non-2xx answers come back as [`PortalError::Upstream`],
    /// an empty success body as `Value::Null`.
    async fn send(&self, request: ApiRequest) -> PortalResult<Value>;
}

pub async fn get_json<T: DeserializeOwned>(
    api: &dyn RestApi,
    path: &str,
    token: Option<&str>,
) -> PortalResult<T> {
    let value = api
        .send(ApiRequest::new(Method::Get, path).bearer(token))
        .await?;
    decode(value)
}

pub async fn send_json<B: Serialize>(
    api: &dyn RestApi,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: &B,
) -> PortalResult<Value> {
    api.send(ApiRequest::new(method, path).bearer(token).json(body)?)
        .await
}

pub async fn delete(api: &dyn RestApi, path: &str, token: Option<&str>) -> PortalResult<()> {
    api.send(ApiRequest::new(Method::Delete, path).bearer(token))
        .await?;
    Ok(())
}

/// Decodes a payload that may or may not be wrapped in `{"data": ...}`.
pub fn decode<T: DeserializeOwned>(value: Value) -> PortalResult<T> {
    if let Value::Object(map) = &value {
        if let Some(inner) = map.get("data") {
            if let Ok(decoded) = serde_json::from_value::<T>(inner.clone()) {
                return Ok(decoded);
            }
        }
    }
    serde_json::from_value(value).map_err(|e| PortalError::Decode(e.to_string()))
}

/// Pulls a human readable message out of an error body.
pub fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => ["message", "title", "error", "detail"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_string),
        Ok(Value::String(s)) => Some(s),
        Ok(_) => None,
        // plain-text bodies are used as-is unless they look like an html error page
        Err(_) if !trimmed.starts_with('<') && trimmed.len() <= 300 => Some(trimmed.to_string()),
        Err(_) => None,
    }
}
