use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use serde_json::Value;

use super::{ApiBody, ApiRequest, Method, RestApi};
use crate::error::{PortalError, PortalResult};

#[derive(Debug, Clone)]
pub enum Reply {
    Ok(Value),
    Fail { status: u16, message: String },
    Down,
    /// Never answers.
    Hang,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub token: Option<String>,
    pub body: ApiBody,
}

/// Scripted in-memory upstream. Replies are sticky until replaced.
#[derive(Default)]
pub struct FakeApi {
    replies: Mutex<HashMap<(Method, String), Reply>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, method: Method, path: &str, reply: Reply) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .insert((method, path.to_string()), reply);
        self
    }

    pub fn ok(&self, method: Method, path: &str, body: Value) -> &Self {
        self.on(method, path, Reply::Ok(body))
    }

    pub fn fail(&self, method: Method, path: &str, status: u16, message: &str) -> &Self {
        self.on(
            method,
            path,
            Reply::Fail {
                status,
                message: message.to_string(),
            },
        )
    }

    pub fn down(&self, method: Method, path: &str) -> &Self {
        self.on(method, path, Reply::Down)
    }

    pub fn hang(&self, method: Method, path: &str) -> &Self {
        self.on(method, path, Reply::Hang)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .count()
    }

    pub fn last_body(&self, method: Method, path: &str) -> Option<ApiBody> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|c| c.method == method && c.path == path)
            .map(|c| c.body.clone())
    }
}

#[async_trait]
impl RestApi for FakeApi {
    async fn send(&self, request: ApiRequest) -> PortalResult<Value> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: request.method,
            path: request.path.clone(),
            token: request.token.clone(),
            body: request.body.clone(),
        });
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(&(request.method, request.path.clone()))
            .cloned();
        match reply {
            Some(Reply::Ok(value)) => Ok(value),
            Some(Reply::Fail { status, message }) => Err(PortalError::Upstream { status, message }),
            Some(Reply::Down) => Err(PortalError::Network("connection refused".into())),
            Some(Reply::Hang) => std::future::pending().await,
            None => Err(PortalError::Upstream {
                status: 404,
                message: format!("no route for {}", request.path),
            }),
        }
    }
}
