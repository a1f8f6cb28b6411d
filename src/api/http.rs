use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{multipart::Form, Client};
use serde_json::Value;
use tracing::{debug, error, warn};

use super::{extract_message, ApiBody, ApiRequest, Method, RestApi};
use crate::error::{PortalError, PortalResult};

#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl RestApi for HttpApi {
    async fn send(&self, request: ApiRequest) -> PortalResult<Value> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.client.request(to_reqwest(request.method), &url);
        if let Some(token) = &request.token {
            builder = builder.bearer_auth(token);
        }
        builder = match request.body {
            ApiBody::Empty => builder,
            ApiBody::Json(body) => builder.json(&body),
            ApiBody::Form(fields) => {
                let form = fields
                    .into_iter()
                    .fold(Form::new(), |form, (name, value)| form.text(name, value));
                builder.multipart(form)
            }
        };

        let response = builder.send().await.map_err(|e| {
            error!(error = %e, method = ?request.method, path = %request.path, "upstream unreachable");
            PortalError::Network(e.to_string())
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PortalError::Network(e.to_string()))?;
        debug!(method = ?request.method, path = %request.path, %status, "upstream response");

        if !status.is_success() {
            warn!(method = ?request.method, path = %request.path, %status, "upstream rejected request");
            return Err(PortalError::Upstream {
                status: status.as_u16(),
                message: extract_message(&text).unwrap_or_default(),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        // some endpoints answer with a bare string (e.g. a token)
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}
