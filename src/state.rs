use crate::api::{http::HttpApi, RestApi};
use crate::auth::tokens::{FileTokenStore, MemoryTokenStore, TokenStore};
use crate::config::AppConfig;
use crate::listing::Workspaces;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub api: Arc<dyn RestApi>,
    pub tokens: Arc<dyn TokenStore>,
    pub workspaces: Arc<Workspaces>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let api = Arc::new(HttpApi::new(
            &config.api_base_url,
            Duration::from_secs(config.api_timeout_secs),
        )?) as Arc<dyn RestApi>;

        let tokens = match &config.token_store_path {
            Some(path) => Arc::new(FileTokenStore::open(path).await?) as Arc<dyn TokenStore>,
            None => Arc::new(MemoryTokenStore::new()) as Arc<dyn TokenStore>,
        };

        Ok(Self::from_parts(config, api, tokens))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        api: Arc<dyn RestApi>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        let workspaces = Arc::new(Workspaces::new(
            config.page_size,
            time::Duration::seconds(config.notification_ttl_secs),
        ));
        Self {
            config,
            api,
            tokens,
            workspaces,
        }
    }

    #[cfg(test)]
    pub fn fake(api: Arc<crate::api::fake::FakeApi>) -> Self {
        let config = Arc::new(AppConfig {
            api_base_url: "http://upstream.test".into(),
            api_timeout_secs: 5,
            jwt: crate::config::JwtConfig {
                secret: "test".into(),
                issuer: "test".into(),
                audience: "test".into(),
                ttl_minutes: 5,
            },
            token_store_path: None,
            page_size: 6,
            notification_ttl_secs: 3,
            session_sweep_secs: 300,
        });
        Self::from_parts(config, api, Arc::new(MemoryTokenStore::new()))
    }
}
