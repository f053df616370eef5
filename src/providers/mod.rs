//! # 第三方平台适配器模块
//!
//! 每个平台一个适配器，统一为 `resolve(code) -> ProviderClaim`

pub mod discord;
pub mod github;
pub mod gmail;
pub mod oauth;
pub mod stackexchange;
pub mod traits;

pub use discord::DiscordAdapter;
pub use github::GithubAdapter;
pub use gmail::GmailAdapter;
pub use oauth::{OAuthCodeExchanger, ProviderEndpoints};
pub use stackexchange::StackExchangeAdapter;
pub use traits::ProviderAdapter;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::binding::Provider;
use crate::config::ProvidersConfig;
use crate::error::{GatewayError, Result};

/// 已配置的平台适配器
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    adapters: BTreeMap<Provider, Arc<dyn ProviderAdapter>>,
    cohort_gmail: Option<Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    /// 按配置构建，未配置的平台不注册
    pub fn from_config(config: &ProvidersConfig, http_client: &reqwest::Client) -> Result<Self> {
        let mut registry = Self::default();

        if let Some(github) = &config.github {
            registry = registry.with_adapter(Arc::new(GithubAdapter::new(github, http_client.clone())?));
        }
        if let Some(discord) = &config.discord {
            registry =
                registry.with_adapter(Arc::new(DiscordAdapter::new(discord, http_client.clone())?));
        }
        if let Some(gmail) = &config.gmail {
            registry = registry.with_adapter(Arc::new(GmailAdapter::new(gmail, http_client.clone())?));
        }
        if let Some(stackexchange) = &config.stackexchange {
            registry = registry.with_adapter(Arc::new(StackExchangeAdapter::new(
                stackexchange,
                http_client.clone(),
            )?));
        }
        if let Some(cohort) = &config.gmail_cohort {
            registry =
                registry.with_cohort_gmail(Arc::new(GmailAdapter::new(cohort, http_client.clone())?));
        }

        Ok(registry)
    }

    /// 注册适配器，同平台后注册者覆盖先注册者
    #[must_use]
    pub fn with_adapter(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.adapters.insert(adapter.provider(), adapter);
        self
    }

    /// 注册 cohort 流程使用的 gmail 适配器
    #[must_use]
    pub fn with_cohort_gmail(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.cohort_gmail = Some(adapter);
        self
    }

    /// 获取平台适配器
    pub fn get(&self, provider: Provider) -> Result<Arc<dyn ProviderAdapter>> {
        self.adapters.get(&provider).cloned().ok_or_else(|| {
            GatewayError::validation_field(format!("平台未配置: {provider}"), "type")
        })
    }

    /// cohort 流程的 gmail 适配器
    pub fn cohort_gmail(&self) -> Result<Arc<dyn ProviderAdapter>> {
        self.cohort_gmail
            .clone()
            .ok_or_else(|| GatewayError::config("providers.gmail_cohort 未配置"))
    }

    /// 已注册的平台
    #[must_use]
    pub fn providers(&self) -> Vec<Provider> {
        self.adapters.keys().copied().collect()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.providers())
            .field("cohort_gmail", &self.cohort_gmail.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OAuthClientConfig;

    fn client(redirect: &str) -> OAuthClientConfig {
        OAuthClientConfig {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: redirect.to_string(),
            ..OAuthClientConfig::default()
        }
    }

    #[test]
    fn test_registry_from_config() {
        let config = ProvidersConfig {
            github: Some(client("https://gw.example.com/oauth/github")),
            gmail_cohort: Some(client("https://gw.example.com/oauth/gmail")),
            ..ProvidersConfig::default()
        };
        let registry = ProviderRegistry::from_config(&config, &reqwest::Client::new()).unwrap();

        assert_eq!(registry.providers(), vec![Provider::Github]);
        assert!(registry.get(Provider::Github).is_ok());
        assert!(registry.cohort_gmail().is_ok());

        let err = registry.get(Provider::Discord).err().unwrap();
        assert!(matches!(err, GatewayError::Validation { .. }));
    }

    #[test]
    fn test_default_github_authorize_url() {
        let config = ProvidersConfig {
            github: Some(client("https://gw.example.com/oauth/github")),
            ..ProvidersConfig::default()
        };
        let registry = ProviderRegistry::from_config(&config, &reqwest::Client::new()).unwrap();
        let url = registry
            .get(Provider::Github)
            .unwrap()
            .authorize_url("abc")
            .unwrap();

        assert!(url.starts_with("https://github.com/login/oauth/authorize?"));
        assert!(url.contains("state=abc"));
    }
}
