//! # GitHub 适配器

use async_trait::async_trait;

use super::oauth::{OAuthCodeExchanger, ProviderEndpoints};
use super::traits::ProviderAdapter;
use crate::binding::{AccountId, Provider, ProviderClaim};
use crate::config::OAuthClientConfig;
use crate::error::Result;

pub const ENDPOINTS: ProviderEndpoints = ProviderEndpoints {
    authorize_url: "https://github.com/login/oauth/authorize",
    token_url: "https://github.com/login/oauth/access_token",
    api_base_url: "https://api.github.com",
    scopes: &["read:user", "user:email"],
};

/// GitHub 账号以 `login` 作为平台账号标识
#[derive(Debug, Clone)]
pub struct GithubAdapter {
    exchanger: OAuthCodeExchanger,
}

impl GithubAdapter {
    pub fn new(config: &OAuthClientConfig, http_client: reqwest::Client) -> Result<Self> {
        Ok(Self {
            exchanger: OAuthCodeExchanger::new(Provider::Github, config, &ENDPOINTS, http_client)?,
        })
    }
}

#[async_trait]
impl ProviderAdapter for GithubAdapter {
    fn provider(&self) -> Provider {
        Provider::Github
    }

    fn authorize_url(&self, state: &str) -> Result<String> {
        self.exchanger.authorize_url(state)
    }

    async fn resolve(&self, code: &str) -> Result<ProviderClaim> {
        let token = self.exchanger.exchange_code(code).await?;
        let user = self.exchanger.get_json("/user", &[], Some(&token)).await?;

        let login = AccountId::from_json(&user["login"])
            .ok_or_else(|| self.exchanger.failure("用户信息缺少 login"))?;
        let name = user["name"].as_str().map(str::to_string);

        Ok(ProviderClaim::new(Provider::Github, login, name))
    }
}
