//! # Discord 适配器

use async_trait::async_trait;

use super::oauth::{OAuthCodeExchanger, ProviderEndpoints};
use super::traits::ProviderAdapter;
use crate::binding::{AccountId, Provider, ProviderClaim};
use crate::config::OAuthClientConfig;
use crate::error::Result;

pub const ENDPOINTS: ProviderEndpoints = ProviderEndpoints {
    authorize_url: "https://discord.com/api/oauth2/authorize",
    token_url: "https://discord.com/api/oauth2/token",
    api_base_url: "https://discord.com/api",
    scopes: &["identify"],
};

#[derive(Debug, Clone)]
pub struct DiscordAdapter {
    exchanger: OAuthCodeExchanger,
}

impl DiscordAdapter {
    pub fn new(config: &OAuthClientConfig, http_client: reqwest::Client) -> Result<Self> {
        Ok(Self {
            exchanger: OAuthCodeExchanger::new(Provider::Discord, config, &ENDPOINTS, http_client)?,
        })
    }
}

#[async_trait]
impl ProviderAdapter for DiscordAdapter {
    fn provider(&self) -> Provider {
        Provider::Discord
    }

    fn authorize_url(&self, state: &str) -> Result<String> {
        self.exchanger.authorize_url(state)
    }

    async fn resolve(&self, code: &str) -> Result<ProviderClaim> {
        let token = self.exchanger.exchange_code(code).await?;
        let user = self.exchanger.get_json("/users/@me", &[], Some(&token)).await?;

        // snowflake 可能以字符串或数字返回
        let id = AccountId::from_json(&user["id"])
            .ok_or_else(|| self.exchanger.failure("用户信息缺少 id"))?;
        let username = user["username"].as_str().map(str::to_string);

        Ok(ProviderClaim::new(Provider::Discord, id, username))
    }
}
