//! # StackExchange 适配器

use async_trait::async_trait;

use super::oauth::{OAuthCodeExchanger, ProviderEndpoints};
use super::traits::ProviderAdapter;
use crate::binding::{AccountId, Provider, ProviderClaim};
use crate::config::OAuthClientConfig;
use crate::error::Result;

pub const ENDPOINTS: ProviderEndpoints = ProviderEndpoints {
    authorize_url: "https://stackoverflow.com/oauth",
    token_url: "https://stackoverflow.com/oauth/access_token/json",
    api_base_url: "https://api.stackexchange.com",
    scopes: &[],
};

/// 查询用户信息的站点
const SITE: &str = "stackoverflow";

#[derive(Debug, Clone)]
pub struct StackExchangeAdapter {
    exchanger: OAuthCodeExchanger,
    api_key: String,
}

impl StackExchangeAdapter {
    pub fn new(config: &OAuthClientConfig, http_client: reqwest::Client) -> Result<Self> {
        Ok(Self {
            exchanger: OAuthCodeExchanger::new(
                Provider::StackExchange,
                config,
                &ENDPOINTS,
                http_client,
            )?,
            api_key: config.api_key.clone().unwrap_or_default(),
        })
    }
}

#[async_trait]
impl ProviderAdapter for StackExchangeAdapter {
    fn provider(&self) -> Provider {
        Provider::StackExchange
    }

    fn authorize_url(&self, state: &str) -> Result<String> {
        self.exchanger.authorize_url(state)
    }

    async fn resolve(&self, code: &str) -> Result<ProviderClaim> {
        let token = self.exchanger.exchange_code(code).await?;
        let body = self
            .exchanger
            .get_json(
                "/2.3/me",
                &[
                    ("site", SITE),
                    ("key", self.api_key.as_str()),
                    ("access_token", token.as_str()),
                ],
                None,
            )
            .await?;

        if let Some(message) = body["error_message"].as_str() {
            return Err(self.exchanger.failure(message.to_string()));
        }

        let user = &body["items"][0];
        // account_id 为 JSON 数字，统一转为十进制字符串
        let account_id = AccountId::from_json(&user["account_id"])
            .ok_or_else(|| self.exchanger.failure("用户信息缺少 account_id"))?;
        let display_name = user["display_name"].as_str().map(str::to_string);

        Ok(ProviderClaim::new(
            Provider::StackExchange,
            account_id,
            display_name,
        ))
    }
}
