//! # Gmail 适配器
//!
//! 普通绑定与 cohort 流程使用不同的 OAuth 客户端，解析逻辑相同。

use async_trait::async_trait;

use super::oauth::{OAuthCodeExchanger, ProviderEndpoints};
use super::traits::ProviderAdapter;
use crate::binding::{AccountId, Provider, ProviderClaim};
use crate::config::OAuthClientConfig;
use crate::error::Result;

pub const ENDPOINTS: ProviderEndpoints = ProviderEndpoints {
    authorize_url: "https://accounts.google.com/o/oauth2/auth",
    token_url: "https://oauth2.googleapis.com/token",
    api_base_url: "https://gmail.googleapis.com",
    scopes: &["https://www.googleapis.com/auth/gmail.readonly"],
};

#[derive(Debug, Clone)]
pub struct GmailAdapter {
    exchanger: OAuthCodeExchanger,
}

impl GmailAdapter {
    pub fn new(config: &OAuthClientConfig, http_client: reqwest::Client) -> Result<Self> {
        Ok(Self {
            exchanger: OAuthCodeExchanger::new(Provider::Gmail, config, &ENDPOINTS, http_client)?,
        })
    }
}

#[async_trait]
impl ProviderAdapter for GmailAdapter {
    fn provider(&self) -> Provider {
        Provider::Gmail
    }

    fn authorize_url(&self, state: &str) -> Result<String> {
        self.exchanger.authorize_url(state)
    }

    async fn resolve(&self, code: &str) -> Result<ProviderClaim> {
        let token = self.exchanger.exchange_code(code).await?;
        let profile = self
            .exchanger
            .get_json("/gmail/v1/users/me/profile", &[], Some(&token))
            .await?;

        let email = AccountId::from_json(&profile["emailAddress"])
            .ok_or_else(|| self.exchanger.failure("用户信息缺少 emailAddress"))?;

        Ok(ProviderClaim::new(Provider::Gmail, email, None))
    }
}
