//! # OAuth 授权码交换
//!
//! 各平台共用的授权 URL 构造、授权码换取访问令牌与用户信息请求

use oauth2::basic::BasicClient;
use oauth2::{AuthUrl, ClientId, CsrfToken, RedirectUrl, Scope};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::binding::Provider;
use crate::config::OAuthClientConfig;
use crate::error::{GatewayError, Result};

/// 平台默认端点
#[derive(Debug, Clone, Copy)]
pub struct ProviderEndpoints {
    pub authorize_url: &'static str,
    pub token_url: &'static str,
    pub api_base_url: &'static str,
    pub scopes: &'static [&'static str],
}

/// 令牌端点的原始响应
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    // StackExchange 不返回 token_type
    #[allow(dead_code)]
    token_type: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// 授权码交换客户端
#[derive(Debug, Clone)]
pub struct OAuthCodeExchanger {
    provider: Provider,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    authorize_url: String,
    token_url: String,
    api_base_url: String,
    scopes: Vec<String>,
    extra_params: BTreeMap<String, String>,
    http_client: reqwest::Client,
}

impl OAuthCodeExchanger {
    /// 合并配置与平台默认端点
    pub fn new(
        provider: Provider,
        config: &OAuthClientConfig,
        defaults: &ProviderEndpoints,
        http_client: reqwest::Client,
    ) -> Result<Self> {
        let pick = |value: &Option<String>, default: &str| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
                .trim_end_matches('/')
                .to_string()
        };

        let exchanger = Self {
            provider,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            authorize_url: pick(&config.authorize_url, defaults.authorize_url),
            token_url: pick(&config.token_url, defaults.token_url),
            api_base_url: pick(&config.api_base_url, defaults.api_base_url),
            scopes: config.scopes.clone().unwrap_or_else(|| {
                defaults.scopes.iter().map(|s| (*s).to_string()).collect()
            }),
            extra_params: config.extra_params.clone(),
            http_client,
        };

        // 提前校验，避免首个请求才暴露配置错误
        url::Url::parse(&exchanger.token_url)?;
        url::Url::parse(&exchanger.api_base_url)?;
        exchanger.authorize_url("probe")?;

        Ok(exchanger)
    }

    #[must_use]
    pub const fn provider(&self) -> Provider {
        self.provider
    }

    /// 构建授权 URL，`state` 原样放入查询参数
    pub fn authorize_url(&self, state: &str) -> Result<String> {
        let auth_url = AuthUrl::new(self.authorize_url.clone()).map_err(|e| {
            GatewayError::config_with_source(format!("无效的授权URL: {}", self.authorize_url), e)
        })?;
        let redirect_url = RedirectUrl::new(self.redirect_uri.clone()).map_err(|e| {
            GatewayError::config_with_source(format!("无效的重定向URI: {}", self.redirect_uri), e)
        })?;

        let client = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_auth_uri(auth_url)
            .set_redirect_uri(redirect_url);

        let state = state.to_string();
        let mut request = client.authorize_url(move || CsrfToken::new(state));
        for scope in &self.scopes {
            request = request.add_scope(Scope::new(scope.clone()));
        }
        for (key, value) in &self.extra_params {
            request = request.add_extra_param(key.as_str(), value.as_str());
        }

        let (url, _csrf) = request.url();
        Ok(url.to_string())
    }

    /// 授权码换取访问令牌
    pub async fn exchange_code(&self, code: &str) -> Result<String> {
        let form = [
            ("grant_type", "authorization_code"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| self.failure_with_source("令牌请求发送失败", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.failure_with_source("读取令牌响应失败", e))?;

        let parsed = serde_json::from_str::<TokenResponse>(&body).ok();

        if let Some(error) = parsed.as_ref().and_then(|r| r.error.as_deref()) {
            let description = parsed
                .as_ref()
                .and_then(|r| r.error_description.as_deref())
                .unwrap_or_default();
            return Err(self.failure(format!("{error}: {description}")));
        }

        if !status.is_success() {
            return Err(self.failure(format!("令牌端点返回 HTTP {status}")));
        }

        parsed
            .and_then(|r| r.access_token)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| self.failure("令牌响应缺少 access_token"))
    }

    /// 请求平台 API，返回 JSON
    pub async fn get_json(
        &self,
        path: &str,
        query: &[(&str, &str)],
        bearer: Option<&str>,
    ) -> Result<Value> {
        let mut request = self
            .http_client
            .get(format!("{}{}", self.api_base_url, path))
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.failure_with_source("用户信息请求发送失败", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.failure(format!("用户信息接口返回 HTTP {status}")));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| self.failure_with_source("用户信息解析失败", e))
    }

    /// 交换失败错误
    pub fn failure(&self, message: impl Into<String>) -> GatewayError {
        GatewayError::exchange(self.provider.as_str(), message)
    }

    fn failure_with_source(
        &self,
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> GatewayError {
        GatewayError::exchange_with_source(self.provider.as_str(), message, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINTS: ProviderEndpoints = ProviderEndpoints {
        authorize_url: "https://auth.example.com/authorize",
        token_url: "https://auth.example.com/token",
        api_base_url: "https://api.example.com/",
        scopes: &["identify", "email"],
    };

    fn client_config() -> OAuthClientConfig {
        OAuthClientConfig {
            client_id: "client-1".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "https://gateway.example.com/oauth/discord".to_string(),
            ..OAuthClientConfig::default()
        }
    }

    #[test]
    fn test_authorize_url_contains_state_and_scopes() {
        let exchanger = OAuthCodeExchanger::new(
            Provider::Discord,
            &client_config(),
            &ENDPOINTS,
            reqwest::Client::new(),
        )
        .unwrap();

        let url = url::Url::parse(&exchanger.authorize_url("knexus%24success").unwrap()).unwrap();
        let pairs: BTreeMap<String, String> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("auth.example.com"));
        assert_eq!(pairs["client_id"], "client-1");
        assert_eq!(pairs["response_type"], "code");
        assert_eq!(pairs["state"], "knexus%24success");
        assert_eq!(pairs["scope"], "identify email");
        assert_eq!(
            pairs["redirect_uri"],
            "https://gateway.example.com/oauth/discord"
        );
    }

    #[test]
    fn test_overrides_and_extra_params() {
        let mut config = client_config();
        config.authorize_url = Some("https://custom.example.com/oauth".to_string());
        config.scopes = Some(vec!["read".to_string()]);
        config
            .extra_params
            .insert("access_type".to_string(), "offline".to_string());

        let exchanger =
            OAuthCodeExchanger::new(Provider::Gmail, &config, &ENDPOINTS, reqwest::Client::new())
                .unwrap();
        let url = exchanger.authorize_url("s").unwrap();

        assert!(url.starts_with("https://custom.example.com/oauth?"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("scope=read"));
    }

    #[test]
    fn test_invalid_redirect_uri_rejected() {
        let mut config = client_config();
        config.redirect_uri = "not a url".to_string();
        let err =
            OAuthCodeExchanger::new(Provider::Github, &config, &ENDPOINTS, reqwest::Client::new())
                .err()
                .unwrap();
        assert!(matches!(err, GatewayError::Config { .. }));
    }
}
