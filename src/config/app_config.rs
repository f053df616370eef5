//! # 应用配置结构定义

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;

use crate::error::{GatewayError, Result};

/// 应用主配置结构
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP 服务配置
    #[serde(default)]
    pub server: ServerConfig,
    /// 数据库配置
    #[serde(default)]
    pub database: super::DatabaseConfig,
    /// 本地身份凭证配置
    #[serde(default)]
    pub auth: AuthConfig,
    /// 绑定策略
    #[serde(default)]
    pub binding: BindingConfig,
    /// 第三方平台 OAuth 客户端
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// 回调跳转配置
    #[serde(default)]
    pub redirect: RedirectConfig,
    /// 上游业务服务
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

/// HTTP 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    pub bind_address: String,
    /// 监听端口
    pub port: u16,
    /// 允许跨域的来源，空列表表示允许任意来源
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// 解析监听地址
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .map_err(|e| {
                GatewayError::config_with_source(
                    format!("无效的监听地址: {}:{}", self.bind_address, self.port),
                    e,
                )
            })
    }
}

/// 本地身份凭证（JWT）配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC 签名密钥
    pub jwt_secret: String,
    /// 携带本地身份的声明名
    #[serde(default = "default_address_claim")]
    pub address_claim: String,
    /// 过期校验的时钟容差（秒）
    #[serde(default)]
    pub leeway: u64,
}

fn default_address_claim() -> String {
    "address".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            address_claim: default_address_claim(),
            leeway: 0,
        }
    }
}

/// 绑定策略配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingConfig {
    /// 同一身份再次绑定同平台的其他账号时是否覆盖
    pub allow_overwrite: bool,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            allow_overwrite: true,
        }
    }
}

/// 单个 OAuth 客户端配置
///
/// 端点留空时使用各平台的公开默认端点。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OAuthClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    #[serde(default)]
    pub authorize_url: Option<String>,
    #[serde(default)]
    pub token_url: Option<String>,
    #[serde(default)]
    pub api_base_url: Option<String>,
    /// 覆盖默认 scope
    #[serde(default)]
    pub scopes: Option<Vec<String>>,
    /// 授权 URL 附加参数
    #[serde(default)]
    pub extra_params: BTreeMap<String, String>,
    /// StackExchange API key
    #[serde(default)]
    pub api_key: Option<String>,
}

/// 各平台客户端配置，未配置的平台不可用
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub github: Option<OAuthClientConfig>,
    #[serde(default)]
    pub discord: Option<OAuthClientConfig>,
    #[serde(default)]
    pub gmail: Option<OAuthClientConfig>,
    /// cohort 流程专用的 gmail 客户端
    #[serde(default)]
    pub gmail_cohort: Option<OAuthClientConfig>,
    #[serde(default)]
    pub stackexchange: Option<OAuthClientConfig>,
}

/// 回调跳转配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectConfig {
    /// 默认透传跳转地址
    pub pass_url: String,
    /// 带 `source` 的 GitHub 回调转发地址
    pub transformer_url: String,
    /// state 中的 variant 名到 cohort 名的映射
    #[serde(default = "default_variants")]
    pub variants: BTreeMap<String, String>,
}

fn default_variants() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("knexus".to_string(), "normal".to_string()),
        ("knexus_early".to_string(), "early".to_string()),
    ])
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            pass_url: "https://topscore.social/pass".to_string(),
            transformer_url: "https://transformer.knn3.xyz".to_string(),
            variants: default_variants(),
        }
    }
}

/// 上游业务服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// cohort 流程换取访问令牌的地址
    #[serde(default)]
    pub cohort_token_url: Option<String>,
    /// 第三方登录地址
    #[serde(default)]
    pub third_party_login_url: Option<String>,
    /// 请求超时（秒）
    pub request_timeout: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            cohort_token_url: None,
            third_party_login_url: None,
            request_timeout: 15,
        }
    }
}

impl AppConfig {
    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(GatewayError::config("服务端口不能为0"));
        }
        self.server.socket_addr()?;

        if self.database.url.is_empty() {
            return Err(GatewayError::config("数据库URL不能为空"));
        }
        if self.database.max_connections == 0 {
            return Err(GatewayError::config("数据库最大连接数必须大于0"));
        }

        if self.auth.jwt_secret.is_empty() {
            return Err(GatewayError::config("auth.jwt_secret 不能为空"));
        }
        if self.auth.address_claim.is_empty() {
            return Err(GatewayError::config("auth.address_claim 不能为空"));
        }

        for (name, client) in self.providers.configured() {
            if client.client_id.is_empty() {
                return Err(GatewayError::config(format!(
                    "providers.{name}.client_id 不能为空"
                )));
            }
            url::Url::parse(&client.redirect_uri).map_err(|e| {
                GatewayError::config_with_source(
                    format!("providers.{name}.redirect_uri 无效: {}", client.redirect_uri),
                    e,
                )
            })?;
        }

        url::Url::parse(&self.redirect.pass_url)?;
        url::Url::parse(&self.redirect.transformer_url)?;

        if self.upstream.request_timeout == 0 {
            return Err(GatewayError::config("upstream.request_timeout 必须大于0"));
        }

        Ok(())
    }
}

impl ProvidersConfig {
    /// 已配置的客户端（按配置键名）
    #[must_use]
    pub fn configured(&self) -> Vec<(&'static str, &OAuthClientConfig)> {
        [
            ("github", self.github.as_ref()),
            ("discord", self.discord.as_ref()),
            ("gmail", self.gmail.as_ref()),
            ("gmail_cohort", self.gmail_cohort.as_ref()),
            ("stackexchange", self.stackexchange.as_ref()),
        ]
        .into_iter()
        .filter_map(|(name, client)| client.map(|c| (name, c)))
        .collect()
    }

    /// 按配置键名获取可变引用，不存在时创建空配置
    pub(crate) fn entry_mut(&mut self, name: &str) -> Option<&mut OAuthClientConfig> {
        let slot = match name {
            "github" => &mut self.github,
            "discord" => &mut self.discord,
            "gmail" => &mut self.gmail,
            "gmail_cohort" => &mut self.gmail_cohort,
            "stackexchange" => &mut self.stackexchange,
            _ => return None,
        };
        Some(slot.get_or_insert_with(OAuthClientConfig::default))
    }
}
