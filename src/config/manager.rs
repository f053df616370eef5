//! # 配置管理器
//!
//! 加载 TOML 配置文件并应用 `GATEWAY_` 前缀的环境变量覆盖

use std::collections::BTreeMap;
use std::env;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::AppConfig;
use crate::error::{GatewayError, Result};

/// 环境变量前缀
pub const ENV_PREFIX: &str = "GATEWAY_";

/// 配置管理器
pub struct ConfigManager {
    /// 当前配置
    config: Arc<AppConfig>,
    /// 已应用的环境变量覆盖（配置路径）
    applied_overrides: Vec<String>,
}

impl ConfigManager {
    /// 创建配置管理器
    pub fn new() -> Result<Self> {
        // 优先使用环境变量指定的配置文件路径
        let config_file = if let Ok(path) = env::var("GATEWAY_CONFIG_PATH") {
            path
        } else {
            let env = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
            format!("config/config.{env}.toml")
        };

        Self::from_file(&config_file)
    }

    /// 从指定文件创建配置管理器，使用进程环境变量覆盖
    pub fn from_file(config_path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file_with_env(config_path, env::vars())
    }

    /// 从指定文件创建配置管理器，使用给定的环境变量集合覆盖
    pub fn from_file_with_env<I>(config_path: impl AsRef<Path>, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config_path = config_path.as_ref();
        let config = Self::load_config_file(config_path)?;
        Self::from_config_with_env(config, vars)
    }

    /// 从已解析的配置创建管理器
    pub fn from_config_with_env<I>(mut config: AppConfig, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let overrides = Self::build_env_overrides(vars);
        let applied_overrides = Self::apply_env_overrides(&mut config, &overrides)?;

        config.validate()?;

        info!(
            overrides = applied_overrides.len(),
            providers = config.providers.configured().len(),
            "配置管理器初始化完成"
        );

        Ok(Self {
            config: Arc::new(config),
            applied_overrides,
        })
    }

    /// 获取当前配置
    #[must_use]
    pub fn get_config(&self) -> Arc<AppConfig> {
        Arc::clone(&self.config)
    }

    /// 已应用的覆盖路径
    #[must_use]
    pub fn applied_overrides(&self) -> &[String] {
        &self.applied_overrides
    }

    /// 加载配置文件
    fn load_config_file(path: &Path) -> Result<AppConfig> {
        if !path.exists() {
            return Err(GatewayError::config(format!(
                "配置文件不存在: {}",
                path.display()
            )));
        }

        let config_content = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::config_with_source(format!("读取配置文件失败: {}", path.display()), e)
        })?;

        toml::from_str(&config_content).map_err(|e| {
            GatewayError::config_with_source(
                format!("TOML解析失败 - 配置文件: {}, 详细错误: {e}", path.display()),
                e,
            )
        })
    }

    /// 构建环境变量覆盖映射
    ///
    /// 例如: `GATEWAY_AUTH_JWT_SECRET` -> `auth_jwt_secret`
    fn build_env_overrides<I>(vars: I) -> BTreeMap<String, String>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let overrides: BTreeMap<String, String> = vars
            .into_iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(ENV_PREFIX)
                    .filter(|rest| *rest != "CONFIG_PATH")
                    .map(|rest| (rest.to_lowercase(), value))
            })
            .collect();

        debug!("发现 {} 个环境变量覆盖", overrides.len());
        overrides
    }

    /// 应用环境变量覆盖
    fn apply_env_overrides(
        config: &mut AppConfig,
        overrides: &BTreeMap<String, String>,
    ) -> Result<Vec<String>> {
        let mut applied = Vec::new();
        for (path, value) in overrides {
            let sensitive =
                path.contains("secret") || path.contains("key") || path.contains("password");
            debug!(
                "应用环境变量覆盖: {} = {}",
                path,
                if sensitive { "***" } else { value }
            );

            if Self::apply_override_to_config(config, path, value)? {
                applied.push(path.clone());
            }
        }
        Ok(applied)
    }

    /// 将环境变量覆盖应用到配置对象，返回是否识别该路径
    fn apply_override_to_config(config: &mut AppConfig, path: &str, value: &str) -> Result<bool> {
        let parts: Vec<&str> = path.split('_').collect();

        match parts.as_slice() {
            ["server", "bind", "address"] => config.server.bind_address = value.to_string(),
            ["server", "port"] => config.server.port = parse_value(path, value)?,
            ["server", "cors", "origins"] => {
                config.server.cors_origins = value
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            ["database", "url"] => config.database.url = value.to_string(),
            ["database", "max", "connections"] => {
                config.database.max_connections = parse_value(path, value)?;
            }
            ["database", "connect", "timeout"] => {
                config.database.connect_timeout = parse_value(path, value)?;
            }
            ["auth", "jwt", "secret"] => config.auth.jwt_secret = value.to_string(),
            ["auth", "address", "claim"] => config.auth.address_claim = value.to_string(),
            ["auth", "leeway"] => config.auth.leeway = parse_value(path, value)?,
            ["binding", "allow", "overwrite"] => {
                config.binding.allow_overwrite = parse_value(path, value)?;
            }
            ["providers", "gmail", "cohort", field @ ..] => {
                return Self::apply_client_override(config, "gmail_cohort", field, value);
            }
            ["providers", provider, field @ ..] => {
                return Self::apply_client_override(config, provider, field, value);
            }
            ["redirect", "pass", "url"] => config.redirect.pass_url = value.to_string(),
            ["redirect", "transformer", "url"] => {
                config.redirect.transformer_url = value.to_string();
            }
            ["upstream", "cohort", "token", "url"] => {
                config.upstream.cohort_token_url = Some(value.to_string());
            }
            ["upstream", "third", "party", "login", "url"] => {
                config.upstream.third_party_login_url = Some(value.to_string());
            }
            ["upstream", "request", "timeout"] => {
                config.upstream.request_timeout = parse_value(path, value)?;
            }
            _ => {
                warn!("未知的配置路径，忽略环境变量覆盖: {}", path);
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn apply_client_override(
        config: &mut AppConfig,
        provider: &str,
        field: &[&str],
        value: &str,
    ) -> Result<bool> {
        let Some(client) = config.providers.entry_mut(provider) else {
            warn!("未知的平台，忽略环境变量覆盖: {}", provider);
            return Ok(false);
        };

        match field.join("_").as_str() {
            "client_id" => client.client_id = value.to_string(),
            "client_secret" => client.client_secret = value.to_string(),
            "redirect_uri" => client.redirect_uri = value.to_string(),
            "authorize_url" => client.authorize_url = Some(value.to_string()),
            "token_url" => client.token_url = Some(value.to_string()),
            "api_base_url" => client.api_base_url = Some(value.to_string()),
            "api_key" => client.api_key = Some(value.to_string()),
            "scopes" => {
                client.scopes = Some(value.split_whitespace().map(str::to_string).collect());
            }
            other => {
                warn!("未知的平台配置字段，忽略环境变量覆盖: {provider}.{other}");
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn parse_value<T>(path: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse().map_err(|e| {
        GatewayError::config_with_source(format!("无效的配置值: {path} = {value}"), e)
    })
}
