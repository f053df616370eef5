//! # 错误类型定义

use axum::http::StatusCode;
use thiserror::Error;

use super::ErrorCategory;

/// 网关主要错误类型
///
/// 绑定冲突不在此列：冲突是 `BindOutcome::Conflict`，属于正常的业务结果。
#[derive(Debug, Error)]
pub enum GatewayError {
    /// 输入缺失或格式错误（空授权码、不支持的平台、无法解析的 state）
    #[error("参数错误: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// 本地身份凭证无效
    #[error("认证错误: {message}")]
    Authentication {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 第三方平台授权码交换或用户信息获取失败
    #[error("第三方平台 {provider} 交换失败: {message}")]
    Exchange {
        message: String,
        provider: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 上游业务服务调用失败
    #[error("上游服务错误: {message}")]
    Upstream {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 资源不存在
    #[error("资源未找到: {resource_type} {identifier}")]
    NotFound {
        resource_type: String,
        identifier: String,
    },

    /// 数据库相关错误
    #[error("数据库错误: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 配置相关错误
    #[error("配置错误: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 网络通信错误
    #[error("网络错误: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 序列化/反序列化错误
    #[error("序列化错误: {message}")]
    Serialization {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    /// IO相关错误
    #[error("IO错误: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// 系统内部错误
    #[error("内部错误: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 附带上下文的错误
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<GatewayError>,
    },
}

impl GatewayError {
    /// 将错误转换为HTTP状态码和错误代码
    #[must_use]
    pub fn to_http_response_parts(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::Authentication { .. } => (StatusCode::UNAUTHORIZED, "AUTH_ERROR"),
            Self::Exchange { .. } => (StatusCode::BAD_REQUEST, "EXCHANGE_FAILED"),
            Self::Upstream { .. } | Self::Network { .. } => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR")
            }
            Self::NotFound { .. } => (StatusCode::NOT_FOUND, "RESOURCE_NOT_FOUND"),
            Self::Database { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            Self::Config { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            Self::Serialization { .. } | Self::Io { .. } | Self::Internal { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
            Self::Context { source, .. } => source.to_http_response_parts(),
        }
    }

    /// 错误归类
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } | Self::NotFound { .. } => ErrorCategory::Validation,
            Self::Authentication { .. } => ErrorCategory::Auth,
            Self::Exchange { .. } => ErrorCategory::Exchange,
            Self::Upstream { .. } | Self::Network { .. } => ErrorCategory::Upstream,
            Self::Database { .. }
            | Self::Config { .. }
            | Self::Serialization { .. }
            | Self::Io { .. }
            | Self::Internal { .. } => ErrorCategory::Internal,
            Self::Context { source, .. } => source.category(),
        }
    }

    /// 调用方错误记 `warn`，其余记 `error`
    pub fn log(&self) {
        let (status, code) = self.to_http_response_parts();
        if self.category().is_caller_fault() {
            tracing::warn!(status = status.as_u16(), code, error = %self, "请求处理失败");
        } else {
            tracing::error!(status = status.as_u16(), code, error = ?self, "请求处理失败");
        }
    }

    /// 创建参数错误
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// 创建带字段名的参数错误
    pub fn validation_field<T: Into<String>, F: Into<String>>(message: T, field: F) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// 创建认证错误
    pub fn authentication<T: Into<String>>(message: T) -> Self {
        Self::Authentication {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的认证错误
    pub fn authentication_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Authentication {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建第三方交换错误
    pub fn exchange<T: Into<String>, P: Into<String>>(provider: P, message: T) -> Self {
        Self::Exchange {
            message: message.into(),
            provider: provider.into(),
            source: None,
        }
    }

    /// 创建带来源的第三方交换错误
    pub fn exchange_with_source<T: Into<String>, P: Into<String>, E: Into<anyhow::Error>>(
        provider: P,
        message: T,
        source: E,
    ) -> Self {
        Self::Exchange {
            message: message.into(),
            provider: provider.into(),
            source: Some(source.into()),
        }
    }

    /// 创建上游服务错误
    pub fn upstream<T: Into<String>>(message: T) -> Self {
        Self::Upstream {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的上游服务错误
    pub fn upstream_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Upstream {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建资源未找到错误
    pub fn not_found<T: Into<String>, I: Into<String>>(resource_type: T, identifier: I) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            identifier: identifier.into(),
        }
    }

    /// 创建数据库错误
    pub fn database<T: Into<String>>(message: T) -> Self {
        Self::Database {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的数据库错误
    pub fn database_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Database {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建配置错误
    pub fn config<T: Into<String>>(message: T) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的配置错误
    pub fn config_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建网络错误
    pub fn network<T: Into<String>>(message: T) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// 创建内部错误
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的内部错误
    pub fn internal_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<toml::de::Error> for GatewayError {
    fn from(err: toml::de::Error) -> Self {
        Self::config_with_source("TOML解析失败", err)
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
            source: err.into(),
        }
    }
}

impl From<sea_orm::error::DbErr> for GatewayError {
    fn from(err: sea_orm::error::DbErr) -> Self {
        Self::database_with_source(err.to_string(), err)
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
            source: Some(err.into()),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for GatewayError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::authentication_with_source(format!("JWT验证失败: {err}"), err)
    }
}

impl From<url::ParseError> for GatewayError {
    fn from(err: url::ParseError) -> Self {
        Self::config_with_source(format!("无效的URL: {err}"), err)
    }
}
