//! # 错误处理
//!
//! `GatewayError` 是全部操作共用的错误类型。错误按调用方的处理方式归为
//! [`ErrorCategory`]；绑定冲突不是错误，而是 `BindOutcome::Conflict`。

pub mod macros;
pub mod types;

pub use types::GatewayError;

/// 全局 `Result`
pub type Result<T> = std::result::Result<T, GatewayError>;

/// 错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// 输入缺失或格式错误，直接报告，不重试
    Validation,
    /// 本地身份凭证无效，调用方需重新认证
    Auth,
    /// 平台授权码交换或资料获取失败，提示用户重试
    Exchange,
    /// 上游业务服务不可用
    Upstream,
    /// 存储、配置或编码故障，对调用方不透明，可重试
    Internal,
}

impl ErrorCategory {
    /// 由调用方输入引起的错误
    #[must_use]
    pub const fn is_caller_fault(self) -> bool {
        matches!(self, Self::Validation | Self::Auth | Self::Exchange)
    }
}

/// 为外部错误附加上下文，保留内部错误的状态码
pub trait Context<T> {
    #[track_caller]
    fn with_context<C, F>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display;
}

impl<T, E> Context<T> for std::result::Result<T, E>
where
    E: Into<GatewayError>,
{
    fn with_context<C, F>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display,
    {
        self.map_err(|error| GatewayError::Context {
            context: context().to_string(),
            source: Box::new(error.into()),
        })
    }
}
