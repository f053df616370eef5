//! # 日志配置模块
//!
//! 统一的结构化日志：每条记录都带有 `request_id`、阶段、组件与操作名，
//! 便于按一次回调请求串联绑定流程。

use std::env;
use std::fmt;
use tracing_subscriber::{EnvFilter, fmt as tracing_fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// 日志所处的处理阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStage {
    Startup,
    Shutdown,
    Request,
    Internal,
    Response,
}

impl LogStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Shutdown => "shutdown",
            Self::Request => "request",
            Self::Internal => "internal",
            Self::Response => "response",
        }
    }
}

impl fmt::Display for LogStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 产生日志的组件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogComponent {
    Main,
    Config,
    Database,
    Binding,
    StateCodec,
    Provider,
    Identity,
    Upstream,
    Server,
}

impl LogComponent {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Config => "config",
            Self::Database => "database",
            Self::Binding => "binding",
            Self::StateCodec => "state_codec",
            Self::Provider => "provider",
            Self::Identity => "identity",
            Self::Upstream => "upstream",
            Self::Server => "server",
        }
    }
}

impl fmt::Display for LogComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __gateway_log {
    ($level:ident, $rid:expr, $stage:expr, $comp:expr, $op:expr, $msg:expr $(, $key:ident = $value:expr)* $(,)?) => {
        ::tracing::event!(
            ::tracing::Level::$level,
            request_id = %$rid,
            stage = %$stage,
            component = %$comp,
            operation = $op,
            $($key = $value,)*
            "{}",
            $msg
        )
    };
}

/// `INFO` 级结构化日志
#[macro_export]
macro_rules! linfo {
    ($($tt:tt)*) => { $crate::__gateway_log!(INFO, $($tt)*) };
}

/// `WARN` 级结构化日志
#[macro_export]
macro_rules! lwarn {
    ($($tt:tt)*) => { $crate::__gateway_log!(WARN, $($tt)*) };
}

/// `ERROR` 级结构化日志
#[macro_export]
macro_rules! lerror {
    ($($tt:tt)*) => { $crate::__gateway_log!(ERROR, $($tt)*) };
}

/// `DEBUG` 级结构化日志
#[macro_export]
macro_rules! ldebug {
    ($($tt:tt)*) => { $crate::__gateway_log!(DEBUG, $($tt)*) };
}

/// 默认过滤规则：关闭 SQL 语句明细
#[must_use]
pub fn default_filter(level: &str) -> String {
    format!("{level},oauth_gateway=debug,sqlx::query=off,sea_orm::query=warn,sqlx=warn")
}

/// 初始化日志系统
///
/// `RUST_LOG` 存在时优先使用。
pub fn init_logging(log_level: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let log_filter = env::var("RUST_LOG").unwrap_or_else(|_| default_filter(level));

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| log_filter.into()))
        .with(
            tracing_fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}
