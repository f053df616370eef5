//! # 错误处理宏

/// 按构造函数名快速创建 `GatewayError`
///
/// ```ignore
/// let err = gateway_err!(config, "缺少配置项: {}", key);
/// let err = gateway_err!(exchange, "github", "授权码无效");
/// ```
#[macro_export]
macro_rules! gateway_err {
    (exchange, $provider:expr, $msg:expr) => {
        $crate::error::GatewayError::exchange($provider, $msg)
    };
    (exchange, $provider:expr, $fmt:expr, $($arg:tt)*) => {
        $crate::error::GatewayError::exchange($provider, format!($fmt, $($arg)*))
    };
    ($kind:ident, $msg:expr) => {
        $crate::error::GatewayError::$kind($msg)
    };
    ($kind:ident, $fmt:expr, $($arg:tt)*) => {
        $crate::error::GatewayError::$kind(format!($fmt, $($arg)*))
    };
}

/// 确保条件成立，否则返回指定类型的错误
///
/// ```ignore
/// ensure!(!code.is_empty(), validation, "授权码不能为空");
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $kind:ident, $msg:expr) => {
        if !($cond) {
            return Err($crate::gateway_err!($kind, $msg));
        }
    };
    ($cond:expr, $kind:ident, $fmt:expr, $($arg:tt)*) => {
        if !($cond) {
            return Err($crate::gateway_err!($kind, $fmt, $($arg)*));
        }
    };
}
