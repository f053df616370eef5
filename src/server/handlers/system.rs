//! # 系统处理器

/// 存活检查
pub async fn ping_handler() -> &'static str {
    "pong"
}
