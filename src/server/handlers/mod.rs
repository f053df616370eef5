//! # 请求处理器
//!
//! 解析请求并委托各流程服务执行业务逻辑

pub mod bind;
pub mod bindings;
pub mod callback;
pub mod login;
pub mod system;

use axum::extract::rejection::JsonRejection;
use uuid::Uuid;

use crate::error::GatewayError;

/// 为每个请求生成追踪 ID
pub(crate) fn new_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// JSON 请求体解析失败按参数错误处理
pub(crate) fn json_rejection(rejection: &JsonRejection) -> GatewayError {
    GatewayError::validation(format!("请求体解析失败: {}", rejection.body_text()))
}
