//! # HTTP 服务
//!
//! 路由、处理器与统一响应格式

pub mod handlers;
pub mod response;
pub mod routes;
pub mod server;

pub use server::{AppState, GatewayServer, create_router};
