//! # OAuth Gateway
//!
//! 把应用内的本地身份（address）与第三方平台账号绑定，
//! 并提供各平台的回调跳转与 GitHub 登录中转。

pub mod app;
pub mod auth;
pub mod binding;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod login;
pub mod providers;
pub mod redirect;
pub mod server;
pub mod upstream;

pub use config::AppConfig;
pub use error::{GatewayError, Result};
