//! # 本地身份认证模块
//!
//! 将调用方提交的本地凭证验证为本地身份（address）

pub mod jwt;

pub use jwt::JwtIdentityVerifier;

use crate::binding::LocalIdentity;
use crate::error::Result;

/// 本地身份验证器
///
/// 签名错误、过期或声明缺失均返回 `GatewayError::Authentication`。
pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<LocalIdentity>;
}
