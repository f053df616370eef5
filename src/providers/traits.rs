//! # 适配器特征定义
//!
//! 定义所有第三方平台适配器需要实现的通用接口

use async_trait::async_trait;

use crate::binding::{Provider, ProviderClaim};
use crate::error::Result;

/// 第三方平台适配器特征
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// 适配的平台
    fn provider(&self) -> Provider;

    /// 构建携带 `state` 的授权 URL
    fn authorize_url(&self, state: &str) -> Result<String>;

    /// 用授权码换取平台账号声明
    ///
    /// 任何传输错误、非 2xx 响应或缺失字段都返回 `GatewayError::Exchange`。
    async fn resolve(&self, code: &str) -> Result<ProviderClaim>;
}
