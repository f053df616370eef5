//! # 第三方登录
//!
//! 目前只支持 GitHub：解析 GitHub 账号后向上游换取本地令牌

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::binding::Provider;
use crate::error::{GatewayError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::providers::ProviderRegistry;
use crate::upstream::UpstreamClient;
use crate::{ensure, linfo};

/// 登录请求
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default, rename = "type")]
    pub provider: String,
}

/// 登录结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponse {
    pub github: String,
    pub jwt: String,
}

#[derive(Clone)]
pub struct LoginService {
    providers: Arc<ProviderRegistry>,
    upstream: UpstreamClient,
}

impl LoginService {
    #[must_use]
    pub const fn new(providers: Arc<ProviderRegistry>, upstream: UpstreamClient) -> Self {
        Self {
            providers,
            upstream,
        }
    }

    pub async fn login(&self, request_id: &str, request: &LoginRequest) -> Result<LoginResponse> {
        ensure!(!request.code.trim().is_empty(), validation, "授权码不能为空");
        let provider: Provider = request.provider.parse()?;
        if provider != Provider::Github {
            return Err(GatewayError::validation_field(
                format!("平台不支持登录: {provider}"),
                "type",
            ));
        }

        let claim = self.providers.get(provider)?.resolve(request.code.trim()).await?;
        let jwt = self
            .upstream
            .third_party_login(provider.as_str(), claim.account_id.as_str())
            .await?;

        linfo!(
            request_id,
            LogStage::Internal,
            LogComponent::Upstream,
            "third_party_login",
            "第三方登录成功",
            provider = provider.as_str()
        );

        Ok(LoginResponse {
            github: claim.account_id.to_string(),
            jwt,
        })
    }
}
