//! # 绑定流程服务
//!
//! 本地凭证验证 → 平台授权码解析 → 绑定协调

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::reconciler::BindingReconciler;
use super::types::{BindOutcome, Binding, ConflictReason, Provider};
use crate::auth::IdentityVerifier;
use crate::error::Result;
use crate::logging::{LogComponent, LogStage};
use crate::providers::ProviderRegistry;
use crate::{ensure, ldebug, linfo};

/// 绑定请求
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BindRequest {
    #[serde(default)]
    pub jwt: String,
    #[serde(default)]
    pub code: String,
    #[serde(default, rename = "type")]
    pub provider: String,
}

/// 绑定结果，冲突属于正常结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BindStatus {
    Success { binding: Binding },
    AlreadyBound { reason: ConflictReason },
}

/// 绑定流程服务
#[derive(Clone)]
pub struct BindService {
    verifier: Arc<dyn IdentityVerifier>,
    providers: Arc<ProviderRegistry>,
    reconciler: BindingReconciler,
}

impl BindService {
    #[must_use]
    pub fn new(
        verifier: Arc<dyn IdentityVerifier>,
        providers: Arc<ProviderRegistry>,
        reconciler: BindingReconciler,
    ) -> Self {
        Self {
            verifier,
            providers,
            reconciler,
        }
    }

    pub async fn bind(&self, request_id: &str, request: &BindRequest) -> Result<BindStatus> {
        ensure!(!request.jwt.trim().is_empty(), validation, "jwt 不能为空");
        ensure!(!request.code.trim().is_empty(), validation, "授权码不能为空");
        ensure!(!request.provider.trim().is_empty(), validation, "平台类型不能为空");

        let identity = self.verifier.verify(&request.jwt)?;
        let provider: Provider = request.provider.parse()?;
        let adapter = self.providers.get(provider)?;

        ldebug!(
            request_id,
            LogStage::Request,
            LogComponent::Provider,
            "resolve_code",
            "解析平台授权码",
            provider = provider.as_str()
        );
        let claim = adapter.resolve(request.code.trim()).await?;

        let outcome = self.reconciler.bind(&identity, &claim).await?;
        let status = match outcome {
            BindOutcome::Success { binding, changed } => {
                linfo!(
                    request_id,
                    LogStage::Internal,
                    LogComponent::Binding,
                    "bind",
                    "绑定成功",
                    address = identity.as_str(),
                    provider = provider.as_str(),
                    changed = changed
                );
                BindStatus::Success { binding }
            }
            BindOutcome::Conflict(reason) => {
                linfo!(
                    request_id,
                    LogStage::Internal,
                    LogComponent::Binding,
                    "bind",
                    "账号已绑定",
                    address = identity.as_str(),
                    provider = provider.as_str(),
                    reason = reason.to_string()
                );
                BindStatus::AlreadyBound { reason }
            }
        };

        Ok(status)
    }
}
