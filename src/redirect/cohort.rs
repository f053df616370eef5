//! # Gmail 回调与 cohort 交接
//!
//! state 的 variant 命中 cohort 时，用 cohort 专用客户端解析 gmail 地址，
//! 向上游换取访问令牌后跳回调用方；否则透传跳转。

use std::sync::Arc;

use super::codec::{self, RedirectState, StateDecodeError};
use super::targets;
use super::variant::{VariantRoute, VariantTable};
use crate::error::Result;
use crate::logging::{LogComponent, LogStage};
use crate::providers::ProviderRegistry;
use crate::upstream::UpstreamClient;
use crate::{ensure, ldebug, linfo, lwarn};

#[derive(Clone)]
pub struct GmailCallbackFlow {
    providers: Arc<ProviderRegistry>,
    upstream: UpstreamClient,
    variants: VariantTable,
    pass_url: String,
}

impl GmailCallbackFlow {
    #[must_use]
    pub const fn new(
        providers: Arc<ProviderRegistry>,
        upstream: UpstreamClient,
        variants: VariantTable,
        pass_url: String,
    ) -> Self {
        Self {
            providers,
            upstream,
            variants,
            pass_url,
        }
    }

    #[must_use]
    pub const fn variants(&self) -> &VariantTable {
        &self.variants
    }

    /// 处理回调，返回跳转地址
    pub async fn handle(&self, request_id: &str, code: &str, state: &str) -> Result<String> {
        ensure!(!code.is_empty(), validation, "No authorization code provided.");
        ensure!(!state.is_empty(), validation, "authorization error state");

        match codec::decode(state) {
            Ok(decoded) => match self.variants.resolve(&decoded.variant) {
                VariantRoute::Cohort(cohort) => {
                    self.hand_off(request_id, code, &decoded, &cohort).await
                }
                VariantRoute::Passthrough => self.passthrough(request_id, code),
            },
            Err(err @ StateDecodeError::InvalidEscaping(_)) => Err(err.into()),
            Err(err @ StateDecodeError::Malformed(_)) => {
                let leading = codec::leading_segment(state)?;
                if self.variants.is_cohort(&leading) {
                    return Err(err.into());
                }
                self.passthrough(request_id, code)
            }
        }
    }

    fn passthrough(&self, request_id: &str, code: &str) -> Result<String> {
        ldebug!(
            request_id,
            LogStage::Response,
            LogComponent::StateCodec,
            "gmail_passthrough",
            "普通 state，透传跳转"
        );
        targets::passthrough(&self.pass_url, "gmail", code)
    }

    async fn hand_off(
        &self,
        request_id: &str,
        code: &str,
        state: &RedirectState,
        cohort: &str,
    ) -> Result<String> {
        let fail_url = targets::callback_target(&state.fail_url)?;

        let claim = self.providers.cohort_gmail()?.resolve(code).await?;

        let token = match self
            .upstream
            .cohort_access_token(claim.account_id.as_str(), cohort)
            .await
        {
            Ok(token) => token,
            Err(err) => {
                lwarn!(
                    request_id,
                    LogStage::Internal,
                    LogComponent::Upstream,
                    "cohort_token_failed",
                    "cohort 令牌获取失败，跳转失败地址",
                    cohort = cohort,
                    error = err.to_string()
                );
                return Ok(fail_url);
            }
        };

        match targets::with_token(&state.success_url, &token) {
            Ok(url) => {
                linfo!(
                    request_id,
                    LogStage::Response,
                    LogComponent::StateCodec,
                    "cohort_handoff",
                    "cohort 交接完成",
                    cohort = cohort
                );
                Ok(url)
            }
            Err(err) => {
                lwarn!(
                    request_id,
                    LogStage::Response,
                    LogComponent::StateCodec,
                    "cohort_success_url_invalid",
                    "成功回跳地址无效，跳转失败地址",
                    error = err.to_string()
                );
                Ok(fail_url)
            }
        }
    }
}

impl std::fmt::Debug for GmailCallbackFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GmailCallbackFlow")
            .field("variants", &self.variants)
            .field("pass_url", &self.pass_url)
            .finish_non_exhaustive()
    }
}
