//! # 绑定协调器
//!
//! 对已验证的本地身份与平台账号声明应用绑定策略。
//! 事务先取得写锁，唯一性检查与写入在同一事务内串行完成；
//! 平台账号列上的唯一索引兜底，约束冲突与预检查冲突同样返回 `Conflict`。

use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use std::sync::Arc;
use tracing::debug;

use super::store::{self, LinkWrite};
use super::types::{BindOutcome, Binding, ConflictReason, LocalIdentity, ProviderClaim};
use crate::config::BindingConfig;
use crate::error::{GatewayError, Result};

/// 绑定协调器，`oauth_bind` 表的唯一写入方
#[derive(Debug, Clone)]
pub struct BindingReconciler {
    db: Arc<DatabaseConnection>,
    allow_overwrite: bool,
}

impl BindingReconciler {
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>, policy: &BindingConfig) -> Self {
        Self {
            db,
            allow_overwrite: policy.allow_overwrite,
        }
    }

    /// 绑定平台账号到本地身份
    ///
    /// 持久层错误以 `GatewayError::Database` 返回，不做重试。
    pub async fn bind(&self, identity: &LocalIdentity, claim: &ProviderClaim) -> Result<BindOutcome> {
        let txn = self.db.begin().await?;
        store::acquire_write_lock(&txn, identity).await?;

        // 出错时未提交的事务在 drop 时回滚
        let outcome = reconcile(&txn, identity, claim, self.allow_overwrite).await?;

        match &outcome {
            BindOutcome::Success { changed, .. } => {
                txn.commit().await?;
                debug!(
                    address = identity.as_str(),
                    provider = claim.provider.as_str(),
                    changed,
                    "绑定完成"
                );
            }
            BindOutcome::Conflict(reason) => {
                txn.rollback().await?;
                debug!(
                    address = identity.as_str(),
                    provider = claim.provider.as_str(),
                    reason = %reason,
                    "绑定冲突"
                );
            }
        }

        Ok(outcome)
    }
}

async fn reconcile<C: ConnectionTrait>(
    conn: &C,
    identity: &LocalIdentity,
    claim: &ProviderClaim,
    allow_overwrite: bool,
) -> Result<BindOutcome> {
    let provider = claim.provider;

    // 账号唯一性检查必须先于身份行读取
    if let Some(owner) = store::find_by_provider_account(conn, provider, &claim.account_id).await? {
        if owner.addr != identity.as_str() {
            return Ok(BindOutcome::Conflict(ConflictReason::AccountLinkedElsewhere));
        }
    }

    if let Some(row) = store::find_by_identity(conn, identity).await? {
        let existing = Binding::from(row);
        if let Some(current) = existing.account(provider) {
            if current.account_id == claim.account_id.as_str() {
                if current.display_name == claim.display_name {
                    return Ok(BindOutcome::Success {
                        binding: existing,
                        changed: false,
                    });
                }
            } else if !allow_overwrite {
                return Ok(BindOutcome::Conflict(ConflictReason::IdentityAlreadyLinked));
            }
        }
    }

    match store::write_link(conn, identity, claim).await? {
        LinkWrite::AccountTaken => Ok(BindOutcome::Conflict(
            ConflictReason::AccountLinkedElsewhere,
        )),
        LinkWrite::Written => {
            let row = store::find_by_identity(conn, identity).await?.ok_or_else(|| {
                GatewayError::internal(format!("绑定写入后未找到记录: {identity}"))
            })?;
            Ok(BindOutcome::Success {
                binding: Binding::from(row),
                changed: true,
            })
        }
    }
}
