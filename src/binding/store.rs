//! # 绑定存储
//!
//! `oauth_bind` 表的读写。查询函数对 `ConnectionTrait` 泛型，
//! 既可在事务内调用，也可直接使用连接。

use chrono::Utc;
use entity::{OauthBind, oauth_bind};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set, SqlErr, Value,
};
use std::sync::Arc;

use super::types::{AccountId, Binding, LocalIdentity, Provider, ProviderClaim};
use crate::error::Result;

/// 写入结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkWrite {
    Written,
    /// 平台账号列唯一约束冲突：并发写入方已绑定该账号
    AccountTaken,
}

/// 在事务内先取得写锁
///
/// SQLite 的 `BEGIN` 为延迟事务，两个事务都完成读取后再写会以 `database is locked` 失败。
/// 以一条空更新作为事务的第一条语句，写锁在读取前取得，
/// 后到的事务在 busy_timeout 内等待，之后读到先提交的结果。
pub async fn acquire_write_lock<C: ConnectionTrait>(
    conn: &C,
    identity: &LocalIdentity,
) -> std::result::Result<(), DbErr> {
    OauthBind::update_many()
        .col_expr(oauth_bind::Column::Addr, Expr::col(oauth_bind::Column::Addr).into())
        .filter(oauth_bind::Column::Addr.eq(identity.as_str()))
        .exec(conn)
        .await?;
    Ok(())
}

/// 按本地身份查询
pub async fn find_by_identity<C: ConnectionTrait>(
    conn: &C,
    identity: &LocalIdentity,
) -> std::result::Result<Option<oauth_bind::Model>, DbErr> {
    OauthBind::find_by_id(identity.as_str().to_string())
        .one(conn)
        .await
}

/// 按平台账号查询
pub async fn find_by_provider_account<C: ConnectionTrait>(
    conn: &C,
    provider: Provider,
    account_id: &AccountId,
) -> std::result::Result<Option<oauth_bind::Model>, DbErr> {
    OauthBind::find()
        .filter(provider.account_column().eq(account_id.as_str()))
        .one(conn)
        .await
}

/// 以本地身份为主键 upsert 单个平台槽位，其他平台字段保持不变
pub async fn write_link<C: ConnectionTrait>(
    conn: &C,
    identity: &LocalIdentity,
    claim: &ProviderClaim,
) -> std::result::Result<LinkWrite, DbErr> {
    let now = Utc::now().naive_utc();
    let mut model = oauth_bind::ActiveModel {
        addr: Set(identity.as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let mut update_columns = vec![claim.provider.account_column(), oauth_bind::Column::UpdatedAt];
    model.set(
        claim.provider.account_column(),
        Value::from(Some(claim.account_id.as_str().to_string())),
    );
    if let Some(name_column) = claim.provider.display_name_column() {
        model.set(name_column, Value::from(claim.display_name.clone()));
        update_columns.push(name_column);
    }

    let result = OauthBind::insert(model)
        .on_conflict(
            OnConflict::column(oauth_bind::Column::Addr)
                .update_columns(update_columns)
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await;

    match result {
        Ok(_) => Ok(LinkWrite::Written),
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Ok(LinkWrite::AccountTaken)
        }
        Err(err) => Err(err),
    }
}

/// 只读的绑定查询仓库
#[derive(Debug, Clone)]
pub struct BindingRepository {
    db: Arc<DatabaseConnection>,
}

impl BindingRepository {
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn find_by_identity(&self, identity: &LocalIdentity) -> Result<Option<Binding>> {
        Ok(find_by_identity(self.db.as_ref(), identity)
            .await?
            .map(Binding::from))
    }

    pub async fn find_by_provider_account(
        &self,
        provider: Provider,
        account_id: &AccountId,
    ) -> Result<Option<Binding>> {
        Ok(find_by_provider_account(self.db.as_ref(), provider, account_id)
            .await?
            .map(Binding::from))
    }
}
