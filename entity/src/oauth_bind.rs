//! # 账号绑定实体定义
//!
//! 每个本地身份（address）一行，每个第三方平台最多一个账号槽位

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 账号绑定实体
///
/// 未绑定的平台字段为 `NULL`，平台账号列上的唯一索引只约束非空值。
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "oauth_bind")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub addr: String,
    #[sea_orm(unique)]
    pub github: Option<String>,
    pub github_name: Option<String>,
    #[sea_orm(unique)]
    pub discord: Option<String>,
    pub discord_name: Option<String>,
    #[sea_orm(unique)]
    pub gmail: Option<String>,
    #[sea_orm(unique)]
    pub stackexchange: Option<String>,
    pub stackexchange_name: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
