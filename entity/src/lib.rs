//! # Entity 模块
//!
//! 包含所有 Sea-ORM 实体定义

pub mod oauth_bind;

pub use oauth_bind::Entity as OauthBind;
