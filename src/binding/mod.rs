//! # 账号绑定模块
//!
//! 本地身份与第三方平台账号的绑定：领域类型、存储、协调器与流程服务。
//!
//! 不变量：
//! - 一个平台账号最多绑定到一个本地身份（平台账号列唯一索引）
//! - 一个本地身份在每个平台最多一个账号，再次绑定覆盖旧值
//! - 首次绑定时创建记录，之后原地更新，不删除记录

pub mod reconciler;
pub mod service;
pub mod store;
pub mod types;

pub use reconciler::BindingReconciler;
pub use service::{BindRequest, BindService, BindStatus};
pub use store::{BindingRepository, LinkWrite};
pub use types::{
    AccountId, BindOutcome, Binding, ConflictReason, LinkedAccount, LocalIdentity, Provider,
    ProviderClaim,
};
