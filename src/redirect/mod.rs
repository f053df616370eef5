//! # 回调跳转模块
//!
//! state 编解码、variant 路由以及回跳地址构造

pub mod codec;
pub mod cohort;
pub mod targets;
pub mod variant;

pub use codec::{RedirectState, StateDecodeError, decode, encode};
pub use cohort::GmailCallbackFlow;
pub use variant::{VariantRoute, VariantTable};

impl From<StateDecodeError> for crate::error::GatewayError {
    fn from(err: StateDecodeError) -> Self {
        Self::validation_field(err.to_string(), "state")
    }
}
