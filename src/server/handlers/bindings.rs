//! # 绑定查询处理器

use axum::extract::{Path, State};
use axum::response::IntoResponse;

use crate::binding::{Binding, BindingRepository, LocalIdentity};
use crate::error::{GatewayError, Result};
use crate::server::{response, server::AppState};

/// 按本地身份查询绑定快照
pub async fn get_binding(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> impl IntoResponse {
    match lookup(&state.bindings, address).await {
        Ok(binding) => response::success(binding),
        Err(err) => {
            err.log();
            response::app_error(err)
        }
    }
}

async fn lookup(bindings: &BindingRepository, address: String) -> Result<Binding> {
    let identity = LocalIdentity::new(address)?;
    bindings
        .find_by_identity(&identity)
        .await?
        .ok_or_else(|| GatewayError::not_found("binding", identity.as_str()))
}
