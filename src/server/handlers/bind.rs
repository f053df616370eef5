//! # 账号绑定处理器

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;

use super::{json_rejection, new_request_id};
use crate::binding::{BindRequest, BindStatus};
use crate::server::{response, server::AppState};

/// 绑定第三方账号
///
/// 冲突以 `already_bound` 正常返回，错误按类别映射状态码
pub async fn bind_account(
    State(state): State<AppState>,
    payload: Result<Json<BindRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let err = json_rejection(&rejection);
            err.log();
            return response::app_error(err);
        }
    };

    let request_id = new_request_id();
    match state.bind_service.bind(&request_id, &request).await {
        Ok(status @ BindStatus::Success { .. }) => response::success(status),
        Ok(status @ BindStatus::AlreadyBound { .. }) => {
            response::success_with_message(status, "账号已被绑定")
        }
        Err(err) => {
            err.log();
            response::app_error(err)
        }
    }
}
