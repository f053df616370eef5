//! # 第三方登录处理器

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;

use super::{json_rejection, new_request_id};
use crate::login::LoginRequest;
use crate::server::{response, server::AppState};

/// 使用 GitHub 授权码登录
pub async fn third_party_login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let err = json_rejection(&rejection);
            err.log();
            return response::app_error(err);
        }
    };

    match state.login_service.login(&new_request_id(), &request).await {
        Ok(login) => response::success(login),
        Err(err) => {
            err.log();
            response::app_error(err)
        }
    }
}
