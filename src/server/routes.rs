//! # 路由配置

use axum::Router;
use axum::routing::{get, post};

use super::handlers::{bind, bindings, callback, login, system};
use super::server::AppState;

/// 创建所有路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(system::ping_handler))
        .nest("/oauth", oauth_routes())
        .with_state(state)
}

/// 绑定、登录与平台回调路由
fn oauth_routes() -> Router<AppState> {
    Router::new()
        .route("/bind", post(bind::bind_account))
        .route("/login", post(login::third_party_login))
        .route("/bindings/{address}", get(bindings::get_binding))
        .route("/authorize/{provider}", get(callback::authorize_url))
        .route("/github", get(callback::github_callback))
        .route("/discord", get(callback::discord_callback))
        .route("/gmail", get(callback::gmail_callback))
        .route("/stackoverflow", get(callback::stackoverflow_callback))
        .route("/stackoverflow/", get(callback::stackoverflow_callback))
        .route(
            "/stackoverflow/authcodeurl",
            get(callback::stackoverflow_authcode_url),
        )
}
