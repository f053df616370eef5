//! # 网关服务器
//!
//! Axum HTTP 服务器，承载绑定、登录与各平台回调路由

use std::net::SocketAddr;
use std::ops::Deref;
use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::app::AppContext;
use crate::config::ServerConfig;
use crate::error::{Context, Result};
use crate::logging::{LogComponent, LogStage};
use crate::{linfo, lwarn};

/// 路由共享状态
#[derive(Clone)]
pub struct AppState {
    context: Arc<AppContext>,
}

impl AppState {
    #[must_use]
    pub const fn new(context: Arc<AppContext>) -> Self {
        Self { context }
    }
}

impl Deref for AppState {
    type Target = AppContext;

    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

/// 组装完整路由：业务路由 + `/ping` + 追踪与 CORS 中间件
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origins));

    super::routes::create_routes(state).layer(service_builder)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        return cors_layer.allow_origin(Any);
    }

    let parsed = origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<std::result::Result<Vec<_>, _>>();

    match parsed {
        Ok(origins) => cors_layer.allow_origin(origins),
        Err(e) => {
            lwarn!(
                "system",
                LogStage::Startup,
                LogComponent::Server,
                "cors_config_fail",
                &format!("Invalid CORS origin configuration: {e}, falling back to allow any")
            );
            cors_layer.allow_origin(Any)
        }
    }
}

/// 网关服务器
pub struct GatewayServer {
    addr: SocketAddr,
    router: Router,
}

impl GatewayServer {
    pub fn new(context: Arc<AppContext>) -> Result<Self> {
        let server_config = context.config.server.clone();
        let addr = server_config.socket_addr()?;
        let router = create_router(AppState::new(context), &server_config);

        Ok(Self { addr, router })
    }

    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// 监听并服务，直到进程退出
    pub async fn serve(self) -> Result<()> {
        let listener = TcpListener::bind(self.addr)
            .await
            .with_context(|| format!("绑定监听地址失败: {}", self.addr))?;

        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::Server,
            "server_listening",
            &format!("OAuth gateway listening on {}", self.addr)
        );

        axum::serve(
            listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        linfo!(
            "system",
            LogStage::Shutdown,
            LogComponent::Server,
            "server_stopped",
            "OAuth gateway stopped"
        );
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        lwarn!(
            "system",
            LogStage::Shutdown,
            LogComponent::Server,
            "signal_listen_fail",
            &format!("Failed to listen for shutdown signal: {e}")
        );
        std::future::pending::<()>().await;
    }
}
