//! 应用上下文（DI 容器）
//!
//! 统一持有跨模块共享的服务实例，便于在测试中注入替身实现。
//! 初始化顺序：配置 → 数据库 → 平台适配器 → 各流程服务。

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{IdentityVerifier, JwtIdentityVerifier};
use crate::binding::{BindService, BindingReconciler, BindingRepository};
use crate::config::AppConfig;
use crate::error::Result;
use crate::login::LoginService;
use crate::providers::ProviderRegistry;
use crate::redirect::{GmailCallbackFlow, VariantTable};
use crate::upstream::UpstreamClient;
use sea_orm::DatabaseConnection;

const USER_AGENT: &str = concat!("oauth-gateway/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub db: Arc<DatabaseConnection>,
    pub providers: Arc<ProviderRegistry>,
    pub bind_service: BindService,
    pub login_service: LoginService,
    pub gmail_flow: GmailCallbackFlow,
    pub bindings: BindingRepository,
}

impl AppContext {
    /// 按配置构建全部组件
    pub fn build(config: Arc<AppConfig>, db: Arc<DatabaseConnection>) -> Result<Self> {
        let http_client = Self::http_client(&config)?;
        let providers = ProviderRegistry::from_config(&config.providers, &http_client)?;
        let verifier: Arc<dyn IdentityVerifier> = Arc::new(JwtIdentityVerifier::new(&config.auth)?);

        Self::with_components(config, db, verifier, providers, http_client)
    }

    /// 使用给定的验证器与平台适配器构建
    pub fn with_components(
        config: Arc<AppConfig>,
        db: Arc<DatabaseConnection>,
        verifier: Arc<dyn IdentityVerifier>,
        providers: ProviderRegistry,
        http_client: reqwest::Client,
    ) -> Result<Self> {
        let providers = Arc::new(providers);
        let upstream = UpstreamClient::new(
            &config.upstream,
            &config.redirect.transformer_url,
            http_client,
        )?;

        let reconciler = BindingReconciler::new(Arc::clone(&db), &config.binding);
        let bind_service = BindService::new(verifier, Arc::clone(&providers), reconciler);
        let login_service = LoginService::new(Arc::clone(&providers), upstream.clone());
        let gmail_flow = GmailCallbackFlow::new(
            Arc::clone(&providers),
            upstream,
            VariantTable::new(config.redirect.variants.clone()),
            config.redirect.pass_url.clone(),
        );
        let bindings = BindingRepository::new(Arc::clone(&db));

        Ok(Self {
            config,
            db,
            providers,
            bind_service,
            login_service,
            gmail_flow,
            bindings,
        })
    }

    /// 平台与上游请求共用的 HTTP 客户端
    pub fn http_client(config: &AppConfig) -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream.request_timeout))
            .user_agent(USER_AGENT)
            .build()?)
    }
}
