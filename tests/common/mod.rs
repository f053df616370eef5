//! 集成测试公共设施：内存数据库、固定响应的平台适配器、测试上下文
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{EncodingKey, Header};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::json;

use oauth_gateway::app::AppContext;
use oauth_gateway::auth::{IdentityVerifier, JwtIdentityVerifier};
use oauth_gateway::binding::{AccountId, Provider, ProviderClaim};
use oauth_gateway::config::{AppConfig, DatabaseConfig};
use oauth_gateway::database;
use oauth_gateway::error::{GatewayError, Result};
use oauth_gateway::providers::{ProviderAdapter, ProviderRegistry};

pub const JWT_SECRET: &str = "integration-test-secret";

/// 单连接的内存 SQLite，已执行迁移
///
/// 内存库按连接隔离，连接池必须固定为 1。
pub async fn memory_db() -> Arc<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    Arc::new(db)
}

/// 文件 SQLite，多连接，已执行迁移
pub async fn file_db(
    dir: &tempfile::TempDir,
    max_connections: u32,
) -> Arc<DatabaseConnection> {
    let config = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", dir.path().join("gateway.db").display()),
        max_connections,
        connect_timeout: 30,
    };
    let db = database::init_database(&config).await.unwrap();
    database::run_migrations(&db).await.unwrap();
    Arc::new(db)
}

pub fn claim(provider: Provider, account_id: &str, display_name: Option<&str>) -> ProviderClaim {
    ProviderClaim::new(
        provider,
        AccountId::new(account_id).unwrap(),
        display_name.map(str::to_string),
    )
}

/// 按授权码返回固定账号的平台适配器
#[derive(Debug, Clone)]
pub struct StaticAdapter {
    provider: Provider,
    label: String,
    accounts: HashMap<String, (String, Option<String>)>,
}

impl StaticAdapter {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            label: provider.as_str().to_string(),
            accounts: HashMap::new(),
        }
    }

    pub fn labeled(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn with_code(mut self, code: &str, account_id: &str, display_name: Option<&str>) -> Self {
        self.accounts.insert(
            code.to_string(),
            (account_id.to_string(), display_name.map(str::to_string)),
        );
        self
    }
}

#[async_trait]
impl ProviderAdapter for StaticAdapter {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn authorize_url(&self, state: &str) -> Result<String> {
        Ok(format!(
            "https://auth.test/{}/authorize?state={}",
            self.label,
            urlencoding::encode(state)
        ))
    }

    async fn resolve(&self, code: &str) -> Result<ProviderClaim> {
        let (account_id, display_name) = self.accounts.get(code).ok_or_else(|| {
            GatewayError::exchange(self.provider.as_str(), format!("授权码无效: {code}"))
        })?;
        Ok(ProviderClaim::new(
            self.provider,
            AccountId::new(account_id.clone())?,
            display_name.clone(),
        ))
    }
}

/// 签发测试用本地身份令牌
pub fn issue_jwt(address: &str) -> String {
    let exp = chrono::Utc::now().timestamp() + 3600;
    jsonwebtoken::encode(
        &Header::default(),
        &json!({ "address": address, "exp": exp }),
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = JWT_SECRET.to_string();
    config
}

/// 默认的测试平台：github / discord / gmail / stackexchange 以及 cohort gmail
pub fn test_registry() -> ProviderRegistry {
    ProviderRegistry::default()
        .with_adapter(Arc::new(
            StaticAdapter::new(Provider::Github)
                .with_code("gh-alice", "alice123", Some("Alice"))
                .with_code("gh-bob", "bob456", Some("Bob")),
        ))
        .with_adapter(Arc::new(
            StaticAdapter::new(Provider::Discord).with_code("dc-alice", "80351110224678912", Some("alice#1")),
        ))
        .with_adapter(Arc::new(
            StaticAdapter::new(Provider::Gmail).with_code("gm-alice", "alice@gmail.com", None),
        ))
        .with_adapter(Arc::new(
            StaticAdapter::new(Provider::StackExchange).with_code("so-alice", "12345", Some("alice")),
        ))
        .with_cohort_gmail(Arc::new(
            StaticAdapter::new(Provider::Gmail)
                .labeled("gmail-cohort")
                .with_code("gm-cohort", "cohort@gmail.com", None),
        ))
}

pub async fn test_context(config: AppConfig) -> Arc<AppContext> {
    test_context_with_registry(config, test_registry()).await
}

pub async fn test_context_with_registry(
    config: AppConfig,
    registry: ProviderRegistry,
) -> Arc<AppContext> {
    let db = memory_db().await;
    let verifier: Arc<dyn IdentityVerifier> =
        Arc::new(JwtIdentityVerifier::new(&config.auth).unwrap());

    let context = AppContext::with_components(
        Arc::new(config),
        db,
        verifier,
        registry,
        reqwest::Client::new(),
    )
    .unwrap();
    Arc::new(context)
}
