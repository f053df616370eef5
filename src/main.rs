//! # OAuth Gateway 主程序

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use oauth_gateway::{
    Result,
    app::AppContext,
    config::ConfigManager,
    database, lerror, linfo,
    logging::{self, LogComponent, LogStage},
    server::GatewayServer,
};

/// 命令行参数
#[derive(Debug, Parser)]
#[command(name = "oauth-gateway", version, about)]
struct Cli {
    /// 配置文件路径，未指定时按 `GATEWAY_CONFIG_PATH` / `RUST_ENV` 查找
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 日志级别，`RUST_LOG` 优先
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.as_deref());

    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::Main,
        "service_starting",
        "服务启动"
    );

    if let Err(e) = run(cli).await {
        lerror!(
            "system",
            LogStage::Startup,
            LogComponent::Main,
            "service_start_failed",
            &format!("服务启动失败: {e:?}")
        );
        return Err(e);
    }

    linfo!(
        "system",
        LogStage::Shutdown,
        LogComponent::Main,
        "service_shutdown",
        "服务正常关闭"
    );
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config_manager = match cli.config {
        Some(path) => ConfigManager::from_file(path)?,
        None => ConfigManager::new()?,
    };
    let config = config_manager.get_config();

    config.database.ensure_database_path()?;
    let db = database::init_database(&config.database).await?;
    database::run_migrations(&db).await?;

    let context = AppContext::build(config, Arc::new(db))?;
    GatewayServer::new(Arc::new(context))?.serve().await
}
