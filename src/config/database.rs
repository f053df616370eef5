//! # 数据库配置
//!
//! 绑定表只落在 SQLite 上；文件库的目录在连接前创建，内存库不落盘。

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{GatewayError, Result};
use crate::{
    linfo,
    logging::{LogComponent, LogStage},
};

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// 连接串，如 `sqlite://./data/oauth_gateway.db?mode=rwc`
    pub url: String,
    /// 连接池上限
    pub max_connections: u32,
    /// 建立连接的超时（秒）
    pub connect_timeout: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./data/oauth_gateway.db?mode=rwc".to_string(),
            max_connections: 10,
            connect_timeout: 30,
        }
    }
}

impl DatabaseConfig {
    /// SQLite 文件库的路径；内存库或其他数据库返回 `None`
    #[must_use]
    pub fn sqlite_file(&self) -> Option<&Path> {
        let rest = self
            .url
            .strip_prefix("sqlite://")
            .or_else(|| self.url.strip_prefix("sqlite:"))?;
        let path = rest.split('?').next().unwrap_or_default();
        if path.is_empty() || path.contains(":memory:") {
            return None;
        }
        Some(Path::new(path))
    }

    /// 确保 SQLite 文件所在目录存在
    pub fn ensure_database_path(&self) -> Result<()> {
        let Some(parent) = self
            .sqlite_file()
            .and_then(Path::parent)
            .filter(|parent| !parent.as_os_str().is_empty() && !parent.exists())
        else {
            return Ok(());
        };

        std::fs::create_dir_all(parent).map_err(|e| {
            GatewayError::config_with_source(
                format!("无法创建数据库目录: {}", parent.display()),
                e,
            )
        })?;
        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::Database,
            "create_db_dir",
            format!("创建数据库目录: {}", parent.display())
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_url(url: &str) -> DatabaseConfig {
        DatabaseConfig {
            url: url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_sqlite_file_path() {
        assert_eq!(
            with_url("sqlite://./data/gw.db?mode=rwc").sqlite_file(),
            Some(Path::new("./data/gw.db"))
        );
        assert_eq!(
            with_url("sqlite:/var/lib/gw.db").sqlite_file(),
            Some(Path::new("/var/lib/gw.db"))
        );
        assert_eq!(with_url("sqlite::memory:").sqlite_file(), None);
        assert_eq!(with_url("postgres://localhost/gw").sqlite_file(), None);
    }

    #[test]
    fn test_ensure_database_path_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested/deeper/gw.db");
        let config = with_url(&format!("sqlite://{}?mode=rwc", db_path.display()));

        config.ensure_database_path().unwrap();
        assert!(dir.path().join("nested/deeper").is_dir());
        assert!(!db_path.exists());

        // 目录已存在时再次调用无副作用
        config.ensure_database_path().unwrap();
    }
}
