use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySql, Pool};
use std::env;
use std::str::FromStr;

use crate::adapter::database_error::DatabaseError;

/// データベース接続設定を管理する構造体
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub max_connections: u32,
}

/// 設定エラー
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// 環境変数を読み取り、未設定ならデフォルト値を使用する
pub(crate) fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// 環境変数を読み取って型変換する
/// 未設定ならデフォルト値、変換できなければConfigError
pub(crate) fn parse_var<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(format!("Invalid {}: {}", key, e))),
        Err(_) => Ok(default),
    }
}

impl DatabaseConfig {
    /// 環境変数から設定を読み取る
    /// 環境変数が設定されていない場合はデフォルト値を使用
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: var_or("DATABASE_HOST", "localhost"),
            port: parse_var("DATABASE_PORT", 3306)?,
            database: var_or("DATABASE_NAME", "beerstock_db"),
            username: var_or("DATABASE_USER", "beerstock_user"),
            password: var_or("DATABASE_PASSWORD", "beerstock_password"),
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 10)?,
        })
    }

    /// MySQL接続文字列を生成
    pub fn connection_string(&self) -> String {
        format!(
            "mysql://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }

    /// 接続プールを作成
    pub async fn connect(&self) -> Result<Pool<MySql>, DatabaseError> {
        MySqlPoolOptions::new()
            .max_connections(self.max_connections)
            .connect(&self.connection_string())
            .await
            .map_err(|e| {
                DatabaseError::ConnectionError(format!(
                    "{}:{} への接続に失敗しました: {}",
                    self.host, self.port, e
                ))
            })
    }
}
