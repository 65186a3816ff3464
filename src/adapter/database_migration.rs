use crate::adapter::database_error::DatabaseError;
use crate::domain::port::Logger;
use sqlx::{MySql, Pool};
use std::sync::Arc;

const COMPONENT: &str = "DatabaseMigration";

/// 適用するマイグレーション（名前, SQL）
/// 各SQLはべき等であること（CREATE TABLE IF NOT EXISTS）
const MIGRATIONS: &[(&str, &str)] = &[(
    "001_create_beers_table",
    include_str!("../../migrations/001_create_beers_table.sql"),
)];

/// データベースマイグレーションを管理する構造体
pub struct DatabaseMigration {
    pool: Pool<MySql>,
    logger: Arc<dyn Logger>,
}

impl DatabaseMigration {
    /// 新しいDatabaseMigrationインスタンスを作成
    pub fn new(pool: Pool<MySql>, logger: Arc<dyn Logger>) -> Self {
        Self { pool, logger }
    }

    /// マイグレーションを順番に実行
    pub async fn run(&self) -> Result<(), DatabaseError> {
        for (name, migration_sql) in MIGRATIONS {
            self.logger
                .debug(COMPONENT, &format!("Running migration {}", name), None, None);
            sqlx::query(migration_sql)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    DatabaseError::MigrationError(format!("Migration {} failed: {}", name, e))
                })?;
        }

        self.logger.info(
            COMPONENT,
            &format!("{} migration(s) applied", MIGRATIONS.len()),
            None,
            None,
        );
        Ok(())
    }
}
