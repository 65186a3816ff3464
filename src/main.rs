use beer_stock_service::adapter::driven::{
    ConsoleLogger, InMemoryBeerRepository, MySqlBeerRepository,
};
use beer_stock_service::adapter::driver::rest_api::create_app;
use beer_stock_service::adapter::{DatabaseConfig, DatabaseMigration, ServerConfig, StorageBackend};
use beer_stock_service::application::service::BeerStockService;
use beer_stock_service::domain::port::{BeerRepository, Logger};

use std::collections::HashMap;
use std::sync::Arc;

const COMPONENT: &str = "Main";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .envファイルから環境変数を読み込む
    dotenvy::dotenv().ok();

    let logger: Arc<dyn Logger> = Arc::new(ConsoleLogger::from_env());
    let server_config = ServerConfig::from_env()?;

    // 永続化先に応じてリポジトリを作成
    let beer_repository: Arc<dyn BeerRepository> = match server_config.storage {
        StorageBackend::MySql => {
            let config = DatabaseConfig::from_env()?;
            let pool = config.connect().await?;
            logger.info(
                COMPONENT,
                "Database connection pool created",
                None,
                Some(HashMap::from([
                    ("host".to_string(), config.host.clone()),
                    ("port".to_string(), config.port.to_string()),
                    ("database".to_string(), config.database.clone()),
                ])),
            );

            DatabaseMigration::new(pool.clone(), logger.clone())
                .run()
                .await?;

            Arc::new(MySqlBeerRepository::new(pool))
        }
        StorageBackend::Memory => {
            logger.warn(
                COMPONENT,
                "Using in-memory storage; data is lost on restart",
                None,
                None,
            );
            Arc::new(InMemoryBeerRepository::new())
        }
    };

    let beer_service = Arc::new(BeerStockService::new(beer_repository, logger.clone()));
    let app = create_app(beer_service);

    let address = server_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    logger.info(
        COMPONENT,
        &format!("REST API server listening on http://{}", address),
        None,
        None,
    );

    axum::serve(listener, app).await?;

    Ok(())
}
