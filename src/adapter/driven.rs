// 駆動される側アダプター（リポジトリ実装、ロガー実装）

mod beer_repository;
mod console_logger;
mod in_memory_beer_repository;

pub use beer_repository::MySqlBeerRepository;
pub use console_logger::{ConsoleLogger, LogEntry};
pub use in_memory_beer_repository::InMemoryBeerRepository;
