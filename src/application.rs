// アプリケーション層
// ユースケースの調整とエラーの集約を担当

pub mod error;
pub mod service;

pub use error::ApplicationError;
