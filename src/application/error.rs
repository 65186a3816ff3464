use crate::domain::error::DomainError;
use crate::domain::port::RepositoryError;

/// アプリケーション層のエラー型
/// 呼び出し側が区別すべき失敗（登録済み・未登録・在庫範囲外）と
/// ドメインエラー、リポジトリエラーをまとめる
#[derive(Debug)]
pub enum ApplicationError {
    /// 同名のビールが既に登録されている
    AlreadyRegistered(String),
    /// ビールが見つからない
    NotFound(String),
    /// 在庫操作で在庫数が 0..=最大在庫数 の範囲を外れる
    StockExceeded(String),
    /// ドメインエラー（入力値の検証失敗など）
    DomainError(DomainError),
    /// リポジトリエラー（永続化の失敗）
    RepositoryError(RepositoryError),
}

impl std::fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicationError::AlreadyRegistered(msg) => write!(f, "Already registered: {}", msg),
            ApplicationError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApplicationError::StockExceeded(msg) => write!(f, "Stock exceeded: {}", msg),
            ApplicationError::DomainError(err) => write!(f, "Domain error: {}", err),
            ApplicationError::RepositoryError(err) => write!(f, "Repository error: {}", err),
        }
    }
}

impl std::error::Error for ApplicationError {}

// 在庫上限・下限の違反はどちらも StockExceeded に持ち上げる
// 詳細はメッセージに残す
impl From<DomainError> for ApplicationError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::StockExceeded { .. } | DomainError::InsufficientStock { .. } => {
                ApplicationError::StockExceeded(err.to_string())
            }
            other => ApplicationError::DomainError(other),
        }
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        ApplicationError::RepositoryError(err)
    }
}
