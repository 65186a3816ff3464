/// ドメイン層のエラー型
/// ビジネスルール違反を表現する
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// 無効な値（例: 空のビール名、最大在庫数0）
    InvalidValue(String),
    /// 在庫数が最大在庫数を超える
    StockExceeded {
        quantity: u32,
        requested: u32,
        max: u32,
    },
    /// 在庫数が0未満になる
    InsufficientStock { quantity: u32, requested: u32 },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::InvalidValue(msg) => write!(f, "Invalid value: {}", msg),
            DomainError::StockExceeded {
                quantity,
                requested,
                max,
            } => write!(
                f,
                "Stock exceeded: adding {} to {} exceeds max capacity {}",
                requested, quantity, max
            ),
            DomainError::InsufficientStock {
                quantity,
                requested,
            } => write!(
                f,
                "Insufficient stock: cannot remove {} from {}",
                requested, quantity
            ),
        }
    }
}

impl std::error::Error for DomainError {}
