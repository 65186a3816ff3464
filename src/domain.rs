// ドメイン層
// ビジネスルールとポート（外部依存の抽象）を定義

pub mod error;
pub mod model;
pub mod port;
