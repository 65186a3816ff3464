// ドメインモデル（エンティティと値オブジェクト）

mod beer;
mod value_objects;

pub use value_objects::{BeerId, BeerName, BeerType, Brand};

pub use beer::Beer;
