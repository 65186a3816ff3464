use crate::domain::error::DomainError;
use crate::domain::model::{Beer, BeerName, BeerType, Brand};
use serde::{Deserialize, Serialize};

/// ビール登録用のリクエストDTO
/// idを含めても無視される（ストアが採番する）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeerRequest {
    pub name: String,
    pub brand: String,
    pub max: u32,
    pub quantity: u32,
    pub beer_type: BeerType,
}

impl BeerRequest {
    /// ドメインオブジェクトに変換
    ///
    /// # Returns
    /// * `Ok(Beer)` - ID未採番のビール
    /// * `Err(DomainError::InvalidValue)` - 入力値が不正
    pub fn into_beer(self) -> Result<Beer, DomainError> {
        Beer::new(
            BeerName::new(self.name)?,
            Brand::new(self.brand)?,
            self.beer_type,
            self.max,
            self.quantity,
        )
    }
}

/// 在庫の追加・減算用のリクエストDTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantityRequest {
    pub quantity: u32,
}
