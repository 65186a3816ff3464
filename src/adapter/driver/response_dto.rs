use crate::domain::model::{Beer, BeerType};
use serde::{Deserialize, Serialize};

/// ビール用のレスポンスDTO
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeerResponse {
    pub id: Option<i64>,
    pub name: String,
    pub brand: String,
    pub max: u32,
    pub quantity: u32,
    pub beer_type: BeerType,
}

impl BeerResponse {
    /// ドメインオブジェクトからBeerResponseを作成
    pub fn from_beer(beer: &Beer) -> Self {
        Self {
            id: beer.id().map(|id| id.as_i64()),
            name: beer.name().to_string(),
            brand: beer.brand().to_string(),
            max: beer.max(),
            quantity: beer.quantity(),
            beer_type: beer.beer_type(),
        }
    }
}
