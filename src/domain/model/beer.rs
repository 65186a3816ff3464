use crate::domain::error::DomainError;
use crate::domain::model::{BeerId, BeerName, BeerType, Brand};

/// ビール集約
/// 在庫数と最大在庫数を管理する
/// 不変条件: 0 <= quantity <= max
#[derive(Debug, Clone, PartialEq)]
pub struct Beer {
    id: Option<BeerId>,
    name: BeerName,
    brand: Brand,
    beer_type: BeerType,
    max: u32,
    quantity: u32,
}

impl Beer {
    /// 未登録（ID未採番）のビールを作成
    ///
    /// # Arguments
    /// * `name` - ビール名
    /// * `brand` - ブランド
    /// * `beer_type` - ビールの種類
    /// * `max` - 最大在庫数（1以上）
    /// * `quantity` - 初期在庫数（max以下）
    ///
    /// # Returns
    /// * `Ok(Beer)` - 作成成功
    /// * `Err(DomainError::InvalidValue)` - 最大在庫数・在庫数が不正
    pub fn new(
        name: BeerName,
        brand: Brand,
        beer_type: BeerType,
        max: u32,
        quantity: u32,
    ) -> Result<Self, DomainError> {
        if max == 0 {
            return Err(DomainError::InvalidValue(
                "max must be greater than zero".to_string(),
            ));
        }
        if quantity > max {
            return Err(DomainError::InvalidValue(format!(
                "quantity {} must not exceed max {}",
                quantity, max
            )));
        }
        Ok(Self {
            id: None,
            name,
            brand,
            beer_type,
            max,
            quantity,
        })
    }

    /// 永続化済みのデータからビールを復元
    /// リポジトリ実装から使用する
    pub fn reconstruct(
        id: BeerId,
        name: BeerName,
        brand: Brand,
        beer_type: BeerType,
        max: u32,
        quantity: u32,
    ) -> Result<Self, DomainError> {
        Self::new(name, brand, beer_type, max, quantity).map(|beer| beer.with_id(id))
    }

    /// IDを付与したビールを返す
    /// ストアが採番したIDを設定するために使用する
    pub fn with_id(mut self, id: BeerId) -> Self {
        self.id = Some(id);
        self
    }

    /// IDを外した登録候補を返す
    pub fn without_id(mut self) -> Self {
        self.id = None;
        self
    }

    pub fn id(&self) -> Option<BeerId> {
        self.id
    }

    pub fn name(&self) -> &BeerName {
        &self.name
    }

    pub fn brand(&self) -> &Brand {
        &self.brand
    }

    pub fn beer_type(&self) -> BeerType {
        self.beer_type
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// 在庫を追加する
    /// 追加後の在庫数がちょうど最大在庫数になる場合は成功する
    ///
    /// # Arguments
    /// * `amount` - 追加する数量（0は何もしない）
    ///
    /// # Returns
    /// * `Ok(())` - 追加成功
    /// * `Err(DomainError::StockExceeded)` - 最大在庫数を超える（在庫数は変わらない）
    pub fn increment(&mut self, amount: u32) -> Result<(), DomainError> {
        if !self.has_capacity_for(amount) {
            return Err(DomainError::StockExceeded {
                quantity: self.quantity,
                requested: amount,
                max: self.max,
            });
        }
        self.quantity += amount;
        Ok(())
    }

    /// 在庫を減らす
    /// 在庫数がちょうど0になる場合は成功する
    ///
    /// # Returns
    /// * `Ok(())` - 減算成功
    /// * `Err(DomainError::InsufficientStock)` - 在庫数が0未満になる（在庫数は変わらない）
    pub fn decrement(&mut self, amount: u32) -> Result<(), DomainError> {
        match self.quantity.checked_sub(amount) {
            Some(new_quantity) => {
                self.quantity = new_quantity;
                Ok(())
            }
            None => Err(DomainError::InsufficientStock {
                quantity: self.quantity,
                requested: amount,
            }),
        }
    }

    /// 指定された数量を追加できるかチェック
    pub fn has_capacity_for(&self, amount: u32) -> bool {
        self.quantity
            .checked_add(amount)
            .is_some_and(|new_quantity| new_quantity <= self.max)
    }
}
