use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{Beer, BeerId, BeerName, BeerType, Brand};
use crate::domain::port::{BeerRepository, RepositoryError};
use async_trait::async_trait;

// MySQL関連のインポート
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, Pool, Row};

const SELECT_COLUMNS: &str = "SELECT id, name, brand, max_quantity, quantity, beer_type FROM beers";

/// MySQLビールリポジトリ
/// MySQLデータベースを使用してビールを永続化する
#[derive(Clone)]
pub struct MySqlBeerRepository {
    pool: Pool<MySql>,
}

impl MySqlBeerRepository {
    /// 新しいMySQLビールリポジトリを作成
    ///
    /// # Arguments
    /// * `pool` - MySQLコネクションプール
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    async fn insert(&self, beer: &Beer) -> Result<Beer, RepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO beers (name, brand, max_quantity, quantity, beer_type)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(beer.name().as_str())
        .bind(beer.brand().as_str())
        .bind(beer.max())
        .bind(beer.quantity())
        .bind(beer.beer_type().as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_sqlx("ビールの登録に失敗しました", e))?;

        let id = i64::try_from(result.last_insert_id()).map_err(|e| {
            RepositoryError::OperationFailed(format!("採番されたIDが不正です: {}", e))
        })?;
        Ok(beer.clone().with_id(BeerId::from_i64(id)))
    }

    async fn update(&self, id: BeerId, beer: &Beer) -> Result<Beer, RepositoryError> {
        // 存在しないIDの場合は指定IDで新規登録する
        sqlx::query(
            r#"
            INSERT INTO beers (id, name, brand, max_quantity, quantity, beer_type)
            VALUES (?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                name = VALUES(name),
                brand = VALUES(brand),
                max_quantity = VALUES(max_quantity),
                quantity = VALUES(quantity),
                beer_type = VALUES(beer_type)
            "#,
        )
        .bind(id.as_i64())
        .bind(beer.name().as_str())
        .bind(beer.brand().as_str())
        .bind(beer.max())
        .bind(beer.quantity())
        .bind(beer.beer_type().as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_sqlx("ビールの更新に失敗しました", e))?;

        Ok(beer.clone())
    }
}

fn fetch_failed(e: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::FetchFailed(format!("ビールの復元に失敗しました: {}", e))
}

/// 行データからビールを復元
fn beer_from_row(row: &MySqlRow) -> Result<Beer, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(fetch_failed)?;
    let name: String = row.try_get("name").map_err(fetch_failed)?;
    let brand: String = row.try_get("brand").map_err(fetch_failed)?;
    let max: u32 = row.try_get("max_quantity").map_err(fetch_failed)?;
    let quantity: u32 = row.try_get("quantity").map_err(fetch_failed)?;
    let beer_type: String = row.try_get("beer_type").map_err(fetch_failed)?;

    Beer::reconstruct(
        BeerId::from_i64(id),
        BeerName::new(name).map_err(fetch_failed)?,
        Brand::new(brand).map_err(fetch_failed)?,
        beer_type.parse::<BeerType>().map_err(fetch_failed)?,
        max,
        quantity,
    )
    .map_err(fetch_failed)
}

#[async_trait]
impl BeerRepository for MySqlBeerRepository {
    async fn find_by_id(&self, id: BeerId) -> Result<Option<Beer>, RepositoryError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_sqlx("ビールの取得に失敗しました", e))?;

        row.as_ref().map(beer_from_row).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Beer>, RepositoryError> {
        let row = sqlx::query(&format!("{} WHERE name = ?", SELECT_COLUMNS))
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_sqlx("ビールの取得に失敗しました", e))?;

        row.as_ref().map(beer_from_row).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Beer>, RepositoryError> {
        // IDの昇順で並べる
        let rows = sqlx::query(&format!("{} ORDER BY id ASC", SELECT_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_sqlx("ビール一覧の取得に失敗しました", e))?;

        rows.iter().map(beer_from_row).collect()
    }

    async fn save(&self, beer: &Beer) -> Result<Beer, RepositoryError> {
        match beer.id() {
            Some(id) => self.update(id, beer).await,
            None => self.insert(beer).await,
        }
    }

    async fn delete_by_id(&self, id: BeerId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM beers WHERE id = ?")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_sqlx("ビールの削除に失敗しました", e))?;

        Ok(())
    }
}
