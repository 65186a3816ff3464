use crate::domain::model::{Beer, BeerId};
use crate::domain::port::{BeerRepository, RepositoryError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Store {
    beers: BTreeMap<BeerId, Beer>,
    last_id: i64,
}

/// インメモリビールリポジトリ
/// プロセス内にビールを保持する（テストおよびデータベースなしでの起動用）
/// IDは1からの連番で採番し、削除後も再利用しない
#[derive(Default)]
pub struct InMemoryBeerRepository {
    store: RwLock<Store>,
}

impl InMemoryBeerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BeerRepository for InMemoryBeerRepository {
    async fn find_by_id(&self, id: BeerId) -> Result<Option<Beer>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store.beers.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Beer>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store
            .beers
            .values()
            .find(|beer| beer.name().as_str() == name)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<Beer>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store.beers.values().cloned().collect())
    }

    async fn save(&self, beer: &Beer) -> Result<Beer, RepositoryError> {
        let mut store = self.store.write().await;
        let id = match beer.id() {
            Some(id) => {
                // 外部で採番されたIDを受け入れた場合も、以降の採番と衝突させない
                store.last_id = store.last_id.max(id.as_i64());
                id
            }
            None => {
                store.last_id += 1;
                BeerId::from_i64(store.last_id)
            }
        };
        let stored = beer.clone().with_id(id);
        store.beers.insert(id, stored.clone());
        Ok(stored)
    }

    async fn delete_by_id(&self, id: BeerId) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        store.beers.remove(&id);
        Ok(())
    }
}
