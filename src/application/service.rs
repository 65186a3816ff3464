use crate::application::ApplicationError;
use crate::domain::model::{Beer, BeerId};
use crate::domain::port::{BeerRepository, Logger};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

const COMPONENT: &str = "BeerStockService";

/// ビール在庫アプリケーションサービス
///
/// 読み取り→検証→書き込みの流れを、登録は登録用ロックで、
/// 在庫操作と削除はビールIDごとのロックで直列化する
pub struct BeerStockService {
    beer_repository: Arc<dyn BeerRepository>,
    logger: Arc<dyn Logger>,
    registration_lock: Mutex<()>,
    stock_locks: Mutex<HashMap<BeerId, Arc<Mutex<()>>>>,
}

impl BeerStockService {
    /// 新しいビール在庫サービスを作成
    ///
    /// # Arguments
    /// * `beer_repository` - ビールリポジトリ
    /// * `logger` - ロガー
    pub fn new(beer_repository: Arc<dyn BeerRepository>, logger: Arc<dyn Logger>) -> Self {
        Self {
            beer_repository,
            logger,
            registration_lock: Mutex::new(()),
            stock_locks: Mutex::new(HashMap::new()),
        }
    }

    /// ビールを登録する
    /// 渡されたビールのIDは無視され、ストアが採番する
    ///
    /// # Arguments
    /// * `candidate` - 登録するビール
    ///
    /// # Returns
    /// * `Ok(Beer)` - 登録されたビール（ID採番済み）
    /// * `Err(ApplicationError::AlreadyRegistered)` - 同名のビールが登録済み
    /// * `Err(ApplicationError)` - 登録失敗
    pub async fn create_beer(&self, candidate: Beer) -> Result<Beer, ApplicationError> {
        let correlation_id = Uuid::new_v4();
        let _guard = self.registration_lock.lock().await;

        let name = candidate.name().as_str().to_string();
        if self.beer_repository.find_by_name(&name).await?.is_some() {
            self.logger.warn(
                COMPONENT,
                "Beer registration rejected: name already registered",
                Some(correlation_id),
                Some(context(&[("name", name.clone())])),
            );
            return Err(ApplicationError::AlreadyRegistered(format!(
                "ビールは既に登録されています: {}",
                name
            )));
        }

        let saved = self.beer_repository.save(&candidate.without_id()).await?;
        self.logger.info(
            COMPONENT,
            "Beer registered",
            Some(correlation_id),
            Some(context(&[
                ("beer_id", display_id(&saved)),
                ("name", name),
                ("quantity", saved.quantity().to_string()),
                ("max", saved.max().to_string()),
            ])),
        );
        Ok(saved)
    }

    /// 名前でビールを取得
    ///
    /// # Returns
    /// * `Ok(Beer)` - ビールが見つかった
    /// * `Err(ApplicationError::NotFound)` - ビールが見つからなかった
    pub async fn find_by_name(&self, name: &str) -> Result<Beer, ApplicationError> {
        // 登録時と同じく前後の空白を除いて照合する
        let name = name.trim();
        self.beer_repository
            .find_by_name(name)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("ビールが見つかりません: name={}", name))
            })
    }

    /// すべてのビールを取得
    /// ストアが返す順序（IDの昇順）で返す
    pub async fn list_all(&self) -> Result<Vec<Beer>, ApplicationError> {
        self.beer_repository
            .find_all()
            .await
            .map_err(ApplicationError::from)
    }

    /// IDでビールを削除
    /// ビールが存在しない場合は削除を実行しない
    ///
    /// # Returns
    /// * `Ok(())` - 削除成功
    /// * `Err(ApplicationError::NotFound)` - ビールが見つからなかった
    /// * `Err(ApplicationError::RepositoryError)` - 削除失敗
    pub async fn delete_by_id(&self, id: BeerId) -> Result<(), ApplicationError> {
        let correlation_id = Uuid::new_v4();
        let lock = self.stock_lock(id).await;
        let result = {
            let _guard = lock.lock().await;
            self.delete_existing(id).await
        };
        self.release_stock_lock(id, lock).await;
        result?;

        self.logger.info(
            COMPONENT,
            "Beer deleted",
            Some(correlation_id),
            Some(context(&[("beer_id", id.to_string())])),
        );
        Ok(())
    }

    /// 在庫を追加する
    /// 追加後の在庫数が最大在庫数ちょうどになる場合は成功する
    ///
    /// # Arguments
    /// * `id` - ビールID
    /// * `amount` - 追加する数量（0は在庫数を変えずに保存する）
    ///
    /// # Returns
    /// * `Ok(Beer)` - 在庫追加後のビール
    /// * `Err(ApplicationError::NotFound)` - ビールが見つからなかった
    /// * `Err(ApplicationError::StockExceeded)` - 最大在庫数を超える（保存しない）
    pub async fn increment(&self, id: BeerId, amount: u32) -> Result<Beer, ApplicationError> {
        let lock = self.stock_lock(id).await;
        let result = {
            let _guard = lock.lock().await;
            self.increment_existing(id, amount).await
        };
        self.release_stock_lock(id, lock).await;
        result
    }

    async fn increment_existing(&self, id: BeerId, amount: u32) -> Result<Beer, ApplicationError> {
        let correlation_id = Uuid::new_v4();
        let mut beer = self.find_existing(id).await?;
        if let Err(err) = beer.increment(amount) {
            self.logger.warn(
                COMPONENT,
                "Stock increment rejected",
                Some(correlation_id),
                Some(context(&[
                    ("beer_id", id.to_string()),
                    ("reason", err.to_string()),
                ])),
            );
            return Err(err.into());
        }

        let saved = self.beer_repository.save(&beer).await?;
        self.logger.info(
            COMPONENT,
            "Stock incremented",
            Some(correlation_id),
            Some(context(&[
                ("beer_id", id.to_string()),
                ("amount", amount.to_string()),
                ("quantity", saved.quantity().to_string()),
            ])),
        );
        Ok(saved)
    }

    /// 在庫を減らす
    /// 在庫数がちょうど0になる場合は成功する
    ///
    /// # Returns
    /// * `Ok(Beer)` - 在庫減算後のビール
    /// * `Err(ApplicationError::NotFound)` - ビールが見つからなかった
    /// * `Err(ApplicationError::StockExceeded)` - 在庫数が0未満になる（保存しない）
    pub async fn decrement(&self, id: BeerId, amount: u32) -> Result<Beer, ApplicationError> {
        let lock = self.stock_lock(id).await;
        let result = {
            let _guard = lock.lock().await;
            self.decrement_existing(id, amount).await
        };
        self.release_stock_lock(id, lock).await;
        result
    }

    async fn decrement_existing(&self, id: BeerId, amount: u32) -> Result<Beer, ApplicationError> {
        let correlation_id = Uuid::new_v4();
        let mut beer = self.find_existing(id).await?;
        if let Err(err) = beer.decrement(amount) {
            self.logger.warn(
                COMPONENT,
                "Stock decrement rejected",
                Some(correlation_id),
                Some(context(&[
                    ("beer_id", id.to_string()),
                    ("reason", err.to_string()),
                ])),
            );
            return Err(err.into());
        }

        let saved = self.beer_repository.save(&beer).await?;
        self.logger.info(
            COMPONENT,
            "Stock decremented",
            Some(correlation_id),
            Some(context(&[
                ("beer_id", id.to_string()),
                ("amount", amount.to_string()),
                ("quantity", saved.quantity().to_string()),
            ])),
        );
        Ok(saved)
    }

    async fn find_existing(&self, id: BeerId) -> Result<Beer, ApplicationError> {
        self.beer_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("ビールが見つかりません: id={}", id)))
    }

    async fn delete_existing(&self, id: BeerId) -> Result<(), ApplicationError> {
        self.find_existing(id).await?;
        self.beer_repository.delete_by_id(id).await?;
        Ok(())
    }

    async fn stock_lock(&self, id: BeerId) -> Arc<Mutex<()>> {
        let mut locks = self.stock_locks.lock().await;
        locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 使い終わったロックを返却する
    /// マップ以外に保持者がいなければエントリを削除する
    async fn release_stock_lock(&self, id: BeerId, lock: Arc<Mutex<()>>) {
        let mut locks = self.stock_locks.lock().await;
        // マップのロック中に手放す（複製もマップのロック中にしか行われない）
        drop(lock);
        if locks
            .get(&id)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            locks.remove(&id);
        }
    }
}

fn context(pairs: &[(&str, String)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

fn display_id(beer: &Beer) -> String {
    beer.id().map(|id| id.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::driven::{ConsoleLogger, InMemoryBeerRepository};
    use crate::domain::model::{BeerName, BeerType, Brand};
    use crate::domain::port::RepositoryError;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::Mutex as StdMutex;

    const INVALID_BEER_ID: i64 = 1;

    // テスト用のビールを作成（Brahma / Ambev / max=50 / quantity=10）
    fn default_beer() -> Beer {
        beer_with("Brahma", 50, 10)
    }

    fn beer_with(name: &str, max: u32, quantity: u32) -> Beer {
        Beer::new(
            BeerName::new(name).unwrap(),
            Brand::new("Ambev").unwrap(),
            BeerType::Lager,
            max,
            quantity,
        )
        .unwrap()
    }

    #[derive(Default)]
    struct CallCounts {
        find_by_id: usize,
        find_by_name: usize,
        find_all: usize,
        save: usize,
        delete_by_id: usize,
    }

    // テスト用のモックリポジトリ
    // 呼び出し回数を記録する
    struct MockBeerRepository {
        beers: StdMutex<BTreeMap<BeerId, Beer>>,
        next_id: StdMutex<i64>,
        calls: StdMutex<CallCounts>,
        fail_delete: bool,
    }

    impl MockBeerRepository {
        fn new() -> Self {
            Self {
                beers: StdMutex::new(BTreeMap::new()),
                next_id: StdMutex::new(1),
                calls: StdMutex::new(CallCounts::default()),
                fail_delete: false,
            }
        }

        fn failing_delete() -> Self {
            Self {
                fail_delete: true,
                ..Self::new()
            }
        }

        fn add_beer(&self, beer: Beer) -> Beer {
            let mut next_id = self.next_id.lock().unwrap();
            let stored = beer.with_id(BeerId::from_i64(*next_id));
            *next_id += 1;
            self.beers
                .lock()
                .unwrap()
                .insert(stored.id().unwrap(), stored.clone());
            stored
        }

        fn stored(&self, id: BeerId) -> Option<Beer> {
            self.beers.lock().unwrap().get(&id).cloned()
        }

        fn save_calls(&self) -> usize {
            self.calls.lock().unwrap().save
        }
    }

    #[async_trait]
    impl BeerRepository for MockBeerRepository {
        async fn find_by_id(&self, id: BeerId) -> Result<Option<Beer>, RepositoryError> {
            self.calls.lock().unwrap().find_by_id += 1;
            Ok(self.beers.lock().unwrap().get(&id).cloned())
        }

        async fn find_by_name(&self, name: &str) -> Result<Option<Beer>, RepositoryError> {
            self.calls.lock().unwrap().find_by_name += 1;
            let beers = self.beers.lock().unwrap();
            Ok(beers
                .values()
                .find(|beer| beer.name().as_str() == name)
                .cloned())
        }

        async fn find_all(&self) -> Result<Vec<Beer>, RepositoryError> {
            self.calls.lock().unwrap().find_all += 1;
            Ok(self.beers.lock().unwrap().values().cloned().collect())
        }

        async fn save(&self, beer: &Beer) -> Result<Beer, RepositoryError> {
            self.calls.lock().unwrap().save += 1;
            let stored = match beer.id() {
                Some(_) => beer.clone(),
                None => {
                    let mut next_id = self.next_id.lock().unwrap();
                    let id = BeerId::from_i64(*next_id);
                    *next_id += 1;
                    beer.clone().with_id(id)
                }
            };
            if let Some(id) = stored.id() {
                self.beers.lock().unwrap().insert(id, stored.clone());
            }
            Ok(stored)
        }

        async fn delete_by_id(&self, id: BeerId) -> Result<(), RepositoryError> {
            self.calls.lock().unwrap().delete_by_id += 1;
            if self.fail_delete {
                return Err(RepositoryError::OperationFailed("delete failed".to_string()));
            }
            self.beers.lock().unwrap().remove(&id);
            Ok(())
        }
    }

    fn service_with(repository: Arc<MockBeerRepository>) -> BeerStockService {
        BeerStockService::new(repository, Arc::new(ConsoleLogger::new()))
    }

    #[tokio::test]
    async fn test_create_beer_success() {
        let repository = Arc::new(MockBeerRepository::new());
        let service = service_with(repository.clone());

        let expected = default_beer();
        let created = service.create_beer(expected.clone()).await.unwrap();

        assert!(created.id().is_some());
        assert_eq!(created.name(), expected.name());
        assert_eq!(created.quantity(), expected.quantity());
        assert!(created.quantity() > 2);
        assert_eq!(repository.save_calls(), 1);
    }

    #[tokio::test]
    async fn test_create_beer_ignores_candidate_id() {
        let repository = Arc::new(MockBeerRepository::new());
        repository.add_beer(beer_with("Skol", 50, 0));
        let service = service_with(repository.clone());

        // 既存ビールと同じIDを持つ候補でも上書きせず新規に採番する
        let candidate = default_beer().with_id(BeerId::from_i64(1));
        let created = service.create_beer(candidate).await.unwrap();

        assert_eq!(created.id(), Some(BeerId::from_i64(2)));
        assert_eq!(
            repository.stored(BeerId::from_i64(1)).unwrap().name().as_str(),
            "Skol"
        );
    }

    #[tokio::test]
    async fn test_create_already_registered_beer() {
        let repository = Arc::new(MockBeerRepository::new());
        repository.add_beer(default_beer());
        let service = service_with(repository.clone());

        let result = service.create_beer(default_beer()).await;

        assert!(matches!(result, Err(ApplicationError::AlreadyRegistered(_))));
        assert_eq!(repository.calls.lock().unwrap().find_by_name, 1);
        assert_eq!(repository.save_calls(), 0);
    }

    #[tokio::test]
    async fn test_find_by_name_found() {
        let repository = Arc::new(MockBeerRepository::new());
        let stored = repository.add_beer(default_beer());
        let service = service_with(repository);

        let found = service.find_by_name("Brahma").await.unwrap();
        assert_eq!(found, stored);
    }

    #[tokio::test]
    async fn test_find_by_name_ignores_surrounding_whitespace() {
        let repository = Arc::new(MockBeerRepository::new());
        let stored = repository.add_beer(default_beer());
        let service = service_with(repository);

        let found = service.find_by_name("  Brahma ").await.unwrap();
        assert_eq!(found, stored);
    }

    #[tokio::test]
    async fn test_find_by_name_not_found() {
        let repository = Arc::new(MockBeerRepository::new());
        let service = service_with(repository);

        let result = service.find_by_name("Brahma").await;
        assert!(matches!(result, Err(ApplicationError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_all_returns_beers() {
        let repository = Arc::new(MockBeerRepository::new());
        let stored = repository.add_beer(default_beer());
        let service = service_with(repository.clone());

        let beers = service.list_all().await.unwrap();
        assert_eq!(repository.calls.lock().unwrap().find_all, 1);
        assert_eq!(beers.len(), 1);
        assert_eq!(beers[0], stored);
    }

    #[tokio::test]
    async fn test_list_all_empty() {
        let repository = Arc::new(MockBeerRepository::new());
        let service = service_with(repository);

        let beers = service.list_all().await.unwrap();
        assert!(beers.is_empty());
    }

    #[tokio::test]
    async fn test_delete_by_id_success() {
        let repository = Arc::new(MockBeerRepository::new());
        let stored = repository.add_beer(default_beer());
        let id = stored.id().unwrap();
        let service = service_with(repository.clone());

        service.delete_by_id(id).await.unwrap();

        let calls = repository.calls.lock().unwrap();
        assert_eq!(calls.find_by_id, 1);
        assert_eq!(calls.delete_by_id, 1);
        drop(calls);
        assert!(repository.stored(id).is_none());
    }

    #[tokio::test]
    async fn test_delete_by_id_not_found() {
        let repository = Arc::new(MockBeerRepository::new());
        let service = service_with(repository.clone());

        let result = service.delete_by_id(BeerId::from_i64(INVALID_BEER_ID)).await;

        assert!(matches!(result, Err(ApplicationError::NotFound(_))));
        assert_eq!(repository.calls.lock().unwrap().delete_by_id, 0);
    }

    #[tokio::test]
    async fn test_delete_by_id_propagates_repository_error() {
        let repository = Arc::new(MockBeerRepository::failing_delete());
        let stored = repository.add_beer(default_beer());
        let service = service_with(repository);

        let result = service.delete_by_id(stored.id().unwrap()).await;
        assert!(matches!(
            result,
            Err(ApplicationError::RepositoryError(RepositoryError::OperationFailed(_)))
        ));
    }

    #[tokio::test]
    async fn test_increment_success() {
        let repository = Arc::new(MockBeerRepository::new());
        let stored = repository.add_beer(default_beer());
        let service = service_with(repository.clone());

        let quantity_to_increment = 10;
        let expected_quantity = stored.quantity() + quantity_to_increment;

        let incremented = service
            .increment(stored.id().unwrap(), quantity_to_increment)
            .await
            .unwrap();

        assert_eq!(incremented.quantity(), expected_quantity);
        assert!(expected_quantity < stored.max());
        assert_eq!(repository.save_calls(), 1);
    }

    #[tokio::test]
    async fn test_increment_to_exact_max() {
        let repository = Arc::new(MockBeerRepository::new());
        let stored = repository.add_beer(default_beer());
        let service = service_with(repository);

        let incremented = service.increment(stored.id().unwrap(), 40).await.unwrap();
        assert_eq!(incremented.quantity(), 50);
    }

    #[tokio::test]
    async fn test_increment_zero_still_saves() {
        let repository = Arc::new(MockBeerRepository::new());
        let stored = repository.add_beer(default_beer());
        let service = service_with(repository.clone());

        let incremented = service.increment(stored.id().unwrap(), 0).await.unwrap();
        assert_eq!(incremented.quantity(), 10);
        assert_eq!(repository.save_calls(), 1);
    }

    #[tokio::test]
    async fn test_increment_greater_than_max() {
        let repository = Arc::new(MockBeerRepository::new());
        let stored = repository.add_beer(default_beer());
        let id = stored.id().unwrap();
        let service = service_with(repository.clone());

        let result = service.increment(id, 80).await;

        assert!(matches!(result, Err(ApplicationError::StockExceeded(_))));
        assert_eq!(repository.save_calls(), 0);
        assert_eq!(repository.stored(id).unwrap().quantity(), 10);
    }

    #[tokio::test]
    async fn test_increment_after_sum_greater_than_max() {
        let repository = Arc::new(MockBeerRepository::new());
        let stored = repository.add_beer(default_beer());
        let service = service_with(repository.clone());

        let result = service.increment(stored.id().unwrap(), 45).await;

        assert!(matches!(result, Err(ApplicationError::StockExceeded(_))));
        assert_eq!(repository.save_calls(), 0);
    }

    #[tokio::test]
    async fn test_increment_with_invalid_id() {
        let repository = Arc::new(MockBeerRepository::new());
        let service = service_with(repository);

        let result = service
            .increment(BeerId::from_i64(INVALID_BEER_ID), 10)
            .await;
        assert!(matches!(result, Err(ApplicationError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_decrement_success() {
        let repository = Arc::new(MockBeerRepository::new());
        let stored = repository.add_beer(default_beer());
        let service = service_with(repository);

        let decremented = service.decrement(stored.id().unwrap(), 5).await.unwrap();
        assert_eq!(decremented.quantity(), 5);
    }

    #[tokio::test]
    async fn test_decrement_to_empty_stock() {
        let repository = Arc::new(MockBeerRepository::new());
        let stored = repository.add_beer(default_beer());
        let service = service_with(repository);

        let decremented = service.decrement(stored.id().unwrap(), 10).await.unwrap();
        assert_eq!(decremented.quantity(), 0);
    }

    #[tokio::test]
    async fn test_decrement_lower_than_zero() {
        let repository = Arc::new(MockBeerRepository::new());
        let stored = repository.add_beer(default_beer());
        let service = service_with(repository.clone());

        let result = service.decrement(stored.id().unwrap(), 80).await;

        assert!(matches!(result, Err(ApplicationError::StockExceeded(_))));
        assert_eq!(repository.save_calls(), 0);
    }

    #[tokio::test]
    async fn test_decrement_with_invalid_id() {
        let repository = Arc::new(MockBeerRepository::new());
        let service = service_with(repository);

        let result = service
            .decrement(BeerId::from_i64(INVALID_BEER_ID), 10)
            .await;
        assert!(matches!(result, Err(ApplicationError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_stock_locks_released_after_missing_ids() {
        let repository = Arc::new(MockBeerRepository::new());
        let service = service_with(repository);

        for i in 0..200 {
            let id = BeerId::from_i64(i);
            assert!(matches!(
                service.increment(id, 1).await,
                Err(ApplicationError::NotFound(_))
            ));
            assert!(matches!(
                service.decrement(id, 1).await,
                Err(ApplicationError::NotFound(_))
            ));
            assert!(matches!(
                service.delete_by_id(id).await,
                Err(ApplicationError::NotFound(_))
            ));
        }

        assert_eq!(service.stock_locks.lock().await.len(), 0);
    }

    #[tokio::test]
    async fn test_stock_locks_released_after_stock_operations() {
        let repository = Arc::new(MockBeerRepository::new());
        let stored = repository.add_beer(default_beer());
        let id = stored.id().unwrap();
        let service = service_with(repository);

        service.increment(id, 5).await.unwrap();
        assert!(service.increment(id, 80).await.is_err());
        service.decrement(id, 5).await.unwrap();
        assert!(service.decrement(id, 80).await.is_err());
        service.delete_by_id(id).await.unwrap();

        assert_eq!(service.stock_locks.lock().await.len(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_never_exceed_max() {
        let repository = Arc::new(InMemoryBeerRepository::new());
        let stored = repository.save(&default_beer()).await.unwrap();
        let id = stored.id().unwrap();
        let service = Arc::new(BeerStockService::new(
            repository.clone(),
            Arc::new(ConsoleLogger::new()),
        ));

        // 10 + 5 * 8 = 50 なので成功するのは8件のみ
        let mut handles = Vec::new();
        for _ in 0..20 {
            let service = service.clone();
            handles.push(tokio::spawn(async move { service.increment(id, 5).await }));
        }

        let mut succeeded = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => succeeded += 1,
                Err(ApplicationError::StockExceeded(_)) => {}
                Err(other) => panic!("unexpected error: {}", other),
            }
        }

        assert_eq!(succeeded, 8);
        let beer = repository.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(beer.quantity(), 50);
        assert_eq!(service.stock_locks.lock().await.len(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registrations_of_same_name() {
        let repository = Arc::new(InMemoryBeerRepository::new());
        let service = Arc::new(BeerStockService::new(
            repository.clone(),
            Arc::new(ConsoleLogger::new()),
        ));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let service = service.clone();
            handles.push(tokio::spawn(
                async move { service.create_beer(default_beer()).await },
            ));
        }

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(repository.find_all().await.unwrap().len(), 1);
    }
}
