// 出力ポート
// ドメイン層が外部に依存する機能をトレイトとして定義
// アダプター層でこれらのトレイトを実装する

use crate::domain::model::{Beer, BeerId};
use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

/// ログレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// ロガートレイト
/// ログ出力を抽象化するポート
pub trait Logger: Send + Sync {
    /// デバッグレベルのログを出力
    fn debug(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );

    /// 情報レベルのログを出力
    fn info(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );

    /// 警告レベルのログを出力
    fn warn(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );

    /// エラーレベルのログを出力
    fn error(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );
}

/// リポジトリエラー型
/// リポジトリ操作で発生するエラーを表現する
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[allow(clippy::enum_variant_names)]
pub enum RepositoryError {
    /// データベース接続に失敗
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// 操作に失敗
    #[error("Operation failed: {0}")]
    OperationFailed(String),
    /// データの取得に失敗
    #[error("Fetch failed: {0}")]
    FetchFailed(String),
}

/// ビールリポジトリトレイト
/// ビール集約の永続化を抽象化する
/// 名前の一意性はサービス側で保証する
#[async_trait]
pub trait BeerRepository: Send + Sync {
    /// IDでビールを検索する
    ///
    /// # Returns
    /// * `Ok(Some(Beer))` - ビールが見つかった
    /// * `Ok(None)` - ビールが見つからなかった
    /// * `Err(RepositoryError)` - 検索失敗
    async fn find_by_id(&self, id: BeerId) -> Result<Option<Beer>, RepositoryError>;

    /// 名前でビールを検索する
    ///
    /// # Returns
    /// * `Ok(Some(Beer))` - ビールが見つかった
    /// * `Ok(None)` - ビールが見つからなかった
    /// * `Err(RepositoryError)` - 検索失敗
    async fn find_by_name(&self, name: &str) -> Result<Option<Beer>, RepositoryError>;

    /// すべてのビールを取得する
    /// IDの昇順で並べて返す
    async fn find_all(&self) -> Result<Vec<Beer>, RepositoryError>;

    /// ビールを保存する
    /// IDが未採番なら新規登録、採番済みなら更新する
    ///
    /// # Arguments
    /// * `beer` - 保存するビール
    ///
    /// # Returns
    /// * `Ok(Beer)` - 保存されたビール（IDは必ず設定済み）
    /// * `Err(RepositoryError)` - 保存失敗
    async fn save(&self, beer: &Beer) -> Result<Beer, RepositoryError>;

    /// IDでビールを削除する
    async fn delete_by_id(&self, id: BeerId) -> Result<(), RepositoryError>;
}
