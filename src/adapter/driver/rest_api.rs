use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::adapter::driver::request_dto::{BeerRequest, QuantityRequest};
use crate::adapter::driver::response_dto::BeerResponse;
use crate::application::service::BeerStockService;
use crate::application::ApplicationError;
use crate::domain::error::DomainError;
use crate::domain::model::BeerId;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

// アプリケーションサービスを含む状態
#[derive(Clone)]
pub struct AppState {
    pub beer_service: Arc<BeerStockService>,
}

// REST APIルーターを作成
// パスパラメータ :beer はGETでは名前、それ以外ではIDとして扱う
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/beers", get(list_beers).post(create_beer))
        .route(
            "/api/v1/beers/:beer",
            get(find_beer_by_name).delete(delete_beer_by_id),
        )
        .route("/api/v1/beers/:beer/increment", patch(increment_stock))
        .route("/api/v1/beers/:beer/decrement", patch(decrement_stock))
}

// 状態とCORSを適用したアプリケーションを作成
pub fn create_app(beer_service: Arc<BeerStockService>) -> Router {
    create_router()
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(AppState { beer_service })
}

// ヘルスチェックエンドポイント
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// ビール登録エンドポイント
async fn create_beer(
    State(state): State<AppState>,
    payload: Result<Json<BeerRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<BeerResponse>)> {
    let Json(request) = payload.map_err(map_json_rejection)?;
    let candidate = request.into_beer().map_err(map_domain_error)?;

    let created = state
        .beer_service
        .create_beer(candidate)
        .await
        .map_err(map_application_error)?;

    Ok((StatusCode::CREATED, Json(BeerResponse::from_beer(&created))))
}

// ビール一覧取得エンドポイント
async fn list_beers(State(state): State<AppState>) -> ApiResult<Json<Vec<BeerResponse>>> {
    let beers = state
        .beer_service
        .list_all()
        .await
        .map_err(map_application_error)?;

    Ok(Json(beers.iter().map(BeerResponse::from_beer).collect()))
}

// 名前でビールを取得するエンドポイント
async fn find_beer_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<BeerResponse>> {
    let beer = state
        .beer_service
        .find_by_name(&name)
        .await
        .map_err(map_application_error)?;

    Ok(Json(BeerResponse::from_beer(&beer)))
}

// ビール削除エンドポイント
async fn delete_beer_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_beer_id(&id)?;

    state
        .beer_service
        .delete_by_id(id)
        .await
        .map_err(map_application_error)?;

    Ok(StatusCode::NO_CONTENT)
}

// 在庫追加エンドポイント
async fn increment_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<QuantityRequest>, JsonRejection>,
) -> ApiResult<Json<BeerResponse>> {
    let id = parse_beer_id(&id)?;
    let Json(request) = payload.map_err(map_json_rejection)?;

    let beer = state
        .beer_service
        .increment(id, request.quantity)
        .await
        .map_err(map_application_error)?;

    Ok(Json(BeerResponse::from_beer(&beer)))
}

// 在庫減算エンドポイント
async fn decrement_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<QuantityRequest>, JsonRejection>,
) -> ApiResult<Json<BeerResponse>> {
    let id = parse_beer_id(&id)?;
    let Json(request) = payload.map_err(map_json_rejection)?;

    let beer = state
        .beer_service
        .decrement(id, request.quantity)
        .await
        .map_err(map_application_error)?;

    Ok(Json(BeerResponse::from_beer(&beer)))
}

fn api_error(status: StatusCode, error: String, code: &str) -> (StatusCode, Json<ApiError>) {
    (
        status,
        Json(ApiError {
            error,
            code: code.to_string(),
        }),
    )
}

fn parse_beer_id(raw: &str) -> ApiResult<BeerId> {
    BeerId::from_string(raw).map_err(|_| {
        api_error(
            StatusCode::BAD_REQUEST,
            format!("無効なビールID形式です: {}", raw),
            "INVALID_ID",
        )
    })
}

fn map_json_rejection(rejection: JsonRejection) -> (StatusCode, Json<ApiError>) {
    api_error(
        StatusCode::BAD_REQUEST,
        format!("無効なリクエストボディです: {}", rejection.body_text()),
        "INVALID_REQUEST",
    )
}

// アプリケーションエラーをHTTPエラーにマッピング
fn map_application_error(err: ApplicationError) -> (StatusCode, Json<ApiError>) {
    match err {
        ApplicationError::AlreadyRegistered(msg) => {
            api_error(StatusCode::BAD_REQUEST, msg, "BEER_ALREADY_REGISTERED")
        }
        ApplicationError::NotFound(msg) => api_error(StatusCode::NOT_FOUND, msg, "BEER_NOT_FOUND"),
        ApplicationError::StockExceeded(msg) => {
            api_error(StatusCode::BAD_REQUEST, msg, "BEER_STOCK_EXCEEDED")
        }
        ApplicationError::DomainError(domain_err) => map_domain_error(domain_err),
        ApplicationError::RepositoryError(repo_err) => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            repo_err.to_string(),
            "REPOSITORY_ERROR",
        ),
    }
}

// ドメインエラーを適切なHTTPステータスコードとエラーコードにマッピング
fn map_domain_error(domain_err: DomainError) -> (StatusCode, Json<ApiError>) {
    match domain_err {
        DomainError::InvalidValue(msg) => api_error(StatusCode::BAD_REQUEST, msg, "INVALID_VALUE"),
        err @ (DomainError::StockExceeded { .. } | DomainError::InsufficientStock { .. }) => {
            api_error(StatusCode::BAD_REQUEST, err.to_string(), "BEER_STOCK_EXCEEDED")
        }
    }
}
