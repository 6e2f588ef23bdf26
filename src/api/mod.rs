use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::env;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::db;
use crate::error::AppError;
use crate::models::{
    ApiResponse, Bracket, GameResult, LeaderboardEntry, Prediction, PredictionName,
};
use crate::services::results_fetcher::ResultsClient;
use crate::services::sync::{self, SyncSummary};
use crate::services::bracket;
use crate::utils::validate_prediction_name;

const MAX_PREDICTIONS_PER_OWNER: i64 = 5;

pub async fn serve(port: u16) -> anyhow::Result<()> {
    let pool = db::create_pool().await?;
    db::init_database_with_pool(&pool).await?;

    let app = create_router().with_state(pool);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Pick'em API server listening on port {}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

fn create_router() -> Router<SqlitePool> {
    Router::new()
        .route("/health", get(health_check))
        .route("/results", get(list_results_handler))
        .route("/leaderboard", get(leaderboard_handler))
        .route(
            "/predictions",
            get(list_predictions_handler).post(create_prediction_handler),
        )
        .route("/predictions/names", get(prediction_names_handler))
        .route(
            "/predictions/{id}",
            get(get_prediction_handler).delete(delete_prediction_handler),
        )
        .route("/sync", post(sync_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

// Health check endpoint
async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("Pick'em API is running"))
}

// GET /results - All stored game results, earliest first
async fn list_results_handler(
    State(pool): State<SqlitePool>,
) -> Result<Json<ApiResponse<Vec<GameResult>>>, AppError> {
    let results = db::get_all_results(&pool).await?;
    Ok(Json(ApiResponse::success(results)))
}

// GET /predictions?owner_id= - An owner's predictions, newest first
#[derive(Deserialize)]
struct OwnerQuery {
    owner_id: String,
}

async fn list_predictions_handler(
    State(pool): State<SqlitePool>,
    Query(params): Query<OwnerQuery>,
) -> Result<Json<ApiResponse<Vec<Prediction>>>, AppError> {
    let predictions = db::get_predictions_by_owner(&pool, &params.owner_id).await?;
    Ok(Json(ApiResponse::success(predictions)))
}

// POST /predictions - Submit a completed bracket
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePredictionRequest {
    owner_id: String,
    owner_label: String,
    name: String,
    bracket: Bracket,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePredictionResponse {
    prediction_id: String,
}

async fn create_prediction_handler(
    State(pool): State<SqlitePool>,
    Json(request): Json<CreatePredictionRequest>,
) -> Result<Json<ApiResponse<CreatePredictionResponse>>, AppError> {
    if request.owner_id.trim().is_empty() {
        return Err(AppError::Validation("owner id is required".to_string()));
    }
    if !validate_prediction_name(&request.name) {
        return Err(AppError::Validation(
            "prediction name must be non-empty and at most 60 characters".to_string(),
        ));
    }
    bracket::validate(&request.bracket)?;

    let name = request.name.trim().to_string();
    if db::prediction_name_taken(&pool, &request.owner_id, &name).await? {
        return Err(AppError::Validation(format!(
            "prediction name '{}' is already in use",
            name
        )));
    }
    if db::count_predictions_for_owner(&pool, &request.owner_id).await?
        >= MAX_PREDICTIONS_PER_OWNER
    {
        return Err(AppError::Validation(format!(
            "at most {} predictions per owner",
            MAX_PREDICTIONS_PER_OWNER
        )));
    }

    let mut bracket_doc = request.bracket;
    bracket::assign_bowl_titles(&mut bracket_doc);

    let now = Utc::now();
    let prediction = Prediction {
        id: Uuid::new_v4().to_string(),
        owner_id: request.owner_id,
        owner_label: request.owner_label,
        name,
        bracket: bracket_doc,
        score: 0,
        created_at: now,
        updated_at: now,
    };
    db::insert_prediction(&pool, &prediction).await?;

    tracing::info!(
        "Stored prediction {} for owner {}",
        prediction.id,
        prediction.owner_id
    );
    Ok(Json(ApiResponse::success(CreatePredictionResponse {
        prediction_id: prediction.id,
    })))
}

// GET /predictions/names - Display names of every prediction
async fn prediction_names_handler(
    State(pool): State<SqlitePool>,
) -> Result<Json<ApiResponse<Vec<PredictionName>>>, AppError> {
    let names = db::get_prediction_names(&pool).await?;
    Ok(Json(ApiResponse::success(names)))
}

// GET /predictions/{id} - A single prediction
async fn get_prediction_handler(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Prediction>>, AppError> {
    match db::get_prediction_by_id(&pool, &id).await? {
        Some(prediction) => Ok(Json(ApiResponse::success(prediction))),
        None => Err(AppError::NotFound(format!("prediction {}", id))),
    }
}

// DELETE /predictions/{id}?owner_id= - Delete one of your own predictions
async fn delete_prediction_handler(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
    Query(params): Query<OwnerQuery>,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    let removed = db::delete_prediction(&pool, &id, &params.owner_id).await?;
    if removed == 0 {
        return Err(AppError::NotFound(format!(
            "prediction {} for this owner",
            id
        )));
    }
    Ok(Json(ApiResponse::success("deleted")))
}

// GET /leaderboard - Ranked standings with pagination
#[derive(Deserialize)]
struct LeaderboardQuery {
    page: Option<i64>,
    limit: Option<i64>,
}

#[derive(Serialize)]
struct Pagination {
    page: i64,
    limit: i64,
    total: i64,
    total_pages: i64,
}

#[derive(Serialize)]
struct LeaderboardResponse {
    leaderboard: Vec<LeaderboardEntry>,
    pagination: Pagination,
}

async fn leaderboard_handler(
    State(pool): State<SqlitePool>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<Json<ApiResponse<LeaderboardResponse>>, AppError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(50).clamp(1, 100);
    let offset = (page - 1) * limit;

    let predictions = db::get_leaderboard_page(&pool, limit, offset).await?;
    let total = db::count_predictions(&pool).await?;

    let leaderboard = predictions
        .into_iter()
        .enumerate()
        .map(|(i, p)| LeaderboardEntry {
            rank: offset + i as i64 + 1,
            id: p.id,
            owner_label: p.owner_label,
            name: p.name,
            score: p.score,
            created_at: p.created_at,
        })
        .collect();

    Ok(Json(ApiResponse::success(LeaderboardResponse {
        leaderboard,
        pagination: Pagination {
            page,
            limit,
            total,
            total_pages: (total + limit - 1) / limit,
        },
    })))
}

// POST /sync - Trigger a reconciliation run
async fn sync_handler(State(pool): State<SqlitePool>, headers: HeaderMap) -> Response {
    if !sync_authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<()>::error("Unauthorized".to_string())),
        )
            .into_response();
    }

    let client = ResultsClient::from_env();
    let year = Utc::now().year();

    match sync::run(&pool, &client, year).await {
        Ok(summary) => Json(ApiResponse::<SyncSummary>::success(summary)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// When SYNC_SECRET is set, the caller must present it as a bearer token.
fn sync_authorized(headers: &HeaderMap) -> bool {
    match env::var("SYNC_SECRET") {
        Ok(secret) if !secret.is_empty() => headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v == format!("Bearer {}", secret))
            .unwrap_or(false),
        _ => true,
    }
}
