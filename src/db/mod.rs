pub mod seed;
pub use seed::seed_data;

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteConnectOptions, Row, SqlitePool};
use std::env;
use std::str::FromStr;

use crate::error::AppError;
use crate::models::{GameResult, Prediction, PredictionName, Round};

pub async fn create_pool() -> Result<SqlitePool, AppError> {
    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:data/pickem.db".to_string());

    // Strip the "sqlite:" prefix to get the file path, create parent dir if needed
    let file_path = database_url
        .strip_prefix("sqlite:///")
        .or_else(|| database_url.strip_prefix("sqlite://"))
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(&database_url);

    if let Some(parent) = std::path::Path::new(file_path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.ok();
        }
    }

    let options = SqliteConnectOptions::from_str(&database_url)?.create_if_missing(true);

    let pool = SqlitePool::connect_with(options).await?;
    Ok(pool)
}

/// Called from the CLI where no pool exists yet.
pub async fn init_database() -> Result<(), AppError> {
    let pool = create_pool().await?;
    init_database_with_pool(&pool).await
}

/// Called from the server so schema creation shares the main pool.
pub async fn init_database_with_pool(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS game_results (
            game_id TEXT PRIMARY KEY,
            round TEXT NOT NULL,
            team1 TEXT NOT NULL,
            team2 TEXT NOT NULL,
            team1_score INTEGER,
            team2_score INTEGER,
            winner TEXT,
            completed INTEGER NOT NULL DEFAULT 0,
            game_date TEXT NOT NULL,
            last_updated TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS predictions (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            owner_label TEXT NOT NULL,
            name TEXT NOT NULL,
            bracket TEXT NOT NULL,
            score INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_game_results_date ON game_results(game_date)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_predictions_score ON predictions(score)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_predictions_owner_name ON predictions(owner_id, name)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Database initialized successfully");
    Ok(())
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, AppError> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

// ── Game result operations ──────────────────────────────────────────────────

/// Insert-or-overwrite by game id. Re-upserting identical content leaves the
/// stored row identical; this is the only mutation that must be atomic per
/// document.
pub async fn upsert_game_result(pool: &SqlitePool, result: &GameResult) -> Result<(), AppError> {
    sqlx::query(
        r#"INSERT INTO game_results
           (game_id, round, team1, team2, team1_score, team2_score, winner, completed, game_date, last_updated)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
           ON CONFLICT(game_id) DO UPDATE SET
               round        = excluded.round,
               team1        = excluded.team1,
               team2        = excluded.team2,
               team1_score  = excluded.team1_score,
               team2_score  = excluded.team2_score,
               winner       = excluded.winner,
               completed    = excluded.completed,
               game_date    = excluded.game_date,
               last_updated = excluded.last_updated"#,
    )
    .bind(&result.game_id)
    .bind(result.round.as_str())
    .bind(&result.team1)
    .bind(&result.team2)
    .bind(result.team1_score)
    .bind(result.team2_score)
    .bind(&result.winner)
    .bind(result.completed)
    .bind(result.game_date.to_rfc3339())
    .bind(result.last_updated.to_rfc3339())
    .execute(pool)
    .await?;
    Ok(())
}

fn map_game_result_row(row: &sqlx::sqlite::SqliteRow) -> Result<GameResult, AppError> {
    let game_id: String = row.get("game_id");
    let round_text: String = row.get("round");
    let round = Round::parse(&round_text).ok_or_else(|| {
        AppError::Persistence(format!("unknown round '{}' on game {}", round_text, game_id))
    })?;

    Ok(GameResult {
        round,
        team1: row.get("team1"),
        team2: row.get("team2"),
        team1_score: row.get("team1_score"),
        team2_score: row.get("team2_score"),
        winner: row.get("winner"),
        completed: row.get("completed"),
        game_date: parse_timestamp(&row.get::<String, _>("game_date"))?,
        last_updated: parse_timestamp(&row.get::<String, _>("last_updated"))?,
        game_id,
    })
}

pub async fn get_all_results(pool: &SqlitePool) -> Result<Vec<GameResult>, AppError> {
    let rows = sqlx::query("SELECT * FROM game_results ORDER BY game_date ASC")
        .fetch_all(pool)
        .await?;

    rows.iter().map(map_game_result_row).collect()
}

// ── Prediction operations ───────────────────────────────────────────────────

fn map_prediction_row(row: &sqlx::sqlite::SqliteRow) -> Result<Prediction, AppError> {
    Ok(Prediction {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        owner_label: row.get("owner_label"),
        name: row.get("name"),
        bracket: serde_json::from_str(&row.get::<String, _>("bracket"))?,
        score: row.get("score"),
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
        updated_at: parse_timestamp(&row.get::<String, _>("updated_at"))?,
    })
}

pub async fn insert_prediction(pool: &SqlitePool, prediction: &Prediction) -> Result<(), AppError> {
    sqlx::query(
        r#"INSERT INTO predictions
           (id, owner_id, owner_label, name, bracket, score, created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&prediction.id)
    .bind(&prediction.owner_id)
    .bind(&prediction.owner_label)
    .bind(&prediction.name)
    .bind(serde_json::to_string(&prediction.bracket)?)
    .bind(prediction.score)
    .bind(prediction.created_at.to_rfc3339())
    .bind(prediction.updated_at.to_rfc3339())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_prediction_by_id(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<Prediction>, AppError> {
    let row = sqlx::query("SELECT * FROM predictions WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(map_prediction_row).transpose()
}

pub async fn get_all_predictions(pool: &SqlitePool) -> Result<Vec<Prediction>, AppError> {
    let rows = sqlx::query("SELECT * FROM predictions ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;

    rows.iter().map(map_prediction_row).collect()
}

pub async fn get_predictions_by_owner(
    pool: &SqlitePool,
    owner_id: &str,
) -> Result<Vec<Prediction>, AppError> {
    let rows = sqlx::query("SELECT * FROM predictions WHERE owner_id = ? ORDER BY created_at DESC")
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

    rows.iter().map(map_prediction_row).collect()
}

pub async fn get_prediction_names(pool: &SqlitePool) -> Result<Vec<PredictionName>, AppError> {
    let rows = sqlx::query("SELECT id, name FROM predictions ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(|row| PredictionName {
            id: row.get("id"),
            name: row.get("name"),
        })
        .collect())
}

pub async fn count_predictions_for_owner(
    pool: &SqlitePool,
    owner_id: &str,
) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM predictions WHERE owner_id = ?")
        .bind(owner_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn prediction_name_taken(
    pool: &SqlitePool,
    owner_id: &str,
    name: &str,
) -> Result<bool, AppError> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM predictions WHERE owner_id = ? AND name = ?")
            .bind(owner_id)
            .bind(name)
            .fetch_one(pool)
            .await?;
    Ok(count > 0)
}

/// Delete a prediction only if it belongs to the given owner. Returns the
/// number of rows removed (0 or 1).
pub async fn delete_prediction(
    pool: &SqlitePool,
    id: &str,
    owner_id: &str,
) -> Result<u64, AppError> {
    let outcome = sqlx::query("DELETE FROM predictions WHERE id = ? AND owner_id = ?")
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;
    Ok(outcome.rows_affected())
}

/// Field-level update: the score and its bump of `updated_at`, nothing else.
pub async fn update_prediction_score(
    pool: &SqlitePool,
    id: &str,
    score: i64,
) -> Result<(), AppError> {
    sqlx::query("UPDATE predictions SET score = ?, updated_at = ? WHERE id = ?")
        .bind(score)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

// ── Leaderboard queries ─────────────────────────────────────────────────────

pub async fn get_leaderboard_page(
    pool: &SqlitePool,
    limit: i64,
    offset: i64,
) -> Result<Vec<Prediction>, AppError> {
    let rows = sqlx::query(
        "SELECT * FROM predictions ORDER BY score DESC, created_at ASC LIMIT ? OFFSET ?",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    rows.iter().map(map_prediction_row).collect()
}

pub async fn count_predictions(pool: &SqlitePool) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM predictions")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

// ── Test support ────────────────────────────────────────────────────────────

/// In-memory pool pinned to one connection so every query sees the same
/// database.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    use sqlx::sqlite::SqlitePoolOptions;

    let options = SqliteConnectOptions::from_str("sqlite::memory:").unwrap();
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    init_database_with_pool(&pool).await.unwrap();
    pool
}
