use serde::Serialize;
use sqlx::SqlitePool;

use crate::db;
use crate::error::AppError;
use crate::services::normalizer;
use crate::services::results_fetcher::ResultsClient;
use crate::services::scoring::calculate_score;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SyncSummary {
    pub games_updated: usize,
    pub scores_updated: usize,
}

/// One reconciliation run: pull the season's postseason results, upsert them,
/// and rescore every stored prediction. Safe to re-run at any frequency;
/// unchanged upstream data produces zero deltas. Overlapping runs are not
/// coordinated here, so the scheduler must serialize invocations.
pub async fn run(
    pool: &SqlitePool,
    client: &ResultsClient,
    year: i32,
) -> Result<SyncSummary, AppError> {
    // A fetch failure aborts the run before any write.
    let games = client.fetch_postseason_games(year).await?;

    let mut games_updated = 0usize;
    for raw in &games {
        let result = normalizer::normalize(raw);
        if let Err(e) = db::upsert_game_result(pool, &result).await {
            tracing::error!(
                "sync aborted after {} result upserts, at game {}: {}",
                games_updated,
                result.game_id,
                e
            );
            return Err(e);
        }
        games_updated += 1;
    }
    tracing::info!("Upserted {} game results", games_updated);

    let scores_updated = rescore_all(pool).await?;
    tracing::info!("Updated {} prediction scores", scores_updated);

    Ok(SyncSummary {
        games_updated,
        scores_updated,
    })
}

/// Recompute every prediction against the full result set, writing only the
/// scores that changed so `updated_at` is never bumped spuriously.
pub async fn rescore_all(pool: &SqlitePool) -> Result<usize, AppError> {
    let results = db::get_all_results(pool).await?;
    let predictions = db::get_all_predictions(pool).await?;

    let mut scores_updated = 0usize;
    for prediction in &predictions {
        let new_score = calculate_score(&prediction.bracket, &results);
        if new_score != prediction.score {
            if let Err(e) = db::update_prediction_score(pool, &prediction.id, new_score).await {
                tracing::error!(
                    "rescore aborted after {} updates, at prediction {}: {}",
                    scores_updated,
                    prediction.id,
                    e
                );
                return Err(e);
            }
            scores_updated += 1;
        }
    }

    Ok(scores_updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{playoff_field, PredictedScore, Round, Team};
    use crate::services::bracket::BracketState;
    use chrono::Utc;
    use uuid::Uuid;

    fn team(name: &str) -> Team {
        playoff_field()
            .into_iter()
            .find(|t| t.name == name)
            .unwrap()
    }

    async fn seeded_pool() -> SqlitePool {
        let pool = db::test_pool().await;

        let mut state = BracketState::new();
        for (id, pick) in [
            ("fr1", "Oregon"),
            ("fr2", "Alabama"),
            ("fr3", "Ole Miss"),
            ("fr4", "Miami"),
            ("qf1", "Oregon"),
            ("qf2", "Indiana"),
            ("qf3", "Georgia"),
            ("qf4", "Ohio State"),
            ("sf1", "Oregon"),
            ("sf2", "Georgia"),
            ("final", "Oregon"),
        ] {
            state.select_winner(id, &team(pick)).unwrap();
        }
        let bracket = state
            .finalize(PredictedScore {
                team1_score: 30,
                team2_score: 20,
            })
            .unwrap();

        let prediction = crate::models::Prediction {
            id: Uuid::new_v4().to_string(),
            owner_id: "owner-1".to_string(),
            owner_label: "fan@example.com".to_string(),
            name: "Ducks dynasty".to_string(),
            bracket,
            score: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        db::insert_prediction(&pool, &prediction).await.unwrap();

        let result = crate::models::GameResult {
            game_id: "cfb-401550001".to_string(),
            round: Round::FirstRound,
            team1: "JMU".to_string(),
            team2: "Oregon".to_string(),
            team1_score: Some(17),
            team2_score: Some(34),
            winner: Some("Oregon".to_string()),
            completed: true,
            game_date: Utc::now(),
            last_updated: Utc::now(),
        };
        db::upsert_game_result(&pool, &result).await.unwrap();

        pool
    }

    #[tokio::test]
    async fn rescore_writes_only_deltas() {
        let pool = seeded_pool().await;

        assert_eq!(rescore_all(&pool).await.unwrap(), 1);
        let stored = db::get_all_predictions(&pool).await.unwrap();
        assert_eq!(stored[0].score, 5);

        // Re-running with unchanged data writes nothing.
        assert_eq!(rescore_all(&pool).await.unwrap(), 0);
    }
}
