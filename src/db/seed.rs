use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{playoff_field, GameResult, PredictedScore, Prediction, Round, Team};
use crate::services::bracket::BracketState;

fn team(field: &[Team], name: &str) -> Option<Team> {
    field.iter().find(|t| t.name == name).cloned()
}

fn build_bracket(
    picks: &[(&str, &str)],
    predicted_score: PredictedScore,
) -> Result<crate::models::Bracket, AppError> {
    let field = playoff_field();
    let mut state = BracketState::new();
    for (matchup_id, winner) in picks {
        let winner = team(&field, winner)
            .ok_or_else(|| AppError::Validation(format!("unknown seed team '{}'", winner)))?;
        state.select_winner(matchup_id, &winner)?;
    }
    Ok(state.finalize(predicted_score)?)
}

fn sample_results() -> Vec<GameResult> {
    // Static, known-good literals.
    let date = |s: &str| DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc);
    vec![
        GameResult {
            game_id: "cfb-401551001".to_string(),
            round: Round::FirstRound,
            team1: "JMU".to_string(),
            team2: "Oregon".to_string(),
            team1_score: Some(17),
            team2_score: Some(34),
            winner: Some("Oregon".to_string()),
            completed: true,
            game_date: date("2025-12-19T20:00:00Z"),
            last_updated: Utc::now(),
        },
        GameResult {
            game_id: "cfb-401551002".to_string(),
            round: Round::FirstRound,
            team1: "Alabama".to_string(),
            team2: "Oklahoma".to_string(),
            team1_score: Some(24),
            team2_score: Some(20),
            winner: Some("Alabama".to_string()),
            completed: true,
            game_date: date("2025-12-20T12:00:00Z"),
            last_updated: Utc::now(),
        },
        GameResult {
            game_id: "cfb-401551003".to_string(),
            round: Round::FirstRound,
            team1: "Tulane".to_string(),
            team2: "Ole Miss".to_string(),
            team1_score: None,
            team2_score: None,
            winner: None,
            completed: false,
            game_date: date("2025-12-20T16:00:00Z"),
            last_updated: Utc::now(),
        },
        GameResult {
            game_id: "cfb-401551004".to_string(),
            round: Round::FirstRound,
            team1: "Miami".to_string(),
            team2: "Texas A&M".to_string(),
            team1_score: None,
            team2_score: None,
            winner: None,
            completed: false,
            game_date: date("2025-12-20T20:00:00Z"),
            last_updated: Utc::now(),
        },
    ]
}

/// Load a handful of results and demo predictions for local development.
/// Safe to re-run; existing rows are upserted or skipped.
pub async fn seed_data(pool: &SqlitePool) -> Result<(), AppError> {
    for result in sample_results() {
        crate::db::upsert_game_result(pool, &result).await?;
    }
    tracing::info!("Seeded sample game results");

    let demo_predictions = [
        (
            "demo-ducks",
            "ducks@example.com",
            "Quack Attack",
            &[
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
            ][..],
            PredictedScore {
                team1_score: 30,
                team2_score: 20,
            },
        ),
        (
            "demo-dawgs",
            "dawgs@example.com",
            "Chapel Bells",
            &[
                ("fr1", "Oregon"),
                ("fr2", "Oklahoma"),
                ("fr3", "Tulane"),
                ("fr4", "Texas A&M"),
                ("qf1", "Texas Tech"),
                ("qf2", "Indiana"),
                ("qf3", "Georgia"),
                ("qf4", "Texas A&M"),
                ("sf1", "Indiana"),
                ("sf2", "Georgia"),
                ("final", "Georgia"),
            ][..],
            PredictedScore {
                team1_score: 24,
                team2_score: 27,
            },
        ),
    ];

    let mut seeded = 0usize;
    for (owner_id, owner_label, name, picks, predicted_score) in demo_predictions {
        if crate::db::prediction_name_taken(pool, owner_id, name).await? {
            continue;
        }
        let bracket = build_bracket(picks, predicted_score)?;
        let now = Utc::now();
        let prediction = Prediction {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            owner_label: owner_label.to_string(),
            name: name.to_string(),
            bracket,
            score: 0,
            created_at: now,
            updated_at: now,
        };
        crate::db::insert_prediction(pool, &prediction).await?;
        seeded += 1;
    }

    tracing::info!("Seeded {} demo predictions", seeded);
    Ok(())
}
