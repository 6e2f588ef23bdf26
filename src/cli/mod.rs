use anyhow::Result;
use chrono::{Datelike, Utc};

use crate::db;
use crate::services::results_fetcher::ResultsClient;
use crate::services::sync;

pub async fn sync_results(year: Option<i32>) -> Result<()> {
    let pool = db::create_pool().await?;
    db::init_database_with_pool(&pool).await?;

    let year = year.unwrap_or_else(|| Utc::now().year());
    let client = ResultsClient::from_env();

    println!("🏈 Syncing {} postseason results...", year);

    let summary = sync::run(&pool, &client, year).await?;

    println!(
        "✅ {} game results upserted, {} prediction scores changed",
        summary.games_updated, summary.scores_updated
    );

    Ok(())
}

pub async fn show_leaderboard(limit: i64) -> Result<()> {
    let pool = db::create_pool().await?;
    db::init_database_with_pool(&pool).await?;

    let standings = db::get_leaderboard_page(&pool, limit.clamp(1, 100), 0).await?;

    if standings.is_empty() {
        println!("📭 No predictions yet. Submit brackets through the API first.");
        return Ok(());
    }

    println!("🏆 Leaderboard (top {}):\n", standings.len());
    for (i, prediction) in standings.iter().enumerate() {
        println!(
            "{:>3}. {:<30} {:<25} {:>5} pts",
            i + 1,
            prediction.name,
            prediction.owner_label,
            prediction.score
        );
    }

    println!("\n💡 Scores update on every sync run: pickem sync");

    Ok(())
}

pub async fn seed_sample_data() -> Result<()> {
    let pool = db::create_pool().await?;
    db::init_database_with_pool(&pool).await?;

    println!("🌱 Seeding sample results and demo predictions...");
    db::seed_data(&pool).await?;
    println!("✅ Seed data loaded");

    Ok(())
}
