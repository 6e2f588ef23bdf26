use reqwest::Client;
use serde::Deserialize;
use std::env;

use crate::error::AppError;

// ── collegefootballdata.com structures ──────────────────────────────────────

/// One game record as the provider returns it. Scores are null until played;
/// `notes` carries the free-text bowl/round label.
#[derive(Debug, Clone, Deserialize)]
pub struct RawGame {
    pub id: u64,
    pub start_date: String,
    pub home_team: String,
    pub away_team: String,
    pub home_points: Option<i32>,
    pub away_points: Option<i32>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

// ── ResultsClient ───────────────────────────────────────────────────────────

pub struct ResultsClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ResultsClient {
    pub fn from_env() -> Self {
        Self {
            client: Client::new(),
            base_url: env::var("COLLEGE_FOOTBALL_API_URL")
                .unwrap_or_else(|_| "https://api.collegefootballdata.com".to_string()),
            api_key: env::var("COLLEGE_FOOTBALL_API_KEY").ok(),
        }
    }

    /// Fetch the season's postseason games for the top classification.
    /// Records missing a team name, or with neither a completion flag nor any
    /// score, are dropped before normalization.
    pub async fn fetch_postseason_games(&self, year: i32) -> Result<Vec<RawGame>, AppError> {
        tracing::info!("Fetching {} postseason games from {}…", year, self.base_url);

        let url = format!(
            "{}/games?year={}&seasonType=postseason&division=fbs",
            self.base_url, year
        );

        let mut request = self.client.get(&url).header("Accept", "application/json");
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::UpstreamFetch(format!(
                "results API error {} for year {}",
                status, year
            )));
        }

        let games: Vec<RawGame> = response.json().await?;
        let usable: Vec<RawGame> = games
            .into_iter()
            .filter(|g| {
                !g.home_team.trim().is_empty()
                    && !g.away_team.trim().is_empty()
                    && (g.completed || g.home_points.is_some() || g.away_points.is_some())
            })
            .collect();

        tracing::info!("{} usable postseason games", usable.len());
        Ok(usable)
    }
}
