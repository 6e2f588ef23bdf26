use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tournament round, in fixed progression order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Round {
    FirstRound,
    Quarterfinals,
    Semifinals,
    Championship,
}

impl Round {
    pub fn as_str(&self) -> &'static str {
        match self {
            Round::FirstRound => "firstRound",
            Round::Quarterfinals => "quarterfinals",
            Round::Semifinals => "semifinals",
            Round::Championship => "championship",
        }
    }

    pub fn parse(s: &str) -> Option<Round> {
        match s {
            "firstRound" => Some(Round::FirstRound),
            "quarterfinals" => Some(Round::Quarterfinals),
            "semifinals" => Some(Round::Semifinals),
            "championship" => Some(Round::Championship),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub seed: u8,
}

/// The static 12-team playoff field. Seeds 1-4 receive first-round byes.
pub fn playoff_field() -> Vec<Team> {
    [
        ("1", "Indiana", 1),
        ("2", "Ohio State", 2),
        ("3", "Georgia", 3),
        ("4", "Texas Tech", 4),
        ("5", "Oregon", 5),
        ("6", "Ole Miss", 6),
        ("7", "Texas A&M", 7),
        ("8", "Oklahoma", 8),
        ("9", "Alabama", 9),
        ("10", "Miami", 10),
        ("11", "Tulane", 11),
        ("12", "JMU", 12),
    ]
    .iter()
    .map(|(id, name, seed)| Team {
        id: id.to_string(),
        name: name.to_string(),
        seed: *seed,
    })
    .collect()
}

// ── Frozen bracket document ──────────────────────────────────────────────────
// Stored as a JSON column on predictions; field names match the wire format
// brackets are submitted in.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketGame {
    pub game_id: String,
    pub team1: String,
    pub team2: String,
    /// Predicted winner.
    pub prediction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictedScore {
    pub team1_score: i32,
    pub team2_score: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionshipGame {
    pub game_id: String,
    pub team1: String,
    pub team2: String,
    pub prediction: String,
    pub predicted_score: PredictedScore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bracket {
    pub first_round: Vec<BracketGame>,
    pub quarterfinals: Vec<BracketGame>,
    pub semifinals: Vec<BracketGame>,
    pub championship: ChampionshipGame,
}

// ── Canonical game result ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub game_id: String,
    pub round: Round,
    pub team1: String,
    pub team2: String,
    pub team1_score: Option<i32>,
    pub team2_score: Option<i32>,
    pub winner: Option<String>,
    pub completed: bool,
    pub game_date: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

// ── Stored prediction ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub owner_id: String,
    /// Display label for the owner (e.g. their email).
    pub owner_label: String,
    /// Custom name for the prediction, unique per owner.
    pub name: String,
    pub bracket: Bracket,
    pub score: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionName {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub id: String,
    pub owner_label: String,
    pub name: String,
    pub score: i64,
    pub created_at: DateTime<Utc>,
}

// API Response types
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_round_trips_through_strings() {
        for round in [
            Round::FirstRound,
            Round::Quarterfinals,
            Round::Semifinals,
            Round::Championship,
        ] {
            assert_eq!(Round::parse(round.as_str()), Some(round));
        }
        assert_eq!(Round::parse("playIn"), None);
    }

    #[test]
    fn bracket_document_uses_camel_case_fields() {
        let game = BracketGame {
            game_id: "fr1".to_string(),
            team1: "JMU".to_string(),
            team2: "Oregon".to_string(),
            prediction: "Oregon".to_string(),
            title: None,
        };
        let json = serde_json::to_value(&game).unwrap();
        assert!(json.get("gameId").is_some());
        assert!(json.get("title").is_none());
    }

    #[test]
    fn playoff_field_has_twelve_unique_seeds() {
        let field = playoff_field();
        assert_eq!(field.len(), 12);
        let mut seeds: Vec<u8> = field.iter().map(|t| t.seed).collect();
        seeds.sort_unstable();
        assert_eq!(seeds, (1..=12).collect::<Vec<u8>>());
    }
}
