use chrono::{DateTime, Utc};

use crate::models::{GameResult, Round};
use crate::services::results_fetcher::RawGame;
use crate::utils::normalize_team_name;

/// Ordered round-classification rules, evaluated top to bottom against the
/// provider's free-text notes field. The fallback is the first round, which
/// also sweeps up non-playoff bowls and exhibitions (known edge case).
static ROUND_RULES: &[(&[&str], Round)] = &[
    (
        &["Orange Bowl", "Rose Bowl", "Sugar Bowl", "Cotton Bowl"],
        Round::Quarterfinals,
    ),
    (&["Peach Bowl", "Fiesta Bowl"], Round::Semifinals),
    (&["Championship"], Round::Championship),
];

pub fn classify_round(notes: Option<&str>) -> Round {
    let Some(notes) = notes else {
        return Round::FirstRound;
    };
    for (patterns, round) in ROUND_RULES {
        if patterns.iter().any(|p| notes.contains(p)) {
            return *round;
        }
    }
    Round::FirstRound
}

/// Convert one provider record into the canonical result. Team names are
/// normalized here, before storage, so every later lookup joins on the same
/// spellings the prediction brackets use.
pub fn normalize(game: &RawGame) -> GameResult {
    let team1 = normalize_team_name(&game.home_team);
    let team2 = normalize_team_name(&game.away_team);

    // Equal scores fall to the home side through the strict comparison; ties
    // are not a modeled state in this sport.
    let winner = match (game.completed, game.home_points, game.away_points) {
        (true, Some(home), Some(away)) => Some(if away > home {
            team2.clone()
        } else {
            team1.clone()
        }),
        _ => None,
    };

    let game_date = match DateTime::parse_from_rfc3339(&game.start_date) {
        Ok(d) => d.with_timezone(&Utc),
        Err(e) => {
            tracing::warn!("Bad start date '{}' on game {}: {}", game.start_date, game.id, e);
            Utc::now()
        }
    };

    GameResult {
        game_id: format!("cfb-{}", game.id),
        round: classify_round(game.notes.as_deref()),
        team1,
        team2,
        team1_score: game.home_points,
        team2_score: game.away_points,
        winner,
        completed: game.completed,
        game_date,
        last_updated: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(home: &str, away: &str, notes: Option<&str>) -> RawGame {
        RawGame {
            id: 401_550_001,
            start_date: "2026-01-01T20:30:00Z".to_string(),
            home_team: home.to_string(),
            away_team: away.to_string(),
            home_points: None,
            away_points: None,
            completed: false,
            notes: notes.map(str::to_string),
        }
    }

    #[test]
    fn classifies_rounds_from_notes_in_order() {
        assert_eq!(
            classify_round(Some("Capital One Orange Bowl")),
            Round::Quarterfinals
        );
        assert_eq!(classify_round(Some("Rose Bowl Game")), Round::Quarterfinals);
        assert_eq!(
            classify_round(Some("Chick-fil-A Peach Bowl")),
            Round::Semifinals
        );
        assert_eq!(
            classify_round(Some("CFP National Championship")),
            Round::Championship
        );
        assert_eq!(
            classify_round(Some("First Round - Autzen Stadium")),
            Round::FirstRound
        );
        assert_eq!(classify_round(None), Round::FirstRound);
        // Non-playoff bowls land in the fallback bucket.
        assert_eq!(classify_round(Some("Gasparilla Bowl")), Round::FirstRound);
    }

    #[test]
    fn winner_requires_completion_and_both_scores() {
        let mut game = raw("Oregon", "JMU", None);
        game.home_points = Some(34);
        game.away_points = Some(17);
        assert_eq!(normalize(&game).winner, None);

        game.completed = true;
        assert_eq!(normalize(&game).winner.as_deref(), Some("Oregon"));

        game.home_points = None;
        assert_eq!(normalize(&game).winner, None);
    }

    #[test]
    fn higher_away_score_wins_and_equal_scores_fall_to_home() {
        let mut game = raw("Oregon", "Georgia", None);
        game.completed = true;
        game.home_points = Some(20);
        game.away_points = Some(27);
        assert_eq!(normalize(&game).winner.as_deref(), Some("Georgia"));

        game.away_points = Some(20);
        assert_eq!(normalize(&game).winner.as_deref(), Some("Oregon"));
    }

    #[test]
    fn normalizes_team_names_before_storage() {
        let game = raw("James Madison", " Oregon ", None);
        let result = normalize(&game);
        assert_eq!(result.team1, "JMU");
        assert_eq!(result.team2, "Oregon");
    }

    #[test]
    fn derives_stable_game_id_and_date() {
        let game = raw("Oregon", "JMU", None);
        let result = normalize(&game);
        assert_eq!(result.game_id, "cfb-401550001");
        assert_eq!(result.game_date.to_rfc3339(), "2026-01-01T20:30:00+00:00");
    }
}
