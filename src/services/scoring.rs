use std::collections::HashMap;

use crate::models::{Bracket, BracketGame, GameResult, PredictedScore, Round};
use crate::utils::matchup_key;

const CORRECT_PICK_POINTS: i64 = 5;
const EXACT_SCORE_BONUS: i64 = 100;
const CLOSE_SCORE_BONUS: i64 = 25;
const CLOSE_SCORE_MARGIN: i32 = 5;

/// Score a bracket against the current result set. Deterministic and
/// idempotent; results that are missing, incomplete, or winnerless
/// contribute nothing, so accruing results can only raise the total.
pub fn calculate_score(bracket: &Bracket, results: &[GameResult]) -> i64 {
    // Predictions and results don't share an id scheme, so the join key is
    // the unordered team pair plus round.
    let index: HashMap<(String, String, Round), &GameResult> = results
        .iter()
        .filter(|r| r.completed && r.winner.is_some())
        .map(|r| (matchup_key(&r.team1, &r.team2, r.round), r))
        .collect();

    let mut total = 0i64;

    let rounds: [(Round, &[BracketGame]); 3] = [
        (Round::FirstRound, &bracket.first_round),
        (Round::Quarterfinals, &bracket.quarterfinals),
        (Round::Semifinals, &bracket.semifinals),
    ];
    for (round, games) in rounds {
        for game in games {
            if let Some(result) = index.get(&matchup_key(&game.team1, &game.team2, round)) {
                if picked_correctly(result, &game.prediction) {
                    total += CORRECT_PICK_POINTS;
                }
            }
        }
    }

    let champ = &bracket.championship;
    if let Some(result) = index.get(&matchup_key(
        &champ.team1,
        &champ.team2,
        Round::Championship,
    )) {
        if picked_correctly(result, &champ.prediction) {
            total += CORRECT_PICK_POINTS;
            // Score bonuses are only in play once the winner is right.
            total += score_bonus(result, &champ.predicted_score);
        }
    }

    total
}

fn picked_correctly(result: &GameResult, prediction: &str) -> bool {
    result.winner.as_deref().map(str::trim) == Some(prediction.trim())
}

/// Exact score is order-correct: predicted team1/team2 positions against
/// actual team1/team2 positions, not winner-relative. The two close-score
/// bonuses are independent and additive.
fn score_bonus(result: &GameResult, predicted: &PredictedScore) -> i64 {
    if result.team1_score == Some(predicted.team1_score)
        && result.team2_score == Some(predicted.team2_score)
    {
        return EXACT_SCORE_BONUS;
    }

    let mut bonus = 0;
    if let Some(actual) = result.team1_score {
        if (actual - predicted.team1_score).abs() <= CLOSE_SCORE_MARGIN {
            bonus += CLOSE_SCORE_BONUS;
        }
    }
    if let Some(actual) = result.team2_score {
        if (actual - predicted.team2_score).abs() <= CLOSE_SCORE_MARGIN {
            bonus += CLOSE_SCORE_BONUS;
        }
    }
    bonus
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{playoff_field, Team};
    use crate::services::bracket::BracketState;
    use chrono::Utc;

    fn team(name: &str) -> Team {
        playoff_field()
            .into_iter()
            .find(|t| t.name == name)
            .unwrap()
    }

    /// Oregon over JMU, then chalk until Oregon wins the title 30-20.
    fn chalk_bracket() -> Bracket {
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
        state
            .finalize(PredictedScore {
                team1_score: 30,
                team2_score: 20,
            })
            .unwrap()
    }

    fn result(
        round: Round,
        team1: &str,
        team2: &str,
        scores: Option<(i32, i32)>,
        winner: Option<&str>,
        completed: bool,
    ) -> GameResult {
        GameResult {
            game_id: format!("cfb-{}-{}", team1, team2),
            round,
            team1: team1.to_string(),
            team2: team2.to_string(),
            team1_score: scores.map(|(s, _)| s),
            team2_score: scores.map(|(_, s)| s),
            winner: winner.map(str::to_string),
            completed,
            game_date: Utc::now(),
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn correct_first_round_pick_earns_five() {
        let bracket = chalk_bracket();
        let results = vec![result(
            Round::FirstRound,
            "JMU",
            "Oregon",
            Some((17, 34)),
            Some("Oregon"),
            true,
        )];
        assert_eq!(calculate_score(&bracket, &results), 5);
    }

    #[test]
    fn wrong_pick_earns_nothing() {
        let bracket = chalk_bracket();
        let results = vec![result(
            Round::FirstRound,
            "JMU",
            "Oregon",
            Some((24, 21)),
            Some("JMU"),
            true,
        )];
        assert_eq!(calculate_score(&bracket, &results), 0);
    }

    #[test]
    fn matching_ignores_team_order_and_whitespace() {
        let bracket = chalk_bracket();
        let results = vec![result(
            Round::FirstRound,
            " Oregon ",
            "JMU",
            Some((34, 17)),
            Some("Oregon "),
            true,
        )];
        assert_eq!(calculate_score(&bracket, &results), 5);
    }

    #[test]
    fn incomplete_or_winnerless_results_contribute_zero() {
        let bracket = chalk_bracket();
        let results = vec![
            result(
                Round::FirstRound,
                "JMU",
                "Oregon",
                Some((17, 34)),
                Some("Oregon"),
                false,
            ),
            result(Round::Quarterfinals, "Texas Tech", "Oregon", None, None, true),
        ];
        assert_eq!(calculate_score(&bracket, &results), 0);
    }

    #[test]
    fn round_mismatch_prevents_a_match() {
        let bracket = chalk_bracket();
        // Right pair, wrong round.
        let results = vec![result(
            Round::Quarterfinals,
            "JMU",
            "Oregon",
            Some((17, 34)),
            Some("Oregon"),
            true,
        )];
        assert_eq!(calculate_score(&bracket, &results), 0);
    }

    #[test]
    fn championship_exact_score_is_one_hundred_five() {
        let bracket = chalk_bracket();
        let results = vec![result(
            Round::Championship,
            "Oregon",
            "Georgia",
            Some((30, 20)),
            Some("Oregon"),
            true,
        )];
        assert_eq!(calculate_score(&bracket, &results), 105);
    }

    #[test]
    fn championship_close_scores_stack_to_fifty_five() {
        let mut state_bracket = chalk_bracket();
        state_bracket.championship.predicted_score = PredictedScore {
            team1_score: 28,
            team2_score: 17,
        };
        let results = vec![result(
            Round::Championship,
            "Oregon",
            "Georgia",
            Some((30, 20)),
            Some("Oregon"),
            true,
        )];
        assert_eq!(calculate_score(&state_bracket, &results), 55);
    }

    #[test]
    fn one_close_side_earns_thirty() {
        let mut bracket = chalk_bracket();
        bracket.championship.predicted_score = PredictedScore {
            team1_score: 28,
            team2_score: 40,
        };
        let results = vec![result(
            Round::Championship,
            "Oregon",
            "Georgia",
            Some((30, 20)),
            Some("Oregon"),
            true,
        )];
        assert_eq!(calculate_score(&bracket, &results), 30);
    }

    #[test]
    fn wrong_championship_winner_forfeits_all_bonuses() {
        let bracket = chalk_bracket();
        let results = vec![result(
            Round::Championship,
            "Oregon",
            "Georgia",
            Some((29, 21)),
            Some("Georgia"),
            true,
        )];
        assert_eq!(calculate_score(&bracket, &results), 0);
    }

    #[test]
    fn exact_bonus_is_positional_not_winner_relative() {
        let mut bracket = chalk_bracket();
        bracket.championship.predicted_score = PredictedScore {
            team1_score: 20,
            team2_score: 30,
        };
        // Transposed against the actual 30-20: winner right, both sides off
        // by ten, no bonus at all.
        let results = vec![result(
            Round::Championship,
            "Oregon",
            "Georgia",
            Some((30, 20)),
            Some("Oregon"),
            true,
        )];
        assert_eq!(calculate_score(&bracket, &results), 5);
    }

    #[test]
    fn scoring_is_idempotent() {
        let bracket = chalk_bracket();
        let results = vec![
            result(
                Round::FirstRound,
                "JMU",
                "Oregon",
                Some((17, 34)),
                Some("Oregon"),
                true,
            ),
            result(
                Round::Championship,
                "Oregon",
                "Georgia",
                Some((30, 20)),
                Some("Oregon"),
                true,
            ),
        ];
        let first = calculate_score(&bracket, &results);
        let second = calculate_score(&bracket, &results);
        assert_eq!(first, second);
        assert_eq!(first, 110);
    }

    #[test]
    fn new_results_never_lower_the_score() {
        let bracket = chalk_bracket();
        let mut results = vec![result(
            Round::FirstRound,
            "JMU",
            "Oregon",
            Some((17, 34)),
            Some("Oregon"),
            true,
        )];
        let before = calculate_score(&bracket, &results);

        // A newly-completed game the bracket got wrong.
        results.push(result(
            Round::FirstRound,
            "Tulane",
            "Ole Miss",
            Some((31, 28)),
            Some("Tulane"),
            true,
        ));
        // And one it got right.
        results.push(result(
            Round::Quarterfinals,
            "Texas Tech",
            "Oregon",
            Some((13, 27)),
            Some("Oregon"),
            true,
        ));

        let after = calculate_score(&bracket, &results);
        assert!(after >= before);
        assert_eq!(after, before + 5);
    }
}
