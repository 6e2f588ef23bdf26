use crate::models::{playoff_field, Round, Team};

/// Provider spelling → roster spelling. The results API reports some schools
/// under their official name while brackets use the short form.
const TEAM_ALIASES: &[(&str, &str)] = &[
    ("James Madison", "JMU"),
    ("Miami (FL)", "Miami"),
];

/// Minimum Jaro-Winkler similarity before a provider name is snapped onto a
/// roster name. High enough that e.g. "Ohio" (0.88 vs "Ohio State") passes
/// through untouched.
const FUZZY_MATCH_THRESHOLD: f64 = 0.92;

/// Normalize an externally-sourced team name so result rows join against
/// prediction brackets: trim, alias table, case-insensitive roster match,
/// then a fuzzy snap for stray-whitespace near-misses. Names outside the
/// playoff field pass through trimmed.
pub fn normalize_team_name(raw: &str) -> String {
    let trimmed = raw.trim();

    for (alias, canonical) in TEAM_ALIASES {
        if alias.eq_ignore_ascii_case(trimmed) {
            return (*canonical).to_string();
        }
    }

    let field = playoff_field();
    for team in &field {
        if team.name.eq_ignore_ascii_case(trimmed) {
            return team.name.clone();
        }
    }

    let lowered = trimmed.to_lowercase();
    let mut best: Option<(f64, &Team)> = None;
    for team in &field {
        let score = strsim::jaro_winkler(&team.name.to_lowercase(), &lowered);
        if score >= FUZZY_MATCH_THRESHOLD && best.map_or(true, |(b, _)| score > b) {
            best = Some((score, team));
        }
    }

    match best {
        Some((_, team)) => team.name.clone(),
        None => trimmed.to_string(),
    }
}

/// Matching key for joining a predicted matchup to a stored result: the
/// unordered, case-folded team pair plus the round. Predictions and results
/// do not share an id scheme, so team names are the join key.
pub fn matchup_key(team1: &str, team2: &str, round: Round) -> (String, String, Round) {
    let a = team1.trim().to_lowercase();
    let b = team2.trim().to_lowercase();
    if a <= b {
        (a, b, round)
    } else {
        (b, a, round)
    }
}

/// Validate a prediction display name.
pub fn validate_prediction_name(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty() && trimmed.chars().count() <= 60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_table_maps_official_name_to_roster_form() {
        assert_eq!(normalize_team_name("James Madison"), "JMU");
        assert_eq!(normalize_team_name("james madison"), "JMU");
        assert_eq!(normalize_team_name("Miami (FL)"), "Miami");
    }

    #[test]
    fn roster_match_is_case_insensitive_and_restores_casing() {
        assert_eq!(normalize_team_name("oklahoma"), "Oklahoma");
        assert_eq!(normalize_team_name("  Texas A&M "), "Texas A&M");
    }

    #[test]
    fn fuzzy_snap_fixes_whitespace_drift_only() {
        assert_eq!(normalize_team_name("Ohio  State"), "Ohio State");
        // A different school that happens to share a prefix must not be
        // absorbed into the roster.
        assert_eq!(normalize_team_name("Ohio"), "Ohio");
    }

    #[test]
    fn non_playoff_teams_pass_through_trimmed() {
        assert_eq!(normalize_team_name(" Boise State "), "Boise State");
    }

    #[test]
    fn matchup_key_ignores_team_order_but_not_round() {
        let a = matchup_key("Oregon", "JMU", Round::FirstRound);
        let b = matchup_key("JMU", " Oregon ", Round::FirstRound);
        assert_eq!(a, b);
        let c = matchup_key("Oregon", "JMU", Round::Quarterfinals);
        assert_ne!(a, c);
    }

    #[test]
    fn prediction_names_are_bounded_and_non_blank() {
        assert!(validate_prediction_name("Chalk City"));
        assert!(!validate_prediction_name("   "));
        assert!(!validate_prediction_name(&"x".repeat(61)));
    }
}
