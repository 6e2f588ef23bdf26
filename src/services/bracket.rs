use thiserror::Error;

use crate::models::{
    playoff_field, Bracket, BracketGame, ChampionshipGame, PredictedScore, Team,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketError {
    #[error("unknown matchup id: {0}")]
    InvalidMatchupId(String),

    #[error("matchup {0} does not have both participants yet")]
    MatchupNotReady(String),

    #[error("{team} is not playing in matchup {matchup}")]
    NotAParticipant { team: String, matchup: String },

    #[error("bracket is incomplete: {0}")]
    Incomplete(String),

    #[error("bracket is inconsistent: {0}")]
    Inconsistent(String),
}

/// A single game slot. `winner` is always one of the two participants.
#[derive(Debug, Clone, PartialEq)]
pub struct Matchup {
    pub id: &'static str,
    pub team1: Option<Team>,
    pub team2: Option<Team>,
    pub winner: Option<Team>,
}

impl Matchup {
    fn seeded(id: &'static str, team1: Team, team2: Team) -> Self {
        Self {
            id,
            team1: Some(team1),
            team2: Some(team2),
            winner: None,
        }
    }

    fn bye(id: &'static str, team1: Team) -> Self {
        Self {
            id,
            team1: Some(team1),
            team2: None,
            winner: None,
        }
    }

    fn open(id: &'static str) -> Self {
        Self {
            id,
            team1: None,
            team2: None,
            winner: None,
        }
    }

    /// Remove a team from every slot it occupies.
    fn scrub(&mut self, team_id: &str) {
        if self.team1.as_ref().is_some_and(|t| t.id == team_id) {
            self.team1 = None;
        }
        if self.team2.as_ref().is_some_and(|t| t.id == team_id) {
            self.team2 = None;
        }
        if self.winner.as_ref().is_some_and(|t| t.id == team_id) {
            self.winner = None;
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Team1,
    Team2,
}

/// Structural wiring: which downstream slot each matchup's winner advances
/// into. The championship feeds nothing.
const FEEDS: &[(&str, &str, Slot)] = &[
    ("fr1", "qf1", Slot::Team2),
    ("fr2", "qf2", Slot::Team2),
    ("fr3", "qf3", Slot::Team2),
    ("fr4", "qf4", Slot::Team2),
    ("qf1", "sf1", Slot::Team1),
    ("qf2", "sf1", Slot::Team2),
    ("qf3", "sf2", Slot::Team1),
    ("qf4", "sf2", Slot::Team2),
    ("sf1", "final", Slot::Team1),
    ("sf2", "final", Slot::Team2),
];

fn feed_target(matchup_id: &str) -> Option<(&'static str, Slot)> {
    FEEDS
        .iter()
        .find(|(src, _, _)| *src == matchup_id)
        .map(|(_, dst, slot)| (*dst, *slot))
}

// Bowl assignments for the frozen bracket document.
const QUARTERFINAL_BOWL_HOSTS: &[(&str, &str)] = &[
    ("Texas Tech", "Orange Bowl"),
    ("Indiana", "Rose Bowl"),
    ("Georgia", "Sugar Bowl"),
    ("Ohio State", "Cotton Bowl"),
];
const PEACH_BOWL_TEAMS: &[&str] = &["Texas Tech", "Oregon", "Indiana", "Alabama"];
const CHAMPIONSHIP_TITLE: &str = "National Championship";

/// In-memory 12-team single-elimination bracket. Every selection fully
/// resolves its propagation and retraction chain before returning, so the
/// consistency invariant holds between any two calls.
#[derive(Debug, Clone, PartialEq)]
pub struct BracketState {
    pub first_round: Vec<Matchup>,
    pub quarterfinals: Vec<Matchup>,
    pub semifinals: Vec<Matchup>,
    pub championship: Matchup,
}

impl Default for BracketState {
    fn default() -> Self {
        Self::new()
    }
}

impl BracketState {
    pub fn new() -> Self {
        let field = playoff_field();
        let by_seed = |seed: u8| field[(seed - 1) as usize].clone();

        Self {
            first_round: vec![
                Matchup::seeded("fr1", by_seed(12), by_seed(5)),
                Matchup::seeded("fr2", by_seed(9), by_seed(8)),
                Matchup::seeded("fr3", by_seed(11), by_seed(6)),
                Matchup::seeded("fr4", by_seed(10), by_seed(7)),
            ],
            quarterfinals: vec![
                Matchup::bye("qf1", by_seed(4)),
                Matchup::bye("qf2", by_seed(1)),
                Matchup::bye("qf3", by_seed(3)),
                Matchup::bye("qf4", by_seed(2)),
            ],
            semifinals: vec![Matchup::open("sf1"), Matchup::open("sf2")],
            championship: Matchup::open("final"),
        }
    }

    /// Restore the initial pre-seeded state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn is_complete(&self) -> bool {
        self.championship.winner.is_some()
    }

    pub fn matchup(&self, id: &str) -> Option<&Matchup> {
        self.all_matchups().find(|m| m.id == id)
    }

    fn all_matchups(&self) -> impl Iterator<Item = &Matchup> {
        self.first_round
            .iter()
            .chain(self.quarterfinals.iter())
            .chain(self.semifinals.iter())
            .chain(std::iter::once(&self.championship))
    }

    fn matchup_mut(&mut self, id: &str) -> Option<&mut Matchup> {
        self.first_round
            .iter_mut()
            .chain(self.quarterfinals.iter_mut())
            .chain(self.semifinals.iter_mut())
            .chain(std::iter::once(&mut self.championship))
            .find(|m| m.id == id)
    }

    /// Record a pick. Sets the winner, advances it into the slot this matchup
    /// feeds, and transitively scrubs the eliminated team from every
    /// downstream slot it had been speculatively advanced into, including
    /// downstream wins and their own propagation.
    ///
    /// Re-picking an already-decided matchup replaces the winner and re-runs
    /// the cascade.
    pub fn select_winner(&mut self, matchup_id: &str, winner: &Team) -> Result<(), BracketError> {
        let matchup = self
            .matchup_mut(matchup_id)
            .ok_or_else(|| BracketError::InvalidMatchupId(matchup_id.to_string()))?;

        let (team1, team2) = match (&matchup.team1, &matchup.team2) {
            (Some(t1), Some(t2)) => (t1.clone(), t2.clone()),
            _ => return Err(BracketError::MatchupNotReady(matchup_id.to_string())),
        };

        let eliminated = if team1.id == winner.id {
            team2
        } else if team2.id == winner.id {
            team1
        } else {
            return Err(BracketError::NotAParticipant {
                team: winner.name.clone(),
                matchup: matchup_id.to_string(),
            });
        };

        matchup.winner = Some(winner.clone());

        // Scrub before advancing: the fed slot may still hold the previous
        // pick for this matchup.
        self.scrub_downstream(matchup_id, &eliminated.id);

        if let Some((target_id, slot)) = feed_target(matchup_id) {
            if let Some(target) = self.matchup_mut(target_id) {
                match slot {
                    Slot::Team1 => target.team1 = Some(winner.clone()),
                    Slot::Team2 => target.team2 = Some(winner.clone()),
                }
            }
        }

        Ok(())
    }

    /// Remove a team from every matchup in rounds after the given one. A team
    /// only ever occupies slots on its own structural path, so scrubbing the
    /// full downstream rounds also undoes any wins it had accumulated there.
    fn scrub_downstream(&mut self, matchup_id: &str, team_id: &str) {
        let from_quarterfinals = matchup_id.starts_with("fr");
        let from_semifinals = from_quarterfinals || matchup_id.starts_with("qf");
        let from_final = from_semifinals || matchup_id.starts_with("sf");

        if from_quarterfinals {
            for m in &mut self.quarterfinals {
                m.scrub(team_id);
            }
        }
        if from_semifinals {
            for m in &mut self.semifinals {
                m.scrub(team_id);
            }
        }
        if from_final {
            self.championship.scrub(team_id);
        }
    }

    /// Freeze a fully-decided state into the persisted bracket document,
    /// attaching the predicted championship score and bowl titles.
    pub fn finalize(&self, predicted_score: PredictedScore) -> Result<Bracket, BracketError> {
        let freeze = |m: &Matchup| -> Result<BracketGame, BracketError> {
            match (&m.team1, &m.team2, &m.winner) {
                (Some(t1), Some(t2), Some(w)) => Ok(BracketGame {
                    game_id: m.id.to_string(),
                    team1: t1.name.clone(),
                    team2: t2.name.clone(),
                    prediction: w.name.clone(),
                    title: None,
                }),
                _ => Err(BracketError::Incomplete(format!(
                    "matchup {} is undecided",
                    m.id
                ))),
            }
        };

        let first_round: Vec<BracketGame> =
            self.first_round.iter().map(freeze).collect::<Result<_, _>>()?;
        let quarterfinals: Vec<BracketGame> =
            self.quarterfinals.iter().map(freeze).collect::<Result<_, _>>()?;
        let semifinals: Vec<BracketGame> =
            self.semifinals.iter().map(freeze).collect::<Result<_, _>>()?;
        let final_game = freeze(&self.championship)?;

        let mut bracket = Bracket {
            first_round,
            quarterfinals,
            semifinals,
            championship: ChampionshipGame {
                game_id: final_game.game_id,
                team1: final_game.team1,
                team2: final_game.team2,
                prediction: final_game.prediction,
                predicted_score,
                title: None,
            },
        };
        assign_bowl_titles(&mut bracket);
        Ok(bracket)
    }
}

fn involves(team1: &str, team2: &str, name: &str) -> bool {
    team1.trim() == name || team2.trim() == name
}

/// Attach bowl titles to a frozen bracket: quarterfinal bowls follow the bye
/// team hosting them, semifinals split Peach/Fiesta by participant.
pub fn assign_bowl_titles(bracket: &mut Bracket) {
    for game in &mut bracket.quarterfinals {
        game.title = QUARTERFINAL_BOWL_HOSTS
            .iter()
            .find(|(team, _)| involves(&game.team1, &game.team2, team))
            .map(|(_, bowl)| bowl.to_string());
    }

    for game in &mut bracket.semifinals {
        let peach = PEACH_BOWL_TEAMS
            .iter()
            .any(|team| involves(&game.team1, &game.team2, team));
        game.title = Some(if peach { "Peach Bowl" } else { "Fiesta Bowl" }.to_string());
    }

    bracket.championship.title = Some(CHAMPIONSHIP_TITLE.to_string());
}

fn pair_matches(game_team1: &str, game_team2: &str, a: &str, b: &str) -> bool {
    let t1 = game_team1.trim();
    let t2 = game_team2.trim();
    (t1 == a && t2 == b) || (t1 == b && t2 == a)
}

fn picked_participant(team1: &str, team2: &str, prediction: &str) -> bool {
    let pick = prediction.trim();
    !pick.is_empty() && (pick == team1.trim() || pick == team2.trim())
}

/// Structural validation of a submitted frozen bracket: participants must
/// match the fixed template, every downstream participant must be the winner
/// advanced from the matchup that feeds it, and every prediction must be one
/// of the two participants. This is the submission-boundary counterpart of
/// the state machine's consistency invariant.
pub fn validate(bracket: &Bracket) -> Result<(), BracketError> {
    if bracket.first_round.len() != 4
        || bracket.quarterfinals.len() != 4
        || bracket.semifinals.len() != 2
    {
        return Err(BracketError::Inconsistent(
            "bracket does not have the 4/4/2/1 matchup shape".to_string(),
        ));
    }

    let field = playoff_field();
    let name = |seed: u8| field[(seed - 1) as usize].name.as_str();
    let first_round_pairs = [
        (name(12), name(5)),
        (name(9), name(8)),
        (name(11), name(6)),
        (name(10), name(7)),
    ];
    let byes = [name(4), name(1), name(3), name(2)];

    for (game, (a, b)) in bracket.first_round.iter().zip(first_round_pairs) {
        if !pair_matches(&game.team1, &game.team2, a, b) {
            return Err(BracketError::Inconsistent(format!(
                "first-round matchup {} does not pair {} with {}",
                game.game_id, a, b
            )));
        }
        if !picked_participant(&game.team1, &game.team2, &game.prediction) {
            return Err(BracketError::Inconsistent(format!(
                "pick for {} is not one of its participants",
                game.game_id
            )));
        }
    }

    for (i, game) in bracket.quarterfinals.iter().enumerate() {
        let advanced = bracket.first_round[i].prediction.trim();
        if !pair_matches(&game.team1, &game.team2, byes[i], advanced) {
            return Err(BracketError::Inconsistent(format!(
                "quarterfinal {} must pair {} with the advanced {}",
                game.game_id, byes[i], advanced
            )));
        }
        if !picked_participant(&game.team1, &game.team2, &game.prediction) {
            return Err(BracketError::Inconsistent(format!(
                "pick for {} is not one of its participants",
                game.game_id
            )));
        }
    }

    for (i, game) in bracket.semifinals.iter().enumerate() {
        let upper = bracket.quarterfinals[i * 2].prediction.trim();
        let lower = bracket.quarterfinals[i * 2 + 1].prediction.trim();
        if !pair_matches(&game.team1, &game.team2, upper, lower) {
            return Err(BracketError::Inconsistent(format!(
                "semifinal {} must pair the advanced {} with {}",
                game.game_id, upper, lower
            )));
        }
        if !picked_participant(&game.team1, &game.team2, &game.prediction) {
            return Err(BracketError::Inconsistent(format!(
                "pick for {} is not one of its participants",
                game.game_id
            )));
        }
    }

    let champ = &bracket.championship;
    let upper = bracket.semifinals[0].prediction.trim();
    let lower = bracket.semifinals[1].prediction.trim();
    if !pair_matches(&champ.team1, &champ.team2, upper, lower) {
        return Err(BracketError::Inconsistent(format!(
            "championship must pair the advanced {} with {}",
            upper, lower
        )));
    }
    if !picked_participant(&champ.team1, &champ.team2, &champ.prediction) {
        return Err(BracketError::Inconsistent(
            "championship pick is not one of its participants".to_string(),
        ));
    }
    if champ.predicted_score.team1_score < 0 || champ.predicted_score.team2_score < 0 {
        return Err(BracketError::Inconsistent(
            "predicted championship score must be non-negative".to_string(),
        ));
    }

    Ok(())
}
