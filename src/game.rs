use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScoreError;
use crate::outcome::Outcome;
use crate::persist::{lenient_list, lenient_timestamp};
use crate::player::{Player, PlayerId};
use crate::round::{Round, RoundResults};
use crate::settlement::{Settlement, player_points};

/// Stake parameters of a round about to be recorded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoundStakes {
    pub round_points: i64,
    pub cowardice_points: i64,
    pub bock: bool,
}

impl RoundStakes {
    pub fn new(round_points: i64, cowardice_points: i64) -> Self {
        Self {
            round_points,
            cowardice_points,
            bock: false,
        }
    }

    pub fn with_bock(mut self, bock: bool) -> Self {
        self.bock = bock;
        self
    }
}

/// A single game of a group: a player snapshot plus its rounds.
///
/// Rounds are dense (`rounds[i].id() == i`) and every player's `result` is
/// settled after each edit made through this type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "GameRecord")]
pub struct Game {
    pub id: String,
    pub game_group_id: String,
    players: Vec<Player>,
    rounds: Vec<Round>,
    average_points: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

impl Game {
    /// Starts a game with a snapshot of `roster`, keeping each player's active flag.
    pub fn new(
        id: impl Into<String>,
        game_group_id: impl Into<String>,
        roster: &[Player],
    ) -> Self {
        let players = roster
            .iter()
            .map(|p| Player {
                result: 0.0,
                ..p.clone()
            })
            .collect();
        Self {
            id: id.into(),
            game_group_id: game_group_id.into(),
            players,
            rounds: Vec::new(),
            average_points: 0.0,
            date: None,
        }
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.active)
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn round(&self, index: usize) -> Result<&Round, ScoreError> {
        let len = self.rounds.len();
        self.rounds
            .get(index)
            .ok_or(ScoreError::RoundOutOfRange { index, len })
    }

    pub fn average_points(&self) -> f64 {
        self.average_points
    }

    /// Raw sum of `player`'s round deltas, regardless of the active flag.
    pub fn points_of(&self, player: &str) -> i64 {
        player_points(&self.rounds, player)
    }

    pub fn settlement(&self) -> Settlement {
        Settlement::of(&self.players, &self.rounds)
    }

    /// Appends a round with an unchanged entry for every active player and
    /// returns its index.
    pub fn add_round(&mut self, stakes: RoundStakes) -> usize {
        let results = self
            .active_players()
            .map(|p| (p.id.clone(), Outcome::Unchanged))
            .collect();
        self.push_round(stakes, results)
    }

    /// Appends a fully recorded round. Every outcome must belong to an active player.
    pub fn record_round(
        &mut self,
        stakes: RoundStakes,
        outcomes: impl IntoIterator<Item = (PlayerId, Outcome)>,
    ) -> Result<usize, ScoreError> {
        let mut results: RoundResults = self
            .active_players()
            .map(|p| (p.id.clone(), Outcome::Unchanged))
            .collect();
        for (player, outcome) in outcomes {
            self.ensure_active(&player)?;
            results.insert(player, outcome);
        }
        Ok(self.push_round(stakes, results))
    }

    /// Changes a player's outcome in an existing round.
    ///
    /// Players already listed in the round may be edited even if they have
    /// since left the table; new entries require an active player.
    pub fn set_outcome(
        &mut self,
        round: usize,
        player: &str,
        outcome: Outcome,
    ) -> Result<(), ScoreError> {
        if !self.round(round)?.results().contains(player) {
            self.ensure_active(player)?;
        }
        self.rounds[round].set_outcome(player, outcome);
        self.resettle();
        Ok(())
    }

    pub fn set_bock(&mut self, round: usize, bock: bool) -> Result<(), ScoreError> {
        self.round(round)?;
        self.rounds[round].set_bock(bock);
        self.resettle();
        Ok(())
    }

    pub fn toggle_bock(&mut self, round: usize) -> Result<(), ScoreError> {
        self.round(round)?;
        self.rounds[round].toggle_bock();
        self.resettle();
        Ok(())
    }

    pub fn set_stakes(
        &mut self,
        round: usize,
        round_points: i64,
        cowardice_points: i64,
    ) -> Result<(), ScoreError> {
        self.round(round)?;
        let target = &mut self.rounds[round];
        target.set_round_points(round_points);
        target.set_cowardice_points(cowardice_points);
        self.resettle();
        Ok(())
    }

    /// Removes the round at `index` and renumbers the following rounds.
    pub fn delete_round(&mut self, index: usize) -> Result<Round, ScoreError> {
        self.round(index)?;
        let removed = self.rounds.remove(index);
        self.renumber();
        self.resettle();
        tracing::debug!(game = %self.id, index, remaining = self.rounds.len(), "deleted round");
        Ok(removed)
    }

    pub fn set_player_active(&mut self, player: &str, active: bool) -> Result<(), ScoreError> {
        let target = self
            .players
            .iter_mut()
            .find(|p| p.id == player)
            .ok_or_else(|| ScoreError::UnknownPlayer(player.to_string()))?;
        target.active = active;
        self.resettle();
        Ok(())
    }

    pub(crate) fn resettle(&mut self) {
        let settlement = self.settlement();
        settlement.apply(&mut self.players);
        self.average_points = settlement.average_points();
    }

    fn push_round(&mut self, stakes: RoundStakes, results: RoundResults) -> usize {
        let index = self.rounds.len();
        let round = Round::new(index, stakes.round_points, stakes.cowardice_points)
            .with_bock(stakes.bock)
            .with_results(results);
        self.rounds.push(round);
        self.resettle();
        index
    }

    fn renumber(&mut self) {
        for (index, round) in self.rounds.iter_mut().enumerate() {
            round.set_id(index);
        }
    }

    fn ensure_active(&self, player: &str) -> Result<(), ScoreError> {
        match self.player(player) {
            Some(p) if p.active => Ok(()),
            Some(_) => Err(ScoreError::PlayerNotActive(player.to_string())),
            None => Err(ScoreError::UnknownPlayer(player.to_string())),
        }
    }
}

/// Game as the backend stores it. Loading renumbers rounds and re-settles.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameRecord {
    #[serde(default)]
    id: String,
    #[serde(default)]
    game_group_id: String,
    #[serde(default, deserialize_with = "lenient_list")]
    players: Vec<Player>,
    #[serde(default, deserialize_with = "lenient_list")]
    rounds: Vec<Round>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    date: Option<DateTime<Utc>>,
}

impl From<GameRecord> for Game {
    fn from(record: GameRecord) -> Self {
        let mut game = Game {
            id: record.id,
            game_group_id: record.game_group_id,
            players: record.players,
            rounds: record.rounds,
            average_points: 0.0,
            date: record.date,
        };
        if game.rounds.iter().enumerate().any(|(i, r)| r.id() != i) {
            tracing::debug!(game = %game.id, "stored round ids are not dense, renumbering");
        }
        game.renumber();
        game.resettle();
        game
    }
}
