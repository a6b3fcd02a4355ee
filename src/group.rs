use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScoreError;
use crate::game::Game;
use crate::lookup::PlayerLookup;
use crate::persist::{lenient_list, lenient_timestamp};
use crate::player::Player;
use crate::stats::{GroupStatistics, StatisticsConfig};

/// Start fee charged per player and game when a record carries none.
pub const DEFAULT_START_FEE: f64 = 5.0;

fn default_start_fee() -> f64 {
    DEFAULT_START_FEE
}

/// A persistent circle of players together with its history of games.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameGroup {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_list")]
    players: Vec<Player>,
    #[serde(default, deserialize_with = "lenient_list")]
    games: Vec<Game>,
    #[serde(default = "default_start_fee")]
    pub start_fee: f64,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl GameGroup {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            players: Vec::new(),
            games: Vec::new(),
            start_fee: DEFAULT_START_FEE,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_start_fee(mut self, start_fee: f64) -> Self {
        self.start_fee = start_fee;
        self
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn game(&self, id: &str) -> Option<&Game> {
        self.games.iter().find(|g| g.id == id)
    }

    pub fn game_mut(&mut self, id: &str) -> Option<&mut Game> {
        self.games.iter_mut().find(|g| g.id == id)
    }

    /// Adds `player` to the roster, replacing an entry with the same id.
    pub fn add_player(&mut self, player: Player) {
        match self.players.iter_mut().find(|p| p.id == player.id) {
            Some(existing) => *existing = player,
            None => self.players.push(player),
        }
    }

    /// Removes a player from the roster. Past games keep their snapshot.
    pub fn remove_player(&mut self, id: &str) -> Option<Player> {
        let index = self.players.iter().position(|p| p.id == id)?;
        Some(self.players.remove(index))
    }

    pub fn set_player_active(&mut self, id: &str, active: bool) -> Result<(), ScoreError> {
        let player = self
            .players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ScoreError::UnknownPlayer(id.to_string()))?;
        player.active = active;
        Ok(())
    }

    /// Starts a new game from the current roster and returns it for editing.
    pub fn start_game(&mut self, id: impl Into<String>) -> Result<&mut Game, ScoreError> {
        let game = Game::new(id, self.id.clone(), &self.players);
        self.add_game(game)
    }

    /// Adds an existing game record. Games of another group are rejected.
    pub fn add_game(&mut self, game: Game) -> Result<&mut Game, ScoreError> {
        self.check_membership(&game)?;
        if self.game(&game.id).is_some() {
            return Err(ScoreError::DuplicateGame(game.id));
        }
        self.games.push(game);
        let index = self.games.len() - 1;
        Ok(&mut self.games[index])
    }

    pub fn remove_game(&mut self, id: &str) -> Option<Game> {
        let index = self.games.iter().position(|g| g.id == id)?;
        Some(self.games.remove(index))
    }

    /// Aggregates statistics over the whole history of this group.
    pub fn statistics(
        &self,
        guests: &dyn PlayerLookup,
        config: &StatisticsConfig,
    ) -> Result<GroupStatistics, ScoreError> {
        GroupStatistics::compute(self, guests, config)
    }

    /// Games without a group id are treated as belonging to this group.
    pub(crate) fn check_membership(&self, game: &Game) -> Result<(), ScoreError> {
        if game.game_group_id.is_empty() || game.game_group_id == self.id {
            Ok(())
        } else {
            Err(ScoreError::GroupMismatch {
                game: game.id.clone(),
                expected: self.id.clone(),
                found: game.game_group_id.clone(),
            })
        }
    }
}
