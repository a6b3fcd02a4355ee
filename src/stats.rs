//! Statistics over a group's whole history of games.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::error::ScoreError;
use crate::game::Game;
use crate::group::GameGroup;
use crate::lookup::PlayerLookup;
use crate::player::PlayerId;

/// Euro value of one point in the cash share transform.
pub const DEFAULT_CENT_PER_POINT: f64 = 0.1;
/// Cash shares below this percentage are left without an inline label.
pub const DEFAULT_LABEL_THRESHOLD: f64 = 5.0;

/// Tunables of the aggregation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatisticsConfig {
    pub cent_per_point: f64,
    pub label_threshold: f64,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            cent_per_point: DEFAULT_CENT_PER_POINT,
            label_threshold: DEFAULT_LABEL_THRESHOLD,
        }
    }
}

impl StatisticsConfig {
    pub fn with_cent_per_point(mut self, cent_per_point: f64) -> Self {
        self.cent_per_point = cent_per_point;
        self
    }

    pub fn with_label_threshold(mut self, label_threshold: f64) -> Self {
        self.label_threshold = label_threshold;
        self
    }

    pub fn validate(&self) -> Result<(), ScoreError> {
        if !self.cent_per_point.is_finite() || self.cent_per_point < 0.0 {
            return Err(ScoreError::InvalidConfiguration(
                "cent per point must be a non-negative number",
            ));
        }
        if !self.label_threshold.is_finite() || !(0.0..=100.0).contains(&self.label_threshold) {
            return Err(ScoreError::InvalidConfiguration(
                "label threshold must be a percentage between 0 and 100",
            ));
        }
        Ok(())
    }
}

/// Aggregated numbers for one player.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatistics {
    pub player_id: PlayerId,
    pub name: String,
    /// Not part of the group roster.
    pub guest: bool,
    pub games_played: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub rounds_played: u32,
    pub rounds_won: u32,
    pub rounds_lost: u32,
    pub total_points: i64,
    pub average_points_per_game: f64,
    pub average_points_per_round: f64,
    pub cash_share: f64,
}

impl PlayerStatistics {
    fn new(player_id: PlayerId, guest: bool) -> Self {
        Self {
            name: player_id.clone(),
            player_id,
            guest,
            ..Self::default()
        }
    }

    fn finish(&mut self) {
        self.average_points_per_game = ratio(self.total_points, self.games_played);
        self.average_points_per_round = ratio(self.total_points, self.rounds_played);
    }
}

fn ratio(total: i64, count: u32) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / f64::from(count)
    }
}

/// Numeric columns of [`PlayerStatistics`], for charts and sorting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatField {
    GamesPlayed,
    GamesWon,
    GamesLost,
    RoundsPlayed,
    RoundsWon,
    RoundsLost,
    TotalPoints,
    AveragePointsPerGame,
    AveragePointsPerRound,
    CashShare,
}

impl StatField {
    pub const ALL: [StatField; 10] = [
        StatField::GamesPlayed,
        StatField::GamesWon,
        StatField::GamesLost,
        StatField::RoundsPlayed,
        StatField::RoundsWon,
        StatField::RoundsLost,
        StatField::TotalPoints,
        StatField::AveragePointsPerGame,
        StatField::AveragePointsPerRound,
        StatField::CashShare,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StatField::GamesPlayed => "Games played",
            StatField::GamesWon => "Games won",
            StatField::GamesLost => "Games lost",
            StatField::RoundsPlayed => "Rounds played",
            StatField::RoundsWon => "Rounds won",
            StatField::RoundsLost => "Rounds lost",
            StatField::TotalPoints => "Total points",
            StatField::AveragePointsPerGame => "Points per game",
            StatField::AveragePointsPerRound => "Points per round",
            StatField::CashShare => "Cash share",
        }
    }

    pub fn value(&self, stats: &PlayerStatistics) -> f64 {
        match self {
            StatField::GamesPlayed => f64::from(stats.games_played),
            StatField::GamesWon => f64::from(stats.games_won),
            StatField::GamesLost => f64::from(stats.games_lost),
            StatField::RoundsPlayed => f64::from(stats.rounds_played),
            StatField::RoundsWon => f64::from(stats.rounds_won),
            StatField::RoundsLost => f64::from(stats.rounds_lost),
            StatField::TotalPoints => stats.total_points as f64,
            StatField::AveragePointsPerGame => stats.average_points_per_game,
            StatField::AveragePointsPerRound => stats.average_points_per_round,
            StatField::CashShare => stats.cash_share,
        }
    }
}

/// One slice of the cash distribution.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashShare {
    pub player_id: PlayerId,
    pub name: String,
    pub value: f64,
    pub percentage: f64,
    /// Large enough to carry an inline label.
    pub labeled: bool,
}

/// Players with a positive cash share, largest first.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashDistribution {
    pub entries: Vec<CashShare>,
    pub total: f64,
}

impl CashDistribution {
    fn from_players(players: &[PlayerStatistics], label_threshold: f64) -> Self {
        let mut positive: Vec<&PlayerStatistics> =
            players.iter().filter(|p| p.cash_share > 0.0).collect();
        positive.sort_by(|a, b| {
            b.cash_share
                .partial_cmp(&a.cash_share)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });
        let total: f64 = positive.iter().map(|p| p.cash_share).sum();
        let entries = positive
            .into_iter()
            .map(|p| {
                let percentage = if total > 0.0 {
                    p.cash_share / total * 100.0
                } else {
                    0.0
                };
                CashShare {
                    player_id: p.player_id.clone(),
                    name: p.name.clone(),
                    value: p.cash_share,
                    percentage,
                    labeled: percentage >= label_threshold,
                }
            })
            .collect();
        Self { entries, total }
    }
}

/// Per-player statistics of a group plus its cash distribution.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStatistics {
    /// Roster players in roster order, followed by guests ordered by id.
    pub players: Vec<PlayerStatistics>,
    pub cash: CashDistribution,
    pub games_counted: usize,
}

impl GroupStatistics {
    /// Aggregates `group`'s history. Ids that are not on the roster become
    /// guest rows named through `guests`.
    ///
    /// The only error besides invalid configuration is a game that belongs to
    /// another group.
    pub fn compute(
        group: &GameGroup,
        guests: &dyn PlayerLookup,
        config: &StatisticsConfig,
    ) -> Result<Self, ScoreError> {
        config.validate()?;
        for game in group.games() {
            group.check_membership(game)?;
        }

        let mut tally = Tally::new(group);
        let mut games_counted = 0;
        for game in group.games() {
            if game.rounds().is_empty() {
                continue;
            }
            tally.add_game(game, group.start_fee, config.cent_per_point);
            games_counted += 1;
        }

        let players = tally.finish(guests);
        let cash = CashDistribution::from_players(&players, config.label_threshold);
        tracing::debug!(
            group = %group.id,
            games = games_counted,
            players = players.len(),
            cash_total = cash.total,
            "aggregated group statistics"
        );
        Ok(Self {
            players,
            cash,
            games_counted,
        })
    }

    pub fn player(&self, id: &str) -> Option<&PlayerStatistics> {
        self.players.iter().find(|p| p.player_id == id)
    }

    /// `(name, value)` pairs of one column, in table order.
    pub fn series(&self, field: StatField) -> Vec<(String, f64)> {
        self.players
            .iter()
            .map(|p| (p.name.clone(), field.value(p)))
            .collect()
    }
}

/// Running accumulation for one aggregation call.
struct Tally<'a> {
    group: &'a GameGroup,
    rows: HashMap<PlayerId, PlayerStatistics>,
    snapshot_names: HashMap<PlayerId, String>,
}

impl<'a> Tally<'a> {
    fn new(group: &'a GameGroup) -> Self {
        let rows = group
            .players()
            .iter()
            .map(|p| {
                let mut row = PlayerStatistics::new(p.id.clone(), false);
                row.name = p.display_name();
                (p.id.clone(), row)
            })
            .collect();
        Self {
            group,
            rows,
            snapshot_names: HashMap::new(),
        }
    }

    fn row(&mut self, id: &str) -> &mut PlayerStatistics {
        self.rows
            .entry(id.to_string())
            .or_insert_with(|| PlayerStatistics::new(id.to_string(), true))
    }

    fn add_game(&mut self, game: &Game, start_fee: f64, cent_per_point: f64) {
        for player in game.players() {
            self.snapshot_names
                .entry(player.id.clone())
                .or_insert_with(|| player.display_name());
        }

        for round in game.rounds() {
            for (id, outcome) in round.results().iter() {
                let points = round.delta(outcome);
                let row = self.row(id);
                row.total_points = row.total_points.saturating_add(points);
                if outcome.is_decided() {
                    row.rounds_played += 1;
                }
                if outcome.is_win() {
                    row.rounds_won += 1;
                } else if outcome.is_lose() {
                    row.rounds_lost += 1;
                }
            }
        }

        // Lowest sum wins; ties share the win. Decided per game over everyone
        // who took part, but only players still seated count the game.
        let mut participants: BTreeSet<&str> =
            game.active_players().map(|p| p.id.as_str()).collect();
        for round in game.rounds() {
            participants.extend(round.results().iter().map(|(id, _)| id.as_str()));
        }
        let points: Vec<(&str, i64)> = participants
            .into_iter()
            .map(|id| (id, game.points_of(id)))
            .collect();
        if let Some(best) = points.iter().map(|(_, total)| *total).min() {
            for (id, total) in points {
                if !game.player(id).is_some_and(|p| p.active) {
                    continue;
                }
                let row = self.row(id);
                row.games_played += 1;
                if total == best {
                    row.games_won += 1;
                } else {
                    row.games_lost += 1;
                }
            }
        }

        let settlement = game.settlement();
        for player in game.players() {
            let share = settlement.result_for(&player.id) * cent_per_point + start_fee;
            self.row(&player.id).cash_share += share;
        }
    }

    fn finish(self, guests: &dyn PlayerLookup) -> Vec<PlayerStatistics> {
        let Tally {
            group,
            mut rows,
            snapshot_names,
        } = self;

        let mut players = Vec::with_capacity(rows.len());
        for member in group.players() {
            if let Some(row) = rows.remove(&member.id) {
                players.push(row);
            }
        }
        let mut guest_rows: Vec<PlayerStatistics> = rows.into_values().collect();
        guest_rows.sort_by(|a, b| a.player_id.cmp(&b.player_id));
        for row in &mut guest_rows {
            row.name = guests
                .lookup(&row.player_id)
                .map(|p| p.display_name())
                .or_else(|| snapshot_names.get(&row.player_id).cloned())
                .unwrap_or_else(|| row.player_id.clone());
        }
        players.extend(guest_rows);

        for row in &mut players {
            row.finish();
        }
        players
    }
}
