//! Score keeping core for Doppelkopf groups: round settlement and group statistics.

pub mod error;
pub mod game;
pub mod group;
pub mod logging;
pub mod lookup;
pub mod outcome;
pub mod persist;
pub mod player;
pub mod round;
pub mod settlement;
pub mod stats;
pub mod visualize;

pub use crate::error::ScoreError;
pub use crate::game::{Game, RoundStakes};
pub use crate::group::{DEFAULT_START_FEE, GameGroup};
pub use crate::lookup::{PlayerDirectory, PlayerLookup};
pub use crate::outcome::Outcome;
pub use crate::persist::{load_game, load_group, parse_game, parse_group, save_game, save_group};
pub use crate::player::{Player, PlayerId};
pub use crate::round::{ResultEntry, Round, RoundResults};
pub use crate::settlement::{Settlement, compute_results, player_points};
pub use crate::stats::{
    CashDistribution, CashShare, GroupStatistics, PlayerStatistics, StatField, StatisticsConfig,
};
pub use crate::visualize::{
    SheetOptions, TableOptions, render_cash_distribution, render_game, render_statistics,
};
