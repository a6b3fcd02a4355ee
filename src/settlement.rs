//! Round settlement: turns outcome codes into per-player point totals.
//!
//! Active players carry the sum of their round deltas. Inactive players are
//! shown the mean of the active players' totals, which is also stored as the
//! game's average.

use std::collections::BTreeMap;

use crate::game::Game;
use crate::player::{Player, PlayerId};
use crate::round::Round;

/// Sum of `player`'s deltas over `rounds`, saturating at the `i64` bounds.
pub fn player_points(rounds: &[Round], player: &str) -> i64 {
    rounds
        .iter()
        .fold(0, |total, round| total.saturating_add(round.points_for(player)))
}

/// Settled totals for a game's players.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Settlement {
    totals: BTreeMap<PlayerId, f64>,
    average_points: f64,
}

impl Settlement {
    pub fn of(players: &[Player], rounds: &[Round]) -> Self {
        let active: Vec<(&PlayerId, f64)> = players
            .iter()
            .filter(|p| p.active)
            .map(|p| (&p.id, player_points(rounds, &p.id) as f64))
            .collect();
        let average_points = if active.is_empty() {
            0.0
        } else {
            active.iter().map(|(_, total)| total).sum::<f64>() / active.len() as f64
        };

        let mut totals: BTreeMap<PlayerId, f64> = players
            .iter()
            .map(|p| (p.id.clone(), average_points))
            .collect();
        for (id, total) in active {
            totals.insert(id.clone(), total);
        }

        tracing::debug!(
            players = players.len(),
            rounds = rounds.len(),
            average_points,
            "settled game"
        );
        Self {
            totals,
            average_points,
        }
    }

    /// Settled result of `player`, zero for players outside the game.
    pub fn result_for(&self, player: &str) -> f64 {
        self.totals.get(player).copied().unwrap_or(0.0)
    }

    pub fn average_points(&self) -> f64 {
        self.average_points
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlayerId, f64)> {
        self.totals.iter().map(|(id, total)| (id, *total))
    }

    /// Writes the settled totals into the matching player records.
    pub fn apply(&self, players: &mut [Player]) {
        for player in players {
            player.result = self.result_for(&player.id);
        }
    }
}

/// Returns a copy of `game` with every player's result and the game average
/// recomputed from its rounds. Calling it repeatedly yields the same record.
pub fn compute_results(game: &Game) -> Game {
    let mut settled = game.clone();
    settled.resettle();
    settled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Outcome;

    #[test]
    fn no_active_players_average_is_zero() {
        let players = vec![
            Player::new("a", "Anna", "A").with_active(false),
            Player::new("b", "Ben", "B").with_active(false),
        ];
        let settlement = Settlement::of(&players, &[]);
        assert_eq!(settlement.average_points(), 0.0);
        assert_eq!(settlement.result_for("a"), 0.0);
    }

    #[test]
    fn inactive_player_outcomes_are_ignored() {
        let players = vec![
            Player::new("a", "", ""),
            Player::new("b", "", ""),
            Player::new("c", "", "").with_active(false),
        ];
        let mut round = Round::new(0, 6, 0);
        round.set_outcome("a", Outcome::Lose);
        round.set_outcome("b", Outcome::Win);
        round.set_outcome("c", Outcome::Lose);
        let settlement = Settlement::of(&players, &[round]);
        assert_eq!(settlement.result_for("a"), 6.0);
        assert_eq!(settlement.result_for("b"), 0.0);
        assert_eq!(settlement.result_for("c"), 3.0);
        assert_eq!(settlement.result_for("nobody"), 0.0);
    }
}
