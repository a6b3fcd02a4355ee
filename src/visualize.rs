use std::fmt::Write;

use crate::game::Game;
use crate::outcome::Outcome;
use crate::round::Round;
use crate::stats::{CashDistribution, GroupStatistics};

/// Customize the score sheet rendering.
#[derive(Clone, Copy, Debug)]
pub struct SheetOptions {
    pub show_rounds: bool,
    pub show_unchanged: bool,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            show_rounds: true,
            show_unchanged: false,
        }
    }
}

/// Fine tune the statistics table.
#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub include_guests: bool,
    pub include_averages: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            include_guests: true,
            include_averages: true,
        }
    }
}

pub fn render_game(game: &Game) -> String {
    render_game_with_options(game, SheetOptions::default())
}

pub fn render_game_with_options(game: &Game, options: SheetOptions) -> String {
    let mut out = String::new();
    let date = game
        .date
        .map(|d| d.format(" on %Y-%m-%d").to_string())
        .unwrap_or_default();
    let _ = writeln!(
        out,
        "Game {}{date}: {} round(s), average {:.2}",
        game.id,
        game.rounds().len(),
        game.average_points()
    );
    if options.show_rounds && !game.rounds().is_empty() {
        let _ = writeln!(out, "Rounds:");
        for round in game.rounds() {
            let _ = writeln!(out, "  #{:<3} {}", round.id(), describe_round(round));
            let mut entries = Vec::with_capacity(round.results().len());
            for (id, outcome) in round.results().iter() {
                if !options.show_unchanged && !outcome.is_decided() {
                    continue;
                }
                let name = game
                    .player(id)
                    .map(|p| p.display_name())
                    .unwrap_or_else(|| id.clone());
                entries.push(format!(
                    "{name} {} {:+}",
                    outcome_label(outcome),
                    round.delta(outcome)
                ));
            }
            if !entries.is_empty() {
                let _ = writeln!(out, "       {}", entries.join("  "));
            }
        }
    }
    let _ = writeln!(out, "Players:");
    for player in game.players() {
        let note = if player.active {
            ""
        } else {
            "  (sitting out, table average)"
        };
        let _ = writeln!(
            out,
            "  {:<20} {:>8.2}{note}",
            player.display_name(),
            player.result
        );
    }
    out
}

pub fn describe_round(round: &Round) -> String {
    let mut text = format!(
        "points {} cowardice {}",
        round.round_points(),
        round.cowardice_points()
    );
    if round.is_bock() {
        let _ = write!(text, "  bock x{}", round.multiplier());
    }
    if round.is_solo() {
        text.push_str("  solo");
    }
    text
}

pub fn render_statistics(stats: &GroupStatistics) -> String {
    render_statistics_with_options(stats, TableOptions::default())
}

pub fn render_statistics_with_options(stats: &GroupStatistics, options: TableOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Statistics over {} game(s):", stats.games_counted);
    let _ = write!(
        out,
        "  {:<20} {:>5} {:>5} {:>5} {:>6} {:>5} {:>5} {:>7}",
        "Player", "G", "GW", "GL", "R", "RW", "RL", "Points"
    );
    if options.include_averages {
        let _ = write!(out, " {:>8} {:>8}", "Pts/G", "Pts/R");
    }
    let _ = writeln!(out, " {:>9}", "Cash");
    for row in &stats.players {
        if row.guest && !options.include_guests {
            continue;
        }
        let name = if row.guest {
            format!("{} (guest)", row.name)
        } else {
            row.name.clone()
        };
        let _ = write!(
            out,
            "  {:<20} {:>5} {:>5} {:>5} {:>6} {:>5} {:>5} {:>7}",
            name,
            row.games_played,
            row.games_won,
            row.games_lost,
            row.rounds_played,
            row.rounds_won,
            row.rounds_lost,
            row.total_points
        );
        if options.include_averages {
            let _ = write!(
                out,
                " {:>8.2} {:>8.2}",
                row.average_points_per_game, row.average_points_per_round
            );
        }
        let _ = writeln!(out, " {:>9.2}", row.cash_share);
    }
    out
}

pub fn render_cash_distribution(cash: &CashDistribution) -> String {
    let mut out = String::new();
    if cash.entries.is_empty() {
        let _ = writeln!(out, "Cash distribution: (empty)");
        return out;
    }
    let _ = writeln!(out, "Cash distribution (total {:.2}):", cash.total);
    for entry in &cash.entries {
        let label = if entry.labeled {
            format!("{:>6.1}%", entry.percentage)
        } else {
            String::from("      -")
        };
        let _ = writeln!(out, "  {:<20} {:>9.2} {label}", entry.name, entry.value);
    }
    out
}

fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Win => "won",
        Outcome::Lose => "lost",
        Outcome::Unchanged => "sat",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::RoundStakes;
    use crate::player::Player;

    #[test]
    fn score_sheet_lists_rounds_and_players() {
        let roster = vec![
            Player::new("a", "Anna", "Arndt"),
            Player::new("b", "Ben", "Brandt"),
            Player::new("c", "Clara", "Cordes").with_active(false),
        ];
        let mut game = Game::new("g1", "grp", &roster);
        game.record_round(
            RoundStakes::new(3, 1).with_bock(true),
            [("a".to_string(), Outcome::Lose), ("b".to_string(), Outcome::Win)],
        )
        .expect("both players are active");

        let text = render_game(&game);
        assert!(text.contains("Game g1: 1 round(s)"));
        assert!(text.contains("bock x2"));
        assert!(text.contains("Anna Arndt lost +6"));
        assert!(text.contains("Ben Brandt won +2"));
        assert!(text.contains("sitting out"));
    }
}
