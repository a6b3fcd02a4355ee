use std::error::Error;
use std::path::PathBuf;
use std::process;

use chrono::{DateTime, Duration, Utc};
use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use dokoscore::{
    GameGroup, Outcome, Player, PlayerId, RoundStakes, StatisticsConfig, logging, render_statistics,
    save_group,
};

const DEFAULT_SEED: u64 = 0xD0C0_0B0C_5EED_F00D;
/// First game date of a generated history (2024-01-05, a Friday).
const FIRST_GAME_EPOCH: i64 = 1_704_412_800;

const NAMES: [(&str, &str); 8] = [
    ("Anna", "Albers"),
    ("Bernd", "Bauer"),
    ("Clara", "Claussen"),
    ("Dieter", "Dahl"),
    ("Eva", "Engel"),
    ("Frank", "Fuchs"),
    ("Greta", "Graf"),
    ("Heinz", "Hoff"),
];

#[derive(Parser, Debug)]
#[command(
    name = "simulate",
    about = "Generate a synthetic Doppelkopf group history as JSON."
)]
struct Args {
    /// Roster size (4-8)
    #[arg(short = 'p', long = "players", default_value_t = 6)]
    players: usize,

    /// Number of games to generate
    #[arg(short = 'g', long = "games", default_value_t = 12)]
    games: usize,

    /// Rounds per game
    #[arg(short = 'r', long = "rounds", default_value_t = 24)]
    rounds: usize,

    /// RNG seed
    #[arg(short = 's', long = "seed", default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Start fee per player and game
    #[arg(long = "start-fee", default_value_t = dokoscore::DEFAULT_START_FEE)]
    start_fee: f64,

    /// Probability that a round is played as bock
    #[arg(long = "bock-rate", default_value_t = 0.15)]
    bock_rate: f64,

    /// Probability that a round is a solo
    #[arg(long = "solo-rate", default_value_t = 0.1)]
    solo_rate: f64,

    /// Output file
    #[arg(short = 'o', long = "out", default_value = "group.json")]
    out: PathBuf,

    /// Print the statistics of the generated history
    #[arg(long = "summary")]
    summary: bool,
}

fn main() {
    logging::init(logging::DEFAULT_FILTER);
    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    if !(4..=NAMES.len()).contains(&args.players) {
        return Err(format!(
            "expected between 4 and {} players, received {}",
            NAMES.len(),
            args.players
        )
        .into());
    }
    for rate in [args.bock_rate, args.solo_rate] {
        if !(0.0..=1.0).contains(&rate) {
            return Err("rates must lie between 0 and 1".into());
        }
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut group = GameGroup::new("simulated", "Simulated Doppelkopf group")
        .with_start_fee(args.start_fee);
    for (index, (firstname, name)) in NAMES.iter().take(args.players).enumerate() {
        group.add_player(Player::new(format!("p{index}"), *firstname, *name));
    }
    let roster: Vec<PlayerId> = group.players().iter().map(|p| p.id.clone()).collect();
    let first_date = DateTime::<Utc>::from_timestamp(FIRST_GAME_EPOCH, 0)
        .ok_or("invalid start date")?;

    for game_index in 0..args.games {
        // Four or five seats; everyone else sits this game out.
        let seats = if roster.len() > 4 && rng.gen_bool(0.5) { 5 } else { 4 };
        let mut seated = roster.clone();
        seated.shuffle(&mut rng);
        seated.truncate(seats);

        let game = group.start_game(format!("game-{game_index:03}"))?;
        game.date = Some(first_date + Duration::weeks(game_index as i64));
        for id in &roster {
            game.set_player_active(id, seated.contains(id))?;
        }
        for round_index in 0..args.rounds {
            let dealer = round_index % seats;
            let table: Vec<PlayerId> = seated
                .iter()
                .enumerate()
                .filter(|(seat, _)| seats == 4 || *seat != dealer)
                .map(|(_, id)| id.clone())
                .collect();
            let stakes = random_stakes(&mut rng, args.bock_rate);
            let outcomes = random_outcomes(&mut rng, &table, args.solo_rate);
            game.record_round(stakes, outcomes)?;
        }
        tracing::debug!(game = %game.id, average = game.average_points(), "generated game");
    }

    save_group(&args.out, &group)?;
    println!(
        "Wrote {} game(s) with {} player(s) to {}",
        group.games().len(),
        roster.len(),
        args.out.display()
    );

    if args.summary {
        let stats = group.statistics(&group, &StatisticsConfig::default())?;
        println!("\n{}", render_statistics(&stats));
    }
    Ok(())
}

fn random_stakes(rng: &mut StdRng, bock_rate: f64) -> RoundStakes {
    let round_points = rng.gen_range(1..=6);
    let cowardice_points = if rng.gen_bool(0.2) {
        rng.gen_range(1..=2)
    } else {
        0
    };
    RoundStakes::new(round_points, cowardice_points).with_bock(rng.gen_bool(bock_rate))
}

/// Splits the four playing seats into two sides, or one soloist against three.
fn random_outcomes(
    rng: &mut StdRng,
    table: &[PlayerId],
    solo_rate: f64,
) -> Vec<(PlayerId, Outcome)> {
    let mut order = table.to_vec();
    order.shuffle(rng);
    let first_side = if rng.gen_bool(solo_rate) { 1 } else { order.len() / 2 };
    let first_wins = rng.gen_bool(0.5);
    order
        .into_iter()
        .enumerate()
        .map(|(position, id)| {
            let on_first_side = position < first_side;
            let outcome = if on_first_side == first_wins {
                Outcome::Win
            } else {
                Outcome::Lose
            };
            (id, outcome)
        })
        .collect()
}

