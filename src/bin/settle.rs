use std::error::Error;
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser};

use dokoscore::visualize::render_game_with_options;
use dokoscore::{SheetOptions, compute_results, load_game, logging, save_game};

#[derive(Parser, Debug)]
#[command(
    name = "settle",
    about = "Re-settle a stored game and print its score sheet."
)]
struct Args {
    /// Game record (JSON)
    input: PathBuf,

    /// Flip the bock flag of the given round before settling (repeatable)
    #[arg(long = "toggle-bock", action = ArgAction::Append)]
    toggle_bock: Vec<usize>,

    /// Delete the round with the given index before settling
    #[arg(long = "delete-round")]
    delete_round: Option<usize>,

    /// Also list players who sat out a round
    #[arg(long = "show-unchanged", action = ArgAction::SetTrue)]
    show_unchanged: bool,

    /// Only print player totals
    #[arg(long = "totals-only", action = ArgAction::SetTrue)]
    totals_only: bool,

    /// Write the normalised record here (use the input path to update in place)
    #[arg(short = 'o', long = "out")]
    out: Option<PathBuf>,
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
    let mut game = load_game(&args.input)?;
    for round in &args.toggle_bock {
        game.toggle_bock(*round)?;
    }
    if let Some(index) = args.delete_round {
        let removed = game.delete_round(index)?;
        println!(
            "Deleted round {index} ({} point(s), bock: {}).",
            removed.round_points(),
            removed.is_bock()
        );
    }

    let game = compute_results(&game);
    let options = SheetOptions {
        show_rounds: !args.totals_only,
        show_unchanged: args.show_unchanged,
    };
    print!("{}", render_game_with_options(&game, options));

    if let Some(out) = &args.out {
        save_game(out, &game)?;
        println!("\nSettled record written to {}", out.display());
    }
    Ok(())
}
