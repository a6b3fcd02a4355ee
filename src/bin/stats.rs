use std::error::Error;
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, ValueEnum};
use plotters::prelude::*;

use dokoscore::visualize::render_statistics_with_options;
use dokoscore::{
    GroupStatistics, PlayerDirectory, StatField, StatisticsConfig, TableOptions, load_group,
    logging, render_cash_distribution,
};

/// Column plotted by `--chart`.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Column {
    GamesPlayed,
    GamesWon,
    GamesLost,
    RoundsPlayed,
    RoundsWon,
    RoundsLost,
    TotalPoints,
    PointsPerGame,
    PointsPerRound,
    CashShare,
}

impl From<Column> for StatField {
    fn from(column: Column) -> Self {
        match column {
            Column::GamesPlayed => StatField::GamesPlayed,
            Column::GamesWon => StatField::GamesWon,
            Column::GamesLost => StatField::GamesLost,
            Column::RoundsPlayed => StatField::RoundsPlayed,
            Column::RoundsWon => StatField::RoundsWon,
            Column::RoundsLost => StatField::RoundsLost,
            Column::TotalPoints => StatField::TotalPoints,
            Column::PointsPerGame => StatField::AveragePointsPerGame,
            Column::PointsPerRound => StatField::AveragePointsPerRound,
            Column::CashShare => StatField::CashShare,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "stats",
    about = "Aggregate a group's history into per-player statistics."
)]
struct Args {
    /// Group record (JSON)
    input: PathBuf,

    /// Euro value of one point in the cash share
    #[arg(long = "cent-per-point", default_value_t = dokoscore::stats::DEFAULT_CENT_PER_POINT)]
    cent_per_point: f64,

    /// Cash shares below this percentage get no inline label
    #[arg(long = "label-threshold", default_value_t = dokoscore::stats::DEFAULT_LABEL_THRESHOLD)]
    label_threshold: f64,

    /// Extra player records (JSON array) used to name guests
    #[arg(long = "guests")]
    guests: Option<PathBuf>,

    /// Hide guests from the table
    #[arg(long = "no-guests", action = ArgAction::SetTrue)]
    no_guests: bool,

    /// Print the statistics as JSON instead of a table
    #[arg(long = "json", action = ArgAction::SetTrue)]
    json: bool,

    /// Write a PNG bar chart here
    #[arg(long = "chart")]
    chart: Option<PathBuf>,

    /// Column shown in the chart
    #[arg(long = "column", value_enum, default_value_t = Column::CashShare)]
    column: Column,
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
    let group = load_group(&args.input)?;
    let config = StatisticsConfig::default()
        .with_cent_per_point(args.cent_per_point)
        .with_label_threshold(args.label_threshold);

    let mut directory = PlayerDirectory::new(&group);
    if let Some(path) = &args.guests {
        let guests: Vec<dokoscore::Player> = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        for guest in guests {
            directory.add_guest(guest);
        }
    }
    let stats = group.statistics(&directory, &config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        let options = TableOptions {
            include_guests: !args.no_guests,
            include_averages: true,
        };
        print!("{}", render_statistics_with_options(&stats, options));
        println!();
        print!("{}", render_cash_distribution(&stats.cash));
    }

    if let Some(out) = &args.chart {
        let field = StatField::from(args.column);
        render_bar_chart(out, &stats, field)?;
        println!("\nChart written to {}", out.display());
    }
    Ok(())
}

fn render_bar_chart(
    out: &PathBuf,
    stats: &GroupStatistics,
    field: StatField,
) -> Result<(), Box<dyn Error>> {
    // The cash chart follows the distribution order and only shows positive shares.
    let data: Vec<(String, f64, Option<f64>)> = if matches!(field, StatField::CashShare) {
        stats
            .cash
            .entries
            .iter()
            .map(|e| (e.name.clone(), e.value, e.labeled.then_some(e.percentage)))
            .collect()
    } else {
        stats
            .series(field)
            .into_iter()
            .map(|(name, value)| (name, value, None))
            .collect()
    };
    if data.is_empty() {
        return Err("nothing to plot".into());
    }

    let labels: Vec<String> = data.iter().map(|(l, _, _)| l.clone()).collect();
    let max_value = data.iter().map(|(_, v, _)| *v).fold(0.0_f64, f64::max);
    let min_value = data.iter().map(|(_, v, _)| *v).fold(0.0_f64, f64::min);
    let headroom = ((max_value - min_value) * 0.1).max(1.0);

    let root = BitMapBackend::new(out, (1000, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| format!("{e}"))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(field.label(), ("sans-serif", 28).into_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(
            (0..labels.len()).into_segmented(),
            min_value..max_value + headroom,
        )
        .map_err(|e| format!("{e}"))?;

    chart
        .configure_mesh()
        .y_desc(field.label())
        .x_desc("Player")
        .x_labels(labels.len())
        .x_label_formatter(&|segment| match segment {
            SegmentValue::CenterOf(idx) | SegmentValue::Exact(idx) if *idx < labels.len() => {
                labels[*idx].clone()
            }
            _ => String::new(),
        })
        .y_label_formatter(&|v| format!("{v:.1}"))
        .light_line_style(&WHITE.mix(0.0))
        .draw()
        .map_err(|e| format!("{e}"))?;

    for (i, (_, value, percentage)) in data.iter().enumerate() {
        let rect = Rectangle::new(
            [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *value)],
            BLUE.mix(0.7).filled(),
        );
        chart
            .draw_series(std::iter::once(rect))
            .map_err(|e| format!("{e}"))?;
        if let Some(percentage) = percentage {
            let text = Text::new(
                format!("{percentage:.1}%"),
                (SegmentValue::CenterOf(i), *value),
                ("sans-serif", 16).into_font(),
            );
            chart
                .draw_series(std::iter::once(text))
                .map_err(|e| format!("{e}"))?;
        }
    }

    root.present().map_err(|e| format!("{e}"))?;
    Ok(())
}
