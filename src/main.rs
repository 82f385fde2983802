use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use worldcup_atlas::records::{Dataset, DirSource, TableFiles};
use worldcup_atlas::report::{self, ReferenceTables};
use worldcup_atlas::scorers::DEFAULT_TOP_N;
use worldcup_atlas::render;

#[derive(Parser, Debug)]
#[command(
    name = "worldcup-atlas",
    about = "Finals, goals per country and top scorers from the historical World Cup CSVs",
    version
)]
struct Cli {
    /// Directory holding the three source CSV files
    #[arg(long = "data-dir", env = "WORLDCUP_DATA_DIR", default_value = "data/raw", global = true)]
    data_dir: PathBuf,

    #[arg(long = "matches-file", default_value = "WorldCupMatches.csv", global = true)]
    matches_file: String,

    #[arg(long = "players-file", default_value = "WorldCupPlayers.csv", global = true)]
    players_file: String,

    #[arg(long = "summaries-file", default_value = "WorldCups.csv", global = true)]
    summaries_file: String,

    /// CSV ([year,]label,latitude,longitude) replacing the built-in stadium table
    #[arg(long = "stadium-coords", global = true)]
    stadium_coords: Option<PathBuf>,

    /// CSV (label,latitude,longitude) replacing the built-in country positions
    #[arg(long = "country-coords", global = true)]
    country_coords: Option<PathBuf>,

    /// CSV (name,code) replacing the built-in ISO code table
    #[arg(long = "country-codes", global = true)]
    country_codes: Option<PathBuf>,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Winner, stadium, attendance and position of every final
    Stadiums,
    /// Home, away and total goals per country
    CountryGoals,
    /// Highest goal scorers
    TopScorers {
        #[arg(long = "top", default_value_t = DEFAULT_TOP_N)]
        top: usize,
    },
    /// Flag emoji for a country or team name
    Flag { country: String },
    /// Map marker payload as JSON
    Map,
    /// Chart payloads as JSON
    Charts {
        #[arg(long = "top", default_value_t = DEFAULT_TOP_N)]
        top: usize,
    },
    /// Every table and payload as one JSON document
    Report {
        #[arg(long = "top", default_value_t = DEFAULT_TOP_N)]
        top: usize,
    },
}

fn main() {
    let args = Cli::parse();
    init_tracing(args.verbose);

    if let Err(err) = run(args) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Cli) -> Result<()> {
    let tables = ReferenceTables::load(
        args.stadium_coords.as_deref(),
        args.country_coords.as_deref(),
        args.country_codes.as_deref(),
    )
    .context("loading reference tables")?;

    if let Command::Flag { country } = &args.command {
        println!("{}", tables.flag(country)?);
        return Ok(());
    }

    let source = DirSource::new(
        &args.data_dir,
        TableFiles {
            matches: args.matches_file.clone(),
            players: args.players_file.clone(),
            summaries: args.summaries_file.clone(),
        },
    );
    let dataset = Dataset::load(&source)
        .with_context(|| format!("loading dataset from {}", args.data_dir.display()))?;

    match args.command {
        Command::Stadiums => report::print_stadiums(&tables.stadiums(&dataset)?),
        Command::CountryGoals => report::print_country_goals(&tables.country_goals(&dataset)?),
        Command::TopScorers { top } => {
            report::print_top_scorers(&tables.top_scorers(&dataset, top)?)
        }
        Command::Map => {
            let stadiums = tables.stadiums(&dataset)?;
            let countries = tables.country_goals(&dataset)?;
            print_json(&render::build_map(&stadiums, &countries, &tables.flags)?)?;
        }
        Command::Charts { top } => {
            let countries = tables.country_goals(&dataset)?;
            let scorers = tables.top_scorers(&dataset, top)?;
            print_json(&[
                render::country_goals_chart(&countries),
                render::top_scorers_chart(&scorers),
            ])?;
        }
        Command::Report { top } => {
            print_json(&report::build_report(&dataset, &tables, top)?)?;
        }
        Command::Flag { .. } => {}
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
