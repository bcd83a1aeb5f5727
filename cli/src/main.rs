use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use geocoin_core::*;

use store::FileStore;

mod store;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Game configuration file (TOML), defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// File holding the saved game
    #[arg(short, long, default_value = "geocoin-save.json")]
    state: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the player's position, cell and coins
    Status,
    /// List the caches around the player
    Nearby,
    /// Walk one or more tiles
    Step {
        direction: Heading,
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u32,
    },
    /// Jump to a reported position
    #[command(allow_negative_numbers = true)]
    Locate { lat: f64, lng: f64 },
    /// Take a coin from the cache at cell (i, j)
    #[command(allow_negative_numbers = true)]
    Collect { i: i32, j: i32, coin: String },
    /// Leave a coin in the cache at cell (i, j)
    #[command(allow_negative_numbers = true)]
    Deposit { i: i32, j: i32, coin: String },
    /// Forget all progress and return to the start
    Reset,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Heading {
    North,
    South,
    East,
    West,
}

impl From<Heading> for Direction {
    fn from(heading: Heading) -> Self {
        match heading {
            Heading::North => Direction::North,
            Heading::South => Direction::South,
            Heading::East => Direction::East,
            Heading::West => Direction::West,
        }
    }
}

/// Stands in for a geolocation service: anything off the globe is reported as unavailable.
fn locate(lat: f64, lng: f64) -> std::result::Result<Point, PositionUnavailable> {
    if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) {
        Ok(Point::new(lat, lng))
    } else {
        Err(PositionUnavailable::new(format!("({lat}, {lng}) is not on the globe")))
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let content =
        fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    GameConfig::from_toml_str(&content).with_context(|| format!("loading config {}", path.display()))
}

fn print_status(session: &mut GameSession) {
    let position = session.player_position();
    let cell = session.player_cell();
    println!("position: {:.6}, {:.6} (cell {}:{})", position.lat, position.lng, cell.i, cell.j);
    let coins = session.inventory_identities();
    if coins.is_empty() {
        println!("no coins yet");
    } else {
        println!("{} coins: {}", coins.len(), coins.join(", "));
    }
    println!("{} caches nearby", session.visible_caches().count());
}

fn print_nearby(session: &GameSession) {
    for cache in session.visible_caches() {
        let cell = cache.cell();
        let bounds = session.board().cell_bounds(**cell);
        println!(
            "{}:{} [{:.4}, {:.4}] {} coins: {}",
            cell.i,
            cell.j,
            bounds.south_west.lat,
            bounds.south_west.lng,
            cache.coin_count(),
            cache.coin_identities().join(", ")
        );
    }
}

fn report(outcome: TransferOutcome, verb: &str) -> bool {
    match outcome {
        TransferOutcome::Moved(coin) => println!("{verb}ed {coin}"),
        TransferOutcome::NothingToMove => println!("nothing to {verb}"),
    }
    outcome.has_update()
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = load_config(args.config.as_ref())?;
    let mut store = FileStore::open(&args.state)?;
    let mut session = load_session(config, Sha256Luck, &store)
        .with_context(|| format!("restoring saved game {}", store.path().display()))?;

    let updated = match args.command {
        Command::Status => {
            print_status(&mut session);
            false
        }
        Command::Nearby => {
            print_nearby(&session);
            false
        }
        Command::Step { direction, count } => {
            for _ in 0..count {
                session.step(direction.into());
            }
            print_status(&mut session);
            count > 0
        }
        Command::Locate { lat, lng } => {
            let moved = session.apply_position_update(locate(lat, lng));
            if !moved {
                println!("position unavailable, staying put");
            }
            print_status(&mut session);
            moved
        }
        Command::Collect { i, j, coin } => report(session.collect(Cell::new(i, j), &coin)?, "collect"),
        Command::Deposit { i, j, coin } => report(session.deposit(Cell::new(i, j), &coin)?, "deposit"),
        Command::Reset => {
            session.reset();
            clear_saved(&mut store);
            store.flush()?;
            println!("progress cleared");
            false
        }
    };

    if updated {
        save_session(&session, &mut store)?;
        store.flush()?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();
    log::debug!("args: {:?}", args);
    run(args)
}
