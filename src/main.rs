//! Penny Ante command line
//!
//! Inspect table rules, spin a wheel, write default rule files and play
//! simulated rounds.

use clap::{Parser, Subcommand};
use penny_ante::{
    common::traits::OutcomeSource,
    config::write_default_config,
    roulette::Wheel,
    Bet, BetKind, BettingRules, ConfigSource, ConfigurationError, Player, RouletteResult,
    RuleOverlay, Table, TableType,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const PLAYER_NAME: &str = "player";

/// Roulette table rules engine
#[derive(Parser)]
#[command(name = "penny-ante")]
#[command(about = "Roulette betting rules and bet validation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Table type: american or european
    #[arg(short, long, default_value = "american", global = true)]
    table: TableType,

    /// Rules file (defaults to the shipped file for the table type)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// TOML file merged over the rules, one level deep
    #[arg(short, long, global = true)]
    overlay: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the table rules as JSON
    Info,

    /// Print payout and house edge for every bet type
    HouseEdge,

    /// Spin the wheel
    Spin {
        /// Number of spins
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,
    },

    /// Write the default rules for the table type
    InitConfig {
        /// Destination file
        path: PathBuf,
    },

    /// Play rounds staking on red
    Play {
        /// Rounds to play
        #[arg(short, long, default_value = "10")]
        rounds: usize,

        /// Chips staked each round
        #[arg(short, long, default_value = "10")]
        stake: u64,

        /// Starting chips
        #[arg(long, default_value = "100")]
        chips: u64,

        /// Seed for a repeatable game
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "penny_ante=debug"
    } else {
        "penny_ante=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Info => {
            let rules = load_rules(&cli)?;
            println!("{}", serde_json::to_string_pretty(&rules.table_info())?);
        }
        Commands::HouseEdge => {
            let rules = load_rules(&cli)?;
            print_house_edge(&rules);
        }
        Commands::Spin { count } => {
            let mut wheel = Wheel::new(cli.table);
            for _ in 0..*count {
                println!("{}", wheel.spin());
            }
        }
        Commands::InitConfig { path } => {
            write_default_config(path, cli.table)?;
            println!("Wrote {} rules to {}", cli.table, path.display());
        }
        Commands::Play {
            rounds,
            stake,
            chips,
            seed,
        } => {
            let rules = load_rules(&cli)?;
            play(rules, *rounds, *stake, *chips, *seed)?;
        }
    }

    Ok(())
}

fn load_rules(cli: &Cli) -> RouletteResult<BettingRules> {
    let source = match &cli.config {
        Some(path) => ConfigSource::Path(path.clone()),
        None => ConfigSource::Default(cli.table),
    };
    let overlay = cli.overlay.as_deref().map(read_overlay).transpose()?;

    BettingRules::from_source(cli.table, source, overlay)
}

fn read_overlay(path: &Path) -> Result<RuleOverlay, ConfigurationError> {
    let content = fs::read_to_string(path).map_err(|e| {
        ConfigurationError::Invalid(format!("Failed to read overlay {}: {}", path.display(), e))
    })?;

    toml::from_str(&content)
        .map_err(|e| ConfigurationError::Invalid(format!("Failed to parse overlay: {}", e)))
}

fn print_house_edge(rules: &BettingRules) {
    println!("{}", rules);
    println!("{:<14} {:>7} {:>9} {:>9} {:>8}", "bet", "payout", "minimum", "maximum", "edge");
    for kind in BetKind::ALL {
        match (rules.payout_ratio(kind), rules.house_edge(kind)) {
            (Ok(payout), Ok(edge)) => println!(
                "{:<14} {:>5}:1 {:>9} {:>9} {:>7.2}%",
                kind,
                payout,
                rules.minimum_bet(kind),
                rules.maximum_bet(kind),
                edge
            ),
            _ => println!("{:<14} {:>7}", kind, "-"),
        }
    }
}

fn play(
    rules: BettingRules,
    rounds: usize,
    stake: u64,
    chips: u64,
    seed: Option<u64>,
) -> RouletteResult<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut table = Table::new(rules);
    let mut player = Player::new(PLAYER_NAME);
    player.buy_chips(chips, 1)?;
    table.add_player(player)?;

    for round in 1..=rounds {
        let bet = Bet::outside(BetKind::Red, stake);
        if let Err(e) = table.place_bet(bet, Some(PLAYER_NAME)) {
            warn!(round, error = %e, "Bet refused, stopping");
            println!("Round {}: {}", round, e);
            break;
        }

        table.close_betting();
        let settlement = table.spin_and_settle_with(&mut rng)?;
        let balance = table.player(PLAYER_NAME).map_or(0, Player::balance);
        println!(
            "Round {}: {} -> paid {}, balance {}",
            round, settlement.outcome, settlement.total_paid, balance
        );
    }

    let balance = table.player(PLAYER_NAME).map_or(0, Player::balance);
    info!(starting = chips, balance, "Game over");
    println!("Finished with {} chips (started with {})", balance, chips);
    Ok(())
}
