//! Lucky Reels terminal front end
//!
//! Usage:
//!   lucky-reels spin --bet 10            - One animated spin
//!   lucky-reels spin --autoplay          - Spin until credits run out
//!   lucky-reels reseed [SEED]            - Replace the gameplay seed
//!   lucky-reels status                   - Credits, last win, RTP, seed
//!   lucky-reels simulate --spins 100000  - Headless return-to-player run

mod render;

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use lr_slot::{MachineConfig, SlotError, SlotSession, SpinResult, parse_bet};
use lr_state::{AccountStore, CREDITS_KEY, JsonFileStore, MemoryStore, SEED_KEY};

#[derive(Parser)]
#[command(name = "lucky-reels", version, about = "Deterministic 5x3 slot machine")]
struct Cli {
    /// Machine config (.json, .yaml or .yml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// State file (defaults to the platform data directory)
    #[arg(short, long, global = true)]
    state: Option<PathBuf>,

    /// Keep credits and seed in memory only
    #[arg(long, global = true)]
    memory: bool,

    /// Reseed before running the command
    #[arg(long, global = true)]
    seed: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Spin the reels
    Spin {
        /// Bet per spin (non-numeric or < 1 is treated as 1)
        #[arg(short, long, default_value = "1")]
        bet: String,
        /// Number of spins (autoplay without a count runs until credits run out)
        #[arg(short = 'n', long)]
        count: Option<u64>,
        /// Keep spinning with a short pause between spins
        #[arg(short, long)]
        autoplay: bool,
        /// Skip animation and autoplay pauses
        #[arg(long)]
        no_delay: bool,
    },
    /// Replace the gameplay seed (random when omitted)
    Reseed { seed: Option<String> },
    /// Show credits, last win, RTP and seed
    Status,
    /// Spin headlessly on a scratch account and report statistics
    Simulate {
        #[arg(long, default_value_t = 10_000)]
        spins: u64,
        #[arg(long, default_value_t = 1)]
        bet: u64,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => MachineConfig::load(path)
            .with_context(|| format!("Failed to load machine config {}", path.display()))?,
        None => MachineConfig::reference(),
    };

    if let Commands::Simulate { spins, bet } = cli.command {
        return simulate(config, cli.seed.as_deref(), spins, bet, cli.json);
    }

    let account = open_account(cli.memory, cli.state.as_ref());
    let mut session = SlotSession::open(config, account).context("Invalid machine config")?;

    if let Some(seed) = cli.seed.as_deref() {
        session.request_reseed(Some(seed))?;
    }

    match cli.command {
        Commands::Spin {
            bet,
            count,
            autoplay,
            no_delay,
        } => spin(&mut session, parse_bet(&bet), count, autoplay, no_delay, cli.json),
        Commands::Reseed { seed } => {
            let seed = session.request_reseed(seed.as_deref())?;
            if cli.json {
                print_json(&serde_json::json!({ "seed": seed }))?;
            } else {
                println!("seed {seed}");
            }
            Ok(())
        }
        Commands::Status => {
            let state = session.display_state();
            if cli.json {
                print_json(&state)?;
            } else {
                print!("{}", render::status(&state, session.persistence_degraded()));
            }
            Ok(())
        }
        Commands::Simulate { .. } => Ok(()),
    }
}

/// File-backed account, or memory when asked to or when the file is unusable
fn open_account(memory: bool, state: Option<&PathBuf>) -> AccountStore {
    if memory {
        return AccountStore::in_memory();
    }

    let opened = match state {
        Some(path) => JsonFileStore::open(path),
        None => JsonFileStore::open_default(),
    };

    match opened {
        Ok(store) => {
            log::info!("Using state file {}", store.path().display());
            AccountStore::new(store)
        }
        Err(e) => {
            log::warn!("State file unavailable ({}), continuing in memory", e);
            AccountStore::in_memory()
        }
    }
}

fn spin(
    session: &mut SlotSession,
    bet: u64,
    count: Option<u64>,
    autoplay: bool,
    no_delay: bool,
    json: bool,
) -> Result<()> {
    session.set_autoplay(autoplay);
    let limit = count.unwrap_or(if autoplay { u64::MAX } else { 1 });

    let mut done = 0;
    while done < limit {
        let result = match animated_spin(session, bet, no_delay) {
            Ok(result) => result,
            Err(SlotError::InsufficientFunds { bet, credits }) => {
                println!("Not enough credits: bet {bet}, have {credits}");
                break;
            }
            Err(e) => return Err(e.into()),
        };
        done += 1;

        if json {
            print_json(&result)?;
        } else {
            print!("{}", render::spin_result(&session.paytable().catalog, &result));
        }

        if done < limit && !no_delay {
            if let Some(delay) = session.autoplay_delay() {
                thread::sleep(delay);
            }
        }
    }

    if !json {
        print!("{}", render::status(&session.display_state(), session.persistence_degraded()));
    }
    Ok(())
}

/// Begin a spin and report each reel as settled when its animation would end
fn animated_spin(
    session: &mut SlotSession,
    bet: u64,
    no_delay: bool,
) -> Result<SpinResult, SlotError> {
    if no_delay {
        return session.request_spin(bet);
    }

    let ticket = session.begin_spin(bet)?;
    let started = Instant::now();
    let mut result = None;

    for stop in ticket.stops_by_settle_time() {
        let due = started + Duration::from_secs_f64(stop.timing.settle_at_ms().max(0.0) / 1000.0);
        if let Some(wait) = due.checked_duration_since(Instant::now()) {
            thread::sleep(wait);
        }
        result = session.settle_reel(stop.reel, stop.target_offset_px)?;
    }

    result.ok_or(SlotError::SpinIncomplete(ticket.spin_id))
}

#[derive(Serialize)]
struct SimulationReport<'a> {
    seed: &'a str,
    bet: u64,
    stats: &'a lr_slot::SessionStats,
    return_to_player: Option<f64>,
}

/// Scratch account funded for exactly `spins * bet`; the player's state is untouched
fn simulate(
    config: MachineConfig,
    seed: Option<&str>,
    spins: u64,
    bet: u64,
    json: bool,
) -> Result<()> {
    let bet = bet.max(1);
    let mut values = vec![(CREDITS_KEY, spins.saturating_mul(bet).to_string())];
    if let Some(seed) = seed {
        values.push((SEED_KEY, seed.to_string()));
    }

    let account = AccountStore::new(MemoryStore::with_values(values));
    let mut session = SlotSession::open(config, account).context("Invalid machine config")?;

    log::info!("Simulating {} spins at bet {} (seed {:?})", spins, bet, session.seed());

    // Wins go back on the balance, so funds never run out before the count.
    for _ in 0..spins {
        session.request_spin(bet)?;
    }

    let stats = session.stats();
    if json {
        print_json(&SimulationReport {
            seed: session.seed(),
            bet,
            stats,
            return_to_player: stats.return_to_player(),
        })?;
    } else {
        println!("seed {}  bet {}", session.seed(), bet);
        print!("{}", render::stats(stats));
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
