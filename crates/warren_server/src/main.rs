//! # warren_server — the dungeon server
//!
//! Startup sequence:
//!
//! 1. Initialise structured logging.
//! 2. Load and validate entity definitions (any error aborts startup).
//! 3. Generate the level from the seed.
//! 4. Spawn the simulation thread, which owns the tick cadence.
//! 5. Accept TCP clients; each session streams snapshots out and intents
//!    in under the shared world lock.

mod defs;
mod mapgen;
mod session;
mod sim;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use warren_core::World;

#[derive(Parser)]
#[command(name = "warren_server", about = "Multiplayer dungeon server over TCP")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "127.0.0.1:7777")]
    addr: String,

    /// Path to an entity definitions file (JSON); the built-in set is
    /// used when omitted
    #[arg(short, long)]
    defs: Option<PathBuf>,

    /// Simulation ticks per second
    #[arg(short, long, default_value_t = 10.0)]
    tick_rate: f64,

    /// World generation seed
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Stop the simulation after this many ticks (0 = run forever)
    #[arg(long, default_value_t = 0)]
    max_ticks: u64,

    /// Player view radius in tiles
    #[arg(long, default_value_t = 12)]
    view_radius: i32,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    info!(seed = args.seed, "warren server starting");

    let mut world = World::new(args.seed);
    defs::load(&mut world, args.defs.as_deref())?;

    let mut rng = StdRng::seed_from_u64(args.seed);
    let spawn = mapgen::generate(&mut world, &mut rng, &mapgen::MapParams::default())?;

    let world = Arc::new(Mutex::new(world));

    let sim_world = world.clone();
    let sim_config = sim::SimConfig {
        tick_rate: args.tick_rate,
        max_ticks: args.max_ticks,
    };
    std::thread::spawn(move || sim::run(sim_world, sim_config));

    let listener = TcpListener::bind(&args.addr).await?;
    let config = session::SessionConfig {
        view_radius: args.view_radius,
        snapshot_period: Duration::from_secs_f64(1.0 / args.tick_rate),
        spawn,
        player_class: "player".to_string(),
    };
    session::serve(listener, world, config).await
}
