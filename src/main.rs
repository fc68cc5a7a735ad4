//! Binary entrypoint for the goosebridge CLI.
//!
//! Commands:
//! - `init` - write a starter `config.toml`
//! - `start [--scene <json>] [--address] [--port] [--slot] [--ask-password] [--tick-ms]` - connect and drive a headless scene
//! - `status` - print the persisted slot identity and progression
//! - `reset` - wipe persisted progression
//! - `resolve --scene <json>` - print resolver bucket assignments for a scene dump
//!
//! See the library crate docs for module-level details: `goosebridge::`.
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use goosebridge::config::Config;
use goosebridge::link::{Credentials, RemoteLink};
use goosebridge::metrics;
use goosebridge::progression::{ProgressionState, SessionIdentity};
use goosebridge::resolver::EntityResolver;
use goosebridge::session::{SessionCoordinator, SessionEvent, SessionPhase};
use goosebridge::storage::SledKvStore;
use goosebridge::validation::{parse_port, split_server_address, IdentityError};
use goosebridge::world::SceneWorld;

#[derive(Parser)]
#[command(name = "goosebridge")]
#[command(about = "Multiworld progression bridge for a goose simulation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// Connect to the server and drive the session tick
    Start {
        /// JSON scene dump to load into the headless world
        #[arg(long)]
        scene: Option<String>,
        /// Server address (overrides config)
        #[arg(short, long)]
        address: Option<String>,
        /// Server port (overrides config)
        #[arg(short, long, value_parser = port_arg)]
        port: Option<u16>,
        /// Slot name (overrides config)
        #[arg(short, long)]
        slot: Option<String>,
        /// Prompt for the room password
        #[arg(long)]
        ask_password: bool,
        /// Update tick interval in milliseconds
        #[arg(long, default_value_t = 16)]
        tick_ms: u64,
    },
    /// Show the persisted session and progression
    Status,
    /// Wipe all persisted progression
    Reset,
    /// Print how the resolver classifies a scene dump
    Resolve {
        /// JSON scene dump
        #[arg(long)]
        scene: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let pre_config = match cli.command {
        Commands::Init => None,
        _ => Config::load(&cli.config).await.ok(),
    };
    init_logging(&pre_config, cli.verbose);

    match cli.command {
        Commands::Init => {
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
        }
        Commands::Start {
            scene,
            address,
            port,
            slot,
            ask_password,
            tick_ms,
        } => {
            let mut config = pre_config.unwrap_or_default();
            if let Some(address) = address {
                config.server.address = address;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(slot) = slot {
                config.server.slot = slot;
            }
            if ask_password {
                config.server.password = Some(rpassword::prompt_password("Room password: ")?);
            }
            run(config, scene, tick_ms).await?;
        }
        Commands::Status => {
            let config = pre_config.unwrap_or_default();
            let store = SledKvStore::open(&config.storage.data_dir)?;
            match SessionIdentity::load(&store) {
                Some(identity) => println!("Slot: {}", identity),
                None => println!("Slot: (none)"),
            }
            let state = ProgressionState::load(&store);
            let flags: Vec<&str> = state.flags().collect();
            println!("Capabilities ({}): {}", flags.len(), flags.join(", "));
            for (name, value) in state.counters() {
                println!("  {} = {}", name, value);
            }
            println!("Locations reported: {}", state.locations_sent().count());
            println!("Items applied: {}", state.items_applied());
        }
        Commands::Reset => {
            let config = pre_config.unwrap_or_default();
            let mut store = SledKvStore::open(&config.storage.data_dir)?;
            let removed = ProgressionState::wipe_persisted(&mut store)?;
            println!("Removed {} persisted keys.", removed);
        }
        Commands::Resolve { scene } => {
            let world = load_scene(&scene).await?;
            let cache = EntityResolver::new().scan(&world);
            for (bucket, handles) in &cache.buckets {
                println!("{} ({})", bucket, handles.len());
                for entity in cache.assignments.iter().filter(|e| e.bucket == *bucket) {
                    println!("    {:<32} {:?}", entity.name, entity.tier);
                }
            }
            println!("Ignored: {}", cache.ignored.len());
            println!("Unmatched: {}", cache.unmatched.len());
            for (_, name) in &cache.unmatched {
                println!("    {}", name);
            }
        }
    }

    Ok(())
}

fn port_arg(raw: &str) -> Result<u16, IdentityError> {
    parse_port(raw)
}

async fn load_scene(path: &str) -> Result<SceneWorld> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow!("Failed to read scene {}: {}", path, e))?;
    SceneWorld::from_json(&json).map_err(|e| anyhow!("Failed to parse scene {}: {}", path, e))
}

async fn run(config: Config, scene: Option<String>, tick_ms: u64) -> Result<()> {
    info!("Starting goosebridge v{}", env!("CARGO_PKG_VERSION"));
    let mut world = match scene {
        Some(path) => load_scene(&path).await?,
        None => SceneWorld::new(),
    };
    let tick = Duration::from_millis(tick_ms.max(1));
    world.set_delta_time(tick);

    let store = SledKvStore::open(&config.storage.data_dir)?;
    let mut session = SessionCoordinator::new(store, config.session_settings());
    let (host, port) = split_server_address(&config.server.address, config.server.port)?;
    let identity = SessionIdentity::new(&host, port, &config.server.slot)?;

    let credentials = Credentials {
        slot: identity.slot.clone(),
        password: config.server.password.clone(),
    };
    let tuning = config.link.tuning();
    let link = tokio::task::spawn_blocking(move || {
        RemoteLink::connect(&host, port, credentials, &tuning)
    })
    .await??;

    let phase = session.connect(identity, link)?;
    info!("session phase {:?}", phase);

    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                session.tick(&mut world);
                for event in session.drain_events() {
                    match event {
                        SessionEvent::Notice(text) => println!("{}", text),
                        SessionEvent::StatusChanged(status) => println!("[{}]", status),
                        SessionEvent::RegionBlocked { region, .. } => {
                            println!("Blocked entry to {}", region)
                        }
                        SessionEvent::CapabilityUnlocked { .. } => {}
                    }
                }
                if session.phase() == SessionPhase::NoSession {
                    warn!("session ended: {}", session.status());
                    break;
                }
            }
            _ = &mut ctrl_c => {
                info!("Shutdown requested");
                session.disconnect();
                break;
            }
        }
    }

    let m = metrics::snapshot();
    info!(
        "items applied {}, locations sent {}, resyncs {}, frames dropped {}",
        m.items_applied, m.locations_sent, m.resync_passes, m.frames_dropped
    );
    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let configured = config
        .as_ref()
        .and_then(|c| c.logging.level.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Info);
    let base_level = match verbosity {
        0 => configured,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let file = config
        .as_ref()
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });
    match file {
        Some(f) => {
            let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
            // Console only when attached to a terminal
            let is_tty = atty::is(atty::Stream::Stdout);
            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());
                if let Ok(mut guard) = write_mutex.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
        None => {
            builder.format(|fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
            });
        }
    }
    let _ = builder.try_init();
}
