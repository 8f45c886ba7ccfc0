//! Parkeon Server Binary
//!
//! Command-line interface for the parking allocation simulator with
//! support for:
//! - Server management (serve, status)
//! - A scripted demo walking through the full request lifecycle
//!
//! # Examples
//!
//! ```bash
//! # Start server
//! parkingd serve --bind 0.0.0.0 --port 8080
//!
//! # Start from a config file, overriding the port
//! parkingd --config parkeon.toml serve --port 9090
//!
//! # Run the scripted demo
//! parkingd demo
//! ```

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use parkeon::server::{start_server, ServerConfig};
use parkeon::system::{ProcessOutcome, SystemConfig};
use parkeon::ParkingSystem;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Parkeon - Multi-Zone Parking Allocation Simulator
#[derive(Parser, Debug)]
#[command(name = "parkingd")]
#[command(version = parkeon::VERSION)]
#[command(about = "Parkeon - Multi-Zone Parking Allocation Simulator", long_about = None)]
#[command(author = "Anton Feldmann <anton.feldmann@gmail.com>")]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (TOML)
    #[arg(long, global = true, env = "PARKING_CONFIG")]
    config: Option<PathBuf>,

    /// Log directory path
    #[arg(long, global = true, default_value = "logs", env = "PARKING_LOG_DIR")]
    log_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API server
    Serve(ServeArgs),

    /// Run a scripted demo of the allocation lifecycle
    Demo,

    /// Show the configured topology and capacity limits
    Status,

    /// Show version information
    Version,
}

/// Server configuration arguments
///
/// Every flag is optional; unset flags fall back to the config file,
/// then to built-in defaults.
#[derive(Args, Debug)]
struct ServeArgs {
    /// HTTP bind address
    #[arg(short, long, env = "PARKING_BIND")]
    bind: Option<String>,

    /// HTTP port
    #[arg(short, long, env = "PARKING_PORT")]
    port: Option<u16>,

    /// Enable CORS (true/false)
    #[arg(long, env = "PARKING_CORS")]
    cors: Option<bool>,

    /// Request timeout in seconds
    #[arg(long, env = "PARKING_TIMEOUT")]
    timeout: Option<u64>,

    /// Pending request queue capacity
    #[arg(long, env = "PARKING_QUEUE_CAPACITY")]
    queue_capacity: Option<usize>,

    /// Rollback history depth
    #[arg(long, env = "PARKING_ROLLBACK_CAPACITY")]
    rollback_capacity: Option<usize>,

    /// Start with an empty topology instead of the default zones
    #[arg(long)]
    no_seed: bool,
}

/// On-disk configuration, merged underneath command-line flags
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    system: SystemConfig,
    server: ServerConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(&cli)?;

    // Execute command
    match cli.command {
        Commands::Serve(args) => serve_command(cli.config.as_deref(), args).await,
        Commands::Demo => demo_command(cli.config.as_deref()),
        Commands::Status => status_command(cli.config.as_deref()),
        Commands::Version => {
            println!("Parkeon {}", parkeon::VERSION);
            println!("Multi-zone parking slot allocation simulator");
            Ok(())
        }
    }
}

/// Setup logging with rolling files and console output
fn setup_logging(cli: &Cli) -> anyhow::Result<()> {
    std::fs::create_dir_all(&cli.log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &cli.log_dir, "parkeon.log");

    let log_level = cli
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .with_ansi(!cli.no_color)
                .pretty(),
        )
        .with(fmt::layer().with_writer(file_appender).with_ansi(false))
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .init();

    Ok(())
}

/// Load the TOML config file, or defaults when no path was given
fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<FileConfig> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config = toml::from_str(&raw)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            Ok(config)
        }
        None => Ok(FileConfig::default()),
    }
}

/// Serve command - start the Parkeon HTTP server
async fn serve_command(config_path: Option<&std::path::Path>, args: ServeArgs) -> anyhow::Result<()> {
    info!("🚀 Parkeon starting...");
    info!(version = %parkeon::VERSION, "Version information");

    let file = load_config(config_path)?;

    // Flags win over the config file, the config file over defaults
    let mut system_config = file.system;
    if let Some(capacity) = args.queue_capacity {
        system_config.queue_capacity = capacity;
    }
    if let Some(capacity) = args.rollback_capacity {
        system_config.rollback_capacity = capacity;
    }

    let server_config = ServerConfig {
        http_addr: args.bind.unwrap_or(file.server.http_addr),
        http_port: args.port.unwrap_or(file.server.http_port),
        enable_cors: args.cors.unwrap_or(file.server.enable_cors),
        timeout_secs: args.timeout.unwrap_or(file.server.timeout_secs),
    };

    let mut system = ParkingSystem::new(system_config);
    if args.no_seed {
        info!("Starting with an empty topology");
    } else {
        system.seed_default_topology()?;
        info!(
            "✅ Default topology seeded: {} zones, {} slots",
            system.hierarchy().zones().len(),
            system.hierarchy().total_slots()
        );
    }

    info!(
        "🌐 HTTP API starting on {}:{}",
        server_config.http_addr, server_config.http_port
    );

    start_server(server_config, system).await
}

/// Demo command - walk through registration, queueing, allocation,
/// cross-zone overflow, cancellation and rollback on a fresh system
fn demo_command(config_path: Option<&std::path::Path>) -> anyhow::Result<()> {
    let file = load_config(config_path)?;
    let mut system = ParkingSystem::new(file.system);
    system.seed_default_topology()?;

    println!("=======================================");
    println!("       PARKEON ALLOCATION DEMO");
    println!("=======================================");

    println!("\n--- Vehicle registration ---");
    let fleet = [
        ("Sedan", "Z1"),
        ("SUV", "Z2"),
        ("Truck", "Z1"),
        ("Compact", "Z3"),
        ("Luxury", "Z2"),
        ("Motorcycle", "Z1"),
    ];
    for (kind, zone) in fleet {
        let id = system.register_vehicle(kind, None, None, Some(zone))?;
        println!("✅ Registered {} ({}) preferring {}", id, kind, zone);
    }

    println!("\n--- Request creation ---");
    let intents = [
        ("V1000", "Z1"),
        ("V1001", "Z2"),
        ("V1002", "Z1"),
        ("V1003", "Z3"),
        ("V1004", "Z2"),
    ];
    let mut requests = Vec::new();
    for (vehicle, zone) in intents {
        let id = system.create_request(vehicle, zone)?;
        println!("✅ {} queued: {} -> {}", id, vehicle, zone);
        requests.push(id);
    }
    println!("Queue length: {}", system.queue().len());

    println!("\n--- Queue processing ---");
    for _ in 0..requests.len() {
        let outcome = system.process_next_request()?;
        report_outcome(&outcome);
    }

    println!("\n--- Lifecycle: occupy and release ---");
    system.mark_occupied(&requests[0])?;
    println!("✅ {} occupied", requests[0]);
    system.mark_released(&requests[0])?;
    println!("✅ {} released, slot returned to the pool", requests[0]);

    println!("\n--- Cross-zone overflow ---");
    println!("Zone Z2 holds two slots; further Z2 requests spill elsewhere.");
    system.register_vehicle("Van", None, None, Some("Z2"))?;
    let first = system.create_request("V1005", "Z2")?;
    println!("{} queued: V1005 -> Z2", first);
    let outcome = system.process_next_request()?;
    report_outcome(&outcome);

    system.register_vehicle("Coupe", None, None, Some("Z2"))?;
    let second = system.create_request("V1006", "Z2")?;
    println!("{} queued: V1006 -> Z2", second);
    let outcome = system.process_next_request()?;
    report_outcome(&outcome);

    println!("\n--- Cancellation and rollback ---");
    println!(
        "Available slots before cancel: {}",
        system.status().available_slots
    );
    system.cancel_request(&requests[2])?;
    println!("✅ {} cancelled, its slot freed", requests[2]);
    println!(
        "Available slots after cancel:  {}",
        system.status().available_slots
    );

    system.rollback_last()?;
    println!("✅ Rollback undid the cancellation");
    println!(
        "Available slots after rollback: {}",
        system.status().available_slots
    );

    println!("\n--- Final report ---");
    let status = system.status();
    println!(
        "Zones: {}   Slots: {}/{} available   Utilization: {:.1}%",
        status.zone_count, status.available_slots, status.total_slots, status.utilization_percent
    );
    println!(
        "Requests: {} total, {} active, {} pending",
        status.total_requests, status.active_requests, status.pending_requests
    );
    println!("Vehicles registered: {}", status.registered_vehicles);
    println!("Rollback history depth: {}", status.rollback_depth);

    let analytics = system.analytics();
    println!("\nPer-zone utilization:");
    for zone in &analytics.zones {
        println!(
            "  {} ({}) {}/{} occupied, {:.1}%",
            zone.zone_id, zone.name, zone.occupied_slots, zone.total_slots, zone.utilization_percent
        );
    }
    match &analytics.busiest_zone {
        Some(zone) => println!("Busiest zone: {}", zone),
        None => println!("Busiest zone: none (system idle)"),
    }
    println!("Cross-zone allocations: {}", analytics.cross_zone_allocations);
    println!(
        "Average stay: {:.1} minutes",
        analytics.average_duration_minutes
    );

    println!("\n=======================================");
    println!("          DEMO COMPLETE");
    println!("=======================================");
    Ok(())
}

/// Print one processing outcome
fn report_outcome(outcome: &ProcessOutcome) {
    match &outcome.placement {
        Some(p) if p.cross_zone => println!(
            "⚠️  {} allocated CROSS-ZONE to {}/{}",
            outcome.request_id, p.zone_id, p.slot_id
        ),
        Some(p) => println!(
            "✅ {} allocated to {}/{}",
            outcome.request_id, p.zone_id, p.slot_id
        ),
        None => println!(
            "❌ {} stays queued, no slots available anywhere",
            outcome.request_id
        ),
    }
}

/// Status command - show the topology and limits a fresh instance gets
fn status_command(config_path: Option<&std::path::Path>) -> anyhow::Result<()> {
    let file = load_config(config_path)?;
    let mut system = ParkingSystem::new(file.system);
    system.seed_default_topology()?;
    let status = system.status();

    println!("Parkeon {}", parkeon::VERSION);
    println!("───────────────────────────────");
    println!("Zones:             {}", status.zone_count);
    println!("Total slots:       {}", status.total_slots);
    println!("Available slots:   {}", status.available_slots);
    println!("Queue capacity:    {}", system.config().queue_capacity);
    println!("Rollback capacity: {}", system.config().rollback_capacity);
    println!("Vehicle capacity:  {}", system.config().vehicle_capacity);
    for zone in system.hierarchy().zones() {
        println!(
            "  • {} ({}) {} areas, {} slots",
            zone.id(),
            zone.name(),
            zone.areas().len(),
            zone.total_slots()
        );
    }
    Ok(())
}
