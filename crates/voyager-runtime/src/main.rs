//! Voyager Daemon - traveler safety engine
//!
//! voyagerd provides:
//! - Geofence evaluation of position samples against the configured zones
//! - The SAFE / CAUTION / EMERGENCY state machine
//! - Emergency sessions with countdown, hold-to-cancel and location broadcast
//! - Alert requests logged through the tracing dispatch sink

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voyager_contacts::{JsonFileContactRepository, TrustedContactStore};
use voyager_dispatch::TracingDispatchSink;
use voyager_emergency::EmergencyEvent;
use voyager_runtime::{Command, LoggingConfig, RuntimeResult, VoyagerConfig, VoyagerEngine};
use voyager_safety::SafetyEvent;

/// Voyager Daemon CLI
#[derive(Parser)]
#[command(name = "voyagerd")]
#[command(about = "Voyager Daemon - traveler safety engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "VOYAGER_CONFIG")]
    config: Option<String>,

    /// Log level
    #[arg(long, env = "VOYAGER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "VOYAGER_LOG_JSON")]
    json: bool,

    /// Trusted contacts file (JSON array). The variable is the same one the
    /// configuration layer reads for `contacts.path`.
    #[arg(long, env = "VOYAGER_CONTACTS__PATH")]
    contacts: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> RuntimeResult<()> {
    let cli = Cli::parse();

    // Load configuration, then let CLI flags win
    let mut config = VoyagerConfig::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if cli.json {
        config.logging.json = true;
    }
    if let Some(path) = cli.contacts {
        config.contacts.path = Some(path);
    }

    init_tracing(&config.logging);

    let contacts = match &config.contacts.path {
        Some(path) => {
            let repository = JsonFileContactRepository::new(path);
            Arc::new(TrustedContactStore::load_from(&repository).await?)
        }
        None => {
            warn!("No contacts file configured; trusted circle starts empty");
            Arc::new(TrustedContactStore::new())
        }
    };

    let engine = VoyagerEngine::new(&config, contacts, Arc::new(TracingDispatchSink))?;
    let event_logger = tokio::spawn(log_events(
        engine.subscribe_safety(),
        engine.subscribe_emergency(),
    ));

    println!(
        r#"
 __   __
 \ \ / /__ _  _ __ _ __ _ ___ _ _
  \ V / _ \ || / _` / _` / -_) '_|
   \_/\___/\_, \__,_\__, \___|_|
           |__/     |___/

  Traveler safety engine
  Version: {}
  Zones: {}
  Trusted contacts: {}

  Commands: pos <lat> <lng> | sos | hold | release | broadcast on|off
            dial | status | contacts | quit
"#,
        env!("CARGO_PKG_VERSION"),
        engine.evaluator().zone_count(),
        engine.contacts().len(),
    );

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(command) => execute(&engine, command)?,
                    Err(e) => println!("error: {e}"),
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    engine.shutdown();
    event_logger.abort();
    info!(status = %engine.status(), "voyagerd stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.level.clone().into());

    if logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn execute(engine: &VoyagerEngine, command: Command) -> RuntimeResult<()> {
    match command {
        Command::Position {
            latitude,
            longitude,
        } => {
            if let Some(change) = engine.ingest_position(latitude, longitude) {
                println!("status: {} -> {}", change.from, change.to);
            }
        }
        Command::Sos => match engine.declare_emergency() {
            Some(session_id) => println!("emergency declared (session {})", session_id.short()),
            None => println!("emergency already active"),
        },
        Command::Hold => report(engine.hold_start()),
        Command::Release => report(engine.hold_release()),
        Command::Broadcast(enabled) => match engine.set_broadcast(enabled) {
            Ok(true) => println!("location broadcast on"),
            Ok(false) if enabled => println!("no trusted contacts; broadcast stays off"),
            Ok(false) => println!("location broadcast off"),
            Err(e) => println!("error: {e}"),
        },
        Command::Dial => {
            let request_id = engine.dial_authorities();
            println!("authorities call requested ({request_id})");
        }
        Command::Status => {
            let (status, fix) = engine.status_with_fix();
            println!("status: {status}");
            if let Some(fix) = fix {
                println!("last fix: {} at {}", fix.position, fix.received_at);
            }
            if let Some(session) = engine.session() {
                println!("{}", serde_json::to_string_pretty(&session)?);
            }
        }
        Command::Contacts => {
            let contacts = engine.contacts().snapshot();
            if contacts.is_empty() {
                println!("no trusted contacts");
            }
            for (index, contact) in contacts.iter().enumerate() {
                let marker = if index == 0 { "*" } else { " " };
                println!(
                    "{marker} {} ({}) {} [{}]",
                    contact.name, contact.relation, contact.phone, contact.id
                );
            }
        }
        Command::Quit => {}
    }
    Ok(())
}

fn report(result: voyager_emergency::EmergencyResult<()>) {
    if let Err(e) = result {
        println!("error: {e}");
    }
}

async fn log_events(
    mut safety: broadcast::Receiver<SafetyEvent>,
    mut emergency: broadcast::Receiver<EmergencyEvent>,
) {
    loop {
        tokio::select! {
            event = safety.recv() => match event {
                Ok(SafetyEvent::Notification(notification)) => {
                    warn!(
                        severity = ?notification.severity,
                        vibration_ms = ?notification.vibration_ms,
                        "{}",
                        notification.message
                    );
                }
                Ok(SafetyEvent::StatusChanged(change)) => {
                    info!(from = %change.from, to = %change.to, "Status changed");
                }
                Ok(other) => debug!(event = ?other, "Safety event"),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "Safety event logger lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return,
            },
            event = emergency.recv() => match event {
                Ok(EmergencyEvent::CountdownTick { remaining, .. }) => {
                    debug!(remaining, "Countdown");
                }
                Ok(EmergencyEvent::HoldProgress { progress, .. }) => {
                    debug!(progress, "Hold progress");
                }
                Ok(other) => info!(event = ?other, "Emergency event"),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "Emergency event logger lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return,
            },
        }
    }
}
