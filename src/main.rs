use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use taglink::Taglink;
use taglink_core::AppConfig;
use taglink_discovery::RegistryEvent;
use tokio::signal;
use tracing::info;

/// Taglink - dispatch scanned tag identifiers to a controller on the LAN
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML); defaults apply when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Browse for controllers and print candidate/binding changes until Ctrl-C
    Discover,

    /// Show the active binding
    Status,

    /// Bind to a discovered controller by name
    Select {
        /// Instance name of the controller
        name: String,

        /// How long to wait for the name to resolve
        #[arg(long, default_value_t = 10)]
        wait_secs: u64,
    },

    /// Clear the active binding
    Disconnect,

    /// Dispatch one tag identifier to the bound controller
    Dispatch {
        /// Already-decoded tag identifier
        #[arg(long, conflicts_with = "payload_hex")]
        id: Option<String>,

        /// Raw text-record payload as hex (decoded before dispatch)
        #[arg(long)]
        payload_hex: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let app = Taglink::new(config)?;

    match args.command {
        Command::Discover => discover(&app).await,
        Command::Status => status(&app),
        Command::Select { name, wait_secs } => select(&app, &name, wait_secs).await,
        Command::Disconnect => disconnect(&app),
        Command::Dispatch { id, payload_hex } => dispatch(&app, id, payload_hex).await,
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<AppConfig> {
    match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            serde_yaml::from_str(&contents).context("Failed to parse config file")
        }
        None => Ok(AppConfig::default()),
    }
}

async fn discover(app: &Taglink) -> Result<()> {
    if let Some(binding) = app.load_persisted()? {
        info!(name = binding.name, url = binding.url, "Bound controller restored");
    }
    let events = app.events();
    app.start_discovery()?;
    println!("Scanning network... press Ctrl-C to stop");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(RegistryEvent::CandidatesChanged) => {
                    println!("candidates: {:?}", app.candidates());
                }
                Ok(RegistryEvent::ActiveBindingChanged(Some(binding))) => {
                    println!("bound to {}", binding);
                }
                Ok(RegistryEvent::ActiveBindingChanged(None)) => {
                    println!("no active binding");
                }
                Ok(RegistryEvent::ActiveBindingLost(name)) => {
                    println!("controller '{}' disappeared, select another", name);
                }
                Ok(RegistryEvent::DiscoveryFailed(reason)) => {
                    app.stop_discovery();
                    bail!("Discovery failed: {}", reason);
                }
                Err(_) => break,
            },
            _ = signal::ctrl_c() => break,
        }
    }

    app.stop_discovery();
    Ok(())
}

fn status(app: &Taglink) -> Result<()> {
    match app.load_persisted()? {
        Some(binding) => println!("{}", binding),
        None => println!("No controller bound"),
    }
    Ok(())
}

async fn select(app: &Taglink, name: &str, wait_secs: u64) -> Result<()> {
    app.load_persisted()?;
    app.start_discovery()?;

    let deadline = tokio::time::Instant::now() + Duration::from_secs(wait_secs);
    let binding = loop {
        if app.candidates().iter().any(|c| c == &name.to_lowercase()) {
            break app.select(name)?;
        }
        if tokio::time::Instant::now() >= deadline {
            app.stop_discovery();
            bail!(
                "Controller '{}' did not resolve within {}s (seen: {:?})",
                name,
                wait_secs,
                app.candidates()
            );
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    };

    app.stop_discovery();
    println!("bound to {}", binding);
    Ok(())
}

fn disconnect(app: &Taglink) -> Result<()> {
    app.load_persisted()?;
    if app.active_binding().is_none() {
        println!("No controller bound");
        return Ok(());
    }
    app.disconnect()?;
    println!("Disconnected");
    Ok(())
}

async fn dispatch(app: &Taglink, id: Option<String>, payload_hex: Option<String>) -> Result<()> {
    app.load_persisted()?;

    let outcome = match (id, payload_hex) {
        (Some(id), None) => app.dispatch_id(&id).await?,
        (None, Some(hex_payload)) => {
            let payload = hex::decode(hex_payload.trim()).context("Invalid hex payload")?;
            app.dispatch_tag(&payload).await?
        }
        _ => bail!("Provide exactly one of --id or --payload-hex"),
    };

    println!(
        "{} ({}): {}",
        if outcome.success { "ok" } else { "error" },
        outcome.http_status,
        outcome.message
    );
    Ok(())
}
