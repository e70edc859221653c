use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use arboard::Clipboard;
use catalog::StaticCatalog;
use clap::{Parser, Subcommand};
use client_core::{
    clipboard::map_search_url, ClipboardError, ClipboardService, ClipboardSink, Dashboard,
    SimulatedSubmitter, SubmissionState,
};
use shared::{
    domain::{ChainId, Environment, Location, LocationId},
    protocol::{Notification, NotificationLevel},
};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(about = "Environment links and business directory dashboard")]
struct Cli {
    /// Path to a TOML settings file (defaults to ./dashboard.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List application links for one environment.
    Apps {
        #[arg(long, default_value = "dev")]
        env: Environment,
        #[arg(long, default_value = "")]
        search: String,
    },
    /// List business chains.
    Businesses {
        #[arg(long, default_value = "")]
        search: String,
    },
    /// List the locations of a chain.
    Locations {
        chain_id: String,
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Select a location and add it to its chain.
    AddLocation { chain_id: String, location_id: String },
    /// Copy an application URL to the clipboard.
    CopyUrl {
        name: String,
        #[arg(long)]
        env: Option<Environment>,
    },
    /// Copy a location's contact block to the clipboard.
    CopyLocation { chain_id: String, location_id: String },
    /// Print a map search link for a location.
    Map { chain_id: String, location_id: String },
}

struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            Clipboard::new().map_err(|err| ClipboardError::Unavailable(err.to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|err| ClipboardError::WriteFailed(err.to_string()))
    }
}

/// Last resort when no system clipboard is reachable: print it for manual copying.
struct StdoutClipboard;

impl ClipboardSink for StdoutClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        println!("{text}");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded = load_settings(cli.config.as_deref());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&loaded.settings.log_filter)
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    loaded.log_issues();
    let settings = loaded.settings;

    let dashboard = build_dashboard(&settings).await?;
    let mut notices = dashboard.notifier().subscribe();

    let clipboard = clipboard_service(&dashboard);
    let outcome = run(&dashboard, &clipboard, cli.command).await;
    // Failure paths notify too; show those before reporting the error.
    drain_notifications(&mut notices);
    outcome
}

async fn run(
    dashboard: &Dashboard,
    clipboard: &ClipboardService,
    command: Command,
) -> Result<()> {
    match command {
        Command::Apps { env, search } => {
            let group = dashboard.applications().visible_group(env, &search);
            println!("{} ({} apps)", env.display_name(), group.apps.len());
            for app in &group.apps {
                println!("  {:<22} {:<8} {}", app.name, app.kind.label(), app.url);
            }
        }
        Command::Businesses { search } => {
            let hits = dashboard.directory().search_entities(&search);
            println!("{} results found", hits.len());
            for business in hits {
                let address = &business.physical_address;
                println!(
                    "  {:<8} {:<22} {:<28} {}, {}, {} {}",
                    business.chain_id,
                    business.chain_name,
                    business.legal_name,
                    address.address_line1,
                    address.city,
                    address.state,
                    address.postal_code
                );
            }
        }
        Command::Locations { chain_id, search } => {
            open_chain(dashboard, &chain_id).await;
            let stats = dashboard.directory().location_stats();
            let shown = dashboard.directory().search_children(&search);
            println!(
                "Locations ({}) - {} active, {} inactive",
                shown.len(),
                stats.active,
                stats.inactive
            );
            for location in &shown {
                print_location(location);
            }
        }
        Command::AddLocation {
            chain_id,
            location_id,
        } => {
            open_chain(dashboard, &chain_id).await;
            dashboard.select_location(LocationId::new(location_id))?;
            println!("Adding location...");
            match dashboard.add_selected_location().await? {
                SubmissionState::Succeeded(id) => println!("{id}: added"),
                SubmissionState::Failed {
                    location_id,
                    reason,
                } => println!("{location_id}: {reason}"),
                other => println!("unexpected submission state: {other:?}"),
            }
        }
        Command::CopyUrl { name, env } => {
            let app = dashboard
                .applications()
                .find(env, &name)
                .ok_or_else(|| anyhow!("no application named '{name}'"))?;
            clipboard.copy_application_url(app)?;
        }
        Command::CopyLocation {
            chain_id,
            location_id,
        } => {
            let location = find_location(dashboard, &chain_id, &location_id).await?;
            clipboard
                .copy_location_info(&location)
                .context("copy location information")?;
        }
        Command::Map {
            chain_id,
            location_id,
        } => {
            let location = find_location(dashboard, &chain_id, &location_id).await?;
            println!("{}", map_search_url(&location)?);
        }
    }
    Ok(())
}

async fn build_dashboard(settings: &Settings) -> Result<Dashboard> {
    let catalog = StaticCatalog::new(settings.fetch_latency());
    let applications = catalog.applications();
    let submitter = match settings.rng_seed {
        Some(seed) => SimulatedSubmitter::seeded(
            settings.submit_latency(),
            settings.submit_success_rate,
            seed,
        ),
        None => SimulatedSubmitter::new(settings.submit_latency(), settings.submit_success_rate),
    };
    Dashboard::load(Arc::new(catalog), applications, Arc::new(submitter)).await
}

fn clipboard_service(dashboard: &Dashboard) -> ClipboardService {
    ClipboardService::new(Arc::new(SystemClipboard), dashboard.notifier().clone())
        .with_fallback(Arc::new(StdoutClipboard))
}

async fn open_chain(dashboard: &Dashboard, chain_id: &str) {
    let chain_id = ChainId::new(chain_id);
    if dashboard.directory().find_entity(&chain_id).is_none() {
        tracing::warn!(chain_id = %chain_id, "chain not in directory; expect no locations");
    }
    println!("Loading locations...");
    dashboard
        .directory()
        .select_entity_and_fetch(chain_id)
        .await;
}

async fn find_location(
    dashboard: &Dashboard,
    chain_id: &str,
    location_id: &str,
) -> Result<Location> {
    open_chain(dashboard, chain_id).await;
    dashboard
        .directory()
        .find_child(&LocationId::new(location_id))
        .ok_or_else(|| anyhow!("location {location_id} not found in chain {chain_id}"))
}

fn print_location(location: &Location) {
    let status = if location.is_active { "active" } else { "inactive" };
    println!(
        "  {:<7} {:<36} {:<8} {}",
        location.id,
        location.name,
        status,
        location.full_address()
    );
    if let (Some(phone), Some(email)) = (&location.phone, &location.email) {
        println!("          {phone}  {email}");
    }
}

/// Prints everything queued so far and returns it.
fn drain_notifications(notices: &mut broadcast::Receiver<Notification>) -> Vec<Notification> {
    let mut drained = Vec::new();
    loop {
        match notices.try_recv() {
            Ok(notice) => {
                print_notification(&notice);
                drained.push(notice);
            }
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "dropped notifications");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
    drained
}

fn print_notification(notice: &Notification) {
    let marker = match notice.level {
        NotificationLevel::Success => "ok",
        NotificationLevel::Error => "!!",
    };
    println!("[{marker}] {}", notice.message);
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
