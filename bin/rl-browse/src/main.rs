//! Rolelist Browser
//!
//! Pages through roles on a GraphQL role service using the role list store,
//! and creates, renames or deletes individual roles.
//!
//! Configuration is read from `rolelist.toml` (or `--config`), overridden by
//! `ROLELIST_*` environment variables. `RUST_LOG` and `LOG_FORMAT` control
//! logging.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info, warn};

use rl_client::{Client, Config};
use rl_common::{CircleId, GroupId, Role, RoleId, RoleInput, TimeCommitmentRange};
use rl_config::{AppConfig, ConfigLoader};
use rl_store::{
    FilterChange, GroupsStore, PageOutcome, RoleListStore, ScrollController, StaticDefaults,
    StoreOptions,
};

#[derive(Parser, Debug)]
#[command(name = "rl-browse", version, about = "Browse and edit roles")]
struct Cli {
    /// Configuration file
    #[arg(long, short, env = "ROLELIST_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List roles matching the filters
    List(ListArgs),
    /// Create a role
    Create(CreateArgs),
    /// Rename a role
    Rename {
        id: i64,
        name: String,
    },
    /// Delete a role
    Delete {
        id: i64,
    },
    /// Print an example configuration file
    ExampleConfig,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Free text matched against role names
    #[arg(long)]
    search: Option<String>,

    /// Restrict to a local group (repeatable)
    #[arg(long = "local-group")]
    local_groups: Vec<i64>,

    /// Restrict to a working circle (repeatable)
    #[arg(long = "working-circle")]
    working_circles: Vec<i64>,

    /// Minimum hours per week
    #[arg(long, requires = "max_hours")]
    min_hours: Option<u32>,

    /// Maximum hours per week
    #[arg(long, requires = "min_hours")]
    max_hours: Option<u32>,

    /// Stop after this many pages
    #[arg(long, default_value_t = 5)]
    pages: u32,

    /// Print roles as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct CreateArgs {
    name: String,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    local_group: Option<i64>,

    #[arg(long)]
    working_circle: Option<i64>,

    #[arg(long, requires = "max_hours")]
    min_hours: Option<u32>,

    #[arg(long, requires = "min_hours")]
    max_hours: Option<u32>,
}

/// Logs the signals an infinite-scroll widget would receive
struct LoggingScroll;

impl ScrollController for LoggingScroll {
    fn loaded(&self) {
        debug!("Page loaded");
    }

    fn complete(&self) {
        debug!("No more pages");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    rl_common::logging::init_logging("rl-browse");

    let cli = Cli::parse();

    if let Command::ExampleConfig = cli.command {
        print!("{}", AppConfig::example_toml());
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => ConfigLoader::with_path(path).load(),
        None => ConfigLoader::new().load(),
    }
    .context("Failed to load configuration")?;

    info!(endpoint = %config.graphql.endpoint, "Connecting to role service");
    let client = Arc::new(Client::new(Config::from_app(&config.graphql)?)?);
    let store = RoleListStore::with_options(
        client.clone(),
        Arc::new(GroupsStore::new(client)),
        Arc::new(StaticDefaults::from_config(&config.defaults)),
        StoreOptions::from_config(&config.store),
    );
    store.set_default_filters();

    match cli.command {
        Command::List(args) => list(&store, args).await,
        Command::Create(args) => create(&store, args).await,
        Command::Rename { id, name } => rename(&store, RoleId(id), name).await,
        Command::Delete { id } => {
            store.delete(RoleId(id)).await?;
            println!("Deleted role {}", id);
            Ok(())
        }
        Command::ExampleConfig => Ok(()),
    }
}

async fn list(store: &RoleListStore, args: ListArgs) -> Result<()> {
    if let Some(search) = args.search {
        store.set_filter(FilterChange::Search(search));
    }
    if !args.local_groups.is_empty() {
        store.set_filter(FilterChange::LocalGroups(
            args.local_groups.into_iter().map(GroupId).collect(),
        ));
    }
    if !args.working_circles.is_empty() {
        store.set_filter(FilterChange::WorkingCircles(
            args.working_circles.into_iter().map(CircleId).collect(),
        ));
    }
    if let (Some(min), Some(max)) = (args.min_hours, args.max_hours) {
        if min > max {
            bail!("--min-hours ({}) exceeds --max-hours ({})", min, max);
        }
        store.set_filter(FilterChange::TimeCommitment(TimeCommitmentRange::new(min, max)));
    }

    let scroll = LoggingScroll;
    for page in 0..args.pages {
        match store.load_page(&scroll).await? {
            PageOutcome::Loaded { complete: false, .. } => continue,
            PageOutcome::Loaded { complete: true, .. } | PageOutcome::Exhausted => break,
            outcome => warn!(page, ?outcome, "Page was not applied"),
        }
    }

    let roles = store.roles();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&roles)?);
    } else {
        for role in &roles {
            println!("{}", format_role(role));
        }
        println!("Showing {} of {} roles", roles.len(), store.num_roles());
    }
    Ok(())
}

async fn create(store: &RoleListStore, args: CreateArgs) -> Result<()> {
    let mut input = RoleInput::new(args.name);
    if let Some(description) = args.description {
        input = input.with_description(description);
    }
    if let Some(id) = args.local_group {
        input = input.with_local_group(GroupId(id));
    }
    if let Some(id) = args.working_circle {
        input = input.with_working_circle(CircleId(id));
    }
    if let (Some(min), Some(max)) = (args.min_hours, args.max_hours) {
        input = input.with_time_commitment(min, max);
    }

    match store.create(Some(input)).await? {
        Some(role) => println!("Created {}", format_role(&role)),
        None => bail!("Role was not created"),
    }
    Ok(())
}

async fn rename(store: &RoleListStore, id: RoleId, name: String) -> Result<()> {
    // Load until the role shows up so the update carries its full payload
    let scroll = LoggingScroll;
    let mut role = None;
    while role.is_none() {
        match store.load_page(&scroll).await? {
            PageOutcome::Loaded { complete, .. } => {
                role = store.get_by_id(id);
                if complete {
                    break;
                }
            }
            PageOutcome::Exhausted => break,
            PageOutcome::Stale | PageOutcome::Superseded => {}
        }
    }

    let Some(mut role) = role else {
        bail!("Role {} not found", id);
    };
    role.name = name;
    let updated = store.update(role).await?;
    println!("Updated {}", format_role(&updated));
    Ok(())
}

fn format_role(role: &Role) -> String {
    let hours = match (role.time_commitment_min, role.time_commitment_max) {
        (Some(min), Some(max)) => format!("{}-{}h", min, max),
        _ => "-".to_string(),
    };
    format!("{:>6}  {:<40}  {}", role.id.0, role.name, hours)
}
