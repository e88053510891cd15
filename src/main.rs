//! courtiq-access CLI
//!
//! Runs access checks and guards against a relationship fixtures file.

use anyhow::Context;
use clap::{Parser, Subcommand};
use courtiq_access::{
    access_control::{CheckConfig, Checker, PolicyEvaluator},
    auth::StaticViewer,
    config::{AppConfig, LogFormat, load_config},
    error::AccessError,
    guard::Guard,
    model::{AccessLevel, Role},
    request::Request,
    store::{MemoryRelationshipStore, SharedRelationshipStore},
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Relationship-based access control for CourtIQ
#[derive(Parser, Debug)]
#[command(name = "courtiq-access")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "COURTIQ_ACCESS_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides [logging] level
    #[arg(long, env = "COURTIQ_ACCESS_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decide whether a viewer may see an owner's resource
    Check {
        /// Owner of the resource
        #[arg(long)]
        owner: String,

        /// User requesting access
        #[arg(long)]
        viewer: String,

        /// Required access level (e.g. FRIENDS, COACHES)
        #[arg(long, value_parser = parse_level)]
        level: AccessLevel,

        /// Role that grants access on its own (repeatable)
        #[arg(long = "role", value_parser = parse_role)]
        roles: Vec<Role>,

        /// Entity the check is scoped to
        #[arg(long)]
        entity_id: Option<String>,

        /// Kind of entity (e.g. MATCH, CLUB)
        #[arg(long, requires = "entity_id")]
        entity_type: Option<String>,
    },

    /// Run the guard configured for an operation
    Guard {
        /// Operation name under [guards]
        #[arg(long)]
        operation: String,

        /// User performing the operation
        #[arg(long)]
        viewer: String,

        /// Request argument as key=value (repeatable)
        #[arg(long = "arg", value_parser = parse_arg)]
        args: Vec<(String, String)>,
    },
}

fn parse_level(s: &str) -> Result<AccessLevel, String> {
    AccessLevel::try_parse(&s.to_ascii_uppercase()).ok_or_else(|| {
        let known: Vec<&str> = AccessLevel::all().iter().map(|l| l.as_str()).collect();
        format!("unknown access level '{}' (expected one of {})", s, known.join(", "))
    })
}

fn parse_role(s: &str) -> Result<Role, String> {
    Role::try_parse(&s.to_ascii_uppercase()).ok_or_else(|| format!("unknown role '{}'", s))
}

fn parse_arg(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", s))
}

fn init_logging(config: &AppConfig, level_override: Option<&str>) {
    let level = level_override.unwrap_or(&config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match config.logging.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init(),
    }
}

fn open_store(config: &AppConfig) -> anyhow::Result<SharedRelationshipStore> {
    let store = match &config.store.fixtures {
        Some(path) => {
            let expanded = shellexpand::tilde(path);
            MemoryRelationshipStore::from_json_file(expanded.as_ref())
                .with_context(|| format!("Failed to load fixtures from {}", path))?
        }
        None => {
            warn!("No store.fixtures configured, starting with an empty relationship store");
            MemoryRelationshipStore::new()
        }
    };
    Ok(Arc::new(store))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let config = load_config(args.config.as_deref()).context("Failed to load configuration")?;

    init_logging(&config, args.log_level.as_deref());

    info!(version = env!("CARGO_PKG_VERSION"), "Starting courtiq-access");

    let store = open_store(&config).inspect_err(|e| error!(error = %e, "Failed to open store"))?;

    match args.command {
        Command::Check {
            owner,
            viewer,
            level,
            roles,
            entity_id,
            entity_type,
        } => {
            let evaluator =
                PolicyEvaluator::from_config(store, Arc::new(StaticViewer::new(&viewer)), &config)?;

            let mut check = CheckConfig::new(level).allow_roles(roles);
            check.entity_id = entity_id;
            check.entity_type = entity_type;

            let result = evaluator
                .check_access(&owner, &viewer, &check)
                .await
                .inspect_err(|e| error!(error = %e, "Access check failed"))?;

            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Guard {
            operation,
            viewer,
            args,
        } => {
            let guard = Guard::from_config(store, Arc::new(StaticViewer::new(&viewer)), &config)?;

            if guard.spec_for(&operation).is_none() {
                warn!(%operation, "No guard configured for operation");
            }

            let request = args
                .into_iter()
                .fold(Request::new(), |request, (key, value)| request.with_arg(key, value));

            guard
                .evaluate_operation(&operation, &request, || async { Ok::<_, AccessError>(()) })
                .await
                .inspect_err(|e| error!(%operation, error = %e, "Guard rejected operation"))?;

            println!("allowed");
        }
    }

    Ok(())
}
