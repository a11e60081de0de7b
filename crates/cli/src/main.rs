//! poolbridge command-line operator tool.
//!
//! Provides subcommands for generating and validating configuration, checking
//! how a legacy user would be migrated, and replaying saved trigger events
//! through the same router the function uses. Directory commands can run
//! against a local fixture file instead of the legacy pool.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use dialoguer::Password;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use poolbridge_core::config::BridgeConfig;
use poolbridge_core::directory::{CognitoDirectory, FixtureDirectory, LegacyDirectory};
use poolbridge_core::mapper::AttributeMapper;
use poolbridge_core::models::{AttributeSet, LegacyUser, MigrationTriggerEvent};
use poolbridge_core::router::TriggerRouter;

/// Role session name used when the CLI assumes the legacy account role.
const CLI_SESSION_NAME: &str = "poolbridge-cli";

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// poolbridge operator tool.
#[derive(Parser, Debug)]
#[command(
    name = "poolbridge",
    version,
    about = "Check and replay lazy user migrations from a legacy user pool"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, global = true, default_value = "./poolbridge.toml")]
    config: PathBuf,

    /// Use a TOML fixture file as the legacy directory instead of the pool.
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a default configuration file.
    Init {
        /// Output path for the generated config file.
        #[arg(short, long, default_value = "./poolbridge.toml")]
        output: PathBuf,
    },

    /// Validate a configuration file.
    Validate,

    /// Sign in as a legacy user and show the attributes that would migrate.
    Authenticate {
        /// Legacy username.
        username: String,
    },

    /// Look up a legacy user and show the attributes that would migrate.
    Lookup {
        /// Legacy username.
        username: String,
    },

    /// Run a saved trigger event through the router and print the result.
    Replay {
        /// Path to the trigger event JSON.
        event: PathBuf,
    },

    /// Print a bcrypt hash for a fixture file `password_hash` entry.
    HashPassword,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { ref output } => cmd_init(output),
        Commands::Validate => cmd_validate(&cli.config),
        Commands::HashPassword => cmd_hash_password(),
        Commands::Authenticate { ref username } => {
            let password = Password::new()
                .with_prompt(format!("Legacy password for {}", username))
                .interact()
                .context("failed to read password")?;
            match cli.fixture {
                Some(ref path) => cmd_authenticate(&load_fixture(path)?, username, &password).await,
                None => cmd_authenticate(&connect(&cli.config).await?, username, &password).await,
            }
        }
        Commands::Lookup { ref username } => match cli.fixture {
            Some(ref path) => cmd_lookup(&load_fixture(path)?, username).await,
            None => cmd_lookup(&connect(&cli.config).await?, username).await,
        },
        Commands::Replay { ref event } => {
            let event = load_event(event)?;
            match cli.fixture {
                Some(ref path) => cmd_replay(load_fixture(path)?, event).await,
                None => cmd_replay(connect(&cli.config).await?, event).await,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_config(path: &Path) -> Result<BridgeConfig> {
    BridgeConfig::load_and_resolve(path).context("failed to load configuration file")
}

async fn connect(config_path: &Path) -> Result<CognitoDirectory> {
    let config = load_config(config_path)?;
    let credentials = config.legacy.credential_source(CLI_SESSION_NAME);
    info!(
        region = %config.legacy.region,
        user_pool_id = %config.legacy.user_pool_id,
        assume_role = config.legacy.role_arn.is_some(),
        "connecting to legacy user pool"
    );
    Ok(CognitoDirectory::connect(&config.legacy, &credentials).await)
}

fn load_fixture(path: &Path) -> Result<FixtureDirectory> {
    info!(path = %path.display(), "using fixture directory");
    FixtureDirectory::load(path).context("failed to load fixture file")
}

fn load_event(path: &Path) -> Result<MigrationTriggerEvent> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read event file {}", path.display()))?;
    serde_json::from_str(&contents).context("failed to parse trigger event JSON")
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

fn cmd_init(output: &Path) -> Result<()> {
    let default_config = r#"# poolbridge configuration

[legacy]
region = "eu-west-1"
user_pool_id = "eu-west-1_XXXXXXXXX"
client_id = "legacy-app-client-id"
# Cross-account access to the legacy pool:
# role_arn = "arn:aws:iam::123456789012:role/legacy-pool-migration"
# external_id_env = "OLD_EXTERNAL_ID"

[logging]
log_level = "info"
"#;

    if output.exists() {
        anyhow::bail!(
            "file already exists: {}. Use a different path or remove the existing file.",
            output.display()
        );
    }

    std::fs::write(output, default_config).context("failed to write config file")?;

    println!("Default configuration written to {}", output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit the config file with your legacy pool details");
    println!(
        "  2. Validate with: poolbridge validate --config {}",
        output.display()
    );
    println!(
        "  3. Try a lookup: poolbridge lookup <username> --config {}",
        output.display()
    );

    Ok(())
}

fn cmd_validate(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {}", config_path.display());
    println!();

    let mut config =
        BridgeConfig::load_from_file(config_path).context("failed to parse configuration")?;
    println!("  [OK] TOML structure is valid");

    match config.resolve_env_vars() {
        Ok(()) => println!("  [OK] Environment variable references resolved"),
        Err(e) => {
            println!("  [FAIL] {}", e);
            anyhow::bail!("configuration validation failed");
        }
    }

    match config.validate() {
        Ok(()) => println!("  [OK] All required fields are valid"),
        Err(e) => {
            println!("  [FAIL] Validation error: {}", e);
            anyhow::bail!("configuration validation failed");
        }
    }

    let legacy = &config.legacy;
    println!();
    println!("Configuration summary:");
    println!("  Region        : {}", legacy.region);
    println!("  User pool     : {}", legacy.user_pool_id);
    println!("  App client    : {}", legacy.client_id);
    println!(
        "  Role ARN      : {}",
        legacy.role_arn.as_deref().unwrap_or("none (ambient credentials)")
    );
    println!(
        "  External id   : {}",
        if legacy.external_id.is_some() { "set" } else { "not set" }
    );
    println!("  Log level     : {}", config.logging.log_level);
    println!();
    println!("Configuration is valid.");

    Ok(())
}

fn cmd_hash_password() -> Result<()> {
    let password = Password::new()
        .with_prompt("Password to hash")
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()
        .context("failed to read password")?;
    let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST).context("failed to hash password")?;
    println!("{}", hash);
    Ok(())
}

async fn cmd_authenticate<D: LegacyDirectory>(
    directory: &D,
    username: &str,
    password: &str,
) -> Result<()> {
    match directory.authenticate(username, password).await {
        Some(user) => print_migration(&user),
        None => anyhow::bail!("authentication failed for '{}' (bad credentials)", username),
    }
}

async fn cmd_lookup<D: LegacyDirectory>(directory: &D, username: &str) -> Result<()> {
    match directory.lookup(username).await {
        Some(user) => print_migration(&user),
        None => anyhow::bail!("user '{}' not found in legacy directory", username),
    }
}

async fn cmd_replay<D: LegacyDirectory>(directory: D, event: MigrationTriggerEvent) -> Result<()> {
    debug!(
        trigger_source = %event.trigger_source,
        user = %event.user_name,
        "replaying trigger event"
    );
    let router = TriggerRouter::new(directory);
    match router.handle(event).await {
        Ok(event) => {
            let rendered =
                serde_json::to_string_pretty(&event).context("failed to serialize event")?;
            println!("{}", rendered);
            Ok(())
        }
        Err(reason) => anyhow::bail!("migration rejected: {} ({})", reason, reason.code()),
    }
}

fn print_migration(user: &LegacyUser) -> Result<()> {
    println!("Legacy user: {}", user.user_name());
    println!();

    match AttributeMapper.map(user) {
        Ok(attributes) => {
            println!("{}", attribute_table(&attributes));
            Ok(())
        }
        Err(e) => anyhow::bail!("user cannot be migrated: {}", e),
    }
}

fn attribute_table(attributes: &AttributeSet) -> Table {
    let mut names: Vec<&String> = attributes.keys().collect();
    names.sort();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Attribute", "Value"]);
    for name in names {
        table.add_row(vec![Cell::new(name), Cell::new(&attributes[name])]);
    }
    table
}
