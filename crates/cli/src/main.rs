//! usertag command-line tool.
//!
//! Exercises the username cache from a shell: reconcile a typed username
//! against a cookie value, write the cookie a registration would set,
//! allocate discriminators, and generate / validate configuration files.

mod style;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use tracing_subscriber::EnvFilter;

use usertag_core::config::AppConfig;
use usertag_core::cookie::SetCookie;
use usertag_core::identity::{self, DiscriminatorAllocator, FullUsername, UsernameMapping};
use usertag_core::login::{self, LoginTarget};

use crate::style::EntryStatus;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// usertag command-line tool.
#[derive(Parser, Debug)]
#[command(
    name = "usertag",
    version,
    about = "Inspect and write the discriminated username cache"
)]
struct Cli {
    /// Path to the TOML configuration file. Defaults are used if omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Full username to confirm for a typed username, if the cache has one.
    Reconcile {
        /// Percent-encoded cookie value.
        #[arg(long)]
        cookie: String,

        /// Username as typed.
        username: String,
    },

    /// Raw cache entry for a username, without the ownership check.
    Lookup {
        /// Percent-encoded cookie value.
        #[arg(long)]
        cookie: String,

        /// Username as typed.
        username: String,
    },

    /// Check whether a full username belongs to a base username.
    Matches {
        /// Base username.
        username: String,

        /// Candidate full username.
        full: String,
    },

    /// Print the Set-Cookie header that remembers a full username.
    Remember {
        /// Current percent-encoded cookie value, if any.
        #[arg(long)]
        cookie: Option<String>,

        /// Base username.
        username: String,

        /// Full username to remember.
        full: String,
    },

    /// Show the login name the server would authenticate against.
    Resolve {
        /// Username as typed.
        #[arg(long)]
        raw: String,

        /// Hidden confirmed full username field.
        #[arg(long, default_value = "")]
        hidden: String,

        /// Percent-encoded cookie value.
        #[arg(long)]
        cookie: Option<String>,
    },

    /// Show the values the login page would be prefilled with.
    Prefill {
        /// Percent-encoded cookie value.
        #[arg(long)]
        cookie: String,
    },

    /// List every entry in a cookie value.
    List {
        /// Percent-encoded cookie value.
        #[arg(long)]
        cookie: String,
    },

    /// Allocate a discriminator for a new account.
    Discriminator {
        /// Discriminators already in use for this username.
        #[arg(long, value_delimiter = ',')]
        taken: Vec<u16>,

        /// Base username being registered.
        username: String,
    },

    /// Generate a default configuration file.
    Init {
        /// Output path for the generated config file.
        #[arg(short, long, default_value = "./usertag.toml")]
        output: PathBuf,
    },

    /// Validate a configuration file.
    Validate,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Reconcile { cookie, username } => {
            load_config(config_path)?;
            Ok(cmd_reconcile(&cookie, &username))
        }
        Commands::Lookup { cookie, username } => {
            load_config(config_path)?;
            Ok(cmd_lookup(&cookie, &username))
        }
        Commands::Matches { username, full } => {
            load_config(config_path)?;
            Ok(cmd_matches(&username, &full))
        }
        Commands::Remember {
            cookie,
            username,
            full,
        } => cmd_remember(&load_config(config_path)?, cookie.as_deref(), &username, &full),
        Commands::Resolve { raw, hidden, cookie } => {
            let config = load_config(config_path)?;
            Ok(cmd_resolve(&config, &raw, &hidden, cookie.as_deref()))
        }
        Commands::Prefill { cookie } => {
            load_config(config_path)?;
            Ok(cmd_prefill(&cookie))
        }
        Commands::List { cookie } => {
            load_config(config_path)?;
            cmd_list(&cookie)
        }
        Commands::Discriminator { taken, username } => {
            cmd_discriminator(&load_config(config_path)?, &username, &taken)
        }
        Commands::Init { output } => cmd_init(&output).map(|_| ExitCode::SUCCESS),
        Commands::Validate => {
            let path = config_path.context("validate needs --config <path>")?;
            cmd_validate(path).map(|_| ExitCode::SUCCESS)
        }
    }
}

/// Load `--config` (or the defaults) and install the log subscriber it
/// configures.
fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = AppConfig::load_or_default(path).context("failed to load configuration")?;
    init_tracing(&config);
    tracing::debug!(cookie = %config.cookie.name, "configuration loaded");
    Ok(config)
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

fn cmd_reconcile(cookie: &str, username: &str) -> ExitCode {
    match identity::reconcile(cookie, username) {
        Some(full) => {
            println!("{}", full);
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("{}", style::warn(&format!("no confirmed full username for '{}'", username)));
            ExitCode::FAILURE
        }
    }
}

fn cmd_lookup(cookie: &str, username: &str) -> ExitCode {
    match identity::lookup(cookie, username) {
        Some(full) => {
            println!("{}", full);
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("{}", style::warn(&format!("no cache entry for '{}'", username)));
            ExitCode::FAILURE
        }
    }
}

fn cmd_matches(username: &str, full: &str) -> ExitCode {
    if identity::matches(username, full) {
        println!("{}", style::success(&format!("{} belongs to {}", full, username)));
        ExitCode::SUCCESS
    } else {
        println!("{}", style::error(&format!("{} does not belong to {}", full, username)));
        ExitCode::FAILURE
    }
}

fn cmd_remember(config: &AppConfig, cookie: Option<&str>, username: &str, full: &str) -> Result<ExitCode> {
    FullUsername::parse(full).with_context(|| format!("refusing to remember '{}'", full))?;

    let existing = cookie.map(|value| format!("{}={}", config.cookie.name, value));
    let set_cookie = SetCookie::remember(&config.cookie, existing.as_deref(), username, full)
        .context("failed to encode username mapping")?;

    println!("Set-Cookie: {}", set_cookie.header_value());
    Ok(ExitCode::SUCCESS)
}

fn cmd_resolve(config: &AppConfig, raw: &str, hidden: &str, cookie: Option<&str>) -> ExitCode {
    match LoginTarget::resolve(&config.accounts, raw, hidden, cookie) {
        LoginTarget::Admin => println!("{}", style::administrator(&config.accounts.admin_username)),
        LoginTarget::User(name) => println!("{}", name),
    }
    ExitCode::SUCCESS
}

fn cmd_prefill(cookie: &str) -> ExitCode {
    match login::prefill(Some(cookie)) {
        Some((full, base)) => {
            println!("username      : {}", base);
            println!("full_username : {}", full);
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("{}", style::warn("nothing to prefill"));
            ExitCode::FAILURE
        }
    }
}

fn cmd_list(cookie: &str) -> Result<ExitCode> {
    let mapping = UsernameMapping::decode(cookie).context("cookie value is not a username mapping")?;

    if mapping.is_empty() {
        println!("{}", style::dim("No cached usernames."));
        return Ok(ExitCode::SUCCESS);
    }

    println!();
    println!("{}", style::header(&format!("Cached usernames ({})", mapping.len())));
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Key", "Full username", "Status"]);

    for (key, full) in mapping.iter() {
        let status = EntryStatus::of(key, full);
        table.add_row(vec![Cell::new(key), Cell::new(full), status.cell()]);
    }

    println!("{}", table);
    println!();
    Ok(ExitCode::SUCCESS)
}

fn cmd_discriminator(config: &AppConfig, username: &str, taken: &[u16]) -> Result<ExitCode> {
    let allocator = DiscriminatorAllocator::new(&config.accounts);
    let taken: HashSet<u16> = taken.iter().copied().collect();

    let discriminator = allocator
        .allocate(username, &taken)
        .context("failed to allocate discriminator")?;

    println!("{}", allocator.full_username(username, discriminator));
    Ok(ExitCode::SUCCESS)
}

fn cmd_init(output: &Path) -> Result<()> {
    let default_config = r#"# usertag configuration

[cookie]
name = "full_usernames"
max_age_days = 30
path = "/"
secure = true
http_only = false
same_site = "strict"

[accounts]
admin_username = "admin"
discriminator_max = 9999
discriminator_width = 4

[log]
level = "warn"
"#;

    if output.exists() {
        anyhow::bail!(
            "file already exists: {}. Use a different path or remove the existing file.",
            output.display()
        );
    }

    std::fs::write(output, default_config).context("failed to write config file")?;

    println!("{}", style::success(&format!("Default configuration written to {}", output.display())));
    println!();
    println!("Validate with: usertag validate --config {}", output.display());

    Ok(())
}

fn cmd_validate(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {}", config_path.display());
    println!();

    let config = AppConfig::load_from_file(config_path).context("failed to parse configuration")?;
    println!("  [OK] TOML structure is valid");

    match config.validate() {
        Ok(()) => {
            println!("  [OK] All fields are valid");
        }
        Err(e) => {
            println!("  [FAIL] Validation error: {}", e);
            anyhow::bail!("configuration validation failed");
        }
    }

    println!();
    println!("Configuration summary:");
    println!("  Cookie name     : {}", config.cookie.name);
    println!("  Cookie lifetime : {} days", config.cookie.max_age_days);
    println!("  Cookie path     : {}", config.cookie.path);
    println!(
        "  Cookie flags    : {}{}SameSite={}",
        if config.cookie.secure { "Secure " } else { "" },
        if config.cookie.http_only { "HttpOnly " } else { "" },
        config.cookie.same_site.as_str()
    );
    println!("  Admin username  : {}", config.accounts.admin_username);
    println!(
        "  Discriminators  : 1..={} ({} digits)",
        config.accounts.discriminator_max, config.accounts.discriminator_width
    );
    println!();
    println!("Configuration is valid.");

    Ok(())
}
