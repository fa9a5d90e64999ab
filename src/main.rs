use clap::{Parser, Subcommand};
use colored::Colorize;
use ctl365_catalog::cmd;
use ctl365_catalog::cmd::policy::PolicyCommands;
use ctl365_catalog::cmd::tenant::TenantCommands;
use ctl365_catalog::config::ConfigManager;
use ctl365_catalog::error;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "ctl365-catalog",
    about = "Manage Intune settings catalog policies as documents",
    version,
    long_about = "Read, build and apply Intune settings catalog configuration policies.\n\n\
                  Policies are exported to editable JSON documents and applied back through\n\
                  Microsoft Graph, across as many tenants as you manage."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration directory (tenants, tokens, config.toml)
    #[arg(long, global = true, env = "CTL365_CATALOG_CONFIG_DIR")]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Authenticate to Microsoft Graph API
    Login(cmd::login::LoginArgs),

    /// Logout and clear cached credentials
    Logout(cmd::login::LogoutArgs),

    /// Manage tenant configurations
    #[command(subcommand)]
    Tenant(TenantCommands),

    /// Manage settings catalog policies
    #[command(subcommand)]
    Policy(PolicyCommands),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if e.is_mapping_error() {
            eprintln!(
                "{} Fix the setting at the path shown and run the command again",
                "→".cyan()
            );
        }
        std::process::exit(1);
    }
}

async fn run() -> error::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config_dir {
        Some(dir) => ConfigManager::with_dir(dir)?,
        None => ConfigManager::new()?,
    };

    let filter = if cli.verbose {
        "ctl365_catalog=debug".to_string()
    } else {
        let level = config.load_config().map(|c| c.log_level).unwrap_or_default();
        if level.is_empty() {
            "warn".to_string()
        } else {
            level
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Login(args) => cmd::login::login(args, &config).await?,
        Commands::Logout(args) => cmd::login::logout(args, &config).await?,
        Commands::Tenant(tenant_cmd) => cmd::tenant::execute(tenant_cmd, &config).await?,
        Commands::Policy(policy_cmd) => cmd::policy::execute(policy_cmd, &config).await?,
    }

    Ok(())
}
