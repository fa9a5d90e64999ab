use crate::config::{AuthType, ConfigManager, TenantConfig};
use crate::error::{CatalogError, Result};
use crate::graph::GRAPH_API_BETA;
use clap::{Args, Subcommand};
use colored::Colorize;

#[derive(Subcommand, Debug)]
pub enum TenantCommands {
    /// Register an app registration for a tenant
    Add(AddArgs),

    /// Show tenants, their sessions and the Graph settings policies run with
    List(ListArgs),

    /// Make a tenant the default for policy commands
    Switch(NameArgs),

    /// Forget a tenant and its cached token
    Remove(RemoveArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Name used with --tenant and login
    name: String,

    /// Entra ID tenant ID or primary domain
    #[arg(long)]
    tenant_id: String,

    /// Application (client) ID, a GUID
    #[arg(long)]
    client_id: String,

    /// Client secret; implies client credentials
    #[arg(long)]
    client_secret: Option<String>,

    /// Tenant description
    #[arg(long)]
    description: Option<String>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Also show tenant and client IDs
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Args, Debug)]
pub struct NameArgs {
    name: String,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    name: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

pub async fn execute(cmd: TenantCommands, config: &ConfigManager) -> Result<()> {
    match cmd {
        TenantCommands::Add(args) => add(args, config),
        TenantCommands::List(args) => list(args, config),
        TenantCommands::Switch(args) => switch(args, config),
        TenantCommands::Remove(args) => remove(args, config),
    }
}

/// Whether policy commands can run against a tenant right now
#[derive(Debug, Clone, PartialEq, Eq)]
enum Session {
    Active { expires: String },
    Expired,
    LoggedOut,
}

fn session(config: &ConfigManager, tenant_name: &str) -> Result<Session> {
    match config.load_token(tenant_name) {
        Ok(token) => Ok(Session::Active {
            expires: token.expires_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        }),
        Err(CatalogError::AuthError(_)) => Ok(Session::Expired),
        Err(CatalogError::TokenNotFound) => Ok(Session::LoggedOut),
        Err(e) => Err(e),
    }
}

fn describe(session: &Session) -> String {
    match session {
        Session::Active { expires } => format!("{} until {}", "signed in".green(), expires),
        Session::Expired => "token expired".yellow().to_string(),
        Session::LoggedOut => "not signed in".dimmed().to_string(),
    }
}

fn tenant_from_args(args: AddArgs) -> Result<TenantConfig> {
    uuid::Uuid::parse_str(&args.client_id).map_err(|_| {
        CatalogError::InvalidConfig(format!(
            "Client ID '{}' is not a GUID. Use the app registration's Application (client) ID",
            args.client_id
        ))
    })?;

    let auth_type = if args.client_secret.is_some() {
        AuthType::ClientCredentials
    } else {
        AuthType::DeviceCode
    };

    Ok(TenantConfig {
        name: args.name,
        tenant_id: args.tenant_id,
        client_id: args.client_id,
        client_secret: args.client_secret,
        auth_type,
        description: args.description,
    })
}

fn add(args: AddArgs, config: &ConfigManager) -> Result<()> {
    let tenant = tenant_from_args(args)?;
    let name = tenant.name.clone();
    config.add_tenant(tenant)?;

    println!("{} Tenant '{}' saved", "✓".green(), name);
    println!(
        "{} Next: {}",
        "→".cyan(),
        format!("ctl365-catalog login {}", name).bold()
    );
    Ok(())
}

fn list(args: ListArgs, config: &ConfigManager) -> Result<()> {
    let tenants = config.load_tenants()?;
    let settings = config.load_config()?;

    if tenants.is_empty() {
        println!(
            "{} No tenants yet. Add one with {}",
            "!".yellow(),
            "ctl365-catalog tenant add".bold()
        );
        return Ok(());
    }

    for tenant in &tenants {
        let active = settings.current_tenant.as_deref() == Some(tenant.name.as_str());
        let marker = if active { "●".green() } else { "○".dimmed() };
        let flow = match tenant.auth_type {
            AuthType::DeviceCode => "device code",
            AuthType::ClientCredentials => "client credentials",
        };

        println!(
            "{} {} ({}) {}",
            marker,
            tenant.name.bold(),
            flow,
            describe(&session(config, &tenant.name)?)
        );
        if let Some(desc) = &tenant.description {
            println!("    {}", desc.dimmed());
        }
        if args.verbose {
            println!("    tenant {}  client {}", tenant.tenant_id, tenant.client_id);
        }
    }

    let graph = &settings.graph;
    println!(
        "\n{} Graph: {}",
        "→".cyan(),
        graph.base_url.as_deref().unwrap_or(GRAPH_API_BETA)
    );
    println!(
        "{} Retries: {} (backoff {}-{} ms)",
        "→".cyan(),
        graph.max_retries,
        graph.initial_backoff_ms,
        graph.max_backoff_ms
    );
    println!(
        "{} Template id validation: {}",
        "→".cyan(),
        if settings.mapper.validate_template_ids {
            "on"
        } else {
            "off"
        }
    );

    Ok(())
}

fn switch(args: NameArgs, config: &ConfigManager) -> Result<()> {
    config.set_active_tenant(&args.name)?;
    println!("{} Policy commands now target '{}'", "✓".green(), args.name);

    let state = session(config, &args.name)?;
    if !matches!(state, Session::Active { .. }) {
        println!(
            "{} {}: run {}",
            "!".yellow(),
            describe(&state),
            format!("ctl365-catalog login {}", args.name).bold()
        );
    }
    Ok(())
}

fn remove(args: RemoveArgs, config: &ConfigManager) -> Result<()> {
    config.get_tenant(&args.name)?;

    if !args.yes
        && !super::confirm(&format!(
            "Remove tenant '{}' and its cached token?",
            args.name
        ))?
    {
        println!("{}", "Cancelled.".yellow());
        return Ok(());
    }

    config.remove_tenant(&args.name)?;
    println!("{} Tenant '{}' removed", "✓".green(), args.name);
    Ok(())
}
