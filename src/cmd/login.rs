use crate::config::{AuthType, ConfigManager, TenantConfig};
use crate::error::{CatalogError, Result};
use crate::graph::auth::{GraphAuth, REQUIRED_SCOPES};
use clap::Args;
use colored::Colorize;

/// Truncate to n characters (not bytes)
fn truncate_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Tenant name. Checks tenants.toml, then {name}.env in the config directory
    #[arg(index = 1)]
    name: Option<String>,

    /// Tenant ID (Entra ID tenant ID) for quick setup
    #[arg(long, requires = "client_id")]
    tenant_id: Option<String>,

    /// Client ID (Application ID) for quick setup
    #[arg(long, requires = "tenant_id")]
    client_id: Option<String>,

    /// Client secret (for client credentials flow)
    #[arg(long)]
    client_secret: Option<String>,

    /// Use client credentials flow instead of device code
    #[arg(long)]
    client_credentials: bool,

    /// Tenant description
    #[arg(long)]
    description: Option<String>,
}

#[derive(Args, Debug)]
pub struct LogoutArgs {
    /// Tenant name (defaults to the active tenant)
    #[arg(short, long)]
    tenant: Option<String>,

    /// Logout from all tenants
    #[arg(long)]
    all: bool,
}

pub async fn login(args: LoginArgs, config_manager: &ConfigManager) -> Result<()> {
    let auth = GraphAuth::new(config_manager.clone());

    let tenant_config = match (&args.tenant_id, &args.client_id) {
        (Some(tenant_id), Some(client_id)) => {
            let name = args.name.clone().unwrap_or_else(|| {
                tenant_id
                    .split('-')
                    .next()
                    .unwrap_or("my-tenant")
                    .to_string()
            });

            let auth_type = if args.client_credentials || args.client_secret.is_some() {
                AuthType::ClientCredentials
            } else {
                AuthType::DeviceCode
            };

            let tenant = TenantConfig {
                name: name.clone(),
                tenant_id: tenant_id.clone(),
                client_id: client_id.clone(),
                client_secret: args.client_secret.clone(),
                auth_type,
                description: args.description.clone(),
            };

            config_manager.add_tenant(tenant.clone())?;
            println!("{} Tenant '{}' configuration saved", "✓".green(), name);
            tenant
        }
        _ => {
            let name = args.name.as_deref().ok_or_else(|| {
                CatalogError::InvalidConfig(
                    "Usage:\n  \
                    ctl365-catalog login RESO                          # tenants.toml or reso.env\n  \
                    ctl365-catalog login NAME --tenant-id ID --client-id ID  # quick setup"
                        .into(),
                )
            })?;

            let tenant = config_manager.get_tenant_or_env(name).map_err(|_| {
                CatalogError::ConfigError(format!(
                    "Tenant '{}' not found.\n\n\
                    Create {}/{}.env with:\n   \
                       TENANT_ID=your-tenant-id\n   \
                       CLIENT_ID=your-client-id\n   \
                       CLIENT_SECRET=your-secret",
                    name,
                    config_manager.config_dir().display(),
                    name.to_lowercase()
                ))
            })?;

            println!(
                "{} Loaded tenant: {} ({})",
                "✓".green(),
                name.bold(),
                tenant.description.as_deref().unwrap_or("")
            );
            println!("  Tenant ID: {}...", truncate_chars(&tenant.tenant_id, 8));
            println!("  Client ID: {}...", truncate_chars(&tenant.client_id, 8));
            tenant
        }
    };

    match tenant_config.auth_type {
        AuthType::DeviceCode => auth.login_device_code(&tenant_config).await?,
        AuthType::ClientCredentials => auth.login_client_credentials(&tenant_config).await?,
    };

    let mut config = config_manager.load_config()?;
    config.current_tenant = Some(tenant_config.name.clone());
    config_manager.save_config(&config)?;

    println!(
        "\n{} Active tenant: {}",
        "→".cyan(),
        tenant_config.name.bold()
    );
    println!(
        "{} Required permissions: {}",
        "→".cyan(),
        REQUIRED_SCOPES.join(", ").dimmed()
    );

    Ok(())
}

pub async fn logout(args: LogoutArgs, config_manager: &ConfigManager) -> Result<()> {
    let auth = GraphAuth::new(config_manager.clone());

    if args.all {
        for tenant in &config_manager.load_tenants()? {
            auth.logout(&tenant.name)?;
        }
        println!("{} Logged out from all tenants", "✓".green());
    } else if let Some(tenant_name) = &args.tenant {
        auth.logout(tenant_name)?;
    } else if let Some(current_tenant) = config_manager.load_config()?.current_tenant {
        auth.logout(&current_tenant)?;
    } else {
        println!("{} No active tenant", "!".yellow());
    }

    Ok(())
}
