use crate::catalog::diagnostics::Diagnostic;
use crate::catalog::policy::{assignments_to_graph, policy_from_graph, policy_to_graph};
use crate::catalog::wire::GraphConfigurationPolicy;
use crate::catalog::ConfigurationPolicy;
use crate::config::ConfigManager;
use crate::error::{CatalogError, Result};
use crate::graph::configuration_policies::{self, PolicyFilter};
use crate::graph::GraphClient;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum PolicyCommands {
    /// List settings catalog policies in the tenant
    List(ListArgs),

    /// Read a policy and write it as a policy document
    Show(ShowArgs),

    /// Create or update a policy from a policy document
    Apply(ApplyArgs),

    /// Delete a policy
    Delete(DeleteArgs),

    /// Build the Graph request body for a policy document (offline)
    Build(BuildArgs),

    /// Convert a Graph JSON export into a policy document (offline)
    Convert(ConvertArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only show policies whose name contains this text (case-insensitive)
    #[arg(long)]
    pub filter: Option<String>,

    /// Only show policies for this platform (e.g. windows10, macOS)
    #[arg(long)]
    pub platform: Option<String>,

    /// Raw OData $filter expression passed to Graph
    #[arg(long)]
    pub odata_filter: Option<String>,

    /// Tenant to use (defaults to the active tenant)
    #[arg(short, long)]
    pub tenant: Option<String>,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Policy ID
    pub id: String,

    /// Output file path (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Tenant to use (defaults to the active tenant)
    #[arg(short, long)]
    pub tenant: Option<String>,
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Policy document to apply
    #[arg(short, long)]
    pub file: PathBuf,

    /// Print the request body without sending anything
    #[arg(long)]
    pub dry_run: bool,

    /// Write the new policy ID back into the document after a create
    #[arg(long)]
    pub save_id: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Tenant to use (defaults to the active tenant)
    #[arg(short, long)]
    pub tenant: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Policy ID
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Tenant to use (defaults to the active tenant)
    #[arg(short, long)]
    pub tenant: Option<String>,
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Policy document to build
    #[arg(short, long)]
    pub file: PathBuf,

    /// Output file path (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Graph JSON export of a policy, with settings inlined
    #[arg(short, long)]
    pub file: PathBuf,

    /// Output file path (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn execute(cmd: PolicyCommands, config: &ConfigManager) -> Result<()> {
    match cmd {
        PolicyCommands::List(args) => list(args, config).await,
        PolicyCommands::Show(args) => show(args, config).await,
        PolicyCommands::Apply(args) => apply(args, config).await,
        PolicyCommands::Delete(args) => delete(args, config).await,
        PolicyCommands::Build(args) => build(args, config),
        PolicyCommands::Convert(args) => convert(args),
    }
}

async fn connect(config: &ConfigManager, tenant: Option<&str>) -> Result<(String, GraphClient)> {
    let tenant_name = config.resolve_tenant_name(tenant)?;
    let graph = GraphClient::from_config(config, &tenant_name).await?;
    Ok((tenant_name, graph))
}

pub(crate) fn load_document(path: &Path) -> Result<ConfigurationPolicy> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        CatalogError::InvalidConfig(format!(
            "{} is not a valid policy document: {}",
            path.display(),
            e
        ))
    })
}

fn report(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{}", diagnostic);
    }
}

async fn list(args: ListArgs, config: &ConfigManager) -> Result<()> {
    let (tenant_name, graph) = connect(config, args.tenant.as_deref()).await?;

    let filter = PolicyFilter {
        odata_filter: args.odata_filter,
        name_contains: args.filter,
        platform: args.platform,
    };
    let policies = configuration_policies::list_policies(&graph, &filter).await?;

    if policies.is_empty() {
        println!("{} No policies found in '{}'", "!".yellow(), tenant_name);
        return Ok(());
    }

    println!(
        "\n{} {}",
        "Settings catalog policies:".bold(),
        tenant_name.cyan()
    );
    println!("{}", "─".repeat(80));

    for policy in &policies {
        let assigned = if policy.is_assigned.unwrap_or(false) {
            "●".green()
        } else {
            "○".dimmed()
        };
        println!(
            "{} {}  {}",
            assigned,
            policy.name.as_deref().unwrap_or("<unnamed>").bold(),
            policy.id.as_deref().unwrap_or("").dimmed()
        );
        println!(
            "    {} · {} · {} setting(s)",
            policy.platforms.as_deref().unwrap_or("none"),
            policy.technologies.as_deref().unwrap_or("none"),
            policy.setting_count.unwrap_or(0)
        );
    }

    println!("{}", "─".repeat(80));
    println!("{} {} policies", "→".cyan(), policies.len());

    Ok(())
}

async fn show(args: ShowArgs, config: &ConfigManager) -> Result<()> {
    let (_, graph) = connect(config, args.tenant.as_deref()).await?;

    let policy = configuration_policies::get_policy(&graph, &args.id).await?;
    let settings = configuration_policies::get_policy_settings(&graph, &args.id).await?;
    let assignments = configuration_policies::get_policy_assignments(&graph, &args.id).await?;
    tracing::debug!(
        policy_id = %args.id,
        settings = settings.len(),
        assignments = assignments.len(),
        "fetched policy"
    );

    let outcome = policy_from_graph(&policy, &settings, &assignments);
    report(&outcome.diagnostics);

    super::write_json(&outcome.value, args.output.as_deref())
}

async fn apply(args: ApplyArgs, config: &ConfigManager) -> Result<()> {
    let mut document = load_document(&args.file)?;
    let options = config.load_config()?.mapper.options();
    let body = policy_to_graph(&document, &options)?;
    let assignments = assignments_to_graph(&document.assignments);

    if args.dry_run {
        println!("{} Dry run, nothing will be sent\n", "→".cyan());
        println!("{}", serde_json::to_string_pretty(&body)?);
        if !assignments.is_empty() {
            println!("\n{}", "Assignments:".bold());
            println!("{}", serde_json::to_string_pretty(&assignments)?);
        }
        return Ok(());
    }

    let (tenant_name, graph) = connect(config, args.tenant.as_deref()).await?;

    let action = if document.id.is_some() { "Update" } else { "Create" };
    if !args.yes
        && !super::confirm(&format!(
            "{} policy '{}' in tenant '{}'?",
            action,
            document.name.bold(),
            tenant_name.cyan()
        ))?
    {
        println!("{}", "Cancelled.".yellow());
        return Ok(());
    }

    let policy_id = match document.id.clone() {
        Some(id) => {
            configuration_policies::update_policy(&graph, &id, &body).await?;
            println!("{} Updated policy {}", "✓".green(), id.dimmed());
            id
        }
        None => {
            let created = configuration_policies::create_policy(&graph, &body).await?;
            let id = created.id.ok_or_else(|| {
                CatalogError::GraphApiError("Created policy has no id".into())
            })?;
            println!("{} Created policy {}", "✓".green(), id.dimmed());
            id
        }
    };

    // An update with no assignments still clears whatever was there
    if !assignments.is_empty() || document.id.is_some() {
        let count = assignments.len();
        configuration_policies::assign_policy(&graph, &policy_id, assignments).await?;
        println!("{} Assigned to {} target(s)", "✓".green(), count);
    }

    if args.save_id && document.id.is_none() {
        document.id = Some(policy_id);
        fs::write(&args.file, serde_json::to_string_pretty(&document)? + "\n")?;
        println!(
            "{} Saved policy id to {}",
            "✓".green(),
            args.file.display()
        );
    }

    Ok(())
}

async fn delete(args: DeleteArgs, config: &ConfigManager) -> Result<()> {
    let (tenant_name, graph) = connect(config, args.tenant.as_deref()).await?;

    if !args.yes
        && !super::confirm(&format!(
            "Delete policy {} from tenant '{}'?",
            args.id.bold(),
            tenant_name.cyan()
        ))?
    {
        println!("{}", "Cancelled.".yellow());
        return Ok(());
    }

    configuration_policies::delete_policy(&graph, &args.id).await?;
    println!("{} Deleted policy {}", "✓".green(), args.id);

    Ok(())
}

fn build(args: BuildArgs, config: &ConfigManager) -> Result<()> {
    let document = load_document(&args.file)?;
    let options = config.load_config()?.mapper.options();
    let body = policy_to_graph(&document, &options)?;
    super::write_json(&body, args.output.as_deref())
}

fn convert(args: ConvertArgs) -> Result<()> {
    let content = fs::read_to_string(&args.file)?;
    let export: GraphConfigurationPolicy = serde_json::from_str(&content)?;

    let settings = export.settings.as_deref().unwrap_or_default();
    let assignments = export.assignments.as_deref().unwrap_or_default();
    let outcome = policy_from_graph(&export, settings, assignments);
    report(&outcome.diagnostics);

    super::write_json(&outcome.value, args.output.as_deref())
}
