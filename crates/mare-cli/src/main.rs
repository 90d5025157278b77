//! MARE Router CLI
//!
//! The `mare` command exposes the routing engine from the shell.
//!
//! ## Commands
//!
//! - `plan`: Decompose a project and print the per-role execution plan
//! - `route`: Classify a single task description
//! - `reps`: List role definitions loaded from the REP directory
//! - `run`: Plan a project and dispatch it through the no-op runner

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, Level};

use mare_core::{ExecutionPlan, MareConfig, MareSystem, Task, TaskStatus, DEFAULT_CONFIG_FILE};

const DEFAULT_PROJECT: &str = "Build MARE MVP with self-construction proof";

#[derive(Parser)]
#[command(name = "mare")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Rule-based task router for MARE role-embodied agents", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Configuration file (default: ./mare.toml, if present)
    #[arg(long, global = true, env = "MARE_CONFIG")]
    config: Option<PathBuf>,

    /// Directory containing *_rep.json role definitions (overrides config)
    #[arg(long, global = true, env = "MARE_REP_DIR")]
    rep_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decompose a project and show the execution plan grouped by role
    Plan {
        /// Project description
        #[arg(default_value = DEFAULT_PROJECT)]
        project: String,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify a task description and print the chosen role
    Route {
        /// Task description
        description: String,

        /// Required output, classified together with the description
        #[arg(short, long, default_value = "")]
        output: String,
    },

    /// List available role definitions
    Reps,

    /// Plan a project and dispatch every task with the placeholder runner
    Run {
        /// Project description
        #[arg(default_value = DEFAULT_PROJECT)]
        project: String,

        /// Print task results as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    mare_core::init_tracing(cli.log_json, level);

    let config = load_config(cli.config.as_deref(), cli.rep_dir)?;
    debug!(rep_directory = %config.rep_directory.display(), "resolved configuration");

    let system = MareSystem::new(config).context("Failed to initialise MARE router")?;

    match cli.command {
        Commands::Plan { project, json } => cmd_plan(&system, &project, json),
        Commands::Route {
            description,
            output,
        } => cmd_route(&system, &description, &output),
        Commands::Reps => cmd_reps(&system),
        Commands::Run { project, json } => cmd_run(&system, &project, json).await,
    }
}

/// Resolve configuration: explicit file, else `./mare.toml` if present, else
/// defaults. `--rep-dir` wins over the file.
fn load_config(path: Option<&std::path::Path>, rep_dir: Option<PathBuf>) -> Result<MareConfig> {
    let mut config = match path {
        Some(path) => MareConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => MareConfig::load_or_default(DEFAULT_CONFIG_FILE)
            .context("Failed to load default config")?,
    };
    if let Some(dir) = rep_dir {
        config.rep_directory = dir;
    }
    Ok(config)
}

/// Show the execution plan
fn cmd_plan(system: &MareSystem, project: &str, json: bool) -> Result<()> {
    let plan = system.plan_project(project);

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("MARE Execution Plan: {project}");
    println!("{}", "=".repeat(50));
    print_plan(&plan);
    println!();
    println!("{} tasks across {} roles", plan.task_count(), plan.len());

    Ok(())
}

fn print_plan(plan: &ExecutionPlan) {
    for (role, tasks) in plan.iter() {
        println!();
        println!("{role}:");
        for task in tasks {
            print_task(task);
        }
    }
}

fn print_task(task: &Task) {
    println!("  - {}: {}", task.id, task.description);
    println!("    Output: {}", task.required_output);
}

/// Classify a single task
fn cmd_route(system: &MareSystem, description: &str, output: &str) -> Result<()> {
    let mut task = Task::new("adhoc", description, "", output);
    let role = system.classifier().route_task(&mut task);
    println!("{role}");

    if let Some(def) = system.catalog().get(role.as_str()) {
        println!("  Archetype: {}", def.archetype);
    }

    Ok(())
}

/// List role definitions
fn cmd_reps(system: &MareSystem) -> Result<()> {
    let catalog = system.catalog();

    if catalog.is_empty() {
        println!("No role definitions found. Add *_rep.json files or pass --rep-dir.");
        return Ok(());
    }

    for def in catalog.iter() {
        println!("{}", def.name);
        println!("  Archetype: {}", def.archetype);
        if !def.expertise_tags.is_empty() {
            println!("  Expertise: {}", def.expertise_tags.join(", "));
        }
        if let Some(source) = &def.source {
            println!("  Source:    {}", source.display());
        }
    }

    Ok(())
}

/// Plan and dispatch a project
async fn cmd_run(system: &MareSystem, project: &str, json: bool) -> Result<()> {
    let plan = system.plan_project(project);
    let results = system.execute_plan(&plan).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!(
        "Execution Plan: {} tasks across {} roles",
        plan.task_count(),
        plan.len()
    );
    for result in &results {
        let marker = match result.status {
            TaskStatus::Completed => "ok",
            TaskStatus::Failed => "FAILED",
            TaskStatus::Pending | TaskStatus::Running => "..",
        };
        println!(
            "  [{marker}] {} as {} ({} ms)",
            result.task_id, result.role_used, result.execution_time_ms
        );
        if let Some(error) = &result.error {
            println!("       {error}");
        }
    }

    let failed = results.iter().filter(|r| !r.is_success()).count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} tasks failed", results.len());
    }

    Ok(())
}
