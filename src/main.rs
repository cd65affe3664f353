use repokiln::catalog::RepoCatalog;
use repokiln::cli::commands::{CliArgs, Commands, RepoArgs};
use repokiln::cli::output::{OutputFormat, OutputFormatter};
use repokiln::fs::RealFileSystem;
use repokiln::pipeline::{
    HandlerTable, PipelineContext, PipelineOrchestrator, PipelineStatus, Stage, StageStore,
};
use repokiln::process::SystemCommandRunner;
use repokiln::util::{init_logging, LoggingConfig};
use repokiln::workspace::WorkspaceLayout;
use repokiln::{RepokilnConfig, NAME, VERSION};

use anyhow::{Context, Result};
use clap::Parser;
use std::process;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Exit code when the final stage result is `failed`
const EXIT_STAGE_FAILED: i32 = 2;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging(LoggingConfig::from_cli(
        args.log_level.as_deref(),
        args.verbose,
        args.quiet,
    ));

    debug!("{} v{} starting", NAME, VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match run(&args).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            1
        }
    };

    process::exit(exit_code);
}

fn load_config(args: &CliArgs) -> Result<RepokilnConfig> {
    let mut config = RepokilnConfig::default();
    if let Some(catalog) = &args.catalog {
        config = config.with_catalog_path(catalog);
    }
    if let Some(workspace) = &args.workspace {
        config = config.with_workspace_root(workspace);
    }
    config.validate().context("Configuration error")?;
    Ok(config)
}

async fn run(args: &CliArgs) -> Result<i32> {
    let config = load_config(args)?;
    let formatter = OutputFormatter::new(OutputFormat::from(args.format));

    match &args.command {
        Commands::Config => {
            println!("{}", formatter.format_config(&config)?);
            Ok(0)
        }
        Commands::List => handle_list(&config, &formatter),
        Commands::Status(repo_args) => handle_status(&config, repo_args, &formatter),
        command => {
            let (Some(stage), Some(repo_args)) = (command.stage(), command.repo_args()) else {
                anyhow::bail!("Unsupported command");
            };
            handle_stage(&config, repo_args, stage, &formatter).await
        }
    }
}

fn load_catalog(config: &RepokilnConfig) -> Result<RepoCatalog> {
    RepoCatalog::from_file(&config.catalog_path).with_context(|| {
        format!(
            "Failed to load catalog {}",
            config.catalog_path.display()
        )
    })
}

fn orchestrator(config: &RepokilnConfig, repo_args: &RepoArgs) -> Result<PipelineOrchestrator> {
    let catalog = load_catalog(config)?;
    let repo = catalog.get(&repo_args.repo_id)?.clone();

    let context = PipelineContext::new(
        Arc::new(repo),
        &config.workspace_root,
        Arc::new(RealFileSystem::new()),
        Arc::new(SystemCommandRunner::new()),
        config.pipeline_config(),
    );
    PipelineOrchestrator::new(context, HandlerTable::standard())
        .context("Failed to prepare workspace")
}

fn handle_list(config: &RepokilnConfig, formatter: &OutputFormatter) -> Result<i32> {
    let catalog = load_catalog(config)?;
    println!("{}", formatter.format_catalog(&catalog)?);
    Ok(0)
}

fn handle_status(
    config: &RepokilnConfig,
    repo_args: &RepoArgs,
    formatter: &OutputFormatter,
) -> Result<i32> {
    let catalog = load_catalog(config)?;
    let repo = catalog.get(&repo_args.repo_id)?;
    let layout = WorkspaceLayout::new(&config.workspace_root, repo.id.clone());
    let status = PipelineStatus::load(&StageStore::new(layout.state_dir()))?;
    println!("{}", formatter.format_status(&status)?);
    Ok(0)
}

async fn handle_stage(
    config: &RepokilnConfig,
    repo_args: &RepoArgs,
    stage: Stage,
    formatter: &OutputFormatter,
) -> Result<i32> {
    let orchestrator = orchestrator(config, repo_args)?;
    info!("Running {} through {}", repo_args.repo_id, stage);

    let result = orchestrator
        .run_until(stage)
        .await
        .with_context(|| format!("{} failed for {}", stage, repo_args.repo_id))?;
    println!("{}", formatter.format_result(&result)?);

    Ok(if result.is_failed() {
        EXIT_STAGE_FAILED
    } else {
        0
    })
}
