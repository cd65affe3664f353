use crate::pipeline::Stage;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Staged pipeline that turns source repositories into tested, reproducible images
#[derive(Parser, Debug)]
#[command(
    name = "repokiln",
    about = "Staged pipeline that turns source repositories into tested, reproducible images",
    version,
    author,
    long_about = "repokiln walks each catalog repository through discover, plan, build, test, \
                  package and publish. Every stage result is cached in the workspace, so \
                  re-running a command only executes stages that have not run yet."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        long,
        global = true,
        value_name = "FILE",
        help = "Repository catalog (overrides REPOKILN_CATALOG)"
    )]
    pub catalog: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_name = "DIR",
        help = "Workspace root (overrides REPOKILN_WORKSPACE)"
    )]
    pub workspace: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        global = true,
        value_enum,
        default_value = "json",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "List catalog repositories")]
    List,

    #[command(
        about = "Show cached stage status for a repository",
        long_about = "Prints the stored status of every stage that has run. Stages that \
                      have not run are omitted.\n\n\
                      Examples:\n  \
                      repokiln status --repo-id attrs"
    )]
    Status(RepoArgs),

    #[command(about = "Show effective configuration")]
    Config,

    #[command(about = "Clone the repository and probe its toolchain")]
    Discover(RepoArgs),

    #[command(about = "Select a build strategy (runs discover first)")]
    Plan(RepoArgs),

    #[command(about = "Install dependencies (runs earlier stages first)")]
    Build(RepoArgs),

    #[command(about = "Collect and run the test suite under coverage (runs earlier stages first)")]
    Test(RepoArgs),

    #[command(about = "Assemble the image manifest (runs earlier stages first)")]
    Package(RepoArgs),

    #[command(
        about = "Prepare the image for publishing (runs earlier stages first)",
        long_about = "Reports the image tag and manifest that would be pushed. Nothing is \
                      sent to a registry.\n\n\
                      Examples:\n  \
                      repokiln publish --repo-id attrs\n  \
                      repokiln --workspace /tmp/ws publish --repo-id attrs --format yaml"
    )]
    Publish(RepoArgs),
}

impl Commands {
    /// Target stage for the stage-running commands
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Commands::Discover(_) => Some(Stage::Discover),
            Commands::Plan(_) => Some(Stage::Plan),
            Commands::Build(_) => Some(Stage::Build),
            Commands::Test(_) => Some(Stage::Test),
            Commands::Package(_) => Some(Stage::Package),
            Commands::Publish(_) => Some(Stage::Publish),
            Commands::List | Commands::Status(_) | Commands::Config => None,
        }
    }

    pub fn repo_args(&self) -> Option<&RepoArgs> {
        match self {
            Commands::Status(args)
            | Commands::Discover(args)
            | Commands::Plan(args)
            | Commands::Build(args)
            | Commands::Test(args)
            | Commands::Package(args)
            | Commands::Publish(args) => Some(args),
            Commands::List | Commands::Config => None,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RepoArgs {
    #[arg(long, value_name = "ID", help = "Repository id from the catalog")]
    pub repo_id: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = CliArgs::parse_from(["repokiln", "list"]);
        assert!(matches!(args.command, Commands::List));
        assert_eq!(args.format, OutputFormatArg::Json);
        assert!(args.catalog.is_none());
        assert!(args.workspace.is_none());
        assert!(!args.verbose);
        assert!(!args.quiet);
    }

    #[test]
    fn test_stage_commands_map_to_stages() {
        let cases = [
            ("discover", Stage::Discover),
            ("plan", Stage::Plan),
            ("build", Stage::Build),
            ("test", Stage::Test),
            ("package", Stage::Package),
            ("publish", Stage::Publish),
        ];
        for (name, stage) in cases {
            let args = CliArgs::parse_from(["repokiln", name, "--repo-id", "attrs"]);
            assert_eq!(args.command.stage(), Some(stage));
            assert_eq!(args.command.repo_args().unwrap().repo_id, "attrs");
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = CliArgs::parse_from([
            "repokiln",
            "status",
            "--repo-id",
            "attrs",
            "--workspace",
            "/tmp/ws",
            "--format",
            "yaml",
            "-v",
        ]);
        assert_eq!(args.workspace, Some(PathBuf::from("/tmp/ws")));
        assert_eq!(args.format, OutputFormatArg::Yaml);
        assert!(args.verbose);
        assert!(args.command.stage().is_none());
    }

    #[test]
    fn test_repo_id_required() {
        assert!(CliArgs::try_parse_from(["repokiln", "build"]).is_err());
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(CliArgs::try_parse_from(["repokiln", "list", "-v", "-q"]).is_err());
    }
}
