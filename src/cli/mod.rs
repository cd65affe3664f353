pub mod commands;
pub mod output;

pub use commands::{CliArgs, Commands, OutputFormatArg, RepoArgs};
pub use output::{OutputFormat, OutputFormatter};
