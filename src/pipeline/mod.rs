pub mod config;
pub mod context;
pub mod details;
pub mod error;
pub mod orchestrator;
pub mod phase_trait;
pub mod phases;
pub mod stage;
pub mod store;

pub use config::PipelineConfig;
pub use context::PipelineContext;
pub use details::{
    BuildDetails, BuildPlan, BuilderInputs, CommandRecord, DiscoverDetails, PackageDetails,
    PublishDetails, TestDetails,
};
pub use error::PipelineError;
pub use orchestrator::{PipelineOrchestrator, PipelineStatus};
pub use phase_trait::{HandlerTable, StageHandler};
pub use stage::{Stage, StageDetails, StageResult, StageStatus};
pub use store::{read_json, to_sorted_json, write_json, StageStore};
