use super::context::PipelineContext;
use super::error::PipelineError;
use super::phases::{
    build::BuildHandler, discover::DiscoverHandler, package::PackageHandler,
    plan::PlanHandler, publish::PublishHandler, test::TestHandler,
};
use super::stage::{Stage, StageResult};
use async_trait::async_trait;

/// Executes one stage.
///
/// Handlers check their own prerequisites by reading the predecessor's
/// cache; the engine only sequences them.
#[async_trait]
pub trait StageHandler: Send + Sync {
    fn stage(&self) -> Stage;

    async fn execute(&self, context: &PipelineContext) -> Result<StageResult, PipelineError>;
}

/// Stage-to-handler table handed to the orchestrator
pub struct HandlerTable {
    handlers: Vec<Box<dyn StageHandler>>,
}

impl HandlerTable {
    pub fn empty() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// The six production handlers
    pub fn standard() -> Self {
        Self::empty()
            .with(DiscoverHandler)
            .with(PlanHandler)
            .with(BuildHandler)
            .with(TestHandler)
            .with(PackageHandler)
            .with(PublishHandler)
    }

    /// Register `handler`, replacing any handler for the same stage
    pub fn with(mut self, handler: impl StageHandler + 'static) -> Self {
        let stage = handler.stage();
        self.handlers.retain(|h| h.stage() != stage);
        self.handlers.push(Box::new(handler));
        self
    }

    pub fn get(&self, stage: Stage) -> Option<&dyn StageHandler> {
        self.handlers
            .iter()
            .find(|h| h.stage() == stage)
            .map(|h| h.as_ref())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for HandlerTable {
    fn default() -> Self {
        Self::standard()
    }
}
