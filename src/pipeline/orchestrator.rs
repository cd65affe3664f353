use super::context::PipelineContext;
use super::error::PipelineError;
use super::phase_trait::HandlerTable;
use super::stage::{Stage, StageResult, StageStatus};
use super::store::StageStore;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Cached status of every stage that has run, in stage order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStatus(pub Vec<(Stage, StageStatus)>);

impl PipelineStatus {
    /// Read the cached stages from `store` without touching the workspace
    pub fn load(store: &StageStore) -> Result<Self, PipelineError> {
        let mut statuses = Vec::new();
        for stage in Stage::ordered() {
            if let Some(result) = store.load(stage)? {
                statuses.push((stage, result.status));
            }
        }
        Ok(Self(statuses))
    }

    pub fn get(&self, stage: Stage) -> Option<StageStatus> {
        self.0.iter().find(|(s, _)| *s == stage).map(|(_, st)| *st)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for PipelineStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (stage, status) in &self.0 {
            map.serialize_entry(stage.name(), status)?;
        }
        map.end()
    }
}

/// Runs stages for one repository, strictly in order, one at a time.
///
/// Each stage runs at most once per workspace: when its cache file exists
/// the cached result is returned and the handler is not invoked. Deleting
/// the cache file is the only way to re-run a stage.
pub struct PipelineOrchestrator {
    context: PipelineContext,
    handlers: HandlerTable,
}

impl PipelineOrchestrator {
    pub fn new(context: PipelineContext, handlers: HandlerTable) -> Result<Self, PipelineError> {
        context
            .layout
            .ensure()
            .map_err(|e| PipelineError::io(context.layout.root(), e))?;
        Ok(Self { context, handlers })
    }

    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    pub async fn run_stage(&self, stage: Stage) -> Result<StageResult, PipelineError> {
        if let Some(cached) = self.context.store.load(stage)? {
            debug!(
                "Stage {} already {} for {}, using cache",
                stage, cached.status, self.context.repo.id
            );
            return Ok(cached);
        }

        let handler = self
            .handlers
            .get(stage)
            .ok_or(PipelineError::NoHandler(stage))?;

        info!("Stage: {} ({})", stage, self.context.repo.id);
        let started = Instant::now();
        let result = handler.execute(&self.context).await?;
        let path = self.context.store.save(&result)?;

        match result.status {
            StageStatus::Failed => warn!(
                "Stage {} failed after {:.2}s, recorded in {}",
                stage,
                started.elapsed().as_secs_f64(),
                path.display()
            ),
            status => info!(
                "Stage {} {} in {:.2}s",
                stage,
                status,
                started.elapsed().as_secs_f64()
            ),
        }

        Ok(result)
    }

    /// Run every stage from the first up to and including `target`.
    ///
    /// A `failed` stage result does not stop the walk; an error does, and
    /// leaves earlier caches in place.
    pub async fn run_until(&self, target: Stage) -> Result<StageResult, PipelineError> {
        let mut last = None;
        for stage in Stage::ordered().take_while(|stage| *stage <= target) {
            last = Some(self.run_stage(stage).await?);
        }
        // Stage::ordered() always yields Discover first
        last.ok_or(PipelineError::NoHandler(target))
    }

    pub fn status(&self) -> Result<PipelineStatus, PipelineError> {
        PipelineStatus::load(&self.context.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RepositoryDescriptor;
    use crate::fs::MockFileSystem;
    use crate::pipeline::config::PipelineConfig;
    use crate::pipeline::details::PackageDetails;
    use crate::pipeline::phase_trait::StageHandler;
    use crate::pipeline::stage::StageDetails;
    use crate::process::MockCommandRunner;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct CountingHandler {
        stage: Stage,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl StageHandler for CountingHandler {
        fn stage(&self) -> Stage {
            self.stage
        }

        async fn execute(&self, _context: &PipelineContext) -> Result<StageResult, PipelineError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(StageResult::completed(StageDetails::Package(PackageDetails {
                manifest_path: format!("call-{}", n),
                artifact_count: n,
            })))
        }
    }

    fn orchestrator(temp: &TempDir, handlers: HandlerTable) -> PipelineOrchestrator {
        let context = PipelineContext::new(
            Arc::new(RepositoryDescriptor::new("demo", "https://example.com/demo.git")),
            temp.path(),
            Arc::new(MockFileSystem::new()),
            Arc::new(MockCommandRunner::new()),
            PipelineConfig::default(),
        );
        PipelineOrchestrator::new(context, handlers).unwrap()
    }

    #[tokio::test]
    async fn test_new_creates_workspace_regions() {
        let temp = TempDir::new().unwrap();
        let orchestrator = orchestrator(&temp, HandlerTable::empty());
        let layout = &orchestrator.context().layout;

        assert!(layout.checkout_dir().is_dir());
        assert!(layout.state_dir().is_dir());
        assert!(layout.artifacts_dir().is_dir());
        assert!(layout.logs_dir().is_dir());
    }

    #[tokio::test]
    async fn test_second_run_hits_cache() {
        let temp = TempDir::new().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let handlers = HandlerTable::empty().with(CountingHandler {
            stage: Stage::Package,
            calls: calls.clone(),
        });
        let orchestrator = orchestrator(&temp, handlers);

        let first = orchestrator.run_stage(Stage::Package).await.unwrap();
        let second = orchestrator.run_stage(Stage::Package).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_missing_handler() {
        let temp = TempDir::new().unwrap();
        let orchestrator = orchestrator(&temp, HandlerTable::empty());

        let err = orchestrator.run_stage(Stage::Plan).await.unwrap_err();
        assert!(matches!(err, PipelineError::NoHandler(Stage::Plan)));
    }

    #[tokio::test]
    async fn test_status_lists_only_cached_stages() {
        let temp = TempDir::new().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let handlers = HandlerTable::empty().with(CountingHandler {
            stage: Stage::Package,
            calls,
        });
        let orchestrator = orchestrator(&temp, handlers);

        assert!(orchestrator.status().unwrap().is_empty());
        orchestrator.run_stage(Stage::Package).await.unwrap();

        let status = orchestrator.status().unwrap();
        assert_eq!(status.0, vec![(Stage::Package, StageStatus::Completed)]);
        assert_eq!(status.get(Stage::Discover), None);
        assert_eq!(
            serde_json::to_string(&status).unwrap(),
            r#"{"package":"completed"}"#
        );
    }
}
