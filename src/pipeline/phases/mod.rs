// Stage handlers, one file per stage in execution order.
//
// Each handler reads its predecessor's cached result, does its work through
// the injected command runner and file system, and returns a StageResult for
// the orchestrator to persist.

#[path = "01_discover.rs"]
pub mod discover;
#[path = "02_plan.rs"]
pub mod plan;
#[path = "03_build.rs"]
pub mod build;
#[path = "04_test.rs"]
pub mod test;
#[path = "05_package.rs"]
pub mod package;
#[path = "06_publish.rs"]
pub mod publish;
