//! Stages, their durable results and typed per-stage details

use super::details::{
    BuildDetails, BuildPlan, DiscoverDetails, PackageDetails, PublishDetails, TestDetails,
};
use serde::de;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Pipeline stages in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Discover,
    Plan,
    Build,
    Test,
    Package,
    Publish,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Discover,
        Stage::Plan,
        Stage::Build,
        Stage::Test,
        Stage::Package,
        Stage::Publish,
    ];

    pub fn ordered() -> impl Iterator<Item = Stage> {
        Self::ALL.into_iter()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Discover => "discover",
            Stage::Plan => "plan",
            Stage::Build => "build",
            Stage::Test => "test",
            Stage::Package => "package",
            Stage::Publish => "publish",
        }
    }

    pub fn cache_file_name(&self) -> String {
        format!("{}.json", self.name())
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ordered()
            .find(|stage| stage.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown stage: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Completed,
    Failed,
    Pending,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StageStatus::Completed => "completed",
            StageStatus::Failed => "failed",
            StageStatus::Pending => "pending",
        })
    }
}

/// Stage-specific payload of a [`StageResult`]
#[derive(Debug, Clone, PartialEq)]
pub enum StageDetails {
    Discover(DiscoverDetails),
    Plan(BuildPlan),
    Build(BuildDetails),
    Test(TestDetails),
    Package(PackageDetails),
    Publish(PublishDetails),
}

impl StageDetails {
    pub fn stage(&self) -> Stage {
        match self {
            StageDetails::Discover(_) => Stage::Discover,
            StageDetails::Plan(_) => Stage::Plan,
            StageDetails::Build(_) => Stage::Build,
            StageDetails::Test(_) => Stage::Test,
            StageDetails::Package(_) => Stage::Package,
            StageDetails::Publish(_) => Stage::Publish,
        }
    }

    fn decode(stage: Stage, details: serde_json::Value) -> Result<Self, serde_json::Error> {
        Ok(match stage {
            Stage::Discover => StageDetails::Discover(serde_json::from_value(details)?),
            Stage::Plan => StageDetails::Plan(serde_json::from_value(details)?),
            Stage::Build => StageDetails::Build(serde_json::from_value(details)?),
            Stage::Test => StageDetails::Test(serde_json::from_value(details)?),
            Stage::Package => StageDetails::Package(serde_json::from_value(details)?),
            Stage::Publish => StageDetails::Publish(serde_json::from_value(details)?),
        })
    }
}

impl Serialize for StageDetails {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StageDetails::Discover(d) => d.serialize(serializer),
            StageDetails::Plan(d) => d.serialize(serializer),
            StageDetails::Build(d) => d.serialize(serializer),
            StageDetails::Test(d) => d.serialize(serializer),
            StageDetails::Package(d) => d.serialize(serializer),
            StageDetails::Publish(d) => d.serialize(serializer),
        }
    }
}

#[derive(Deserialize)]
struct RawStageResult {
    stage: Stage,
    status: StageStatus,
    #[serde(default)]
    details: serde_json::Value,
}

/// Durable outcome of one stage, stored as `{stage, status, details}`.
///
/// The stage name is derived from the details variant, so the envelope and
/// its payload cannot disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct StageResult {
    pub status: StageStatus,
    pub details: StageDetails,
}

impl<'de> Deserialize<'de> for StageResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawStageResult::deserialize(deserializer)?;
        let details = StageDetails::decode(raw.stage, raw.details).map_err(de::Error::custom)?;
        Ok(Self {
            status: raw.status,
            details,
        })
    }
}

impl Serialize for StageResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("StageResult", 3)?;
        state.serialize_field("stage", &self.stage())?;
        state.serialize_field("status", &self.status)?;
        state.serialize_field("details", &self.details)?;
        state.end()
    }
}

impl StageResult {
    pub fn new(status: StageStatus, details: StageDetails) -> Self {
        Self { status, details }
    }

    pub fn completed(details: StageDetails) -> Self {
        Self::new(StageStatus::Completed, details)
    }

    pub fn failed(details: StageDetails) -> Self {
        Self::new(StageStatus::Failed, details)
    }

    pub fn stage(&self) -> Stage {
        self.details.stage()
    }

    pub fn is_failed(&self) -> bool {
        self.status == StageStatus::Failed
    }

    pub fn discover(&self) -> Option<&DiscoverDetails> {
        match &self.details {
            StageDetails::Discover(d) => Some(d),
            _ => None,
        }
    }

    pub fn plan(&self) -> Option<&BuildPlan> {
        match &self.details {
            StageDetails::Plan(d) => Some(d),
            _ => None,
        }
    }

    pub fn build(&self) -> Option<&BuildDetails> {
        match &self.details {
            StageDetails::Build(d) => Some(d),
            _ => None,
        }
    }

    pub fn test(&self) -> Option<&TestDetails> {
        match &self.details {
            StageDetails::Test(d) => Some(d),
            _ => None,
        }
    }

    pub fn package(&self) -> Option<&PackageDetails> {
        match &self.details {
            StageDetails::Package(d) => Some(d),
            _ => None,
        }
    }

    pub fn publish(&self) -> Option<&PublishDetails> {
        match &self.details {
            StageDetails::Publish(d) => Some(d),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_is_fixed() {
        let names: Vec<&str> = Stage::ordered().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec!["discover", "plan", "build", "test", "package", "publish"]
        );
        assert!(Stage::Build < Stage::Test);
    }

    #[test]
    fn test_cache_file_name() {
        assert_eq!(Stage::Package.cache_file_name(), "package.json");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("TEST".parse::<Stage>().unwrap(), Stage::Test);
        assert!("deploy".parse::<Stage>().is_err());
    }

    #[test]
    fn test_envelope_shape() {
        let result = StageResult::new(
            StageStatus::Pending,
            StageDetails::Publish(PublishDetails {
                manifest_path: "/ws/artifacts/demo/repo_image_manifest.json".to_string(),
                image_tag: "ghcr.io/repokiln/demo:main".to_string(),
                pushed: false,
            }),
        );

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "stage": "publish",
                "status": "pending",
                "details": {
                    "manifest_path": "/ws/artifacts/demo/repo_image_manifest.json",
                    "image_tag": "ghcr.io/repokiln/demo:main",
                    "pushed": false
                }
            })
        );

        let back: StageResult = serde_json::from_value(value).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_details_checked_against_stage() {
        let raw = json!({
            "stage": "package",
            "status": "completed",
            "details": {"image_tag": "x"}
        });
        assert!(serde_json::from_value::<StageResult>(raw).is_err());
    }

    #[test]
    fn test_unknown_status_rejected() {
        let raw = json!({
            "stage": "package",
            "status": "exploded",
            "details": {"manifest_path": "m", "artifact_count": 0}
        });
        assert!(serde_json::from_value::<StageResult>(raw).is_err());
    }
}
