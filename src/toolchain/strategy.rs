use super::ToolchainProbe;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a repository's dependencies get installed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildStrategy {
    /// Follow the repository's own CI workflow definitions
    #[serde(rename = "activ")]
    CiDriven,
    #[serde(rename = "poetry")]
    Poetry,
    #[serde(rename = "conda")]
    Conda,
    #[serde(rename = "pip")]
    Pip,
    #[serde(rename = "custom")]
    Custom,
}

impl BuildStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildStrategy::CiDriven => "activ",
            BuildStrategy::Poetry => "poetry",
            BuildStrategy::Conda => "conda",
            BuildStrategy::Pip => "pip",
            BuildStrategy::Custom => "custom",
        }
    }
}

impl fmt::Display for BuildStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick the install strategy for a probed checkout.
///
/// Precedence is fixed: CI workflows, then a poetry section, then a conda
/// environment file, then a plain requirements file, then custom.
pub fn select_strategy(probe: &ToolchainProbe) -> BuildStrategy {
    if !probe.ci_workflows.is_empty() {
        BuildStrategy::CiDriven
    } else if probe.poetry {
        BuildStrategy::Poetry
    } else if probe.environment_yml {
        BuildStrategy::Conda
    } else if probe.requirements {
        BuildStrategy::Pip
    } else {
        BuildStrategy::Custom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    fn probe(ci: bool, poetry: bool, conda: bool, pip: bool) -> ToolchainProbe {
        ToolchainProbe {
            pyproject: poetry,
            poetry,
            environment_yml: conda,
            requirements: pip,
            ci_workflows: if ci {
                vec![".github/workflows/ci.yml".to_string()]
            } else {
                Vec::new()
            },
            ..Default::default()
        }
    }

    #[parameterized(
        ci_beats_everything = { probe(true, true, true, true), BuildStrategy::CiDriven },
        ci_beats_poetry = { probe(true, true, false, false), BuildStrategy::CiDriven },
        poetry_beats_conda = { probe(false, true, true, true), BuildStrategy::Poetry },
        conda_beats_pip = { probe(false, false, true, true), BuildStrategy::Conda },
        pip_only = { probe(false, false, false, true), BuildStrategy::Pip },
        nothing = { probe(false, false, false, false), BuildStrategy::Custom },
    )]
    fn test_precedence(probe: ToolchainProbe, expected: BuildStrategy) {
        assert_eq!(select_strategy(&probe), expected);
    }

    #[test]
    fn test_hatch_alone_is_custom() {
        let probe = ToolchainProbe {
            pyproject: true,
            hatch: true,
            ..Default::default()
        };
        assert_eq!(select_strategy(&probe), BuildStrategy::Custom);
    }

    #[test]
    fn test_serialized_labels() {
        assert_eq!(
            serde_json::to_string(&BuildStrategy::CiDriven).unwrap(),
            "\"activ\""
        );
        let parsed: BuildStrategy = serde_json::from_str("\"conda\"").unwrap();
        assert_eq!(parsed, BuildStrategy::Conda);
        assert_eq!(BuildStrategy::Pip.to_string(), "pip");
    }
}
