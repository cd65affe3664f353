use super::{load_pyproject, PYPROJECT};
use crate::fs::FileSystem;
use std::collections::BTreeSet;
use std::path::Path;

/// Conventional requirement files, in install order
pub const REQUIREMENT_FILES: &[&str] = &[
    "requirements.txt",
    "requirements-dev.txt",
    "requirements-test.txt",
    "requirements/tests.txt",
    "requirements/dev.txt",
    "requirements/test.txt",
    "requirements/ci.txt",
];

const PROJECT_MANIFESTS: &[&str] = &["setup.py", "setup.cfg", PYPROJECT];

/// Optional-dependency group names that pull in test tooling
pub const EXTRA_GROUPS: &[&str] = &["dev", "test", "tests", "ci"];

const PIP: &[&str] = &["python", "-m", "pip", "install"];

fn pip_install<'a>(args: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut argv: Vec<String> = PIP.iter().map(|s| s.to_string()).collect();
    argv.extend(args.into_iter().map(String::from));
    argv
}

/// Extras to request on the editable self-install: `[project.optional-dependencies]`
/// groups plus non-empty `[tool.poetry.group.<name>.dependencies]` tables whose
/// name is in [`EXTRA_GROUPS`]. Sorted and deduplicated.
pub fn infer_project_extras(fs: &dyn FileSystem, repo_dir: &Path) -> Vec<String> {
    let manifest = load_pyproject(fs, repo_dir);
    let mut extras = BTreeSet::new();

    if let Some(optional) = manifest
        .get("project")
        .and_then(|p| p.get("optional-dependencies"))
        .and_then(|o| o.as_table())
    {
        for group in EXTRA_GROUPS {
            if optional.contains_key(*group) {
                extras.insert(group.to_string());
            }
        }
    }

    if let Some(groups) = manifest
        .get("tool")
        .and_then(|t| t.get("poetry"))
        .and_then(|p| p.get("group"))
        .and_then(|g| g.as_table())
    {
        for group in EXTRA_GROUPS {
            let has_deps = groups
                .get(*group)
                .and_then(|g| g.get("dependencies"))
                .and_then(|d| d.as_table())
                .map(|d| !d.is_empty())
                .unwrap_or(false);
            if has_deps {
                extras.insert(group.to_string());
            }
        }
    }

    extras.into_iter().collect()
}

/// Install commands for a checkout, in the order they must run:
/// requirement files, the editable self-install, then the test tooling.
pub fn build_install_commands(fs: &dyn FileSystem, repo_dir: &Path) -> Vec<Vec<String>> {
    let mut commands: Vec<Vec<String>> = REQUIREMENT_FILES
        .iter()
        .filter(|rel| fs.is_file(&repo_dir.join(rel)))
        .map(|rel| pip_install(["-r", *rel]))
        .collect();

    if PROJECT_MANIFESTS
        .iter()
        .any(|manifest| fs.is_file(&repo_dir.join(manifest)))
    {
        let extras = infer_project_extras(fs, repo_dir);
        let target = if extras.is_empty() {
            ".".to_string()
        } else {
            format!(".[{}]", extras.join(","))
        };
        commands.push(pip_install(["-e", target.as_str()]));
    }

    commands.push(pip_install(["pytest", "coverage"]));
    commands
}
