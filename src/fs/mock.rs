use super::{DirEntry, FileSystem, FileType};
use anyhow::{bail, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
enum Node {
    Dir,
    File(String),
}

/// In-memory checkout for probe and install-command tests.
///
/// Relative paths are resolved against [`MockFileSystem::root`]; adding a
/// file creates its parent directories.
#[derive(Debug)]
pub struct MockFileSystem {
    root: PathBuf,
    nodes: Mutex<BTreeMap<PathBuf, Node>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_root(PathBuf::from("/mock"))
    }

    pub fn with_root(root: PathBuf) -> Self {
        let mock = Self {
            root,
            nodes: Mutex::new(BTreeMap::new()),
        };
        mock.add_dir(mock.root.clone());
        mock
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        let path = self.resolve(path.as_ref());
        let mut nodes = self.lock();
        if let Some(parent) = path.parent() {
            Self::mkdirs(&mut nodes, parent);
        }
        nodes.insert(path, Node::File(content.to_string()));
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = self.resolve(path.as_ref());
        Self::mkdirs(&mut self.lock(), &path);
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Node>> {
        self.nodes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    fn mkdirs(nodes: &mut BTreeMap<PathBuf, Node>, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            nodes.entry(ancestor.to_path_buf()).or_insert(Node::Dir);
        }
    }

    fn node(&self, path: &Path) -> Option<Node> {
        self.lock().get(&self.resolve(path)).cloned()
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.node(path).is_some()
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.node(path), Some(Node::Dir))
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.node(path), Some(Node::File(_)))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        match self.node(path) {
            Some(Node::File(content)) => Ok(content),
            Some(Node::Dir) => bail!("{} is a directory", path.display()),
            None => bail!("{} does not exist", path.display()),
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let dir = self.resolve(path);
        let nodes = self.lock();
        if !matches!(nodes.get(&dir), Some(Node::Dir)) {
            bail!("{} is not a directory", dir.display());
        }

        Ok(nodes
            .iter()
            .filter(|(child, _)| child.parent() == Some(dir.as_path()))
            .map(|(child, node)| DirEntry {
                path: child.clone(),
                name: child
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                file_type: match node {
                    Node::Dir => FileType::Directory,
                    Node::File(_) => FileType::File,
                },
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_create_parents() {
        let mock = MockFileSystem::new();
        mock.add_file("requirements/dev.txt", "black\n");

        assert!(mock.is_dir(Path::new("/mock/requirements")));
        assert!(mock.is_file(Path::new("/mock/requirements/dev.txt")));
        assert!(mock.is_file(Path::new("requirements/dev.txt")));
    }

    #[test]
    fn test_read_to_string() {
        let mock = MockFileSystem::new();
        mock.add_file("pyproject.toml", "[project]\n");

        assert_eq!(
            mock.read_to_string(Path::new("pyproject.toml")).unwrap(),
            "[project]\n"
        );
        assert!(mock.read_to_string(Path::new("/mock")).is_err());
        assert!(mock.read_to_string(Path::new("setup.py")).is_err());
    }

    #[test]
    fn test_read_dir_lists_only_children() {
        let mock = MockFileSystem::new();
        mock.add_file(".github/workflows/ci.yml", "");
        mock.add_file(".github/workflows/nested/skip.yml", "");

        let entries = mock.read_dir(Path::new(".github/workflows")).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.file_name()).collect();

        assert_eq!(names, vec!["ci.yml", "nested"]);
        assert!(entries[0].is_file());
        assert!(mock.read_dir(Path::new(".github/workflows/ci.yml")).is_err());
    }

    #[test]
    fn test_custom_root() {
        let mock = MockFileSystem::with_root(PathBuf::from("/repo"));
        mock.add_file("setup.py", "");

        assert!(mock.exists(Path::new("/repo")));
        assert!(mock.exists(Path::new("/repo/setup.py")));
        assert!(!mock.exists(Path::new("/mock/setup.py")));
        assert_eq!(mock.root(), Path::new("/repo"));
    }
}
