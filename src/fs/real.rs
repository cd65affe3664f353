use super::{DirEntry, FileSystem, FileType};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Direct view of a checkout on disk
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

fn classify(entry: &fs::DirEntry) -> FileType {
    match entry.file_type() {
        Ok(kind) if kind.is_symlink() => FileType::Symlink,
        Ok(kind) if kind.is_dir() => FileType::Directory,
        _ => FileType::File,
    }
}

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        fs::read_dir(path)
            .with_context(|| format!("Cannot list {}", path.display()))?
            .map(|entry| {
                let entry = entry.with_context(|| format!("Cannot list {}", path.display()))?;
                Ok(DirEntry {
                    name: entry.file_name().to_string_lossy().into_owned(),
                    file_type: classify(&entry),
                    path: entry.path(),
                })
            })
            .collect()
    }
}
