//! Writes artifacts below an output directory.

use native_feature_compiler::ArtifactSink;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const UNIT_EXTENSION: &str = "nfu";

/// Stores each artifact at `<root>/<name>.nfu`; `/` in names become
/// directories.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectorySink {
            root: root.into(),
            written: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.{}", name, UNIT_EXTENSION))
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl ArtifactSink for DirectorySink {
    fn write(&mut self, name: &str, bytes: &[u8]) -> io::Result<()> {
        let path = self.artifact_path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        self.written.push(path);
        Ok(())
    }
}
