//! Artifact sinks receive generated units as named binary blobs.

use indexmap::IndexMap;
use std::io;

pub trait ArtifactSink {
    fn write(&mut self, name: &str, bytes: &[u8]) -> io::Result<()>;
}

/// Keeps artifacts in memory, in write order. A second write under the same
/// name replaces the first.
#[derive(Debug, Default)]
pub struct MemorySink {
    artifacts: IndexMap<String, Vec<u8>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.artifacts.get(name).map(Vec::as_slice)
    }

    pub fn names(&self) -> Vec<&str> {
        self.artifacts.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

impl ArtifactSink for MemorySink {
    fn write(&mut self, name: &str, bytes: &[u8]) -> io::Result<()> {
        self.artifacts.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}
