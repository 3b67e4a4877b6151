//! `nfc.json` configuration.

use crate::error::CliError;
use native_feature_compiler::{LogLevel, SynthesisOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "nfc.json";
pub const DEFAULT_OUTPUT_DIR: &str = "target/native-features";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NfcConfig {
    pub synthesis: SynthesisOptions,
    /// Glob patterns of declaration manifests, relative to the config file.
    pub manifests: Vec<String>,
    pub output_dir: Option<PathBuf>,
    pub log_level: LogLevel,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl NfcConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| CliError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: NfcConfig =
            serde_json::from_str(&content).map_err(|source| CliError::ParseConfig {
                path: path.to_path_buf(),
                source,
            })?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(config)
    }

    /// `nfc.json` in `dir`, if present.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        let candidate = dir.join(CONFIG_FILE_NAME);
        candidate.is_file().then_some(candidate)
    }

    /// Manifest patterns with relative ones anchored at `base_dir`.
    pub fn manifest_patterns(&self) -> Vec<String> {
        self.manifests
            .iter()
            .map(|pattern| self.resolve(Path::new(pattern)).to_string_lossy().into_owned())
            .collect()
    }

    pub fn output_dir(&self) -> PathBuf {
        let dir = self
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
        self.resolve(&dir)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() || self.base_dir.as_os_str().is_empty() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}
