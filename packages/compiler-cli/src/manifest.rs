//! Declaration manifests.
//!
//! A manifest is a JSON file holding part of a `BuildDeclarations`. Several
//! contributors each write one; they are concatenated in discovery order.

use crate::error::CliError;
use anyhow::Context;
use indexmap::IndexSet;
use native_feature_compiler::{BuildDeclarations, Logger};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Expands `patterns` into manifest paths. Matches of one pattern come in
/// path order; a path matched twice is kept at its first position.
pub fn expand_patterns(patterns: &[String], logger: &dyn Logger) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = IndexSet::new();
    for pattern in patterns {
        let matches = glob::glob(pattern).map_err(|source| CliError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;
        let mut matched = 0;
        for entry in matches {
            let path = entry.with_context(|| format!("failed to read a match of `{}`", pattern))?;
            if path.is_file() {
                paths.insert(path);
                matched += 1;
            }
        }
        if matched == 0 {
            logger.warn(&format!("manifest pattern `{}` matched no files", pattern));
        }
    }
    Ok(paths.into_iter().collect())
}

pub fn load_manifest(path: &Path) -> anyhow::Result<BuildDeclarations> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest `{}`", path.display()))?;
    let decls = serde_json::from_str(&content).map_err(|source| CliError::ParseManifest {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(decls)
}

/// Parses every manifest in parallel, then concatenates them in `paths` order.
pub fn load_manifests(paths: &[PathBuf], logger: &dyn Logger) -> anyhow::Result<BuildDeclarations> {
    if paths.is_empty() {
        return Err(CliError::NoManifests.into());
    }
    let parsed = paths
        .par_iter()
        .map(|path| load_manifest(path))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut decls = BuildDeclarations::new();
    for (path, manifest) in paths.iter().zip(parsed) {
        logger.debug(&format!(
            "loaded {} declaration items from {}",
            manifest.item_count(),
            path.display()
        ));
        decls.extend(manifest);
    }
    Ok(decls)
}
