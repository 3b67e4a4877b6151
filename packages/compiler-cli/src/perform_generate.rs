//! Perform Generate
//!
//! The `generate`, `plan` and `inspect` commands.

use crate::config::NfcConfig;
use crate::manifest::{expand_patterns, load_manifests};
use crate::sink::DirectorySink;
use anyhow::Context;
use native_feature_compiler::validation::validate;
use native_feature_compiler::{
    deserialize, emit_listing, merge, BuildDeclarations, FeatureSynthesizer, Logger,
};
use std::fs;
use std::path::{Path, PathBuf};

pub const LISTING_EXTENSION: &str = "listing";

#[derive(Debug)]
pub struct GenerateResult {
    pub unit_name: String,
    pub artifact: PathBuf,
    pub listing: Option<PathBuf>,
    pub routine_count: usize,
}

/// Finds and loads every manifest the configuration names.
pub fn read_declarations(config: &NfcConfig, logger: &dyn Logger) -> anyhow::Result<BuildDeclarations> {
    let paths = expand_patterns(&config.manifest_patterns(), logger)?;
    logger.info(&format!("reading {} declaration manifests", paths.len()));
    load_manifests(&paths, logger)
}

/// Synthesizes the unit and writes it below the configured output directory,
/// optionally with its listing beside it.
pub fn perform_generate(
    config: &NfcConfig,
    logger: &dyn Logger,
    write_listing: bool,
) -> anyhow::Result<GenerateResult> {
    let decls = read_declarations(config, logger)?;
    let mut sink = DirectorySink::new(config.output_dir());
    let unit = FeatureSynthesizer::new(&config.synthesis, logger)
        .generate(&decls, &mut sink)
        .context("feature synthesis failed")?;
    let artifact = sink.artifact_path(&unit.name);
    logger.info(&format!("wrote {}", artifact.display()));

    let listing = if write_listing {
        let path = artifact.with_extension(LISTING_EXTENSION);
        fs::write(&path, emit_listing(&unit))
            .with_context(|| format!("failed to write listing `{}`", path.display()))?;
        logger.info(&format!("wrote {}", path.display()));
        Some(path)
    } else {
        None
    };

    Ok(GenerateResult {
        unit_name: unit.name.clone(),
        artifact,
        listing,
        routine_count: unit.routines.len(),
    })
}

/// The merged registration plan as pretty-printed JSON.
pub fn perform_plan(config: &NfcConfig, logger: &dyn Logger) -> anyhow::Result<String> {
    let decls = read_declarations(config, logger)?;
    validate(&decls).context("invalid declarations")?;
    let plan = merge(&decls);
    serde_json::to_string_pretty(&plan).context("failed to serialize the registration plan")
}

/// Listing of a previously generated artifact.
pub fn perform_inspect(artifact: &Path) -> anyhow::Result<String> {
    let bytes = fs::read(artifact)
        .with_context(|| format!("failed to read artifact `{}`", artifact.display()))?;
    let unit = deserialize(&bytes)
        .with_context(|| format!("`{}` is not a valid unit", artifact.display()))?;
    Ok(emit_listing(&unit))
}
