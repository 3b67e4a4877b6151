use serde::{Deserialize, Serialize};

pub const DEFAULT_UNIT_NAME: &str = "io/quarkus/runner/AutoFeature";
pub const DEFAULT_APPLICATION_CLASS: &str = "io.quarkus.runner.ApplicationImpl";
pub const DEFAULT_REINITIALIZATION_ORIGINATOR: &str = "Quarkus";

/// Knobs of the generated unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SynthesisOptions {
    /// Internal (`/`-separated) name of the generated unit.
    pub unit_name: String,
    /// Root class referenced last by the entry point.
    pub application_class: String,
    /// Label passed with every rerun-initialization request.
    pub reinitialization_originator: String,
    /// Report failures caught inside worker routines instead of dropping them.
    pub log_worker_failures: bool,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        SynthesisOptions {
            unit_name: DEFAULT_UNIT_NAME.to_string(),
            application_class: DEFAULT_APPLICATION_CLASS.to_string(),
            reinitialization_originator: DEFAULT_REINITIALIZATION_ORIGINATOR.to_string(),
            log_worker_failures: false,
        }
    }
}

impl SynthesisOptions {
    pub fn with_unit_name(mut self, unit_name: &str) -> Self {
        self.unit_name = unit_name.to_string();
        self
    }

    pub fn with_application_class(mut self, application_class: &str) -> Self {
        self.application_class = application_class.to_string();
        self
    }

    pub fn with_worker_failure_logging(mut self, enabled: bool) -> Self {
        self.log_worker_failures = enabled;
        self
    }
}
