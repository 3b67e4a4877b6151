//! Version Information

use once_cell::sync::Lazy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub full: String,
    pub major: String,
    pub minor: String,
    pub patch: String,
}

impl Version {
    pub fn new(full: &str) -> Self {
        let mut parts = full.split('.');
        let mut next = || parts.next().unwrap_or("0").to_string();
        let major = next();
        let minor = next();
        let patch = next();
        Version {
            full: full.to_string(),
            major,
            minor,
            patch,
        }
    }
}

/// Version of this crate, as stamped into tool output.
pub static VERSION: Lazy<Version> = Lazy::new(|| Version::new(env!("CARGO_PKG_VERSION")));
