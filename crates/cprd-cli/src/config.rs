//! Study configuration.
//!
//! The study window lives in a small TOML file next to the delivery, e.g.:
//!
//! ```toml
//! earliest = "1900-01-01"
//! latest = "2023-06-01"
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

/// Study window bounds applied by date reconciliation.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StudyConfig {
    /// Dates strictly before this are nulled.
    pub earliest: NaiveDate,
    /// Events whose primary date lands after this are dropped.
    pub latest: NaiveDate,
}

impl StudyConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read study config: {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parse study config: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn study_config_parses_iso_dates() {
        let config: StudyConfig =
            toml::from_str("earliest = \"1900-01-01\"\nlatest = \"2023-06-01\"").unwrap();
        assert_eq!(config.earliest, NaiveDate::from_ymd_opt(1900, 1, 1).unwrap());
        assert_eq!(config.latest, NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
    }

    #[test]
    fn load_reports_the_path_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("study.toml");
        std::fs::write(&path, "earliest = \"1900-01-01\"\nlatest = \"2023-06-01\"").unwrap();
        assert!(StudyConfig::load(&path).is_ok());

        let missing = dir.path().join("absent.toml");
        let err = StudyConfig::load(&missing).unwrap_err();
        assert!(format!("{err}").contains("absent.toml"));
    }
}
