//! Import configuration: source URLs and pipeline options

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ImportError, Result};
use crate::model::RecordKind;

const BASE_URL: &str = "https://www.nsi.bg/nrnm/ekatte";

pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Keeps a four-column chunk under SQLite's 32766 bound parameters
pub const MAX_BATCH_SIZE: usize = 8000;

/// Base URLs of the four source datasets. `/json` is appended on fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUrls {
    pub regions: String,
    pub municipalities: String,
    pub town_halls: String,
    pub territorial_units: String,
}

impl Default for SourceUrls {
    fn default() -> Self {
        Self {
            regions: format!("{}/regions", BASE_URL),
            municipalities: format!("{}/municipalities", BASE_URL),
            town_halls: format!("{}/town-halls", BASE_URL),
            territorial_units: format!("{}/territorial-units", BASE_URL),
        }
    }
}

impl SourceUrls {
    pub fn url_for(&self, kind: RecordKind) -> &str {
        match kind {
            RecordKind::Region => &self.regions,
            RecordKind::Municipality => &self.municipalities,
            RecordKind::TownHall => &self.town_halls,
            RecordKind::TerritorialUnit => &self.territorial_units,
        }
    }
}

/// What to do when a synthesized town hall has no matching municipality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MissingTownHallPolicy {
    /// Name the town hall after the territorial unit that references it
    #[default]
    Fallback,
    /// Abort the import
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    pub batch_size: usize,
    pub missing_town_hall: MissingTownHallPolicy,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            missing_town_hall: MissingTownHallPolicy::default(),
        }
    }
}

impl ImportOptions {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(ImportError::InvalidOptions(format!(
                "batch size must be between 1 and {}, got {}",
                MAX_BATCH_SIZE, self.batch_size
            )));
        }
        Ok(())
    }
}

/// Contents of `urls.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(flatten)]
    pub sources: SourceUrls,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub missing_town_hall: MissingTownHallPolicy,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            sources: SourceUrls::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            missing_town_hall: MissingTownHallPolicy::default(),
        }
    }
}

impl ImportConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|e| ImportError::Config {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
    }

    /// Load `path` if given, otherwise use the public NSI endpoints
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn options(&self) -> ImportOptions {
        ImportOptions {
            batch_size: self.batch_size,
            missing_town_hall: self.missing_town_hall,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_file_without_options_uses_defaults() {
        let config: ImportConfig = serde_json::from_str(
            r#"{
                "regions": "https://example.org/regions",
                "municipalities": "https://example.org/municipalities",
                "town_halls": "https://example.org/town-halls",
                "territorial_units": "https://example.org/territorial-units"
            }"#,
        )
        .unwrap();
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.missing_town_hall, MissingTownHallPolicy::Fallback);
        assert_eq!(
            config.sources.url_for(RecordKind::TownHall),
            "https://example.org/town-halls"
        );
    }

    #[test]
    fn test_options_are_read_from_file() {
        let config: ImportConfig = serde_json::from_str(
            r#"{
                "regions": "r", "municipalities": "m",
                "town_halls": "t", "territorial_units": "u",
                "batch_size": 100, "missing_town_hall": "fail"
            }"#,
        )
        .unwrap();
        assert_eq!(
            config.options(),
            ImportOptions {
                batch_size: 100,
                missing_town_hall: MissingTownHallPolicy::Fail
            }
        );
    }

    #[test]
    fn test_missing_url_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.json");
        std::fs::write(&path, r#"{"regions": "r"}"#).unwrap();
        assert!(matches!(
            ImportConfig::load(&path),
            Err(ImportError::Config { .. })
        ));
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let options = ImportOptions {
            batch_size: 0,
            ..ImportOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(ImportError::InvalidOptions(_))
        ));

        let options = ImportOptions {
            batch_size: MAX_BATCH_SIZE + 1,
            ..ImportOptions::default()
        };
        assert!(options.validate().is_err());
        assert!(ImportOptions::default().validate().is_ok());
    }
}
