//! Engine configuration.
//!
//! Every field has a default, so a JSON file only needs the keys it wants
//! to change:
//!
//! ```json
//! { "descriptor": "overview", "shortlist_factor": 3, "model": { "factors": 50 } }
//! ```

use crate::error::{EngineError, Result};
use data_loader::{DescriptorField, RatingScale};
use predictor::MfConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// CSV column used as the item descriptor
    pub descriptor: DescriptorField,
    /// Result count when the caller does not pass one
    pub default_limit: usize,
    /// Valid range for ingested ratings
    pub rating_scale: RatingScale,
    /// Hybrid shortlist size as a multiple of the requested count
    pub shortlist_factor: usize,
    /// Rating model hyper-parameters
    pub model: MfConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            descriptor: DescriptorField::Genres,
            default_limit: 10,
            rating_scale: RatingScale::default(),
            shortlist_factor: 1,
            model: MfConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Read a JSON configuration file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| EngineError::Config {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json_str(&raw).map_err(|e| match e {
            EngineError::Config { reason, .. } => EngineError::Config {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw).map_err(|e| EngineError::Config {
            path: "<inline>".to_string(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(self.rating_scale.min.is_finite()
            && self.rating_scale.max.is_finite()
            && self.rating_scale.min < self.rating_scale.max)
        {
            return Err(EngineError::Config {
                path: "<inline>".to_string(),
                reason: format!(
                    "rating_scale min ({}) must be below max ({})",
                    self.rating_scale.min, self.rating_scale.max
                ),
            });
        }
        Ok(())
    }

    pub fn with_descriptor(mut self, descriptor: DescriptorField) -> Self {
        self.descriptor = descriptor;
        self
    }

    pub fn with_shortlist_factor(mut self, factor: usize) -> Self {
        self.shortlist_factor = factor;
        self
    }

    pub fn with_model(mut self, model: MfConfig) -> Self {
        self.model = model;
        self
    }

    pub fn with_rating_scale(mut self, scale: RatingScale) -> Self {
        self.rating_scale = scale;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{"descriptor": "overview", "model": {"factors": 8, "epochs": 3}}"#,
        )
        .unwrap();

        assert_eq!(config.descriptor, DescriptorField::Overview);
        assert_eq!(config.model.factors, 8);
        assert_eq!(config.model.epochs, 3);
        assert_eq!(config.model.learning_rate, MfConfig::default().learning_rate);
        assert_eq!(config.default_limit, 10);
        assert_eq!(config.shortlist_factor, 1);
    }

    #[test]
    fn test_invalid_scale_rejected() {
        let err = EngineConfig::from_json_str(r#"{"rating_scale": {"min": 5.0, "max": 1.0}}"#)
            .unwrap_err();
        assert!(matches!(err, EngineError::Config { .. }));
    }

    #[test]
    fn test_bad_json_rejected() {
        assert!(EngineConfig::from_json_str("{ not json").is_err());
    }

    #[test]
    fn test_from_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"default_limit": "ten"}"#).unwrap();

        match EngineConfig::from_json_file(file.path()).unwrap_err() {
            EngineError::Config { path, .. } => {
                assert_eq!(path, file.path().display().to_string())
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_round_trip_default() {
        let json = serde_json::to_string(&EngineConfig::default()).unwrap();
        assert_eq!(EngineConfig::from_json_str(&json).unwrap(), EngineConfig::default());
    }
}
