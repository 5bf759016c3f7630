//! Evaluation plans read from JSON.
use crate::params::AttackParams;
use crate::AdvFloat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Which attacks to run, in order, and how to post-process their output.
///
/// ```json
/// {
///   "attacks": [
///     {"attack": "fgsm", "eps": 0.03},
///     {"attack": "pgd_l2", "eps": 1.0, "rel_stepsize": 0.025, "steps": 50}
///   ],
///   "clip_l2": 1.0
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EvaluationConfig {
    pub attacks: Vec<AttackParams>,
    /// Project every adversarial batch onto this L2 budget around the clean
    /// batch.
    #[serde(default)]
    pub clip_l2: Option<AdvFloat>,
}

impl EvaluationConfig {
    /// # Errors
    /// `Parse` if the JSON is malformed or any attack's parameters are
    /// missing, unknown or mistyped.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses the plan at `path`.
    ///
    /// # Errors
    /// `Io` if the file cannot be read, otherwise as [`Self::from_json_str`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}
