//! knobs for a single search; the defaults are the fixed behavior of the tool
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, instrument};

use crate::corpora::{CodeRange, DEFAULT_END, DEFAULT_START, DEFAULT_WIDTH};
use crate::deciders::{RedirectDecider, DEFAULT_LOCATION_MARKER, DEFAULT_SUCCESS_STATUS};
use crate::error::SweepError;
use crate::mutators::{CodeFieldMutator, DEFAULT_FIELD};

/// number of attempts allowed in flight at once
pub const DEFAULT_WORKERS: usize = 50;

/// per-request timeout, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 2;

/// configuration of a search
///
/// any field missing from a json config file keeps its default
///
/// # Examples
///
/// ```
/// # use codesweep::config::SearchConfig;
/// # use codesweep::error::SweepError;
/// # fn main() -> Result<(), SweepError> {
/// let config: SearchConfig = serde_json::from_str(r#"{"workers": 10}"#)?;
///
/// assert_eq!(config.workers, 10);
/// assert_eq!(config.start, 1000);
/// assert_eq!(config.end, 9999);
/// config.validate()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// first candidate
    pub start: u32,

    /// last candidate (inclusive)
    pub end: u32,

    /// zero-padded width of each candidate
    pub width: usize,

    /// maximum number of attempts in flight at any given time
    pub workers: usize,

    /// per-request timeout, in seconds
    pub timeout_secs: u64,

    /// name of the form field holding the code
    pub field: String,

    /// status code that marks a hit
    pub success_status: u16,

    /// substring the `Location` header of a hit must contain
    pub location_marker: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            start: DEFAULT_START,
            end: DEFAULT_END,
            width: DEFAULT_WIDTH,
            workers: DEFAULT_WORKERS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            field: DEFAULT_FIELD.to_string(),
            success_status: DEFAULT_SUCCESS_STATUS,
            location_marker: DEFAULT_LOCATION_MARKER.to_string(),
        }
    }
}

impl SearchConfig {
    /// read a json configuration file
    ///
    /// # Errors
    ///
    /// fails if the file can't be opened or isn't valid json for a `SearchConfig`
    #[instrument(skip_all, level = "trace")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SweepError> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|source| {
            error!(?path, %source, "could not open configuration file");

            SweepError::ConfigFileOpenError {
                source,
                path: path.display().to_string(),
            }
        })?;

        let config = serde_json::from_reader(BufReader::new(file))?;

        Ok(config)
    }

    /// per-request timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// the candidate space described by `start`, `end` and `width`
    ///
    /// # Errors
    ///
    /// see [`CodeRange::new`]
    pub fn candidates(&self) -> Result<CodeRange, SweepError> {
        CodeRange::new(self.start, self.end, self.width)
    }

    /// the body mutator targeting `field`
    #[must_use]
    pub fn mutator(&self) -> CodeFieldMutator {
        CodeFieldMutator::new(&self.field)
    }

    /// the success predicate described by `success_status` and `location_marker`
    #[must_use]
    pub fn decider(&self) -> RedirectDecider {
        RedirectDecider::new(self.success_status, self.location_marker.clone())
    }

    /// sanity check every value
    ///
    /// # Errors
    ///
    /// returns [`SweepError::InvalidParameter`] for the first offending value
    pub fn validate(&self) -> Result<(), SweepError> {
        if self.workers == 0 {
            return Err(SweepError::InvalidParameter {
                param: self.workers.to_string(),
                message: "at least one worker is required",
            });
        }

        if self.timeout_secs == 0 {
            return Err(SweepError::InvalidParameter {
                param: self.timeout_secs.to_string(),
                message: "the per-request timeout must be at least one second",
            });
        }

        if self.field.is_empty() || self.field.contains(['=', '&']) {
            return Err(SweepError::InvalidParameter {
                param: self.field.clone(),
                message: "the code field must be a non-empty form field name",
            });
        }

        if !(100..=599).contains(&self.success_status) {
            return Err(SweepError::InvalidParameter {
                param: self.success_status.to_string(),
                message: "the success status must be a valid http status code",
            });
        }

        if self.location_marker.is_empty() {
            return Err(SweepError::InvalidParameter {
                param: self.location_marker.clone(),
                message: "the location marker can't be empty",
            });
        }

        self.candidates().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_the_fixed_constants() {
        let config = SearchConfig::default();

        assert_eq!(config.candidates().unwrap(), CodeRange::default());
        assert_eq!(config.workers, 50);
        assert_eq!(config.timeout(), Duration::from_secs(2));
        assert_eq!(config.decider(), RedirectDecider::default());
        assert_eq!(config.mutator(), CodeFieldMutator::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn nonsensical_values_are_rejected() {
        let invalid = [
            SearchConfig {
                workers: 0,
                ..SearchConfig::default()
            },
            SearchConfig {
                timeout_secs: 0,
                ..SearchConfig::default()
            },
            SearchConfig {
                field: String::new(),
                ..SearchConfig::default()
            },
            SearchConfig {
                field: "code=".to_string(),
                ..SearchConfig::default()
            },
            SearchConfig {
                success_status: 42,
                ..SearchConfig::default()
            },
            SearchConfig {
                location_marker: String::new(),
                ..SearchConfig::default()
            },
            SearchConfig {
                start: 5000,
                end: 4000,
                ..SearchConfig::default()
            },
        ];

        for config in invalid {
            assert!(
                matches!(config.validate(), Err(SweepError::InvalidParameter { .. })),
                "{config:?} should be invalid"
            );
        }
    }

    #[test]
    fn reads_partial_json_files() -> Result<(), Box<dyn std::error::Error>> {
        let path = std::env::temp_dir().join(format!("codesweep-config-{}.json", std::process::id()));

        let mut file = File::create(&path)?;
        file.write_all(br#"{"start": 0, "end": 999999, "width": 6, "field": "otp"}"#)?;
        drop(file);

        let config = SearchConfig::from_json_file(&path)?;
        std::fs::remove_file(&path)?;

        assert_eq!(config.candidates()?.len(), 1_000_000);
        assert_eq!(config.mutator().field(), "otp");
        assert_eq!(config.workers, DEFAULT_WORKERS);
        Ok(())
    }

    #[test]
    fn missing_config_file() {
        assert!(matches!(
            SearchConfig::from_json_file("/definitely/not/here.json"),
            Err(SweepError::ConfigFileOpenError { .. })
        ));
    }
}
