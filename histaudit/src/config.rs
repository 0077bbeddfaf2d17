//! Configuration for the audit pipelines.
//!
//! Everything the pipelines need from their environment (where blocks live,
//! where reports go, which endpoint and tenant to query, how far back to
//! look) is passed in through a [`Config`] rather than baked in.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::{Error, Result};

/// Root configuration, typically loaded from a YAML file.
///
/// # Example
///
/// ```yaml
/// block_directory: /var/lib/prometheus/13611
/// output:
///   int_histogram: inthist.out
///   float_histogram: floathist.out
/// remote_read:
///   endpoint: http://localhost:8080/prometheus/api/v1/read
///   tenant_id: "10428"
/// lookback:
///   newest_hours_ago: 14
///   oldest_hours_ago: 23
/// bases_path: histogram_bases.out
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the storage blocks to audit.
    pub block_directory: PathBuf,

    /// Where chunk reports are written, one file per histogram encoding.
    pub output: OutputPaths,

    /// Remote read endpoint used by the divergence detector.
    pub remote_read: RemoteReadConfig,

    /// Which hours before now the divergence detector searches.
    pub lookback: LookbackBand,

    /// File listing the histogram bases to check, one per line.
    pub bases_path: Option<PathBuf>,

    /// Emit a progress line every this many blocks. Zero disables progress
    /// lines.
    pub progress_interval: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            block_directory: PathBuf::from("data"),
            output: OutputPaths::default(),
            remote_read: RemoteReadConfig::default(),
            lookback: LookbackBand::default(),
            bases_path: None,
            progress_interval: 100,
        }
    }
}

impl Config {
    /// Load and validate configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "failed to read config file {}: {e}",
                path.as_ref().display()
            ))
        })?;

        Self::from_yaml(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(contents)
            .map_err(|e| Error::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.output.int_histogram == self.output.float_histogram {
            return Err(Error::Config(
                "integer and float histogram reports must go to different files".into(),
            ));
        }
        self.lookback.validate()
    }
}

/// Report destinations, one per native histogram encoding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputPaths {
    pub int_histogram: PathBuf,
    pub float_histogram: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            int_histogram: PathBuf::from("inthist.out"),
            float_histogram: PathBuf::from("floathist.out"),
        }
    }
}

/// Settings for the remote read client.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteReadConfig {
    pub endpoint: String,

    /// Sent as the `x-scope-orgid` header on every request.
    pub tenant_id: String,

    pub timeout_secs: u64,

    /// Upper bound on the size of a single streamed response frame.
    pub chunked_read_limit: u64,
}

impl Default for RemoteReadConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080/prometheus/api/v1/read".to_string(),
            tenant_id: String::new(),
            timeout_secs: 300,
            chunked_read_limit: 50_000_000,
        }
    }
}

impl RemoteReadConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Headers to attach to every read request.
    pub fn headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        if !self.tenant_id.is_empty() {
            headers.insert("x-scope-orgid".to_string(), self.tenant_id.clone());
        }
        headers
    }
}

/// A band of whole hours before the current hour, given as how many hours
/// ago its newest and oldest windows start. Both ends are inclusive.
///
/// The default band (14 to 23 hours ago) keeps well clear of data that is
/// still being ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LookbackBand {
    pub newest_hours_ago: u32,
    pub oldest_hours_ago: u32,
}

impl Default for LookbackBand {
    fn default() -> Self {
        Self {
            newest_hours_ago: 14,
            oldest_hours_ago: 23,
        }
    }
}

impl LookbackBand {
    pub fn validate(&self) -> Result<()> {
        if self.newest_hours_ago > self.oldest_hours_ago {
            return Err(Error::Config(format!(
                "lookback band is inverted: newest {}h > oldest {}h",
                self.newest_hours_ago, self.oldest_hours_ago
            )));
        }
        Ok(())
    }

    /// Number of one-hour windows in the band.
    pub fn len(&self) -> usize {
        (self.oldest_hours_ago.saturating_sub(self.newest_hours_ago) + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.newest_hours_ago > self.oldest_hours_ago
    }
}

/// Reads histogram bases, one per line. Blank lines are skipped and
/// surrounding whitespace is trimmed.
pub fn read_histogram_bases<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("failed to read histogram bases {}: {e}", path.display()),
        )
    })?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}
