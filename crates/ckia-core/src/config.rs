//! Configuration structures for ckia

use crate::error::{CkiaError, Result};
use crate::traits::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for ckia
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Check selection
    #[serde(default)]
    pub checks: ChecksConfig,

    /// AWS provider settings
    #[serde(default)]
    pub aws: AwsConfig,
}

/// General configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Maximum number of checks running at once
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,

    /// Deadline for the whole run, in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Output format (json)
    #[serde(default = "default_output_format")]
    pub output_format: String,

    /// Write the report here instead of stdout
    #[serde(default)]
    pub out_file: Option<PathBuf>,

    /// Keep results that ran cleanly but found nothing
    #[serde(default)]
    pub include_empty: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            parallelism: default_parallelism(),
            timeout_secs: None,
            output_format: default_output_format(),
            out_file: None,
            include_empty: false,
        }
    }
}

fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(4)
}

fn default_output_format() -> String {
    "json".to_string()
}

/// Include/exclude filters, by check identifier
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChecksConfig {
    #[serde(default)]
    pub include: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,
}

/// AWS provider configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AwsConfig {
    /// Region to audit
    pub region: Option<String>,

    /// Account snapshot used as the provider connection
    pub snapshot: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        if path.extension().map(|e| e == "json").unwrap_or(false) {
            serde_json::from_str(&content).map_err(|e| CkiaError::Parse {
                context: path.display().to_string(),
                message: e.to_string(),
            })
        } else {
            // Assume YAML for other extensions
            serde_yaml::from_str(&content).map_err(|e| CkiaError::Parse {
                context: path.display().to_string(),
                message: e.to_string(),
            })
        }
    }

    /// Save configuration to a file
    pub fn to_file(&self, path: &std::path::Path) -> Result<()> {
        let content = if path.extension().map(|e| e == "json").unwrap_or(false) {
            serde_json::to_string_pretty(self)?
        } else {
            serde_yaml::to_string(self).map_err(|e| CkiaError::Serialization(e.to_string()))?
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings that cannot produce a run
    pub fn validate(&self) -> Result<OutputFormat> {
        if self.general.parallelism == 0 {
            return Err(CkiaError::Config("parallelism must be at least 1".into()));
        }
        for id in self.checks.include.iter().chain(&self.checks.exclude) {
            if id.trim().is_empty() {
                return Err(CkiaError::Config("empty check identifier in filter".into()));
            }
        }
        self.general.output_format.parse()
    }

    pub fn timeout(&self) -> Option<std::time::Duration> {
        self.general.timeout_secs.map(std::time::Duration::from_secs)
    }
}
