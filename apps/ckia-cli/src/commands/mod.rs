//! CLI command implementations

pub mod aws;
pub mod check;
pub mod list;

use ckia_core::{CkiaError, Config};
use std::path::Path;

/// Load the configuration file if one was given, defaults otherwise
pub fn load_config(path: Option<&Path>) -> Result<Config, CkiaError> {
    match path {
        Some(path) => Config::from_file(path).map_err(|e| match e {
            CkiaError::Io(io) => {
                CkiaError::Config(format!("cannot read {}: {}", path.display(), io))
            }
            other => other,
        }),
        None => Ok(Config::default()),
    }
}
