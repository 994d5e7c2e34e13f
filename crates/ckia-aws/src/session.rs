//! Session setup: region resolution and connection establishment

use crate::snapshot::SnapshotConnection;
use ckia_core::{AwsConfig, CkiaError, Result};
use std::path::PathBuf;
use tracing::info;

/// Region used when nothing else is configured
pub const DEFAULT_REGION: &str = "us-east-1";

/// Pick the region: explicit setting, `AWS_REGION`, `AWS_DEFAULT_REGION`,
/// then [`DEFAULT_REGION`]
pub fn resolve_region(configured: Option<&str>) -> String {
    resolve_region_with(configured, |key| std::env::var(key).ok())
}

fn resolve_region_with<F>(configured: Option<&str>, env: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |r: &String| !r.trim().is_empty();
    configured
        .map(str::to_string)
        .filter(non_empty)
        .or_else(|| env("AWS_REGION").filter(non_empty))
        .or_else(|| env("AWS_DEFAULT_REGION").filter(non_empty))
        .unwrap_or_else(|| DEFAULT_REGION.to_string())
}

/// Resolved connection settings for one run
#[derive(Debug, Clone)]
pub struct Session {
    region: String,
    snapshot: PathBuf,
}

impl Session {
    pub fn resolve(config: &AwsConfig) -> Result<Self> {
        let snapshot = config.snapshot.clone().ok_or_else(|| {
            CkiaError::Connection(
                "no account snapshot configured (use --snapshot or aws.snapshot)".into(),
            )
        })?;

        Ok(Self {
            region: resolve_region(config.region.as_deref()),
            snapshot,
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Establish the provider connection
    pub fn connect(&self) -> Result<SnapshotConnection> {
        info!(
            "Connecting to account snapshot {} in {}",
            self.snapshot.display(),
            self.region
        );
        SnapshotConnection::from_file(self.region.clone(), &self.snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::AwsConnection;

    fn env<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_region_precedence() {
        let vars = [("AWS_REGION", "eu-west-1"), ("AWS_DEFAULT_REGION", "ap-south-1")];
        assert_eq!(resolve_region_with(Some("us-west-2"), env(&vars)), "us-west-2");
        assert_eq!(resolve_region_with(None, env(&vars)), "eu-west-1");
        assert_eq!(
            resolve_region_with(None, env(&[("AWS_DEFAULT_REGION", "ap-south-1")])),
            "ap-south-1"
        );
        assert_eq!(resolve_region_with(None, env(&[])), DEFAULT_REGION);
    }

    #[test]
    fn test_blank_sources_fall_through() {
        let vars = [("AWS_REGION", "eu-west-1"), ("AWS_DEFAULT_REGION", "ap-south-1")];
        assert_eq!(resolve_region_with(Some(""), env(&vars)), "eu-west-1");

        let vars = [("AWS_REGION", "  "), ("AWS_DEFAULT_REGION", "ap-south-1")];
        assert_eq!(resolve_region_with(Some(" "), env(&vars)), "ap-south-1");

        let vars = [("AWS_REGION", ""), ("AWS_DEFAULT_REGION", "")];
        assert_eq!(resolve_region_with(None, env(&vars)), DEFAULT_REGION);
    }

    #[test]
    fn test_missing_snapshot_is_a_connection_error() {
        let err = Session::resolve(&AwsConfig::default()).unwrap_err();
        assert!(matches!(err, CkiaError::Connection(_)));
    }

    #[test]
    fn test_connect() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("account.yaml");
        std::fs::write(&path, "addresses:\n  - publicIp: 203.0.113.10\n").unwrap();

        let session = Session::resolve(&AwsConfig {
            region: Some("eu-central-1".into()),
            snapshot: Some(path),
        })
        .unwrap();
        let conn = session.connect().unwrap();
        assert_eq!(conn.region(), "eu-central-1");
        assert_eq!(conn.account().addresses.len(), 1);
    }
}
