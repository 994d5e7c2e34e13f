//! AWS provider for ckia
//!
//! Defines the connection contract the AWS checks run against, a connection
//! backed by a serialized account snapshot, session resolution, and the
//! compiled-in check catalogue.
//!
//! # Example
//!
//! ```no_run
//! use ckia_aws::{build_registry, Session};
//! use ckia_core::{AwsConfig, ExecutionContext};
//! use ckia_engine::AuditPipeline;
//!
//! let registry = build_registry().unwrap();
//! let session = Session::resolve(&AwsConfig {
//!     region: None,
//!     snapshot: Some("account.yaml".into()),
//! })
//! .unwrap();
//! let conn = session.connect().unwrap();
//!
//! let aggregate = AuditPipeline::new(&registry)
//!     .run(&ExecutionContext::new(), &conn)
//!     .unwrap();
//! println!("{} result(s)", aggregate.report.len());
//! ```

pub mod checks;
pub mod connection;
pub mod session;
pub mod snapshot;

pub use connection::{AwsConnection, Connection};
pub use session::{resolve_region, Session, DEFAULT_REGION};
pub use snapshot::{AccountSnapshot, SnapshotConnection};

use ckia_core::Result;
use ckia_engine::CheckRegistry;

/// Build the registry of every AWS check
pub fn build_registry() -> Result<CheckRegistry<Connection>> {
    let mut registry = CheckRegistry::new();
    checks::register_checks(&mut registry)?;
    Ok(registry)
}
