//! ckia Core
//!
//! Core types, traits, and error handling shared by the engine, the check
//! catalogue and the CLI.

pub mod config;
pub mod context;
pub mod error;
pub mod id;
pub mod report;
pub mod traits;

pub use config::*;
pub use context::*;
pub use error::{CkiaError, Result};
pub use id::*;
pub use report::*;
pub use traits::*;
