//! Core infrastructure: configuration, errors, logging, compute pool

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::AegisConfig;
pub use error::{AegisError, ErrorCategory, Result};
pub use runtime::ComputePool;
