//! tm-core - Core library for Tidemark
//!
//! This crate provides the shared types used across all Tidemark components:
//! project configuration, dotted migration versions, database platform
//! families, and the short names that key the audit ledger.

pub mod config;
pub mod error;
pub mod platform;
pub mod short_name;
pub mod version;

pub use config::{Config, DatabaseConfig};
pub use error::{CoreError, CoreResult};
pub use platform::PlatformFamily;
pub use short_name::ShortName;
pub use version::Version;
