//! nutest version information.
//!
//! ## Notes
//!
//! - The value is taken from Cargo metadata (`CARGO_PKG_VERSION`) at compile time.
//! - The CLI's `--version` and the JSON summaries' producers read this constant.

/// The nutest version string (for example, `0.1.0-alpha.1`).
pub const NUTEST_VERSION: &str = env!("CARGO_PKG_VERSION");
