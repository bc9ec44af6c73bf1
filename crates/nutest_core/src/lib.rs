//! Provide the shared, pure vocabulary of the nutest harness.
//!
//! This crate is intentionally small and dependency-free. It contains deterministic tables and helpers that the
//! harness (`nutest`) and the `#[subject]` macro expansion both rely on:
//! - the primitive/boxed type vocabulary used by method resolution ([`types`]),
//! - the literal wording of run reports ([`report`]),
//! - the default frame-prefix vocabulary used to trim diagnostic traces ([`frames`]).
//!
//! ## Notes
//!
//! - This is a “vocabulary” crate: **no IO**, no global state, and no harness-specific runtime types.
//! - Type lookup is **case-sensitive**: `float` (primitive) and `Float` (boxed) are different spellings.

pub mod frames;
pub mod report;
pub mod types;

pub use types::{PRIMITIVES, PrimitiveId, PrimitiveInfo, TypeDesc, compatible, signature_matches};
