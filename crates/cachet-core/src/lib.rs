//! Shared primitives for cachet crates
//!
//! Content hashing (cache keys, seeds, synthetic identifiers) and the
//! per-call context threaded through every completion.

pub mod context;
pub mod hash;

pub use context::CallContext;
