//! Domain primitives for the Aura controller.
//!
//! This crate has no internal dependencies so the store layer, the HTTP
//! surface, and any future CLI tooling can all share these types.

pub mod error;
pub mod keys;
pub mod rollup;
pub mod signature;
pub mod slug;
pub mod status;
pub mod types;
