//! Lightweight cty-compatible dynamic values for the Terraform wire protocol.
//!
//! A value is decoded against a structural [`Type`] descriptor from one of
//! two self-describing wire encodings:
//! - [`json`]: the structured-text form used for persisted legacy state
//! - [`msgpack`]: the compact binary form used for live protocol traffic
//!
//! Values are three-state at every leaf: known, null, or unknown (a value
//! that will exist but has not been determined yet). Dynamically-typed slots
//! carry their concrete type alongside the value so that decoding and
//! re-encoding is lossless.
//!
//! All functions here are pure transforms with no shared state.

mod error;
mod ty;
mod value;

pub mod json;
pub mod msgpack;

pub use error::{Error, Result};
pub use ty::Type;
pub use value::Value;
