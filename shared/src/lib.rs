//! Shared types and models for the Field Analytics Engine
//!
//! This crate contains the request and result records shared between the
//! engine, its command line runner, and the WASM bindings.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
