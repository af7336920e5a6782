//! lineage-core library.
//!
//! Resolves the full upward lineage of every entity in a flat
//! child/parent table.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums per concern, each mapping to an
//!   [`error::ErrorCode`]. Row-level problems are never errors; they are
//!   reported as [`model::Diagnostic`]s.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod config;
pub mod error;
pub mod graph;
pub mod model;
pub mod resolve;
pub mod source;

pub use resolve::{ResolveError, ResolveOptions, Resolution, load_records, resolve};
