//! Test infrastructure for jsonsp-core
//!
//! Provides fixture loading, stochastic chunking, and collection helpers.

#![allow(dead_code)]

mod generators;
mod harness;
mod loader;

pub use generators::Gen;
pub use harness::{collect, collect_chunks, from_json, run_case, run_with_splits, Outcome};
pub use loader::{load_fixtures_by_name, Case};
