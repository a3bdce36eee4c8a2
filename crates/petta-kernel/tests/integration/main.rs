//! Integration tests for petta-kernel
//!
//! Tests that start a real engine need SWI-Prolog on PATH and `PETTA_PATH`
//! pointing at a PeTTa checkout. They are marked `#[ignore]`.
//! Run with: cargo test -p petta-kernel --features integration-tests
//!
//! To include the engine tests:
//!    PETTA_PATH=/opt/snet/PeTTa cargo test -p petta-kernel --features integration-tests -- --include-ignored

#![cfg(feature = "integration-tests")]

use std::fs;

use petta_kernel::config::Config;

mod config_loading;
mod engine_lifecycle;
mod execution;
mod transport;

const FIXTURES_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

/// Helper to get fixture file content
pub(crate) fn fixture_source(name: &str) -> String {
    let path = format!("{FIXTURES_PATH}/sources/{name}");
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read fixture {path}: {e}"))
}

/// Load the effective config, requiring `PETTA_PATH` to be set
pub(crate) fn test_config() -> Config {
    let config = Config::load(None).expect("Failed to load config");
    assert!(
        config.petta_path.is_some(),
        "PETTA_PATH must point at a PeTTa checkout"
    );
    config
}
