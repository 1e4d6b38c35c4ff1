//! Tests for the per-format parsers

pub mod common_tests;
pub mod device_inventory_tests;
pub mod topology_tests;

use crate::config::ParseOptions;

/// Shared default options for parser tests
pub fn options() -> ParseOptions {
    ParseOptions::default()
}
