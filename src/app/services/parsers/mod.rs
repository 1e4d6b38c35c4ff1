//! Per-format parsers for the supported export formats
//!
//! All parsers share one execution shape: validate content, tokenize,
//! check column presence against the format spec, build one row per data
//! line, derive the summary, wrap into a dataset. Format-specific
//! behavior (categorization, telemetry extraction, the text state
//! machine) layers on top of the shared helpers in [`common`].

pub mod common;
pub mod device_inventory;
pub mod network_devices;
pub mod platform_info;
pub mod resource_export;
pub mod topology;

#[cfg(test)]
pub mod tests;

use crate::Result;
use crate::app::models::Dataset;
use crate::config::ParseOptions;

/// Signature shared by every per-format parse function
pub type ParseFn = fn(&str, &str, &ParseOptions) -> Result<Dataset>;
