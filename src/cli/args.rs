//! Command-line argument definitions for the BAS processor
//!
//! Defines the complete CLI interface using the clap derive API.

use crate::app::models::FormatId;
use crate::constants::{DEFAULT_MAX_FILE_BYTES, DEFAULT_MAX_ROWS};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the building-automation export processor
///
/// Parses vendor export files (CSV and plain-text platform dumps) into
/// normalized datasets and combines them into a system health report.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "bas-processor",
    version,
    about = "Parse building-automation export files into normalized health reports",
    long_about = "A tool that detects and parses the loosely-structured export formats \
                  produced by building-controls platforms (device networks, device \
                  inventories, resource telemetry, network topology and platform text \
                  dumps), normalizes them into typed datasets, and combines multiple \
                  exports into a single health analysis with threshold-based alerts."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Detect and parse export files into normalized datasets
    Parse(ParseArgs),
    /// Combine multiple export files into a system health report
    Analyze(AnalyzeArgs),
}

/// Arguments for the parse command
#[derive(Debug, Clone, Parser)]
pub struct ParseArgs {
    /// Export files or directories to parse
    ///
    /// Directories are scanned recursively for files whose extension
    /// matches a supported format (csv, txt, text, log).
    #[arg(value_name = "PATH", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Format hint for detection
    ///
    /// One of: network-devices, device-inventory, resource-export,
    /// topology, platform-info. The hint is validated against the file
    /// content and falls back to auto-detection when it does not fit.
    #[arg(short = 'f', long = "format", value_name = "FORMAT")]
    pub format: Option<FormatId>,

    /// Directory to write parsed datasets as JSON
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Maximum number of data rows ingested per file
    #[arg(long = "max-rows", value_name = "COUNT", default_value_t = DEFAULT_MAX_ROWS)]
    pub max_rows: usize,

    /// Maximum file size in bytes
    #[arg(long = "max-bytes", value_name = "BYTES", default_value_t = DEFAULT_MAX_FILE_BYTES)]
    pub max_bytes: usize,

    /// Treat missing required columns as errors for every format
    #[arg(long = "strict")]
    pub strict: bool,
}

/// Arguments for the analyze command
#[derive(Debug, Clone, Parser)]
pub struct AnalyzeArgs {
    /// Export files or directories to combine into one analysis
    ///
    /// Each file is parsed and assigned to its analysis slot by detected
    /// format; missing slots degrade to defaults.
    #[arg(value_name = "PATH", required = true)]
    pub inputs: Vec<PathBuf>,

    /// File to write the analysis report as JSON
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Maximum number of data rows ingested per file
    #[arg(long = "max-rows", value_name = "COUNT", default_value_t = DEFAULT_MAX_ROWS)]
    pub max_rows: usize,
}
