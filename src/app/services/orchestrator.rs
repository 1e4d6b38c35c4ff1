//! Parser orchestration: detection, dispatch, fallback and containment
//!
//! The registry is an explicit value constructed once at process start and
//! passed by reference, so tests can swap parsers freely. `parse_file`
//! never panics outward: every internal failure, including parser panics,
//! is converted into a failure outcome.

use super::format_detector::{self, FormatDetection};
use super::parsers::{self, ParseFn};
use crate::app::models::{Dataset, FormatId};
use crate::config::ParseOptions;
use crate::constants::FALLBACK_CONFIDENCE_CEILING;
use serde::Serialize;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;
use tracing::{debug, warn};

/// Explicit format-to-parser dispatch table
#[derive(Debug, Clone, Default)]
pub struct ParserRegistry {
    entries: Vec<(FormatId, ParseFn)>,
}

impl ParserRegistry {
    /// Empty registry, for tests that want full control
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in parser registered
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(FormatId::NetworkDevices, parsers::network_devices::parse);
        registry.register(FormatId::DeviceInventory, parsers::device_inventory::parse);
        registry.register(FormatId::ResourceExport, parsers::resource_export::parse);
        registry.register(FormatId::Topology, parsers::topology::parse);
        registry.register(FormatId::PlatformInfo, parsers::platform_info::parse);
        registry
    }

    /// Register (or replace) the parser for a format
    pub fn register(&mut self, format: FormatId, parser: ParseFn) {
        self.entries.retain(|(id, _)| *id != format);
        self.entries.push((format, parser));
    }

    /// Look up the parser for a format, if one is registered
    pub fn get(&self, format: FormatId) -> Option<ParseFn> {
        self.entries
            .iter()
            .find(|(id, _)| *id == format)
            .map(|(_, parser)| *parser)
    }
}

/// Aggregated result of one `parse_file` call
#[derive(Debug, Clone, Serialize)]
pub struct ParseOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<Dataset>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub detection: FormatDetection,
    pub processing_time_ms: u64,
}

/// Detect the format of a file and parse it with the registered parser.
///
/// Falls back to the resource-export parser when the detected format has
/// no parser, the detection confidence is low and the format is not
/// already the resource export; many unrelated key-value exports happen
/// to satisfy its loose two-column shape. Never panics or returns an
/// error: every failure becomes a failure outcome.
pub fn parse_file(
    content: &str,
    filename: &str,
    options: &ParseOptions,
    registry: &ParserRegistry,
    hint: Option<FormatId>,
) -> ParseOutcome {
    let started = Instant::now();

    let result = catch_unwind(AssertUnwindSafe(|| {
        parse_file_inner(content, filename, options, registry, hint, started)
    }));

    match result {
        Ok(outcome) => outcome,
        Err(panic) => {
            let detail = panic
                .downcast_ref::<String>()
                .cloned()
                .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
                .unwrap_or_else(|| "unknown panic".to_string());
            warn!("Parser panicked on {}: {}", filename, detail);
            ParseOutcome {
                success: false,
                dataset: None,
                errors: vec![format!("internal parser failure on '{filename}': {detail}")],
                warnings: Vec::new(),
                detection: format_detector::detect("", filename, None),
                processing_time_ms: started.elapsed().as_millis() as u64,
            }
        }
    }
}

fn parse_file_inner(
    content: &str,
    filename: &str,
    options: &ParseOptions,
    registry: &ParserRegistry,
    hint: Option<FormatId>,
    started: Instant,
) -> ParseOutcome {
    let mut warnings = Vec::new();

    if let Err(error) = options.validate() {
        return failure(
            vec![error.to_string()],
            warnings,
            format_detector::detect(content, filename, hint),
            started,
        );
    }

    let detection = format_detector::detect(content, filename, hint);
    debug!(
        "Detected {} for {} (confidence {})",
        detection.format, filename, detection.confidence
    );

    let parse_result = match registry.get(detection.format) {
        Some(parser) => parser(content, filename, options),
        None => {
            let low_confidence = detection.confidence < FALLBACK_CONFIDENCE_CEILING;
            let fallback = registry.get(FormatId::ResourceExport);
            if low_confidence && detection.format != FormatId::ResourceExport {
                if let Some(parser) = fallback {
                    match parser(content, filename, options) {
                        Ok(dataset) => {
                            warnings.push(format!(
                                "format '{}' has no registered parser; fell back to the resource-export parser",
                                detection.format
                            ));
                            Ok(dataset)
                        }
                        Err(_) => Err(crate::Error::unimplemented_format(
                            detection.format.as_str(),
                        )),
                    }
                } else {
                    Err(crate::Error::unimplemented_format(detection.format.as_str()))
                }
            } else {
                Err(crate::Error::unimplemented_format(detection.format.as_str()))
            }
        }
    };

    match parse_result {
        Ok(mut dataset) => {
            // Parser-assigned confidence is provisional; detection
            // confidence is authoritative once format identity is settled
            dataset.meta.confidence = detection.confidence;
            warnings.extend(dataset.meta.warnings.clone());
            ParseOutcome {
                success: true,
                dataset: Some(dataset),
                errors: Vec::new(),
                warnings,
                detection,
                processing_time_ms: started.elapsed().as_millis() as u64,
            }
        }
        Err(error) => failure(vec![error.to_string()], warnings, detection, started),
    }
}

fn failure(
    errors: Vec<String>,
    warnings: Vec<String>,
    detection: FormatDetection,
    started: Instant,
) -> ParseOutcome {
    ParseOutcome {
        success: false,
        dataset: None,
        errors,
        warnings,
        detection,
        processing_time_ms: started.elapsed().as_millis() as u64,
    }
}
