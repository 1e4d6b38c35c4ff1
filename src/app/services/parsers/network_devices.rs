//! Parser for network-device exports (Controller Type signature)
//!
//! A strict format: the export tool always emits the Name, Controller
//! Type and Status columns, so their absence means the file is something
//! else and the parse fails rather than degrading.

use super::common::{
    build_dataset, build_summary, check_columns, has_column, make_columns, row_data,
    validate_content,
};
use crate::Result;
use crate::app::models::{Dataset, FormatId, Row};
use crate::app::services::format_registry;
use crate::app::services::tokenizer::tokenize_content;
use crate::app::services::value_parsers::parse_status;
use crate::config::ParseOptions;
use crate::constants::{columns, parser_confidence};
use std::time::Instant;
use tracing::debug;

/// Parse a network-device export into a dataset
pub fn parse(content: &str, filename: &str, options: &ParseOptions) -> Result<Dataset> {
    let started = Instant::now();
    validate_content(content, filename, options)?;

    let spec = format_registry::get(FormatId::NetworkDevices);
    let tokenized = tokenize_content(content, filename, options)?;
    let mut warnings = check_columns(&tokenized.header, spec, filename, true)?;
    if tokenized.truncated {
        warnings.push(format!("row cap reached; only {} rows ingested", options.max_rows));
    }

    let status_present = has_column(&tokenized.header, columns::STATUS);
    let rows: Vec<Row> = tokenized
        .rows
        .iter()
        .enumerate()
        .map(|(index, fields)| {
            let mut row = Row::new(
                format!("row-{}", index + 1),
                row_data(&tokenized.header, fields),
            );
            if status_present {
                let raw_status = row.field(columns::STATUS).unwrap_or_default().to_string();
                row.status = Some(parse_status(&raw_status));
            }
            row
        })
        .collect();

    debug!("Parsed {} network device rows from {}", rows.len(), filename);

    let summary = build_summary(&rows, spec);
    let columns = make_columns(&tokenized.header);
    Ok(build_dataset(
        FormatId::NetworkDevices,
        filename,
        content,
        columns,
        rows,
        summary,
        warnings,
        parser_confidence::NETWORK_DEVICES,
        started,
    ))
}
