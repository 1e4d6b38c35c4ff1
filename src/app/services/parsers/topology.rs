//! Parser for hierarchical network-topology exports
//!
//! A lenient format: topology exports vary by platform version, so
//! missing columns downgrade to warnings. Each row carries its position
//! in the station hierarchy derived from the Path column, plus the
//! client/server connection states.

use super::common::{
    build_dataset, build_summary, check_columns, has_column, make_columns, row_data,
    validate_content,
};
use crate::Result;
use crate::app::models::{Dataset, FormatId, Row, TopologyRowMeta};
use crate::app::services::format_registry;
use crate::app::services::tokenizer::tokenize_content;
use crate::app::services::value_parsers::parse_status;
use crate::config::ParseOptions;
use crate::constants::{columns, parser_confidence};
use std::time::Instant;

/// Parse a topology export into a dataset
pub fn parse(content: &str, filename: &str, options: &ParseOptions) -> Result<Dataset> {
    let started = Instant::now();
    validate_content(content, filename, options)?;

    let spec = format_registry::get(FormatId::Topology);
    let tokenized = tokenize_content(content, filename, options)?;
    let mut warnings =
        check_columns(&tokenized.header, spec, filename, options.strict_validation)?;
    if tokenized.truncated {
        warnings.push(format!("row cap reached; only {} rows ingested", options.max_rows));
    }

    let status_present = has_column(&tokenized.header, columns::PLATFORM_STATUS);
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
                let raw_status = row
                    .field(columns::PLATFORM_STATUS)
                    .unwrap_or_default()
                    .to_string();
                row.status = Some(parse_status(&raw_status));
            }
            let meta = topology_meta(&row);
            row.topology = Some(meta);
            row
        })
        .collect();

    let summary = build_summary(&rows, spec);
    let columns = make_columns(&tokenized.header);
    Ok(build_dataset(
        FormatId::Topology,
        filename,
        content,
        columns,
        rows,
        summary,
        warnings,
        parser_confidence::TOPOLOGY,
        started,
    ))
}

fn topology_meta(row: &Row) -> TopologyRowMeta {
    let path = row.field(columns::PATH).unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let parent_path = if segments.len() > 1 {
        Some(format!("/{}", segments[..segments.len() - 1].join("/")))
    } else {
        None
    };

    TopologyRowMeta {
        depth: segments.len(),
        parent_path,
        client_connected: connection_state(row.field(columns::CLIENT_CONN)),
        server_connected: connection_state(row.field(columns::SERVER_CONN)),
    }
}

/// `"Connected"` / `"Not connected"` style connection columns
fn connection_state(value: Option<&str>) -> Option<bool> {
    let value = value?.to_lowercase();
    if value.contains("not") || value.contains("disconnected") {
        Some(false)
    } else if value.contains("connected") {
        Some(true)
    } else {
        None
    }
}
