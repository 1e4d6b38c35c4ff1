//! Parser for device-inventory exports with vendor/model metadata
//!
//! A lenient format: field exports from different driver versions omit
//! columns freely, so missing required columns downgrade to warnings.
//! Each row is enriched with an equipment category, communication
//! recency derived from the bracketed health timestamp, and any
//! configuration issues; the dataset carries per-vendor, per-network and
//! per-protocol-revision aggregates.

use super::common::{
    build_dataset, build_summary, check_columns, has_column, make_columns, row_data,
    validate_content,
};
use crate::Result;
use crate::app::models::{
    CommRecency, Dataset, FormatId, InventoryReport, InventoryRowMeta, Row,
};
use crate::app::services::format_registry;
use crate::app::services::tokenizer::tokenize_content;
use crate::app::services::value_parsers::{
    normalize_timestamp, parse_flexible_datetime, parse_status,
};
use crate::config::ParseOptions;
use crate::constants::{PROTOCOL_DEVICE_ID_MAX, categorize_device, columns, parser_confidence};
use chrono::Utc;
use regex::Regex;
use std::sync::OnceLock;
use std::time::Instant;
use tracing::debug;

fn bracketed_timestamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\]]+)\]").expect("static pattern"))
}

/// Parse a device-inventory export into a dataset
pub fn parse(content: &str, filename: &str, options: &ParseOptions) -> Result<Dataset> {
    let started = Instant::now();
    validate_content(content, filename, options)?;

    let spec = format_registry::get(FormatId::DeviceInventory);
    let tokenized = tokenize_content(content, filename, options)?;
    let mut warnings =
        check_columns(&tokenized.header, spec, filename, options.strict_validation)?;
    if tokenized.truncated {
        warnings.push(format!("row cap reached; only {} rows ingested", options.max_rows));
    }

    let status_present = has_column(&tokenized.header, columns::STATUS);
    let now = Utc::now().naive_utc();
    let mut report = InventoryReport::default();
    let mut out_of_range_ids = 0usize;

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

            let meta = inventory_meta(&row, now);
            aggregate(&mut report, &meta);

            if let Some(id_value) = row.field(columns::DEVICE_ID) {
                if let Ok(id) = id_value.replace(',', "").parse::<u64>() {
                    if id > PROTOCOL_DEVICE_ID_MAX {
                        out_of_range_ids += 1;
                    }
                }
            }

            row.inventory = Some(meta);
            row
        })
        .collect();

    if out_of_range_ids > 0 {
        warnings.push(format!(
            "{out_of_range_ids} device ids exceed the protocol maximum of {PROTOCOL_DEVICE_ID_MAX}"
        ));
    }

    finish_report(&mut report);
    debug!(
        "Parsed {} inventory rows from {} ({} vendors)",
        rows.len(),
        filename,
        report.by_vendor.len()
    );

    let summary = build_summary(&rows, spec);
    let columns = make_columns(&tokenized.header);
    let mut dataset = build_dataset(
        FormatId::DeviceInventory,
        filename,
        content,
        columns,
        rows,
        summary,
        warnings,
        parser_confidence::DEVICE_INVENTORY,
        started,
    );
    dataset.inventory = Some(report);
    Ok(dataset)
}

/// Per-row enrichment: category, recency and configuration issues
fn inventory_meta(row: &Row, now: chrono::NaiveDateTime) -> InventoryRowMeta {
    let name = row.field(columns::NAME).unwrap_or_default();
    let model = row.field(columns::MODEL);
    let category = categorize_device(name, model).to_string();

    let mut last_seen = None;
    let mut comm_recency = None;
    if let Some(health) = row.field(columns::HEALTH) {
        if let Some(captures) = bracketed_timestamp_re().captures(health) {
            let raw_timestamp = &captures[1];
            last_seen = Some(normalize_timestamp(raw_timestamp));
            if let Some(parsed) = parse_flexible_datetime(raw_timestamp) {
                let minutes = (now - parsed).num_minutes().max(0);
                comm_recency = Some(CommRecency::from_minutes(minutes));
            }
        }
    }

    let mut configuration_issues = Vec::new();
    if comm_recency == Some(CommRecency::Poor) {
        configuration_issues.push("Poor communication health".to_string());
    }
    if field_is_false(row.field(columns::ENABLED)) {
        configuration_issues.push("Device disabled".to_string());
    }
    if field_is_false(row.field(columns::USE_COV)) {
        configuration_issues.push("COV subscriptions disabled".to_string());
    }

    InventoryRowMeta {
        category,
        vendor: row.field(columns::VENDOR).map(str::to_string),
        network: row.field(columns::NETWORK).map(str::to_string),
        protocol_revision: row.field(columns::PROTOCOL_REV).map(str::to_string),
        last_seen,
        comm_recency,
        configuration_issues,
    }
}

fn field_is_false(value: Option<&str>) -> bool {
    matches!(
        value.map(str::to_lowercase).as_deref(),
        Some("false") | Some("no") | Some("disabled") | Some("off")
    )
}

fn aggregate(report: &mut InventoryReport, meta: &InventoryRowMeta) {
    if let Some(vendor) = &meta.vendor {
        *report.by_vendor.entry(vendor.clone()).or_insert(0) += 1;
    }
    if let Some(network) = &meta.network {
        *report.by_network.entry(network.clone()).or_insert(0) += 1;
    }
    if let Some(revision) = &meta.protocol_revision {
        *report
            .by_protocol_revision
            .entry(revision.clone())
            .or_insert(0) += 1;
    }
    if meta.comm_recency == Some(CommRecency::Poor) {
        report.poor_communication += 1;
    }
    for issue in &meta.configuration_issues {
        match issue.as_str() {
            "Device disabled" => report.disabled += 1,
            "COV subscriptions disabled" => report.cov_disabled += 1,
            _ => {}
        }
    }
}

/// Roll the per-row issue counts up into dataset-level findings
fn finish_report(report: &mut InventoryReport) {
    if report.poor_communication > 0 {
        report.configuration_issues.push(format!(
            "{} devices have poor communication health",
            report.poor_communication
        ));
    }
    if report.disabled > 0 {
        report
            .configuration_issues
            .push(format!("{} devices are disabled", report.disabled));
    }
    if report.cov_disabled > 0 {
        report.configuration_issues.push(format!(
            "{} devices have COV subscriptions disabled",
            report.cov_disabled
        ));
    }
}
