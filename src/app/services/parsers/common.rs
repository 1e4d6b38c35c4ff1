//! Shared helpers for the per-format parsers

use crate::app::models::{
    Alert, AlertCategory, AlertSeverity, ColumnDef, Dataset, DatasetMeta, FormatId, Row,
    Severity, Summary,
};
use crate::app::services::format_registry::{self, FormatSpec};
use crate::config::ParseOptions;
use crate::constants::TYPE_BREAKDOWN_COLUMNS;
use crate::{Error, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::time::Instant;

/// Validate raw content before tokenizing: non-empty and within the byte cap
pub fn validate_content(content: &str, filename: &str, options: &ParseOptions) -> Result<()> {
    if content.trim().is_empty() {
        return Err(Error::content_validation(filename, "file is empty"));
    }
    if content.len() > options.max_file_bytes {
        return Err(Error::content_validation(
            filename,
            format!(
                "file size {} bytes exceeds the {} byte limit",
                content.len(),
                options.max_file_bytes
            ),
        ));
    }
    Ok(())
}

/// Check required-column presence against the spec.
///
/// Strict formats error out on missing required columns; lenient formats
/// downgrade to warnings and continue. This policy is per-parser, not
/// global, though the strict-validation option forces it everywhere.
pub fn check_columns(
    header: &[String],
    spec: &FormatSpec,
    filename: &str,
    strict: bool,
) -> Result<Vec<String>> {
    let missing: Vec<&str> = spec
        .required_columns
        .iter()
        .filter(|required| !has_column(header, required))
        .copied()
        .collect();

    if missing.is_empty() {
        return Ok(Vec::new());
    }

    let message = format!(
        "missing required columns for {}: {}",
        spec.display_name,
        missing.join(", ")
    );
    if strict {
        Err(Error::schema(filename, message))
    } else {
        Ok(vec![message])
    }
}

/// Case-insensitive column presence check
pub fn has_column(header: &[String], column: &str) -> bool {
    let lower = column.to_lowercase();
    header.iter().any(|field| field.trim().to_lowercase() == lower)
}

/// Ordered column definitions from a header row
pub fn make_columns(header: &[String]) -> Vec<ColumnDef> {
    header
        .iter()
        .enumerate()
        .map(|(index, name)| ColumnDef {
            name: name.clone(),
            index,
        })
        .collect()
}

/// Raw field map for one data row, keyed by header column names
pub fn row_data(header: &[String], fields: &[String]) -> HashMap<String, String> {
    header
        .iter()
        .cloned()
        .zip(fields.iter().cloned())
        .collect()
}

/// Shared summary algorithm: one scan over all rows.
///
/// Counts statuses, collects critical findings keyed by the spec's key
/// column, builds the type breakdown by probing the fixed candidate
/// column list, then appends the fixed recommendations keyed off
/// non-zero problem counts.
pub fn build_summary(rows: &[Row], spec: &FormatSpec) -> Summary {
    let mut summary = Summary {
        total_records: rows.len(),
        ..Summary::default()
    };

    for row in rows {
        if let Some(status) = &row.status {
            summary.status_counts.increment(status.status);
            if status.severity == Severity::Critical {
                let key = spec
                    .key_column
                    .and_then(|column| row.field(column))
                    .unwrap_or(&row.id);
                summary
                    .critical_findings
                    .push(format!("{}: {}", key, status.details.join("; ")));
            }
        }

        let row_type = TYPE_BREAKDOWN_COLUMNS
            .iter()
            .find_map(|candidate| row.field(candidate))
            .unwrap_or("Unknown");
        *summary
            .type_breakdown
            .entry(row_type.to_string())
            .or_insert(0) += 1;
    }

    let counts = summary.status_counts;
    if counts.down > 0 {
        summary.recommendations.push(format!(
            "{} devices are offline and require immediate attention",
            counts.down
        ));
    }
    if counts.fault > 0 {
        summary.recommendations.push(format!(
            "{} devices report faults; inspect controller hardware and wiring",
            counts.fault
        ));
    }
    if counts.alarm > 0 {
        summary.recommendations.push(format!(
            "{} devices have active alarms; review and acknowledge alarm conditions",
            counts.alarm
        ));
    }

    summary
}

/// Assemble a dataset with its metadata block. Processing time is the
/// wall-clock delta around the parse; confidence is the parser's fixed
/// score until the orchestrator back-fills the detection confidence.
#[allow(clippy::too_many_arguments)]
pub fn build_dataset(
    format: FormatId,
    filename: &str,
    content: &str,
    columns: Vec<ColumnDef>,
    rows: Vec<Row>,
    summary: Summary,
    warnings: Vec<String>,
    confidence: u8,
    started: Instant,
) -> Dataset {
    let uploaded_at = Utc::now();
    let spec = format_registry::get(format);

    Dataset {
        id: format!("{}-{}", format.as_str(), uploaded_at.timestamp_millis()),
        source_file: filename.to_string(),
        format,
        category: spec.category.to_string(),
        meta: DatasetMeta {
            row_count: rows.len(),
            column_count: columns.len(),
            errors: Vec::new(),
            warnings,
            uploaded_at,
            file_size: content.len(),
            processing_time_ms: started.elapsed().as_millis() as u64,
            valid: true,
            confidence,
        },
        columns,
        rows,
        summary,
        resource: None,
        platform: None,
        inventory: None,
        raw_content: content.to_string(),
    }
}

/// Build an alert with a sequential id, appending the matching threshold
/// violation semantics at the call site
#[allow(clippy::too_many_arguments)]
pub fn make_alert(
    seq: &mut usize,
    severity: AlertSeverity,
    category: AlertCategory,
    metric: &str,
    value: String,
    numeric_value: Option<f64>,
    threshold: Option<f64>,
    message: String,
    recommendation: String,
) -> Alert {
    *seq += 1;
    Alert {
        id: format!("alert-{seq}"),
        timestamp: Utc::now(),
        severity,
        category,
        metric: metric.to_string(),
        value,
        numeric_value,
        threshold,
        message,
        recommendation,
    }
}
