//! Parser for resource/telemetry exports (exact Name,Value signature)
//!
//! The export is a flat key-to-value map covering station capacities,
//! engine statistics, memory pools, CPU and uptime. Well-known keys are
//! normalized into [`ResourceMetrics`] and evaluated against the
//! authoritative threshold table; unknown keys pass through untouched in
//! the legacy flattened view.

use super::common::{
    build_dataset, build_summary, check_columns, has_column, make_alert, make_columns, row_data,
    validate_content,
};
use crate::Result;
use crate::app::models::{
    Alert, AlertCategory, AlertSeverity, CapacityValue, Dataset, FormatId, MemoryPoolStats,
    ResourceMetrics, ResourceReport, Row,
};
use crate::app::services::format_registry;
use crate::app::services::tokenizer::tokenize_content;
use crate::app::services::value_parsers::{
    parse_capacity, parse_flexible_datetime, parse_memory_mb, parse_percentage, parse_uptime,
    parse_value,
};
use crate::config::ParseOptions;
use crate::constants::{columns, parser_confidence, thresholds};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Instant;
use tracing::debug;

fn leading_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([\d,]+(?:\.\d+)?)").expect("static pattern"))
}

fn peak_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\(\s*peak:?\s*([\d,]+)").expect("static pattern"))
}

/// Resource-unit category key prefix, e.g. `resources.category.alarm`
const CATEGORY_PREFIX: &str = "resources.category.";

/// Version key prefix, passed through verbatim
const VERSION_PREFIX: &str = "version.";

/// Parse a resource export into a dataset with a telemetry payload
pub fn parse(content: &str, filename: &str, options: &ParseOptions) -> Result<Dataset> {
    let started = Instant::now();
    validate_content(content, filename, options)?;

    let spec = format_registry::get(FormatId::ResourceExport);
    let tokenized = tokenize_content(content, filename, options)?;

    // The canonical header is exactly Name,Value, but any two-column
    // key-value export satisfies the same shape; that looseness is what
    // makes this parser usable as the orchestrator's last-resort fallback
    let mut warnings = Vec::new();
    let (key_column, value_column) = if has_column(&tokenized.header, columns::NAME)
        && has_column(&tokenized.header, columns::VALUE)
    {
        check_columns(&tokenized.header, spec, filename, true)?;
        (columns::NAME.to_string(), columns::VALUE.to_string())
    } else if tokenized.header.len() == 2 {
        warnings.push(format!(
            "columns '{}' and '{}' treated as a key/value pair",
            tokenized.header[0], tokenized.header[1]
        ));
        (tokenized.header[0].clone(), tokenized.header[1].clone())
    } else {
        check_columns(&tokenized.header, spec, filename, true)?;
        (columns::NAME.to_string(), columns::VALUE.to_string())
    };
    if tokenized.truncated {
        warnings.push(format!("row cap reached; only {} rows ingested", options.max_rows));
    }

    let mut legacy: HashMap<String, String> = HashMap::new();
    let rows: Vec<Row> = tokenized
        .rows
        .iter()
        .enumerate()
        .map(|(index, fields)| {
            let mut row = Row::new(
                format!("row-{}", index + 1),
                row_data(&tokenized.header, fields),
            );
            let key = row.field(&key_column).unwrap_or_default().to_string();
            let raw_value = row.field(&value_column).unwrap_or_default().to_string();
            if !key.is_empty() {
                legacy.insert(key, raw_value.clone());
            }
            row.values = Some(HashMap::from([(
                value_column.clone(),
                parse_value(&raw_value),
            )]));
            row
        })
        .collect();

    let metrics = extract_metrics(&legacy);
    let alerts = evaluate_thresholds(&metrics);
    debug!(
        "Parsed {} telemetry pairs from {} ({} alerts)",
        legacy.len(),
        filename,
        alerts.len()
    );

    let summary = build_summary(&rows, spec);
    let columns = make_columns(&tokenized.header);
    let mut dataset = build_dataset(
        FormatId::ResourceExport,
        filename,
        content,
        columns,
        rows,
        summary,
        warnings,
        parser_confidence::RESOURCE_EXPORT,
        started,
    );
    dataset.resource = Some(ResourceReport {
        metrics,
        alerts,
        legacy,
    });
    Ok(dataset)
}

// =============================================================================
// Metric Extraction
// =============================================================================

/// Normalize the well-known keys out of the flat key-value map. Unknown or
/// malformed values become `None` rather than errors; partial data is more
/// useful than a hard failure here.
pub fn extract_metrics(pairs: &HashMap<String, String>) -> ResourceMetrics {
    let get = |key: &str| pairs.get(key).map(String::as_str);

    let mut metrics = ResourceMetrics {
        component_count: get("component.count").and_then(parse_count),
        device_capacity: get("globalCapacity.devices").and_then(parse_capacity),
        point_capacity: get("globalCapacity.points").and_then(parse_capacity),
        network_capacity: get("globalCapacity.networks").and_then(parse_capacity),
        link_capacity: get("globalCapacity.links").and_then(parse_capacity),
        history_count: get("history.count")
            .and_then(parse_count)
            .or_else(|| get("globalCapacity.histories").and_then(|v| parse_capacity(v).map(|c| c.used))),
        resource_units_total: get("resources.total").and_then(parse_kru),
        resource_units_limit: get("resources.limit").and_then(parse_kru),
        engine_queue_current: get("engine.queue.actions").and_then(parse_count),
        engine_queue_peak: get("engine.queue.actions").and_then(parse_peak),
        scan_time_recent_ms: get("engine.scan.recent").and_then(parse_millis),
        scan_time_peak_ms: get("engine.scan.peak").and_then(parse_millis),
        scan_usage_percent: get("engine.scan.usage").and_then(parse_percentage),
        heap: MemoryPoolStats {
            used_mb: get("heap.used").and_then(parse_memory_mb),
            free_mb: get("heap.free").and_then(parse_memory_mb),
            total_mb: get("heap.total").and_then(parse_memory_mb),
            max_mb: get("heap.max").and_then(parse_memory_mb),
        },
        physical: MemoryPoolStats {
            used_mb: get("mem.used").and_then(parse_memory_mb),
            free_mb: None,
            total_mb: get("mem.total")
                .or_else(|| get("mem.physical"))
                .and_then(parse_memory_mb),
            max_mb: None,
        },
        cpu_usage_percent: get("cpu.usage").and_then(parse_percentage),
        uptime: get("time.uptime").and_then(parse_uptime),
        export_time: get("time.current").map(str::to_string),
        ..ResourceMetrics::default()
    };

    for (key, value) in pairs {
        if let Some(category) = key.strip_prefix(CATEGORY_PREFIX) {
            if let Some(kru) = parse_kru(value) {
                metrics
                    .resource_units_by_category
                    .insert(category.to_string(), kru);
            }
        } else if key.starts_with(VERSION_PREFIX) {
            metrics.versions.insert(key.clone(), value.clone());
        }
    }

    metrics
}

fn parse_count(raw: &str) -> Option<u64> {
    leading_number_re()
        .captures(raw.trim())
        .and_then(|captures| captures[1].replace(',', "").parse::<f64>().ok())
        .map(|n| n as u64)
}

/// `"1,234.5 kRU"` style composite load values
fn parse_kru(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("none") {
        return None;
    }
    leading_number_re()
        .captures(trimmed)
        .and_then(|captures| captures[1].replace(',', "").parse().ok())
}

fn parse_peak(raw: &str) -> Option<u64> {
    peak_re()
        .captures(raw)
        .and_then(|captures| captures[1].replace(',', "").parse().ok())
}

fn parse_millis(raw: &str) -> Option<f64> {
    leading_number_re()
        .captures(raw.trim())
        .and_then(|captures| captures[1].replace(',', "").parse().ok())
}

// =============================================================================
// Threshold Evaluation
// =============================================================================

/// Evaluate the normalized metrics against the authoritative threshold
/// table, producing the dataset-embedded alert list
pub fn evaluate_thresholds(metrics: &ResourceMetrics) -> Vec<Alert> {
    let mut alerts = Vec::new();
    let mut seq = 0usize;

    if let Some(cpu) = metrics.cpu_usage_percent {
        if cpu >= thresholds::CPU_CRITICAL_PERCENT {
            alerts.push(make_alert(
                &mut seq,
                AlertSeverity::Critical,
                AlertCategory::Performance,
                "cpu.usage",
                format!("{cpu:.1}%"),
                Some(cpu),
                Some(thresholds::CPU_CRITICAL_PERCENT),
                format!("CPU usage at {cpu:.1}% exceeds the critical threshold"),
                "Investigate runaway logic or reduce station load".to_string(),
            ));
        } else if cpu >= thresholds::CPU_WARNING_PERCENT {
            alerts.push(make_alert(
                &mut seq,
                AlertSeverity::Warning,
                AlertCategory::Performance,
                "cpu.usage",
                format!("{cpu:.1}%"),
                Some(cpu),
                Some(thresholds::CPU_WARNING_PERCENT),
                format!("CPU usage at {cpu:.1}% is elevated"),
                "Review station load and polling rates".to_string(),
            ));
        }
    }

    if let Some(percent) = metrics.heap.percent_used() {
        if percent >= thresholds::HEAP_CRITICAL_PERCENT {
            alerts.push(make_alert(
                &mut seq,
                AlertSeverity::Critical,
                AlertCategory::Performance,
                "heap.used",
                format!("{percent:.1}%"),
                Some(percent),
                Some(thresholds::HEAP_CRITICAL_PERCENT),
                format!("Heap usage at {percent:.1}% risks out-of-memory restarts"),
                "Increase the heap allocation or reduce station size".to_string(),
            ));
        } else if percent >= thresholds::HEAP_WARNING_PERCENT {
            alerts.push(make_alert(
                &mut seq,
                AlertSeverity::Warning,
                AlertCategory::Performance,
                "heap.used",
                format!("{percent:.1}%"),
                Some(percent),
                Some(thresholds::HEAP_WARNING_PERCENT),
                format!("Heap usage at {percent:.1}% is elevated"),
                "Monitor heap growth over time".to_string(),
            ));
        }
    }

    if let Some(percent) = metrics.physical.percent_used() {
        if percent >= thresholds::MEMORY_CRITICAL_PERCENT {
            alerts.push(make_alert(
                &mut seq,
                AlertSeverity::Critical,
                AlertCategory::Performance,
                "mem.used",
                format!("{percent:.1}%"),
                Some(percent),
                Some(thresholds::MEMORY_CRITICAL_PERCENT),
                format!("Physical memory usage at {percent:.1}% is critical"),
                "Reduce installed services or upgrade the controller".to_string(),
            ));
        } else if percent >= thresholds::MEMORY_WARNING_PERCENT {
            alerts.push(make_alert(
                &mut seq,
                AlertSeverity::Warning,
                AlertCategory::Performance,
                "mem.used",
                format!("{percent:.1}%"),
                Some(percent),
                Some(thresholds::MEMORY_WARNING_PERCENT),
                format!("Physical memory usage at {percent:.1}% is elevated"),
                "Monitor memory headroom".to_string(),
            ));
        }
    }

    capacity_alert(&mut alerts, &mut seq, "globalCapacity.devices", metrics.device_capacity.as_ref());
    capacity_alert(&mut alerts, &mut seq, "globalCapacity.points", metrics.point_capacity.as_ref());

    if let Some(histories) = metrics.history_count {
        if histories > thresholds::HISTORY_WARNING_COUNT {
            alerts.push(make_alert(
                &mut seq,
                AlertSeverity::Warning,
                AlertCategory::Capacity,
                "history.count",
                histories.to_string(),
                Some(histories as f64),
                Some(thresholds::HISTORY_WARNING_COUNT as f64),
                format!(
                    "{histories} histories exceed the embedded-controller comfort limit"
                ),
                "Archive or thin old histories, or move them to a supervisor".to_string(),
            ));
        }
    }

    if let Some(scan) = metrics.scan_time_recent_ms {
        if scan > thresholds::SCAN_TIME_WARNING_MS {
            alerts.push(make_alert(
                &mut seq,
                AlertSeverity::Warning,
                AlertCategory::Performance,
                "engine.scan.recent",
                format!("{scan:.0} ms"),
                Some(scan),
                Some(thresholds::SCAN_TIME_WARNING_MS),
                format!("Engine scan time of {scan:.0} ms indicates an overloaded station"),
                "Profile heavy components and stagger polling".to_string(),
            ));
        }
    }

    if let Some(uptime) = &metrics.uptime {
        let days = uptime.total_days();
        if days > thresholds::UPTIME_WARNING_DAYS {
            alerts.push(make_alert(
                &mut seq,
                AlertSeverity::Warning,
                AlertCategory::Maintenance,
                "time.uptime",
                format!("{days} days"),
                Some(days as f64),
                Some(thresholds::UPTIME_WARNING_DAYS as f64),
                format!("Station has run {days} days without a restart"),
                "Schedule a maintenance restart window".to_string(),
            ));
        }
    }

    // A missing or unparseable export timestamp means the snapshot cannot
    // be trusted to be current
    let export_valid = metrics
        .export_time
        .as_deref()
        .map(|raw| parse_flexible_datetime(raw).is_some())
        .unwrap_or(false);
    if !export_valid {
        alerts.push(make_alert(
            &mut seq,
            AlertSeverity::Critical,
            AlertCategory::Maintenance,
            "time.current",
            metrics.export_time.clone().unwrap_or_else(|| "missing".to_string()),
            None,
            None,
            "Resource export timestamp is missing or invalid".to_string(),
            "Re-export the resource data and verify the platform clock".to_string(),
        ));
    }

    alerts
}

fn capacity_alert(
    alerts: &mut Vec<Alert>,
    seq: &mut usize,
    metric: &str,
    capacity: Option<&CapacityValue>,
) {
    let Some(capacity) = capacity else { return };
    let Some(percent) = capacity.percentage else { return };

    if percent >= thresholds::CAPACITY_CRITICAL_PERCENT {
        alerts.push(make_alert(
            seq,
            AlertSeverity::Critical,
            AlertCategory::Capacity,
            metric,
            format!("{} of {} ({percent:.1}%)", capacity.used, capacity.limit),
            Some(percent),
            Some(thresholds::CAPACITY_CRITICAL_PERCENT),
            format!("License capacity for {metric} at {percent:.1}% is nearly exhausted"),
            "Purchase additional capacity before adding devices".to_string(),
        ));
    } else if percent >= thresholds::CAPACITY_WARNING_PERCENT {
        alerts.push(make_alert(
            seq,
            AlertSeverity::Warning,
            AlertCategory::Capacity,
            metric,
            format!("{} of {} ({percent:.1}%)", capacity.used, capacity.limit),
            Some(percent),
            Some(thresholds::CAPACITY_WARNING_PERCENT),
            format!("License capacity for {metric} at {percent:.1}% is approaching its limit"),
            "Plan a capacity upgrade".to_string(),
        ));
    }
}
