//! Tests for the shared parser helpers

use super::options;
use crate::app::models::{DeviceStatus, FormatId, Row, Severity};
use crate::app::services::format_registry;
use crate::app::services::parsers::common::{
    build_summary, check_columns, has_column, validate_content,
};
use crate::app::services::value_parsers::parse_status;
use std::collections::HashMap;

fn header(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[test]
fn test_validate_content_rejects_empty() {
    let err = validate_content("   \n  ", "empty.csv", &options()).unwrap_err();
    assert!(err.to_string().contains("empty"));
}

#[test]
fn test_validate_content_rejects_oversized() {
    let options = options().with_max_file_bytes(10);
    let err = validate_content("0123456789abcdef", "big.csv", &options).unwrap_err();
    assert!(err.to_string().contains("byte limit"));
}

#[test]
fn test_check_columns_strict_errors() {
    let spec = format_registry::get(FormatId::NetworkDevices);
    let err = check_columns(&header(&["Name", "Address"]), spec, "x.csv", true).unwrap_err();
    assert!(err.to_string().contains("Controller Type"));
}

#[test]
fn test_check_columns_lenient_warns() {
    let spec = format_registry::get(FormatId::DeviceInventory);
    let warnings = check_columns(&header(&["Name"]), spec, "x.csv", false).unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("Device ID"));
}

#[test]
fn test_has_column_case_insensitive() {
    let header = header(&["Name", "Controller Type"]);
    assert!(has_column(&header, "controller type"));
    assert!(has_column(&header, "NAME"));
    assert!(!has_column(&header, "Status"));
}

fn status_row(id: &str, name: &str, status: &str, row_type: &str) -> Row {
    let mut data = HashMap::new();
    data.insert("Name".to_string(), name.to_string());
    data.insert("Type".to_string(), row_type.to_string());
    let mut row = Row::new(id, data);
    row.status = Some(parse_status(status));
    row
}

#[test]
fn test_summary_counts_and_findings() {
    let spec = format_registry::get(FormatId::NetworkDevices);
    let rows = vec![
        status_row("row-1", "AHU-1", "{ok}", "AHU"),
        status_row("row-2", "VAV-7", "{down}", "VAV"),
        status_row("row-3", "VAV-8", "{down,fault}", "VAV"),
        status_row("row-4", "CHW-1", "{alarm}", "Chiller"),
    ];

    let summary = build_summary(&rows, spec);
    assert_eq!(summary.total_records, 4);
    assert_eq!(summary.status_counts.ok, 1);
    assert_eq!(summary.status_counts.down, 1);
    assert_eq!(summary.status_counts.fault, 1);
    assert_eq!(summary.status_counts.alarm, 1);

    // Both critical rows surface as findings keyed by the Name column
    assert_eq!(summary.critical_findings.len(), 2);
    assert!(summary.critical_findings[0].starts_with("VAV-7:"));
    assert!(summary.critical_findings[1].starts_with("VAV-8:"));

    assert_eq!(summary.type_breakdown.get("VAV"), Some(&2));
    assert_eq!(summary.type_breakdown.get("AHU"), Some(&1));

    // One fixed recommendation per non-zero problem counter
    assert_eq!(summary.recommendations.len(), 3);
    assert!(summary.recommendations[0].contains("1 devices are offline"));
}

#[test]
fn test_summary_type_probe_order() {
    let spec = format_registry::get(FormatId::NetworkDevices);
    let mut data = HashMap::new();
    data.insert("Controller Type".to_string(), "JACE".to_string());
    data.insert("Model".to_string(), "TITAN".to_string());
    let rows = vec![Row::new("row-1", data)];

    // Controller Type precedes Model in the probe order
    let summary = build_summary(&rows, spec);
    assert_eq!(summary.type_breakdown.get("JACE"), Some(&1));
}

#[test]
fn test_summary_unknown_type_default() {
    let spec = format_registry::get(FormatId::NetworkDevices);
    let rows = vec![Row::new("row-1", HashMap::new())];
    let summary = build_summary(&rows, spec);
    assert_eq!(summary.type_breakdown.get("Unknown"), Some(&1));
    assert!(summary.recommendations.is_empty());
}

#[test]
fn test_critical_finding_falls_back_to_row_id() {
    let spec = format_registry::get(FormatId::NetworkDevices);
    let mut row = Row::new("row-9", HashMap::new());
    row.status = Some(parse_status("{down}"));
    assert_eq!(row.status.as_ref().unwrap().severity, Severity::Critical);
    assert_eq!(
        row.status.as_ref().unwrap().status,
        DeviceStatus::Down
    );

    let summary = build_summary(&[row], spec);
    assert!(summary.critical_findings[0].starts_with("row-9:"));
}
