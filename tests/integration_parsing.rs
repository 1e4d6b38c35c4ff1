//! End-to-end parsing scenarios through the public library API

use bas_processor::app::models::{DeviceStatus, FormatId};
use bas_processor::app::services::orchestrator::{ParserRegistry, parse_file};
use bas_processor::{ParseOptions, parse_file as reexported_parse_file};
use std::io::Write;

const NETWORK_EXPORT: &str = "\
Name,Controller Type,Status,Address
AHU-1,JACE-8000,{ok},10.10.1.20
VAV-301,VAV Controller,\"{down,alarm,unackedAlarm}\",10.10.1.31
RTU-2,Rooftop Unit,\"{down,fault}\",10.10.1.33
";

#[test]
fn parse_network_export_end_to_end() {
    let registry = ParserRegistry::with_defaults();
    let outcome = parse_file(
        NETWORK_EXPORT,
        "site_devices.csv",
        &ParseOptions::default(),
        &registry,
        None,
    );

    assert!(outcome.success, "errors: {:?}", outcome.errors);
    assert_eq!(outcome.detection.format, FormatId::NetworkDevices);
    assert_eq!(outcome.detection.confidence, 100);

    let dataset = outcome.dataset.unwrap();
    assert_eq!(dataset.rows.len(), 3);

    // Compound-status precedence: down+alarm stays down with the combined
    // badge; down+fault reclassifies to fault
    let second = dataset.rows[1].status.as_ref().unwrap();
    assert_eq!(second.status, DeviceStatus::Down);
    assert_eq!(second.badge.text, "DOWN/ALARM");
    let third = dataset.rows[2].status.as_ref().unwrap();
    assert_eq!(third.status, DeviceStatus::Fault);
    assert_eq!(third.badge.text, "FAULT/DOWN");

    // Both problem rows surface as critical findings
    assert_eq!(dataset.summary.critical_findings.len(), 2);
}

#[test]
fn parse_is_idempotent_modulo_timestamps_and_ids() {
    let registry = ParserRegistry::with_defaults();
    let options = ParseOptions::default();
    let first = parse_file(NETWORK_EXPORT, "devices.csv", &options, &registry, None);
    let second = parse_file(NETWORK_EXPORT, "devices.csv", &options, &registry, None);

    let first = first.dataset.unwrap();
    let second = second.dataset.unwrap();
    assert_eq!(first.rows, second.rows);
    assert_eq!(first.summary, second.summary);
    assert_eq!(first.columns, second.columns);
    assert_eq!(first.format, second.format);
    assert_eq!(first.meta.confidence, second.meta.confidence);
}

#[test]
fn parse_file_from_disk_round_trip() {
    let mut file = tempfile::NamedTempFile::with_suffix(".csv").unwrap();
    file.write_all(b"Name,Value\ncpu.usage,12%\ntime.current,2024-05-01 08:00:00\n")
        .unwrap();

    let content = std::fs::read_to_string(file.path()).unwrap();
    let filename = file.path().file_name().unwrap().to_string_lossy();
    let registry = ParserRegistry::with_defaults();
    let outcome = reexported_parse_file(
        &content,
        &filename,
        &ParseOptions::default(),
        &registry,
        None,
    );

    assert!(outcome.success);
    let dataset = outcome.dataset.unwrap();
    assert_eq!(dataset.format, FormatId::ResourceExport);
    let metrics = &dataset.resource.as_ref().unwrap().metrics;
    assert_eq!(metrics.cpu_usage_percent, Some(12.0));
}

#[test]
fn dataset_serializes_to_json() {
    let registry = ParserRegistry::with_defaults();
    let outcome = parse_file(
        NETWORK_EXPORT,
        "devices.csv",
        &ParseOptions::default(),
        &registry,
        None,
    );
    let dataset = outcome.dataset.unwrap();

    let json = serde_json::to_string(&dataset).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["format"], "network-devices");
    assert_eq!(parsed["rows"].as_array().unwrap().len(), 3);
    assert!(parsed["meta"]["uploaded_at"].as_str().unwrap().contains('T'));
}

#[test]
fn hint_is_evidence_not_override() {
    // A resource-export hint against a network-device file falls back to
    // auto-detection, which recovers the real format
    let registry = ParserRegistry::with_defaults();
    let outcome = parse_file(
        NETWORK_EXPORT,
        "devices.csv",
        &ParseOptions::default(),
        &registry,
        Some(FormatId::ResourceExport),
    );
    assert!(outcome.success);
    assert_eq!(outcome.detection.format, FormatId::NetworkDevices);
}

#[test]
fn row_cap_truncates_with_warning() {
    let mut content = String::from("Name,Controller Type,Status\n");
    for index in 0..50 {
        content.push_str(&format!("Device-{index},JACE,{{ok}}\n"));
    }

    let registry = ParserRegistry::with_defaults();
    let options = ParseOptions::default().with_max_rows(10);
    let outcome = parse_file(&content, "devices.csv", &options, &registry, None);
    assert!(outcome.success);
    assert_eq!(outcome.dataset.unwrap().rows.len(), 10);
    assert!(outcome.warnings.iter().any(|w| w.contains("row cap")));
}

#[test]
fn oversized_file_rejected_with_descriptive_error() {
    let registry = ParserRegistry::with_defaults();
    let options = ParseOptions::default().with_max_file_bytes(16);
    let outcome = parse_file(NETWORK_EXPORT, "devices.csv", &options, &registry, None);
    assert!(!outcome.success);
    assert!(outcome.errors[0].contains("byte limit"));
    assert!(outcome.errors[0].contains("devices.csv"));
}
