//! Tests for the device-inventory export parser

use super::options;
use crate::app::models::{CommRecency, FormatId};
use crate::app::services::parsers::device_inventory;
use chrono::{Duration, Utc};

fn health_field(minutes_ago: i64) -> String {
    let timestamp = Utc::now().naive_utc() - Duration::minutes(minutes_ago);
    format!("Ok [{}]", timestamp.format("%Y-%m-%d %H:%M:%S"))
}

#[test]
fn test_parse_inventory_with_metadata() {
    let content = format!(
        "Name,Device ID,Vendor,Model,Health,Network,Protocol Rev,Enabled,Use Cov\n\
         AHU-01,1001,Acme Controls,AC-900,{},BacnetNetwork,14,true,true\n\
         VAV-12,1002,Acme Controls,AC-100,{},BacnetNetwork,14,false,false\n",
        health_field(2),
        health_field(300),
    );

    let dataset = device_inventory::parse(&content, "inventory.csv", &options()).unwrap();
    assert_eq!(dataset.format, FormatId::DeviceInventory);
    assert_eq!(dataset.rows.len(), 2);

    let first = dataset.rows[0].inventory.as_ref().unwrap();
    assert_eq!(first.category, "AHU");
    assert_eq!(first.vendor.as_deref(), Some("Acme Controls"));
    assert_eq!(first.comm_recency, Some(CommRecency::Excellent));
    assert!(first.configuration_issues.is_empty());

    let second = dataset.rows[1].inventory.as_ref().unwrap();
    assert_eq!(second.category, "VAV");
    assert_eq!(second.comm_recency, Some(CommRecency::Poor));
    assert!(
        second
            .configuration_issues
            .contains(&"Poor communication health".to_string())
    );
    assert!(
        second
            .configuration_issues
            .contains(&"Device disabled".to_string())
    );
    assert!(
        second
            .configuration_issues
            .contains(&"COV subscriptions disabled".to_string())
    );
}

#[test]
fn test_dataset_aggregates() {
    let content = format!(
        "Name,Device ID,Vendor,Model,Health,Network,Protocol Rev\n\
         AHU-01,1,Acme,A,{},NetA,14\n\
         VAV-02,2,Acme,B,{},NetA,14\n\
         CHW-03,3,Zen,C,{},NetB,12\n",
        health_field(1),
        health_field(1),
        health_field(500),
    );

    let dataset = device_inventory::parse(&content, "inventory.csv", &options()).unwrap();
    let report = dataset.inventory.as_ref().unwrap();
    assert_eq!(report.by_vendor.get("Acme"), Some(&2));
    assert_eq!(report.by_vendor.get("Zen"), Some(&1));
    assert_eq!(report.by_network.get("NetA"), Some(&2));
    assert_eq!(report.by_protocol_revision.get("14"), Some(&2));
    assert_eq!(report.poor_communication, 1);
    assert!(
        report
            .configuration_issues
            .iter()
            .any(|issue| issue.contains("poor communication"))
    );
}

#[test]
fn test_name_match_takes_priority_over_model() {
    let content = "Name,Device ID,Model\nBoiler Plant 1,1,VAV-900\n";
    let dataset = device_inventory::parse(content, "inventory.csv", &options()).unwrap();
    let meta = dataset.rows[0].inventory.as_ref().unwrap();
    assert_eq!(meta.category, "Boiler");
}

#[test]
fn test_missing_columns_downgrade_to_warnings() {
    let content = "Name,Vendor\nAHU-1,Acme\n";
    let dataset = device_inventory::parse(content, "inventory.csv", &options()).unwrap();
    assert!(
        dataset
            .meta
            .warnings
            .iter()
            .any(|warning| warning.contains("Device ID"))
    );
    assert_eq!(dataset.rows.len(), 1);
}

#[test]
fn test_strict_option_escalates_missing_columns() {
    let content = "Name,Vendor\nAHU-1,Acme\n";
    let strict = options().with_strict_validation(true);
    assert!(device_inventory::parse(content, "inventory.csv", &strict).is_err());
}

#[test]
fn test_out_of_range_device_ids_warn() {
    let content = "Name,Device ID\nAHU-1,4194310\n";
    let dataset = device_inventory::parse(content, "inventory.csv", &options()).unwrap();
    assert!(
        dataset
            .meta
            .warnings
            .iter()
            .any(|warning| warning.contains("exceed the protocol maximum"))
    );
}
