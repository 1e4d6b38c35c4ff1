//! Tests for the topology export parser

use super::options;
use crate::app::models::{DeviceStatus, FormatId};
use crate::app::services::parsers::topology;

const SAMPLE: &str = "\
Name,Path,Fox Port,Platform Status,Client Conn,Server Conn
Supervisor,/,1911,{ok},Connected,Connected
JACE-North,/Drivers/NiagaraNetwork/JACE-North,1911,{ok},Connected,Not connected
JACE-South,/Drivers/NiagaraNetwork/JACE-South,1911,\"{down}\",Not connected,Not connected
";

#[test]
fn test_parse_topology() {
    let dataset = topology::parse(SAMPLE, "topology.csv", &options()).unwrap();
    assert_eq!(dataset.format, FormatId::Topology);
    assert_eq!(dataset.rows.len(), 3);

    let north = &dataset.rows[1];
    let meta = north.topology.as_ref().unwrap();
    assert_eq!(meta.depth, 3);
    assert_eq!(meta.parent_path.as_deref(), Some("/Drivers/NiagaraNetwork"));
    assert_eq!(meta.client_connected, Some(true));
    assert_eq!(meta.server_connected, Some(false));
}

#[test]
fn test_root_has_no_parent() {
    let dataset = topology::parse(SAMPLE, "topology.csv", &options()).unwrap();
    let root = dataset.rows[0].topology.as_ref().unwrap();
    assert_eq!(root.depth, 0);
    assert_eq!(root.parent_path, None);
}

#[test]
fn test_platform_status_drives_summary() {
    let dataset = topology::parse(SAMPLE, "topology.csv", &options()).unwrap();
    assert_eq!(dataset.summary.status_counts.ok, 2);
    assert_eq!(dataset.summary.status_counts.down, 1);
    assert_eq!(
        dataset.rows[2].status.as_ref().unwrap().status,
        DeviceStatus::Down
    );
    assert_eq!(dataset.summary.critical_findings.len(), 1);
    assert!(dataset.summary.critical_findings[0].starts_with("JACE-South:"));
}

#[test]
fn test_lenient_about_missing_columns() {
    let content = "Name,Fox Port\nJ1,1911\n";
    let dataset = topology::parse(content, "topology.csv", &options()).unwrap();
    assert!(
        dataset
            .meta
            .warnings
            .iter()
            .any(|warning| warning.contains("Path"))
    );
}
