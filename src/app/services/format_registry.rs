//! Static registry of supported export format specifications
//!
//! One immutable [`FormatSpec`] per supported format, plus the `Unknown`
//! sentinel with empty column lists. The registry is process-wide static
//! data; lookups never fail.

use crate::app::models::FormatId;
use crate::constants::columns;

/// Immutable specification of one export format's signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSpec {
    pub id: FormatId,
    pub display_name: &'static str,
    /// Category tag copied onto datasets of this format
    pub category: &'static str,
    /// Lower-case file extensions this format is exported with
    pub extensions: &'static [&'static str],
    pub required_columns: &'static [&'static str],
    pub optional_columns: &'static [&'static str],
    /// Columns whose presence identifies this format during detection
    pub identifier_columns: &'static [&'static str],
    /// Column naming each row for summaries and findings
    pub key_column: Option<&'static str>,
    pub status_column: Option<&'static str>,
    pub value_column: Option<&'static str>,
}

static NETWORK_DEVICES_SPEC: FormatSpec = FormatSpec {
    id: FormatId::NetworkDevices,
    display_name: "Network Device Export",
    category: "device-network",
    extensions: &["csv"],
    required_columns: &[columns::NAME, columns::CONTROLLER_TYPE, columns::STATUS],
    optional_columns: &[columns::ADDRESS, columns::VERSION],
    identifier_columns: &[columns::CONTROLLER_TYPE],
    key_column: Some(columns::NAME),
    status_column: Some(columns::STATUS),
    value_column: None,
};

static DEVICE_INVENTORY_SPEC: FormatSpec = FormatSpec {
    id: FormatId::DeviceInventory,
    display_name: "Device Inventory Export",
    category: "device-inventory",
    extensions: &["csv"],
    required_columns: &[columns::NAME, columns::DEVICE_ID],
    optional_columns: &[
        columns::VENDOR,
        columns::MODEL,
        columns::HEALTH,
        columns::STATUS,
        columns::NETWORK,
        columns::ENCODING,
        columns::PROTOCOL_REV,
        columns::ENABLED,
        columns::USE_COV,
    ],
    identifier_columns: &[columns::DEVICE_ID, columns::VENDOR, columns::MODEL],
    key_column: Some(columns::NAME),
    status_column: Some(columns::STATUS),
    value_column: None,
};

static RESOURCE_EXPORT_SPEC: FormatSpec = FormatSpec {
    id: FormatId::ResourceExport,
    display_name: "Resource Export",
    category: "telemetry",
    extensions: &["csv"],
    required_columns: &[columns::NAME, columns::VALUE],
    optional_columns: &[],
    identifier_columns: &[columns::NAME, columns::VALUE],
    key_column: Some(columns::NAME),
    status_column: None,
    value_column: Some(columns::VALUE),
};

static TOPOLOGY_SPEC: FormatSpec = FormatSpec {
    id: FormatId::Topology,
    display_name: "Network Topology Export",
    category: "topology",
    extensions: &["csv"],
    required_columns: &[columns::NAME, columns::PATH],
    optional_columns: &[
        columns::FOX_PORT,
        columns::PLATFORM_STATUS,
        columns::CLIENT_CONN,
        columns::SERVER_CONN,
        columns::ADDRESS,
        columns::HOST_MODEL,
        columns::VERSION,
    ],
    identifier_columns: &[columns::FOX_PORT, columns::PATH, columns::PLATFORM_STATUS],
    key_column: Some(columns::NAME),
    status_column: Some(columns::PLATFORM_STATUS),
    value_column: None,
};

static PLATFORM_INFO_SPEC: FormatSpec = FormatSpec {
    id: FormatId::PlatformInfo,
    display_name: "Platform Information Export",
    category: "platform",
    extensions: &["txt", "text", "log"],
    required_columns: &[],
    optional_columns: &[],
    identifier_columns: &[],
    key_column: None,
    status_column: None,
    value_column: None,
};

static PROTOCOL_DEVICES_SPEC: FormatSpec = FormatSpec {
    id: FormatId::ProtocolDevices,
    display_name: "Protocol Device Export",
    category: "device-inventory",
    extensions: &["csv"],
    required_columns: &[columns::DEVICE_NAME, columns::DEVICE_INSTANCE],
    optional_columns: &[
        columns::NETWORK_NUMBER,
        columns::MAC_ADDRESS,
        columns::VENDOR_ID,
    ],
    identifier_columns: &[columns::DEVICE_INSTANCE],
    key_column: Some(columns::DEVICE_NAME),
    status_column: None,
    value_column: None,
};

static UNKNOWN_SPEC: FormatSpec = FormatSpec {
    id: FormatId::Unknown,
    display_name: "Unknown Format",
    category: "unknown",
    extensions: &[],
    required_columns: &[],
    optional_columns: &[],
    identifier_columns: &[],
    key_column: None,
    status_column: None,
    value_column: None,
};

static ALL_SPECS: &[&FormatSpec] = &[
    &NETWORK_DEVICES_SPEC,
    &DEVICE_INVENTORY_SPEC,
    &RESOURCE_EXPORT_SPEC,
    &TOPOLOGY_SPEC,
    &PLATFORM_INFO_SPEC,
    &PROTOCOL_DEVICES_SPEC,
];

/// Look up the spec for a format id. Never fails; unrecognized ids get the
/// sentinel spec.
pub fn get(id: FormatId) -> &'static FormatSpec {
    ALL_SPECS
        .iter()
        .find(|spec| spec.id == id)
        .copied()
        .unwrap_or(&UNKNOWN_SPEC)
}

/// All real format specs, excluding the sentinel
pub fn list_all() -> &'static [&'static FormatSpec] {
    ALL_SPECS
}

/// Specs accepting the given file extension (case-insensitive)
pub fn for_extension(extension: &str) -> Vec<&'static FormatSpec> {
    let lower = extension.trim_start_matches('.').to_lowercase();
    ALL_SPECS
        .iter()
        .filter(|spec| spec.extensions.contains(&lower.as_str()))
        .copied()
        .collect()
}

/// Every distinct extension accepted by any registered format
pub fn known_extensions() -> Vec<&'static str> {
    let mut extensions: Vec<&'static str> = ALL_SPECS
        .iter()
        .flat_map(|spec| spec.extensions.iter().copied())
        .collect();
    extensions.sort_unstable();
    extensions.dedup();
    extensions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_known_format() {
        let spec = get(FormatId::ResourceExport);
        assert_eq!(spec.display_name, "Resource Export");
        assert_eq!(spec.required_columns, &["Name", "Value"]);
    }

    #[test]
    fn test_get_unknown_returns_sentinel() {
        let spec = get(FormatId::Unknown);
        assert_eq!(spec.id, FormatId::Unknown);
        assert!(spec.required_columns.is_empty());
    }

    #[test]
    fn test_list_all_excludes_sentinel() {
        let specs = list_all();
        assert_eq!(specs.len(), 6);
        assert!(specs.iter().all(|spec| spec.id != FormatId::Unknown));
    }

    #[test]
    fn test_for_extension() {
        let csv_specs = for_extension("csv");
        assert_eq!(csv_specs.len(), 5);
        let text_specs = for_extension(".TXT");
        assert_eq!(text_specs.len(), 1);
        assert_eq!(text_specs[0].id, FormatId::PlatformInfo);
        assert!(for_extension("pdf").is_empty());
    }

    #[test]
    fn test_known_extensions() {
        let extensions = known_extensions();
        assert!(extensions.contains(&"csv"));
        assert!(extensions.contains(&"txt"));
    }
}
