//! Application constants for the BAS processor
//!
//! This module contains all configuration constants, default values,
//! threshold tables and vocabularies used throughout the processor.

// =============================================================================
// Ingestion Caps
// =============================================================================

/// Maximum number of data rows ingested from a single file before the
/// tokenizer stops early (without erroring)
pub const DEFAULT_MAX_ROWS: usize = 100_000;

/// Maximum file size in bytes; larger files are rejected before tokenizing
pub const DEFAULT_MAX_FILE_BYTES: usize = 50 * 1024 * 1024;

// =============================================================================
// Detection Scores
// =============================================================================

/// A detection method scoring at or above this short-circuits the rest
pub const HIGH_CONFIDENCE: u8 = 90;

/// A validated user hint scoring at or above this is accepted outright
pub const HINT_ACCEPT_CONFIDENCE: u8 = 80;

/// Below this detection confidence the orchestrator may attempt the
/// resource-export parser as a last-resort fallback
pub const FALLBACK_CONFIDENCE_CEILING: u8 = 70;

/// Confidence granted when the filename alone suggests a platform dump
pub const PLATFORM_FILENAME_CONFIDENCE: u8 = 60;

/// Confidence contributed per platform-text keyword match
pub const PLATFORM_KEYWORD_SCORE: u8 = 20;

// =============================================================================
// Parser Confidence
// =============================================================================

/// Fixed per-format parser confidence, reflecting how distinctive each
/// format's signature is. Back-filled by the orchestrator with the
/// detection confidence once format identity is settled.
pub mod parser_confidence {
    pub const RESOURCE_EXPORT: u8 = 100;
    pub const NETWORK_DEVICES: u8 = 85;
    pub const DEVICE_INVENTORY: u8 = 85;
    pub const TOPOLOGY: u8 = 85;
    pub const PLATFORM_INFO: u8 = 98;
}

// =============================================================================
// Threshold Table
// =============================================================================

/// Authoritative alerting thresholds.
///
/// Both the resource-export parser and the cross-dataset analyzer read this
/// table; there is deliberately no second (legacy) set of values.
pub mod thresholds {
    /// CPU usage percentage warning / critical
    pub const CPU_WARNING_PERCENT: f64 = 70.0;
    pub const CPU_CRITICAL_PERCENT: f64 = 80.0;

    /// Java heap usage percentage warning / critical
    pub const HEAP_WARNING_PERCENT: f64 = 75.0;
    pub const HEAP_CRITICAL_PERCENT: f64 = 90.0;

    /// Physical memory usage percentage warning / critical
    pub const MEMORY_WARNING_PERCENT: f64 = 80.0;
    pub const MEMORY_CRITICAL_PERCENT: f64 = 90.0;

    /// Licensed device/point capacity utilization warning / critical
    pub const CAPACITY_WARNING_PERCENT: f64 = 80.0;
    pub const CAPACITY_CRITICAL_PERCENT: f64 = 90.0;

    /// History count above which embedded-class controllers struggle
    pub const HISTORY_WARNING_COUNT: u64 = 6000;

    /// Engine scan time warning in milliseconds
    pub const SCAN_TIME_WARNING_MS: f64 = 500.0;

    /// Uptime beyond which a maintenance restart is recommended
    pub const UPTIME_WARNING_DAYS: u64 = 365;

    /// Certificates expiring within this many days draw a warning
    pub const CERT_EXPIRY_WARNING_DAYS: i64 = 30;

    /// Minimum free disk percentage by deployment class
    pub const DISK_FREE_MIN_EMBEDDED_PERCENT: f64 = 20.0;
    pub const DISK_FREE_MIN_SERVER_PERCENT: f64 = 10.0;
}

// =============================================================================
// Health Score
// =============================================================================

/// Health score penalty per critical alert
pub const HEALTH_PENALTY_CRITICAL: i32 = 15;

/// Health score penalty per warning alert
pub const HEALTH_PENALTY_WARNING: i32 = 5;

/// Maximum number of recommended actions carried in the analysis summary
pub const MAX_RECOMMENDED_ACTIONS: usize = 5;

/// Confidence weights for the six optional analyzer inputs, in slot order:
/// platform, resources, device inventory, network devices, topology,
/// protocol inventory
pub const ANALYSIS_CONFIDENCE_WEIGHTS: [u8; 6] = [25, 25, 15, 15, 10, 10];

// =============================================================================
// Column Name Constants
// =============================================================================

/// Column names as they appear in the vendor CSV exports
pub mod columns {
    pub const NAME: &str = "Name";
    pub const VALUE: &str = "Value";
    pub const STATUS: &str = "Status";
    pub const ADDRESS: &str = "Address";
    pub const CONTROLLER_TYPE: &str = "Controller Type";
    pub const DEVICE_ID: &str = "Device ID";
    pub const VENDOR: &str = "Vendor";
    pub const MODEL: &str = "Model";
    pub const HEALTH: &str = "Health";
    pub const ENCODING: &str = "Encoding";
    pub const PROTOCOL_REV: &str = "Protocol Rev";
    pub const NETWORK: &str = "Network";
    pub const ENABLED: &str = "Enabled";
    pub const USE_COV: &str = "Use Cov";
    pub const FOX_PORT: &str = "Fox Port";
    pub const PATH: &str = "Path";
    pub const PLATFORM_STATUS: &str = "Platform Status";
    pub const CLIENT_CONN: &str = "Client Conn";
    pub const SERVER_CONN: &str = "Server Conn";
    pub const HOST_MODEL: &str = "Host Model";
    pub const VERSION: &str = "Version";
    pub const TYPE: &str = "Type";
    pub const CATEGORY: &str = "Category";
    pub const DEVICE_NAME: &str = "Device Name";
    pub const DEVICE_INSTANCE: &str = "Device Instance";
    pub const NETWORK_NUMBER: &str = "Network Number";
    pub const MAC_ADDRESS: &str = "MAC Address";
    pub const VENDOR_ID: &str = "Vendor ID";
}

/// Ordered list of candidate columns probed for a row's type breakdown;
/// the first present value wins
pub const TYPE_BREAKDOWN_COLUMNS: &[&str] = &[
    columns::TYPE,
    columns::CONTROLLER_TYPE,
    columns::MODEL,
    columns::CATEGORY,
];

// =============================================================================
// Status Vocabulary
// =============================================================================

/// Condition flags recognized inside compound status strings. Scanned as
/// substrings when no brace-delimited flag set is present.
pub const STATUS_FLAGS: &[&str] = &[
    "ok",
    "down",
    "alarm",
    "fault",
    "unackedalarm",
    "connected",
    "disconnected",
    "online",
    "offline",
];

/// Maximum badge text length for unrecognized statuses before truncation
pub const STATUS_BADGE_MAX_LEN: usize = 10;

// =============================================================================
// Device Categorization
// =============================================================================

/// Equipment category keywords matched against device names (and then
/// models). Checked in order; first match wins. "Control Panel" precedes
/// "Controller" so panel names are not swallowed by the broader keyword.
pub const DEVICE_CATEGORY_KEYWORDS: &[&str] = &[
    "AHU",
    "VAV",
    "Chiller",
    "Boiler",
    "Fan",
    "Pump",
    "Control Panel",
    "Controller",
];

/// Category assigned when no keyword matches
pub const DEVICE_CATEGORY_DEFAULT: &str = "General Equipment";

// =============================================================================
// Communication Recency Bands (minutes)
// =============================================================================

pub const COMM_RECENCY_EXCELLENT_MINUTES: i64 = 5;
pub const COMM_RECENCY_GOOD_MINUTES: i64 = 30;
pub const COMM_RECENCY_FAIR_MINUTES: i64 = 120;

// =============================================================================
// Platform Text Detection
// =============================================================================

/// Keyword phrases scanned for in plain-text platform dumps
pub const PLATFORM_KEYWORDS: &[&str] = &[
    "Platform summary",
    "Daemon Version:",
    "Niagara Runtime:",
    "Operating System:",
    "Modules",
];

/// Long-term-support runtime release lines; a runtime version outside these
/// lines draws a maintenance warning
pub const LTS_RUNTIME_LINES: &[&str] = &["4.4", "4.8", "4.10", "4.12", "4.14"];

// =============================================================================
// Protocol Constants
// =============================================================================

/// Valid instance range for industrial-protocol device ids. Out-of-range ids
/// are downgraded to warnings, never hard errors.
pub const PROTOCOL_DEVICE_ID_MAX: u64 = 4_194_303;

// =============================================================================
// Helper Functions
// =============================================================================

/// Classify communication recency in minutes into a quality band name
pub fn comm_recency_band(minutes: i64) -> &'static str {
    if minutes < COMM_RECENCY_EXCELLENT_MINUTES {
        "excellent"
    } else if minutes < COMM_RECENCY_GOOD_MINUTES {
        "good"
    } else if minutes < COMM_RECENCY_FAIR_MINUTES {
        "fair"
    } else {
        "poor"
    }
}

/// Check whether a runtime version string belongs to an LTS release line
pub fn is_lts_runtime(version: &str) -> bool {
    let trimmed = version.trim();
    LTS_RUNTIME_LINES
        .iter()
        .any(|line| trimmed == *line || trimmed.starts_with(&format!("{line}.")))
}

/// Categorize a device by its name, falling back to its model
pub fn categorize_device(name: &str, model: Option<&str>) -> &'static str {
    let name_lower = name.to_lowercase();
    for keyword in DEVICE_CATEGORY_KEYWORDS {
        if name_lower.contains(&keyword.to_lowercase()) {
            return keyword;
        }
    }
    if let Some(model) = model {
        let model_lower = model.to_lowercase();
        for keyword in DEVICE_CATEGORY_KEYWORDS {
            if model_lower.contains(&keyword.to_lowercase()) {
                return keyword;
            }
        }
    }
    DEVICE_CATEGORY_DEFAULT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comm_recency_bands() {
        assert_eq!(comm_recency_band(0), "excellent");
        assert_eq!(comm_recency_band(4), "excellent");
        assert_eq!(comm_recency_band(5), "good");
        assert_eq!(comm_recency_band(29), "good");
        assert_eq!(comm_recency_band(30), "fair");
        assert_eq!(comm_recency_band(119), "fair");
        assert_eq!(comm_recency_band(120), "poor");
        assert_eq!(comm_recency_band(100_000), "poor");
    }

    #[test]
    fn test_lts_runtime_detection() {
        assert!(is_lts_runtime("4.10.0.154"));
        assert!(is_lts_runtime("4.4.73.24"));
        assert!(!is_lts_runtime("4.9.0.198"));
        assert!(!is_lts_runtime("3.8.401"));
    }

    #[test]
    fn test_device_categorization() {
        assert_eq!(categorize_device("AHU-01 Supply", None), "AHU");
        assert_eq!(categorize_device("VAV_3_12", None), "VAV");
        assert_eq!(categorize_device("Main Chiller", None), "Chiller");
        // Name match wins over model match
        assert_eq!(categorize_device("Boiler Room Panel", Some("VAV-100")), "Boiler");
        // Model considered when the name is uninformative
        assert_eq!(categorize_device("Unit 7", Some("Fan Coil 200")), "Fan");
        assert_eq!(categorize_device("Device 9", None), DEVICE_CATEGORY_DEFAULT);
    }

    #[test]
    fn test_control_panel_precedes_controller() {
        assert_eq!(categorize_device("East Wing Control Panel", None), "Control Panel");
        assert_eq!(categorize_device("Zone Controller 4", None), "Controller");
    }
}
