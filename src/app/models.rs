//! Data models for building-automation export processing
//!
//! This module contains the core data structures produced by the parsing
//! pipeline: typed statuses and values, per-file datasets with rows and
//! summaries, and the alert/violation records consumed by reporting.

pub mod analysis;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// =============================================================================
// Format Identity
// =============================================================================

/// Identifier for each supported export format, plus the `Unknown` sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormatId {
    /// Network-device export (CSV, Controller Type signature)
    NetworkDevices,
    /// Device-inventory export with vendor/model metadata (CSV)
    DeviceInventory,
    /// Resource/telemetry export (CSV, exactly two columns)
    ResourceExport,
    /// Hierarchical network-topology export (CSV)
    Topology,
    /// Platform/system-information text dump
    PlatformInfo,
    /// Secondary industrial-protocol device export (specified, parserless)
    ProtocolDevices,
    /// Sentinel for unrecognized content
    Unknown,
}

impl FormatId {
    /// Stable string identifier used in reports and CLI hints
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatId::NetworkDevices => "network-devices",
            FormatId::DeviceInventory => "device-inventory",
            FormatId::ResourceExport => "resource-export",
            FormatId::Topology => "topology",
            FormatId::PlatformInfo => "platform-info",
            FormatId::ProtocolDevices => "protocol-devices",
            FormatId::Unknown => "unknown",
        }
    }

    /// Parse a string identifier back into a format id
    pub fn parse(value: &str) -> Option<FormatId> {
        match value.trim().to_lowercase().as_str() {
            "network-devices" => Some(FormatId::NetworkDevices),
            "device-inventory" => Some(FormatId::DeviceInventory),
            "resource-export" => Some(FormatId::ResourceExport),
            "topology" => Some(FormatId::Topology),
            "platform-info" => Some(FormatId::PlatformInfo),
            "protocol-devices" => Some(FormatId::ProtocolDevices),
            "unknown" => Some(FormatId::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FormatId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormatId::parse(s).ok_or_else(|| format!("unrecognized format id '{s}'"))
    }
}

// =============================================================================
// Parsed Status
// =============================================================================

/// Normalized device status derived from a raw status string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Ok,
    Down,
    Alarm,
    Fault,
    Unknown,
}

impl DeviceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Ok => "ok",
            DeviceStatus::Down => "down",
            DeviceStatus::Alarm => "alarm",
            DeviceStatus::Fault => "fault",
            DeviceStatus::Unknown => "unknown",
        }
    }
}

/// Severity attached to a parsed status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Normal,
    Warning,
    Critical,
}

/// Visual variant for a status badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeVariant {
    Success,
    Warning,
    Danger,
    Neutral,
}

/// Display badge paired with a parsed status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusBadge {
    pub text: String,
    pub variant: BadgeVariant,
}

/// Fully parsed compound status. Derived deterministically from the raw
/// string; the same input always yields the same output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedStatus {
    pub status: DeviceStatus,
    pub severity: Severity,
    pub details: Vec<String>,
    pub badge: StatusBadge,
}

// =============================================================================
// Parsed Value
// =============================================================================

/// Value-kind tag for a parsed value string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Percentage,
    Memory,
    Count,
    Duration,
    Timestamp,
    Text,
}

/// Numeric-or-string payload of a parsed value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueRepr {
    Number(f64),
    Text(String),
}

/// Extra derived facts attached to some value kinds
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueMetadata {
    /// Licensed/maximum limit for capacity-with-limit values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<f64>,

    /// Computed utilization percentage where a limit is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

/// Typed value derived from a raw value string. The original formatted
/// string is preserved verbatim for display and audit purposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedValue {
    pub value: ValueRepr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub formatted: String,
    pub kind: ValueKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ValueMetadata>,
}

impl ParsedValue {
    /// Numeric view of the value, when it has one
    pub fn as_f64(&self) -> Option<f64> {
        match &self.value {
            ValueRepr::Number(n) => Some(*n),
            ValueRepr::Text(_) => None,
        }
    }
}

/// Capacity-with-limit value, e.g. `"3,303 (Limit: 5,000)"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityValue {
    pub used: u64,
    /// Reported as 0 when unlimited
    pub limit: u64,
    pub unlimited: bool,
    /// Utilization percentage; absent when unlimited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

/// Uptime/duration components extracted from free text
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UptimeValue {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub total_seconds: u64,
}

impl UptimeValue {
    /// Whole days of elapsed time
    pub fn total_days(&self) -> u64 {
        self.total_seconds / 86_400
    }
}

// =============================================================================
// Rows and Format-Specific Row Metadata
// =============================================================================

/// Communication recency quality band for an inventory device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommRecency {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl CommRecency {
    /// Classify minutes-since-last-communication into a band
    pub fn from_minutes(minutes: i64) -> Self {
        use crate::constants::{
            COMM_RECENCY_EXCELLENT_MINUTES, COMM_RECENCY_FAIR_MINUTES, COMM_RECENCY_GOOD_MINUTES,
        };
        if minutes < COMM_RECENCY_EXCELLENT_MINUTES {
            CommRecency::Excellent
        } else if minutes < COMM_RECENCY_GOOD_MINUTES {
            CommRecency::Good
        } else if minutes < COMM_RECENCY_FAIR_MINUTES {
            CommRecency::Fair
        } else {
            CommRecency::Poor
        }
    }
}

/// Device-inventory row enrichment: categorization, health recency and
/// configuration issues
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRowMeta {
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_revision: Option<String>,
    /// Timestamp extracted from the bracketed health field, normalized when
    /// parseable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comm_recency: Option<CommRecency>,
    pub configuration_issues: Vec<String>,
}

/// Topology row enrichment: hierarchy position and connection states
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyRowMeta {
    pub depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_connected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_connected: Option<bool>,
}

/// One parsed data line (or the single synthetic row of a whole-file
/// key-value format)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: String,

    /// Selection flag carried for UI consumers; always false at parse time
    pub selected: bool,

    /// Raw column-name to raw-string mapping; never mutated after creation
    pub data: HashMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ParsedStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<HashMap<String, ParsedValue>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory: Option<InventoryRowMeta>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub topology: Option<TopologyRowMeta>,
}

impl Row {
    /// Create a bare row from its raw data mapping
    pub fn new(id: impl Into<String>, data: HashMap<String, String>) -> Self {
        Self {
            id: id.into(),
            selected: false,
            data,
            status: None,
            values: None,
            inventory: None,
            topology: None,
        }
    }

    /// Trimmed, non-empty value of a column, if present. Lookup is exact
    /// first, then case-insensitive, matching the tolerance of column
    /// detection.
    pub fn field(&self, column: &str) -> Option<&str> {
        self.data
            .get(column)
            .or_else(|| {
                self.data
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(column))
                    .map(|(_, value)| value)
            })
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}

/// Ordered column definition for a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub index: usize,
}

// =============================================================================
// Summary
// =============================================================================

/// Per-status row counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusCounts {
    pub ok: usize,
    pub down: usize,
    pub alarm: usize,
    pub fault: usize,
    pub unknown: usize,
}

impl StatusCounts {
    /// Increment the counter for one status kind
    pub fn increment(&mut self, status: DeviceStatus) {
        match status {
            DeviceStatus::Ok => self.ok += 1,
            DeviceStatus::Down => self.down += 1,
            DeviceStatus::Alarm => self.alarm += 1,
            DeviceStatus::Fault => self.fault += 1,
            DeviceStatus::Unknown => self.unknown += 1,
        }
    }

    /// Devices in any non-ok, non-unknown condition
    pub fn total_problems(&self) -> usize {
        self.down + self.alarm + self.fault
    }
}

/// Per-dataset summary, derived by scanning all rows once and recomputed
/// whenever a parse completes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub total_records: usize,
    pub status_counts: StatusCounts,
    pub type_breakdown: HashMap<String, usize>,
    pub critical_findings: Vec<String>,
    pub recommendations: Vec<String>,
}

// =============================================================================
// Alerts
// =============================================================================

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

/// Alert category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCategory {
    Performance,
    Capacity,
    Security,
    Maintenance,
}

/// A single threshold- or condition-based alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub severity: AlertSeverity,
    pub category: AlertCategory,
    pub metric: String,
    /// Observed value, formatted for display
    pub value: String,
    /// Numeric view of the observed value, when it has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    pub message: String,
    pub recommendation: String,
}

/// Narrower projection of an alert, emitted only when both value and
/// threshold are numeric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdViolation {
    pub metric: String,
    pub value: f64,
    pub threshold: f64,
    pub severity: AlertSeverity,
    pub description: String,
}

// =============================================================================
// Resource Report (telemetry formats)
// =============================================================================

/// Used/free/total statistics for a memory pool, in megabytes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MemoryPoolStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_mb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_mb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_mb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_mb: Option<f64>,
}

impl MemoryPoolStats {
    /// Utilization percentage against max (preferred) or total capacity
    pub fn percent_used(&self) -> Option<f64> {
        let used = self.used_mb?;
        let capacity = self.max_mb.or(self.total_mb)?;
        if capacity <= 0.0 {
            return None;
        }
        Some(used / capacity * 100.0)
    }
}

/// Normalized metrics extracted from a resource/telemetry export
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_capacity: Option<CapacityValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_capacity: Option<CapacityValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_capacity: Option<CapacityValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_capacity: Option<CapacityValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_units_total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_units_limit: Option<f64>,
    /// Per-category kRU breakdown, keyed by category name
    pub resource_units_by_category: HashMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_queue_current: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_queue_peak: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_time_recent_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_time_peak_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_usage_percent: Option<f64>,
    pub heap: MemoryPoolStats,
    pub physical: MemoryPoolStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_usage_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<UptimeValue>,
    /// Export timestamp as reported by the platform, normalized when
    /// parseable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_time: Option<String>,
    /// version.* keys passed through verbatim
    pub versions: HashMap<String, String>,
}

/// Telemetry payload attached to resource-export datasets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceReport {
    pub metrics: ResourceMetrics,
    pub alerts: Vec<Alert>,
    /// Flattened key-to-raw-value view for consumers expecting the older
    /// shape
    pub legacy: HashMap<String, String>,
}

// =============================================================================
// Platform Report (text dumps)
// =============================================================================

/// Installed software module: `name (vendor version)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleEntry {
    pub name: String,
    pub vendor: String,
    pub version: String,
}

/// Hosted station application with its service ports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationApp {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fox_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foxs_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub https_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Installed license: `name (vendor version - expiry)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseEntry {
    pub name: String,
    pub vendor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Absent when the license never expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    pub never_expires: bool,
}

/// Installed certificate with expiry evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_until_expiry: Option<i64>,
    pub expired: bool,
}

/// Filesystem table row from a platform dump
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilesystemEntry {
    pub mount: String,
    pub free_kb: u64,
    pub total_kb: u64,
}

impl FilesystemEntry {
    /// Free space as a percentage of total
    pub fn free_percent(&self) -> Option<f64> {
        if self.total_kb == 0 {
            return None;
        }
        Some(self.free_kb as f64 / self.total_kb as f64 * 100.0)
    }
}

/// Physical RAM table row from a platform dump
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RamStats {
    pub free_kb: u64,
    pub total_kb: u64,
}

impl RamStats {
    /// Used RAM as a percentage of total
    pub fn used_percent(&self) -> Option<f64> {
        if self.total_kb == 0 {
            return None;
        }
        Some((self.total_kb - self.free_kb.min(self.total_kb)) as f64 / self.total_kb as f64 * 100.0)
    }
}

/// Structured payload attached to platform-info datasets
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlatformReport {
    /// Generic `key: value` properties found outside any section
    pub properties: HashMap<String, String>,
    pub modules: Vec<ModuleEntry>,
    pub applications: Vec<StationApp>,
    pub licenses: Vec<LicenseEntry>,
    pub certificates: Vec<CertificateEntry>,
    pub filesystems: Vec<FilesystemEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram: Option<RamStats>,
    pub alerts: Vec<Alert>,
}

// =============================================================================
// Inventory Report (device-inventory formats)
// =============================================================================

/// Aggregates attached to device-inventory datasets
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InventoryReport {
    pub by_vendor: HashMap<String, usize>,
    pub by_network: HashMap<String, usize>,
    pub by_protocol_revision: HashMap<String, usize>,
    pub poor_communication: usize,
    pub disabled: usize,
    pub cov_disabled: usize,
    pub configuration_issues: Vec<String>,
}

// =============================================================================
// Dataset
// =============================================================================

/// Metadata block carried by every dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMeta {
    pub row_count: usize,
    pub column_count: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub uploaded_at: DateTime<Utc>,
    pub file_size: usize,
    pub processing_time_ms: u64,
    pub valid: bool,
    /// Provisional parser confidence; back-filled by the orchestrator with
    /// the detection confidence once format identity is settled
    pub confidence: u8,
}

/// Top-level parse output for one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    pub source_file: String,
    pub format: FormatId,
    /// Category tag from the format spec, e.g. "telemetry"
    pub category: String,
    pub columns: Vec<ColumnDef>,
    pub rows: Vec<Row>,
    pub summary: Summary,
    pub meta: DatasetMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<PlatformReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory: Option<InventoryReport>,
    /// Raw original content, preserved for audit
    pub raw_content: String,
}
