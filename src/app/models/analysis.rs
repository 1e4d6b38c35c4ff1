//! Cross-dataset analysis report structures
//!
//! The [`SystemAnalysis`] shape is intended to be serialized directly to
//! JSON for downstream reporting; every field is JSON-safe, with dates as
//! ISO-8601 strings.

use super::{
    Alert, CapacityValue, CertificateEntry, Dataset, LicenseEntry, ModuleEntry,
    ThresholdViolation, UptimeValue,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Optional named inputs to a cross-dataset analysis. Every slot may be
/// absent; each extraction step degrades gracefully to defaults.
#[derive(Debug, Clone, Default)]
pub struct AnalysisInput {
    pub platform: Option<Dataset>,
    pub resources: Option<Dataset>,
    pub device_inventory: Option<Dataset>,
    pub network_devices: Option<Dataset>,
    pub topology: Option<Dataset>,
    pub protocol_inventory: Option<Dataset>,
}

impl AnalysisInput {
    /// Number of supplied inputs
    pub fn files_supplied(&self) -> usize {
        [
            self.platform.is_some(),
            self.resources.is_some(),
            self.device_inventory.is_some(),
            self.network_devices.is_some(),
            self.topology.is_some(),
            self.protocol_inventory.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }
}

/// Analysis metadata: provenance and confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub generated_at: DateTime<Utc>,
    pub version: String,
    pub files_processed: usize,
    pub processing_time_ms: u64,
    /// Weighted presence of the optional inputs, 0-100
    pub confidence: u8,
}

/// Platform identity facts extracted from a platform-info dataset
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlatformIdentity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daemon_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_support: Option<String>,
}

/// Engine queue depth statistics
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueueStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak: Option<u64>,
}

/// Memory pool view carried in the analysis report
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MemoryUtilization {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_mb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_mb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_used: Option<f64>,
}

/// Resource utilization facts extracted from a resource/telemetry dataset
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceUtilization {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_percent: Option<f64>,
    pub heap: MemoryUtilization,
    pub memory: MemoryUtilization,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_capacity: Option<CapacityValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_capacity: Option<CapacityValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_units_total: Option<f64>,
    pub resource_units_by_category: HashMap<String, f64>,
    pub engine_queue: QueueStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_time_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_time_peak_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<UptimeValue>,
}

/// Network inventory facts merged from the device-bearing datasets
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NetworkInventory {
    pub total_devices: usize,
    pub down_devices: usize,
    pub alarm_devices: usize,
    pub fault_devices: usize,
    pub by_vendor: HashMap<String, usize>,
    pub by_network: HashMap<String, usize>,
    pub by_type: HashMap<String, usize>,
}

/// License facts
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LicenseInfo {
    pub count: usize,
    pub licenses: Vec<LicenseEntry>,
}

/// Driver/network-integration facts
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DriverInfo {
    pub count: usize,
    pub drivers: Vec<String>,
}

/// Installed module facts
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub count: usize,
    pub modules: Vec<ModuleEntry>,
}

/// Certificate facts
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CertificateInfo {
    pub count: usize,
    pub certificates: Vec<CertificateEntry>,
    pub expired: usize,
    pub expiring_soon: usize,
}

/// Alert accumulators for one analysis call
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlertsBundle {
    pub alerts: Vec<Alert>,
    pub violations: Vec<ThresholdViolation>,
    pub recommendations: Vec<String>,
}

/// Deployment role of the analyzed system, inferred from product-name
/// substrings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SystemType {
    Supervisor,
    Workstation,
    EmbeddedController,
}

impl Default for SystemType {
    fn default() -> Self {
        SystemType::EmbeddedController
    }
}

/// Top-level summary of an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub system_type: SystemType,
    pub total_devices: usize,
    /// 0-100; starts at 100 and is reduced per alert
    pub health_score: u8,
    pub critical_count: usize,
    pub warning_count: usize,
    /// Max of device and point capacity utilization
    pub capacity_utilization_percent: f64,
    /// Top recommended actions, most important first
    pub recommended_actions: Vec<String>,
}

/// Unified cross-dataset health report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemAnalysis {
    pub metadata: AnalysisMetadata,
    pub platform: PlatformIdentity,
    pub resources: ResourceUtilization,
    pub inventory: NetworkInventory,
    pub licenses: LicenseInfo,
    pub drivers: DriverInfo,
    pub modules: ModuleInfo,
    pub certificates: CertificateInfo,
    pub alerts: AlertsBundle,
    pub summary: AnalysisSummary,
}
