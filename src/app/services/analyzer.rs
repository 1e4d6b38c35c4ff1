//! Cross-dataset analysis and alerting
//!
//! Combines up to six parsed datasets into a unified health report.
//! Accumulators are call-scoped: every `analyze` call starts from empty
//! alert, violation and recommendation lists, so no state leaks between
//! calls. Each extraction step tolerates its source dataset being absent
//! and degrades to defaults rather than failing the whole analysis.

use crate::app::models::analysis::{
    AlertsBundle, AnalysisInput, AnalysisMetadata, AnalysisSummary, CertificateInfo, DriverInfo,
    LicenseInfo, MemoryUtilization, ModuleInfo, NetworkInventory, PlatformIdentity, QueueStats,
    ResourceUtilization, SystemAnalysis, SystemType,
};
use crate::app::models::{
    Alert, AlertCategory, AlertSeverity, Dataset, ResourceMetrics, ThresholdViolation,
};
use crate::constants::{
    ANALYSIS_CONFIDENCE_WEIGHTS, HEALTH_PENALTY_CRITICAL, HEALTH_PENALTY_WARNING,
    MAX_RECOMMENDED_ACTIONS, is_lts_runtime, thresholds,
};
use chrono::Utc;
use std::collections::HashMap;
use std::time::Instant;
use tracing::debug;

/// Build a unified system analysis from whatever datasets are supplied
pub fn analyze(input: &AnalysisInput) -> SystemAnalysis {
    let started = Instant::now();
    let mut analyzer = Analyzer::default();

    let platform = analyzer.extract_platform(input.platform.as_ref());
    let system_type = classify_system(platform.product.as_deref());
    let resources = analyzer.extract_resources(input.resources.as_ref(), system_type);
    let inventory = analyzer.extract_inventory(input);
    let licenses = analyzer.extract_licenses(input.platform.as_ref());
    let drivers = extract_drivers(input);
    let modules = extract_modules(input.platform.as_ref());
    let certificates = analyzer.extract_certificates(input.platform.as_ref());

    let critical_count = analyzer.count_severity(AlertSeverity::Critical);
    let warning_count = analyzer.count_severity(AlertSeverity::Warning);
    let health_score = health_score(critical_count, warning_count);

    let capacity_utilization_percent = [
        resources.device_capacity.as_ref().and_then(|c| c.percentage),
        resources.point_capacity.as_ref().and_then(|c| c.percentage),
    ]
    .into_iter()
    .flatten()
    .fold(0.0_f64, f64::max);

    let mut recommended_actions = analyzer.recommendations.clone();
    recommended_actions.truncate(MAX_RECOMMENDED_ACTIONS);

    let summary = AnalysisSummary {
        system_type,
        total_devices: inventory.total_devices,
        health_score,
        critical_count,
        warning_count,
        capacity_utilization_percent,
        recommended_actions,
    };

    debug!(
        "Analysis complete: health {}, {} critical, {} warning",
        health_score, critical_count, warning_count
    );

    SystemAnalysis {
        metadata: AnalysisMetadata {
            generated_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            files_processed: input.files_supplied(),
            processing_time_ms: started.elapsed().as_millis() as u64,
            confidence: input_confidence(input),
        },
        platform,
        resources,
        inventory,
        licenses,
        drivers,
        modules,
        certificates,
        alerts: AlertsBundle {
            alerts: analyzer.alerts,
            violations: analyzer.violations,
            recommendations: analyzer.recommendations,
        },
        summary,
    }
}

/// Health score formula: start at 100, subtract fixed penalties per alert,
/// clamp to 0-100
pub fn health_score(critical_count: usize, warning_count: usize) -> u8 {
    (100 - HEALTH_PENALTY_CRITICAL * critical_count as i32
        - HEALTH_PENALTY_WARNING * warning_count as i32)
        .clamp(0, 100) as u8
}

/// Weighted presence of the six optional inputs, normalized to a max of 100
fn input_confidence(input: &AnalysisInput) -> u8 {
    let present = [
        input.platform.is_some(),
        input.resources.is_some(),
        input.device_inventory.is_some(),
        input.network_devices.is_some(),
        input.topology.is_some(),
        input.protocol_inventory.is_some(),
    ];
    let score: u32 = present
        .iter()
        .zip(ANALYSIS_CONFIDENCE_WEIGHTS)
        .filter(|(present, _)| **present)
        .map(|(_, weight)| weight as u32)
        .sum();
    score.min(100) as u8
}

fn classify_system(product: Option<&str>) -> SystemType {
    let Some(product) = product else {
        return SystemType::EmbeddedController;
    };
    let lower = product.to_lowercase();
    if lower.contains("supervisor") {
        SystemType::Supervisor
    } else if lower.contains("workstation") {
        SystemType::Workstation
    } else {
        SystemType::EmbeddedController
    }
}

/// Call-scoped accumulator state
#[derive(Debug, Default)]
struct Analyzer {
    alerts: Vec<Alert>,
    violations: Vec<ThresholdViolation>,
    recommendations: Vec<String>,
    seq: usize,
}

impl Analyzer {
    /// Append an alert, its threshold violation when both value and
    /// threshold are numeric, and its recommendation (deduplicated by
    /// exact string equality)
    #[allow(clippy::too_many_arguments)]
    fn add_alert(
        &mut self,
        severity: AlertSeverity,
        category: AlertCategory,
        metric: &str,
        value: String,
        numeric_value: Option<f64>,
        threshold: Option<f64>,
        message: String,
        recommendation: String,
    ) {
        self.seq += 1;
        if let (Some(numeric), Some(threshold)) = (numeric_value, threshold) {
            self.violations.push(ThresholdViolation {
                metric: metric.to_string(),
                value: numeric,
                threshold,
                severity,
                description: message.clone(),
            });
        }
        if !self.recommendations.contains(&recommendation) {
            self.recommendations.push(recommendation.clone());
        }
        self.alerts.push(Alert {
            id: format!("analysis-{}", self.seq),
            timestamp: Utc::now(),
            severity,
            category,
            metric: metric.to_string(),
            value,
            numeric_value,
            threshold,
            message,
            recommendation,
        });
    }

    fn count_severity(&self, severity: AlertSeverity) -> usize {
        self.alerts
            .iter()
            .filter(|alert| alert.severity == severity)
            .count()
    }

    // =========================================================================
    // Extraction Steps
    // =========================================================================

    fn extract_platform(&mut self, dataset: Option<&Dataset>) -> PlatformIdentity {
        let Some(report) = dataset.and_then(|d| d.platform.as_ref()) else {
            return PlatformIdentity::default();
        };

        let property = |key: &str| report.properties.get(key).cloned();
        let identity = PlatformIdentity {
            host_id: property("Host ID"),
            model: property("Model"),
            product: property("Product"),
            runtime_version: property("Niagara Runtime"),
            daemon_version: property("Daemon Version"),
            operating_system: property("Operating System"),
            architecture: property("Architecture"),
            tls_support: property("Platform TLS Support"),
        };

        if let Some(tls) = &identity.tls_support {
            let lower = tls.to_lowercase();
            if lower == "none" || lower == "disabled" {
                self.add_alert(
                    AlertSeverity::Critical,
                    AlertCategory::Security,
                    "platform.tls",
                    tls.clone(),
                    None,
                    None,
                    "Platform TLS support is disabled".to_string(),
                    "Enable TLS on the platform daemon".to_string(),
                );
            }
        }

        if let Some(runtime) = &identity.runtime_version {
            if !is_lts_runtime(runtime) {
                self.add_alert(
                    AlertSeverity::Warning,
                    AlertCategory::Maintenance,
                    "platform.runtime",
                    runtime.clone(),
                    None,
                    None,
                    format!("Runtime {runtime} is not a long-term-support release"),
                    "Plan an upgrade to an LTS runtime release".to_string(),
                );
            }
        }

        identity
    }

    fn extract_resources(
        &mut self,
        dataset: Option<&Dataset>,
        system_type: SystemType,
    ) -> ResourceUtilization {
        let Some(report) = dataset.and_then(|d| d.resource.as_ref()) else {
            return ResourceUtilization::default();
        };
        let metrics = &report.metrics;

        let utilization = ResourceUtilization {
            cpu_percent: metrics.cpu_usage_percent,
            heap: MemoryUtilization {
                used_mb: metrics.heap.used_mb,
                total_mb: metrics.heap.max_mb.or(metrics.heap.total_mb),
                percent_used: metrics.heap.percent_used(),
            },
            memory: MemoryUtilization {
                used_mb: metrics.physical.used_mb,
                total_mb: metrics.physical.total_mb,
                percent_used: metrics.physical.percent_used(),
            },
            device_capacity: metrics.device_capacity.clone(),
            point_capacity: metrics.point_capacity.clone(),
            history_count: metrics.history_count,
            resource_units_total: metrics.resource_units_total,
            resource_units_by_category: metrics.resource_units_by_category.clone(),
            engine_queue: QueueStats {
                current: metrics.engine_queue_current,
                peak: metrics.engine_queue_peak,
            },
            scan_time_ms: metrics.scan_time_recent_ms,
            scan_time_peak_ms: metrics.scan_time_peak_ms,
            uptime: metrics.uptime.clone(),
        };

        self.evaluate_resource_thresholds(metrics, system_type);
        utilization
    }

    fn evaluate_resource_thresholds(&mut self, metrics: &ResourceMetrics, system_type: SystemType) {
        if let Some(cpu) = metrics.cpu_usage_percent {
            if cpu >= thresholds::CPU_CRITICAL_PERCENT {
                self.add_alert(
                    AlertSeverity::Critical,
                    AlertCategory::Performance,
                    "cpu.usage",
                    format!("{cpu:.1}%"),
                    Some(cpu),
                    Some(thresholds::CPU_CRITICAL_PERCENT),
                    format!("CPU usage at {cpu:.1}% exceeds the critical threshold"),
                    "Investigate runaway logic or reduce station load".to_string(),
                );
            } else if cpu >= thresholds::CPU_WARNING_PERCENT {
                self.add_alert(
                    AlertSeverity::Warning,
                    AlertCategory::Performance,
                    "cpu.usage",
                    format!("{cpu:.1}%"),
                    Some(cpu),
                    Some(thresholds::CPU_WARNING_PERCENT),
                    format!("CPU usage at {cpu:.1}% is elevated"),
                    "Review station load and polling rates".to_string(),
                );
            }
        }

        if let Some(percent) = metrics.heap.percent_used() {
            if percent >= thresholds::HEAP_CRITICAL_PERCENT {
                self.add_alert(
                    AlertSeverity::Critical,
                    AlertCategory::Performance,
                    "heap.used",
                    format!("{percent:.1}%"),
                    Some(percent),
                    Some(thresholds::HEAP_CRITICAL_PERCENT),
                    format!("Heap usage at {percent:.1}% risks out-of-memory restarts"),
                    "Increase the heap allocation or reduce station size".to_string(),
                );
            } else if percent >= thresholds::HEAP_WARNING_PERCENT {
                self.add_alert(
                    AlertSeverity::Warning,
                    AlertCategory::Performance,
                    "heap.used",
                    format!("{percent:.1}%"),
                    Some(percent),
                    Some(thresholds::HEAP_WARNING_PERCENT),
                    format!("Heap usage at {percent:.1}% is elevated"),
                    "Monitor heap growth over time".to_string(),
                );
            }
        }

        if let Some(percent) = metrics.physical.percent_used() {
            if percent >= thresholds::MEMORY_CRITICAL_PERCENT {
                self.add_alert(
                    AlertSeverity::Critical,
                    AlertCategory::Performance,
                    "mem.used",
                    format!("{percent:.1}%"),
                    Some(percent),
                    Some(thresholds::MEMORY_CRITICAL_PERCENT),
                    format!("Physical memory usage at {percent:.1}% is critical"),
                    "Reduce installed services or upgrade the controller".to_string(),
                );
            } else if percent >= thresholds::MEMORY_WARNING_PERCENT {
                self.add_alert(
                    AlertSeverity::Warning,
                    AlertCategory::Performance,
                    "mem.used",
                    format!("{percent:.1}%"),
                    Some(percent),
                    Some(thresholds::MEMORY_WARNING_PERCENT),
                    format!("Physical memory usage at {percent:.1}% is elevated"),
                    "Monitor memory headroom".to_string(),
                );
            }
        }

        for (metric, capacity) in [
            ("globalCapacity.devices", metrics.device_capacity.as_ref()),
            ("globalCapacity.points", metrics.point_capacity.as_ref()),
        ] {
            let Some(percent) = capacity.and_then(|c| c.percentage) else {
                continue;
            };
            if percent >= thresholds::CAPACITY_CRITICAL_PERCENT {
                self.add_alert(
                    AlertSeverity::Critical,
                    AlertCategory::Capacity,
                    metric,
                    format!("{percent:.1}%"),
                    Some(percent),
                    Some(thresholds::CAPACITY_CRITICAL_PERCENT),
                    format!("License capacity for {metric} at {percent:.1}% is nearly exhausted"),
                    "Purchase additional capacity before adding devices".to_string(),
                );
            } else if percent >= thresholds::CAPACITY_WARNING_PERCENT {
                self.add_alert(
                    AlertSeverity::Warning,
                    AlertCategory::Capacity,
                    metric,
                    format!("{percent:.1}%"),
                    Some(percent),
                    Some(thresholds::CAPACITY_WARNING_PERCENT),
                    format!("License capacity for {metric} at {percent:.1}% is approaching its limit"),
                    "Plan a capacity upgrade".to_string(),
                );
            }
        }

        // The history comfort limit only applies to embedded controllers;
        // supervisor-class hosts handle far larger archives
        if system_type == SystemType::EmbeddedController {
            if let Some(histories) = metrics.history_count {
                if histories > thresholds::HISTORY_WARNING_COUNT {
                    self.add_alert(
                        AlertSeverity::Warning,
                        AlertCategory::Capacity,
                        "history.count",
                        histories.to_string(),
                        Some(histories as f64),
                        Some(thresholds::HISTORY_WARNING_COUNT as f64),
                        format!("{histories} histories exceed the embedded-controller comfort limit"),
                        "Archive or thin old histories, or move them to a supervisor".to_string(),
                    );
                }
            }
        }

        if let Some(scan) = metrics.scan_time_recent_ms {
            if scan > thresholds::SCAN_TIME_WARNING_MS {
                self.add_alert(
                    AlertSeverity::Warning,
                    AlertCategory::Performance,
                    "engine.scan.recent",
                    format!("{scan:.0} ms"),
                    Some(scan),
                    Some(thresholds::SCAN_TIME_WARNING_MS),
                    format!("Engine scan time of {scan:.0} ms indicates an overloaded station"),
                    "Profile heavy components and stagger polling".to_string(),
                );
            }
        }

        if let Some(uptime) = &metrics.uptime {
            let days = uptime.total_days();
            if days > thresholds::UPTIME_WARNING_DAYS {
                self.add_alert(
                    AlertSeverity::Warning,
                    AlertCategory::Maintenance,
                    "time.uptime",
                    format!("{days} days"),
                    Some(days as f64),
                    Some(thresholds::UPTIME_WARNING_DAYS as f64),
                    format!("Station has run {days} days without a restart"),
                    "Schedule a maintenance restart window".to_string(),
                );
            }
        }
    }

    fn extract_inventory(&mut self, input: &AnalysisInput) -> NetworkInventory {
        let mut inventory = NetworkInventory::default();

        let device_datasets = [
            input.device_inventory.as_ref(),
            input.network_devices.as_ref(),
            input.topology.as_ref(),
            input.protocol_inventory.as_ref(),
        ];

        for dataset in device_datasets.into_iter().flatten() {
            inventory.total_devices += dataset.summary.total_records;
            inventory.down_devices += dataset.summary.status_counts.down;
            inventory.alarm_devices += dataset.summary.status_counts.alarm;
            inventory.fault_devices += dataset.summary.status_counts.fault;
            merge_counts(&mut inventory.by_type, &dataset.summary.type_breakdown);

            if let Some(report) = &dataset.inventory {
                merge_counts(&mut inventory.by_vendor, &report.by_vendor);
                merge_counts(&mut inventory.by_network, &report.by_network);
            }
        }

        if inventory.down_devices > 0 {
            self.add_alert(
                AlertSeverity::Critical,
                AlertCategory::Maintenance,
                "devices.down",
                inventory.down_devices.to_string(),
                Some(inventory.down_devices as f64),
                Some(0.0),
                format!(
                    "{} devices are offline and require immediate attention",
                    inventory.down_devices
                ),
                "Investigate offline devices starting with shared network segments".to_string(),
            );
        }
        if inventory.fault_devices > 0 {
            self.add_alert(
                AlertSeverity::Critical,
                AlertCategory::Maintenance,
                "devices.fault",
                inventory.fault_devices.to_string(),
                Some(inventory.fault_devices as f64),
                Some(0.0),
                format!("{} devices report fault conditions", inventory.fault_devices),
                "Inspect faulted controllers for hardware or wiring problems".to_string(),
            );
        }
        if inventory.alarm_devices > 0 {
            self.add_alert(
                AlertSeverity::Warning,
                AlertCategory::Maintenance,
                "devices.alarm",
                inventory.alarm_devices.to_string(),
                Some(inventory.alarm_devices as f64),
                Some(0.0),
                format!("{} devices have active alarms", inventory.alarm_devices),
                "Review and acknowledge outstanding alarm conditions".to_string(),
            );
        }

        inventory
    }

    fn extract_licenses(&mut self, dataset: Option<&Dataset>) -> LicenseInfo {
        let Some(report) = dataset.and_then(|d| d.platform.as_ref()) else {
            return LicenseInfo::default();
        };

        for license in &report.licenses {
            if license.never_expires {
                continue;
            }
            let Some(parsed) = license
                .expiry
                .as_deref()
                .map(|expiry| expiry.trim_start_matches("expires").trim())
                .and_then(crate::app::services::value_parsers::parse_flexible_datetime)
            else {
                continue;
            };
            let days = (parsed - Utc::now().naive_utc()).num_days();
            if days < 0 {
                self.add_alert(
                    AlertSeverity::Critical,
                    AlertCategory::Maintenance,
                    "platform.license",
                    license.name.clone(),
                    Some(days as f64),
                    Some(0.0),
                    format!("License '{}' has expired", license.name),
                    "Renew the expired license with the vendor".to_string(),
                );
            } else if days <= thresholds::CERT_EXPIRY_WARNING_DAYS {
                self.add_alert(
                    AlertSeverity::Warning,
                    AlertCategory::Maintenance,
                    "platform.license",
                    license.name.clone(),
                    Some(days as f64),
                    Some(thresholds::CERT_EXPIRY_WARNING_DAYS as f64),
                    format!("License '{}' expires in {days} days", license.name),
                    "Renew the license before it expires".to_string(),
                );
            }
        }

        LicenseInfo {
            count: report.licenses.len(),
            licenses: report.licenses.clone(),
        }
    }

    fn extract_certificates(&mut self, dataset: Option<&Dataset>) -> CertificateInfo {
        let Some(report) = dataset.and_then(|d| d.platform.as_ref()) else {
            return CertificateInfo::default();
        };

        let mut info = CertificateInfo {
            count: report.certificates.len(),
            certificates: report.certificates.clone(),
            expired: 0,
            expiring_soon: 0,
        };

        for certificate in &report.certificates {
            match certificate.days_until_expiry {
                Some(days) if days < 0 => {
                    info.expired += 1;
                    self.add_alert(
                        AlertSeverity::Critical,
                        AlertCategory::Security,
                        "platform.certificate",
                        certificate.name.clone(),
                        Some(days as f64),
                        Some(0.0),
                        format!("Certificate '{}' has expired", certificate.name),
                        "Renew and reinstall the expired certificate".to_string(),
                    );
                }
                Some(days) if days <= thresholds::CERT_EXPIRY_WARNING_DAYS => {
                    info.expiring_soon += 1;
                    self.add_alert(
                        AlertSeverity::Warning,
                        AlertCategory::Security,
                        "platform.certificate",
                        certificate.name.clone(),
                        Some(days as f64),
                        Some(thresholds::CERT_EXPIRY_WARNING_DAYS as f64),
                        format!("Certificate '{}' expires in {days} days", certificate.name),
                        "Renew the certificate before it expires".to_string(),
                    );
                }
                _ => {}
            }
        }

        info
    }
}

/// Distinct network names from the device inventory, with platform modules
/// carrying driver-suffixed names as the fallback source
fn extract_drivers(input: &AnalysisInput) -> DriverInfo {
    let mut drivers: Vec<String> = input
        .device_inventory
        .as_ref()
        .and_then(|d| d.inventory.as_ref())
        .map(|report| report.by_network.keys().cloned().collect())
        .unwrap_or_default();

    if drivers.is_empty() {
        if let Some(report) = input.platform.as_ref().and_then(|d| d.platform.as_ref()) {
            drivers = report
                .modules
                .iter()
                .filter(|module| {
                    let lower = module.name.to_lowercase();
                    lower.contains("driver")
                        || lower.starts_with("bacnet")
                        || lower.starts_with("lonworks")
                        || lower.starts_with("modbus")
                })
                .map(|module| module.name.clone())
                .collect();
        }
    }

    drivers.sort_unstable();
    drivers.dedup();
    DriverInfo {
        count: drivers.len(),
        drivers,
    }
}

fn extract_modules(dataset: Option<&Dataset>) -> ModuleInfo {
    let Some(report) = dataset.and_then(|d| d.platform.as_ref()) else {
        return ModuleInfo::default();
    };
    ModuleInfo {
        count: report.modules.len(),
        modules: report.modules.clone(),
    }
}

fn merge_counts(target: &mut HashMap<String, usize>, source: &HashMap<String, usize>) {
    for (key, count) in source {
        *target.entry(key.clone()).or_insert(0) += count;
    }
}
