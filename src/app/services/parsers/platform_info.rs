//! Parser for platform/system-information text dumps
//!
//! A line-oriented state machine: section headers (Modules, Applications,
//! Licenses, Certificates, the filesystem table, the RAM table) switch
//! the parsing mode; inside each mode a mode-specific line pattern
//! applies, and outside any section lines fall back to generic
//! `key: value` extraction.

use super::common::{build_dataset, build_summary, make_alert, validate_content};
use crate::Result;
use crate::app::models::{
    Alert, AlertCategory, AlertSeverity, CertificateEntry, Dataset, FilesystemEntry, FormatId,
    LicenseEntry, ModuleEntry, PlatformReport, RamStats, Row, StationApp,
};
use crate::app::services::format_registry;
use crate::app::services::value_parsers::parse_flexible_datetime;
use crate::config::ParseOptions;
use crate::constants::{is_lts_runtime, parser_confidence, thresholds};
use chrono::Utc;
use regex::Regex;
use std::sync::OnceLock;
use std::time::Instant;
use tracing::debug;

fn module_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // name (vendor version)
    RE.get_or_init(|| Regex::new(r"^(\S+)\s+\(([^)]+)\)$").expect("static pattern"))
}

fn station_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^station\s+(\S+)\s*(.*)$").expect("static pattern"))
}

fn port_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(fox|foxs|http|https)=(\S+)").expect("static pattern"))
}

fn trailing_paren_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(([^)]+)\)\s*$").expect("static pattern"))
}

fn filesystem_row_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\S+)\s+([\d,]+)\s*KB\s+([\d,]+)\s*KB").expect("static pattern")
    })
}

fn ram_row_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([\d,]+)\s*KB\s+([\d,]+)\s*KB$").expect("static pattern"))
}

fn key_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([^:]+):\s*(.*)$").expect("static pattern"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Modules,
    Applications,
    Licenses,
    Certificates,
    Filesystem,
    Ram,
}

/// Parse a platform-info text dump into a dataset with a platform payload
pub fn parse(content: &str, filename: &str, options: &ParseOptions) -> Result<Dataset> {
    let started = Instant::now();
    validate_content(content, filename, options)?;

    let mut report = PlatformReport::default();
    let mut section = Section::None;

    for raw_line in content.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(next) = section_header(line) {
            section = next;
            continue;
        }

        // An unindented key:value line ends whatever section was open
        if section != Section::None
            && !raw_line.starts_with(' ')
            && !raw_line.starts_with('\t')
            && key_value_re().is_match(line)
        {
            section = Section::None;
        }

        match section {
            Section::Modules => {
                if let Some(module) = parse_module_line(line) {
                    report.modules.push(module);
                }
            }
            Section::Applications => {
                if let Some(application) = parse_station_line(line) {
                    report.applications.push(application);
                }
            }
            Section::Licenses => {
                if let Some(license) = parse_license_line(line) {
                    report.licenses.push(license);
                }
            }
            Section::Certificates => {
                if let Some(certificate) = parse_certificate_line(line) {
                    report.certificates.push(certificate);
                }
            }
            Section::Filesystem => {
                if let Some(captures) = filesystem_row_re().captures(line) {
                    report.filesystems.push(FilesystemEntry {
                        mount: captures[1].to_string(),
                        free_kb: parse_grouped(&captures[2]),
                        total_kb: parse_grouped(&captures[3]),
                    });
                }
            }
            Section::Ram => {
                if let Some(captures) = ram_row_re().captures(line) {
                    report.ram = Some(RamStats {
                        free_kb: parse_grouped(&captures[1]),
                        total_kb: parse_grouped(&captures[2]),
                    });
                }
            }
            Section::None => {
                if let Some(captures) = key_value_re().captures(line) {
                    report
                        .properties
                        .insert(captures[1].trim().to_string(), captures[2].trim().to_string());
                }
            }
        }
    }

    report.alerts = evaluate_platform(&report);
    debug!(
        "Parsed platform dump {}: {} modules, {} licenses, {} certificates, {} alerts",
        filename,
        report.modules.len(),
        report.licenses.len(),
        report.certificates.len(),
        report.alerts.len()
    );

    // Whole-file key-value format: exactly one synthetic row carrying the
    // extracted properties
    let row = Row::new("row-1", report.properties.clone());
    let rows = vec![row];

    let spec = format_registry::get(FormatId::PlatformInfo);
    let mut summary = build_summary(&rows, spec);
    for alert in &report.alerts {
        if alert.severity == AlertSeverity::Critical {
            summary.critical_findings.push(alert.message.clone());
        }
        if !summary.recommendations.contains(&alert.recommendation) {
            summary.recommendations.push(alert.recommendation.clone());
        }
    }

    let mut dataset = build_dataset(
        FormatId::PlatformInfo,
        filename,
        content,
        Vec::new(),
        rows,
        summary,
        Vec::new(),
        parser_confidence::PLATFORM_INFO,
        started,
    );
    dataset.platform = Some(report);
    Ok(dataset)
}

fn section_header(line: &str) -> Option<Section> {
    let lower = line.to_lowercase();
    let bare = lower.trim_end_matches(':');
    match bare {
        "modules" => Some(Section::Modules),
        "applications" | "stations" => Some(Section::Applications),
        "licenses" => Some(Section::Licenses),
        "certificates" => Some(Section::Certificates),
        _ if lower.starts_with("filesystem") => Some(Section::Filesystem),
        _ if lower.starts_with("physical ram") => Some(Section::Ram),
        _ => None,
    }
}

/// `name (vendor version)`
fn parse_module_line(line: &str) -> Option<ModuleEntry> {
    let captures = module_re().captures(line)?;
    let inner = captures[2].trim().to_string();
    let mut parts = inner.splitn(2, char::is_whitespace);
    let vendor = parts.next().unwrap_or_default().to_string();
    let version = parts.next().unwrap_or_default().trim().to_string();
    Some(ModuleEntry {
        name: captures[1].to_string(),
        vendor,
        version,
    })
}

/// `station <name> fox=n/a foxs=4911 http=n/a https=443 (running)`
fn parse_station_line(line: &str) -> Option<StationApp> {
    let captures = station_re().captures(line)?;
    let rest = captures[2].to_string();

    let mut application = StationApp {
        name: captures[1].to_string(),
        fox_port: None,
        foxs_port: None,
        http_port: None,
        https_port: None,
        status: trailing_paren_re()
            .captures(&rest)
            .map(|status| status[1].to_string()),
    };

    for port in port_re().captures_iter(&rest) {
        let value = port[2].parse::<u16>().ok();
        match &port[1] {
            "fox" => application.fox_port = value,
            "foxs" => application.foxs_port = value,
            "http" => application.http_port = value,
            "https" => application.https_port = value,
            _ => {}
        }
    }

    Some(application)
}

/// `name (vendor version - expiry)` with a `never expires` sentinel
fn parse_license_line(line: &str) -> Option<LicenseEntry> {
    let captures = module_re().captures(line)?;
    let inner = captures[2].to_string();
    let (identity, expiry) = split_expiry(&inner);
    let mut parts = identity.splitn(2, char::is_whitespace);
    let vendor = parts.next().unwrap_or_default().to_string();
    let version = parts
        .next()
        .map(|version| version.trim().to_string())
        .filter(|version| !version.is_empty());

    let never_expires = expiry
        .as_deref()
        .map(|e| e.to_lowercase().contains("never"))
        .unwrap_or(false);

    Some(LicenseEntry {
        name: captures[1].to_string(),
        vendor,
        version,
        expiry: if never_expires { None } else { expiry },
        never_expires,
    })
}

/// `name (vendor [version] - expires <date>)`
fn parse_certificate_line(line: &str) -> Option<CertificateEntry> {
    let captures = module_re().captures(line)?;
    let inner = captures[2].to_string();
    let (identity, expiry) = split_expiry(&inner);
    let vendor = identity
        .split_whitespace()
        .next()
        .map(str::to_string)
        .filter(|vendor| !vendor.is_empty());

    let expiry_text = expiry.map(|raw| {
        raw.trim()
            .trim_start_matches("expires")
            .trim()
            .to_string()
    });

    let mut days_until_expiry = None;
    let mut expired = false;
    if let Some(raw) = expiry_text.as_deref() {
        if let Some(parsed) = parse_flexible_datetime(raw) {
            let days = (parsed - Utc::now().naive_utc()).num_days();
            days_until_expiry = Some(days);
            expired = days < 0;
        }
    }

    Some(CertificateEntry {
        name: captures[1].to_string(),
        vendor,
        expiry: expiry_text,
        days_until_expiry,
        expired,
    })
}

/// Split `vendor version - expiry` on the last ` - ` separator
fn split_expiry(inner: &str) -> (String, Option<String>) {
    match inner.rsplit_once(" - ") {
        Some((identity, expiry)) => (identity.trim().to_string(), Some(expiry.trim().to_string())),
        None => (inner.trim().to_string(), None),
    }
}

fn parse_grouped(raw: &str) -> u64 {
    raw.replace(',', "").parse().unwrap_or(0)
}

// =============================================================================
// Platform Evaluation
// =============================================================================

/// Evaluate the extracted platform facts against the threshold table
fn evaluate_platform(report: &PlatformReport) -> Vec<Alert> {
    let mut alerts = Vec::new();
    let mut seq = 0usize;

    if let Some(tls) = report.properties.get("Platform TLS Support") {
        let lower = tls.to_lowercase();
        if lower == "none" || lower == "disabled" {
            alerts.push(make_alert(
                &mut seq,
                AlertSeverity::Critical,
                AlertCategory::Security,
                "platform.tls",
                tls.clone(),
                None,
                None,
                "Platform TLS support is disabled".to_string(),
                "Enable TLS on the platform daemon".to_string(),
            ));
        }
    }

    if let Some(runtime) = report.properties.get("Niagara Runtime") {
        if !is_lts_runtime(runtime) {
            alerts.push(make_alert(
                &mut seq,
                AlertSeverity::Warning,
                AlertCategory::Maintenance,
                "platform.runtime",
                runtime.clone(),
                None,
                None,
                format!("Runtime {runtime} is not a long-term-support release"),
                "Plan an upgrade to an LTS runtime release".to_string(),
            ));
        }
    }

    for certificate in &report.certificates {
        match certificate.days_until_expiry {
            Some(days) if days < 0 => {
                alerts.push(make_alert(
                    &mut seq,
                    AlertSeverity::Critical,
                    AlertCategory::Security,
                    "platform.certificate",
                    certificate.name.clone(),
                    Some(days as f64),
                    Some(0.0),
                    format!("Certificate '{}' has expired", certificate.name),
                    "Renew and reinstall the expired certificate".to_string(),
                ));
            }
            Some(days) if days <= thresholds::CERT_EXPIRY_WARNING_DAYS => {
                alerts.push(make_alert(
                    &mut seq,
                    AlertSeverity::Warning,
                    AlertCategory::Security,
                    "platform.certificate",
                    certificate.name.clone(),
                    Some(days as f64),
                    Some(thresholds::CERT_EXPIRY_WARNING_DAYS as f64),
                    format!(
                        "Certificate '{}' expires in {days} days",
                        certificate.name
                    ),
                    "Renew the certificate before it expires".to_string(),
                ));
            }
            _ => {}
        }
    }

    // Disk headroom threshold depends on the deployment class
    let server_class = report
        .properties
        .get("Product")
        .map(|product| {
            let lower = product.to_lowercase();
            lower.contains("supervisor") || lower.contains("workstation")
        })
        .unwrap_or(false);
    let disk_minimum = if server_class {
        thresholds::DISK_FREE_MIN_SERVER_PERCENT
    } else {
        thresholds::DISK_FREE_MIN_EMBEDDED_PERCENT
    };

    for filesystem in &report.filesystems {
        if let Some(free) = filesystem.free_percent() {
            if free < disk_minimum {
                alerts.push(make_alert(
                    &mut seq,
                    AlertSeverity::Warning,
                    AlertCategory::Capacity,
                    "platform.disk",
                    format!("{} ({free:.1}% free)", filesystem.mount),
                    Some(free),
                    Some(disk_minimum),
                    format!(
                        "Filesystem {} has only {free:.1}% free space",
                        filesystem.mount
                    ),
                    "Free disk space or expand storage".to_string(),
                ));
            }
        }
    }

    if let Some(ram) = &report.ram {
        if let Some(used) = ram.used_percent() {
            if used >= thresholds::MEMORY_CRITICAL_PERCENT {
                alerts.push(make_alert(
                    &mut seq,
                    AlertSeverity::Critical,
                    AlertCategory::Performance,
                    "platform.ram",
                    format!("{used:.1}%"),
                    Some(used),
                    Some(thresholds::MEMORY_CRITICAL_PERCENT),
                    format!("Physical RAM usage at {used:.1}% is critical"),
                    "Reduce installed services or upgrade the controller".to_string(),
                ));
            } else if used >= thresholds::MEMORY_WARNING_PERCENT {
                alerts.push(make_alert(
                    &mut seq,
                    AlertSeverity::Warning,
                    AlertCategory::Performance,
                    "platform.ram",
                    format!("{used:.1}%"),
                    Some(used),
                    Some(thresholds::MEMORY_WARNING_PERCENT),
                    format!("Physical RAM usage at {used:.1}% is elevated"),
                    "Monitor memory headroom".to_string(),
                ));
            }
        }
    }

    alerts
}
