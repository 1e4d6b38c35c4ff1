//! Format detection heuristics
//!
//! Given file content, a filename and an optional user hint, scores the
//! candidate formats by column-signature and content-keyword matching.
//! Confidence is a heuristic score, not a probability: detection methods
//! run in a fixed priority order and the first to reach the
//! high-confidence threshold short-circuits the remaining trials.

use super::format_registry::{self, FormatSpec};
use super::tokenizer::header_fields;
use crate::app::models::FormatId;
use crate::constants::{
    HIGH_CONFIDENCE, HINT_ACCEPT_CONFIDENCE, PLATFORM_FILENAME_CONFIDENCE, PLATFORM_KEYWORDS,
    PLATFORM_KEYWORD_SCORE, columns,
};
use serde::Serialize;
use tracing::debug;

/// Result of one detection call
#[derive(Debug, Clone, Serialize)]
pub struct FormatDetection {
    pub format: FormatId,
    /// Heuristic confidence, clamped to 0-100
    pub confidence: u8,
    /// Human-readable reasons, in the order they were established
    pub reasons: Vec<String>,
    #[serde(skip)]
    pub spec: &'static FormatSpec,
}

impl FormatDetection {
    fn new(format: FormatId, confidence: u8, reasons: Vec<String>) -> Self {
        Self {
            format,
            confidence: confidence.min(100),
            reasons,
            spec: format_registry::get(format),
        }
    }

    fn unknown(reason: impl Into<String>) -> Self {
        Self::new(FormatId::Unknown, 0, vec![reason.into()])
    }
}

/// Detect the format of a file from its content and filename.
///
/// A supplied hint is validated first and accepted when it scores at least
/// the hint-accept threshold; otherwise it is treated as evidence only and
/// full auto-detection runs.
pub fn detect(content: &str, filename: &str, hint: Option<FormatId>) -> FormatDetection {
    if let Some(hint) = hint {
        if hint != FormatId::Unknown {
            let validated = validate_hint(content, filename, hint);
            if validated.confidence >= HINT_ACCEPT_CONFIDENCE {
                return validated;
            }
            debug!(
                "Hint '{}' scored only {}; falling through to auto-detection",
                hint, validated.confidence
            );
        }
    }

    match file_extension(filename).as_deref() {
        Some("txt") | Some("text") | Some("log") => detect_platform_text(content, filename),
        Some("csv") => detect_csv_header(content),
        Some(other) => {
            FormatDetection::unknown(format!("unsupported file extension '{other}'"))
        }
        None => FormatDetection::unknown("file has no extension"),
    }
}

/// Lower-cased extension of a filename, if any
pub fn file_extension(filename: &str) -> Option<String> {
    std::path::Path::new(filename)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}

// =============================================================================
// Hint Validation
// =============================================================================

fn validate_hint(content: &str, filename: &str, hint: FormatId) -> FormatDetection {
    let spec = format_registry::get(hint);

    let extension = file_extension(filename).unwrap_or_default();
    if !spec.extensions.contains(&extension.as_str()) {
        return FormatDetection::new(
            hint,
            0,
            vec![format!(
                "hinted format '{}' does not accept extension '{}'",
                spec.display_name, extension
            )],
        );
    }

    // Text formats have no columns to score; delegate to the text detector
    if hint == FormatId::PlatformInfo {
        return detect_platform_text(content, filename);
    }

    let header = normalized_header(content);
    let mut reasons = vec![format!("user hint: {}", spec.display_name)];
    let mut score: i32 = 80;

    let missing: Vec<&str> = spec
        .required_columns
        .iter()
        .filter(|column| !contains_column(&header, column))
        .copied()
        .collect();
    if missing.is_empty() {
        score += 20;
        reasons.push("all required columns present".to_string());
    } else {
        score -= 15 * missing.len() as i32;
        reasons.push(format!("missing required columns: {}", missing.join(", ")));
    }

    for identifier in spec.identifier_columns {
        if contains_column(&header, identifier) {
            score += 10;
            reasons.push(format!("identifier column '{identifier}' present"));
        } else {
            score -= 10;
            reasons.push(format!("identifier column '{identifier}' absent"));
        }
    }

    FormatDetection::new(hint, score.clamp(0, 100) as u8, reasons)
}

// =============================================================================
// Platform Text Detection
// =============================================================================

fn detect_platform_text(content: &str, filename: &str) -> FormatDetection {
    let lower = content.to_lowercase();
    let mut reasons = Vec::new();
    let mut matches = 0u8;

    for keyword in PLATFORM_KEYWORDS {
        if lower.contains(&keyword.to_lowercase()) {
            matches += 1;
            reasons.push(format!("found platform keyword '{keyword}'"));
        }
    }

    if matches > 0 {
        let confidence = (matches * PLATFORM_KEYWORD_SCORE).min(HIGH_CONFIDENCE);
        return FormatDetection::new(FormatId::PlatformInfo, confidence, reasons);
    }

    if filename.to_lowercase().contains("platform") {
        return FormatDetection::new(
            FormatId::PlatformInfo,
            PLATFORM_FILENAME_CONFIDENCE,
            vec!["filename suggests a platform export".to_string()],
        );
    }

    FormatDetection::unknown("no platform keywords found in text file")
}

// =============================================================================
// CSV Header Detection
// =============================================================================

/// Header-based detection. Four independent scoring methods run in fixed
/// priority order; any method reaching the high-confidence threshold wins
/// outright, otherwise the single highest-scoring method is returned.
fn detect_csv_header(content: &str) -> FormatDetection {
    let header = normalized_header(content);
    if header.is_empty() {
        return FormatDetection::unknown("no header line found");
    }

    let methods: [(FormatId, fn(&[String]) -> (u8, Vec<String>)); 4] = [
        (FormatId::ResourceExport, score_resource_export),
        (FormatId::NetworkDevices, score_network_devices),
        (FormatId::DeviceInventory, score_device_inventory),
        (FormatId::Topology, score_topology),
    ];

    let mut best: Option<FormatDetection> = None;
    for (format, method) in methods {
        let (score, reasons) = method(&header);
        if score >= HIGH_CONFIDENCE {
            return FormatDetection::new(format, score, reasons);
        }
        if score > 0 && best.as_ref().map_or(true, |b| score > b.confidence) {
            best = Some(FormatDetection::new(format, score, reasons));
        }
    }

    best.unwrap_or_else(|| FormatDetection::unknown("no format patterns matched"))
}

fn normalized_header(content: &str) -> Vec<String> {
    header_fields(content)
        .into_iter()
        .map(|field| field.trim().to_lowercase())
        .collect()
}

fn contains_column(header: &[String], column: &str) -> bool {
    let lower = column.to_lowercase();
    header.iter().any(|field| *field == lower)
}

/// Exact-two-column check: a header of exactly {Name, Value} is the most
/// specific signature and always wins outright; a superset scores lower
fn score_resource_export(header: &[String]) -> (u8, Vec<String>) {
    let has_name = contains_column(header, columns::NAME);
    let has_value = contains_column(header, columns::VALUE);
    if !(has_name && has_value) {
        return (0, Vec::new());
    }

    if header.len() == 2 {
        (
            100,
            vec!["header is exactly Name,Value".to_string()],
        )
    } else {
        (
            60,
            vec![
                "contains Name and Value columns with extra data; may be a resource export"
                    .to_string(),
            ],
        )
    }
}

fn score_network_devices(header: &[String]) -> (u8, Vec<String>) {
    if !contains_column(header, columns::CONTROLLER_TYPE) {
        return (0, Vec::new());
    }

    let supporting = [columns::NAME, columns::STATUS, columns::ADDRESS];
    let found = supporting
        .iter()
        .filter(|column| contains_column(header, column))
        .count();

    let score = 80 + (20 * found / supporting.len()) as u8;
    (
        score,
        vec![
            "found Controller Type column".to_string(),
            format!("{found}/{} supporting columns present", supporting.len()),
        ],
    )
}

fn score_device_inventory(header: &[String]) -> (u8, Vec<String>) {
    if !contains_column(header, columns::DEVICE_ID) {
        return (0, Vec::new());
    }

    let supporting = [
        columns::VENDOR,
        columns::MODEL,
        columns::HEALTH,
        columns::ENCODING,
        columns::PROTOCOL_REV,
    ];
    let found = supporting
        .iter()
        .filter(|column| contains_column(header, column))
        .count();

    let score = 60 + (40 * found / supporting.len()) as u8;
    (
        score,
        vec![
            "found Device ID column".to_string(),
            format!("{found}/{} inventory columns present", supporting.len()),
        ],
    )
}

fn score_topology(header: &[String]) -> (u8, Vec<String>) {
    let identifiers = [columns::FOX_PORT, columns::PATH, columns::PLATFORM_STATUS];
    let found: Vec<&str> = identifiers
        .iter()
        .filter(|column| contains_column(header, column))
        .copied()
        .collect();
    if found.is_empty() {
        return (0, Vec::new());
    }

    let mut score = 50 + 25 * found.len() as u32;
    let mut reasons = vec![format!("topology identifier columns: {}", found.join(", "))];

    for connection in [columns::CLIENT_CONN, columns::SERVER_CONN] {
        if contains_column(header, connection) {
            score += 10;
            reasons.push(format!("connection status column '{connection}' present"));
        }
    }

    (score.min(100) as u8, reasons)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_name_value_is_certain() {
        let detection = detect("Name,Value\ncpu.usage,5%\n", "resources.csv", None);
        assert_eq!(detection.format, FormatId::ResourceExport);
        assert_eq!(detection.confidence, 100);
    }

    #[test]
    fn test_name_value_superset_scores_lower() {
        let detection = detect("Name,Value,Extra\na,b,c\n", "export.csv", None);
        assert_eq!(detection.format, FormatId::ResourceExport);
        assert_eq!(detection.confidence, 60);
    }

    #[test]
    fn test_controller_type_detection() {
        let detection = detect(
            "Name,Controller Type,Status,Address\nAHU-1,JACE,{ok},10.0.0.4\n",
            "devices.csv",
            None,
        );
        assert_eq!(detection.format, FormatId::NetworkDevices);
        assert_eq!(detection.confidence, 100);
    }

    #[test]
    fn test_device_inventory_detection() {
        let detection = detect(
            "Name,Device ID,Vendor,Model,Health,Encoding,Protocol Rev\nVAV-1,1001,Acme,V2,Ok,UTF-8,14\n",
            "inventory.csv",
            None,
        );
        assert_eq!(detection.format, FormatId::DeviceInventory);
        assert_eq!(detection.confidence, 100);
    }

    #[test]
    fn test_detection_priority_order() {
        // Controller Type runs before Device ID; with both present and the
        // network score at the threshold, network wins outright
        let detection = detect(
            "Name,Controller Type,Status,Device ID\nA,J,ok,1\n",
            "mixed.csv",
            None,
        );
        assert_eq!(detection.format, FormatId::NetworkDevices);
        assert!(detection.confidence >= 90);
    }

    #[test]
    fn test_higher_scoring_method_wins_below_threshold() {
        // Network method scores 80 + 20*1/3 = 86 (Name only); inventory
        // scores 60 + 40*1/5 = 68. The network result must win.
        let detection = detect(
            "Name,Controller Type,Device ID,Vendor\nA,J,1,Acme\n",
            "mixed.csv",
            None,
        );
        assert_eq!(detection.format, FormatId::NetworkDevices);
        assert_eq!(detection.confidence, 86);
    }

    #[test]
    fn test_topology_detection() {
        let detection = detect(
            "Name,Path,Fox Port,Client Conn,Server Conn\nJ1,/Drivers/Net,1911,Connected,Connected\n",
            "topology.csv",
            None,
        );
        assert_eq!(detection.format, FormatId::Topology);
        assert_eq!(detection.confidence, 100);
    }

    #[test]
    fn test_unmatched_csv_is_unknown() {
        let detection = detect("Alpha,Beta\n1,2\n", "mystery.csv", None);
        assert_eq!(detection.format, FormatId::Unknown);
        assert_eq!(detection.confidence, 0);
        assert!(
            detection
                .reasons
                .iter()
                .any(|reason| reason.contains("no format patterns matched"))
        );
    }

    #[test]
    fn test_unsupported_extension() {
        let detection = detect("anything", "report.pdf", None);
        assert_eq!(detection.format, FormatId::Unknown);
        assert!(detection.reasons[0].contains("unsupported file extension"));
    }

    #[test]
    fn test_platform_text_keywords() {
        let content = "Platform summary for 10.0.1.5\nDaemon Version: 4.10.0.154\nNiagara Runtime: 4.10.0.154\nOperating System: qnx\nModules\n";
        let detection = detect(content, "dump.txt", None);
        assert_eq!(detection.format, FormatId::PlatformInfo);
        assert_eq!(detection.confidence, 90);
    }

    #[test]
    fn test_platform_filename_fallback() {
        let detection = detect("nothing recognizable here", "platform_export.txt", None);
        assert_eq!(detection.format, FormatId::PlatformInfo);
        assert_eq!(detection.confidence, PLATFORM_FILENAME_CONFIDENCE);
    }

    #[test]
    fn test_valid_hint_accepted() {
        let detection = detect(
            "Name,Controller Type,Status\nA,J,ok\n",
            "devices.csv",
            Some(FormatId::NetworkDevices),
        );
        assert_eq!(detection.format, FormatId::NetworkDevices);
        assert!(detection.confidence >= 80);
        assert!(detection.reasons[0].contains("user hint"));
    }

    #[test]
    fn test_bad_hint_falls_through_to_auto_detection() {
        // A topology hint against a pure telemetry header scores poorly;
        // auto-detection recovers the right format
        let detection = detect(
            "Name,Value\ncpu.usage,5%\n",
            "resources.csv",
            Some(FormatId::Topology),
        );
        assert_eq!(detection.format, FormatId::ResourceExport);
        assert_eq!(detection.confidence, 100);
    }

    #[test]
    fn test_hint_extension_mismatch_rejected() {
        let detection = detect(
            "Platform summary\n",
            "dump.txt",
            Some(FormatId::NetworkDevices),
        );
        // Hint rejected for extension mismatch, text routing takes over
        assert_eq!(detection.format, FormatId::PlatformInfo);
    }

    #[test]
    fn test_confidence_clamped() {
        // Three topology identifiers plus both connection columns would
        // raw-score 145; the result must be clamped
        let detection = detect(
            "Name,Path,Fox Port,Platform Status,Client Conn,Server Conn\na,b,c,d,e,f\n",
            "topology.csv",
            None,
        );
        assert!(detection.confidence <= 100);
    }
}
