//! Micro-parsers for vendor value and status strings
//!
//! Pure functions converting the raw strings found in export files into
//! typed values: compound bracketed statuses, capacity-with-limit values,
//! memory sizes, percentages, uptime durations and the vendor's textual
//! timestamp format. Each function is deterministic over its input and
//! never panics on malformed text.

use crate::app::models::{
    BadgeVariant, CapacityValue, DeviceStatus, ParsedStatus, ParsedValue, Severity, StatusBadge,
    UptimeValue, ValueKind, ValueMetadata, ValueRepr,
};
use crate::constants::{STATUS_BADGE_MAX_LEN, STATUS_FLAGS};
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;

fn capacity_limit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^([\d,]+)\s*\(\s*Limit:\s*([\d,]+|none)\s*\)$").expect("static pattern")
    })
}

fn capacity_paren_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^([\d,]+)\s*\(\s*([\d,]+|none)\s*\)$").expect("static pattern")
    })
}

fn capacity_slash_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^([\d,]+)\s*/\s*([\d,]+|none)$").expect("static pattern"))
}

fn percentage_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(-?\d+(?:\.\d+)?)\s*%").expect("static pattern"))
}

fn exact_percentage_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(-?\d+(?:\.\d+)?)\s*%$").expect("static pattern"))
}

fn memory_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^([\d,]+(?:\.\d+)?)\s*(KB|MB|GB|bytes)$").expect("static pattern")
    })
}

fn comma_int_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{1,3}(?:,\d{3})+$").expect("static pattern"))
}

fn plain_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?\d+(?:\.\d+)?$").expect("static pattern"))
}

fn brace_group_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^}]*)\}").expect("static pattern"))
}

fn uptime_days_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d+)\s*day").expect("static pattern"))
}

fn uptime_hours_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d+)\s*hour").expect("static pattern"))
}

fn uptime_minutes_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d+)\s*min").expect("static pattern"))
}

fn uptime_seconds_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d+)\s*sec").expect("static pattern"))
}

fn vendor_timestamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^(\d{1,2})-([A-Za-z]{3})-(\d{2,4})\s+(\d{1,2}):(\d{2})(?::(\d{2}))?\s*([AP]M)?\s*([A-Za-z]{2,5})?$",
        )
        .expect("static pattern")
    })
}

fn ctime_tz_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // "Sat Jan 01 00:59:59 CET 2022" with the zone token removed before
        // strptime
        Regex::new(r"^([A-Za-z]{3} [A-Za-z]{3} \d{1,2} \d{2}:\d{2}:\d{2}) [A-Za-z]{2,5} (\d{4})$")
            .expect("static pattern")
    })
}

// =============================================================================
// Status Parsing
// =============================================================================

/// Parse a compound status string into a normalized status.
///
/// Flags come from a brace-delimited group (`{down,alarm}`) when present,
/// otherwise from a substring scan of the whole string against the fixed
/// vocabulary. Classification precedence is ok > down > fault > alarm >
/// unknown; down+fault+alarm can occur simultaneously and must not be
/// double-classified.
pub fn parse_status(raw: &str) -> ParsedStatus {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return ParsedStatus {
            status: DeviceStatus::Unknown,
            severity: Severity::Normal,
            details: vec!["No status information".to_string()],
            badge: StatusBadge {
                text: "UNKNOWN".to_string(),
                variant: BadgeVariant::Neutral,
            },
        };
    }

    let lower = trimmed.to_lowercase();
    let flags = extract_flags(&lower);

    let has = |flag: &str| flags.iter().any(|f| f == flag);
    // "disconnected" contains "connected" as a substring; a matched
    // "connected" only counts when "disconnected" did not also match
    let ok_flag = has("ok") || has("online") || (has("connected") && !has("disconnected"));
    let down_flag = has("down") || has("offline") || has("disconnected");
    let fault_flag = has("fault");
    let alarm_flag = has("alarm") || has("unackedalarm");

    if ok_flag {
        return ParsedStatus {
            status: DeviceStatus::Ok,
            severity: Severity::Normal,
            details: vec!["Device status normal".to_string()],
            badge: StatusBadge {
                text: "OK".to_string(),
                variant: BadgeVariant::Success,
            },
        };
    }

    if down_flag {
        let mut status = DeviceStatus::Down;
        let mut details = vec!["Device reported down".to_string()];
        let mut badge_text = "DOWN".to_string();

        if fault_flag {
            status = DeviceStatus::Fault;
            badge_text = "FAULT/DOWN".to_string();
        }
        if alarm_flag {
            details.push("Alarm condition present".to_string());
            if !fault_flag {
                badge_text = "DOWN/ALARM".to_string();
            }
        }

        return ParsedStatus {
            status,
            severity: Severity::Critical,
            details,
            badge: StatusBadge {
                text: badge_text,
                variant: BadgeVariant::Danger,
            },
        };
    }

    if fault_flag {
        return ParsedStatus {
            status: DeviceStatus::Fault,
            severity: Severity::Critical,
            details: vec!["Fault condition reported".to_string()],
            badge: StatusBadge {
                text: "FAULT".to_string(),
                variant: BadgeVariant::Danger,
            },
        };
    }

    if alarm_flag {
        return ParsedStatus {
            status: DeviceStatus::Alarm,
            severity: Severity::Warning,
            details: vec!["Alarm active".to_string()],
            badge: StatusBadge {
                text: "ALARM".to_string(),
                variant: BadgeVariant::Warning,
            },
        };
    }

    ParsedStatus {
        status: DeviceStatus::Unknown,
        severity: Severity::Normal,
        details: vec![format!("Unrecognized status: {trimmed}")],
        badge: StatusBadge {
            text: truncate_badge(trimmed),
            variant: BadgeVariant::Neutral,
        },
    }
}

/// Flag set from a lowercased status string: brace group contents when
/// present, otherwise vocabulary substring matches
fn extract_flags(lower: &str) -> Vec<String> {
    if let Some(captures) = brace_group_re().captures(lower) {
        return captures[1]
            .split(',')
            .map(|flag| flag.trim().to_string())
            .filter(|flag| !flag.is_empty())
            .collect();
    }

    STATUS_FLAGS
        .iter()
        .filter(|flag| lower.contains(**flag))
        .map(|flag| (*flag).to_string())
        .collect()
}

fn truncate_badge(raw: &str) -> String {
    let upper = raw.to_uppercase();
    if upper.chars().count() > STATUS_BADGE_MAX_LEN {
        let truncated: String = upper.chars().take(STATUS_BADGE_MAX_LEN).collect();
        format!("{truncated}…")
    } else {
        upper
    }
}

// =============================================================================
// Value Parsing
// =============================================================================

/// Parse a raw value string into a typed value.
///
/// Branches are tried in a fixed order, first match wins:
/// capacity-with-limit, percentage, memory-with-unit, comma-grouped
/// integer, plain number, text fallback. Every branch preserves the
/// original trimmed string for display and audit.
pub fn parse_value(raw: &str) -> ParsedValue {
    let trimmed = raw.trim();

    if let Some(capacity) = parse_capacity(trimmed) {
        return ParsedValue {
            value: ValueRepr::Number(capacity.used as f64),
            unit: None,
            formatted: trimmed.to_string(),
            kind: ValueKind::Count,
            metadata: Some(ValueMetadata {
                limit: Some(capacity.limit as f64),
                percentage: Some(capacity.percentage.unwrap_or(0.0)),
            }),
        };
    }

    if let Some(captures) = exact_percentage_re().captures(trimmed) {
        if let Ok(number) = captures[1].parse::<f64>() {
            return ParsedValue {
                value: ValueRepr::Number(number),
                unit: Some("%".to_string()),
                formatted: trimmed.to_string(),
                kind: ValueKind::Percentage,
                metadata: None,
            };
        }
    }

    if let Some(captures) = memory_re().captures(trimmed) {
        if let Ok(number) = captures[1].replace(',', "").parse::<f64>() {
            return ParsedValue {
                value: ValueRepr::Number(number),
                unit: Some(captures[2].to_string()),
                formatted: trimmed.to_string(),
                kind: ValueKind::Memory,
                metadata: None,
            };
        }
    }

    if comma_int_re().is_match(trimmed) {
        if let Ok(number) = trimmed.replace(',', "").parse::<f64>() {
            return ParsedValue {
                value: ValueRepr::Number(number),
                unit: None,
                formatted: trimmed.to_string(),
                kind: ValueKind::Count,
                metadata: None,
            };
        }
    }

    if plain_number_re().is_match(trimmed) {
        if let Ok(number) = trimmed.parse::<f64>() {
            return ParsedValue {
                value: ValueRepr::Number(number),
                unit: None,
                formatted: trimmed.to_string(),
                kind: ValueKind::Count,
                metadata: None,
            };
        }
    }

    ParsedValue {
        value: ValueRepr::Text(trimmed.to_string()),
        unit: None,
        formatted: trimmed.to_string(),
        kind: ValueKind::Text,
        metadata: None,
    }
}

/// Parse a memory size with a trailing GB/MB/KB unit, normalized to MB
pub fn parse_memory_mb(raw: &str) -> Option<f64> {
    let captures = memory_re().captures(raw.trim())?;
    let number: f64 = captures[1].replace(',', "").parse().ok()?;
    match captures[2].to_uppercase().as_str() {
        "GB" => Some(number * 1024.0),
        "MB" => Some(number),
        "KB" => Some(number / 1024.0),
        // "bytes" stays out of the MB normalization on purpose
        _ => None,
    }
}

/// Extract the first percentage occurrence from a string
pub fn parse_percentage(raw: &str) -> Option<f64> {
    percentage_re()
        .captures(raw)
        .and_then(|captures| captures[1].parse().ok())
}

/// Parse a capacity-with-limit string.
///
/// Recognizes `used (Limit: N)`, `used (N)` and `used/N`; a limit of
/// literal `none` or `0` means unlimited (flag true, limit reported as 0).
pub fn parse_capacity(raw: &str) -> Option<CapacityValue> {
    let trimmed = raw.trim();
    let captures = capacity_limit_re()
        .captures(trimmed)
        .or_else(|| capacity_paren_re().captures(trimmed))
        .or_else(|| capacity_slash_re().captures(trimmed))?;

    let used: u64 = captures[1].replace(',', "").parse().ok()?;
    let limit_raw = captures[2].to_lowercase();
    let limit: u64 = if limit_raw == "none" {
        0
    } else {
        limit_raw.replace(',', "").parse().ok()?
    };

    let unlimited = limit == 0;
    let percentage = if unlimited {
        None
    } else {
        Some(used as f64 / limit as f64 * 100.0)
    };

    Some(CapacityValue {
        used,
        limit,
        unlimited,
        percentage,
    })
}

/// Extract day/hour/minute/second components from a free-text duration.
///
/// Any subset of components may be absent (absent = 0); returns `None`
/// only when no component is found at all.
pub fn parse_uptime(raw: &str) -> Option<UptimeValue> {
    let extract = |re: &Regex| -> Option<u64> {
        re.captures(raw)
            .and_then(|captures| captures[1].parse().ok())
    };

    let days = extract(uptime_days_re());
    let hours = extract(uptime_hours_re());
    let minutes = extract(uptime_minutes_re());
    let seconds = extract(uptime_seconds_re());

    if days.is_none() && hours.is_none() && minutes.is_none() && seconds.is_none() {
        return None;
    }

    let days = days.unwrap_or(0);
    let hours = hours.unwrap_or(0);
    let minutes = minutes.unwrap_or(0);
    let seconds = seconds.unwrap_or(0);

    Some(UptimeValue {
        days,
        hours,
        minutes,
        seconds,
        total_seconds: days * 86_400 + hours * 3_600 + minutes * 60 + seconds,
    })
}

// =============================================================================
// Timestamp Parsing
// =============================================================================

/// Parse the vendor's textual timestamp format `DD-Mon-YY H:MM AM/PM TZ`.
///
/// Handles 3-letter month abbreviations, 2-digit year expansion (+2000)
/// and 12-hour-to-24-hour conversion. The trailing zone token is accepted
/// but not interpreted.
pub fn parse_vendor_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let captures = vendor_timestamp_re().captures(raw.trim())?;

    let day: u32 = captures[1].parse().ok()?;
    let month = month_number(&captures[2])?;
    let mut year: i32 = captures[3].parse().ok()?;
    if year < 100 {
        year += 2000;
    }

    let mut hour: u32 = captures[4].parse().ok()?;
    let minute: u32 = captures[5].parse().ok()?;
    let second: u32 = captures
        .get(6)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0);

    if let Some(meridiem) = captures.get(7) {
        match meridiem.as_str().to_uppercase().as_str() {
            "PM" if hour != 12 => hour += 12,
            "AM" if hour == 12 => hour = 0,
            _ => {}
        }
    }

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
}

fn month_number(abbrev: &str) -> Option<u32> {
    match abbrev.to_lowercase().as_str() {
        "jan" => Some(1),
        "feb" => Some(2),
        "mar" => Some(3),
        "apr" => Some(4),
        "may" => Some(5),
        "jun" => Some(6),
        "jul" => Some(7),
        "aug" => Some(8),
        "sep" => Some(9),
        "oct" => Some(10),
        "nov" => Some(11),
        "dec" => Some(12),
        _ => None,
    }
}

/// Parse a timestamp in any of the shapes seen in the exports: the vendor
/// format, ISO-8601, plain date/datetime, or ctime-with-zone
pub fn parse_flexible_datetime(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();

    if let Some(parsed) = parse_vendor_timestamp(trimmed) {
        return Some(parsed);
    }
    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.naive_utc());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed);
        }
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return parsed.and_hms_opt(0, 0, 0);
    }
    if let Some(captures) = ctime_tz_re().captures(trimmed) {
        let rebuilt = format!("{} {}", &captures[1], &captures[2]);
        if let Ok(parsed) = NaiveDateTime::parse_from_str(&rebuilt, "%a %b %d %H:%M:%S %Y") {
            return Some(parsed);
        }
    }
    None
}

/// Normalize a timestamp to ISO-8601 when parseable; returns the original
/// string unchanged rather than failing
pub fn normalize_timestamp(raw: &str) -> String {
    match parse_flexible_datetime(raw) {
        Some(parsed) => parsed.format("%Y-%m-%dT%H:%M:%S").to_string(),
        None => raw.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_status() {
        let parsed = parse_status("   ");
        assert_eq!(parsed.status, DeviceStatus::Unknown);
        assert_eq!(parsed.severity, Severity::Normal);
        assert_eq!(parsed.details, vec!["No status information"]);
    }

    #[test]
    fn test_ok_status() {
        let parsed = parse_status("{ok}");
        assert_eq!(parsed.status, DeviceStatus::Ok);
        assert_eq!(parsed.severity, Severity::Normal);
        assert_eq!(parsed.badge.text, "OK");
        assert_eq!(parsed.badge.variant, BadgeVariant::Success);
    }

    #[test]
    fn test_down_alarm_unacked_compound() {
        // No fault flag: stays down, badge reflects the alarm refinement
        let parsed = parse_status("{down,alarm,unackedAlarm}");
        assert_eq!(parsed.status, DeviceStatus::Down);
        assert_eq!(parsed.severity, Severity::Critical);
        assert_eq!(parsed.badge.text, "DOWN/ALARM");
        assert!(parsed.details.iter().any(|d| d == "Alarm condition present"));
    }

    #[test]
    fn test_down_fault_compound() {
        let parsed = parse_status("{down,fault}");
        assert_eq!(parsed.status, DeviceStatus::Fault);
        assert_eq!(parsed.severity, Severity::Critical);
        assert_eq!(parsed.badge.text, "FAULT/DOWN");
    }

    #[test]
    fn test_down_fault_alarm_not_double_classified() {
        let parsed = parse_status("{down,fault,alarm}");
        assert_eq!(parsed.status, DeviceStatus::Fault);
        // Fault claimed the badge; the alarm surfaces in details only
        assert_eq!(parsed.badge.text, "FAULT/DOWN");
        assert!(parsed.details.iter().any(|d| d == "Alarm condition present"));
    }

    #[test]
    fn test_ok_checked_before_down() {
        let parsed = parse_status("{ok,down}");
        assert_eq!(parsed.status, DeviceStatus::Ok);
    }

    #[test]
    fn test_fault_alone() {
        let parsed = parse_status("fault");
        assert_eq!(parsed.status, DeviceStatus::Fault);
        assert_eq!(parsed.severity, Severity::Critical);
        assert_eq!(parsed.badge.text, "FAULT");
    }

    #[test]
    fn test_alarm_alone_is_warning() {
        let parsed = parse_status("{unackedAlarm}");
        assert_eq!(parsed.status, DeviceStatus::Alarm);
        assert_eq!(parsed.severity, Severity::Warning);
        assert_eq!(parsed.badge.text, "ALARM");
    }

    #[test]
    fn test_substring_scan_without_braces() {
        let parsed = parse_status("Device is down since Tuesday");
        assert_eq!(parsed.status, DeviceStatus::Down);
    }

    #[test]
    fn test_disconnected_is_down_not_connected() {
        let parsed = parse_status("disconnected");
        assert_eq!(parsed.status, DeviceStatus::Down);
    }

    #[test]
    fn test_unknown_badge_truncation() {
        let parsed = parse_status("initializing subsystem");
        assert_eq!(parsed.status, DeviceStatus::Unknown);
        assert_eq!(parsed.badge.text, "INITIALIZI…");
        assert_eq!(parsed.severity, Severity::Normal);
    }

    #[test]
    fn test_parse_value_percentage() {
        let parsed = parse_value("45.2%");
        assert_eq!(parsed.as_f64(), Some(45.2));
        assert_eq!(parsed.unit.as_deref(), Some("%"));
        assert_eq!(parsed.kind, ValueKind::Percentage);
        assert_eq!(parsed.formatted, "45.2%");
    }

    #[test]
    fn test_parse_value_capacity_with_limit() {
        let parsed = parse_value("84 (Limit: 101)");
        assert_eq!(parsed.as_f64(), Some(84.0));
        assert_eq!(parsed.kind, ValueKind::Count);
        let metadata = parsed.metadata.unwrap();
        assert_eq!(metadata.limit, Some(101.0));
        let percentage = metadata.percentage.unwrap();
        assert!((percentage - 83.17).abs() < 0.01);
    }

    #[test]
    fn test_parse_value_memory() {
        let parsed = parse_value("265 MB");
        assert_eq!(parsed.as_f64(), Some(265.0));
        assert_eq!(parsed.unit.as_deref(), Some("MB"));
        assert_eq!(parsed.kind, ValueKind::Memory);
    }

    #[test]
    fn test_parse_value_comma_grouped() {
        let parsed = parse_value("1,234");
        assert_eq!(parsed.as_f64(), Some(1234.0));
        assert_eq!(parsed.kind, ValueKind::Count);
        assert_eq!(parsed.formatted, "1,234");
    }

    #[test]
    fn test_parse_value_plain_and_text() {
        assert_eq!(parse_value("17").as_f64(), Some(17.0));
        let text = parse_value("n/a");
        assert_eq!(text.kind, ValueKind::Text);
        assert_eq!(text.value, ValueRepr::Text("n/a".to_string()));
    }

    #[test]
    fn test_capacity_unlimited_none() {
        let capacity = parse_capacity("1,625 (Limit: none)").unwrap();
        assert_eq!(capacity.used, 1625);
        assert_eq!(capacity.limit, 0);
        assert!(capacity.unlimited);
        assert_eq!(capacity.percentage, None);
    }

    #[test]
    fn test_capacity_with_numeric_limit() {
        let capacity = parse_capacity("3,303 (Limit: 5,000)").unwrap();
        assert_eq!(capacity.used, 3303);
        assert_eq!(capacity.limit, 5000);
        assert!(!capacity.unlimited);
        assert!((capacity.percentage.unwrap() - 66.06).abs() < 0.01);
    }

    #[test]
    fn test_capacity_alternate_shapes() {
        assert_eq!(parse_capacity("84 (101)").unwrap().limit, 101);
        assert_eq!(parse_capacity("84/101").unwrap().limit, 101);
        assert!(parse_capacity("84 (Limit: 0)").unwrap().unlimited);
        assert!(parse_capacity("just text").is_none());
    }

    #[test]
    fn test_memory_normalization() {
        assert_eq!(parse_memory_mb("2 GB"), Some(2048.0));
        assert_eq!(parse_memory_mb("265 MB"), Some(265.0));
        assert_eq!(parse_memory_mb("512 KB"), Some(0.5));
        assert_eq!(parse_memory_mb("265mb"), Some(265.0));
        assert_eq!(parse_memory_mb("265"), None);
    }

    #[test]
    fn test_percentage_extraction() {
        assert_eq!(parse_percentage("cpu at 92% of capacity"), Some(92.0));
        assert_eq!(parse_percentage("12.5%"), Some(12.5));
        assert_eq!(parse_percentage("no percent here"), None);
    }

    #[test]
    fn test_uptime_full_string() {
        let uptime = parse_uptime("31 days, 19 hours, 42 minutes").unwrap();
        assert_eq!(uptime.days, 31);
        assert_eq!(uptime.hours, 19);
        assert_eq!(uptime.minutes, 42);
        assert_eq!(uptime.seconds, 0);
        assert_eq!(uptime.total_seconds, 31 * 86_400 + 19 * 3_600 + 42 * 60);
    }

    #[test]
    fn test_uptime_partial_components() {
        let uptime = parse_uptime("5 hours").unwrap();
        assert_eq!(uptime.days, 0);
        assert_eq!(uptime.hours, 5);
        assert_eq!(uptime.total_seconds, 5 * 3_600);
        assert!(parse_uptime("no duration at all").is_none());
    }

    #[test]
    fn test_vendor_timestamp() {
        let parsed = parse_vendor_timestamp("05-Aug-25 3:47 PM EDT").unwrap();
        assert_eq!(parsed.format("%Y-%m-%d %H:%M").to_string(), "2025-08-05 15:47");
    }

    #[test]
    fn test_vendor_timestamp_midnight_noon() {
        let midnight = parse_vendor_timestamp("01-Jan-24 12:05 AM UTC").unwrap();
        assert_eq!(midnight.format("%H:%M").to_string(), "00:05");
        let noon = parse_vendor_timestamp("01-Jan-24 12:05 PM UTC").unwrap();
        assert_eq!(noon.format("%H:%M").to_string(), "12:05");
    }

    #[test]
    fn test_normalize_timestamp_fallbacks() {
        assert_eq!(
            normalize_timestamp("2024-03-01 08:30:00"),
            "2024-03-01T08:30:00"
        );
        assert_eq!(
            normalize_timestamp("Sat Jan 01 00:59:59 CET 2022"),
            "2022-01-01T00:59:59"
        );
        // Unparseable input comes back unchanged
        assert_eq!(normalize_timestamp("sometime soon"), "sometime soon");
    }
}
