//! End-to-end cross-dataset analysis scenarios

use bas_processor::app::models::AlertSeverity;
use bas_processor::app::models::analysis::{AnalysisInput, SystemType};
use bas_processor::app::services::orchestrator::{ParserRegistry, parse_file};
use bas_processor::{ParseOptions, analyze};

fn parse(content: &str, filename: &str) -> bas_processor::Dataset {
    let registry = ParserRegistry::with_defaults();
    let outcome = parse_file(content, filename, &ParseOptions::default(), &registry, None);
    assert!(outcome.success, "parse failed: {:?}", outcome.errors);
    outcome.dataset.unwrap()
}

const PLATFORM_DUMP: &str = "\
Platform summary for 192.168.1.140
Daemon Version: 4.10.0.154
Host ID: Qnx-TITAN-A7B2-C3D4
Model: TITAN
Product: JACE-8000
Niagara Runtime: 4.10.0.154
Operating System: qnx-jace-n4-titan-am335x-hs (4.10.64.4)
Platform TLS Support: TLSv1.2+

Modules
  alarm (Tridium 4.10.0.154)
  bacnet (Tridium 4.10.1.36)

Licenses
  FacExp.license (Tridium 4.10.0.154 - never expires)

Certificates
  tridium.certificate (Tridium - expires 2031-12-31)
";

#[test]
fn full_analysis_from_three_exports() {
    let platform = parse(PLATFORM_DUMP, "platform.txt");
    let resources = parse(
        "Name,Value\ncpu.usage,45%\nheap.used,200 MB\nheap.max,400 MB\n\
         globalCapacity.devices,84 (Limit: 101)\ntime.current,2026-08-01 08:00:00\n",
        "resources.csv",
    );
    let devices = parse(
        "Name,Controller Type,Status\nAHU-1,JACE,{ok}\nVAV-2,VAV,{ok}\n",
        "devices.csv",
    );

    let analysis = analyze(&AnalysisInput {
        platform: Some(platform),
        resources: Some(resources),
        network_devices: Some(devices),
        ..AnalysisInput::default()
    });

    // Platform identity extracted from the text dump
    assert_eq!(analysis.platform.host_id.as_deref(), Some("Qnx-TITAN-A7B2-C3D4"));
    assert_eq!(analysis.platform.product.as_deref(), Some("JACE-8000"));
    assert_eq!(analysis.summary.system_type, SystemType::EmbeddedController);

    // Resource utilization and the single capacity warning (84/101 = 83%)
    assert_eq!(analysis.resources.cpu_percent, Some(45.0));
    assert_eq!(analysis.summary.warning_count, 1);
    assert_eq!(analysis.summary.critical_count, 0);
    assert_eq!(analysis.summary.health_score, 95);
    assert!((analysis.summary.capacity_utilization_percent - 83.17).abs() < 0.01);

    // Inventory, modules and certificates all populated
    assert_eq!(analysis.inventory.total_devices, 2);
    assert_eq!(analysis.modules.count, 2);
    assert_eq!(analysis.certificates.count, 1);
    assert_eq!(analysis.certificates.expired, 0);
    assert_eq!(analysis.licenses.count, 1);

    // Weighted confidence: platform 25 + resources 25 + network devices 15
    assert_eq!(analysis.metadata.confidence, 65);
    assert_eq!(analysis.metadata.files_processed, 3);
}

#[test]
fn analysis_with_zero_inputs_returns_defaults() {
    let analysis = analyze(&AnalysisInput::default());
    assert_eq!(analysis.metadata.confidence, 0);
    assert_eq!(analysis.summary.health_score, 100);
    assert_eq!(analysis.summary.system_type, SystemType::EmbeddedController);
    assert!(analysis.alerts.alerts.is_empty());
    assert!(analysis.alerts.violations.is_empty());
    assert!(analysis.summary.recommended_actions.is_empty());
}

#[test]
fn supervisor_class_relaxes_history_threshold() {
    let supervisor_dump = "Product: Niagara Supervisor\nNiagara Runtime: 4.10.0.154\n";
    let platform = parse(supervisor_dump, "platform.txt");
    let resources = parse(
        "Name,Value\nhistory.count,\"9,000\"\ntime.current,2026-08-01 08:00:00\n",
        "resources.csv",
    );

    let analysis = analyze(&AnalysisInput {
        platform: Some(platform),
        resources: Some(resources),
        ..AnalysisInput::default()
    });

    assert_eq!(analysis.summary.system_type, SystemType::Supervisor);
    // 9000 histories would warn on an embedded controller but not here
    assert!(
        analysis
            .alerts
            .alerts
            .iter()
            .all(|alert| alert.metric != "history.count")
    );
}

#[test]
fn embedded_class_history_threshold_applies() {
    let resources = parse(
        "Name,Value\nhistory.count,\"9,000\"\ntime.current,2026-08-01 08:00:00\n",
        "resources.csv",
    );
    let analysis = analyze(&AnalysisInput {
        resources: Some(resources),
        ..AnalysisInput::default()
    });
    assert!(
        analysis
            .alerts
            .alerts
            .iter()
            .any(|alert| alert.metric == "history.count"
                && alert.severity == AlertSeverity::Warning)
    );
}

#[test]
fn analysis_serializes_to_json() {
    let resources = parse(
        "Name,Value\ncpu.usage,92%\nheap.used,350 MB\nheap.max,371 MB\n",
        "resources.csv",
    );
    let analysis = analyze(&AnalysisInput {
        resources: Some(resources),
        ..AnalysisInput::default()
    });

    let json = serde_json::to_string_pretty(&analysis).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["summary"]["health_score"], 70);
    assert_eq!(parsed["summary"]["critical_count"], 2);
    assert_eq!(parsed["summary"]["system_type"], "embedded-controller");
    assert!(parsed["metadata"]["generated_at"].as_str().unwrap().contains('T'));
    // Violations mirror the numeric alerts one-to-one
    assert_eq!(parsed["alerts"]["violations"].as_array().unwrap().len(), 2);
}

#[test]
fn every_numeric_alert_has_a_violation() {
    let resources = parse(
        "Name,Value\ncpu.usage,99%\nheap.used,380 MB\nheap.max,400 MB\n\
         globalCapacity.points,\"4,900 (Limit: 5,000)\"\ntime.current,2026-08-01 08:00:00\n",
        "resources.csv",
    );
    let analysis = analyze(&AnalysisInput {
        resources: Some(resources),
        ..AnalysisInput::default()
    });

    let numeric_alerts = analysis
        .alerts
        .alerts
        .iter()
        .filter(|alert| alert.numeric_value.is_some() && alert.threshold.is_some())
        .count();
    assert_eq!(numeric_alerts, analysis.alerts.violations.len());
    assert!(numeric_alerts >= 3);
}
