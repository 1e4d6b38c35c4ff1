//! Command implementations for the BAS processor CLI
//!
//! File I/O lives here at the boundary: content is read asynchronously,
//! then handed to the synchronous, side-effect-free parsing core.

use crate::app::models::FormatId;
use crate::app::models::analysis::{AnalysisInput, SystemAnalysis};
use crate::app::services::analyzer::analyze;
use crate::app::services::format_registry;
use crate::app::services::orchestrator::{ParseOutcome, ParserRegistry, parse_file};
use crate::cli::args::{AnalyzeArgs, Args, Commands, ParseArgs};
use crate::config::ParseOptions;
use anyhow::Context;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Dispatch the parsed CLI arguments to their command
pub async fn run(args: Args) -> anyhow::Result<()> {
    match args.command {
        Some(Commands::Parse(parse_args)) => parse_command(parse_args).await,
        Some(Commands::Analyze(analyze_args)) => analyze_command(analyze_args).await,
        None => Ok(()),
    }
}

// =============================================================================
// parse Command
// =============================================================================

async fn parse_command(args: ParseArgs) -> anyhow::Result<()> {
    let options = ParseOptions::default()
        .with_max_rows(args.max_rows)
        .with_max_file_bytes(args.max_bytes)
        .with_strict_validation(args.strict);
    options.validate()?;

    let files = discover_files(&args.inputs)?;
    anyhow::ensure!(!files.is_empty(), "no supported export files found");
    info!("Parsing {} files", files.len());

    if let Some(output_dir) = &args.output {
        tokio::fs::create_dir_all(output_dir)
            .await
            .with_context(|| format!("creating output directory {}", output_dir.display()))?;
    }

    let registry = ParserRegistry::with_defaults();
    let progress = batch_progress(files.len() as u64);
    let mut succeeded = 0usize;
    let mut failed = 0usize;

    for file in &files {
        let filename = display_name(file);
        let content = tokio::fs::read_to_string(file)
            .await
            .with_context(|| format!("reading {}", file.display()))?;

        let outcome = parse_file(&content, &filename, &options, &registry, args.format);
        progress.suspend(|| print_outcome(&filename, &outcome));

        if outcome.success {
            succeeded += 1;
            if let (Some(output_dir), Some(dataset)) = (&args.output, &outcome.dataset) {
                let target = output_dir.join(json_name(file));
                let json = serde_json::to_string_pretty(dataset)?;
                tokio::fs::write(&target, json)
                    .await
                    .with_context(|| format!("writing {}", target.display()))?;
            }
        } else {
            failed += 1;
        }
        progress.inc(1);
    }

    progress.finish_and_clear();
    println!(
        "\n{} {} parsed, {} failed",
        "Done:".bold(),
        succeeded.to_string().green(),
        if failed > 0 {
            failed.to_string().red()
        } else {
            failed.to_string().normal()
        }
    );

    anyhow::ensure!(failed == 0, "{failed} files failed to parse");
    Ok(())
}

fn print_outcome(filename: &str, outcome: &ParseOutcome) {
    if let Some(dataset) = outcome.dataset.as_ref().filter(|_| outcome.success) {
        let counts = dataset.summary.status_counts;
        println!(
            "{} {} [{}] {} rows, confidence {} ({} ok / {} down / {} alarm / {} fault)",
            "✓".green().bold(),
            filename.bold(),
            dataset.format,
            dataset.rows.len(),
            outcome.detection.confidence,
            counts.ok.to_string().green(),
            counts.down.to_string().red(),
            counts.alarm.to_string().yellow(),
            counts.fault.to_string().red(),
        );
        for finding in &dataset.summary.critical_findings {
            println!("    {} {}", "!".red().bold(), finding);
        }
        for warning in &outcome.warnings {
            println!("    {} {}", "~".yellow(), warning.dimmed());
        }
    } else {
        println!("{} {}", "✗".red().bold(), filename.bold());
        for error in &outcome.errors {
            println!("    {} {}", "!".red(), error);
        }
        for reason in &outcome.detection.reasons {
            println!("    {} {}", "·".dimmed(), reason.dimmed());
        }
    }
}

// =============================================================================
// analyze Command
// =============================================================================

async fn analyze_command(args: AnalyzeArgs) -> anyhow::Result<()> {
    let options = ParseOptions::default().with_max_rows(args.max_rows);
    options.validate()?;

    let files = discover_files(&args.inputs)?;
    anyhow::ensure!(!files.is_empty(), "no supported export files found");
    info!("Analyzing {} files", files.len());

    // Read every file concurrently; parsing itself stays synchronous
    let reads = files.iter().map(|file| async move {
        let content = tokio::fs::read_to_string(file)
            .await
            .with_context(|| format!("reading {}", file.display()))?;
        Ok::<(PathBuf, String), anyhow::Error>((file.clone(), content))
    });
    let contents = futures::future::try_join_all(reads).await?;

    let registry = ParserRegistry::with_defaults();
    let mut input = AnalysisInput::default();

    for (file, content) in &contents {
        let filename = display_name(file);
        let outcome = parse_file(content, &filename, &options, &registry, None);
        let Some(dataset) = outcome.dataset else {
            warn!("Skipping {}: {}", filename, outcome.errors.join("; "));
            println!(
                "{} skipping {}: {}",
                "~".yellow(),
                filename,
                outcome.errors.join("; ")
            );
            continue;
        };

        // Assign each dataset to its analysis slot by detected format; a
        // second inventory export lands in the protocol slot
        match dataset.format {
            FormatId::PlatformInfo if input.platform.is_none() => {
                input.platform = Some(dataset);
            }
            FormatId::ResourceExport if input.resources.is_none() => {
                input.resources = Some(dataset);
            }
            FormatId::DeviceInventory if input.device_inventory.is_none() => {
                input.device_inventory = Some(dataset);
            }
            FormatId::DeviceInventory | FormatId::ProtocolDevices
                if input.protocol_inventory.is_none() =>
            {
                input.protocol_inventory = Some(dataset);
            }
            FormatId::NetworkDevices if input.network_devices.is_none() => {
                input.network_devices = Some(dataset);
            }
            FormatId::Topology if input.topology.is_none() => {
                input.topology = Some(dataset);
            }
            other => {
                warn!("No free analysis slot for {} ({})", filename, other);
            }
        }
    }

    let analysis = analyze(&input);
    print_report(&analysis);

    if let Some(target) = &args.output {
        let json = serde_json::to_string_pretty(&analysis)?;
        tokio::fs::write(target, json)
            .await
            .with_context(|| format!("writing {}", target.display()))?;
        println!("\nReport written to {}", target.display().to_string().bold());
    }

    Ok(())
}

fn print_report(analysis: &SystemAnalysis) {
    let summary = &analysis.summary;
    let score = summary.health_score;
    let score_text = format!("{score}/100");
    let score_colored = if score >= 80 {
        score_text.green().bold()
    } else if score >= 50 {
        score_text.yellow().bold()
    } else {
        score_text.red().bold()
    };

    println!("\n{}", "System Health Analysis".bold().underline());
    println!("Health score:   {score_colored}");
    println!(
        "System type:    {:?} | devices: {} | capacity: {:.1}%",
        summary.system_type, summary.total_devices, summary.capacity_utilization_percent
    );
    println!(
        "Alerts:         {} critical, {} warning",
        summary.critical_count.to_string().red(),
        summary.warning_count.to_string().yellow()
    );
    println!(
        "Confidence:     {}% ({} files)",
        analysis.metadata.confidence, analysis.metadata.files_processed
    );

    if let Some(product) = &analysis.platform.product {
        println!("Platform:       {product}");
    }

    if !analysis.alerts.alerts.is_empty() {
        println!("\n{}", "Alerts".bold());
        for alert in &analysis.alerts.alerts {
            let marker = match alert.severity {
                crate::app::models::AlertSeverity::Critical => "CRIT".red().bold(),
                crate::app::models::AlertSeverity::Warning => "WARN".yellow().bold(),
                crate::app::models::AlertSeverity::Info => "INFO".normal(),
            };
            println!("  [{marker}] {}: {}", alert.metric, alert.message);
        }
    }

    if !summary.recommended_actions.is_empty() {
        println!("\n{}", "Recommended actions".bold());
        for (index, action) in summary.recommended_actions.iter().enumerate() {
            println!("  {}. {action}", index + 1);
        }
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Expand files and directories into the list of supported export files
fn discover_files(inputs: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let extensions = format_registry::known_extensions();
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).follow_links(false) {
                let entry = entry?;
                if entry.file_type().is_file() && has_known_extension(entry.path(), &extensions) {
                    files.push(entry.path().to_path_buf());
                }
            }
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            anyhow::bail!("input path does not exist: {}", input.display());
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn has_known_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .map(|ext| extensions.contains(&ext.as_str()))
        .unwrap_or(false)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn json_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "dataset".to_string());
    format!("{stem}.json")
}

fn batch_progress(total: u64) -> ProgressBar {
    let progress = ProgressBar::new(total);
    progress.set_style(
        ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    progress
}
