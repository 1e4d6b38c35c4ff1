use bas_processor::cli::{args::Args, commands};
use clap::Parser;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    // Create the async runtime for the I/O boundary; the parsing core
    // itself is synchronous
    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(commands::run(args));

    match result {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("BAS Processor - Building Automation Export Analyzer");
    println!("===================================================");
    println!();
    println!("Parse vendor building-automation export files (CSV and text dumps)");
    println!("into normalized datasets and combined health reports.");
    println!();
    println!("USAGE:");
    println!("    bas-processor <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    parse       Detect and parse export files into normalized datasets");
    println!("    analyze     Combine multiple export files into a health report");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Parse a directory of exports and write datasets as JSON:");
    println!("    bas-processor parse ./exports --output ./parsed");
    println!();
    println!("    # Parse one file with an explicit format hint:");
    println!("    bas-processor parse resources.csv --format resource-export");
    println!();
    println!("    # Combine exports into a single health analysis:");
    println!("    bas-processor analyze platform.txt resources.csv devices.csv \\");
    println!("                          --output report.json");
    println!();
    println!("For detailed help on any command, use:");
    println!("    bas-processor <COMMAND> --help");
}
