//! Evoplot CLI - Render progress comparison charts from JSON configuration.

use std::fs;
use std::path::PathBuf;

use evoplot::report::run_report;
use evoplot::schema::ReportConfig;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json>", args[0]);
        eprintln!();
        eprintln!("Render a comparison chart of search progress across result databases.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to report configuration file");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);

    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let config: ReportConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    println!("Progress comparison");
    println!("===================");
    println!("Collections: {}", config.collections.len());
    for spec in &config.collections {
        println!("  {} -> {}", spec.name, spec.database.display());
    }
    println!("Table: {}", config.table);
    println!("Decimation stride: {}", config.decimation_stride);
    println!(
        "Confidence intervals: {}",
        if config.compute_ci { "on" } else { "off" }
    );
    if let Some(path) = &config.chart.save_path {
        println!("Output: {}", path.display());
    }
    println!();

    if let Err(e) = run_report(config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    println!("Done.");
}

fn print_example_config() {
    let config = ReportConfig::default();

    println!("Example configuration (config.json):");
    println!("{}", serde_json::to_string_pretty(&config).unwrap());
}
