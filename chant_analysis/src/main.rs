// Chant Mode Analysis: CLI entry point.
//
// Reads every MusicXML chant in the input directory and writes mode and
// pattern tables. The pipeline: list files → pass 1 (corpus width) →
// pass 2 (per-chant analysis) → CSV output.
//
// Usage:
//   cargo run -p chant_analysis
//
// There are no flags. Settings come from `chant_analysis.json` in the
// working directory if present (see config.rs), else defaults: scores from
// `data/`, tables to `output/`.

use chant_analysis::config::{AnalysisConfig, CONFIG_FILE_NAME};
use chant_analysis::corpus::{Progress, analyze_files, list_score_files, max_measure_count};
use chant_analysis::tables::write_tables;
use std::path::Path;

fn main() {
    println!("=== Chant Mode Analysis ===");

    let config_path = Path::new(CONFIG_FILE_NAME);
    let config = if config_path.exists() {
        println!("Found {}, loading...", CONFIG_FILE_NAME);
        match AnalysisConfig::load(config_path) {
            Ok(c) => {
                println!("  Loaded successfully.");
                c
            }
            Err(e) => {
                eprintln!("  Failed to load: {}. Using defaults.", e);
                AnalysisConfig::default()
            }
        }
    } else {
        AnalysisConfig::default()
    };

    if !config.input_dir.exists() {
        let dir = config.input_dir.display();
        println!(
            "Error: '{dir}' folder not found. Please create a '{dir}' folder and place your XML files there."
        );
        return;
    }

    if let Err(e) = run(&config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &AnalysisConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("Input: {}", config.input_dir.display());
    println!("Output: {}", config.output_dir.display());
    println!();

    let files = list_score_files(&config.input_dir, &config.file_extension)?;

    println!("[1/3] Analyzing files to determine structure...");
    let max_measures = max_measure_count(&files, &mut report_progress);
    println!("  Longest chant: {} mukhlis.", max_measures);

    println!("[2/3] Processing files...");
    let report = analyze_files(
        &files,
        max_measures,
        &config.pattern_options(),
        &mut report_progress,
    );
    println!(
        "  {} chants analyzed, {} skipped.",
        report.records.len(),
        report.skipped.len()
    );

    println!("[3/3] Generating output files...");
    for path in write_tables(&report, &config.output_dir, config.write_json)? {
        println!("  Created {}", path.display());
    }

    println!();
    println!("Analysis complete!");
    Ok(())
}

fn report_progress(progress: Progress<'_>) {
    match progress {
        Progress::PreProcessing(path) => println!("  Pre-processing {}", file_name(path)),
        Progress::Analyzing(path) => println!("  Analyzing {}", file_name(path)),
        Progress::Skipped { path, error } => {
            eprintln!("Warning: skipping {}: {}", file_name(path), error)
        }
        Progress::Warning(message) => eprintln!("Warning: {}", message),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
