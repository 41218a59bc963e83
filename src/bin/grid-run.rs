//! CLI tool to run a view script against a JSON record file.

use clap::Parser;
use gridview_rs::{GridConfig, execute_view};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process;

/// Apply a view script to JSON records and print the resulting page.
///
/// The page is written as pretty JSON: page items, totals, current page
/// and sort state.
#[derive(Parser)]
#[command(name = "grid-run")]
struct Cli {
    /// Records file (a JSON array of objects)
    records: String,

    /// View script (.grid); without one the first page is printed unsorted
    #[arg(short, long)]
    script: Option<String>,

    /// Grid config (.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Show paths and per-stage record counts on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn read_file(kind: &str, path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading {kind} file '{path}': {e}");
            process::exit(1);
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let records_text = read_file("records", &cli.records);
    let script_text = cli
        .script
        .as_deref()
        .map(|path| read_file("script", path))
        .unwrap_or_default();

    let config = match &cli.config {
        Some(path) => match GridConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{path}': {e}");
                process::exit(1);
            }
        },
        None => GridConfig::default(),
    };

    if cli.verbose {
        eprintln!("Records: {}", cli.records);
        eprintln!("Script:  {}", cli.script.as_deref().unwrap_or("(none)"));
        eprintln!("Config:  {}", cli.config.as_deref().unwrap_or("(defaults)"));
        eprintln!("Output:  {}", cli.output.as_deref().unwrap_or("(stdout)"));
    }

    let (view, trace) = match execute_view(&records_text, &script_text, &config) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Grid error: {e}");
            process::exit(1);
        }
    };

    let output = match serde_json::to_string_pretty(&view) {
        Ok(json) => json + "\n",
        Err(e) => {
            eprintln!("Error encoding page: {e}");
            process::exit(1);
        }
    };

    if let Some(out_path) = &cli.output {
        if let Some(parent) = Path::new(out_path.as_str()).parent()
            && !parent.as_os_str().is_empty()
            && fs::create_dir_all(parent).is_err()
        {
            eprintln!("Error creating output directory for '{out_path}'");
            process::exit(1);
        }
        if let Err(e) = fs::write(out_path, &output) {
            eprintln!("Error writing output file '{out_path}': {e}");
            process::exit(1);
        }
    } else if let Err(e) = io::stdout().write_all(output.as_bytes()) {
        eprintln!("Error writing output: {e}");
        process::exit(1);
    }

    if cli.verbose {
        for stage in &trace {
            eprintln!(
                "{:<9} {} in -> {} out",
                stage.stage_name, stage.input_count, stage.output_count
            );
        }
        eprintln!(
            "Page:    {}/{} ({} matched)",
            view.current_page, view.total_pages, view.total_items
        );
    }
}
