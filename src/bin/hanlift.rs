//! Hanlift CLI - lift hard-coded Korean text into a translation resource.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use hanlift::builder::{Lift, LiftReport};
use hanlift::errors::{exit_code, LiftError};
use hanlift::output::{OutputError, DEFAULT_OUTPUT};
use hanlift::resource::ResourceTree;
use hanlift::walker::DEFAULT_EXTENSION;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hanlift")]
#[command(about = "Replace hard-coded Korean text with t() calls and collect it into a JSON resource")]
#[command(version)]
struct Cli {
    /// Root directory to scan
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Resource file to write
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Directory names to skip (replaces the built-in list)
    #[arg(long, value_delimiter = ',')]
    exclude: Vec<String>,

    /// File extension to process
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    extension: String,

    /// Visit directory entries in name order for reproducible keys
    #[arg(long)]
    sorted: bool,

    /// Report what would change without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Output the run report as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json_output = cli.json;

    if let Err(e) = run(cli) {
        if json_output {
            #[derive(Serialize)]
            struct ErrorOutput {
                error: String,
            }

            let payload = ErrorOutput {
                error: e.to_string(),
            };

            let json = serde_json::to_string(&payload)
                .unwrap_or_else(|_| "{\"error\":\"serialization failed\"}".to_string());
            eprintln!("{json}");
        } else {
            eprintln!("error: {}", e);
        }
        std::process::exit(exit_code(&e));
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "hanlift=warn",
        1 => "hanlift=info",
        _ => "hanlift=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), LiftError> {
    let mut lift = Lift::new(cli.root)
        .output(cli.output)
        .extension(&cli.extension)
        .sorted(cli.sorted)
        .dry_run(cli.dry_run);

    if !cli.exclude.is_empty() {
        lift = lift.exclude(cli.exclude);
    }

    let report = lift.run()?;

    if cli.json {
        #[derive(Serialize)]
        struct Output<'a> {
            #[serde(flatten)]
            report: &'a LiftReport,
            replacements: usize,
            #[serde(skip_serializing_if = "Option::is_none")]
            resource: Option<&'a ResourceTree>,
        }

        let output = Output {
            report: &report,
            replacements: report.replacement_count(),
            resource: cli.dry_run.then_some(&report.resource),
        };
        let json = serde_json::to_string_pretty(&output).map_err(OutputError::from)?;
        println!("{json}");
    } else if cli.dry_run {
        let json = report.resource.to_json_pretty().map_err(OutputError::from)?;
        println!("{json}");
    } else {
        print_summary(&report);
    }

    Ok(())
}

fn print_summary(report: &LiftReport) {
    use std::io::{BufWriter, Write};
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    for file in &report.files {
        writeln!(
            out,
            "{}: {} replacements",
            file.path.display(),
            file.replacements.len()
        )
        .ok();
    }
    writeln!(
        out,
        "Scanned {} files, rewrote {}, extracted {} strings",
        report.files_scanned,
        report.files.len(),
        report.replacement_count()
    )
    .ok();
    if let Some(path) = &report.output {
        writeln!(out, "Wrote {}", path.display()).ok();
    }
}
