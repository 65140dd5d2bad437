//! pcapsum CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pcapsum::capture::{self, DEFAULT_MAX_PACKETS};

/// Summarize pcap and pcapng capture files.
#[derive(Parser, Debug)]
#[command(name = "pcapsum")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Capture file to summarize (.pcap or .pcapng, optionally gzipped)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Maximum number of packet samples to include
    #[arg(long = "max-packets", default_value_t = DEFAULT_MAX_PACKETS)]
    max_packets: usize,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Set up logging
    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    match capture::summarize_file(&args.file, args.max_packets) {
        Ok(summary) => {
            println!("=== Capture Metadata ===");
            for line in &summary.metadata {
                println!("{line}");
            }
            println!();
            println!("=== Top EtherTypes ===");
            println!("{}", summary.ethertype_section);
            println!();
            println!("=== Sample Packets ===");
            println!("{}", summary.sample_section);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", err.to_user_string());
            ExitCode::FAILURE
        }
    }
}
