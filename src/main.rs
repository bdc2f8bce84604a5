// Copyright (c) 2024 Mudit Bhargava
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.
//

// main.rs
//
// This file contains the main entry point for the cache simulator. It
// reads a memory-reference trace from a file or stdin, feeds it through
// one simulator instance, and prints the statistics block.

use clap::Parser;
use colored::Colorize;
use log::{warn, LevelFilter};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use cachesim_rust::cache_simulator::config::{
    CacheConfig, DEFAULT_B, DEFAULT_C, DEFAULT_K, DEFAULT_S, DEFAULT_V,
};
use cachesim_rust::errors::SimulatorError;
use cachesim_rust::utils::parser::parse_trace_line;
use cachesim_rust::utils::report;
use cachesim_rust::CacheSimulator;

#[derive(Parser)]
#[command(name = "cachesim_rust")]
#[command(about = "A trace-driven cache simulator with a victim buffer and stride prefetching")]
#[command(version)]
struct Cli {
    /// Total data capacity in bytes is 2^C
    #[arg(short = 'c', long = "capacity", default_value_t = DEFAULT_C)]
    c: u32,

    /// Size of each block in bytes is 2^B
    #[arg(short = 'b', long = "block", default_value_t = DEFAULT_B)]
    b: u32,

    /// Number of blocks per set is 2^S
    #[arg(short = 's', long = "assoc", default_value_t = DEFAULT_S)]
    s: u32,

    /// Number of blocks in the victim buffer (0 disables it)
    #[arg(short = 'v', long = "victim", default_value_t = DEFAULT_V)]
    v: usize,

    /// Prefetch distance in blocks (0 disables prefetching)
    #[arg(short = 'k', long = "prefetch", default_value_t = DEFAULT_K)]
    k: usize,

    /// Input trace file; the trace is read from stdin when omitted
    #[arg(short = 'i', long = "input")]
    input: Option<PathBuf>,

    /// Emit the statistics bundle as JSON instead of the text block
    #[arg(long)]
    json: bool,

    /// Log level (error, warn, info, debug)
    #[arg(long = "log-level", default_value = "warn")]
    log_level: String,
}

// Helper function to parse the log level string
fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" | "warning" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        _ => LevelFilter::Warn,
    }
}

// Helper function to open the trace source
fn open_trace(input: Option<&PathBuf>) -> Result<Box<dyn BufRead>, SimulatorError> {
    match input {
        Some(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

// Helper function to run the whole trace through one simulator instance
fn run_trace<R: BufRead>(simulator: &mut CacheSimulator, trace: R) -> Result<u64, SimulatorError> {
    let mut skipped = 0u64;

    for (line_no, line) in trace.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_trace_line(&line) {
            Ok(record) => simulator.access(record.kind, record.address),
            Err(err) => {
                warn!("Skipping trace line {}: {}", line_no + 1, err);
                skipped += 1;
            },
        }
    }

    Ok(skipped)
}

fn main() {
    let cli = Cli::parse();

    // RUST_LOG still wins over the flag when set
    env_logger::Builder::new()
        .filter_level(parse_log_level(&cli.log_level))
        .parse_default_env()
        .init();

    let config = CacheConfig::new(cli.c, cli.b, cli.s)
        .with_victim_blocks(cli.v)
        .with_prefetch_distance(cli.k);
    let mut simulator = CacheSimulator::new(config);

    let trace = match open_trace(cli.input.as_ref()) {
        Ok(trace) => trace,
        Err(err) => {
            eprintln!("{} {}", "Failed to open trace:".red(), err);
            std::process::exit(1);
        },
    };

    let skipped = match run_trace(&mut simulator, trace) {
        Ok(skipped) => skipped,
        Err(err) => {
            eprintln!("{} {}", "Failed to read trace:".red(), err);
            std::process::exit(1);
        },
    };
    if skipped > 0 {
        eprintln!("Skipped {} malformed trace lines", skipped);
    }

    let stats = simulator.finalize();

    if cli.json {
        match serde_json::to_string_pretty(&stats) {
            Ok(json) => println!("{}", json),
            Err(err) => {
                eprintln!("{} {}", "Failed to serialize statistics:".red(), err);
                std::process::exit(1);
            },
        }
    } else if let Err(err) = report::write_statistics(&mut io::stdout(), &stats) {
        eprintln!("{} {}", "Failed to write statistics:".red(), err);
        std::process::exit(1);
    }
}
