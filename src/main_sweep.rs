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

// main_sweep.rs
//
// This file contains the parameter-sweep harness. It replays one trace
// over a grid of cache geometries, estimates the storage budget of each,
// skips configurations over the budget cap, and reports the geometry with
// the lowest average access time.

use clap::Parser;
use colored::Colorize;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;

use cachesim_rust::cache_simulator::config::{CacheConfig, DEFAULT_K, DEFAULT_V};
use cachesim_rust::utils::parser::{parse_trace, TraceRecord};
use cachesim_rust::CacheSimulator;

/// Storage budget cap in KiB, counting tag and state bits.
const BUDGET_CAP_KB: f64 = 48.0;

#[derive(Parser)]
#[command(name = "cachesim_sweep")]
#[command(about = "Sweep cache geometries over a reference trace and report the best AAT")]
#[command(version)]
struct Cli {
    /// Input trace file (replayed once per configuration)
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Number of blocks in the victim buffer, fixed across the sweep
    #[arg(short = 'v', long = "victim", default_value_t = DEFAULT_V)]
    v: usize,

    /// Prefetch distance in blocks, fixed across the sweep
    #[arg(short = 'k', long = "prefetch", default_value_t = DEFAULT_K)]
    k: usize,
}

/// Estimated storage in KiB for a geometry: per-line tag and state bits
/// plus the data array, for both the cache proper and the victim buffer.
fn storage_budget_kb(c: u32, b: u32, s: u32, v: usize) -> f64 {
    let data_bits = (1u64 << b) * 8;
    let cache_bits = (1u64 << (c - b)) * (64 - c as u64 + s as u64 + 1 + data_bits);
    let victim_bits = v as u64 * (64 - b as u64 + 1 + data_bits);
    (cache_bits + victim_bits) as f64 / (1024.0 * 8.0)
}

fn replay(records: &[TraceRecord], config: CacheConfig) -> f64 {
    let mut simulator = CacheSimulator::new(config);
    for record in records {
        simulator.access(record.kind, record.address);
    }
    simulator.finalize().avg_access_time
}

struct Best {
    aat: f64,
    c: u32,
    b: u32,
    s: u32,
}

fn run_sweep(cli: &Cli, records: &[TraceRecord], out: &mut File) -> io::Result<Option<Best>> {
    let mut best: Option<Best> = None;

    for c in 12..=15u32 {
        for b in 3..=6u32 {
            for s in 0..=(c - b) {
                let budget_kb = storage_budget_kb(c, b, s, cli.v);
                print!("{}\t{}\t{}\t{}\t{}\t{:.6}\t", c, b, s, cli.v, cli.k, budget_kb);
                write!(out, "{}\t{}\t{}\t{}\t{}\t{:.6}\t", c, b, s, cli.v, cli.k, budget_kb)?;

                if budget_kb > BUDGET_CAP_KB {
                    println!();
                    writeln!(out)?;
                    continue;
                }

                let config = CacheConfig::new(c, b, s)
                    .with_victim_blocks(cli.v)
                    .with_prefetch_distance(cli.k);
                let aat = replay(records, config);
                println!("{:.6}", aat);
                writeln!(out, "{:.6}", aat)?;

                if best.as_ref().map_or(true, |best| aat < best.aat) {
                    best = Some(Best { aat, c, b, s });
                }
            }
        }
    }

    Ok(best)
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let text = match fs::read_to_string(&cli.input) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("{} {}", "Failed to read trace:".red(), err);
            std::process::exit(1);
        },
    };
    let records = parse_trace(&text);

    let out_path = format!("{}.out", cli.input.display());
    let mut out = match File::create(&out_path) {
        Ok(out) => out,
        Err(err) => {
            eprintln!("{} {}", "Failed to create output file:".red(), err);
            std::process::exit(1);
        },
    };

    if let Err(err) = writeln!(out, "{}:\n", cli.input.display()) {
        eprintln!("{} {}", "Failed to write output file:".red(), err);
        std::process::exit(1);
    }

    match run_sweep(&cli, &records, &mut out) {
        Ok(Some(best)) => {
            let summary = format!(
                "Best AAT: {:.6} at C={}, B={}, S={}, V={}, K={}",
                best.aat, best.c, best.b, best.s, cli.v, cli.k
            );
            println!("\n{}", summary.green().bold());
            let _ = writeln!(out, "\n{}", summary);
        },
        Ok(None) => {
            eprintln!("No configuration fits the {} KB storage budget", BUDGET_CAP_KB);
        },
        Err(err) => {
            eprintln!("{} {}", "Sweep failed:".red(), err);
            std::process::exit(1);
        },
    }

    println!("Results written to {}", out_path);
}
