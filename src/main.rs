use std::env;
use std::process;
use std::time::Instant;

use spdist::{
    dump_triplets, load_matrix, run_distributed, spgemm_parallel, append_timing, Result,
};

const TIMING_LOG: &str = "timing_results.csv";

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <sequential|distributed> <matrix-file> [ranks]", program);
    eprintln!("  sequential   multiply in one process and report timing");
    eprintln!("  distributed  partition rows across ranks (default: CPU count) and verify");
    process::exit(2);
}

fn run(mode: &str, path: &str, ranks: usize) -> Result<()> {
    println!("Loading matrix from: {}", path);
    let load_start = Instant::now();
    let a = load_matrix(path)?;
    let load_seconds = load_start.elapsed().as_secs_f64();

    println!("Dimensions: {} × {}, nnz={}", a.n_rows, a.n_cols, a.nnz());

    match mode {
        "sequential" => {
            let multiply_start = Instant::now();
            let c = spgemm_parallel(&a, &a)?;
            let multiply_seconds = multiply_start.elapsed().as_secs_f64();

            println!("\n=== Timing Summary ===");
            println!("Load time      : {:.6} s", load_seconds);
            println!("Multiply time  : {:.6} s", multiply_seconds);
            println!("Result nnz     : {}", c.nnz());

            if a.n_rows <= 16 {
                println!();
                dump_triplets(&c, &mut std::io::stdout())?;
            }

            append_timing(TIMING_LOG, "sequential", multiply_seconds)?;
        }
        "distributed" => {
            println!("Ranks: {}", ranks);
            let report = run_distributed(a, ranks)?;

            println!("\n=== Timing Summary ===");
            println!("Load time      : {:.6} s", load_seconds);
            println!("Multiply time  : {:.6} s (worst rank)", report.multiply_seconds);
            println!("Gather time    : {:.6} s", report.gather_seconds);
            println!("Result nnz     : {}", report.result.nnz());

            match report.verdict {
                spdist::Verdict::Pass => {
                    println!("Verification PASS: distributed result matches sequential");
                }
                spdist::Verdict::Fail(mismatch) => {
                    eprintln!("Verification FAIL: {}", mismatch);
                    process::exit(1);
                }
            }

            append_timing(TIMING_LOG, "distributed", report.multiply_seconds)?;
        }
        _ => unreachable!("mode validated by main"),
    }

    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        usage(&args[0]);
    }

    let mode = args[1].as_str();
    if mode != "sequential" && mode != "distributed" {
        usage(&args[0]);
    }

    let ranks = match args.get(3) {
        Some(arg) => match arg.parse::<usize>() {
            Ok(n) if n > 0 => n,
            _ => usage(&args[0]),
        },
        None => num_cpus::get(),
    };

    if let Err(e) = run(mode, &args[2], ranks) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
