//! CLI surface over [`leakcheck_driver`], grounded
//! on `svql_cli::main`'s `tracing_subscriber` setup and
//! `svql_cli::args::Args`'s `clap::Parser` derive style.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use leakcheck_driver::{run_independence, run_standard, DriverConfig, DriverError};
use leakcheck_smt::{Mode, Verdict};

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Formal d-probing leakage verifier for gate-level circuits.
#[derive(Parser, Debug)]
#[command(name = "leakcheck", disable_version_flag = true, about, long_about = None)]
struct Cli {
    /// `-p <netlist.v> <top_module>`: synthesize to JSON and write an
    /// all-unimportant label template.
    #[arg(short = 'p', num_args = 2, value_names = ["NETLIST_V", "TOP_MODULE"])]
    parse_verilog: Option<Vec<String>>,

    /// `-c <netlist.json> <order> <labeling.txt> <mode>`: run
    /// probing-security verification; mode is `s` (stable) or `t`
    /// (transient).
    #[arg(short = 'c', num_args = 4, value_names = ["NETLIST_JSON", "ORDER", "LABELING_TXT", "MODE"])]
    check: Option<Vec<String>>,

    /// `-i <netlist.json> <order> <labeling.txt>`: run independence
    /// verification.
    #[arg(short = 'i', num_args = 3, value_names = ["NETLIST_JSON", "ORDER", "LABELING_TXT"])]
    independence: Option<Vec<String>>,

    /// With `-c`, generate the optimized per-secret labeling family and
    /// verify in parallel.
    #[arg(short = 'o', default_value_t = false)]
    optimized: bool,

    /// Print the version and exit.
    #[arg(short = 'v', default_value_t = false)]
    version: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_thread_ids(true)
        .init();

    let cli = Cli::parse();
    match dispatch(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}

fn dispatch(cli: &Cli) -> leakcheck_driver::Result<ExitCode> {
    if cli.version {
        println!("leakcheck {}", env!("CARGO_PKG_VERSION"));
        return Ok(ExitCode::SUCCESS);
    }

    let modes_selected =
        usize::from(cli.parse_verilog.is_some()) + usize::from(cli.check.is_some()) + usize::from(cli.independence.is_some());
    if modes_selected != 1 {
        return Err(DriverError::Misuse("exactly one of -p, -c, -i must be given".to_string()));
    }

    if let Some(args) = &cli.parse_verilog {
        return run_parse_verilog(args);
    }
    if let Some(args) = &cli.check {
        return run_check(args, cli.optimized);
    }
    if let Some(args) = &cli.independence {
        return run_independence_cmd(args);
    }
    unreachable!("modes_selected == 1 guarantees one branch above ran")
}

fn run_parse_verilog(args: &[String]) -> leakcheck_driver::Result<ExitCode> {
    let [netlist_v, top_module] = args else {
        unreachable!("clap enforces num_args = 2")
    };
    let path = require_suffix(netlist_v, "v")?;
    let (json_path, label_path) = leakcheck_driver::synth::synthesize(&path, top_module)?;
    info!(json = %json_path.display(), labels = %label_path.display(), "synthesized netlist and label template");
    Ok(ExitCode::SUCCESS)
}

fn run_check(args: &[String], optimized: bool) -> leakcheck_driver::Result<ExitCode> {
    let [netlist_json, order, labeling_txt, mode] = args else {
        unreachable!("clap enforces num_args = 4")
    };
    let netlist_path = require_suffix(netlist_json, "json")?;
    let labeling_path = require_suffix(labeling_txt, "txt")?;
    let order: u32 = order.parse().map_err(|_| DriverError::Misuse(format!("order {order:?} is not an integer")))?;
    let mode = match mode.as_str() {
        "s" => Mode::Stable,
        "t" => Mode::Transient,
        other => return Err(DriverError::Misuse(format!("unknown mode {other:?}, expected 's' or 't'"))),
    };

    let raw = load_netlist(&netlist_path)?;
    let label_text = std::fs::read_to_string(&labeling_path)?;
    let config = DriverConfig::default().with_order(order).with_mode(mode).with_optimized(optimized);

    let verdict = run_standard(&raw, &label_text, &config)?;
    report(&verdict)
}

fn run_independence_cmd(args: &[String]) -> leakcheck_driver::Result<ExitCode> {
    let [netlist_json, order, labeling_txt] = args else {
        unreachable!("clap enforces num_args = 3")
    };
    let netlist_path = require_suffix(netlist_json, "json")?;
    let labeling_path = require_suffix(labeling_txt, "txt")?;
    let order: u32 = order.parse().map_err(|_| DriverError::Misuse(format!("order {order:?} is not an integer")))?;

    let raw = load_netlist(&netlist_path)?;
    let label_text = std::fs::read_to_string(&labeling_path)?;
    let config = DriverConfig::default().with_order(order);

    let verdict = run_independence(&raw, &label_text, &config)?;
    println!("{}", verdict.is_secure());
    Ok(if verdict.is_secure() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn report(verdict: &Verdict) -> leakcheck_driver::Result<ExitCode> {
    match verdict {
        Verdict::Secure => {
            println!("(secure, [])");
            Ok(ExitCode::SUCCESS)
        }
        Verdict::Insecure(witness) => {
            println!("(insecure, {witness:?})");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn require_suffix(path: &str, suffix: &str) -> leakcheck_driver::Result<PathBuf> {
    let path = PathBuf::from(path);
    if path.extension().and_then(|e| e.to_str()) != Some(suffix) {
        return Err(DriverError::Misuse(format!("{} must end in .{suffix}", path.display())));
    }
    Ok(path)
}

fn load_netlist(path: &PathBuf) -> leakcheck_driver::Result<leakcheck_common::Graph> {
    let json = std::fs::read_to_string(path)?;
    Ok(leakcheck_netlist::load_netlist(&json)?)
}
