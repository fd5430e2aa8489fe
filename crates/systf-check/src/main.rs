use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use systf_check::diagnostics::Report;
use systf_check::limits;
use systf_check::registry::{self, Registry, RoutineKind};
use systf_check::time::{time64, SimTime};
use systf_check::trace::{self, TraceHost};
use systf_objects::SignatureId;

#[derive(Parser)]
#[command(name = "systf-check")]
#[command(about = "Compile-time signature checks for system tasks/functions.", long_about = None)]
struct Cli {
    /// Log at debug level unless SYSTF_LOG says otherwise.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Option<Cmd>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Check every call site recorded in an elaboration trace.
    Check {
        #[arg(long)]
        trace: PathBuf,
        #[arg(long)]
        routines: Option<PathBuf>,
        #[arg(long)]
        report_json: bool,
    },
    /// List the registered routines and their signatures.
    Routines {
        #[arg(long)]
        routines: Option<PathBuf>,
        /// Only list routines registered with this signature.
        #[arg(long, value_enum)]
        signature: Option<SignatureId>,
        #[arg(long)]
        json: bool,
    },
    /// Join two 32-bit time words into one 64-bit time, or split one with --split.
    Time {
        #[arg(long, required_unless_present = "split", requires = "low")]
        high: Option<u32>,
        #[arg(long, requires = "high")]
        low: Option<u32>,
        #[arg(long, conflicts_with_all = ["high", "low"])]
        split: Option<u64>,
    },
}

#[derive(Debug, Serialize)]
struct RoutineRow<'a> {
    name: &'a str,
    kind: RoutineKind,
    signature: SignatureId,
}

fn main() -> std::process::ExitCode {
    match try_main() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            std::process::ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("SYSTF_LOG")
                .unwrap_or_else(|_| level.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

fn read_limited(path: &Path, what: &str) -> Result<Vec<u8>> {
    let bytes = std::fs::read(path).with_context(|| format!("read {what}: {}", path.display()))?;
    let max = limits::max_trace_bytes();
    if bytes.len() > max {
        anyhow::bail!(
            "{what} too large: {} bytes (max {max}): {}",
            bytes.len(),
            path.display()
        );
    }
    Ok(bytes)
}

fn load_registry(routines: Option<&Path>) -> Result<Registry> {
    let mut reg = Registry::with_builtins();
    if let Some(path) = routines {
        let bytes = read_limited(path, "routine table")?;
        let table = registry::parse_routine_table(&bytes)
            .with_context(|| format!("parse routine table: {}", path.display()))?;
        reg.register_table(table)
            .with_context(|| format!("register routines from {}", path.display()))?;
    }
    Ok(reg)
}

fn print_json<T: Serialize>(v: &T) -> Result<()> {
    println!("{}", serde_json::to_string(v)?);
    Ok(())
}

fn try_main() -> Result<std::process::ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let Some(cmd) = cli.cmd else {
        anyhow::bail!("missing subcommand (try --help)");
    };

    match cmd {
        Cmd::Check {
            trace,
            routines,
            report_json,
        } => {
            let reg = load_registry(routines.as_deref())?;
            let bytes = read_limited(&trace, "trace")?;
            let mut host = TraceHost::from_json(&bytes)
                .with_context(|| format!("load trace: {}", trace.display()))?;
            let checked = trace::check_trace(&mut host, &reg)
                .with_context(|| format!("check trace: {}", trace.display()))?;

            let finish_code = host.finish_code();
            if report_json {
                let report = Report::ok()
                    .with_calls_checked(checked)
                    .with_diagnostics(host.diagnostics().to_vec())
                    .with_finish_code(finish_code);
                print_json(&report)?;
            } else {
                for line in host.output() {
                    println!("{line}");
                }
            }

            Ok(match finish_code {
                None => std::process::ExitCode::SUCCESS,
                Some(code) => std::process::ExitCode::from(u8::try_from(code).unwrap_or(1)),
            })
        }
        Cmd::Routines {
            routines,
            signature,
            json,
        } => {
            let reg = load_registry(routines.as_deref())?;
            let selected: Vec<_> = reg
                .iter()
                .filter(|r| signature.map_or(true, |s| r.signature == s))
                .collect();
            if json {
                let rows: Vec<RoutineRow<'_>> = selected
                    .iter()
                    .map(|r| RoutineRow {
                        name: &r.name,
                        kind: r.kind,
                        signature: r.signature,
                    })
                    .collect();
                print_json(&rows)?;
            } else {
                for r in &selected {
                    println!("{}\t{}\t{}", r.name, r.kind.as_str(), r.signature);
                }
            }
            Ok(std::process::ExitCode::SUCCESS)
        }
        Cmd::Time { high, low, split } => {
            match (split, high, low) {
                (Some(t), _, _) => {
                    let t = SimTime::from_u64(t);
                    println!("{} {}", t.high, t.low);
                }
                (None, Some(high), Some(low)) => println!("{}", time64(high, low)),
                _ => anyhow::bail!("set --high and --low, or --split"),
            }
            Ok(std::process::ExitCode::SUCCESS)
        }
    }
}
