//! Offline replay driver.
//!
//! Loads an event log from a file (JSON event history or the line format),
//! replays it to a target time, and prints an occupancy and metrics report.
//!
//! ```text
//! hospital-replay <log-file> [--time T] [--beds A=55,B=40,...] [--params params.json]
//! ```

use hospital_replay_core_rs::{
    parse_event_history, parse_log_lines, Disease, HospitalConfig, ParameterSet, Simulator,
};
use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::process::ExitCode;

struct Args {
    log_path: String,
    time: Option<f64>,
    beds: Option<HashMap<Disease, usize>>,
    params_path: Option<String>,
}

const USAGE: &str =
    "usage: hospital-replay <log-file> [--time T] [--beds A=55,B=40,...] [--params params.json]";

fn parse_args(argv: &[String]) -> Result<Args, String> {
    let mut log_path = None;
    let mut time = None;
    let mut beds = None;
    let mut params_path = None;

    let mut iter = argv.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--time" => {
                let value = iter.next().ok_or("--time requires a value")?;
                time = Some(
                    value
                        .parse::<f64>()
                        .map_err(|_| format!("invalid --time value `{value}`"))?,
                );
            }
            "--beds" => {
                let value = iter.next().ok_or("--beds requires a value")?;
                beds = Some(parse_beds(value)?);
            }
            "--params" => {
                params_path = Some(iter.next().ok_or("--params requires a value")?.clone());
            }
            other if other.starts_with("--") => {
                return Err(format!("unknown option `{other}`\n{USAGE}"));
            }
            other => {
                if log_path.replace(other.to_string()).is_some() {
                    return Err(format!("unexpected extra argument `{other}`\n{USAGE}"));
                }
            }
        }
    }

    Ok(Args {
        log_path: log_path.ok_or(USAGE)?,
        time,
        beds,
        params_path,
    })
}

fn parse_beds(value: &str) -> Result<HashMap<Disease, usize>, String> {
    let mut beds = HashMap::new();
    for pair in value.split(',') {
        let (code, count) = pair
            .split_once('=')
            .ok_or_else(|| format!("invalid --beds entry `{pair}`, expected CODE=COUNT"))?;
        let disease: Disease = code
            .trim()
            .parse()
            .map_err(|e| format!("invalid --beds entry `{pair}`: {e}"))?;
        let count: usize = count
            .trim()
            .parse()
            .map_err(|_| format!("invalid --beds count in `{pair}`"))?;
        beds.insert(disease, count);
    }
    Ok(beds)
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let text = fs::read_to_string(&args.log_path)?;
    let records = if args.log_path.ends_with(".json") {
        parse_event_history(&text)?
    } else {
        parse_log_lines(&text)?
    };

    let mut sim = Simulator::new(HospitalConfig::default())?;
    sim.load(records)?;

    if let Some(path) = &args.params_path {
        let params: ParameterSet = serde_json::from_str(&fs::read_to_string(path)?)?;
        if let Err(refusals) = sim.update_parameters(params) {
            for refusal in refusals {
                log::warn!("parameter override refused: {refusal}");
            }
        }
    }
    if let Some(beds) = &args.beds {
        if let Err(refusals) = sim.update_bed_distribution(beds) {
            for refusal in refusals {
                log::warn!("bed override refused: {refusal}");
            }
        }
    }

    let horizon = args.time.unwrap_or_else(|| {
        sim.events()
            .entries()
            .last()
            .map(|e| e.time)
            .unwrap_or(0.0)
    });
    let report = sim.advance(horizon);

    println!("replayed {} event(s) to t={horizon}", report.events_applied);
    println!(
        "  admitted {}, discharged {}, rejected {}",
        report.admitted, report.discharged, report.rejected
    );

    println!("\nward occupancy:");
    for status in sim.hospital().ward_status() {
        println!(
            "  {}: {:>3} / {:<3}",
            status.disease, status.occupied, status.capacity
        );
    }

    let metrics = sim.hospital().metrics();
    println!("\npatients by disease (treated / rejected):");
    for disease in Disease::ALL {
        println!(
            "  {}: {:>5} / {:<5}",
            disease,
            metrics.treated(disease),
            metrics.rejected(disease)
        );
    }

    let total_urgency: f64 = metrics.urgency_history().iter().map(|s| s.urgency).sum();
    println!("\ntotal urgency loss: {total_urgency:.2}");

    let acceptance = metrics.acceptance_history();
    if !acceptance.is_empty() {
        let accepted = acceptance.iter().filter(|s| s.accepted).count();
        println!(
            "overflow acceptance rate: {:.1}% ({accepted}/{})",
            100.0 * accepted as f64 / acceptance.len() as f64,
            acceptance.len()
        );
    }

    if !sim.anomalies().is_empty() {
        println!("\n{} anomalous event(s) skipped:", sim.anomalies().len());
        for anomaly in sim.anomalies() {
            println!("  [{}] {}", anomaly.event_index, anomaly.error);
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}
