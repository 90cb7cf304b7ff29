//! Slotcast Scenario CLI
//!
//! Runs a named agent scenario either deterministically (printing the
//! discrete-event trace) or live on the real-time tokio interpreter.

use clap::Parser;
use serde::Serialize;
use slotcast_core::{Message, ProtocolAgent};
use slotcast_env::{RuntimeConfig, StdoutSink, TokioRuntime};
use slotcast_sim::{Scenario, Simulation, VirtualTime};
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Slotcast deterministic/live scenario runner
#[derive(Parser, Debug)]
#[command(name = "slotcast-sim")]
#[command(about = "Run slotcast agent scenarios", long_about = None)]
struct Args {
    /// Scenario to run (consensus, ping_pong, all)
    #[arg(short = 'S', long, default_value = "consensus")]
    scenario: String,

    /// Number of consensus nodes
    #[arg(short, long, default_value = "3")]
    nodes: u64,

    /// Broadcast events to produce in deterministic mode
    #[arg(short, long, default_value = "20")]
    events: usize,

    /// Run live on the real-time interpreter instead of the simulator
    #[arg(long)]
    live: bool,

    /// Seconds before a live run is stopped
    #[arg(short, long, default_value = "10")]
    duration: u64,

    /// Pause length in milliseconds for live runs
    #[arg(long, default_value = "1000")]
    tick_ms: u64,

    /// JSON trace output for machine consumption (deterministic mode)
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct TraceRow {
    time: VirtualTime,
    message: Message,
    rendered: String,
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("failed to set tracing subscriber");

    let scenarios: Vec<Scenario> = if args.scenario == "all" {
        Scenario::all()
    } else {
        vec![args.scenario.parse().unwrap_or_else(|err| {
            eprintln!("error: {err}");
            std::process::exit(1);
        })]
    };

    if args.live {
        if scenarios.len() > 1 {
            eprintln!("error: --live only supports a single scenario, not 'all'");
            std::process::exit(1);
        }
        let scenario = scenarios[0];
        let agents = scenario.agents(args.nodes).unwrap_or_else(|err| {
            eprintln!("error: {err}");
            std::process::exit(1);
        });
        run_live(
            scenario,
            agents,
            Duration::from_secs(args.duration),
            Duration::from_millis(args.tick_ms),
        );
        return;
    }

    for scenario in scenarios {
        let agents = scenario.agents(args.nodes).unwrap_or_else(|err| {
            eprintln!("error: {err}");
            std::process::exit(1);
        });
        run_deterministic(scenario, agents, args.events, args.json);
    }
}

/// Deterministic mode: collect a finite trace prefix and print it.
fn run_deterministic(scenario: Scenario, agents: Vec<ProtocolAgent>, events: usize, json: bool) {
    let trace = Simulation::trace(agents, events);

    if json {
        let rows: Vec<TraceRow> = trace
            .into_iter()
            .map(|(time, message)| TraceRow {
                time,
                rendered: message.to_string(),
                message,
            })
            .collect();
        let summary = serde_json::json!({
            "scenario": scenario.name(),
            "events": rows,
        });
        println!("{}", serde_json::to_string_pretty(&summary).unwrap());
        return;
    }

    let produced = trace.len();
    for (time, message) in trace {
        println!("t={time} | {message}");
    }
    if produced < events {
        info!("run exhausted after {produced} events");
    }
}

/// Live mode: the same agents on the real-time interpreter, bounded by a
/// wall-clock deadline (protocol agents never finish on their own).
fn run_live(scenario: Scenario, agents: Vec<ProtocolAgent>, duration: Duration, tick: Duration) {
    info!(
        "live run: scenario={} duration={}s tick={}ms",
        scenario.name(),
        duration.as_secs(),
        tick.as_millis()
    );

    let rt = tokio::runtime::Runtime::new().expect("failed to start tokio runtime");
    rt.block_on(async move {
        let runtime = TokioRuntime::new(StdoutSink::shared()).with_config(RuntimeConfig {
            tick,
            ..RuntimeConfig::default()
        });

        match tokio::time::timeout(duration, runtime.run(agents)).await {
            Ok(Ok(results)) => {
                for (index, result) in results.iter().enumerate() {
                    if let Err(err) = result {
                        error!("agent {index} failed: {err}");
                    }
                }
            }
            Ok(Err(err)) => error!("run failed: {err}"),
            Err(_) => info!("live run stopped after {}s", duration.as_secs()),
        }
    });
}
