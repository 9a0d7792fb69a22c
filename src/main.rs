use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use serde::Serialize;

use traffic_flow_sim::simulation::{generate_demo, DemoConfig, Scenario, SimReport, SimWorld};

#[derive(Parser)]
#[command(name = "traffic_flow_sim")]
#[command(about = "Discrete-time traffic flow simulation")]
struct Cli {
    /// Scenario file with the events to simulate
    #[arg(short, long, conflicts_with = "demo", required_unless_present = "demo")]
    input: Option<PathBuf>,

    /// Run a generated grid network instead of a scenario file
    #[arg(long)]
    demo: bool,

    /// Seed for the generated demo network
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Number of ticks to simulate
    #[arg(short, long, default_value = "10")]
    ticks: u32,

    /// Where to write the JSON reports (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Serialize)]
struct Output {
    out: Vec<SimReport>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,traffic_flow_sim=info"),
    )
    .init();

    let cli = Cli::parse();

    let scenario = match &cli.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open scenario {}", path.display()))?;
            Scenario::from_reader(BufReader::new(file))?
        }
        None => Scenario {
            events: generate_demo(&DemoConfig {
                seed: cli.seed,
                ..DemoConfig::default()
            })?,
        },
    };

    let reports = run(scenario, cli.ticks)?;

    let writer: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("Failed to create output {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    serde_json::to_writer_pretty(writer, &Output { out: reports })
        .context("Failed to write reports")?;

    Ok(())
}

/// Run the simulation headless and collect one report per tick
fn run(scenario: Scenario, ticks: u32) -> Result<Vec<SimReport>> {
    info!("Running traffic simulation for {} ticks", ticks);

    let mut world = SimWorld::new();
    scenario.load_into(&mut world);

    let mut reports = Vec::with_capacity(ticks as usize);
    for _ in 0..ticks {
        world
            .advance()
            .with_context(|| format!("Simulation failed at tick {}", world.time()))?;
        reports.push(world.report());
    }

    info!("=== SIMULATION COMPLETE ===");
    info!("Ticks: {}", world.time());
    info!("Total junctions: {}", world.junctions().len());
    info!("Total roads: {}", world.roads().len());
    info!("Vehicles arrived: {}/{}", world.arrived_count(), world.vehicles().len());
    info!(
        "Total road CO2: {}",
        world.roads().iter().map(|r| r.total_co2()).sum::<u64>()
    );
    if world.pending_events() > 0 {
        info!("Events not yet run: {}", world.pending_events());
    }

    Ok(reports)
}
