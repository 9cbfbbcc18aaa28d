//! valley — demographic model over a small four-neighborhood valley census.
//!
//! Loads a run file (dates, seed, behavior parameters) and a census
//! directory, runs the monthly step loop and writes CSV results.  Set
//! `RUST_LOG=debug` for per-year progress from the step loop.

mod config;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use dm_agent::World;
use dm_behavior::StandardModel;
use dm_census::CensusLoader;
use dm_core::{ModelDate, SimRng};
use dm_output::{CsvWriter, ResultsObserver};
use dm_sim::{NeighborhoodSnapshot, SimBuilder, SimObserver, StepReport};

use config::RunFile;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(author, version, about = "Run the valley demographic model")]
struct Cli {
    /// JSON run file with `simulation` and `parameters` sections.
    #[arg(long, default_value = "demos/valley/data/valley.json")]
    config: PathBuf,

    /// Directory holding neighborhoods.csv, households.csv and persons.csv.
    #[arg(long, default_value = "demos/valley/data/census")]
    census: PathBuf,

    #[arg(long, default_value = "output/valley")]
    output: PathBuf,

    /// Overrides the seed in the run file.
    #[arg(long)]
    seed: Option<u64>,
}

// ── Tallying observer ─────────────────────────────────────────────────────────

/// Wraps the results observer and keeps run-wide event totals for the
/// closing summary.
struct TallyObserver {
    inner:     ResultsObserver<CsvWriter>,
    steps:     u64,
    snapshots: u64,
    births:    u32,
    deaths:    u32,
    marriages: u32,
    divorces:  u32,
    out:       u32,
    returns:   u32,
    arrivals:  u32,
    last:      Option<StepReport>,
}

impl TallyObserver {
    fn new(inner: ResultsObserver<CsvWriter>) -> Self {
        Self {
            inner,
            steps: 0,
            snapshots: 0,
            births: 0,
            deaths: 0,
            marriages: 0,
            divorces: 0,
            out: 0,
            returns: 0,
            arrivals: 0,
            last: None,
        }
    }
}

impl SimObserver for TallyObserver {
    fn on_step_start(&mut self, step: u64, date: ModelDate) {
        self.inner.on_step_start(step, date);
    }

    fn on_step_end(&mut self, report: &StepReport) {
        self.steps += 1;
        self.births += report.births.total();
        self.deaths += report.deaths.total();
        self.marriages += report.marriages.total();
        self.divorces += report.divorces.total();
        self.out += report.migrations.out.total();
        self.returns += report.migrations.returns.total();
        self.arrivals += report.migrations.in_households.total();
        self.last = Some(report.clone());
        self.inner.on_step_end(report);
    }

    fn on_snapshot(&mut self, step: u64, date: ModelDate, neighborhoods: &[NeighborhoodSnapshot]) {
        self.snapshots += 1;
        self.inner.on_snapshot(step, date, neighborhoods);
    }

    fn on_sim_end(&mut self, date: ModelDate, world: &World) {
        self.inner.on_sim_end(date, world);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let cli = Cli::parse();

    // 1. Run file.
    let RunFile { simulation: mut config, parameters } = RunFile::load(&cli.config)?;
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    println!("=== valley — demographic model ===");
    println!(
        "Run: {} to {}  |  Step: {} month(s)  |  Seed: {}",
        config.start, config.end, config.timestep_months, config.seed
    );
    println!();

    // 2. Behavior model.
    let model = StandardModel::new(parameters.clone(), config.timestep_months)
        .context("invalid behavior parameters")?;

    // 3. Census.  The loader draws unrecorded attributes from the same
    //    stream the simulation continues.
    let mut world = World::new();
    let region = world.new_region(None, false)?;
    let mut rng = SimRng::new(config.seed);
    let census = CensusLoader::new(&model, config.start.tick())
        .load_dir(&cli.census, &mut world, region, &mut rng)
        .with_context(|| format!("loading census from {}", cli.census.display()))?;
    println!(
        "Census: {} neighborhoods, {} households, {} persons, {} couples",
        census.neighborhoods, census.households, census.persons, census.marriages
    );
    if census.unresolved_parents + census.unresolved_spouses > 0 {
        warn!(
            parents = census.unresolved_parents,
            spouses = census.unresolved_spouses,
            "census references persons missing from the files"
        );
    }

    // 4. Build sim.
    let mut sim = SimBuilder::new(config.clone(), world, parameters, model)
        .rng(rng)
        .build()?;

    // 5. Set up output.
    std::fs::create_dir_all(&cli.output)
        .with_context(|| format!("creating {}", cli.output.display()))?;
    let writer = CsvWriter::new(&cli.output)?;
    let mut obs = TallyObserver::new(ResultsObserver::new(writer));

    // 6. Run.
    let t0 = Instant::now();
    sim.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    // 7. Summary.
    println!(
        "Simulation complete in {:.3} s: {} steps, {} snapshots{}",
        elapsed.as_secs_f64(),
        obs.steps,
        obs.snapshots,
        if sim.is_extinct() { " (population extinct)" } else { "" },
    );
    println!("Results in {}", cli.output.display());
    println!();

    println!("{:<22} {:>8}", "Event", "Count");
    println!("{}", "-".repeat(31));
    for (label, count) in [
        ("births", obs.births),
        ("deaths", obs.deaths),
        ("marriages", obs.marriages),
        ("divorces", obs.divorces),
        ("out-migrations", obs.out),
        ("returns", obs.returns),
        ("in-migrant households", obs.arrivals),
    ] {
        println!("{label:<22} {count:>8}");
    }
    println!();

    if let Some(last) = &obs.last {
        println!("Population at {}", last.date);
        println!("  persons       : {} (start {})", last.persons, census.persons);
        println!("  households    : {}", last.households);
        println!("  married       : {}", last.married);
        println!("  away          : {}", last.away);
    }

    Ok(())
}
