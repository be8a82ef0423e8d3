use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use sandfall::scenario::{ScenarioDefinition, ScenarioExecutor};
use sandfall::simulation::Ruleset;
use sandfall::{AppConfig, Session};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (RON); defaults to ./sandfall.ron if present
    #[arg(long)]
    config: Option<PathBuf>,

    /// Particle and interaction catalog (RON); defaults to the built-in set
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Scenario to run (RON)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Write the scenario report here (RON)
    #[arg(long)]
    report: Option<PathBuf>,

    /// RNG seed; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Extra ticks to run after the scenario (or on an empty grid)
    #[arg(long, default_value = "0")]
    ticks: u32,

    /// Save a PNG of the final grid
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// List the particle catalog and exit
    #[arg(long)]
    list_particles: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = AppConfig::load(args.config.as_deref())?;

    let rules = match &args.catalog {
        Some(path) => Ruleset::load(path)
            .with_context(|| format!("Failed to load catalog: {}", path.display()))?,
        None => Ruleset::builtin(),
    };

    // Handle --list-particles flag
    if args.list_particles {
        list_particles(&rules);
        return Ok(());
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("Seed: {}", seed);

    let mut session = Session::new(&config, rules, seed)?;

    let mut passed = true;
    if let Some(path) = &args.scenario {
        let scenario = ScenarioDefinition::from_file(path)?;
        let report = ScenarioExecutor::new().execute_scenario(&scenario, &mut session)?;

        if let Some(report_path) = &args.report {
            report.save_ron(report_path)?;
            log::info!("Report written to {}", report_path.display());
        }
        passed = report.passed;
    }

    if args.ticks > 0 {
        session.tick(args.ticks);
        log::info!(
            "Ran {} ticks (tick {} total, settled: {})",
            args.ticks,
            session.sandbox().tick_count(),
            session.sandbox().is_settled()
        );
    }

    if config.output.print_counts {
        let counts = session.particle_counts();
        for (name, count) in &counts.by_type {
            log::info!("{}: {}", name, count);
        }
        if counts.unknown > 0 {
            log::warn!("unknown: {}", counts.unknown);
        }
        log::info!("total: {} | money: {:.2}", counts.total, session.wallet().money());

        let stats = session.stats();
        log::info!(
            "{} ticks: {} moves, {} reactions, {} settled",
            session.sandbox().tick_count(),
            stats.moves,
            stats.reactions,
            stats.settled
        );
    }

    let snapshot = args
        .snapshot
        .or_else(|| config.output.snapshot.as_ref().map(PathBuf::from));
    if let Some(path) = snapshot {
        let renderer = session.render();
        sandfall::snapshot::save_png(&renderer, &path)?;
    }

    if !passed {
        bail!("Scenario verification failed");
    }
    Ok(())
}

fn list_particles(rules: &Ruleset) {
    println!("{:>4}  {:<12} {:<8} shop", "id", "name", "phase");
    for def in rules.particles.iter() {
        let phase = if def.is_liquid() {
            "liquid"
        } else if def.is_gas() {
            "gas"
        } else {
            "solid"
        };
        let shop = if def.shop_item {
            format!("{:.2}", def.price)
        } else {
            "-".to_string()
        };
        println!("{:>4}  {:<12} {:<8} {}", def.id, def.name, phase, shop);
    }
    println!("{} interactions", rules.interactions.len());
}
