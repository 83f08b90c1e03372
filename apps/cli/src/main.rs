#![deny(warnings)]

//! Headless CLI: loads a config and game data, founds the player company
//! with a simple opening and runs the simulation, printing KPIs.

use anyhow::{bail, Context, Result};
use sim_core::HasStats;
use sim_econ::FeatureLevels;
use sim_runtime::{
    GameData, ProductLaunched, SimConfig, Simulation, MONTHS_PER_YEAR, WEEKS_PER_MONTH,
};
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

const DEFAULT_DATA: &str = "assets/data/founder.yaml";
/// Workers hired by the opening.
const OPENING_HIRES: usize = 3;

struct Args {
    config: Option<PathBuf>,
    data: PathBuf,
    years: u64,
    weeks: u64,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        config: None,
        data: PathBuf::from(DEFAULT_DATA),
        years: 1,
        weeks: 0,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        let mut value = || it.next().with_context(|| format!("{arg} needs a value"));
        match arg.as_str() {
            "--config" => args.config = Some(PathBuf::from(value()?)),
            "--data" => args.data = PathBuf::from(value()?),
            "--years" => args.years = value()?.parse().context("--years")?,
            "--weeks" => args.weeks = value()?.parse().context("--weeks")?,
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(args)
}

/// Expand into what the easiest unlocked category needs, hire the
/// strongest workers on the market and start a product.
fn opening(sim: &mut Simulation) -> Result<()> {
    let easiest = sim
        .unlocks()
        .product_types
        .iter()
        .filter_map(|name| sim.data().product_type(name))
        .min_by(|a, b| a.difficulty.total_cmp(&b.difficulty))
        .cloned();
    let Some(product_type) = easiest else {
        warn!("no product types unlocked, skipping opening");
        return Ok(());
    };
    let first = product_type.name.clone();

    for v in &product_type.required_verticals {
        let cost = sim.expand_to_vertical(v)?;
        info!(vertical = %v, cost, "expanded");
    }
    if !product_type.required_infrastructure.is_empty() {
        let cost = sim.buy_infrastructure(product_type.required_infrastructure)?;
        info!(bought = %product_type.required_infrastructure, cost, "facilities bought");
    }

    let mut candidates: Vec<(String, f32, f32)> = sim
        .job_market()
        .iter()
        .map(|w| (w.name.clone(), w.score(), w.min_salary()))
        .collect();
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
    for (name, _, salary) in candidates.into_iter().take(OPENING_HIRES) {
        sim.hire(&name, salary)?;
    }

    let id = sim.start_product(&[first.as_str()], FeatureLevels::new(1, 1, 1))?;
    info!(product = %id, product_type = %first, "opening product started");
    Ok(())
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args()?;
    info!(config = ?args.config, data = %args.data.display(), years = args.years, weeks = args.weeks, "starting CLI");

    let config = match &args.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SimConfig::default(),
    };
    let data = GameData::load(&args.data)
        .with_context(|| format!("loading game data {}", args.data.display()))?;
    let mut sim = Simulation::new(config, data)?;
    sim.on_product_launched.subscribe(|e: &ProductLaunched| {
        info!(
            company = %e.company,
            product = %e.completed.name,
            score = e.completed.score,
            "launch"
        );
    });
    opening(&mut sim)?;

    let weeks_per_year = WEEKS_PER_MONTH * MONTHS_PER_YEAR;
    for _ in 0..args.years {
        sim.run_weeks(weeks_per_year);
        println!("{}", sim.report());
    }
    if args.weeks > 0 {
        sim.run_weeks(args.weeks);
        println!("{}", sim.report());
    }

    let player = sim.player();
    println!(
        "World OK | companies: {} | products: {} | opinion: {:.1} | research: {:.0}",
        sim.companies().len(),
        player.products.len(),
        player.stat("Opinion").map_or(0.0, |s| s.value()),
        player.research.value()
    );
    Ok(())
}
