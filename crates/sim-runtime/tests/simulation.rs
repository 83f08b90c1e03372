use sim_core::{Infrastructure, Market};
use sim_econ::FeatureLevels;
use sim_runtime::{GameData, SimConfig, Simulation};
use std::path::PathBuf;

fn asset(rel: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../assets")
        .join(rel)
}

fn load() -> (SimConfig, GameData) {
    let cfg = SimConfig::load(asset("config/default.yaml")).expect("config");
    let data = GameData::load(asset("data/founder.yaml")).expect("data");
    (cfg, data)
}

/// Expand, buy a datacenter, hire two people and start a social network.
fn founded(seed: u64) -> Simulation {
    let (mut cfg, data) = load();
    cfg.rng_seed = seed;
    let mut sim = Simulation::new(cfg, data).expect("simulation");
    sim.expand_to_vertical("Information").unwrap();
    sim.buy_infrastructure(Infrastructure {
        datacenter: 1,
        ..Infrastructure::default()
    })
    .unwrap();
    sim.hire("Ada Byron", 60_000.0).unwrap();
    sim.hire("Don Draper", 50_000.0).unwrap();
    sim.start_product(&["Social Network"], FeatureLevels::new(1, 1, 1))
        .unwrap();
    sim
}

#[test]
fn sample_assets_load() {
    let (cfg, data) = load();
    assert_eq!(cfg.player_name, "Foobar Inc");
    assert_eq!(cfg.starting_cash, 250_000.0);
    assert_eq!(data.recipe_book().unwrap().len(), 5);
    assert_eq!(data.event_pool().unwrap().len(), 6);
    assert_eq!(data.companies.len(), 1);
}

#[test]
fn a_founded_company_launches_and_earns() {
    let mut sim = founded(7);
    sim.run_weeks(10);
    let player = sim.player();
    assert_eq!(sim.products_completed(), 1);
    let product = &player.products[0];
    assert!(product.is_launched());
    assert!(product.score() > 0.0);
    assert!(product.revenue_earned > 0.0);
    assert!(player.annual_revenue > 0.0);
}

#[test]
fn same_seed_same_year() {
    let mut a = founded(11);
    let mut b = founded(11);
    a.run_years(1);
    b.run_years(1);
    assert_eq!(a.report(), b.report());
    assert_eq!(a.player(), b.player());
}

#[test]
fn a_year_ends_with_taxes_and_a_new_date() {
    let mut sim = founded(3);
    sim.run_years(1);
    let report = sim.report();
    assert_eq!(report.weeks, 48);
    assert_eq!(report.date.to_string(), "2016-01-01");
    assert_eq!(report.annual_revenue, rust_decimal::Decimal::ZERO);
    assert_eq!(sim.clock().year(), 2016);
}

#[test]
fn rivals_split_shared_markets() {
    let mut sim = founded(5);
    assert!(sim.enable_company("Rival Corp").unwrap());
    sim.run_weeks(6);

    let rival = sim.company("Rival Corp").unwrap();
    let launched = |c: &sim_econ::Company| c.products.iter().any(|p| p.is_launched());
    assert!(launched(sim.player()));
    assert!(launched(rival));

    // Both sell the same recipe in North America; only the rival sells in
    // Europe.
    let total: f32 = sim
        .companies()
        .iter()
        .flat_map(|c| c.active_products())
        .map(|p| p.market_share())
        .sum();
    let expected = Market::NorthAmerica.size() + Market::Europe.size();
    assert!((total - expected).abs() < 1e-4, "total share {total}");
    assert!(rival.active_products().all(|p| p.market_share() > Market::Europe.size()));
}
