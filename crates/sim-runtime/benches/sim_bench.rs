use criterion::{criterion_group, criterion_main, Criterion};
use sim_core::Infrastructure;
use sim_econ::FeatureLevels;
use sim_runtime::{GameData, SimConfig, Simulation};
use std::path::PathBuf;

fn founded() -> Simulation {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets");
    let cfg = SimConfig::load(root.join("config/default.yaml")).unwrap();
    let data = GameData::load(root.join("data/founder.yaml")).unwrap();
    let mut sim = Simulation::new(cfg, data).unwrap();
    sim.enable_company("Rival Corp").unwrap();
    sim.expand_to_vertical("Information").unwrap();
    sim.buy_infrastructure(Infrastructure {
        datacenter: 2,
        ..Infrastructure::default()
    })
    .unwrap();
    for name in ["Ada Byron", "Grace Hopper", "Don Draper"] {
        sim.hire(name, 70_000.0).unwrap();
    }
    sim.start_product(&["Social Network"], FeatureLevels::new(2, 2, 1))
        .unwrap();
    sim.start_product(&["Search Engine"], FeatureLevels::new(1, 1, 2))
        .unwrap();
    sim
}

fn bench_year(c: &mut Criterion) {
    c.bench_function("simulated year", |b| {
        b.iter_batched(
            founded,
            |mut sim| {
                sim.run_years(1);
                sim.report()
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_year);
criterion_main!(benches);
