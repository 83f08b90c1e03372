#![deny(warnings)]

//! Driver for the Founder simulation.
//!
//! Loads configuration and game data from YAML, owns the shared state
//! (companies, economy, unlocks, random source) and runs the periodic
//! development, revenue, market, weekly, monthly and yearly cycles.

pub mod clock;
pub mod config;
pub mod data;
pub mod listeners;
pub mod report;
pub mod scheduler;
pub mod simulation;

pub use clock::{Clock, ClockTick, MONTHS_PER_YEAR, START_YEAR, WEEKS_PER_MONTH};
pub use config::{CycleJitter, SimConfig};
pub use data::{CompanyTemplate, GameData, StartingProduct, WorkerTemplate};
pub use listeners::{ListenerId, Listeners};
pub use report::{to_cents, KpiSnapshot};
pub use scheduler::{Cycle, DueCycle, Scheduler};
pub use simulation::{EventFired, ProductLaunched, Simulation};

use sim_core::{CoreError, ValidationError};
use sim_econ::EconError;
use sim_effects::EffectError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Econ(#[from] EconError),
    #[error(transparent)]
    Effect(#[from] EffectError),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// A name that the loaded game data does not define.
    #[error("unknown {kind}: {name}")]
    Unknown { kind: &'static str, name: String },
    /// Known content that has not been unlocked yet.
    #[error("{kind} not unlocked: {name}")]
    Locked { kind: &'static str, name: String },
    #[error("{worker} wants at least {minimum:.0}, offered {offered:.0}")]
    SalaryTooLow {
        worker: String,
        offered: f32,
        minimum: f32,
    },
    #[error("{0} is not looking for work")]
    OffMarket(String),
}
