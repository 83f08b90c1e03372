//! Workers: productive entities that contribute to product development.

use crate::buff::HasStats;
use crate::stat::Stat;
use serde::{Deserialize, Serialize};

/// Minimum salary asked by a worker who is not currently employed.
pub const DEFAULT_MIN_SALARY: f32 = 30_000.0;

/// An employee (or any productive entity) with personal stats.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub bio: String,
    /// Current salary; zero when not employed.
    #[serde(default)]
    pub salary: f32,
    pub base_min_salary: f32,
    /// Weeks before the worker returns to the job market.
    #[serde(default)]
    pub off_market_time: u32,
    /// Offers the player made recently.
    #[serde(default)]
    pub recent_player_offers: u32,
    /// Robots do not tire.
    #[serde(default)]
    pub robot: bool,
    pub happiness: Stat,
    pub productivity: Stat,
    pub charisma: Stat,
    pub creativity: Stat,
    pub cleverness: Stat,
}

impl Worker {
    pub const STAT_NAMES: [&'static str; 5] = [
        "Happiness",
        "Productivity",
        "Charisma",
        "Creativity",
        "Cleverness",
    ];

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: String::new(),
            bio: String::new(),
            salary: 0.0,
            base_min_salary: DEFAULT_MIN_SALARY,
            off_market_time: 0,
            recent_player_offers: 0,
            robot: false,
            happiness: Stat::new("Happiness", 0.0),
            productivity: Stat::new("Productivity", 0.0),
            charisma: Stat::new("Charisma", 0.0),
            creativity: Stat::new("Creativity", 0.0),
            cleverness: Stat::new("Cleverness", 0.0),
        }
    }

    pub fn is_known_stat(name: &str) -> bool {
        Self::STAT_NAMES.contains(&name)
    }

    pub fn is_employed(&self) -> bool {
        self.salary > 0.0
    }

    /// Lowest salary the worker accepts.
    ///
    /// An employed worker's floor moves with happiness at the current
    /// company: below 5 they will take a pay cut to leave.
    pub fn min_salary(&self) -> f32 {
        if self.is_employed() {
            self.salary * (1.0 + (self.happiness.value() - 5.0) / 10.0)
        } else {
            self.base_min_salary
        }
    }

    /// Sum of base skill values.
    pub fn score(&self) -> f32 {
        self.happiness.base_value
            + self.productivity.base_value
            + self.charisma.base_value
            + self.creativity.base_value
            + self.cleverness.base_value
    }

    /// Weekly job-market bookkeeping.
    pub fn tick_job_market(&mut self) {
        self.off_market_time = self.off_market_time.saturating_sub(1);
        self.recent_player_offers = self.recent_player_offers.saturating_sub(1);
    }
}

impl HasStats for Worker {
    fn stat(&self, name: &str) -> Option<&Stat> {
        match name {
            "Happiness" => Some(&self.happiness),
            "Productivity" => Some(&self.productivity),
            "Charisma" => Some(&self.charisma),
            "Creativity" => Some(&self.creativity),
            "Cleverness" => Some(&self.cleverness),
            _ => None,
        }
    }

    fn stat_mut(&mut self, name: &str) -> Option<&mut Stat> {
        match name {
            "Happiness" => Some(&mut self.happiness),
            "Productivity" => Some(&mut self.productivity),
            "Charisma" => Some(&mut self.charisma),
            "Creativity" => Some(&mut self.creativity),
            "Cleverness" => Some(&mut self.cleverness),
            _ => None,
        }
    }

    fn stats_mut(&mut self) -> Vec<&mut Stat> {
        vec![
            &mut self.happiness,
            &mut self.productivity,
            &mut self.charisma,
            &mut self.creativity,
            &mut self.cleverness,
        ]
    }
}
