//! Immutable game catalog: product categories, verticals, technologies,
//! markets and unlock grants.

use crate::infrastructure::Infrastructure;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

fn default_difficulty() -> f32 {
    1.0
}

fn default_research() -> f32 {
    1000.0
}

/// A product category such as "Social Network". Products combine one or
/// more categories.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductType {
    /// Unique category name; recipe ids are built from these.
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Product points this category consumes.
    #[serde(default)]
    pub points: u32,
    /// Development difficulty (1.0 is baseline).
    #[serde(default = "default_difficulty")]
    pub difficulty: f32,
    /// Facilities a product of this category occupies.
    #[serde(default)]
    pub required_infrastructure: Infrastructure,
    /// Verticals the company must have expanded into.
    #[serde(default)]
    pub required_verticals: Vec<String>,
}

impl ProductType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            points: 0,
            difficulty: default_difficulty(),
            required_infrastructure: Infrastructure::default(),
            required_verticals: Vec::new(),
        }
    }

    /// Available when every required vertical is active and the free
    /// infrastructure covers the requirement.
    pub fn is_available(&self, verticals: &BTreeSet<String>, free: &Infrastructure) -> bool {
        self.required_verticals.iter().all(|v| verticals.contains(v))
            && self.required_infrastructure <= *free
    }
}

/// A business line, e.g. "Information" or "Hardware".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vertical {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Cash needed to expand into the vertical.
    #[serde(default)]
    pub cost: f32,
}

/// A researchable technology.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Technology {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_research")]
    pub required_research: f32,
    #[serde(default)]
    pub required_vertical: Option<String>,
    #[serde(default)]
    pub required_technologies: Vec<String>,
}

impl Technology {
    /// The technology's vertical must be active and all prerequisites
    /// researched.
    pub fn is_available(
        &self,
        verticals: &BTreeSet<String>,
        technologies: &BTreeSet<String>,
    ) -> bool {
        let vertical_ok = self
            .required_vertical
            .as_ref()
            .map_or(true, |v| verticals.contains(v));
        vertical_ok
            && self
                .required_technologies
                .iter()
                .all(|t| technologies.contains(t))
    }
}

/// Geographic or segment markets a company can sell into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Market {
    NorthAmerica,
    SouthAmerica,
    Asia,
    Europe,
    Africa,
    Australia,
    Antarctica,
    ExtraTerra,
    Alien,
}

impl Market {
    pub const ALL: [Market; 9] = [
        Market::NorthAmerica,
        Market::SouthAmerica,
        Market::Asia,
        Market::Europe,
        Market::Africa,
        Market::Australia,
        Market::Antarctica,
        Market::ExtraTerra,
        Market::Alien,
    ];

    /// Relative capacity for consumption.
    pub fn size(self) -> f32 {
        match self {
            Market::NorthAmerica => 1.0,
            Market::SouthAmerica => 1.1,
            Market::Asia => 2.0,
            Market::Europe => 1.1,
            Market::Africa => 1.6,
            Market::Australia => 0.8,
            Market::Antarctica => 0.6,
            Market::ExtraTerra => 3.0,
            Market::Alien => 4.0,
        }
    }
}

/// Content made available to the player by effects.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnlockSet {
    pub product_types: BTreeSet<String>,
    pub verticals: BTreeSet<String>,
    pub technologies: BTreeSet<String>,
    pub markets: BTreeSet<Market>,
    pub events: BTreeSet<String>,
    pub items: BTreeSet<String>,
    pub special_projects: BTreeSet<String>,
}

impl UnlockSet {
    /// Union `other` into `self`. Returns true if anything new was added.
    pub fn merge(&mut self, other: &UnlockSet) -> bool {
        fn union<T: Ord + Clone>(into: &mut BTreeSet<T>, from: &BTreeSet<T>) -> bool {
            let before = into.len();
            into.extend(from.iter().cloned());
            into.len() != before
        }
        // Non-short-circuiting so every set is merged.
        let changed = [
            union(&mut self.product_types, &other.product_types),
            union(&mut self.verticals, &other.verticals),
            union(&mut self.technologies, &other.technologies),
            union(&mut self.markets, &other.markets),
            union(&mut self.events, &other.events),
            union(&mut self.items, &other.items),
            union(&mut self.special_projects, &other.special_projects),
        ];
        changed.iter().any(|c| *c)
    }

    pub fn is_empty(&self) -> bool {
        self.product_types.is_empty()
            && self.verticals.is_empty()
            && self.technologies.is_empty()
            && self.markets.is_empty()
            && self.events.is_empty()
            && self.items.is_empty()
            && self.special_projects.is_empty()
    }
}
