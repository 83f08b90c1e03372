//! Declarative stat changes and the trait for things that carry stats.

use crate::catalog::Market;
use crate::stat::{ModifierId, Stat};
use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How a buff's value combines with the stat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuffKind {
    #[default]
    Add,
    Multiply,
}

/// A change to one named stat, applied as a modifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatBuff {
    /// Target stat name, e.g. "Happiness".
    pub stat: String,
    /// Amount added, or factor for [`BuffKind::Multiply`].
    pub value: f32,
    /// Ticks before expiry; `None` (or 0 in data files) lasts until removed.
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub kind: BuffKind,
}

impl StatBuff {
    pub fn add(stat: impl Into<String>, value: f32) -> Self {
        Self {
            stat: stat.into(),
            value,
            duration: None,
            kind: BuffKind::Add,
        }
    }

    pub fn multiply(stat: impl Into<String>, factor: f32) -> Self {
        Self {
            stat: stat.into(),
            value: factor,
            duration: None,
            kind: BuffKind::Multiply,
        }
    }

    pub fn lasting(mut self, ticks: u32) -> Self {
        self.duration = Some(ticks);
        self
    }

    /// `(additive, multiplicative)` contribution of this buff.
    pub fn terms(&self) -> (f32, f32) {
        match self.kind {
            BuffKind::Add => (self.value, 1.0),
            BuffKind::Multiply => (0.0, self.value),
        }
    }

    /// Attach this buff to `stat` and return the modifier handle.
    pub fn apply_to(&self, stat: &mut Stat) -> ModifierId {
        let (additive, multiplicative) = self.terms();
        let duration = self.duration.filter(|d| *d > 0);
        stat.add_modifier(additive, multiplicative, duration)
    }
}

/// Anything exposing stats by name: workers, companies, products.
pub trait HasStats {
    fn stat(&self, name: &str) -> Option<&Stat>;
    fn stat_mut(&mut self, name: &str) -> Option<&mut Stat>;
    fn stats_mut(&mut self) -> Vec<&mut Stat>;

    /// Like [`HasStats::stat`] but an unknown name is a lookup failure.
    fn stat_by_name(&self, name: &str) -> Result<&Stat, CoreError> {
        self.stat(name)
            .ok_or_else(|| CoreError::UnknownStat(name.to_string()))
    }

    fn apply_buff(&mut self, buff: &StatBuff) -> Result<ModifierId, CoreError> {
        let stat = self
            .stat_mut(&buff.stat)
            .ok_or_else(|| CoreError::UnknownStat(buff.stat.clone()))?;
        Ok(buff.apply_to(stat))
    }

    /// Remove one modifier previously returned by [`HasStats::apply_buff`].
    /// Returns false if it had already expired or been removed.
    fn remove_modifier(&mut self, stat: &str, id: ModifierId) -> Result<bool, CoreError> {
        let stat = self
            .stat_mut(stat)
            .ok_or_else(|| CoreError::UnknownStat(stat.to_string()))?;
        Ok(stat.remove_modifier(id).is_some())
    }

    /// Advance every stat's timed modifiers by one tick.
    fn tick_modifiers(&mut self) -> usize {
        self.stats_mut().into_iter().map(Stat::tick).sum()
    }
}

/// A buff for every product matching the category, vertical and market
/// filters. An empty filter matches everything.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductEffect {
    #[serde(default)]
    pub product_types: Vec<String>,
    #[serde(default)]
    pub verticals: Vec<String>,
    #[serde(default)]
    pub markets: Vec<Market>,
    pub buff: StatBuff,
}

impl ProductEffect {
    pub fn new(buff: StatBuff) -> Self {
        Self {
            product_types: Vec::new(),
            verticals: Vec::new(),
            markets: Vec::new(),
            buff,
        }
    }

    pub fn matches(
        &self,
        product_types: &[&str],
        verticals: &[&str],
        markets: &BTreeSet<Market>,
    ) -> bool {
        let types_ok = self.product_types.is_empty()
            || self
                .product_types
                .iter()
                .any(|t| product_types.contains(&t.as_str()));
        let verticals_ok = self.verticals.is_empty()
            || self
                .verticals
                .iter()
                .any(|v| verticals.contains(&v.as_str()));
        let markets_ok =
            self.markets.is_empty() || self.markets.iter().any(|m| markets.contains(m));
        types_ok && verticals_ok && markets_ok
    }
}
