//! Development progress requirements.

use crate::EconError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Progress units per Fibonacci step at difficulty 1 and aggregate stat 1.
pub const BASE_PROGRESS: f32 = 500.0;

/// The three quality axes of a product.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProductFeature {
    Design,
    Marketing,
    Engineering,
}

impl ProductFeature {
    pub const ALL: [ProductFeature; 3] = [
        ProductFeature::Design,
        ProductFeature::Marketing,
        ProductFeature::Engineering,
    ];

    /// Worker stat that drives progress on this axis.
    pub fn worker_stat(self) -> &'static str {
        match self {
            ProductFeature::Design => "Creativity",
            ProductFeature::Marketing => "Charisma",
            ProductFeature::Engineering => "Cleverness",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProductFeature::Design => "Design",
            ProductFeature::Marketing => "Marketing",
            ProductFeature::Engineering => "Engineering",
        }
    }
}

impl fmt::Display for ProductFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductFeature {
    type Err = EconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Design" => Ok(ProductFeature::Design),
            "Marketing" => Ok(ProductFeature::Marketing),
            "Engineering" => Ok(ProductFeature::Engineering),
            other => Err(EconError::UnknownFeature(other.to_string())),
        }
    }
}

/// `fib(0) = 0`, `fib(1) = 1`. Saturates instead of overflowing.
pub fn fibonacci(n: u32) -> u64 {
    let (mut a, mut b) = (0u64, 1u64);
    for _ in 0..n {
        let next = a.saturating_add(b);
        a = b;
        b = next;
    }
    a
}

/// Progress needed to bring `feature` to level `level`:
/// `fib(level + 2) × BASE_PROGRESS × difficulty / aggregate`.
///
/// A zero (or negative) aggregate returns the undivided numerator.
pub fn progress_required(
    feature: ProductFeature,
    level: u32,
    difficulty: f32,
    aggregate: f32,
) -> f32 {
    let numerator = fibonacci(level.saturating_add(2)) as f32 * BASE_PROGRESS * difficulty;
    if aggregate > 0.0 {
        numerator / aggregate
    } else {
        tracing::debug!(feature = %feature, "zero aggregate stat, using undivided progress");
        numerator
    }
}

/// Requested starting level per axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureLevels {
    pub design: u32,
    pub marketing: u32,
    pub engineering: u32,
}

impl FeatureLevels {
    pub fn new(design: u32, marketing: u32, engineering: u32) -> Self {
        Self {
            design,
            marketing,
            engineering,
        }
    }

    pub fn level(&self, feature: ProductFeature) -> u32 {
        match feature {
            ProductFeature::Design => self.design,
            ProductFeature::Marketing => self.marketing,
            ProductFeature::Engineering => self.engineering,
        }
    }
}

/// Sum of [`progress_required`] over all axes, floored at 1.
///
/// `aggregate` yields the company-wide sum of a worker stat by name.
pub fn total_progress_required<F>(levels: FeatureLevels, difficulty: f32, mut aggregate: F) -> f32
where
    F: FnMut(&str) -> f32,
{
    let total: f32 = ProductFeature::ALL
        .iter()
        .map(|&f| progress_required(f, levels.level(f), difficulty, aggregate(f.worker_stat())))
        .sum();
    total.max(1.0)
}
