//! Process-wide economic conditions shared by every company.

use rand::Rng;
use serde::{Deserialize, Serialize};
use sim_core::InfrastructureCostModifiers;

/// Default half-width of the multiplicative revenue noise (±5%).
pub const DEFAULT_REVENUE_JITTER: f32 = 0.05;

/// Global multipliers that effects adjust and the revenue, payroll and
/// purchasing formulas read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Economy {
    /// Overall economic health; scales every product's revenue.
    pub economy_multiplier: f32,
    /// Consumer spending; scales every product's revenue.
    pub spending_multiplier: f32,
    /// Scales salaries paid each month.
    pub wage_multiplier: f32,
    /// Fraction of yearly profit paid as tax.
    pub tax_rate: f32,
    /// Scales the cost of expanding into verticals.
    pub expansion_cost_multiplier: f32,
    /// Weekly fractional decay of opinion, publicity and hype.
    pub forgetting_rate: f32,
    /// Percent adjustments to facility prices.
    pub infrastructure_cost: InfrastructureCostModifiers,
    /// Half-width of the uniform revenue noise; 0 disables it.
    pub revenue_jitter: f32,
}

impl Default for Economy {
    fn default() -> Self {
        Self {
            economy_multiplier: 1.0,
            spending_multiplier: 1.0,
            wage_multiplier: 1.0,
            tax_rate: 0.3,
            expansion_cost_multiplier: 1.0,
            forgetting_rate: 0.01,
            infrastructure_cost: InfrastructureCostModifiers::new(),
            revenue_jitter: DEFAULT_REVENUE_JITTER,
        }
    }
}

impl Economy {
    /// Multiplicative noise factor in `[1 - jitter, 1 + jitter]`.
    pub fn jitter<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let j = self.revenue_jitter;
        if !(j.is_finite() && j > 0.0) {
            return 1.0;
        }
        rng.gen_range((1.0 - j)..=(1.0 + j))
    }

    /// Combined demand-side multiplier applied to revenue.
    pub fn demand_multiplier(&self) -> f32 {
        self.economy_multiplier * self.spending_multiplier
    }
}
