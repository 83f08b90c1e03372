//! Player KPIs with money rounded to cents.

use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_econ::Company;
use std::fmt;

/// Convert a float amount to a decimal rounded to cents. Non-finite
/// amounts become zero.
pub fn to_cents(amount: f32) -> Decimal {
    Decimal::from_f32(amount)
        .map(|d| d.round_dp(2))
        .unwrap_or(Decimal::ZERO)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KpiSnapshot {
    pub company: String,
    pub date: NaiveDate,
    pub weeks: u64,
    pub cash: Decimal,
    /// Revenue since the last tax payment.
    pub annual_revenue: Decimal,
    pub annual_expenses: Decimal,
    /// Sum over the kept revenue history.
    pub recent_revenue: Decimal,
    pub products_developing: usize,
    pub products_launched: usize,
    pub products_completed: usize,
    pub workers: usize,
    /// Sum of market shares over active products.
    pub market_share: f32,
    pub opinion: f32,
    pub technologies: usize,
    pub events_fired: usize,
}

impl KpiSnapshot {
    pub fn capture(
        company: &Company,
        date: NaiveDate,
        weeks: u64,
        products_completed: usize,
        events_fired: usize,
    ) -> Self {
        Self {
            company: company.name.clone(),
            date,
            weeks,
            cash: to_cents(company.cash.value()),
            annual_revenue: to_cents(company.annual_revenue),
            annual_expenses: to_cents(company.annual_expenses),
            recent_revenue: to_cents(company.revenue_history().sum()),
            products_developing: company.developing_products().count(),
            products_launched: company.products.iter().filter(|p| p.is_launched()).count(),
            products_completed,
            workers: company.workers.len(),
            market_share: company.active_products().map(|p| p.market_share()).sum(),
            opinion: company.opinion.value(),
            technologies: company.technologies.len(),
            events_fired,
        }
    }
}

impl fmt::Display for KpiSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "KPI | {} | {} (week {}) | cash: ${:.2} | revenue: ${:.2} | expenses: ${:.2} | products: {} live, {} in development, {} completed | share: {:.2} | workers: {} | events: {}",
            self.company,
            self.date,
            self.weeks,
            self.cash,
            self.annual_revenue,
            self.annual_expenses,
            self.products_launched,
            self.products_developing,
            self.products_completed,
            self.market_share,
            self.workers,
            self.events_fired
        )
    }
}
