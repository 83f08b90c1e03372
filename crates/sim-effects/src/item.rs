//! Purchasable content: store items, upgradable perks and special
//! projects.

use crate::effect::{EffectReceipt, EffectScope, EffectSet};
use crate::ledger::BuffLedger;
use crate::EffectError;
use serde::{Deserialize, Serialize};
use sim_econ::Company;
use tracing::info;

fn default_cost() -> f32 {
    1000.0
}

fn charge(company: &mut Company, cost: f32) -> Result<(), EffectError> {
    let available = company.cash.value();
    if cost > available {
        return Err(EffectError::InsufficientCash {
            needed: cost,
            available,
        });
    }
    company.cash.base_value -= cost;
    company.annual_expenses += cost;
    Ok(())
}

fn refund(company: &mut Company, cost: f32) {
    company.cash.base_value += cost;
    company.annual_expenses -= cost;
}

/// An item bought from the store; its effects last while it is owned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_cost")]
    pub cost: f32,
    #[serde(default)]
    pub effects: EffectSet,
}

impl Item {
    /// Pay for the item and equip it on `company`.
    pub fn buy(
        &self,
        company: &mut Company,
        ledger: &mut BuffLedger,
        scope: &mut EffectScope<'_>,
    ) -> Result<(), EffectError> {
        if ledger.is_equipped(&self.name) {
            return Err(EffectError::AlreadyEquipped(self.name.clone()));
        }
        charge(company, self.cost)?;
        if let Err(err) = ledger.equip(self.name.clone(), &self.effects, company, scope) {
            refund(company, self.cost);
            return Err(err);
        }
        info!(company = %company.name, item = %self.name, cost = self.cost, "item bought");
        Ok(())
    }

    /// Remove the item's effects. No money is returned.
    pub fn discard(
        &self,
        company: &mut Company,
        ledger: &mut BuffLedger,
        scope: &mut EffectScope<'_>,
    ) -> Result<EffectReceipt, EffectError> {
        ledger.unequip(&self.name, company, scope)
    }
}

/// One level of a perk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerkUpgrade {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_cost")]
    pub cost: f32,
    #[serde(default)]
    pub required_technologies: Vec<String>,
    #[serde(default)]
    pub effects: EffectSet,
}

impl PerkUpgrade {
    pub fn is_available(&self, company: &Company) -> bool {
        self.required_technologies
            .iter()
            .all(|t| company.technologies.contains(t))
    }
}

/// A company perk with successive upgrade levels. Only the current level's
/// effects are active.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Perk {
    pub name: String,
    pub upgrades: Vec<PerkUpgrade>,
    #[serde(default)]
    pub level: usize,
}

impl Perk {
    pub fn current(&self) -> Option<&PerkUpgrade> {
        self.upgrades.get(self.level)
    }

    pub fn next(&self) -> Option<&PerkUpgrade> {
        self.upgrades.get(self.level + 1)
    }

    pub fn has_next(&self) -> bool {
        self.level + 1 < self.upgrades.len()
    }

    /// The next level exists and its requirements are met.
    pub fn next_available(&self, company: &Company) -> bool {
        self.next().map_or(false, |u| u.is_available(company))
    }

    /// Buy the perk at its first level.
    pub fn buy(
        &mut self,
        company: &mut Company,
        ledger: &mut BuffLedger,
        scope: &mut EffectScope<'_>,
    ) -> Result<(), EffectError> {
        if ledger.is_equipped(&self.name) {
            return Err(EffectError::AlreadyEquipped(self.name.clone()));
        }
        let first = self
            .upgrades
            .first()
            .ok_or_else(|| EffectError::NoUpgrade(self.name.clone()))?;
        if !first.is_available(company) {
            return Err(EffectError::NotAvailable(self.name.clone()));
        }
        charge(company, first.cost)?;
        if let Err(err) = ledger.equip(self.name.clone(), &first.effects, company, scope) {
            refund(company, first.cost);
            return Err(err);
        }
        self.level = 0;
        Ok(())
    }

    /// Replace the current level's effects with the next level's.
    pub fn upgrade(
        &mut self,
        company: &mut Company,
        ledger: &mut BuffLedger,
        scope: &mut EffectScope<'_>,
    ) -> Result<(), EffectError> {
        if !ledger.is_equipped(&self.name) {
            return Err(EffectError::NotEquipped(self.name.clone()));
        }
        let next = self
            .next()
            .cloned()
            .ok_or_else(|| EffectError::NoUpgrade(self.name.clone()))?;
        if !next.is_available(company) {
            return Err(EffectError::NotAvailable(next.name));
        }
        charge(company, next.cost)?;
        ledger.unequip(&self.name, company, scope)?;
        if let Err(err) = ledger.equip(self.name.clone(), &next.effects, company, scope) {
            refund(company, next.cost);
            // Put the old level back.
            if let Some(current) = self.current() {
                ledger.equip(self.name.clone(), &current.effects, company, scope)?;
            }
            return Err(err);
        }
        self.level += 1;
        info!(perk = %self.name, level = self.level, "perk upgraded");
        Ok(())
    }
}

/// A one-off project unlocked by owning products of certain recipes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpecialProject {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_cost")]
    pub cost: f32,
    /// Recipe ids the company must have products for.
    #[serde(default)]
    pub required_products: Vec<String>,
    #[serde(default)]
    pub effects: EffectSet,
}

impl SpecialProject {
    pub fn is_available(&self, company: &Company) -> bool {
        company.has_products_for(&self.required_products) && company.cash.value() >= self.cost
    }

    /// Pay for the project and apply its effects permanently.
    pub fn complete(
        &self,
        company: &mut Company,
        scope: &mut EffectScope<'_>,
    ) -> Result<EffectReceipt, EffectError> {
        if !company.has_products_for(&self.required_products) {
            return Err(EffectError::NotAvailable(self.name.clone()));
        }
        charge(company, self.cost)?;
        match self.effects.apply(company, scope) {
            Ok(receipt) => {
                info!(company = %company.name, project = %self.name, "special project completed");
                Ok(receipt)
            }
            Err(err) => {
                refund(company, self.cost);
                Err(err)
            }
        }
    }
}
