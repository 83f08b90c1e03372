//! Companies: the aggregate that owns products, workers and facilities.

use crate::economy::Economy;
use crate::product::{
    CompanyStanding, GrantId, Product, ProductCompleted, ProductEffectGrant, ProductId,
};
use crate::progress::{total_progress_required, FeatureLevels};
use crate::recipe::RecipeBook;
use crate::EconError;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sim_core::{
    CoreError, HasStats, Infrastructure, Market, ModifierId, ProductEffect, ProductType, Stat,
    Technology, Vertical, Worker,
};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::{debug, info, warn};

/// Number of harvest cycles kept in the revenue history.
pub const DEFAULT_HISTORY_LEN: usize = 24;

/// A product effect as applied to one product when it was granted.
#[derive(Clone, Debug, PartialEq)]
pub struct GrantApplication {
    pub product: ProductId,
    pub modifier: ModifierId,
}

/// A player or rival firm: its money, reputation, staff, facilities and
/// product line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    pub cash: Stat,
    pub opinion: Stat,
    pub publicity: Stat,
    pub hype: Stat,
    pub research: Stat,
    /// Dormant rivals take no part in cycles or markets until enabled.
    pub disabled: bool,
    pub products: Vec<Product>,
    pub workers: Vec<Worker>,
    /// Facilities owned.
    pub infrastructure: Infrastructure,
    /// Most facilities the company can hold.
    pub infrastructure_capacity: Infrastructure,
    pub technologies: BTreeSet<String>,
    pub verticals: BTreeSet<String>,
    pub markets: BTreeSet<Market>,
    product_effects: Vec<ProductEffectGrant>,
    next_product: u64,
    next_grant: u64,
    revenue_history: VecDeque<f32>,
    history_len: usize,
    /// Revenue since the last tax payment.
    pub annual_revenue: f32,
    /// Salaries and purchases since the last tax payment.
    pub annual_expenses: f32,
}

impl Company {
    pub const STAT_NAMES: [&'static str; 5] = ["Cash", "Opinion", "Publicity", "Hype", "Research"];

    pub fn new(name: impl Into<String>, cash: f32) -> Self {
        Self {
            name: name.into(),
            cash: Stat::new("Cash", cash),
            opinion: Stat::new("Opinion", 0.0),
            publicity: Stat::new("Publicity", 0.0),
            hype: Stat::new("Hype", 0.0),
            research: Stat::new("Research", 0.0),
            disabled: false,
            products: Vec::new(),
            workers: Vec::new(),
            infrastructure: Infrastructure::default(),
            infrastructure_capacity: Infrastructure {
                datacenter: 4,
                factory: 4,
                studio: 4,
                lab: 4,
            },
            technologies: BTreeSet::new(),
            verticals: BTreeSet::new(),
            markets: [Market::NorthAmerica].into_iter().collect(),
            product_effects: Vec::new(),
            next_product: 0,
            next_grant: 0,
            revenue_history: VecDeque::with_capacity(DEFAULT_HISTORY_LEN),
            history_len: DEFAULT_HISTORY_LEN,
            annual_revenue: 0.0,
            annual_expenses: 0.0,
        }
    }

    pub fn with_history_len(mut self, len: usize) -> Self {
        self.history_len = len.max(1);
        while self.revenue_history.len() > self.history_len {
            self.revenue_history.pop_front();
        }
        self
    }

    pub fn is_known_stat(name: &str) -> bool {
        Self::STAT_NAMES.contains(&name)
    }

    /// Sum of a worker stat across every hired worker.
    pub fn aggregate_worker_stat(&self, name: &str) -> Result<f32, CoreError> {
        if !Worker::is_known_stat(name) {
            return Err(CoreError::UnknownStat(name.to_string()));
        }
        Ok(self.worker_total(name))
    }

    fn worker_total(&self, name: &str) -> f32 {
        self.workers
            .iter()
            .filter_map(|w| w.stat(name))
            .map(Stat::value)
            .sum()
    }

    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn product_mut(&mut self, id: ProductId) -> Option<&mut Product> {
        self.products.iter_mut().find(|p| p.id == id)
    }

    pub fn developing_products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.is_developing())
    }

    pub fn active_products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.is_active())
    }

    /// Active product count per recipe id.
    pub fn active_recipe_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for p in self.active_products() {
            *counts.entry(p.recipe_id().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// True if a live product exists for every listed recipe id.
    pub fn has_products_for(&self, recipes: &[String]) -> bool {
        recipes.iter().all(|r| {
            self.products
                .iter()
                .any(|p| !p.is_retired() && p.recipe_id() == r)
        })
    }

    pub fn product_effects(&self) -> &[ProductEffectGrant] {
        &self.product_effects
    }

    /// Facilities occupied by products that are not retired.
    pub fn used_infrastructure(&self) -> Infrastructure {
        self.products
            .iter()
            .filter(|p| !p.is_retired())
            .map(|p| p.required_infrastructure())
            .sum()
    }

    pub fn free_infrastructure(&self) -> Infrastructure {
        self.infrastructure - self.used_infrastructure()
    }

    pub fn revenue_history(&self) -> impl Iterator<Item = f32> + '_ {
        self.revenue_history.iter().copied()
    }

    pub fn hire(&mut self, mut worker: Worker, salary: f32) {
        worker.salary = salary.max(0.0);
        info!(company = %self.name, worker = %worker.name, salary = worker.salary, "worker hired");
        self.workers.push(worker);
    }

    /// Remove a worker by name; the returned worker is unemployed.
    pub fn fire(&mut self, name: &str) -> Option<Worker> {
        let idx = self.workers.iter().position(|w| w.name == name)?;
        let mut worker = self.workers.remove(idx);
        worker.salary = 0.0;
        info!(company = %self.name, worker = %worker.name, "worker fired");
        Some(worker)
    }

    /// Begin developing a product from `types`.
    ///
    /// The company must have every required vertical and enough free
    /// facilities. Required progress is computed from the requested feature
    /// levels and the current workforce.
    pub fn start_product<R: Rng + ?Sized>(
        &mut self,
        types: Vec<ProductType>,
        levels: FeatureLevels,
        recipes: &RecipeBook,
        rng: &mut R,
    ) -> Result<ProductId, EconError> {
        if types.is_empty() {
            return Err(EconError::NoProductTypes);
        }
        for t in &types {
            if let Some(v) = t
                .required_verticals
                .iter()
                .find(|v| !self.verticals.contains(*v))
            {
                return Err(EconError::MissingVertical(v.clone()));
            }
        }
        let needed: Infrastructure = types.iter().map(|t| &t.required_infrastructure).sum();
        let free = self.free_infrastructure();
        if !needed.le(&free) {
            return Err(EconError::InsufficientInfrastructure { needed, free });
        }

        let recipe = recipes.for_types(&types);
        let difficulty = recipe.difficulty_for(&types);
        let required = total_progress_required(levels, difficulty, |s| self.worker_total(s));

        let id = ProductId(self.next_product);
        self.next_product += 1;
        let name = recipe
            .names
            .choose(rng)
            .cloned()
            .unwrap_or_else(|| format!("{} {}", recipe.name, id.0));
        info!(
            company = %self.name,
            product = %id,
            name = %name,
            recipe = %recipe.id,
            required_progress = required,
            "product started"
        );
        self.products
            .push(Product::new(id, name, types, recipe, required));
        Ok(id)
    }

    /// Retire a product and remove it from the company.
    pub fn shutdown_product(&mut self, id: ProductId) -> Option<Product> {
        let idx = self.products.iter().position(|p| p.id == id)?;
        let mut product = self.products.remove(idx);
        product.shutdown();
        Some(product)
    }

    fn standing_parts(&self) -> (f32, BTreeMap<String, usize>) {
        (self.opinion.value(), self.active_recipe_counts())
    }

    /// One development cycle. Worker productivity is split evenly among
    /// developing products (at least 1 each when anyone is hired) and the
    /// axis stats grow by the matching worker stats.
    pub fn develop_products(&mut self) -> Vec<ProductCompleted> {
        let developing = self
            .products
            .iter()
            .filter(|p| p.is_developing() && !p.disabled)
            .count();
        if self.disabled || developing == 0 || self.workers.is_empty() {
            return Vec::new();
        }
        let n = developing as f32;
        let progress = (self.worker_total("Productivity") / n).max(1.0);
        let design = self.worker_total("Creativity") / n;
        let marketing = self.worker_total("Charisma") / n;
        let engineering = self.worker_total("Cleverness") / n;

        let (opinion, active) = self.standing_parts();
        let standing = CompanyStanding {
            opinion,
            technologies: &self.technologies,
            markets: &self.markets,
            product_effects: &self.product_effects,
            active_recipes: &active,
        };
        let mut completed = Vec::new();
        for p in self
            .products
            .iter_mut()
            .filter(|p| p.is_developing() && !p.disabled)
        {
            p.accrue_features(design, marketing, engineering);
            if let (_, Some(note)) = p.develop_and_launch(progress, &standing) {
                completed.push(note);
            }
        }
        completed
    }

    /// One revenue cycle: collect revenue from every launched product into
    /// cash and the revenue history.
    pub fn harvest_products<R: Rng + ?Sized>(
        &mut self,
        elapsed: f32,
        economy: &Economy,
        rng: &mut R,
    ) -> f32 {
        if self.disabled {
            return 0.0;
        }
        let (opinion, active) = self.standing_parts();
        let standing = CompanyStanding {
            opinion,
            technologies: &self.technologies,
            markets: &self.markets,
            product_effects: &self.product_effects,
            active_recipes: &active,
        };
        let total: f32 = self
            .products
            .iter_mut()
            .map(|p| p.revenue(elapsed, &standing, economy, &mut *rng))
            .sum();

        self.cash.base_value += total;
        self.annual_revenue += total;
        self.revenue_history.push_back(total);
        while self.revenue_history.len() > self.history_len {
            self.revenue_history.pop_front();
        }
        debug!(company = %self.name, revenue = total, "harvested products");
        total
    }

    /// Monthly payroll: `salary / 12 × wage multiplier` per worker.
    pub fn pay(&mut self, economy: &Economy) -> f32 {
        let total: f32 = self
            .workers
            .iter()
            .map(|w| w.salary / 12.0 * economy.wage_multiplier)
            .sum();
        self.cash.base_value -= total;
        self.annual_expenses += total;
        if self.cash.value() < 0.0 {
            warn!(company = %self.name, cash = self.cash.value(), "company is in debt");
        }
        total
    }

    /// Yearly tax on positive profit; resets the annual totals.
    pub fn pay_taxes(&mut self, economy: &Economy) -> f32 {
        let profit = self.annual_revenue - self.annual_expenses;
        let tax = profit.max(0.0) * economy.tax_rate;
        self.cash.base_value -= tax;
        info!(company = %self.name, profit, tax, "taxes paid");
        self.annual_revenue = 0.0;
        self.annual_expenses = 0.0;
        tax
    }

    fn spend(&mut self, cost: f32) -> Result<(), EconError> {
        let available = self.cash.value();
        if cost > available {
            return Err(EconError::InsufficientCash {
                needed: cost,
                available,
            });
        }
        self.cash.base_value -= cost;
        self.annual_expenses += cost;
        Ok(())
    }

    /// Buy facilities within capacity, priced with the economy's cost
    /// adjustments. Returns the price paid.
    pub fn buy_infrastructure(
        &mut self,
        purchase: Infrastructure,
        economy: &Economy,
    ) -> Result<f32, EconError> {
        let after = self.infrastructure + purchase;
        if !after.le(&self.infrastructure_capacity) {
            return Err(EconError::ExceedsCapacity(purchase));
        }
        let cost = purchase.cost_with(&economy.infrastructure_cost);
        self.spend(cost)?;
        self.infrastructure = after;
        info!(company = %self.name, bought = %purchase, cost, "infrastructure bought");
        Ok(cost)
    }

    /// Expand into a vertical. Returns the price paid, 0 if already there.
    pub fn expand_to_vertical(
        &mut self,
        vertical: &Vertical,
        economy: &Economy,
    ) -> Result<f32, EconError> {
        if self.verticals.contains(&vertical.name) {
            return Ok(0.0);
        }
        let cost = vertical.cost * economy.expansion_cost_multiplier;
        self.spend(cost)?;
        self.verticals.insert(vertical.name.clone());
        info!(company = %self.name, vertical = %vertical.name, cost, "expanded to vertical");
        Ok(cost)
    }

    /// Returns false if the company was already in the market.
    pub fn enter_market(&mut self, market: Market) -> bool {
        self.markets.insert(market)
    }

    pub fn learn_technology(&mut self, name: impl Into<String>) -> bool {
        self.technologies.insert(name.into())
    }

    /// Prerequisites met and not yet known.
    pub fn can_research(&self, tech: &Technology) -> bool {
        !self.technologies.contains(&tech.name)
            && tech.is_available(&self.verticals, &self.technologies)
    }

    /// Spend accumulated research on `tech` if it is available and
    /// affordable.
    pub fn research_technology(&mut self, tech: &Technology) -> bool {
        if !self.can_research(tech) || self.research.value() < tech.required_research {
            return false;
        }
        self.research.base_value -= tech.required_research;
        info!(company = %self.name, technology = %tech.name, "technology researched");
        self.learn_technology(tech.name.clone())
    }

    /// Store a product effect and apply it to every matching live product.
    /// Products launched later receive it at launch.
    pub fn grant_product_effect(
        &mut self,
        effect: ProductEffect,
    ) -> Result<(GrantId, Vec<GrantApplication>), CoreError> {
        if !Product::is_known_stat(&effect.buff.stat) {
            return Err(CoreError::UnknownStat(effect.buff.stat.clone()));
        }
        let grant = ProductEffectGrant {
            id: GrantId(self.next_grant),
            effect,
        };
        self.next_grant += 1;
        let mut applied = Vec::new();
        for p in self.products.iter_mut() {
            if let Some(modifier) = p.receive_grant(&grant, &self.markets)? {
                applied.push(GrantApplication {
                    product: p.id,
                    modifier,
                });
            }
        }
        let id = grant.id;
        self.product_effects.push(grant);
        Ok((id, applied))
    }

    /// Forget a product effect and remove its modifiers from every product.
    pub fn revoke_product_effect(&mut self, id: GrantId) -> bool {
        let before = self.product_effects.len();
        self.product_effects.retain(|g| g.id != id);
        for p in self.products.iter_mut() {
            p.revoke_grant(id);
        }
        self.product_effects.len() != before
    }

    /// Advance timed modifiers on the company, its workers and products.
    pub fn tick_all_modifiers(&mut self) -> usize {
        let mut expired = self.tick_modifiers();
        for w in self.workers.iter_mut() {
            expired += w.tick_modifiers();
        }
        for p in self.products.iter_mut() {
            expired += p.tick_modifiers();
        }
        expired
    }

    /// Weekly decay of opinion, publicity and hype.
    pub fn forget(&mut self, rate: f32) {
        let keep = (1.0 - rate).clamp(0.0, 1.0);
        for s in [&mut self.opinion, &mut self.publicity, &mut self.hype] {
            s.base_value *= keep;
        }
    }
}

impl HasStats for Company {
    fn stat(&self, name: &str) -> Option<&Stat> {
        match name {
            "Cash" => Some(&self.cash),
            "Opinion" => Some(&self.opinion),
            "Publicity" => Some(&self.publicity),
            "Hype" => Some(&self.hype),
            "Research" => Some(&self.research),
            _ => None,
        }
    }

    fn stat_mut(&mut self, name: &str) -> Option<&mut Stat> {
        match name {
            "Cash" => Some(&mut self.cash),
            "Opinion" => Some(&mut self.opinion),
            "Publicity" => Some(&mut self.publicity),
            "Hype" => Some(&mut self.hype),
            "Research" => Some(&mut self.research),
            _ => None,
        }
    }

    fn stats_mut(&mut self) -> Vec<&mut Stat> {
        vec![
            &mut self.cash,
            &mut self.opinion,
            &mut self.publicity,
            &mut self.hype,
            &mut self.research,
        ]
    }
}
