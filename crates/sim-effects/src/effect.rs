//! Effect sets and the pipeline that applies them to companies, workers
//! and products.
//!
//! Every application returns an [`EffectReceipt`] listing exactly what it
//! changed, so the same application can later be undone with
//! [`EffectReceipt::revert`] without disturbing other buffs.

use crate::event::EventPool;
use crate::EffectError;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use sim_core::{
    validate_probability, CoreError, HasStats, InfrastructureCostModifiers, Market, ModifierId,
    ProductEffect, StatBuff, UnlockSet, Worker,
};
use sim_econ::{Company, Economy, GrantId, Product, ProductId};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Default limit on events triggering events.
pub const DEFAULT_MAX_EVENT_DEPTH: u32 = 3;

/// Additive changes to the shared [`Economy`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyDelta {
    pub spending_multiplier: f32,
    pub wage_multiplier: f32,
    pub economic_stability: f32,
    pub tax_rate: f32,
    pub expansion_cost_multiplier: f32,
    pub forgetting_rate: f32,
}

impl EconomyDelta {
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    fn apply_to(&self, economy: &mut Economy, sign: f32) {
        economy.spending_multiplier += sign * self.spending_multiplier;
        economy.wage_multiplier += sign * self.wage_multiplier;
        economy.economy_multiplier += sign * self.economic_stability;
        economy.tax_rate += sign * self.tax_rate;
        economy.expansion_cost_multiplier += sign * self.expansion_cost_multiplier;
        economy.forgetting_rate += sign * self.forgetting_rate;
    }
}

/// A follow-up event that may fire when an effect set is applied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NestedEvent {
    pub name: String,
    pub probability: f32,
}

/// Everything one event, item or project does, as plain data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectSet {
    pub cash: f32,
    pub opinion: f32,
    pub publicity: f32,
    pub hype: f32,
    pub research: f32,
    pub company_buffs: Vec<StatBuff>,
    pub worker_buffs: Vec<StatBuff>,
    pub product_effects: Vec<ProductEffect>,
    pub economy: EconomyDelta,
    /// Percent change per facility type.
    pub infrastructure_cost: InfrastructureCostModifiers,
    pub unlocks: UnlockSet,
    pub event: Option<NestedEvent>,
    /// Rival company to wake up.
    pub enable_company: Option<String>,
}

/// Which stat holder a recorded modifier lives on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatOwner {
    Company,
    Worker(String),
    Product(ProductId),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModifierRecord {
    pub owner: StatOwner,
    pub stat: String,
    pub modifier: ModifierId,
}

/// A change made directly to a company stat's base value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScalarDelta {
    pub stat: String,
    pub amount: f32,
}

/// What one application changed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectReceipt {
    pub modifiers: Vec<ModifierRecord>,
    pub scalars: Vec<ScalarDelta>,
    pub grants: Vec<GrantId>,
    pub economy: EconomyDelta,
    pub infrastructure_cost: InfrastructureCostModifiers,
    /// Only the unlocks that were new at application time.
    pub unlocked: UnlockSet,
    pub triggered_events: Vec<String>,
    /// Rival companies the caller should enable.
    pub enable_companies: Vec<String>,
    pub nested: Vec<EffectReceipt>,
}

impl EffectReceipt {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Modifiers recorded by this receipt and every nested one.
    pub fn modifier_count(&self) -> usize {
        self.modifiers.len() + self.nested.iter().map(Self::modifier_count).sum::<usize>()
    }

    /// Remove the modifiers this receipt and its nested receipts placed on
    /// `worker`, and forget them. Returns how many were removed.
    pub fn detach_worker(&mut self, worker: &mut Worker) -> usize {
        let owner = StatOwner::Worker(worker.name.clone());
        let mut removed = 0;
        self.modifiers.retain(|record| {
            if record.owner != owner {
                return true;
            }
            remove_recorded(worker, record);
            removed += 1;
            false
        });
        removed
            + self
                .nested
                .iter_mut()
                .map(|n| n.detach_worker(worker))
                .sum::<usize>()
    }

    /// Undo exactly this application: nested events first, then the
    /// target's modifiers and deltas, then shared state.
    pub fn revert<T: EffectTarget + ?Sized>(&self, target: &mut T, scope: &mut EffectScope<'_>) {
        for nested in self.nested.iter().rev() {
            nested.revert(target, scope);
        }
        target.revert_local(self);

        self.economy.apply_to(scope.economy, -1.0);
        for (t, pct) in &self.infrastructure_cost {
            *scope.economy.infrastructure_cost.entry(*t).or_insert(0.0) -= pct;
        }
        subtract_unlocks(scope.unlocks, &self.unlocked);
        debug!(
            modifiers = self.modifiers.len(),
            scalars = self.scalars.len(),
            "effect reverted"
        );
    }
}

/// Shared state an application may touch besides its target.
pub struct EffectScope<'a> {
    pub economy: &'a mut Economy,
    pub unlocks: &'a mut UnlockSet,
    pub events: &'a EventPool,
    pub rng: &'a mut dyn RngCore,
    pub max_depth: u32,
    depth: u32,
}

impl<'a> EffectScope<'a> {
    pub fn new(
        economy: &'a mut Economy,
        unlocks: &'a mut UnlockSet,
        events: &'a EventPool,
        rng: &'a mut dyn RngCore,
    ) -> Self {
        Self {
            economy,
            unlocks,
            events,
            rng,
            max_depth: DEFAULT_MAX_EVENT_DEPTH,
            depth: 0,
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Nesting level of the application in progress.
    pub fn depth(&self) -> u32 {
        self.depth
    }
}

/// Something an [`EffectSet`] can be applied to.
pub trait EffectTarget {
    /// Apply the parts of `effects` aimed at this kind of target, recording
    /// each change in `receipt`.
    fn apply_local(
        &mut self,
        effects: &EffectSet,
        receipt: &mut EffectReceipt,
    ) -> Result<(), EffectError>;

    /// Undo the entries of `receipt` that live on this target.
    fn revert_local(&mut self, receipt: &EffectReceipt);
}

impl EffectSet {
    /// Scalar company deltas by stat name.
    pub fn scalar_deltas(&self) -> [(&'static str, f32); 5] {
        [
            ("Cash", self.cash),
            ("Opinion", self.opinion),
            ("Publicity", self.publicity),
            ("Hype", self.hype),
            ("Research", self.research),
        ]
    }

    /// Check stat names and probabilities before anything is applied.
    pub fn validate(&self) -> Result<(), EffectError> {
        let unknown = |b: &StatBuff| EffectError::Core(CoreError::UnknownStat(b.stat.clone()));
        if let Some(b) = self
            .company_buffs
            .iter()
            .find(|b| !Company::is_known_stat(&b.stat))
        {
            return Err(unknown(b));
        }
        if let Some(b) = self
            .worker_buffs
            .iter()
            .find(|b| !Worker::is_known_stat(&b.stat))
        {
            return Err(unknown(b));
        }
        if let Some(pe) = self
            .product_effects
            .iter()
            .find(|pe| !Product::is_known_stat(&pe.buff.stat))
        {
            return Err(unknown(&pe.buff));
        }
        if let Some(e) = &self.event {
            validate_probability(e.probability)?;
        }
        Ok(())
    }

    /// Apply to `target`. On failure nothing stays applied.
    pub fn apply<T: EffectTarget + ?Sized>(
        &self,
        target: &mut T,
        scope: &mut EffectScope<'_>,
    ) -> Result<EffectReceipt, EffectError> {
        let mut receipt = EffectReceipt::default();
        match self.apply_parts(target, scope, &mut receipt) {
            Ok(()) => Ok(receipt),
            Err(err) => {
                receipt.revert(target, scope);
                Err(err)
            }
        }
    }

    fn apply_parts<T: EffectTarget + ?Sized>(
        &self,
        target: &mut T,
        scope: &mut EffectScope<'_>,
        receipt: &mut EffectReceipt,
    ) -> Result<(), EffectError> {
        self.validate()?;
        target.apply_local(self, receipt)?;

        if !self.economy.is_zero() {
            self.economy.apply_to(scope.economy, 1.0);
            receipt.economy = self.economy;
        }
        for (t, pct) in &self.infrastructure_cost {
            *scope.economy.infrastructure_cost.entry(*t).or_insert(0.0) += pct;
            receipt.infrastructure_cost.insert(*t, *pct);
        }
        receipt.unlocked = new_unlocks(scope.unlocks, &self.unlocks);
        scope.unlocks.merge(&self.unlocks);

        if let Some(name) = &self.enable_company {
            receipt.enable_companies.push(name.clone());
        }

        if let Some(nested) = &self.event {
            self.trigger_nested(nested, target, scope, receipt)?;
        }
        Ok(())
    }

    fn trigger_nested<T: EffectTarget + ?Sized>(
        &self,
        nested: &NestedEvent,
        target: &mut T,
        scope: &mut EffectScope<'_>,
        receipt: &mut EffectReceipt,
    ) -> Result<(), EffectError> {
        let events: &EventPool = scope.events;
        let event = events
            .get(&nested.name)
            .ok_or_else(|| EffectError::UnknownEvent(nested.name.clone()))?;
        if scope.depth >= scope.max_depth {
            warn!(
                event = %nested.name,
                depth = scope.depth,
                "nested event skipped at depth limit"
            );
            return Ok(());
        }
        let roll: f32 = scope.rng.gen();
        if roll >= nested.probability {
            return Ok(());
        }
        info!(event = %nested.name, depth = scope.depth + 1, "nested event triggered");
        scope.depth += 1;
        let result = event.effects.apply(target, scope);
        scope.depth -= 1;
        receipt.nested.push(result?);
        receipt.triggered_events.push(nested.name.clone());
        Ok(())
    }
}

fn new_unlocks(current: &UnlockSet, grant: &UnlockSet) -> UnlockSet {
    fn diff<T: Ord + Clone>(current: &BTreeSet<T>, grant: &BTreeSet<T>) -> BTreeSet<T> {
        grant.difference(current).cloned().collect()
    }
    UnlockSet {
        product_types: diff(&current.product_types, &grant.product_types),
        verticals: diff(&current.verticals, &grant.verticals),
        technologies: diff(&current.technologies, &grant.technologies),
        markets: diff(&current.markets, &grant.markets),
        events: diff(&current.events, &grant.events),
        items: diff(&current.items, &grant.items),
        special_projects: diff(&current.special_projects, &grant.special_projects),
    }
}

fn subtract_unlocks(current: &mut UnlockSet, added: &UnlockSet) {
    fn remove<T: Ord>(from: &mut BTreeSet<T>, added: &BTreeSet<T>) {
        from.retain(|x| !added.contains(x));
    }
    remove(&mut current.product_types, &added.product_types);
    remove(&mut current.verticals, &added.verticals);
    remove(&mut current.technologies, &added.technologies);
    remove(&mut current.markets, &added.markets);
    remove(&mut current.events, &added.events);
    remove(&mut current.items, &added.items);
    remove(&mut current.special_projects, &added.special_projects);
}

pub(crate) fn apply_worker_buffs(
    worker: &mut Worker,
    buffs: &[StatBuff],
    receipt: &mut EffectReceipt,
) -> Result<(), EffectError> {
    for buff in buffs {
        let modifier = worker.apply_buff(buff)?;
        receipt.modifiers.push(ModifierRecord {
            owner: StatOwner::Worker(worker.name.clone()),
            stat: buff.stat.clone(),
            modifier,
        });
    }
    Ok(())
}

fn remove_recorded<S: HasStats + ?Sized>(holder: &mut S, record: &ModifierRecord) {
    if let Some(stat) = holder.stat_mut(&record.stat) {
        stat.remove_modifier(record.modifier);
    }
}

impl EffectTarget for Company {
    fn apply_local(
        &mut self,
        effects: &EffectSet,
        receipt: &mut EffectReceipt,
    ) -> Result<(), EffectError> {
        for (name, amount) in effects.scalar_deltas() {
            if amount == 0.0 {
                continue;
            }
            if let Some(stat) = self.stat_mut(name) {
                stat.base_value += amount;
                receipt.scalars.push(ScalarDelta {
                    stat: name.to_string(),
                    amount,
                });
            }
        }
        for buff in &effects.company_buffs {
            let modifier = self.apply_buff(buff)?;
            receipt.modifiers.push(ModifierRecord {
                owner: StatOwner::Company,
                stat: buff.stat.clone(),
                modifier,
            });
        }
        for worker in self.workers.iter_mut() {
            apply_worker_buffs(worker, &effects.worker_buffs, receipt)?;
        }
        for effect in &effects.product_effects {
            let (grant, applied) = self.grant_product_effect(effect.clone())?;
            debug!(company = %self.name, products = applied.len(), "product effect granted");
            receipt.grants.push(grant);
        }
        Ok(())
    }

    fn revert_local(&mut self, receipt: &EffectReceipt) {
        for record in receipt.modifiers.iter().rev() {
            match &record.owner {
                StatOwner::Company => remove_recorded(self, record),
                StatOwner::Worker(name) => {
                    if let Some(w) = self.workers.iter_mut().find(|w| &w.name == name) {
                        remove_recorded(w, record);
                    }
                }
                StatOwner::Product(id) => {
                    if let Some(p) = self.product_mut(*id) {
                        remove_recorded(p, record);
                    }
                }
            }
        }
        for delta in &receipt.scalars {
            if let Some(stat) = self.stat_mut(&delta.stat) {
                stat.base_value -= delta.amount;
            }
        }
        for grant in &receipt.grants {
            self.revoke_product_effect(*grant);
        }
    }
}

impl EffectTarget for Worker {
    fn apply_local(
        &mut self,
        effects: &EffectSet,
        receipt: &mut EffectReceipt,
    ) -> Result<(), EffectError> {
        apply_worker_buffs(self, &effects.worker_buffs, receipt)
    }

    fn revert_local(&mut self, receipt: &EffectReceipt) {
        for record in receipt.modifiers.iter().rev() {
            if record.owner == StatOwner::Worker(self.name.clone()) {
                remove_recorded(self, record);
            }
        }
    }
}

/// Applied straight to a product, an effect's market filter is not
/// consulted; category and vertical filters still are.
impl EffectTarget for Product {
    fn apply_local(
        &mut self,
        effects: &EffectSet,
        receipt: &mut EffectReceipt,
    ) -> Result<(), EffectError> {
        let markets: BTreeSet<Market> = Market::ALL.into_iter().collect();
        let types: Vec<String> = self.product_types.iter().map(|t| t.name.clone()).collect();
        let types: Vec<&str> = types.iter().map(String::as_str).collect();
        let verticals = self.required_verticals();
        let verticals: Vec<&str> = verticals.iter().map(String::as_str).collect();
        for effect in &effects.product_effects {
            if !effect.matches(&types, &verticals, &markets) {
                continue;
            }
            let modifier = self.apply_buff(&effect.buff)?;
            receipt.modifiers.push(ModifierRecord {
                owner: StatOwner::Product(self.id),
                stat: effect.buff.stat.clone(),
                modifier,
            });
        }
        Ok(())
    }

    fn revert_local(&mut self, receipt: &EffectReceipt) {
        for record in receipt.modifiers.iter().rev() {
            if record.owner == StatOwner::Product(self.id) {
                remove_recorded(self, record);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::GameEvent;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use sim_core::InfrastructureType;

    struct World {
        economy: Economy,
        unlocks: UnlockSet,
        events: EventPool,
        rng: ChaCha8Rng,
    }

    impl World {
        fn new() -> Self {
            Self {
                economy: Economy::default(),
                unlocks: UnlockSet::default(),
                events: EventPool::new(),
                rng: ChaCha8Rng::seed_from_u64(3),
            }
        }

        fn scope(&mut self) -> EffectScope<'_> {
            EffectScope::new(
                &mut self.economy,
                &mut self.unlocks,
                &self.events,
                &mut self.rng,
            )
        }
    }

    fn staffed() -> Company {
        let mut c = Company::new("Player", 1000.0);
        c.hire(Worker::new("Yoyo Ma"), 50_000.0);
        c.hire(Worker::new("Ada"), 50_000.0);
        c
    }

    #[test]
    fn worker_happiness_buff_applies_and_reverts() {
        let mut world = World::new();
        let mut worker = Worker::new("Yoyo Ma");
        let effects = EffectSet {
            worker_buffs: vec![StatBuff::add("Happiness", 100.0)],
            ..EffectSet::default()
        };
        let receipt = effects.apply(&mut worker, &mut world.scope()).unwrap();
        assert_eq!(worker.happiness.value(), 100.0);
        receipt.revert(&mut worker, &mut world.scope());
        assert_eq!(worker.happiness.value(), 0.0);
    }

    #[test]
    fn company_application_reaches_every_part() {
        let mut world = World::new();
        let mut company = staffed();
        let effects = EffectSet {
            cash: 500.0,
            opinion: 10.0,
            company_buffs: vec![StatBuff::multiply("Publicity", 2.0)],
            worker_buffs: vec![StatBuff::add("Creativity", 1.0)],
            product_effects: vec![ProductEffect::new(StatBuff::add("Design", 5.0))],
            economy: EconomyDelta {
                spending_multiplier: 0.5,
                ..EconomyDelta::default()
            },
            infrastructure_cost: [(InfrastructureType::Lab, -10.0)].into_iter().collect(),
            unlocks: UnlockSet {
                verticals: ["Hardware".to_string()].into_iter().collect(),
                ..UnlockSet::default()
            },
            enable_company: Some("Rival".to_string()),
            ..EffectSet::default()
        };
        let receipt = effects.apply(&mut company, &mut world.scope()).unwrap();

        assert_eq!(company.cash.value(), 1500.0);
        assert_eq!(company.opinion.value(), 10.0);
        assert!(company.workers.iter().all(|w| w.creativity.value() == 1.0));
        assert_eq!(company.product_effects().len(), 1);
        assert_eq!(world.economy.spending_multiplier, 1.5);
        assert_eq!(world.economy.infrastructure_cost[&InfrastructureType::Lab], -10.0);
        assert!(world.unlocks.verticals.contains("Hardware"));
        assert_eq!(receipt.enable_companies, vec!["Rival".to_string()]);
        assert_eq!(receipt.modifier_count(), 3);

        receipt.revert(&mut company, &mut world.scope());
        assert_eq!(company.cash.value(), 1000.0);
        assert_eq!(company.opinion.value(), 0.0);
        assert!(company.workers.iter().all(|w| w.creativity.value() == 0.0));
        assert!(company.product_effects().is_empty());
        assert_eq!(world.economy.spending_multiplier, 1.0);
        assert_eq!(world.economy.infrastructure_cost[&InfrastructureType::Lab], 0.0);
        assert!(world.unlocks.is_empty());
    }

    #[test]
    fn revert_leaves_previous_unlocks_in_place() {
        let mut world = World::new();
        world.unlocks.verticals.insert("Hardware".to_string());
        let mut company = staffed();
        let effects = EffectSet {
            unlocks: UnlockSet {
                verticals: ["Hardware".to_string(), "Finance".to_string()]
                    .into_iter()
                    .collect(),
                ..UnlockSet::default()
            },
            ..EffectSet::default()
        };
        let receipt = effects.apply(&mut company, &mut world.scope()).unwrap();
        receipt.revert(&mut company, &mut world.scope());
        assert_eq!(
            world.unlocks.verticals.iter().collect::<Vec<_>>(),
            vec!["Hardware"]
        );
    }

    #[test]
    fn unknown_stat_applies_nothing() {
        let mut world = World::new();
        let mut company = staffed();
        let effects = EffectSet {
            cash: 100.0,
            worker_buffs: vec![StatBuff::add("Luck", 1.0)],
            ..EffectSet::default()
        };
        let err = effects.apply(&mut company, &mut world.scope()).unwrap_err();
        assert_eq!(
            err,
            EffectError::Core(CoreError::UnknownStat("Luck".to_string()))
        );
        assert_eq!(company.cash.value(), 1000.0);
    }

    #[test]
    fn unrelated_buffs_survive_a_revert() {
        let mut world = World::new();
        let mut company = staffed();
        let a = EffectSet {
            company_buffs: vec![StatBuff::add("Hype", 3.0)],
            ..EffectSet::default()
        };
        let b = EffectSet {
            company_buffs: vec![StatBuff::add("Hype", 4.0)],
            ..EffectSet::default()
        };
        let ra = a.apply(&mut company, &mut world.scope()).unwrap();
        let _rb = b.apply(&mut company, &mut world.scope()).unwrap();
        ra.revert(&mut company, &mut world.scope());
        assert_eq!(company.hype.value(), 4.0);
    }

    #[test]
    fn product_target_takes_matching_effects_only() {
        use sim_core::ProductType;
        use sim_econ::ProductRecipe;
        use std::sync::Arc;

        let mut world = World::new();
        let mut product = Product::new(
            ProductId(7),
            "Friendly",
            vec![ProductType::new("Social Network")],
            Arc::new(ProductRecipe::fallback()),
            10.0,
        );
        product.design.base_value = 2.0;
        product.apply_buff(&StatBuff::add("Design", 1.0)).unwrap();

        let effects = EffectSet {
            product_effects: vec![
                ProductEffect {
                    product_types: vec!["Social Network".to_string()],
                    markets: vec![Market::Alien],
                    ..ProductEffect::new(StatBuff::add("Design", 4.0))
                },
                ProductEffect {
                    product_types: vec!["Mobile".to_string()],
                    ..ProductEffect::new(StatBuff::add("Design", 100.0))
                },
            ],
            ..EffectSet::default()
        };
        let receipt = effects.apply(&mut product, &mut world.scope()).unwrap();
        assert_eq!(product.design.value(), 7.0);
        assert_eq!(receipt.modifiers.len(), 1);
        assert_eq!(receipt.modifiers[0].owner, StatOwner::Product(ProductId(7)));

        receipt.revert(&mut product, &mut world.scope());
        assert_eq!(product.design.value(), 3.0);
        assert_eq!(product.design.modifiers().len(), 1);
    }

    fn chain(name: &str, next: &str) -> GameEvent {
        GameEvent {
            name: name.to_string(),
            description: String::new(),
            probability: 1.0,
            condition: None,
            effects: EffectSet {
                cash: 1.0,
                event: Some(NestedEvent {
                    name: next.to_string(),
                    probability: 1.0,
                }),
                ..EffectSet::default()
            },
        }
    }

    #[test]
    fn nested_events_stop_at_depth_limit() {
        let mut world = World::new();
        world.events.insert(chain("Loop", "Loop")).unwrap();
        let mut company = Company::new("Player", 0.0);
        let effects = EffectSet {
            event: Some(NestedEvent {
                name: "Loop".to_string(),
                probability: 1.0,
            }),
            ..EffectSet::default()
        };
        let receipt = effects.apply(&mut company, &mut world.scope()).unwrap();
        assert_eq!(company.cash.value(), DEFAULT_MAX_EVENT_DEPTH as f32);
        assert_eq!(receipt.triggered_events, vec!["Loop".to_string()]);

        receipt.revert(&mut company, &mut world.scope());
        assert_eq!(company.cash.value(), 0.0);
    }

    #[test]
    fn zero_probability_nested_event_never_fires() {
        let mut world = World::new();
        world.events.insert(chain("Boom", "Boom")).unwrap();
        let mut company = Company::new("Player", 0.0);
        let effects = EffectSet {
            event: Some(NestedEvent {
                name: "Boom".to_string(),
                probability: 0.0,
            }),
            ..EffectSet::default()
        };
        let receipt = effects.apply(&mut company, &mut world.scope()).unwrap();
        assert!(receipt.nested.is_empty());
        assert_eq!(company.cash.value(), 0.0);
    }

    #[test]
    fn missing_nested_event_is_an_error() {
        let mut world = World::new();
        let mut company = Company::new("Player", 0.0);
        let effects = EffectSet {
            opinion: 5.0,
            event: Some(NestedEvent {
                name: "Nope".to_string(),
                probability: 1.0,
            }),
            ..EffectSet::default()
        };
        assert_eq!(
            effects.apply(&mut company, &mut world.scope()).unwrap_err(),
            EffectError::UnknownEvent("Nope".to_string())
        );
        assert_eq!(company.opinion.value(), 0.0);
    }

    #[test]
    fn effect_sets_load_from_yaml() {
        let yaml = r#"
cash: 2500
worker_buffs:
  - stat: Happiness
    value: 1
    duration: 4
product_effects:
  - product_types: [Social Network]
    buff: { stat: Marketing, value: 1.1, kind: Multiply }
economy:
  spending_multiplier: -0.1
"#;
        let effects: EffectSet = serde_yaml::from_str(yaml).unwrap();
        effects.validate().unwrap();
        assert_eq!(effects.cash, 2500.0);
        assert_eq!(effects.worker_buffs[0].duration, Some(4));
        assert_eq!(effects.product_effects[0].buff.kind, sim_core::BuffKind::Multiply);
    }
}
