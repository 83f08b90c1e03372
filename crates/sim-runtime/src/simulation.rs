//! The simulation context. It owns every company (the player first), the
//! shared economy, unlocks, content and the seeded random source, and runs
//! cycles as the scheduler makes them due.

use crate::clock::{Clock, MONTHS_PER_YEAR, WEEKS_PER_MONTH};
use crate::config::SimConfig;
use crate::data::{GameData, WorkerTemplate};
use crate::listeners::Listeners;
use crate::report::KpiSnapshot;
use crate::scheduler::{Cycle, DueCycle, Scheduler};
use crate::RuntimeError;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sim_core::{Infrastructure, UnlockSet, Worker};
use sim_econ::{
    calculate_market_shares, Company, EconError, Economy, FeatureLevels, Product,
    ProductCompleted, ProductId, RecipeBook,
};
use sim_effects::{BuffLedger, ConditionContext, EffectReceipt, EffectScope, EventPool, Perk};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Weeks a fired worker stays off the job market.
const FIRED_OFF_MARKET_WEEKS: u32 = 4;

/// A product that finished development.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductLaunched {
    pub company: String,
    pub completed: ProductCompleted,
}

/// A random event that fired and was applied to the player company.
#[derive(Clone, Debug, PartialEq)]
pub struct EventFired {
    pub event: String,
    pub company: String,
    pub receipt: EffectReceipt,
}

fn wake_companies(companies: &mut [Company], receipt: &EffectReceipt) {
    for name in &receipt.enable_companies {
        match companies.iter_mut().find(|c| &c.name == name) {
            Some(c) if c.disabled => {
                c.disabled = false;
                info!(company = %name, "company enabled");
            }
            Some(_) => {}
            None => warn!(company = %name, "cannot enable unknown company"),
        }
    }
    for nested in &receipt.nested {
        wake_companies(companies, nested);
    }
}

fn locked(kind: &'static str, name: &str) -> RuntimeError {
    RuntimeError::Locked {
        kind,
        name: name.to_string(),
    }
}

fn unknown(kind: &'static str, name: &str) -> RuntimeError {
    RuntimeError::Unknown {
        kind,
        name: name.to_string(),
    }
}

/// One running game. The player company is always `companies()[0]`.
pub struct Simulation {
    config: SimConfig,
    data: GameData,
    recipes: RecipeBook,
    events: EventPool,
    companies: Vec<Company>,
    job_market: Vec<Worker>,
    economy: Economy,
    unlocks: UnlockSet,
    ledger: BuffLedger,
    perks: BTreeMap<String, Perk>,
    clock: Clock,
    scheduler: Scheduler,
    rng: ChaCha8Rng,
    products_completed: usize,
    events_fired: usize,
    pub on_product_launched: Listeners<ProductLaunched>,
    pub on_event: Listeners<EventFired>,
}

impl Simulation {
    pub fn new(config: SimConfig, data: GameData) -> Result<Self, RuntimeError> {
        config.validate()?;
        data.validate()?;
        if data.companies.iter().any(|c| c.name == config.player_name) {
            return Err(RuntimeError::InvalidConfig(format!(
                "player_name {} is also a rival",
                config.player_name
            )));
        }
        let recipes = data.recipe_book()?;
        let events = data.event_pool()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.rng_seed);

        let player = Company::new(config.player_name.clone(), config.starting_cash)
            .with_history_len(config.history_len);
        let mut companies = vec![player];
        for t in &data.companies {
            companies.push(t.build(&data, &recipes, config.history_len, &mut rng)?);
        }
        let job_market = data.workers.iter().map(WorkerTemplate::to_worker).collect();

        info!(
            seed = config.rng_seed,
            companies = companies.len(),
            recipes = recipes.len(),
            events = events.len(),
            "simulation initialized"
        );
        Ok(Self {
            economy: config.economy.clone(),
            unlocks: data.unlocked.clone(),
            clock: Clock::new(config.start_date),
            scheduler: Scheduler::new(config.week_seconds, config.cycle_jitter),
            config,
            data,
            recipes,
            events,
            companies,
            job_market,
            ledger: BuffLedger::new(),
            perks: BTreeMap::new(),
            rng,
            products_completed: 0,
            events_fired: 0,
            on_product_launched: Listeners::new(),
            on_event: Listeners::new(),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn data(&self) -> &GameData {
        &self.data
    }

    pub fn recipes(&self) -> &RecipeBook {
        &self.recipes
    }

    pub fn events(&self) -> &EventPool {
        &self.events
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn economy(&self) -> &Economy {
        &self.economy
    }

    pub fn unlocks(&self) -> &UnlockSet {
        &self.unlocks
    }

    pub fn ledger(&self) -> &BuffLedger {
        &self.ledger
    }

    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    pub fn player(&self) -> &Company {
        &self.companies[0]
    }

    pub fn player_mut(&mut self) -> &mut Company {
        &mut self.companies[0]
    }

    pub fn company(&self, name: &str) -> Option<&Company> {
        self.companies.iter().find(|c| c.name == name)
    }

    /// Workers available for hire.
    pub fn job_market(&self) -> &[Worker] {
        &self.job_market
    }

    pub fn perk(&self, name: &str) -> Option<&Perk> {
        self.perks.get(name)
    }

    /// Products the player has launched so far.
    pub fn products_completed(&self) -> usize {
        self.products_completed
    }

    pub fn events_fired(&self) -> usize {
        self.events_fired
    }

    pub fn report(&self) -> KpiSnapshot {
        KpiSnapshot::capture(
            self.player(),
            self.clock.date(),
            self.clock.weeks_elapsed(),
            self.products_completed,
            self.events_fired,
        )
    }

    /// Advance time by `dt` simulated seconds and run every cycle that
    /// came due. Returns the cycles in the order they ran.
    pub fn step(&mut self, dt: f32) -> Vec<Cycle> {
        let due = self.scheduler.advance(dt, &mut self.rng);
        for d in &due {
            self.run_cycle(*d);
        }
        due.into_iter().map(|d| d.cycle).collect()
    }

    pub fn run_weeks(&mut self, weeks: u64) {
        let target = self.scheduler.weeks() + weeks;
        let dt = self.config.week_seconds;
        while self.scheduler.weeks() < target {
            self.step(dt);
        }
    }

    pub fn run_years(&mut self, years: u64) {
        self.run_weeks(years * WEEKS_PER_MONTH * MONTHS_PER_YEAR);
    }

    fn run_cycle(&mut self, due: DueCycle) {
        debug!(cycle = ?due.cycle, elapsed = due.elapsed, "cycle");
        match due.cycle {
            Cycle::Development => self.develop(),
            Cycle::Revenue => {
                for c in self.companies.iter_mut().filter(|c| !c.disabled) {
                    c.harvest_products(due.elapsed, &self.economy, &mut self.rng);
                }
            }
            Cycle::Market => calculate_market_shares(&mut self.companies),
            Cycle::Weekly => self.weekly(),
            Cycle::Monthly => {
                for c in self.companies.iter_mut().filter(|c| !c.disabled) {
                    c.pay(&self.economy);
                }
            }
            Cycle::Yearly => {
                for c in self.companies.iter_mut().filter(|c| !c.disabled) {
                    c.pay_taxes(&self.economy);
                }
                info!(year = self.clock.year(), "new year");
            }
        }
    }

    fn develop(&mut self) {
        for (i, company) in self.companies.iter_mut().enumerate() {
            if company.disabled {
                continue;
            }
            for completed in company.develop_products() {
                if i == 0 {
                    self.products_completed += 1;
                }
                self.on_product_launched.publish(&ProductLaunched {
                    company: company.name.clone(),
                    completed,
                });
            }
        }
    }

    fn weekly(&mut self) {
        self.clock.advance_week();
        for c in self.companies.iter_mut().filter(|c| !c.disabled) {
            c.tick_all_modifiers();
            c.forget(self.economy.forgetting_rate);
        }
        for w in self.job_market.iter_mut() {
            w.tick_job_market();
        }
        self.roll_events();
    }

    /// Roll unlocked events against the player and apply those that fire.
    fn roll_events(&mut self) {
        let ctx = ConditionContext::from_company(&self.companies[0], self.clock.year());
        let fired = self.events.roll(&self.unlocks, &ctx, &mut self.rng);
        for event in fired {
            let mut scope =
                EffectScope::new(&mut self.economy, &mut self.unlocks, &self.events, &mut self.rng)
                    .with_max_depth(self.config.max_event_depth);
            match event.effects.apply(&mut self.companies[0], &mut scope) {
                Ok(receipt) => {
                    self.events_fired += 1;
                    wake_companies(&mut self.companies, &receipt);
                    info!(
                        event = %event.name,
                        modifiers = receipt.modifier_count(),
                        "event applied"
                    );
                    self.on_event.publish(&EventFired {
                        event: event.name.clone(),
                        company: self.companies[0].name.clone(),
                        receipt,
                    });
                }
                Err(err) => warn!(event = %event.name, error = %err, "event could not be applied"),
            }
        }
    }

    /// Wake a dormant rival. Returns false if it was already active.
    pub fn enable_company(&mut self, name: &str) -> Result<bool, RuntimeError> {
        let company = self
            .companies
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| unknown("company", name))?;
        let was_disabled = company.disabled;
        company.disabled = false;
        Ok(was_disabled)
    }

    /// Hire a worker from the job market for the player.
    pub fn hire(&mut self, name: &str, salary: f32) -> Result<(), RuntimeError> {
        let idx = self
            .job_market
            .iter()
            .position(|w| w.name == name)
            .ok_or_else(|| unknown("worker", name))?;
        let worker = &mut self.job_market[idx];
        if worker.off_market_time > 0 {
            return Err(RuntimeError::OffMarket(worker.name.clone()));
        }
        let minimum = worker.min_salary();
        if salary < minimum {
            worker.recent_player_offers += 1;
            return Err(RuntimeError::SalaryTooLow {
                worker: worker.name.clone(),
                offered: salary,
                minimum,
            });
        }
        let mut worker = self.job_market.remove(idx);
        if let Err(err) = self.ledger.onboard(&mut worker) {
            self.job_market.insert(idx, worker);
            return Err(err.into());
        }
        self.companies[0].hire(worker, salary);
        Ok(())
    }

    /// Let a player worker go; they return to the job market after a while
    /// without the buffs of anything equipped.
    pub fn fire(&mut self, name: &str) -> Result<(), RuntimeError> {
        let mut worker = self.companies[0]
            .fire(name)
            .ok_or_else(|| unknown("worker", name))?;
        self.ledger.release(&mut worker);
        worker.off_market_time = FIRED_OFF_MARKET_WEEKS;
        self.job_market.push(worker);
        Ok(())
    }

    /// Start a player product from unlocked categories.
    pub fn start_product<S: AsRef<str>>(
        &mut self,
        product_types: &[S],
        levels: FeatureLevels,
    ) -> Result<ProductId, RuntimeError> {
        for t in product_types {
            let t = t.as_ref();
            if self.data.product_type(t).is_some() && !self.unlocks.product_types.contains(t) {
                return Err(locked("product type", t));
            }
        }
        let types = self.data.resolve_product_types(product_types)?;
        Ok(self.companies[0].start_product(types, levels, &self.recipes, &mut self.rng)?)
    }

    pub fn shutdown_product(&mut self, id: ProductId) -> Result<Product, RuntimeError> {
        self.companies[0]
            .shutdown_product(id)
            .ok_or_else(|| EconError::ProductNotFound(id).into())
    }

    pub fn buy_infrastructure(&mut self, purchase: Infrastructure) -> Result<f32, RuntimeError> {
        Ok(self.companies[0].buy_infrastructure(purchase, &self.economy)?)
    }

    pub fn expand_to_vertical(&mut self, name: &str) -> Result<f32, RuntimeError> {
        let vertical = self
            .data
            .vertical(name)
            .ok_or_else(|| unknown("vertical", name))?;
        if !self.unlocks.verticals.contains(name) {
            return Err(locked("vertical", name));
        }
        Ok(self.companies[0].expand_to_vertical(vertical, &self.economy)?)
    }

    /// Spend player research on a technology. Returns false when it is not
    /// yet affordable or its prerequisites are missing.
    pub fn research(&mut self, name: &str) -> Result<bool, RuntimeError> {
        let tech = self
            .data
            .technology(name)
            .ok_or_else(|| unknown("technology", name))?;
        if !self.unlocks.technologies.contains(name) {
            return Err(locked("technology", name));
        }
        Ok(self.companies[0].research_technology(tech))
    }

    pub fn buy_item(&mut self, name: &str) -> Result<(), RuntimeError> {
        let item = self.data.item(name).ok_or_else(|| unknown("item", name))?;
        if !self.unlocks.items.contains(name) {
            return Err(locked("item", name));
        }
        let mut scope =
            EffectScope::new(&mut self.economy, &mut self.unlocks, &self.events, &mut self.rng)
                .with_max_depth(self.config.max_event_depth);
        item.buy(&mut self.companies[0], &mut self.ledger, &mut scope)?;
        if let Some(receipt) = self.ledger.receipt(name) {
            wake_companies(&mut self.companies, receipt);
        }
        Ok(())
    }

    pub fn discard_item(&mut self, name: &str) -> Result<EffectReceipt, RuntimeError> {
        let item = self.data.item(name).ok_or_else(|| unknown("item", name))?;
        let mut scope =
            EffectScope::new(&mut self.economy, &mut self.unlocks, &self.events, &mut self.rng)
                .with_max_depth(self.config.max_event_depth);
        Ok(item.discard(&mut self.companies[0], &mut self.ledger, &mut scope)?)
    }

    pub fn buy_perk(&mut self, name: &str) -> Result<(), RuntimeError> {
        let mut perk = self
            .data
            .perk(name)
            .cloned()
            .ok_or_else(|| unknown("perk", name))?;
        let mut scope =
            EffectScope::new(&mut self.economy, &mut self.unlocks, &self.events, &mut self.rng)
                .with_max_depth(self.config.max_event_depth);
        perk.buy(&mut self.companies[0], &mut self.ledger, &mut scope)?;
        self.perks.insert(perk.name.clone(), perk);
        Ok(())
    }

    pub fn upgrade_perk(&mut self, name: &str) -> Result<(), RuntimeError> {
        let perk = self
            .perks
            .get_mut(name)
            .ok_or_else(|| sim_effects::EffectError::NotEquipped(name.to_string()))?;
        let mut scope =
            EffectScope::new(&mut self.economy, &mut self.unlocks, &self.events, &mut self.rng)
                .with_max_depth(self.config.max_event_depth);
        perk.upgrade(&mut self.companies[0], &mut self.ledger, &mut scope)?;
        Ok(())
    }

    pub fn complete_project(&mut self, name: &str) -> Result<EffectReceipt, RuntimeError> {
        let project = self
            .data
            .special_project(name)
            .ok_or_else(|| unknown("special project", name))?;
        if !self.unlocks.special_projects.contains(name) {
            return Err(locked("special project", name));
        }
        let mut scope =
            EffectScope::new(&mut self.economy, &mut self.unlocks, &self.events, &mut self.rng)
                .with_max_depth(self.config.max_event_depth);
        let receipt = project.complete(&mut self.companies[0], &mut scope)?;
        wake_companies(&mut self.companies, &receipt);
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const DATA: &str = r#"
product_types:
  - name: App
  - name: Gadget
    required_infrastructure: { factory: 1 }
recipes:
  - product_types: [App]
    name: App
    max_revenue: 5000
    max_longevity: 200
workers:
  - name: Ada
    base_min_salary: 40000
    productivity: 10
    creativity: 10
    charisma: 10
    cleverness: 10
  - name: Bob
    base_min_salary: 40000
    productivity: 10
events:
  - name: Windfall
    probability: 1.0
    effects:
      cash: 10
      enable_company: Rival
items:
  - name: Espresso
    cost: 100
    effects:
      worker_buffs: [{ stat: Productivity, value: 5 }]
companies:
  - name: Rival
    cash: 1000
unlocked:
  product_types: [App]
  items: [Espresso]
"#;

    fn sim() -> Simulation {
        let data = GameData::from_yaml_str(DATA).unwrap();
        let cfg = SimConfig {
            starting_cash: 100_000.0,
            ..SimConfig::default()
        };
        Simulation::new(cfg, data).unwrap()
    }

    #[test]
    fn hiring_checks_salary_and_market() {
        let mut s = sim();
        assert!(matches!(
            s.hire("Ada", 10_000.0),
            Err(RuntimeError::SalaryTooLow { .. })
        ));
        assert_eq!(s.job_market()[0].recent_player_offers, 1);
        s.hire("Ada", 40_000.0).unwrap();
        assert_eq!(s.player().workers.len(), 1);
        assert!(s.job_market().iter().all(|w| w.name != "Ada"));

        s.fire("Ada").unwrap();
        assert!(matches!(s.hire("Ada", 50_000.0), Err(RuntimeError::OffMarket(_))));
        s.run_weeks(u64::from(FIRED_OFF_MARKET_WEEKS));
        s.hire("Ada", 50_000.0).unwrap();
    }

    #[test]
    fn locked_content_is_refused() {
        let mut s = sim();
        assert!(matches!(
            s.start_product(&["Gadget"], FeatureLevels::default()),
            Err(RuntimeError::Locked { .. })
        ));
        assert!(matches!(
            s.start_product(&["Hoverboard"], FeatureLevels::default()),
            Err(RuntimeError::Unknown { .. })
        ));
        assert!(s.start_product(&["App"], FeatureLevels::default()).is_ok());
    }

    #[test]
    fn products_launch_and_earn() {
        let mut s = sim();
        let launched = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&launched);
        s.on_product_launched
            .subscribe(move |e: &ProductLaunched| sink.borrow_mut().push(e.completed.product));

        s.hire("Ada", 40_000.0).unwrap();
        let id = s.start_product(&["App"], FeatureLevels::default()).unwrap();
        s.run_weeks(8);

        assert_eq!(*launched.borrow(), vec![id]);
        assert_eq!(s.products_completed(), 1);
        let product = s.player().product(id).unwrap();
        assert!(product.is_launched());
        assert!(product.market_share() > 0.0);
        assert!(s.player().revenue_history().sum::<f32>() > 0.0);
    }

    #[test]
    fn events_apply_to_the_player_and_wake_rivals() {
        let mut s = sim();
        assert!(s.company("Rival").unwrap().disabled);
        s.unlocks.events.insert("Windfall".to_string());
        let fired = Rc::new(RefCell::new(0));
        let count = Rc::clone(&fired);
        s.on_event.subscribe(move |_: &EventFired| *count.borrow_mut() += 1);

        s.run_weeks(1);
        assert_eq!(*fired.borrow(), 1);
        assert_eq!(s.events_fired(), 1);
        assert!(!s.company("Rival").unwrap().disabled);
    }

    #[test]
    fn items_are_bought_through_the_ledger() {
        let mut s = sim();
        s.hire("Ada", 40_000.0).unwrap();
        s.buy_item("Espresso").unwrap();
        assert_eq!(s.player().workers[0].productivity.value(), 15.0);
        assert!(s.ledger().is_equipped("Espresso"));
        s.discard_item("Espresso").unwrap();
        assert_eq!(s.player().workers[0].productivity.value(), 10.0);
    }

    #[test]
    fn equipped_buffs_follow_staff_changes() {
        let mut s = sim();
        s.hire("Ada", 40_000.0).unwrap();
        s.buy_item("Espresso").unwrap();
        s.hire("Bob", 40_000.0).unwrap();
        let productivity = |s: &Simulation, name: &str| {
            s.player()
                .workers
                .iter()
                .find(|w| w.name == name)
                .map(|w| w.productivity.value())
        };
        assert_eq!(productivity(&s, "Bob"), Some(15.0));

        s.fire("Ada").unwrap();
        let ada = s.job_market().iter().find(|w| w.name == "Ada").unwrap();
        assert_eq!(ada.productivity.value(), 10.0);

        s.discard_item("Espresso").unwrap();
        assert_eq!(productivity(&s, "Bob"), Some(10.0));
        s.run_weeks(u64::from(FIRED_OFF_MARKET_WEEKS));
        s.hire("Ada", 50_000.0).unwrap();
        assert_eq!(productivity(&s, "Ada"), Some(10.0));
    }

    #[test]
    fn monthly_payroll_uses_wage_multiplier() {
        let mut s = sim();
        s.hire("Ada", 48_000.0).unwrap();
        let before = s.player().cash.value();
        s.run_weeks(4);
        assert_eq!(s.player().cash.value(), before - 4_000.0);
    }

    #[test]
    fn unknown_rival_cannot_be_enabled() {
        let mut s = sim();
        assert!(s.enable_company("Rival").unwrap());
        assert!(!s.enable_company("Rival").unwrap());
        assert!(matches!(
            s.enable_company("Ghost"),
            Err(RuntimeError::Unknown { .. })
        ));
    }
}
