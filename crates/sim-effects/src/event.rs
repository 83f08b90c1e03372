//! Random game events, optionally gated by a Rhai condition over company
//! figures.

use crate::effect::EffectSet;
use crate::EffectError;
use rand::Rng;
use rhai::{Engine, Scope};
use serde::{Deserialize, Serialize};
use sim_core::{validate_probability, UnlockSet};
use sim_econ::Company;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// An event that may fire during the weekly roll.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Chance per roll, in `[0, 1]`.
    pub probability: f32,
    /// Rhai expression that must evaluate to `true`, e.g.
    /// `cash > 50000.0 && products >= 2`.
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub effects: EffectSet,
}

/// Company figures exposed to condition scripts.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ConditionContext {
    pub cash: f64,
    pub opinion: f64,
    pub publicity: f64,
    pub hype: f64,
    pub research: f64,
    /// Launched products.
    pub products: i64,
    pub workers: i64,
    pub year: i64,
}

impl ConditionContext {
    pub fn from_company(company: &Company, year: i32) -> Self {
        Self {
            cash: f64::from(company.cash.value()),
            opinion: f64::from(company.opinion.value()),
            publicity: f64::from(company.publicity.value()),
            hype: f64::from(company.hype.value()),
            research: f64::from(company.research.value()),
            products: company.products.iter().filter(|p| p.is_launched()).count() as i64,
            workers: company.workers.len() as i64,
            year: i64::from(year),
        }
    }

    fn scope(&self) -> Scope<'static> {
        let mut scope = Scope::new();
        scope.push("cash", self.cash);
        scope.push("opinion", self.opinion);
        scope.push("publicity", self.publicity);
        scope.push("hype", self.hype);
        scope.push("research", self.research);
        scope.push("products", self.products);
        scope.push("workers", self.workers);
        scope.push("year", self.year);
        scope
    }
}

/// All known events, keyed by name, plus the script engine for their
/// conditions.
pub struct EventPool {
    events: BTreeMap<String, GameEvent>,
    engine: Engine,
}

impl fmt::Debug for EventPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventPool")
            .field("events", &self.events.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for EventPool {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPool {
    pub fn new() -> Self {
        let mut engine = Engine::new();
        engine.set_max_operations(10_000);
        Self {
            events: BTreeMap::new(),
            engine,
        }
    }

    /// Build a pool, validating every event.
    pub fn from_events(events: Vec<GameEvent>) -> Result<Self, EffectError> {
        let mut pool = Self::new();
        for e in events {
            pool.insert(e)?;
        }
        pool.check_references()?;
        Ok(pool)
    }

    /// Add an event after checking its probability, effects and condition.
    pub fn insert(&mut self, event: GameEvent) -> Result<(), EffectError> {
        validate_probability(event.probability)?;
        event.effects.validate()?;
        if let Some(cond) = &event.condition {
            self.engine
                .compile_expression(cond)
                .map_err(|e| EffectError::Condition {
                    event: event.name.clone(),
                    message: e.to_string(),
                })?;
        }
        if self.events.contains_key(&event.name) {
            return Err(EffectError::DuplicateEvent(event.name));
        }
        self.events.insert(event.name.clone(), event);
        Ok(())
    }

    /// Nested events must name events in the pool.
    pub fn check_references(&self) -> Result<(), EffectError> {
        for e in self.events.values() {
            if let Some(nested) = &e.effects.event {
                if !self.events.contains_key(&nested.name) {
                    return Err(EffectError::UnknownEvent(nested.name.clone()));
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&GameEvent> {
        self.events.get(name)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.events.keys().map(String::as_str)
    }

    /// Whether the event's condition holds. Events without one always pass.
    pub fn condition_holds(
        &self,
        event: &GameEvent,
        ctx: &ConditionContext,
    ) -> Result<bool, EffectError> {
        let Some(cond) = &event.condition else {
            return Ok(true);
        };
        let mut scope = ctx.scope();
        self.engine
            .eval_expression_with_scope::<bool>(&mut scope, cond)
            .map_err(|e| EffectError::Condition {
                event: event.name.clone(),
                message: e.to_string(),
            })
    }

    /// Roll every unlocked event once, in name order. Returns the events
    /// that fired. A condition that fails to evaluate counts as false.
    pub fn roll<R: Rng + ?Sized>(
        &self,
        unlocked: &UnlockSet,
        ctx: &ConditionContext,
        rng: &mut R,
    ) -> Vec<&GameEvent> {
        let mut fired = Vec::new();
        for name in &unlocked.events {
            let Some(event) = self.events.get(name) else {
                warn!(event = %name, "unlocked event is not defined");
                continue;
            };
            match self.condition_holds(event, ctx) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(err) => {
                    warn!(error = %err, "event condition failed");
                    continue;
                }
            }
            if rng.gen::<f32>() < event.probability {
                debug!(event = %event.name, "event fired");
                fired.push(event);
            }
        }
        fired
    }
}
