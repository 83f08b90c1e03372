#![deny(warnings)]

//! Effects for Founder: declarative bundles of stat buffs, scalar deltas,
//! economy changes and unlocks, applied to companies, workers and products
//! with exact revert.

pub mod effect;
pub mod event;
pub mod item;
pub mod ledger;

pub use effect::{
    EconomyDelta, EffectReceipt, EffectScope, EffectSet, EffectTarget, ModifierRecord,
    NestedEvent, ScalarDelta, StatOwner, DEFAULT_MAX_EVENT_DEPTH,
};
pub use event::{ConditionContext, EventPool, GameEvent};
pub use item::{Item, Perk, PerkUpgrade, SpecialProject};
pub use ledger::BuffLedger;

use sim_core::{CoreError, ValidationError};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EffectError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("unknown event: {0}")]
    UnknownEvent(String),
    #[error("duplicate event: {0}")]
    DuplicateEvent(String),
    /// A condition script failed to compile or evaluate.
    #[error("condition of {event}: {message}")]
    Condition { event: String, message: String },
    #[error("already equipped: {0}")]
    AlreadyEquipped(String),
    #[error("not equipped: {0}")]
    NotEquipped(String),
    #[error("not available: {0}")]
    NotAvailable(String),
    #[error("no further upgrade for {0}")]
    NoUpgrade(String),
    #[error("insufficient cash: need {needed:.2}, have {available:.2}")]
    InsufficientCash { needed: f32, available: f32 },
}
