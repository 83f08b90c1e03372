#![deny(warnings)]

//! Product economics for Founder.
//!
//! This crate provides:
//! - Recipes and revenue curves: immutable tuning data per category mix
//! - The product lifecycle (development, launch, revenue, retirement)
//! - Companies and their periodic cycles
//! - Cross-company market share allocation

pub mod company;
pub mod curve;
pub mod economy;
pub mod market;
pub mod product;
pub mod progress;
pub mod recipe;

pub use company::{Company, GrantApplication, DEFAULT_HISTORY_LEN};
pub use curve::RevenueCurve;
pub use economy::{Economy, DEFAULT_REVENUE_JITTER};
pub use market::{calculate_market_shares, market_score};
pub use product::{
    AppliedGrant, CompanyStanding, GrantId, Product, ProductCompleted, ProductEffectGrant,
    ProductId, ProductState, FALLBACK_PRODUCT_NAME,
};
pub use progress::{
    fibonacci, progress_required, total_progress_required, FeatureLevels, ProductFeature,
    BASE_PROGRESS,
};
pub use recipe::{recipe_id, AxisTarget, ProductRecipe, RecipeBook, DEFAULT_RECIPE_ID};

use sim_core::{CoreError, Infrastructure};
use thiserror::Error;

/// Errors produced by recipes, products and company operations.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    #[error("recipe not found: {0}")]
    RecipeNotFound(String),
    /// Every recipe book needs a fallback.
    #[error("no default recipe defined")]
    MissingDefaultRecipe,
    #[error("duplicate recipe: {0}")]
    DuplicateRecipe(String),
    #[error("invalid recipe {id}: {reason}")]
    InvalidRecipe { id: String, reason: &'static str },
    #[error("unknown product feature: {0}")]
    UnknownFeature(String),
    /// Products combine at least one category.
    #[error("product needs at least one product type")]
    NoProductTypes,
    #[error("vertical not unlocked: {0}")]
    MissingVertical(String),
    #[error("not enough free infrastructure: need {needed}, have {free}")]
    InsufficientInfrastructure {
        needed: Infrastructure,
        free: Infrastructure,
    },
    #[error("infrastructure capacity exceeded buying {0}")]
    ExceedsCapacity(Infrastructure),
    #[error("insufficient cash: need {needed:.2}, have {available:.2}")]
    InsufficientCash { needed: f32, available: f32 },
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),
    #[error(transparent)]
    Core(#[from] CoreError),
}
