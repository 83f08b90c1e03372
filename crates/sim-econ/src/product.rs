//! Product lifecycle: development, launch, revenue over a lifetime, and
//! retirement.

use crate::economy::Economy;
use crate::recipe::ProductRecipe;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sim_core::{
    CoreError, HasStats, Infrastructure, Market, ModifierId, ProductEffect, ProductType, Stat,
};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Display name given to products shut down before they ever launched.
pub const FALLBACK_PRODUCT_NAME: &str = "Unreleased Product";
/// Revenue factor when the company lacks a technology the recipe requires.
pub const MISSING_TECHNOLOGY_PENALTY: f32 = 0.1;
/// Revenue factor when every synergy recipe is on sale at the company.
pub const SYNERGY_BONUS: f32 = 1.5;

/// Company-local product handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state. Transitions only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductState {
    /// Accruing progress toward launch.
    Development,
    /// On sale and earning along its revenue curve.
    Launched,
    /// Shut down; earns nothing and frees its facilities.
    Retired,
}

/// Handle of a product effect stored on a company.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GrantId(pub u64);

/// A product effect the company holds; applied to matching products now
/// and to matching products when they launch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductEffectGrant {
    pub id: GrantId,
    pub effect: ProductEffect,
}

/// A grant's modifier as it lives on one product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppliedGrant {
    pub grant: GrantId,
    pub stat: String,
    pub modifier: ModifierId,
}

/// Notification produced the first time a product launches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductCompleted {
    pub product: ProductId,
    pub name: String,
    pub recipe: String,
    pub score: f32,
}

/// The parts of a company a product reads while developing and selling.
///
/// Built from disjoint company fields so products can be iterated mutably
/// alongside it.
#[derive(Clone, Copy, Debug)]
pub struct CompanyStanding<'a> {
    pub opinion: f32,
    pub technologies: &'a BTreeSet<String>,
    pub markets: &'a BTreeSet<Market>,
    pub product_effects: &'a [ProductEffectGrant],
    /// Active products per recipe id.
    pub active_recipes: &'a BTreeMap<String, usize>,
}

/// A product owned by one company.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub product_types: Vec<ProductType>,
    pub design: Stat,
    pub marketing: Stat,
    pub engineering: Stat,
    pub progress: f32,
    pub required_progress: f32,
    state: ProductState,
    /// Disabled products neither develop nor earn.
    pub disabled: bool,
    pub time_since_launch: f32,
    pub revenue_earned: f32,
    pub last_revenue: f32,
    pub(crate) market_score: f32,
    pub(crate) market_share: f32,
    pub recipe: Arc<ProductRecipe>,
    score: f32,
    max_revenue: f32,
    longevity: f32,
    notified: bool,
    applied_grants: Vec<AppliedGrant>,
}

impl Product {
    pub const STAT_NAMES: [&'static str; 3] = ["Design", "Marketing", "Engineering"];

    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        product_types: Vec<ProductType>,
        recipe: Arc<ProductRecipe>,
        required_progress: f32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            product_types,
            design: Stat::new("Design", 0.0),
            marketing: Stat::new("Marketing", 0.0),
            engineering: Stat::new("Engineering", 0.0),
            progress: 0.0,
            required_progress: required_progress.max(1.0),
            state: ProductState::Development,
            disabled: false,
            time_since_launch: 0.0,
            revenue_earned: 0.0,
            last_revenue: 0.0,
            market_score: 0.0,
            market_share: 0.0,
            recipe,
            score: 0.0,
            max_revenue: 0.0,
            longevity: 0.0,
            notified: false,
            applied_grants: Vec::new(),
        }
    }

    pub fn is_known_stat(name: &str) -> bool {
        Self::STAT_NAMES.contains(&name)
    }

    pub fn state(&self) -> ProductState {
        self.state
    }

    pub fn is_developing(&self) -> bool {
        self.state == ProductState::Development
    }

    pub fn is_launched(&self) -> bool {
        self.state == ProductState::Launched
    }

    pub fn is_retired(&self) -> bool {
        self.state == ProductState::Retired
    }

    /// Launched and not disabled: competes for market share and earns.
    pub fn is_active(&self) -> bool {
        self.is_launched() && !self.disabled
    }

    pub fn recipe_id(&self) -> &str {
        &self.recipe.id
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn max_revenue(&self) -> f32 {
        self.max_revenue
    }

    pub fn longevity(&self) -> f32 {
        self.longevity
    }

    pub fn market_score(&self) -> f32 {
        self.market_score
    }

    pub fn market_share(&self) -> f32 {
        self.market_share
    }

    /// Grant modifiers currently on this product.
    pub fn applied_grants(&self) -> &[AppliedGrant] {
        &self.applied_grants
    }

    /// Fraction of required progress made so far, in `[0, 1]`.
    pub fn completion(&self) -> f32 {
        (self.progress / self.required_progress).clamp(0.0, 1.0)
    }

    pub fn points(&self) -> u32 {
        self.product_types.iter().map(|t| t.points).sum()
    }

    pub fn required_infrastructure(&self) -> Infrastructure {
        self.product_types
            .iter()
            .map(|t| &t.required_infrastructure)
            .sum()
    }

    pub fn required_verticals(&self) -> Vec<String> {
        let set: BTreeSet<&String> = self
            .product_types
            .iter()
            .flat_map(|t| t.required_verticals.iter())
            .collect();
        set.into_iter().cloned().collect()
    }

    pub fn difficulty(&self) -> f32 {
        self.recipe.difficulty_for(&self.product_types)
    }

    /// Grow the quality axes by worker contributions while in development.
    pub fn accrue_features(&mut self, design: f32, marketing: f32, engineering: f32) {
        if !self.is_developing() || self.disabled {
            return;
        }
        self.design.base_value += design;
        self.marketing.base_value += marketing;
        self.engineering.base_value += engineering;
    }

    /// Add development progress. Launches and returns true once the
    /// required progress is reached; earlier calls return false.
    pub fn develop(&mut self, progress: f32, standing: &CompanyStanding<'_>) -> bool {
        self.develop_and_launch(progress, standing).0
    }

    /// Like [`Product::develop`] but also hands back the completion
    /// notification produced by the launch.
    pub fn develop_and_launch(
        &mut self,
        progress: f32,
        standing: &CompanyStanding<'_>,
    ) -> (bool, Option<ProductCompleted>) {
        if !self.is_developing() || self.disabled {
            return (false, None);
        }
        self.progress += progress;
        if self.progress < self.required_progress {
            return (false, None);
        }
        for grant in standing.product_effects {
            if let Err(err) = self.receive_grant(grant, standing.markets) {
                debug!(product = %self.id, error = %err, "product effect not applicable at launch");
            }
        }
        (true, self.launch())
    }

    /// Compute the quality score and revenue parameters and mark the
    /// product launched. Only the first launch yields a notification.
    pub fn launch(&mut self) -> Option<ProductCompleted> {
        if self.is_retired() {
            return None;
        }
        self.score = self.recipe.quality_score(
            self.design.value(),
            self.marketing.value(),
            self.engineering.value(),
        );
        self.max_revenue = self.recipe.max_revenue * self.score;
        self.longevity = self.recipe.max_longevity;
        self.state = ProductState::Launched;
        if self.notified {
            return None;
        }
        self.notified = true;
        info!(
            product = %self.id,
            name = %self.name,
            recipe = %self.recipe.id,
            score = self.score,
            "product launched"
        );
        Some(ProductCompleted {
            product: self.id,
            name: self.name.clone(),
            recipe: self.recipe.id.clone(),
            score: self.score,
        })
    }

    /// Revenue earned over `elapsed` time, accumulated into
    /// `revenue_earned`. Calling twice for the same interval counts twice.
    pub fn revenue<R: Rng + ?Sized>(
        &mut self,
        elapsed: f32,
        standing: &CompanyStanding<'_>,
        economy: &Economy,
        rng: &mut R,
    ) -> f32 {
        if !self.is_launched() {
            return 0.0;
        }
        if self.disabled {
            self.last_revenue = 0.0;
            return 0.0;
        }
        self.time_since_launch += elapsed;
        if self.longevity <= 0.0 {
            self.last_revenue = 0.0;
            return 0.0;
        }
        let t = self.time_since_launch / self.longevity;
        if t > 1.0 {
            self.last_revenue = 0.0;
            return 0.0;
        }

        let mut revenue = self.recipe.curve.evaluate(t)
            * self.max_revenue
            * economy.jitter(rng)
            * economy.demand_multiplier()
            * (1.0 + standing.opinion / 100.0)
            * self.market_share;
        if self.missing_technology(standing.technologies) {
            revenue *= MISSING_TECHNOLOGY_PENALTY;
        }
        if self.has_synergy(standing.active_recipes) {
            revenue *= SYNERGY_BONUS;
        }
        let revenue = revenue.max(0.0);
        self.revenue_earned += revenue;
        self.last_revenue = revenue;
        revenue
    }

    fn missing_technology(&self, technologies: &BTreeSet<String>) -> bool {
        self.recipe
            .required_technologies
            .iter()
            .any(|t| !technologies.contains(t))
    }

    /// Every synergy recipe is represented among the company's other
    /// active products.
    fn has_synergy(&self, active_recipes: &BTreeMap<String, usize>) -> bool {
        if self.recipe.synergies.is_empty() {
            return false;
        }
        let own = usize::from(self.is_active());
        self.recipe.synergies.iter().all(|s| {
            let count = active_recipes.get(s).copied().unwrap_or(0);
            let others = if *s == self.recipe.id {
                count.saturating_sub(own)
            } else {
                count
            };
            others > 0
        })
    }

    /// Retire the product. A product that never launched loses its name.
    pub fn shutdown(&mut self) {
        if self.is_retired() {
            return;
        }
        if !self.notified {
            self.name = FALLBACK_PRODUCT_NAME.to_string();
        }
        self.state = ProductState::Retired;
        self.market_share = 0.0;
        debug!(product = %self.id, name = %self.name, "product shut down");
    }

    fn matches(&self, effect: &ProductEffect, markets: &BTreeSet<Market>) -> bool {
        let types: Vec<&str> = self.product_types.iter().map(|t| t.name.as_str()).collect();
        let verticals = self.required_verticals();
        let verticals: Vec<&str> = verticals.iter().map(String::as_str).collect();
        effect.matches(&types, &verticals, markets)
    }

    /// Apply a company product effect if it matches and is not already
    /// on this product. Returns the new modifier, if any.
    pub fn receive_grant(
        &mut self,
        grant: &ProductEffectGrant,
        markets: &BTreeSet<Market>,
    ) -> Result<Option<ModifierId>, CoreError> {
        if self.is_retired()
            || self.applied_grants.iter().any(|a| a.grant == grant.id)
            || !self.matches(&grant.effect, markets)
        {
            return Ok(None);
        }
        let modifier = self.apply_buff(&grant.effect.buff)?;
        self.applied_grants.push(AppliedGrant {
            grant: grant.id,
            stat: grant.effect.buff.stat.clone(),
            modifier,
        });
        Ok(Some(modifier))
    }

    /// Remove every modifier a grant placed on this product.
    pub fn revoke_grant(&mut self, grant: GrantId) -> usize {
        let (revoked, kept): (Vec<_>, Vec<_>) = self
            .applied_grants
            .drain(..)
            .partition(|a| a.grant == grant);
        self.applied_grants = kept;
        for a in &revoked {
            if let Some(stat) = self.stat_mut(&a.stat) {
                stat.remove_modifier(a.modifier);
            }
        }
        revoked.len()
    }
}

impl HasStats for Product {
    fn stat(&self, name: &str) -> Option<&Stat> {
        match name {
            "Design" => Some(&self.design),
            "Marketing" => Some(&self.marketing),
            "Engineering" => Some(&self.engineering),
            _ => None,
        }
    }

    fn stat_mut(&mut self, name: &str) -> Option<&mut Stat> {
        match name {
            "Design" => Some(&mut self.design),
            "Marketing" => Some(&mut self.marketing),
            "Engineering" => Some(&mut self.engineering),
            _ => None,
        }
    }

    fn stats_mut(&mut self) -> Vec<&mut Stat> {
        vec![&mut self.design, &mut self.marketing, &mut self.engineering]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::RevenueCurve;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use sim_core::{InfrastructureType, StatBuff};

    struct Fixture {
        opinion: f32,
        technologies: BTreeSet<String>,
        markets: BTreeSet<Market>,
        grants: Vec<ProductEffectGrant>,
        active: BTreeMap<String, usize>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                opinion: 0.0,
                technologies: BTreeSet::new(),
                markets: [Market::NorthAmerica].into_iter().collect(),
                grants: Vec::new(),
                active: BTreeMap::new(),
            }
        }

        fn standing(&self) -> CompanyStanding<'_> {
            CompanyStanding {
                opinion: self.opinion,
                technologies: &self.technologies,
                markets: &self.markets,
                product_effects: &self.grants,
                active_recipes: &self.active,
            }
        }
    }

    fn flat_recipe() -> ProductRecipe {
        ProductRecipe {
            id: "Gadget".to_string(),
            curve: RevenueCurve::Sampled {
                keys: vec![(0.0, 1.0), (1.0, 1.0)],
            },
            max_revenue: 1000.0,
            max_longevity: 10.0,
            ..ProductRecipe::fallback()
        }
    }

    fn product(required: f32) -> Product {
        Product::new(
            ProductId(1),
            "Gizmo",
            vec![ProductType::new("Gadget")],
            Arc::new(flat_recipe()),
            required,
        )
    }

    fn no_jitter() -> Economy {
        Economy {
            revenue_jitter: 0.0,
            ..Economy::default()
        }
    }

    fn launched() -> Product {
        let mut p = product(1.0);
        p.accrue_features(100.0, 100.0, 100.0);
        p.launch();
        p.market_share = 1.0;
        p
    }

    #[test]
    fn develop_launches_exactly_at_required_progress() {
        let fx = Fixture::new();
        let mut p = product(100.0);
        let (done, note) = p.develop_and_launch(99.0, &fx.standing());
        assert!(!done);
        assert!(note.is_none());
        assert_eq!(p.state(), ProductState::Development);

        let (done, note) = p.develop_and_launch(1.0, &fx.standing());
        assert!(done);
        assert_eq!(p.state(), ProductState::Launched);
        assert_eq!(note.map(|n| n.product), Some(ProductId(1)));

        // Further development is a no-op; re-launch is silent.
        assert!(!p.develop(10.0, &fx.standing()));
        assert!(p.launch().is_none());
    }

    #[test]
    fn launch_scores_capped_axes() {
        let mut p = product(1.0);
        p.accrue_features(200.0, 50.0, 0.0);
        p.launch();
        assert_eq!(p.score(), 0.5);
        assert_eq!(p.max_revenue(), 500.0);
        assert_eq!(p.longevity(), 10.0);
    }

    #[test]
    fn retired_products_do_not_relaunch() {
        let mut p = product(1.0);
        p.shutdown();
        assert_eq!(p.name, FALLBACK_PRODUCT_NAME);
        assert!(p.launch().is_none());
        assert_eq!(p.state(), ProductState::Retired);
    }

    #[test]
    fn shutdown_keeps_name_after_launch() {
        let mut p = launched();
        p.shutdown();
        assert_eq!(p.name, "Gizmo");
        assert!(p.is_retired());
    }

    #[test]
    fn revenue_follows_curve_and_share() {
        let fx = Fixture::new();
        let mut p = launched();
        p.market_share = 0.5;
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let r = p.revenue(1.0, &fx.standing(), &no_jitter(), &mut rng);
        assert_eq!(r, 500.0);
        assert_eq!(p.last_revenue, 500.0);
        p.revenue(1.0, &fx.standing(), &no_jitter(), &mut rng);
        assert_eq!(p.revenue_earned, 1000.0);
    }

    #[test]
    fn revenue_past_lifetime_is_zero() {
        let fx = Fixture::new();
        let mut p = launched();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert!(p.revenue(5.0, &fx.standing(), &no_jitter(), &mut rng) > 0.0);
        assert_eq!(p.revenue(6.0, &fx.standing(), &no_jitter(), &mut rng), 0.0);
        assert_eq!(p.last_revenue, 0.0);
        assert_eq!(p.state(), ProductState::Launched);
    }

    #[test]
    fn developing_products_earn_nothing() {
        let fx = Fixture::new();
        let mut p = product(10.0);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(p.revenue(1.0, &fx.standing(), &no_jitter(), &mut rng), 0.0);
        assert_eq!(p.time_since_launch, 0.0);
    }

    #[test]
    fn disabled_products_do_not_age() {
        let fx = Fixture::new();
        let mut p = launched();
        p.disabled = true;
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(p.revenue(3.0, &fx.standing(), &no_jitter(), &mut rng), 0.0);
        assert_eq!(p.time_since_launch, 0.0);
        assert_eq!(p.revenue_earned, 0.0);

        p.disabled = false;
        assert!(p.revenue(1.0, &fx.standing(), &no_jitter(), &mut rng) > 0.0);
        assert_eq!(p.time_since_launch, 1.0);
    }

    #[test]
    fn missing_technology_and_synergy_adjust_revenue() {
        let mut fx = Fixture::new();
        let mut recipe = flat_recipe();
        recipe.required_technologies = vec!["AI".to_string()];
        recipe.synergies = vec!["Other".to_string()];
        let mut p = launched();
        p.recipe = Arc::new(recipe);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let r = p.revenue(1.0, &fx.standing(), &no_jitter(), &mut rng);
        assert!((r - 100.0).abs() < 1e-3);

        fx.technologies.insert("AI".to_string());
        fx.active.insert("Other".to_string(), 1);
        let r = p.revenue(1.0, &fx.standing(), &no_jitter(), &mut rng);
        assert_eq!(r, 1500.0);
    }

    #[test]
    fn opinion_scales_revenue() {
        let mut fx = Fixture::new();
        fx.opinion = 50.0;
        let mut p = launched();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(
            p.revenue(1.0, &fx.standing(), &no_jitter(), &mut rng),
            1500.0
        );
    }

    #[test]
    fn grants_apply_at_launch_and_revoke_exactly() {
        let mut fx = Fixture::new();
        fx.grants.push(ProductEffectGrant {
            id: GrantId(3),
            effect: ProductEffect::new(StatBuff::add("Design", 100.0)),
        });
        let mut p = product(1.0);
        assert!(p.develop(1.0, &fx.standing()));
        assert_eq!(p.design.value(), 100.0);
        assert_eq!(p.applied_grants().len(), 1);
        // Applying the same grant twice does nothing.
        assert_eq!(p.receive_grant(&fx.grants[0], &fx.markets).unwrap(), None);
        assert_eq!(p.revoke_grant(GrantId(3)), 1);
        assert_eq!(p.design.value(), 0.0);
    }

    #[test]
    fn derived_requirements_combine_categories() {
        let mut a = ProductType::new("A");
        a.points = 2;
        a.required_infrastructure = Infrastructure::for_type(InfrastructureType::Studio);
        a.required_verticals = vec!["Information".to_string()];
        let mut b = ProductType::new("B");
        b.points = 3;
        b.required_infrastructure = Infrastructure::for_type(InfrastructureType::Studio);
        b.required_verticals = vec!["Information".to_string(), "Hardware".to_string()];
        let p = Product::new(
            ProductId(9),
            "X",
            vec![a, b],
            Arc::new(ProductRecipe::fallback()),
            10.0,
        );
        assert_eq!(p.points(), 5);
        assert_eq!(p.required_infrastructure().studio, 2);
        assert_eq!(p.required_verticals(), vec!["Hardware", "Information"]);
    }
}
