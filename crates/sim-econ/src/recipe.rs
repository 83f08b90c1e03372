//! Product recipes: immutable tuning data for a combination of product
//! categories, and the book they are looked up from.

use crate::curve::RevenueCurve;
use crate::progress::ProductFeature;
use crate::EconError;
use serde::{Deserialize, Serialize};
use sim_core::ProductType;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Identifier of the fallback recipe.
pub const DEFAULT_RECIPE_ID: &str = "default";

/// Recipe key for a set of category names: sorted, deduplicated and joined
/// with dots, e.g. `"Social Network.Virtual Reality"`.
pub fn recipe_id<'a, I>(names: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut names: Vec<&str> = names.into_iter().collect();
    names.sort_unstable();
    names.dedup();
    names.join(".")
}

/// Weight and ideal value for one quality axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisTarget {
    pub weight: f32,
    pub ideal: f32,
}

impl Default for AxisTarget {
    fn default() -> Self {
        Self {
            weight: 1.0,
            ideal: 100.0,
        }
    }
}

impl AxisTarget {
    /// `min(value / ideal × weight, 1)`, never negative.
    pub fn capped_ratio(&self, value: f32) -> f32 {
        if self.ideal <= 0.0 {
            return self.weight.clamp(0.0, 1.0);
        }
        (value / self.ideal * self.weight).clamp(0.0, 1.0)
    }
}

/// How a category combination turns design, marketing and engineering into
/// revenue. Shared read-only by every product built from it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductRecipe {
    /// Recipe key; derived from `product_types` when those are given.
    #[serde(default)]
    pub id: String,
    /// Category names this recipe covers.
    #[serde(default)]
    pub product_types: Vec<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Model used to display the product.
    #[serde(default)]
    pub mesh: Option<String>,
    #[serde(default)]
    pub design: AxisTarget,
    #[serde(default)]
    pub marketing: AxisTarget,
    #[serde(default)]
    pub engineering: AxisTarget,
    #[serde(default)]
    pub curve: RevenueCurve,
    /// Peak revenue per unit of time at a perfect quality score.
    pub max_revenue: f32,
    /// Lifetime over which the curve is defined.
    pub max_longevity: f32,
    #[serde(default)]
    pub required_technologies: Vec<String>,
    /// Recipes the company must also be selling for the synergy bonus.
    #[serde(default)]
    pub synergies: Vec<String>,
    /// Pool of product names.
    #[serde(default)]
    pub names: Vec<String>,
    /// Overrides the mean difficulty of the categories.
    #[serde(default)]
    pub difficulty: Option<f32>,
}

impl ProductRecipe {
    /// The recipe used for combinations without tuning data.
    pub fn fallback() -> Self {
        Self {
            id: DEFAULT_RECIPE_ID.to_string(),
            product_types: Vec::new(),
            name: "Product".to_string(),
            description: String::new(),
            mesh: None,
            design: AxisTarget::default(),
            marketing: AxisTarget::default(),
            engineering: AxisTarget::default(),
            curve: RevenueCurve::default(),
            max_revenue: 1000.0,
            max_longevity: 100.0,
            required_technologies: Vec::new(),
            synergies: Vec::new(),
            names: Vec::new(),
            difficulty: None,
        }
    }

    pub fn axis(&self, feature: ProductFeature) -> AxisTarget {
        match feature {
            ProductFeature::Design => self.design,
            ProductFeature::Marketing => self.marketing,
            ProductFeature::Engineering => self.engineering,
        }
    }

    pub fn total_weight(&self) -> f32 {
        self.design.weight + self.marketing.weight + self.engineering.weight
    }

    /// Quality score in `[0, 1]` for the given axis values.
    pub fn quality_score(&self, design: f32, marketing: f32, engineering: f32) -> f32 {
        let total = self.total_weight();
        if total <= 0.0 {
            return 0.0;
        }
        let sum = self.design.capped_ratio(design)
            + self.marketing.capped_ratio(marketing)
            + self.engineering.capped_ratio(engineering);
        (sum / total).clamp(0.0, 1.0)
    }

    /// Explicit difficulty, or the mean over `types` (1.0 when empty).
    pub fn difficulty_for(&self, types: &[ProductType]) -> f32 {
        if let Some(d) = self.difficulty {
            return d;
        }
        if types.is_empty() {
            return 1.0;
        }
        types.iter().map(|t| t.difficulty).sum::<f32>() / types.len() as f32
    }

    fn validate(&self) -> Result<(), EconError> {
        let invalid = |reason: &'static str| EconError::InvalidRecipe {
            id: self.id.clone(),
            reason,
        };
        if self.id.trim().is_empty() {
            return Err(invalid("empty id"));
        }
        if !(self.max_revenue.is_finite() && self.max_revenue >= 0.0) {
            return Err(invalid("max_revenue must be >= 0"));
        }
        if !(self.max_longevity.is_finite() && self.max_longevity > 0.0) {
            return Err(invalid("max_longevity must be > 0"));
        }
        for axis in [self.design, self.marketing, self.engineering] {
            if !(axis.weight.is_finite() && axis.weight >= 0.0 && axis.ideal.is_finite()) {
                return Err(invalid("axis weight must be >= 0"));
            }
        }
        if !self.curve.is_well_formed() {
            return Err(invalid("malformed revenue curve"));
        }
        Ok(())
    }
}

/// All recipes, keyed by id, plus the fallback.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecipeBook {
    recipes: BTreeMap<String, Arc<ProductRecipe>>,
    default: Arc<ProductRecipe>,
}

impl RecipeBook {
    /// Build a book from loaded recipes. One of them must be the default
    /// recipe; synergies must reference recipes in the book.
    pub fn new(recipes: Vec<ProductRecipe>) -> Result<Self, EconError> {
        let mut map = BTreeMap::new();
        for mut r in recipes {
            if !r.product_types.is_empty() {
                r.id = recipe_id(r.product_types.iter().map(String::as_str));
            }
            r.validate()?;
            let id = r.id.clone();
            if map.insert(id.clone(), Arc::new(r)).is_some() {
                return Err(EconError::DuplicateRecipe(id));
            }
        }
        for r in map.values() {
            for s in &r.synergies {
                if !map.contains_key(s) {
                    return Err(EconError::RecipeNotFound(s.clone()));
                }
            }
        }
        let default = map
            .get(DEFAULT_RECIPE_ID)
            .cloned()
            .ok_or(EconError::MissingDefaultRecipe)?;
        Ok(Self {
            recipes: map,
            default,
        })
    }

    /// Like [`RecipeBook::new`] but supplies [`ProductRecipe::fallback`]
    /// when no default recipe was given.
    pub fn with_fallback(mut recipes: Vec<ProductRecipe>) -> Result<Self, EconError> {
        let has_default = recipes
            .iter()
            .any(|r| r.product_types.is_empty() && r.id == DEFAULT_RECIPE_ID);
        if !has_default {
            recipes.push(ProductRecipe::fallback());
        }
        Self::new(recipes)
    }

    pub fn get(&self, id: &str) -> Result<Arc<ProductRecipe>, EconError> {
        self.recipes
            .get(id)
            .cloned()
            .ok_or_else(|| EconError::RecipeNotFound(id.to_string()))
    }

    /// Recipe for a category combination, falling back to the default.
    pub fn for_types(&self, types: &[ProductType]) -> Arc<ProductRecipe> {
        let id = recipe_id(types.iter().map(|t| t.name.as_str()));
        match self.recipes.get(&id) {
            Some(r) => Arc::clone(r),
            None => {
                debug!(recipe = %id, "no recipe for combination, using default");
                Arc::clone(&self.default)
            }
        }
    }

    pub fn default_recipe(&self) -> Arc<ProductRecipe> {
        Arc::clone(&self.default)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ProductRecipe>> {
        self.recipes.values()
    }
}

impl Default for RecipeBook {
    fn default() -> Self {
        let default = Arc::new(ProductRecipe::fallback());
        let mut recipes = BTreeMap::new();
        recipes.insert(DEFAULT_RECIPE_ID.to_string(), Arc::clone(&default));
        Self { recipes, default }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(types: &[&str]) -> ProductRecipe {
        ProductRecipe {
            product_types: types.iter().map(|s| s.to_string()).collect(),
            name: types.join(" + "),
            ..ProductRecipe::fallback()
        }
    }

    #[test]
    fn ids_are_sorted_and_dot_joined() {
        assert_eq!(
            recipe_id(["Virtual Reality", "Social Network"]),
            "Social Network.Virtual Reality"
        );
        assert_eq!(recipe_id(["A", "A"]), "A");
    }

    #[test]
    fn lookup_falls_back_to_default() {
        let book = RecipeBook::with_fallback(vec![recipe(&["Social Network"])]).unwrap();
        let found = book.for_types(&[ProductType::new("Social Network")]);
        assert_eq!(found.id, "Social Network");
        let missing = book.for_types(&[ProductType::new("Toaster")]);
        assert_eq!(missing.id, DEFAULT_RECIPE_ID);
    }

    #[test]
    fn missing_default_is_a_typed_failure() {
        let err = RecipeBook::new(vec![recipe(&["A"])]).unwrap_err();
        assert_eq!(err, EconError::MissingDefaultRecipe);
        assert!(matches!(
            RecipeBook::default().get("nope"),
            Err(EconError::RecipeNotFound(_))
        ));
    }

    #[test]
    fn unknown_synergy_is_rejected() {
        let mut r = recipe(&["A"]);
        r.synergies = vec!["B".to_string()];
        assert_eq!(
            RecipeBook::with_fallback(vec![r]).unwrap_err(),
            EconError::RecipeNotFound("B".to_string())
        );
    }

    #[test]
    fn duplicate_recipes_are_rejected() {
        let err = RecipeBook::with_fallback(vec![recipe(&["B", "A"]), recipe(&["A", "B"])])
            .unwrap_err();
        assert_eq!(err, EconError::DuplicateRecipe("A.B".to_string()));
    }

    #[test]
    fn quality_score_caps_each_axis() {
        let r = ProductRecipe::fallback();
        assert_eq!(r.quality_score(0.0, 0.0, 0.0), 0.0);
        assert_eq!(r.quality_score(100.0, 100.0, 100.0), 1.0);
        assert_eq!(r.quality_score(1000.0, 0.0, 0.0), 1.0 / 3.0);
        assert_eq!(r.quality_score(50.0, 50.0, 50.0), 0.5);
    }

    #[test]
    fn difficulty_defaults_to_category_mean() {
        let mut a = ProductType::new("A");
        a.difficulty = 1.0;
        let mut b = ProductType::new("B");
        b.difficulty = 2.0;
        let r = ProductRecipe::fallback();
        assert_eq!(r.difficulty_for(&[a.clone(), b.clone()]), 1.5);
        let fixed = ProductRecipe {
            difficulty: Some(3.0),
            ..ProductRecipe::fallback()
        };
        assert_eq!(fixed.difficulty_for(&[a, b]), 3.0);
    }
}
