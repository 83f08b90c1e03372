//! Game content loaded from YAML: catalog, recipes, workers, events,
//! store items, perks, special projects and rival companies.

use crate::RuntimeError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sim_core::{
    validate_catalog, validate_worker, Infrastructure, Market, ProductType, Technology, UnlockSet,
    ValidationError, Vertical, Worker, DEFAULT_MIN_SALARY,
};
use sim_econ::{Company, FeatureLevels, ProductRecipe, RecipeBook};
use sim_effects::{EffectSet, EventPool, GameEvent, Item, Perk, SpecialProject};
use std::collections::BTreeSet;
use std::path::Path;

fn default_min_salary() -> f32 {
    DEFAULT_MIN_SALARY
}

fn default_true() -> bool {
    true
}

/// A worker as written in data files, with plain skill values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkerTemplate {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default = "default_min_salary")]
    pub base_min_salary: f32,
    #[serde(default)]
    pub robot: bool,
    #[serde(default)]
    pub happiness: f32,
    #[serde(default)]
    pub productivity: f32,
    #[serde(default)]
    pub charisma: f32,
    #[serde(default)]
    pub creativity: f32,
    #[serde(default)]
    pub cleverness: f32,
}

impl WorkerTemplate {
    pub fn to_worker(&self) -> Worker {
        let mut w = Worker::new(self.name.clone());
        w.title = self.title.clone();
        w.bio = self.bio.clone();
        w.base_min_salary = self.base_min_salary;
        w.robot = self.robot;
        w.happiness.base_value = self.happiness;
        w.productivity.base_value = self.productivity;
        w.charisma.base_value = self.charisma;
        w.creativity.base_value = self.creativity;
        w.cleverness.base_value = self.cleverness;
        w
    }
}

/// A product a rival company is developing when the game starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StartingProduct {
    pub product_types: Vec<String>,
    #[serde(default)]
    pub levels: FeatureLevels,
}

/// A rival company. Rivals start dormant unless stated otherwise and are
/// woken up by effects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompanyTemplate {
    pub name: String,
    #[serde(default)]
    pub cash: f32,
    #[serde(default = "default_true")]
    pub disabled: bool,
    /// Empty keeps the default home market.
    #[serde(default)]
    pub markets: Vec<Market>,
    #[serde(default)]
    pub verticals: Vec<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    /// Facilities owned at the start.
    #[serde(default)]
    pub infrastructure: Infrastructure,
    /// Hired at their minimum salary.
    #[serde(default)]
    pub workers: Vec<WorkerTemplate>,
    #[serde(default)]
    pub products: Vec<StartingProduct>,
}

impl CompanyTemplate {
    pub fn build<R: Rng + ?Sized>(
        &self,
        data: &GameData,
        recipes: &RecipeBook,
        history_len: usize,
        rng: &mut R,
    ) -> Result<Company, RuntimeError> {
        let mut company = Company::new(self.name.clone(), self.cash).with_history_len(history_len);
        company.disabled = self.disabled;
        if !self.markets.is_empty() {
            company.markets = self.markets.iter().copied().collect();
        }
        company.verticals.extend(self.verticals.iter().cloned());
        company.technologies.extend(self.technologies.iter().cloned());
        company.infrastructure = self.infrastructure;
        for t in &self.workers {
            let worker = t.to_worker();
            let salary = worker.min_salary();
            company.hire(worker, salary);
        }
        for p in &self.products {
            let types = data.resolve_product_types(&p.product_types)?;
            company.start_product(types, p.levels, recipes, &mut *rng)?;
        }
        Ok(company)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameData {
    pub product_types: Vec<ProductType>,
    pub verticals: Vec<Vertical>,
    pub technologies: Vec<Technology>,
    pub recipes: Vec<ProductRecipe>,
    /// Job market at the start of the game.
    pub workers: Vec<WorkerTemplate>,
    pub events: Vec<GameEvent>,
    pub items: Vec<Item>,
    pub perks: Vec<Perk>,
    pub special_projects: Vec<SpecialProject>,
    /// Rival companies.
    pub companies: Vec<CompanyTemplate>,
    /// Content available from the start.
    pub unlocked: UnlockSet,
}

fn unique<'a>(
    names: impl IntoIterator<Item = &'a str>,
) -> Result<BTreeSet<&'a str>, ValidationError> {
    let mut seen = BTreeSet::new();
    for n in names {
        if n.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if !seen.insert(n) {
            return Err(ValidationError::Duplicate(n.to_string()));
        }
    }
    Ok(seen)
}

fn require_known<'a>(
    kind: &'static str,
    names: impl IntoIterator<Item = &'a String>,
    known: impl Fn(&str) -> bool,
) -> Result<(), RuntimeError> {
    for n in names {
        if !known(n) {
            return Err(RuntimeError::Unknown {
                kind,
                name: n.clone(),
            });
        }
    }
    Ok(())
}

impl GameData {
    /// Parse and validate.
    pub fn from_yaml_str(text: &str) -> Result<Self, RuntimeError> {
        let data: Self = serde_yaml::from_str(text)?;
        data.validate()?;
        Ok(data)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RuntimeError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn recipe_book(&self) -> Result<RecipeBook, RuntimeError> {
        Ok(RecipeBook::with_fallback(self.recipes.clone())?)
    }

    pub fn event_pool(&self) -> Result<EventPool, RuntimeError> {
        Ok(EventPool::from_events(self.events.clone())?)
    }

    pub fn product_type(&self, name: &str) -> Option<&ProductType> {
        self.product_types.iter().find(|t| t.name == name)
    }

    pub fn vertical(&self, name: &str) -> Option<&Vertical> {
        self.verticals.iter().find(|v| v.name == name)
    }

    pub fn technology(&self, name: &str) -> Option<&Technology> {
        self.technologies.iter().find(|t| t.name == name)
    }

    pub fn worker(&self, name: &str) -> Option<&WorkerTemplate> {
        self.workers.iter().find(|w| w.name == name)
    }

    pub fn item(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.name == name)
    }

    pub fn perk(&self, name: &str) -> Option<&Perk> {
        self.perks.iter().find(|p| p.name == name)
    }

    pub fn special_project(&self, name: &str) -> Option<&SpecialProject> {
        self.special_projects.iter().find(|p| p.name == name)
    }

    /// Look up categories by name, in the order given.
    pub fn resolve_product_types<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<Vec<ProductType>, RuntimeError> {
        names
            .iter()
            .map(|n| {
                let n = n.as_ref();
                self.product_type(n)
                    .cloned()
                    .ok_or_else(|| RuntimeError::Unknown {
                        kind: "product type",
                        name: n.to_string(),
                    })
            })
            .collect()
    }

    /// Check every record and every cross-reference between records.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        validate_catalog(&self.product_types, &self.verticals, &self.technologies)?;
        let recipes = self.recipe_book()?;
        self.event_pool()?;

        unique(self.workers.iter().map(|w| w.name.as_str()))?;
        for w in &self.workers {
            validate_worker(&w.to_worker())?;
        }

        unique(self.items.iter().map(|i| i.name.as_str()))?;
        unique(self.perks.iter().map(|p| p.name.as_str()))?;
        unique(self.special_projects.iter().map(|p| p.name.as_str()))?;
        let company_names = unique(self.companies.iter().map(|c| c.name.as_str()))?;

        let mut effect_sets: Vec<&EffectSet> = self.events.iter().map(|e| &e.effects).collect();
        effect_sets.extend(self.items.iter().map(|i| &i.effects));
        effect_sets.extend(self.special_projects.iter().map(|p| &p.effects));
        for perk in &self.perks {
            if perk.upgrades.is_empty() {
                return Err(ValidationError::DependencyNotFound(format!(
                    "upgrades of perk {}",
                    perk.name
                ))
                .into());
            }
            for u in &perk.upgrades {
                require_known("technology", &u.required_technologies, |t| {
                    self.technology(t).is_some()
                })?;
            }
            effect_sets.extend(perk.upgrades.iter().map(|u| &u.effects));
        }
        for effects in effect_sets {
            effects.validate()?;
            self.check_unlocks(&effects.unlocks)?;
            if let Some(name) = &effects.enable_company {
                if !company_names.contains(name.as_str()) {
                    return Err(RuntimeError::Unknown {
                        kind: "company",
                        name: name.clone(),
                    });
                }
            }
        }

        for p in &self.special_projects {
            require_known("recipe", &p.required_products, |r| recipes.get(r).is_ok())?;
        }
        for c in &self.companies {
            unique(c.workers.iter().map(|w| w.name.as_str()))?;
            for w in &c.workers {
                validate_worker(&w.to_worker())?;
            }
            require_known("vertical", &c.verticals, |v| self.vertical(v).is_some())?;
            require_known("technology", &c.technologies, |t| {
                self.technology(t).is_some()
            })?;
            for p in &c.products {
                self.resolve_product_types(&p.product_types)?;
            }
        }
        self.check_unlocks(&self.unlocked)
    }

    fn check_unlocks(&self, unlocks: &UnlockSet) -> Result<(), RuntimeError> {
        require_known("product type", &unlocks.product_types, |n| {
            self.product_type(n).is_some()
        })?;
        require_known("vertical", &unlocks.verticals, |n| self.vertical(n).is_some())?;
        require_known("technology", &unlocks.technologies, |n| {
            self.technology(n).is_some()
        })?;
        require_known("event", &unlocks.events, |n| {
            self.events.iter().any(|e| e.name == n)
        })?;
        require_known("item", &unlocks.items, |n| self.item(n).is_some())?;
        require_known("special project", &unlocks.special_projects, |n| {
            self.special_project(n).is_some()
        })
    }
}
