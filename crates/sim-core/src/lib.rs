#![deny(warnings)]

//! Core domain models and invariants for Founder.
//!
//! This crate defines the leaf value types of the simulation (stats, buffs,
//! infrastructure, catalog entries, workers) together with validation helpers
//! for data loaded from files.

pub mod buff;
pub mod catalog;
pub mod infrastructure;
pub mod stat;
pub mod worker;

pub use buff::{BuffKind, HasStats, ProductEffect, StatBuff};
pub use catalog::{Market, ProductType, Technology, UnlockSet, Vertical};
pub use infrastructure::{
    Infrastructure, InfrastructureCostModifiers, InfrastructureType, INFRASTRUCTURE_UNIT_COST,
};
pub use stat::{Modifier, ModifierId, Stat};
pub use worker::{Worker, DEFAULT_MIN_SALARY};

use std::collections::BTreeSet;
use thiserror::Error;

/// Lookup and validation failures for core types.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// A stat name not known to the target.
    #[error("unknown stat: {0}")]
    UnknownStat(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Validation errors for catalog data.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Names are used as identifiers and must not be blank.
    #[error("empty name")]
    EmptyName,
    /// Numeric field must be finite.
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
    /// Field must be non-negative.
    #[error("negative value in {0}")]
    Negative(&'static str),
    /// Probability outside [0, 1].
    #[error("probability {0} outside [0,1]")]
    InvalidProbability(f32),
    /// Identifier defined twice.
    #[error("duplicate id: {0}")]
    Duplicate(String),
    /// Missing dependency.
    #[error("dependency not found: {0}")]
    DependencyNotFound(String),
}

fn check_non_negative(v: f32, field: &'static str) -> Result<(), ValidationError> {
    if !v.is_finite() {
        return Err(ValidationError::NonFinite(field));
    }
    if v < 0.0 {
        return Err(ValidationError::Negative(field));
    }
    Ok(())
}

/// Validate a probability in [0, 1].
pub fn validate_probability(p: f32) -> Result<(), ValidationError> {
    if !p.is_finite() || !(0.0..=1.0).contains(&p) {
        return Err(ValidationError::InvalidProbability(p));
    }
    Ok(())
}

/// Validate a product category.
pub fn validate_product_type(pt: &ProductType) -> Result<(), ValidationError> {
    if pt.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    check_non_negative(pt.difficulty, "difficulty")?;
    Ok(())
}

/// Validate a worker's skills and salary.
pub fn validate_worker(w: &Worker) -> Result<(), ValidationError> {
    if w.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    check_non_negative(w.salary, "salary")?;
    check_non_negative(w.base_min_salary, "base_min_salary")?;
    for s in [
        &w.happiness,
        &w.productivity,
        &w.charisma,
        &w.creativity,
        &w.cleverness,
    ] {
        check_non_negative(s.base_value, "worker stat")?;
    }
    Ok(())
}

/// Validate the catalog as a whole, including cross-references between
/// categories, verticals and technologies.
pub fn validate_catalog(
    product_types: &[ProductType],
    verticals: &[Vertical],
    technologies: &[Technology],
) -> Result<(), ValidationError> {
    let mut vertical_names: BTreeSet<&str> = BTreeSet::new();
    for v in verticals {
        if v.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        check_non_negative(v.cost, "vertical cost")?;
        if !vertical_names.insert(v.name.as_str()) {
            return Err(ValidationError::Duplicate(v.name.clone()));
        }
    }

    let mut type_names: BTreeSet<&str> = BTreeSet::new();
    for pt in product_types {
        validate_product_type(pt)?;
        if !type_names.insert(pt.name.as_str()) {
            return Err(ValidationError::Duplicate(pt.name.clone()));
        }
        for v in &pt.required_verticals {
            if !vertical_names.contains(v.as_str()) {
                return Err(ValidationError::DependencyNotFound(v.clone()));
            }
        }
    }

    let mut tech_names: BTreeSet<&str> = BTreeSet::new();
    for t in technologies {
        if t.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        check_non_negative(t.required_research, "required_research")?;
        if !tech_names.insert(t.name.as_str()) {
            return Err(ValidationError::Duplicate(t.name.clone()));
        }
    }
    for t in technologies {
        if let Some(v) = &t.required_vertical {
            if !vertical_names.contains(v.as_str()) {
                return Err(ValidationError::DependencyNotFound(v.clone()));
            }
        }
        for dep in &t.required_technologies {
            if !tech_names.contains(dep.as_str()) {
                return Err(ValidationError::DependencyNotFound(dep.clone()));
            }
        }
    }
    Ok(())
}
