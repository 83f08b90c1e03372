//! Physical capacity counters: datacenters, factories, studios and labs.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Index, IndexMut, Sub, SubAssign};

/// Price of one unit of any facility type.
pub const INFRASTRUCTURE_UNIT_COST: u64 = 10_000;

/// Facility kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InfrastructureType {
    Datacenter,
    Factory,
    Studio,
    Lab,
}

impl InfrastructureType {
    pub const ALL: [InfrastructureType; 4] = [
        InfrastructureType::Datacenter,
        InfrastructureType::Factory,
        InfrastructureType::Studio,
        InfrastructureType::Lab,
    ];
}

impl fmt::Display for InfrastructureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A count for every facility type. Every type is always present, so there
/// is no partially populated value.
///
/// Ordering is component-wise: `a <= b` holds only when it holds for every
/// facility type, and two values can be incomparable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Infrastructure {
    pub datacenter: u32,
    pub factory: u32,
    pub studio: u32,
    pub lab: u32,
}

/// Percent cost adjustments per facility type, e.g. `-10.0` for 10% cheaper.
pub type InfrastructureCostModifiers = BTreeMap<InfrastructureType, f32>;

impl Infrastructure {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single unit of `t`.
    pub fn for_type(t: InfrastructureType) -> Self {
        let mut inf = Self::default();
        inf[t] = 1;
        inf
    }

    pub fn iter(&self) -> impl Iterator<Item = (InfrastructureType, u32)> + '_ {
        InfrastructureType::ALL.iter().map(move |&t| (t, self[t]))
    }

    pub fn total(&self) -> u32 {
        self.iter().map(|(_, n)| n).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Purchase price at the flat unit cost.
    pub fn cost(&self) -> u64 {
        self.iter()
            .map(|(_, n)| u64::from(n) * INFRASTRUCTURE_UNIT_COST)
            .sum()
    }

    /// Purchase price with per-type percent adjustments, never negative.
    pub fn cost_with(&self, modifiers: &InfrastructureCostModifiers) -> f32 {
        self.iter()
            .map(|(t, n)| {
                let pct = modifiers.get(&t).copied().unwrap_or(0.0);
                let unit = INFRASTRUCTURE_UNIT_COST as f32 * (1.0 + pct / 100.0);
                n as f32 * unit.max(0.0)
            })
            .sum()
    }
}

impl Index<InfrastructureType> for Infrastructure {
    type Output = u32;

    fn index(&self, t: InfrastructureType) -> &u32 {
        match t {
            InfrastructureType::Datacenter => &self.datacenter,
            InfrastructureType::Factory => &self.factory,
            InfrastructureType::Studio => &self.studio,
            InfrastructureType::Lab => &self.lab,
        }
    }
}

impl IndexMut<InfrastructureType> for Infrastructure {
    fn index_mut(&mut self, t: InfrastructureType) -> &mut u32 {
        match t {
            InfrastructureType::Datacenter => &mut self.datacenter,
            InfrastructureType::Factory => &mut self.factory,
            InfrastructureType::Studio => &mut self.studio,
            InfrastructureType::Lab => &mut self.lab,
        }
    }
}

impl PartialOrd for Infrastructure {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let le = InfrastructureType::ALL.iter().all(|&t| self[t] <= other[t]);
        let ge = InfrastructureType::ALL.iter().all(|&t| self[t] >= other[t]);
        match (le, ge) {
            (true, true) => Some(Ordering::Equal),
            (true, false) => Some(Ordering::Less),
            (false, true) => Some(Ordering::Greater),
            (false, false) => None,
        }
    }
}

impl Add for Infrastructure {
    type Output = Infrastructure;

    fn add(mut self, rhs: Infrastructure) -> Infrastructure {
        self += rhs;
        self
    }
}

impl AddAssign for Infrastructure {
    fn add_assign(&mut self, rhs: Infrastructure) {
        for t in InfrastructureType::ALL {
            self[t] = self[t].saturating_add(rhs[t]);
        }
    }
}

/// Component-wise, clamped at zero.
impl Sub for Infrastructure {
    type Output = Infrastructure;

    fn sub(mut self, rhs: Infrastructure) -> Infrastructure {
        self -= rhs;
        self
    }
}

impl SubAssign for Infrastructure {
    fn sub_assign(&mut self, rhs: Infrastructure) {
        for t in InfrastructureType::ALL {
            self[t] = self[t].saturating_sub(rhs[t]);
        }
    }
}

impl Sum for Infrastructure {
    fn sum<I: Iterator<Item = Infrastructure>>(iter: I) -> Self {
        iter.fold(Infrastructure::default(), |acc, i| acc + i)
    }
}

impl<'a> Sum<&'a Infrastructure> for Infrastructure {
    fn sum<I: Iterator<Item = &'a Infrastructure>>(iter: I) -> Self {
        iter.fold(Infrastructure::default(), |acc, i| acc + *i)
    }
}

impl fmt::Display for Infrastructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .filter(|(_, n)| *n > 0)
            .map(|(t, n)| format!("{t}:{n}"))
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn inf(d: u32, f: u32, s: u32, l: u32) -> Infrastructure {
        Infrastructure {
            datacenter: d,
            factory: f,
            studio: s,
            lab: l,
        }
    }

    #[test]
    fn new_is_zero_for_every_type() {
        let i = Infrastructure::new();
        for t in InfrastructureType::ALL {
            assert_eq!(i[t], 0);
        }
        assert!(i.is_empty());
    }

    #[test]
    fn cost_is_flat_per_unit() {
        assert_eq!(inf(2, 1, 0, 0).cost(), 30_000);
        assert_eq!(Infrastructure::for_type(InfrastructureType::Lab).cost(), 10_000);
    }

    #[test]
    fn cost_with_modifiers() {
        let mut m = InfrastructureCostModifiers::new();
        m.insert(InfrastructureType::Datacenter, -50.0);
        assert_eq!(inf(2, 1, 0, 0).cost_with(&m), 20_000.0);
    }

    #[test]
    fn subtraction_clamps_at_zero() {
        let a = inf(1, 5, 0, 2);
        let b = inf(3, 2, 1, 2);
        assert_eq!(a - b, inf(0, 3, 0, 0));
    }

    #[test]
    fn one_violating_component_breaks_le() {
        let a = inf(1, 1, 1, 5);
        let b = inf(9, 9, 9, 4);
        assert!(!(a <= b));
        assert!(!(a >= b));
        assert_eq!(a.partial_cmp(&b), None);
        assert!(inf(1, 1, 1, 4) <= b);
        assert!(b >= inf(1, 1, 1, 4));
        let same = a;
        assert!(a <= same && a >= same);
    }

    #[test]
    fn display_lists_nonzero_counts() {
        assert_eq!(inf(2, 0, 1, 0).to_string(), "Datacenter:2 Studio:1");
        assert_eq!(Infrastructure::new().to_string(), "");
    }

    #[test]
    fn sums_requirements() {
        let total: Infrastructure = [inf(10, 0, 0, 0), inf(0, 0, 3, 0)].iter().sum();
        assert_eq!(total, inf(10, 0, 3, 0));
    }

    fn arb_inf() -> impl Strategy<Value = Infrastructure> {
        (0u32..1000, 0u32..1000, 0u32..1000, 0u32..1000)
            .prop_map(|(d, f, s, l)| inf(d, f, s, l))
    }

    proptest! {
        #[test]
        fn add_then_sub_roundtrips(a in arb_inf(), b in arb_inf()) {
            prop_assert_eq!((a + b) - b, a);
            prop_assert!(a <= a + b);
        }

        #[test]
        fn le_matches_componentwise(a in arb_inf(), b in arb_inf()) {
            let expected = InfrastructureType::ALL.iter().all(|&t| a[t] <= b[t]);
            prop_assert_eq!(a <= b, expected);
        }

        #[test]
        fn sub_never_underflows(a in arb_inf(), b in arb_inf()) {
            let d = a - b;
            for t in InfrastructureType::ALL {
                prop_assert_eq!(d[t], a[t].saturating_sub(b[t]));
            }
        }
    }
}
