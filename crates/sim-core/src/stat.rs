//! Named numeric quantities with additive and multiplicative modifiers.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Handle to a single modifier on a [`Stat`], returned when it is added.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModifierId(pub u64);

/// One live contribution to a stat.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    /// Handle used to remove exactly this contribution.
    pub id: ModifierId,
    /// Added to the base value before multiplication.
    pub additive: f32,
    /// Multiplies the summed value (1.0 is neutral).
    pub multiplicative: f32,
    /// Ticks left before expiry; `None` lasts until removed.
    pub remaining: Option<u32>,
}

/// A named quantity: `(base_value + Σadditive) × Πmultiplicative`.
///
/// The value is computed on every read so it always reflects the live
/// modifier list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub name: String,
    pub base_value: f32,
    #[serde(default)]
    modifiers: Vec<Modifier>,
    #[serde(default)]
    next_modifier: u64,
}

impl Stat {
    pub fn new(name: impl Into<String>, base_value: f32) -> Self {
        Self {
            name: name.into(),
            base_value,
            modifiers: Vec::new(),
            next_modifier: 0,
        }
    }

    /// Current value including every live modifier.
    pub fn value(&self) -> f32 {
        let additive: f32 = self.modifiers.iter().map(|m| m.additive).sum();
        let multiplicative: f32 = self.modifiers.iter().map(|m| m.multiplicative).product();
        (self.base_value + additive) * multiplicative
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// Append a modifier and return its handle.
    ///
    /// `duration` counts [`Stat::tick`] calls; `None` never expires.
    pub fn add_modifier(
        &mut self,
        additive: f32,
        multiplicative: f32,
        duration: Option<u32>,
    ) -> ModifierId {
        let id = ModifierId(self.next_modifier);
        self.next_modifier += 1;
        self.modifiers.push(Modifier {
            id,
            additive,
            multiplicative,
            remaining: duration,
        });
        id
    }

    /// Remove one modifier, returning it if it was still live.
    pub fn remove_modifier(&mut self, id: ModifierId) -> Option<Modifier> {
        let idx = self.modifiers.iter().position(|m| m.id == id)?;
        Some(self.modifiers.remove(idx))
    }

    pub fn has_modifier(&self, id: ModifierId) -> bool {
        self.modifiers.iter().any(|m| m.id == id)
    }

    /// Advance duration-bearing modifiers by one tick and drop the expired.
    /// Returns how many expired.
    pub fn tick(&mut self) -> usize {
        let before = self.modifiers.len();
        self.modifiers.retain_mut(|m| match m.remaining.as_mut() {
            Some(r) => {
                *r = r.saturating_sub(1);
                *r > 0
            }
            None => true,
        });
        let expired = before - self.modifiers.len();
        if expired > 0 {
            debug!(stat = %self.name, expired, "stat modifiers expired");
        }
        expired
    }

    pub fn clear_modifiers(&mut self) {
        self.modifiers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn value_combines_additive_then_multiplicative() {
        let mut s = Stat::new("Design", 10.0);
        s.add_modifier(5.0, 1.0, None);
        s.add_modifier(0.0, 2.0, None);
        assert_eq!(s.value(), 30.0);
    }

    #[test]
    fn removing_a_modifier_restores_value() {
        let mut s = Stat::new("Happiness", 0.0);
        let id = s.add_modifier(100.0, 1.0, None);
        assert_eq!(s.value(), 100.0);
        assert!(s.remove_modifier(id).is_some());
        assert_eq!(s.value(), 0.0);
        assert!(s.remove_modifier(id).is_none());
    }

    #[test]
    fn timed_modifiers_expire_after_duration() {
        let mut s = Stat::new("Charisma", 1.0);
        s.add_modifier(2.0, 1.0, Some(2));
        s.add_modifier(1.0, 1.0, None);
        assert_eq!(s.tick(), 0);
        assert_eq!(s.value(), 4.0);
        assert_eq!(s.tick(), 1);
        assert_eq!(s.value(), 2.0);
        assert_eq!(s.tick(), 0);
        assert_eq!(s.modifiers().len(), 1);
    }

    #[test]
    fn base_changes_are_seen_immediately() {
        let mut s = Stat::new("Cash", 100.0);
        s.add_modifier(0.0, 1.5, None);
        s.base_value += 100.0;
        assert_eq!(s.value(), 300.0);
    }

    proptest! {
        #[test]
        fn add_then_remove_is_identity(base in -1000.0f32..1000.0,
                                       add in -500.0f32..500.0,
                                       mul in 0.1f32..4.0,
                                       other in -50.0f32..50.0) {
            let mut s = Stat::new("X", base);
            s.add_modifier(other, 1.0, None);
            let before = s.value();
            let id = s.add_modifier(add, mul, None);
            s.remove_modifier(id);
            prop_assert_eq!(s.value(), before);
        }
    }
}
