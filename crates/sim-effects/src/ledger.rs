//! Bookkeeping for effects that stay on until explicitly removed, such as
//! equipped items and perks.

use crate::effect::{apply_worker_buffs, EffectReceipt, EffectScope, EffectSet, EffectTarget};
use crate::EffectError;
use serde::{Deserialize, Serialize};
use sim_core::{StatBuff, Worker};
use std::collections::BTreeMap;
use tracing::{debug, info};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct Entry {
    receipt: EffectReceipt,
    /// Given to workers hired while equipped.
    worker_buffs: Vec<StatBuff>,
}

/// Receipts of active equipment, keyed by what was equipped.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BuffLedger {
    entries: BTreeMap<String, Entry>,
}

impl BuffLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_equipped(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn receipt(&self, key: &str) -> Option<&EffectReceipt> {
        self.entries.get(key).map(|e| &e.receipt)
    }

    /// Apply `effects` under `key`. Each key can be equipped once.
    pub fn equip<T: EffectTarget + ?Sized>(
        &mut self,
        key: impl Into<String>,
        effects: &EffectSet,
        target: &mut T,
        scope: &mut EffectScope<'_>,
    ) -> Result<&EffectReceipt, EffectError> {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return Err(EffectError::AlreadyEquipped(key));
        }
        let receipt = effects.apply(target, scope)?;
        info!(item = %key, modifiers = receipt.modifier_count(), "equipped");
        let entry = self.entries.entry(key).or_insert(Entry {
            receipt,
            worker_buffs: effects.worker_buffs.clone(),
        });
        Ok(&entry.receipt)
    }

    /// Revert exactly what equipping `key` applied, including buffs given
    /// to workers hired since.
    pub fn unequip<T: EffectTarget + ?Sized>(
        &mut self,
        key: &str,
        target: &mut T,
        scope: &mut EffectScope<'_>,
    ) -> Result<EffectReceipt, EffectError> {
        let entry = self
            .entries
            .remove(key)
            .ok_or_else(|| EffectError::NotEquipped(key.to_string()))?;
        entry.receipt.revert(target, scope);
        info!(item = %key, "unequipped");
        Ok(entry.receipt)
    }

    /// Give a newly hired worker the worker buffs of everything equipped.
    /// The modifiers are recorded so unequipping removes them too.
    pub fn onboard(&mut self, worker: &mut Worker) -> Result<usize, EffectError> {
        let mut applied = 0;
        let mut failed = None;
        for (key, entry) in self.entries.iter_mut() {
            let before = entry.receipt.modifiers.len();
            if let Err(err) = apply_worker_buffs(worker, &entry.worker_buffs, &mut entry.receipt) {
                failed = Some(err);
                break;
            }
            let added = entry.receipt.modifiers.len() - before;
            if added > 0 {
                debug!(item = %key, worker = %worker.name, modifiers = added, "worker onboarded");
            }
            applied += added;
        }
        if let Some(err) = failed {
            self.release(worker);
            return Err(err);
        }
        Ok(applied)
    }

    /// Strip every equipment modifier from a worker leaving the company.
    /// Returns how many were removed.
    pub fn release(&mut self, worker: &mut Worker) -> usize {
        let removed: usize = self
            .entries
            .values_mut()
            .map(|e| e.receipt.detach_worker(worker))
            .sum();
        if removed > 0 {
            debug!(worker = %worker.name, modifiers = removed, "worker released");
        }
        removed
    }
}
