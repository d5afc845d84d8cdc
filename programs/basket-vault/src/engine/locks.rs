use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use anchor_lang::prelude::Pubkey;

/// One exclusive section per basket.
///
/// Every read-modify-write of a basket's NAV, share count, reserve and
/// dividend index runs while holding that basket's slot; baskets never wait
/// on each other.
#[derive(Default)]
pub struct BasketLocks {
    slots: Mutex<HashMap<Pubkey, Arc<Mutex<()>>>>,
}

impl BasketLocks {
    pub fn slot(&self, basket: &Pubkey) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(*basket).or_default().clone()
    }

    /// Runs `f` inside the basket's exclusive section.
    pub fn with<T>(&self, basket: &Pubkey, f: impl FnOnce() -> T) -> T {
        let slot = self.slot(basket);
        let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }
}
