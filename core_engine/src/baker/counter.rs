use std::collections::HashMap;

use parking_lot::Mutex;

use crate::menu::Menu;

// Per-menu bake counts. Every access goes through the one lock, so an
// increment is never observed half-applied by a snapshot.
#[derive(Debug, Default)]
pub struct BakeCounter {
    counts: Mutex<HashMap<Menu, u64>>,
}

impl BakeCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self, menu: Menu) {
        let mut counts = self.counts.lock();
        *counts.entry(menu).or_insert(0) += 1;
    }

    pub fn snapshot(&self) -> Vec<(Menu, u64)> {
        let counts = self.counts.lock();
        counts.iter().map(|(menu, count)| (*menu, *count)).collect()
    }
}
