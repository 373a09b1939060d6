use super::EntryStore;
use crate::core::Observation;
use anyhow::{Result, anyhow};
use std::sync::RwLock;
use tracing::debug;

/// In-memory entry store, lost when dropped.
#[derive(Default)]
pub struct MemoryEntryStore {
    entries: RwLock<Vec<Observation>>,
    carryover: RwLock<Option<f64>>,
}

impl MemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<Observation>) -> Self {
        Self {
            entries: RwLock::new(entries),
            carryover: RwLock::new(None),
        }
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("Entry store lock poisoned")
}

impl EntryStore for MemoryEntryStore {
    fn load(&self) -> Result<Vec<Observation>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.clone())
    }

    fn replace(&self, entries: &[Observation]) -> Result<()> {
        let mut stored = self.entries.write().map_err(poisoned)?;
        *stored = entries.to_vec();
        debug!("Memory store REPLACE with {} entries", stored.len());
        Ok(())
    }

    fn append(&self, entry: Observation) -> Result<()> {
        let mut stored = self.entries.write().map_err(poisoned)?;
        stored.push(entry);
        debug!("Memory store APPEND, now {} entries", stored.len());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries.write().map_err(poisoned)?.clear();
        debug!("Memory store CLEAR");
        Ok(())
    }

    fn carryover(&self) -> Result<Option<f64>> {
        Ok(*self.carryover.read().map_err(poisoned)?)
    }

    fn set_carryover(&self, value: f64) -> Result<()> {
        *self.carryover.write().map_err(poisoned)? = Some(value);
        Ok(())
    }
}
