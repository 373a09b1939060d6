use super::EntryStore;
use crate::core::Observation;
use anyhow::{Context, Result};
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const PARTITION: &str = "fluid";
const ENTRIES_KEY: &str = "fluidEntries";
const CARRYOVER_KEY: &str = "carryover";

/// Entry store persisted in a fjall keyspace.
///
/// The whole collection is a single JSON value, so a replace is never
/// observed half-written.
pub struct DiskEntryStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskEntryStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)?;

        let keyspace = fjall::Config::new(path).open()?;
        let partition = keyspace.open_partition(PARTITION, PartitionCreateOptions::default())?;
        Ok(Self {
            keyspace,
            partition,
        })
    }

    fn write(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.partition.insert(key, value)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}

impl EntryStore for DiskEntryStore {
    fn load(&self) -> Result<Vec<Observation>> {
        match self.partition.get(ENTRIES_KEY)? {
            Some(value) => {
                let entries: Vec<Observation> =
                    serde_json::from_slice(&value).context("Stored entries are corrupt")?;
                debug!("Disk store LOAD {} entries", entries.len());
                Ok(entries)
            }
            None => {
                debug!("Disk store has no entries yet");
                Ok(Vec::new())
            }
        }
    }

    fn replace(&self, entries: &[Observation]) -> Result<()> {
        self.write(ENTRIES_KEY, serde_json::to_vec(entries)?)?;
        debug!("Disk store REPLACE with {} entries", entries.len());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.partition.remove(ENTRIES_KEY)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!("Disk store CLEAR");
        Ok(())
    }

    fn carryover(&self) -> Result<Option<f64>> {
        self.partition
            .get(CARRYOVER_KEY)?
            .map(|value| serde_json::from_slice::<f64>(&value).context("Stored carryover is corrupt"))
            .transpose()
    }

    fn set_carryover(&self, value: f64) -> Result<()> {
        self.write(CARRYOVER_KEY, serde_json::to_vec(&value)?)?;
        debug!("Disk store carryover set to {value}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn entry(h: u32, amount: f64, carryover: f64) -> Observation {
        let at = NaiveDate::from_ymd_opt(2024, 2, 10)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap();
        Observation::with_carryover(at, amount, carryover)
    }

    #[test]
    fn test_disk_store_append_and_load() {
        let dir = tempdir().unwrap();
        let store = DiskEntryStore::open(dir.path()).unwrap();

        // Initially, store is empty
        assert!(store.load().unwrap().is_empty());

        store.append(entry(8, 0.0, 0.0)).unwrap();
        store.append(entry(12, 400.0, 100.0)).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, vec![entry(8, 0.0, 0.0), entry(12, 400.0, 100.0)]);
    }

    #[test]
    fn test_disk_store_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = DiskEntryStore::open(dir.path()).unwrap();
            store.replace(&[entry(6, 120.0, 0.0)]).unwrap();
            store.set_carryover(250.0).unwrap();
        }

        let store = DiskEntryStore::open(dir.path()).unwrap();
        assert_eq!(store.load().unwrap(), vec![entry(6, 120.0, 0.0)]);
        assert_eq!(store.carryover().unwrap(), Some(250.0));
    }

    #[test]
    fn test_disk_store_clear() {
        let dir = tempdir().unwrap();
        let store = DiskEntryStore::open(dir.path()).unwrap();

        store.replace(&[entry(1, 1.0, 0.0), entry(2, 2.0, 0.0)]).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_empty());
        assert_eq!(store.carryover().unwrap(), None);
    }
}
