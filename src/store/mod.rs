pub mod disk;
pub mod memory;

use crate::core::Observation;
use crate::core::config::AppConfig;
use anyhow::{Context, Result};
pub use disk::DiskEntryStore;
pub use memory::MemoryEntryStore;
use tracing::debug;

/// Holds the recorded entry log and the standing carryover.
///
/// Callers always get a full snapshot from `load`; there is no partial
/// update of the collection, only `append`, `replace` and `clear`.
pub trait EntryStore: Send + Sync {
    fn load(&self) -> Result<Vec<Observation>>;

    fn replace(&self, entries: &[Observation]) -> Result<()>;

    fn append(&self, entry: Observation) -> Result<()> {
        let mut entries = self.load()?;
        entries.push(entry);
        self.replace(&entries)
    }

    fn clear(&self) -> Result<()>;

    /// The carryover remembered across sessions, if one was ever set.
    fn carryover(&self) -> Result<Option<f64>>;

    fn set_carryover(&self, value: f64) -> Result<()>;
}

/// Opens the persistent store under the configured data path.
pub fn open_store(config: &AppConfig) -> Result<DiskEntryStore> {
    let path = config.default_data_path()?.join("store");
    debug!("Opening entry store at {}", path.display());
    DiskEntryStore::open(&path)
        .with_context(|| format!("Failed to open entry store at {}", path.display()))
}
