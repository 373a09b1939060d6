use crate::core::transfer::{export_entries, import_entries};
use crate::store::EntryStore;
use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Writes all entries as JSON to `output`, or to stdout.
pub fn export(store: &dyn EntryStore, output: Option<&Path>) -> Result<()> {
    let entries = store.load()?;
    let data = export_entries(&entries)?;

    match output {
        Some(path) => {
            std::fs::write(path, &data)
                .with_context(|| format!("Failed to write export to {}", path.display()))?;
            info!("Exported {} entries to {}", entries.len(), path.display());
            eprintln!("Exported {} entries to {}", entries.len(), path.display());
        }
        None => println!("{data}"),
    }
    Ok(())
}

/// Replaces the stored entries with the JSON read from `input`, or stdin.
///
/// Nothing is written unless the whole payload is valid.
pub fn import(store: &dyn EntryStore, input: Option<&Path>) -> Result<usize> {
    let data = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read import from {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read import from stdin")?;
            buffer
        }
    };

    let entries = import_entries(&data).context("Error importing data")?;
    store.replace(&entries)?;
    info!("Imported {} entries", entries.len());
    println!("Imported {} entries.", entries.len());
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Observation;
    use crate::store::MemoryEntryStore;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_export_then_import_through_files() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("entries.json");
        let at = NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(6, 30, 0)
            .unwrap();

        let source = MemoryEntryStore::with_entries(vec![Observation::record(at, 80.0, 20.0)]);
        export(&source, Some(&path))?;

        let target = MemoryEntryStore::with_entries(vec![Observation::new(at, 1.0)]);
        assert_eq!(import(&target, Some(&path))?, 1);
        assert_eq!(target.load()?, source.load()?);
        Ok(())
    }

    #[test]
    fn test_failed_import_keeps_existing_entries() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"not": "an array"}"#)?;

        let at = NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(6, 30, 0)
            .unwrap();
        let store = MemoryEntryStore::with_entries(vec![Observation::new(at, 1.0)]);

        let err = import(&store, Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("must be a JSON array"));
        assert_eq!(store.load()?.len(), 1);
        Ok(())
    }
}
