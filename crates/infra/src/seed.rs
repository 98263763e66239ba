//! Inventory seed file: a JSON array of medication drafts.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use pharmastock_core::DomainError;
use pharmastock_inventory::{Medication, MedicationDraft, MedicationStore};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse seed file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("seed entry {index} ({name}): {source}")]
    Rejected {
        index: usize,
        name: String,
        #[source]
        source: DomainError,
    },
}

/// Insert every draft from `path` through the store's write path.
///
/// Duplicates of records already in the store are skipped with a warning;
/// any other rejection aborts the load.
pub fn load_seed<S>(store: &S, path: &Path) -> Result<Vec<Medication>, SeedError>
where
    S: MedicationStore + ?Sized,
{
    let raw = fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let drafts: Vec<MedicationDraft> =
        serde_json::from_str(&raw).map_err(|source| SeedError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let mut inserted = Vec::with_capacity(drafts.len());
    for (index, draft) in drafts.into_iter().enumerate() {
        let name = draft.name.clone();
        match store.insert(draft) {
            Ok(medication) => inserted.push(medication),
            Err(DomainError::Conflict(reason)) => {
                warn!(index, medication = %name, %reason, "duplicate seed entry skipped");
            }
            Err(source) => return Err(SeedError::Rejected { index, name, source }),
        }
    }

    info!(path = %path.display(), records = inserted.len(), "inventory seeded");
    Ok(inserted)
}
