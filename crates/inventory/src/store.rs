use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use tracing::debug;

use pharmastock_core::{DomainError, DomainResult, MedicationId};

use crate::medication::{Medication, MedicationDraft, UniqueKey};
use crate::stock_level::StockLevelPolicy;

/// Medication storage abstraction.
///
/// Implementations enforce the uniqueness constraint on insert; `is_duplicate`
/// is only an advisory pre-flight check.
pub trait MedicationStore: Send + Sync {
    /// Persist a new record, assigning its id and deriving its stock level.
    fn insert(&self, draft: MedicationDraft) -> DomainResult<Medication>;

    fn get(&self, id: MedicationId) -> Option<Medication>;

    /// All records sharing the exact name, ordered by id.
    fn find_by_name(&self, name: &str) -> Vec<Medication>;

    fn list(&self) -> Vec<Medication>;

    fn is_duplicate(&self, draft: &MedicationDraft) -> bool;
}

impl<S> MedicationStore for Arc<S>
where
    S: MedicationStore + ?Sized,
{
    fn insert(&self, draft: MedicationDraft) -> DomainResult<Medication> {
        (**self).insert(draft)
    }

    fn get(&self, id: MedicationId) -> Option<Medication> {
        (**self).get(id)
    }

    fn find_by_name(&self, name: &str) -> Vec<Medication> {
        (**self).find_by_name(name)
    }

    fn list(&self) -> Vec<Medication> {
        (**self).list()
    }

    fn is_duplicate(&self, draft: &MedicationDraft) -> bool {
        (**self).is_duplicate(draft)
    }
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    records: BTreeMap<MedicationId, Medication>,
    unique: HashSet<UniqueKey>,
}

/// In-memory medication store for tests/dev and seeded CLI runs.
#[derive(Debug)]
pub struct InMemoryMedicationStore {
    policy: StockLevelPolicy,
    inner: RwLock<Inner>,
}

impl InMemoryMedicationStore {
    pub fn new(policy: StockLevelPolicy) -> Self {
        Self {
            policy,
            inner: RwLock::new(Inner {
                next_id: 1,
                ..Inner::default()
            }),
        }
    }

    pub fn policy(&self) -> &StockLevelPolicy {
        &self.policy
    }

    // Writes either complete or fail before mutating, so a poisoned lock
    // still guards consistent data.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryMedicationStore {
    fn default() -> Self {
        Self::new(StockLevelPolicy::default())
    }
}

impl MedicationStore for InMemoryMedicationStore {
    fn insert(&self, draft: MedicationDraft) -> DomainResult<Medication> {
        let key = draft.unique_key();
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        if inner.unique.contains(&key) {
            return Err(DomainError::conflict(format!(
                "medication '{}' already exists at pharmacy '{}'",
                draft.name, draft.pharmacy
            )));
        }

        let id = MedicationId::new(inner.next_id);
        let medication = draft.prepare(id, &self.policy)?;

        inner.next_id += 1;
        inner.unique.insert(medication.unique_key());
        inner.records.insert(id, medication.clone());

        debug!(
            medication_id = %id,
            name = %medication.name,
            stock_level = %medication.stock_level,
            "medication stored"
        );
        Ok(medication)
    }

    fn get(&self, id: MedicationId) -> Option<Medication> {
        self.read().records.get(&id).cloned()
    }

    fn find_by_name(&self, name: &str) -> Vec<Medication> {
        self.read()
            .records
            .values()
            .filter(|m| m.name == name)
            .cloned()
            .collect()
    }

    fn list(&self) -> Vec<Medication> {
        self.read().records.values().cloned().collect()
    }

    fn is_duplicate(&self, draft: &MedicationDraft) -> bool {
        self.read().unique.contains(&draft.unique_key())
    }
}
