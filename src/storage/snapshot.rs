use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::survey::AnswerSet;

use super::kv::KeyValueStore;

pub const STORAGE_KEY: &str = "quipu_survey_data";
pub const STORAGE_VERSION: &str = "1.0";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: String,
    pub current_step: u8,
    pub data: AnswerSet,
    pub last_saved: String,
}

pub const REDACTED: &str = "[REDACTED]";

impl Snapshot {
    /// JSON view for display, with the document number masked.
    pub fn redacted_json(&self) -> Result<Value, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        if let Some(number) = value.pointer_mut("/data/step1/documentNumber") {
            *number = Value::String(REDACTED.to_string());
        }
        Ok(value)
    }
}

/// Versioned autosave of the in-progress answers.
///
/// Best effort throughout: storage failures are logged and swallowed, never
/// returned to the caller.
pub struct SnapshotStore<S> {
    store: S,
}

impl<S: KeyValueStore> SnapshotStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    pub fn save(&self, step: u8, data: &AnswerSet) {
        let snapshot = Snapshot {
            version: STORAGE_VERSION.to_string(),
            current_step: step,
            data: data.clone(),
            last_saved: Utc::now().to_rfc3339(),
        };
        let payload = match serde_json::to_string(&snapshot) {
            Ok(p) => p,
            Err(e) => {
                log::error!("[storage] failed to encode survey data: {e}");
                return;
            }
        };
        match self.store.set(STORAGE_KEY, &payload) {
            Ok(()) => log::info!(
                "[storage] survey data saved (step {step}, steps {:?})",
                data.completed_steps()
            ),
            Err(e) => log::error!("[storage] failed to save survey data: {e}"),
        }
    }

    /// Returns the snapshot only when present and written by this format version.
    pub fn load(&self) -> Option<Snapshot> {
        let raw = match self.store.get(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::error!("[storage] failed to load survey data: {e}");
                return None;
            }
        };
        let value: Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                log::error!("[storage] failed to load survey data: {e}");
                return None;
            }
        };
        if value.get("version").and_then(Value::as_str) != Some(STORAGE_VERSION) {
            log::warn!("[storage] version mismatch, clearing old data");
            self.clear();
            return None;
        }
        match serde_json::from_value::<Snapshot>(value) {
            Ok(snapshot) => {
                log::info!(
                    "[storage] survey data loaded (step {}, saved {})",
                    snapshot.current_step,
                    snapshot.last_saved
                );
                Some(snapshot)
            }
            Err(e) => {
                log::error!("[storage] failed to load survey data: {e}");
                None
            }
        }
    }

    pub fn clear(&self) {
        match self.store.remove(STORAGE_KEY) {
            Ok(()) => log::info!("[storage] survey data cleared"),
            Err(e) => log::error!("[storage] failed to clear survey data: {e}"),
        }
    }

    pub fn exists(&self) -> bool {
        self.store.contains(STORAGE_KEY).unwrap_or_else(|e| {
            log::error!("[storage] failed to check for survey data: {e}");
            false
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::kv::{MemoryStore, StoreError};
    use crate::survey::options::{GotaGotaUse, IncomeChange};
    use crate::survey::types::{Step3, StepAnswer};
    use pretty_assertions::assert_eq;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("disabled".to_string()))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("quota exceeded".to_string()))
        }
        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disabled".to_string()))
        }
    }

    fn partial_answers() -> AnswerSet {
        let mut answers = AnswerSet::default();
        answers.insert(StepAnswer::Step3(Step3 {
            income_change: IncomeChange::Decreased25To50,
        }));
        answers
    }

    #[test]
    fn save_then_load_round_trips() {
        let snapshots = SnapshotStore::new(MemoryStore::new());
        let answers = partial_answers();
        snapshots.save(3, &answers);
        let loaded = snapshots.load().expect("snapshot");
        assert_eq!(loaded.current_step, 3);
        assert_eq!(loaded.version, STORAGE_VERSION);
        assert_eq!(loaded.data, answers);
        assert!(snapshots.exists());
    }

    #[test]
    fn stale_version_is_discarded() {
        let store = MemoryStore::new();
        store
            .set(
                STORAGE_KEY,
                r#"{"version":"0.9","currentStep":2,"data":{},"lastSaved":"2024-01-01T00:00:00Z"}"#,
            )
            .expect("seed");
        let snapshots = SnapshotStore::new(store);
        assert!(snapshots.exists());
        assert_eq!(snapshots.load(), None);
        assert!(!snapshots.exists());
    }

    #[test]
    fn unreadable_snapshot_loads_as_absent() {
        let store = MemoryStore::new();
        store.set(STORAGE_KEY, "not json").expect("seed");
        let snapshots = SnapshotStore::new(store);
        assert_eq!(snapshots.load(), None);
    }

    #[test]
    fn snapshot_json_uses_wire_names() {
        let store = MemoryStore::new();
        let snapshots = SnapshotStore::new(store.clone());
        let mut answers = AnswerSet::default();
        answers.insert(StepAnswer::Step5(crate::survey::types::Step5 {
            used_gota_gota: GotaGotaUse::No,
            gota_gota_frequency: None,
            gota_gota_reasons: vec![],
            gota_gota_reason_other: None,
            other_financing: vec![crate::survey::options::FinancingOption::Family],
            other_financing_other: None,
        }));
        snapshots.save(5, &answers);
        let raw = store.get(STORAGE_KEY).expect("get").expect("stored");
        let value: Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(value["version"], "1.0");
        assert_eq!(value["currentStep"], 5);
        assert_eq!(
            value["data"],
            serde_json::json!({"step5": {"usedGotaGota": "No", "otherFinancing": ["Familiares"]}})
        );
        assert!(value["lastSaved"].as_str().is_some());
    }

    #[test]
    fn display_json_masks_document_number() {
        let form = crate::survey::types::Step1Form {
            gender: Some("Mujer".to_string()),
            age: Some("35".to_string()),
            city: Some("Bogotá".to_string()),
            document_type: Some("Cédula de ciudadanía".to_string()),
            document_number: Some("1234567890".to_string()),
        };
        let mut answers = partial_answers();
        answers.insert(StepAnswer::Step1(form.validate().expect("valid")));
        let snapshots = SnapshotStore::new(MemoryStore::new());
        snapshots.save(1, &answers);
        let loaded = snapshots.load().expect("snapshot");

        let shown = loaded.redacted_json().expect("json");
        assert_eq!(shown["data"]["step1"]["documentNumber"], REDACTED);
        assert_eq!(shown["data"]["step1"]["city"], "Bogotá");
        assert!(!shown.to_string().contains("1234567890"));
        assert_eq!(
            loaded.data.step1.as_ref().expect("step1").document_number.as_str(),
            "1234567890"
        );

        let without_step1 = Snapshot {
            data: partial_answers(),
            ..loaded.clone()
        };
        assert_eq!(
            without_step1.redacted_json().expect("json")["data"],
            serde_json::json!({"step3": {"incomeChange": "Han disminuido entre 25 % y 50 %"}})
        );
    }

    #[test]
    fn clear_is_idempotent() {
        let snapshots = SnapshotStore::new(MemoryStore::new());
        snapshots.clear();
        snapshots.clear();
        assert!(!snapshots.exists());
    }

    #[test]
    fn storage_failures_are_swallowed() {
        let snapshots = SnapshotStore::new(BrokenStore);
        snapshots.save(1, &partial_answers());
        assert_eq!(snapshots.load(), None);
        assert!(!snapshots.exists());
        snapshots.clear();
    }
}
