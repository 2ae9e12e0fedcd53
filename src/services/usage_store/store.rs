use crate::debug_if_enabled;
use crate::error::Result;
use std::sync::Arc;
use tracing::{debug, warn};

use super::clock::Clock;
use super::document::DocumentStore;
use super::record::UsageRecord;

/// Persistent usage counters keyed by window id.
///
/// Every record lives under `namespace` in the underlying document store, so
/// unrelated documents sharing the store are never read or overwritten.
/// `record_usage` is the only mutator.
pub struct UsageStore {
    documents: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    namespace: String,
}

impl UsageStore {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            documents,
            clock,
            namespace: namespace.into(),
        }
    }

    fn key(&self, window_id: &str) -> String {
        format!("{}{}", self.namespace, window_id)
    }

    fn load(&self, window_id: &str) -> Result<UsageRecord> {
        match self.documents.get(&self.key(window_id))? {
            Some(document) => UsageRecord::from_document(window_id, document),
            None => Ok(UsageRecord::empty(window_id)),
        }
    }

    /// Сохранённая запись или нулевая. Никогда не падает и ничего не записывает.
    pub fn get(&self, window_id: &str) -> UsageRecord {
        self.load(window_id).unwrap_or_else(|e| {
            warn!("Не удалось прочитать счётчик для {}: {}", window_id, e);
            UsageRecord::empty(window_id)
        })
    }

    /// Увеличивает счётчик, обновляет время и заголовок.
    ///
    /// The write carries the revision that was read, so a concurrent writer
    /// makes this fail with `StoreConflict` instead of losing its update.
    pub fn record_usage(&self, window_id: &str, title: &str) -> Result<UsageRecord> {
        let mut record = self.load(window_id)?;

        record.count += 1;
        record.last_used = record.last_used.max(self.clock.now_millis());
        record.title = title.to_string();

        let document = record.to_document(self.key(window_id))?;
        record.revision = Some(self.documents.put(document)?);

        debug!("Использование записано: {}", record);
        Ok(record)
    }

    /// Все записи в пространстве имён, в порядке ключей.
    /// Битые документы пропускаются с предупреждением.
    pub fn all_records(&self) -> Result<Vec<UsageRecord>> {
        let documents = self.documents.list_by_prefix(&self.namespace)?;
        debug_if_enabled!("Найдено {} документов с префиксом '{}'", documents.len(), self.namespace);

        let records = documents
            .into_iter()
            .filter_map(|document| {
                let window_id = document.id[self.namespace.len()..].to_string();
                match UsageRecord::from_document(&window_id, document) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        warn!("Пропускаем повреждённую запись {}: {}", window_id, e);
                        None
                    }
                }
            })
            .collect();

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SwitcherError;
    use crate::services::usage_store::clock::ManualClock;
    use crate::services::usage_store::document::{Document, Revision};
    use crate::services::usage_store::{JsonFileDocumentStore, MemoryDocumentStore};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn store_with_clock(start: u64) -> (UsageStore, Arc<MemoryDocumentStore>, Arc<ManualClock>) {
        let documents = Arc::new(MemoryDocumentStore::new());
        let clock = Arc::new(ManualClock::new(start));
        let store = UsageStore::new(documents.clone(), clock.clone(), "window/");
        (store, documents, clock)
    }

    #[test]
    fn test_get_missing_returns_zero_record_without_persisting() {
        let (store, documents, _) = store_with_clock(1_000);

        let record = store.get("0x01");
        assert_eq!(record, UsageRecord::empty("0x01"));
        assert!(!record.is_persisted());
        assert!(documents.list_by_prefix("").unwrap().is_empty());
    }

    #[test]
    fn test_record_usage_n_times() {
        let (store, _, clock) = store_with_clock(1_000);

        for i in 0..5 {
            clock.set(1_000 + i * 100);
            store
                .record_usage("0x01", &format!("Terminal {}", i))
                .unwrap();
        }

        let record = store.get("0x01");
        assert_eq!(record.count, 5);
        assert_eq!(record.last_used, 1_400);
        assert_eq!(record.title, "Terminal 4");
        assert!(record.is_persisted());
    }

    #[test]
    fn test_last_used_never_decreases() {
        let (store, _, clock) = store_with_clock(5_000);
        store.record_usage("0x01", "Terminal").unwrap();

        clock.set(4_000);
        let record = store.record_usage("0x01", "Terminal").unwrap();
        assert_eq!(record.count, 2);
        assert_eq!(record.last_used, 5_000);
    }

    #[test]
    fn test_record_usage_returns_new_revision() {
        let (store, _, _) = store_with_clock(1);

        let first = store.record_usage("0x01", "Terminal").unwrap();
        let second = store.record_usage("0x01", "Terminal").unwrap();
        assert_ne!(first.revision, second.revision);
        assert_eq!(store.get("0x01").revision, second.revision);
    }

    #[test]
    fn test_all_records_ignores_foreign_documents() {
        let (store, documents, _) = store_with_clock(1);
        store.record_usage("0x01", "Terminal").unwrap();
        store.record_usage("0x02", "Browser").unwrap();
        documents
            .put(Document {
                id: "settings/theme".to_string(),
                revision: None,
                body: json!({"dark": true}),
            })
            .unwrap();

        let ids: Vec<String> = store
            .all_records()
            .unwrap()
            .into_iter()
            .map(|r| r.window_id)
            .collect();
        assert_eq!(ids, vec!["0x01", "0x02"]);
    }

    #[test]
    fn test_corrupt_record_is_skipped_and_read_as_zero() {
        let (store, documents, _) = store_with_clock(1);
        store.record_usage("0x01", "Terminal").unwrap();
        documents
            .put(Document {
                id: "window/0x02".to_string(),
                revision: None,
                body: json!("not a record"),
            })
            .unwrap();

        assert_eq!(store.all_records().unwrap().len(), 1);
        assert_eq!(store.get("0x02").count, 0);
    }

    /// Хранилище, в котором между чтением и записью вклинивается другой писатель
    struct RacingStore {
        inner: MemoryDocumentStore,
        raced: AtomicBool,
    }

    impl DocumentStore for RacingStore {
        fn get(&self, id: &str) -> Result<Option<Document>> {
            let snapshot = self.inner.get(id)?;
            if !self.raced.swap(true, Ordering::SeqCst) {
                let body = json!({"window_id": "0x01", "count": 7, "last_used": 1, "title": "Other"});
                let revision: Option<Revision> = snapshot.as_ref().and_then(|d| d.revision.clone());
                self.inner.put(Document {
                    id: id.to_string(),
                    revision,
                    body,
                })?;
            }
            Ok(snapshot)
        }

        fn put(&self, document: Document) -> Result<Revision> {
            self.inner.put(document)
        }

        fn list_by_prefix(&self, prefix: &str) -> Result<Vec<Document>> {
            self.inner.list_by_prefix(prefix)
        }
    }

    #[test]
    fn test_two_file_handles_keep_every_use() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.json");
        let clock = Arc::new(ManualClock::new(1_000));
        let first = UsageStore::new(
            Arc::new(JsonFileDocumentStore::open(&path).unwrap()),
            clock.clone(),
            "window/",
        );
        let second = UsageStore::new(
            Arc::new(JsonFileDocumentStore::open(&path).unwrap()),
            clock.clone(),
            "window/",
        );

        first.record_usage("0x01", "Terminal").unwrap();
        first.record_usage("0x01", "Terminal").unwrap();
        let record = second.record_usage("0x01", "Terminal").unwrap();

        assert_eq!(record.count, 3);
        assert_eq!(first.get("0x01").count, 3);
    }

    #[test]
    fn test_concurrent_writer_surfaces_conflict() {
        let documents = Arc::new(RacingStore {
            inner: MemoryDocumentStore::new(),
            raced: AtomicBool::new(false),
        });
        let store = UsageStore::new(documents, Arc::new(ManualClock::new(1)), "window/");

        let err = store.record_usage("0x01", "Terminal").unwrap_err();
        assert!(matches!(err, SwitcherError::StoreConflict { ref id } if id == "window/0x01"));

        // Запись другого писателя не потеряна
        assert_eq!(store.get("0x01").count, 7);
    }
}
