use crate::error::Result;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::document::{next_revision, Document, DocumentStore, Revision, StoredDocument};

/// Хранилище в памяти: для тестов и режима сухого запуска
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: DashMap<String, StoredDocument>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn get(&self, id: &str) -> Result<Option<Document>> {
        Ok(self.documents.get(id).map(|stored| stored.to_document(id)))
    }

    fn put(&self, document: Document) -> Result<Revision> {
        // Entry держит блокировку шарда: проверка ревизии и запись атомарны
        match self.documents.entry(document.id.clone()) {
            Entry::Occupied(mut entry) => {
                let revision = next_revision(
                    &document.id,
                    Some(&entry.get().revision),
                    document.revision.as_ref(),
                    &document.body,
                )?;
                entry.insert(StoredDocument {
                    revision: revision.clone(),
                    body: document.body,
                });
                Ok(revision)
            }
            Entry::Vacant(entry) => {
                let revision =
                    next_revision(&document.id, None, document.revision.as_ref(), &document.body)?;
                entry.insert(StoredDocument {
                    revision: revision.clone(),
                    body: document.body,
                });
                Ok(revision)
            }
        }
    }

    fn list_by_prefix(&self, prefix: &str) -> Result<Vec<Document>> {
        let mut documents: Vec<Document> = self
            .documents
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| entry.value().to_document(entry.key()))
            .collect();
        documents.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(documents)
    }
}
