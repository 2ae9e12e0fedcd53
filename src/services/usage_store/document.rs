use crate::error::{Result, SwitcherError};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Непрозрачный токен версии документа для оптимистичной записи.
///
/// Format is `<generation>-<hash>`; callers only compare it for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(String);

impl Revision {
    pub(crate) fn first(body: &serde_json::Value) -> Self {
        Self::build(1, body)
    }

    pub(crate) fn next(&self, body: &serde_json::Value) -> Self {
        Self::build(self.generation() + 1, body)
    }

    fn generation(&self) -> u64 {
        self.0
            .split_once('-')
            .and_then(|(generation, _)| generation.parse().ok())
            .unwrap_or(0)
    }

    fn build(generation: u64, body: &serde_json::Value) -> Self {
        let mut hasher = DefaultHasher::new();
        body.to_string().hash(&mut hasher);
        Self(format!("{}-{:08x}", generation, hasher.finish() as u32))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Документ хранилища: ключ, ревизия (None - ещё не записан) и тело
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub revision: Option<Revision>,
    pub body: serde_json::Value,
}

/// Document-style key-value store with optimistic concurrency.
pub trait DocumentStore: Send + Sync {
    fn get(&self, id: &str) -> Result<Option<Document>>;

    /// Записать документ. `document.revision` must equal the stored revision,
    /// or be `None` when nothing is stored yet. Otherwise `StoreConflict`.
    fn put(&self, document: Document) -> Result<Revision>;

    /// Все документы с ключом, начинающимся с `prefix`, в порядке ключей
    fn list_by_prefix(&self, prefix: &str) -> Result<Vec<Document>>;
}

/// Запись документа в хранилище вместе с текущей ревизией
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct StoredDocument {
    pub revision: Revision,
    pub body: serde_json::Value,
}

impl StoredDocument {
    pub fn to_document(&self, id: &str) -> Document {
        Document {
            id: id.to_string(),
            revision: Some(self.revision.clone()),
            body: self.body.clone(),
        }
    }
}

/// Сравнение ревизий перед записью; возвращает ревизию для нового содержимого
pub(crate) fn next_revision(
    id: &str,
    stored: Option<&Revision>,
    expected: Option<&Revision>,
    body: &serde_json::Value,
) -> Result<Revision> {
    match (stored, expected) {
        (None, None) => Ok(Revision::first(body)),
        (Some(stored), Some(expected)) if stored == expected => Ok(stored.next(body)),
        _ => SwitcherError::store_conflict(id),
    }
}
