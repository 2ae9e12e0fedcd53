use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use super::document::{Document, Revision};

/// Счётчик использования одного окна
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRecord {
    pub window_id: String,
    pub count: u64,
    /// Мс с начала эпохи, 0 - ни разу не использовалось
    pub last_used: u64,
    pub title: String,
    /// None - запись ещё не сохранялась
    pub revision: Option<Revision>,
}

/// Тело документа в хранилище
#[derive(Debug, Serialize, Deserialize)]
struct UsageBody {
    window_id: String,
    count: u64,
    last_used: u64,
    #[serde(default)]
    title: String,
}

impl UsageRecord {
    pub fn empty(window_id: impl Into<String>) -> Self {
        Self {
            window_id: window_id.into(),
            count: 0,
            last_used: 0,
            title: String::new(),
            revision: None,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.revision.is_some()
    }

    /// Декодирует документ; идентификатор окна берётся из ключа, а не из тела
    pub(crate) fn from_document(window_id: &str, document: Document) -> Result<Self> {
        let body: UsageBody = serde_json::from_value(document.body)?;
        if body.window_id != window_id {
            warn!(
                "Документ {} содержит чужой window_id '{}', используем ключ",
                document.id, body.window_id
            );
        }
        Ok(Self {
            window_id: window_id.to_string(),
            count: body.count,
            last_used: body.last_used,
            title: body.title,
            revision: document.revision,
        })
    }

    pub(crate) fn to_document(&self, key: String) -> Result<Document> {
        let body = UsageBody {
            window_id: self.window_id.clone(),
            count: self.count,
            last_used: self.last_used,
            title: self.title.clone(),
        };
        Ok(Document {
            id: key,
            revision: self.revision.clone(),
            body: serde_json::to_value(body)?,
        })
    }
}

impl fmt::Display for UsageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} \"{}\" count={} last_used={}",
            self.window_id, self.title, self.count, self.last_used
        )
    }
}
