use crate::error::Result;
use crate::switch_error;
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::document::{next_revision, Document, DocumentStore, Revision, StoredDocument};

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
struct StoreFile {
    version: u32,
    documents: BTreeMap<String, StoredDocument>,
}

/// Documents kept in a single JSON file.
///
/// The file is the source of truth: every read and every put reloads it under
/// the lock, so revisions written by another handle or process are seen and a
/// stale put fails with `StoreConflict`. A successful put rewrites the whole
/// file (temp file + rename), so the file on disk is always a complete snapshot.
pub struct JsonFileDocumentStore {
    path: PathBuf,
    documents: Mutex<BTreeMap<String, StoredDocument>>,
}

impl JsonFileDocumentStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let documents = load(&path)?;
        if path.exists() {
            info!("Загружено {} документов из {:?}", documents.len(), path);
        } else {
            info!("Файл хранилища {:?} не найден, начинаем с пустого", path);
        }

        Ok(Self {
            path,
            documents: Mutex::new(documents),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Перечитать файл под замком
    fn sync(&self) -> Result<MutexGuard<'_, BTreeMap<String, StoredDocument>>> {
        let mut documents = self.documents.lock();
        *documents = load(&self.path)?;
        Ok(documents)
    }

    fn persist(&self, documents: &BTreeMap<String, StoredDocument>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    switch_error!(store, "Не удалось создать каталог {:?}: {}", parent, e)
                })?;
            }
        }

        let file = StoreFileRef {
            version: FORMAT_VERSION,
            documents,
        };
        let raw = serde_json::to_string_pretty(&file)?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, raw)
            .map_err(|e| switch_error!(store, "Не удалось записать {:?}: {}", tmp_path, e))?;
        fs::rename(&tmp_path, &self.path)
            .map_err(|e| switch_error!(store, "Не удалось заменить {:?}: {}", self.path, e))?;

        debug!("Хранилище сохранено: {:?}", self.path);
        Ok(())
    }
}

fn load(path: &Path) -> Result<BTreeMap<String, StoredDocument>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| switch_error!(store, "Не удалось прочитать {:?}: {}", path, e))?;
    let file: StoreFile = serde_json::from_str(&raw)?;
    if file.version != FORMAT_VERSION {
        return Err(switch_error!(
            store,
            "Неподдерживаемая версия файла {:?}: {}",
            path,
            file.version
        ));
    }

    Ok(file.documents)
}

#[derive(Serialize)]
struct StoreFileRef<'a> {
    version: u32,
    documents: &'a BTreeMap<String, StoredDocument>,
}

impl DocumentStore for JsonFileDocumentStore {
    fn get(&self, id: &str) -> Result<Option<Document>> {
        Ok(self.sync()?.get(id).map(|stored| stored.to_document(id)))
    }

    fn put(&self, document: Document) -> Result<Revision> {
        let mut documents = self.sync()?;

        let revision = next_revision(
            &document.id,
            documents.get(&document.id).map(|stored| &stored.revision),
            document.revision.as_ref(),
            &document.body,
        )?;

        // Память меняется только после успешной записи на диск
        let mut updated = documents.clone();
        updated.insert(
            document.id,
            StoredDocument {
                revision: revision.clone(),
                body: document.body,
            },
        );
        self.persist(&updated)?;
        *documents = updated;

        Ok(revision)
    }

    fn list_by_prefix(&self, prefix: &str) -> Result<Vec<Document>> {
        Ok(self
            .sync()?
            .range(prefix.to_string()..)
            .take_while(|(id, _)| id.starts_with(prefix))
            .map(|(id, stored)| stored.to_document(id))
            .collect())
    }
}
