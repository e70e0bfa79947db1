pub mod queries;

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("record {index} in {collection} is malformed: {source}")]
    Malformed {
        collection: &'static str,
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize {collection}: {source}")]
    Serialize {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Services,
    Bookings,
    Schedule,
    Reviews,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Services,
        Collection::Bookings,
        Collection::Schedule,
        Collection::Reviews,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Services => "services",
            Collection::Bookings => "bookings",
            Collection::Schedule => "schedule",
            Collection::Reviews => "reviews",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.as_str())
    }
}

/// One pretty-printed JSON array per collection inside `dir`.
///
/// Every mutation is a whole-file read-modify-write without locking, so two
/// concurrent writers to the same collection may lose one of the updates.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, collection: Collection) -> PathBuf {
        self.dir.join(collection.file_name())
    }

    /// Raw records, or `None` when the file is missing or is not a JSON array.
    async fn read_records(&self, collection: Collection) -> Option<Vec<serde_json::Value>> {
        let path = self.path(collection);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "collection file not readable");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(records) => Some(records),
            Err(e) => {
                tracing::warn!(
                    collection = collection.as_str(),
                    error = %e,
                    "collection file is not valid JSON, treating as empty"
                );
                None
            }
        }
    }

    /// Missing or unparsable files read as an empty collection. Records that
    /// do not match `T` are skipped and logged; the rest are returned.
    pub async fn read<T: DeserializeOwned>(&self, collection: Collection) -> Vec<T> {
        let records = self.read_records(collection).await.unwrap_or_default();
        records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(
                        collection = collection.as_str(),
                        index,
                        error = %e,
                        "skipping malformed record"
                    );
                    None
                }
            })
            .collect()
    }

    /// Strict read for read-modify-write paths: a malformed record fails the
    /// load so the following write cannot drop it from the file.
    pub async fn load<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Result<Vec<T>, StoreError> {
        let records = self.read_records(collection).await.unwrap_or_default();
        records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                serde_json::from_value(record).map_err(|source| StoreError::Malformed {
                    collection: collection.as_str(),
                    index,
                    source,
                })
            })
            .collect()
    }

    pub async fn write<T: Serialize>(
        &self,
        collection: Collection,
        records: &[T],
    ) -> Result<(), StoreError> {
        let path = self.path(collection);
        let json = serde_json::to_string_pretty(records).map_err(|source| StoreError::Serialize {
            collection: collection.as_str(),
            source,
        })?;

        tokio::fs::write(&path, json)
            .await
            .map_err(|source| StoreError::Io {
                path: path.display().to_string(),
                source,
            })
    }
}

/// Creates the data directory and seeds each missing collection with `[]`.
pub async fn init_store(dir: impl Into<PathBuf>) -> anyhow::Result<JsonStore> {
    let store = JsonStore::new(dir);

    tokio::fs::create_dir_all(store.dir())
        .await
        .with_context(|| format!("failed to create data directory {}", store.dir().display()))?;

    for collection in Collection::ALL {
        let path = store.path(collection);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            continue;
        }
        store
            .write::<serde_json::Value>(collection, &[])
            .await
            .with_context(|| format!("failed to seed {}", collection.file_name()))?;
        tracing::info!(collection = collection.as_str(), "created empty collection file");
    }

    Ok(store)
}
