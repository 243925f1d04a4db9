//! Filesystem-backed record store.
//!
//! Records are stored one JSON file per record under sharded directories
//! derived from the record id's hyphen-free form:
//!
//! `<records_dir>/<k[0..2]>/<k[2..4]>/<k>/record.json`
//!
//! The sharding prevents very large fan-out in a single directory as the
//! clinic's history grows.

use std::fs;
use std::path::PathBuf;

use super::{DataStore, StorageError, StoredRecord};
use crate::config::CoreConfig;
use crate::constants::RECORD_JSON_FILENAME;
use crs_types::RecordId;

/// A [`DataStore`] writing one JSON file per record.
#[derive(Debug, Clone)]
pub struct FsStore {
    records_dir: PathBuf,
}

impl FsStore {
    pub fn new(cfg: &CoreConfig) -> Self {
        Self {
            records_dir: cfg.records_dir(),
        }
    }

    fn record_file(&self, id: RecordId) -> PathBuf {
        let key = id.storage_key();
        self.records_dir
            .join(&key[0..2])
            .join(&key[2..4])
            .join(&key)
            .join(RECORD_JSON_FILENAME)
    }
}

impl DataStore for FsStore {
    fn get(&self, id: RecordId) -> Result<Option<StoredRecord>, StorageError> {
        let path = self.record_file(id);
        if !path.is_file() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path).map_err(StorageError::Read)?;
        let record = serde_json::from_str(&contents).map_err(StorageError::Deserialization)?;
        Ok(Some(record))
    }

    fn put(&self, record: &StoredRecord) -> Result<(), StorageError> {
        let path = self.record_file(record.id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(StorageError::DirCreation)?;
        }

        let contents =
            serde_json::to_string_pretty(record).map_err(StorageError::Serialization)?;
        fs::write(&path, contents).map_err(StorageError::Write)
    }

    /// Traverses the sharded directory structure and reads every record
    /// file. A file that cannot be parsed is logged and skipped rather than
    /// failing the whole listing.
    fn list(&self) -> Result<Vec<StoredRecord>, StorageError> {
        let mut records = Vec::new();

        let s1_iter = match fs::read_dir(&self.records_dir) {
            Ok(it) => it,
            Err(_) => return Ok(records),
        };
        for s1 in s1_iter.flatten() {
            let s1_path = s1.path();
            if !s1_path.is_dir() {
                continue;
            }

            let s2_iter = match fs::read_dir(&s1_path) {
                Ok(it) => it,
                Err(_) => continue,
            };

            for s2 in s2_iter.flatten() {
                let s2_path = s2.path();
                if !s2_path.is_dir() {
                    continue;
                }

                let id_iter = match fs::read_dir(&s2_path) {
                    Ok(it) => it,
                    Err(_) => continue,
                };

                for id_ent in id_iter.flatten() {
                    let record_path = id_ent.path().join(RECORD_JSON_FILENAME);
                    if !record_path.is_file() {
                        continue;
                    }

                    let Ok(contents) = fs::read_to_string(&record_path) else {
                        continue;
                    };

                    match serde_json::from_str::<StoredRecord>(&contents) {
                        Ok(record) => records.push(record),
                        Err(_) => {
                            tracing::warn!("failed to parse record: {}", record_path.display());
                        }
                    }
                }
            }
        }

        Ok(records)
    }
}
