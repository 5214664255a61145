use bincode::{deserialize_from, serialize_into};
use chrono::{SecondsFormat, Utc};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Record id used when the caller does not name one.
pub const DEFAULT_RECORD_ID: &str = "savedState";

/// Which database and object store to use.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    pub name: String,
    pub version: u32,
    pub store_name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "SharedAppDB".to_string(),
            version: 1,
            store_name: "appData".to_string(),
        }
    }
}

impl StoreConfig {
    pub fn new(name: impl Into<String>, version: u32, store_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version,
            store_name: store_name.into(),
        }
    }
}

/// One stored payload.
///
/// The payload is kept as JSON text so any `Serialize` value can be stored
/// and read back into a different (compatible) type.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SavedRecord {
    pub id: String,
    pub raw_data: String,
    /// RFC 3339 time of the write, UTC with millisecond precision.
    pub timestamp: String,
}

impl SavedRecord {
    pub fn data<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        Ok(serde_json::from_str(&self.raw_data)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store file is corrupt: {0}")]
    Encoding(#[from] bincode::Error),
    #[error("payload is not valid JSON: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("database {name} is at version {found}, cannot open it as version {requested}")]
    VersionDowngrade {
        name: String,
        found: u32,
        requested: u32,
    },
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct DatabaseFile {
    version: u32,
    stores: BTreeMap<String, BTreeMap<String, SavedRecord>>,
}

/// An open key-value database.
///
/// The whole database lives in one gzip-compressed bincode file under the
/// directory given to [`Store::open`]. Every mutation rewrites the file
/// through a temporary file and a rename, so a crash leaves either the old
/// or the new contents on disk.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    config: StoreConfig,
    db: DatabaseFile,
}

impl Store {
    /// Open (or create) the database described by `config` inside `dir`.
    ///
    /// Opening with a higher version than the file holds upgrades it, creating
    /// the object store when it is missing. Opening with a lower version fails.
    pub fn open(dir: impl AsRef<Path>, config: StoreConfig) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.db.gz", file_stem(&config.name)));

        let (mut db, existed) = if path.exists() {
            (read_database(&path)?, true)
        } else {
            (
                DatabaseFile {
                    version: config.version,
                    stores: BTreeMap::new(),
                },
                false,
            )
        };

        if db.version > config.version {
            return Err(StoreError::VersionDowngrade {
                name: config.name,
                found: db.version,
                requested: config.version,
            });
        }

        let needs_upgrade = !existed
            || db.version < config.version
            || !db.stores.contains_key(&config.store_name);
        if needs_upgrade {
            info!(
                "upgrading database {} from v{} to v{}",
                config.name, db.version, config.version
            );
            db.version = config.version;
            db.stores.entry(config.store_name.clone()).or_default();
        }

        if needs_upgrade {
            write_database(&path, &db)?;
        }
        let store = Store { path, config, db };
        debug!("opened store {} at {}", store.config.store_name, store.path.display());
        Ok(store)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert or replace the record `id`.
    pub fn put<T: Serialize + ?Sized>(
        &mut self,
        id: &str,
        data: &T,
    ) -> Result<SavedRecord, StoreError> {
        let record = SavedRecord {
            id: id.to_string(),
            raw_data: serde_json::to_string(data)?,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        let mut db = self.db.clone();
        records_mut(&mut db, &self.config.store_name).insert(id.to_string(), record.clone());
        self.commit(db)?;
        Ok(record)
    }

    pub fn get(&self, id: &str) -> Option<&SavedRecord> {
        self.db
            .stores
            .get(&self.config.store_name)
            .and_then(|records| records.get(id))
    }

    /// Remove the record `id`. Returns whether it existed.
    pub fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let mut db = self.db.clone();
        let existed = records_mut(&mut db, &self.config.store_name)
            .remove(id)
            .is_some();
        if existed {
            self.commit(db)?;
        }
        Ok(existed)
    }

    /// Remove every record of the object store.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        let mut db = self.db.clone();
        records_mut(&mut db, &self.config.store_name).clear();
        self.commit(db)
    }

    pub fn len(&self) -> usize {
        self.db
            .stores
            .get(&self.config.store_name)
            .map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write `db` to disk and only then make it the in-memory state.
    fn commit(&mut self, db: DatabaseFile) -> Result<(), StoreError> {
        write_database(&self.path, &db)?;
        self.db = db;
        Ok(())
    }
}

fn records_mut<'a>(
    db: &'a mut DatabaseFile,
    store_name: &str,
) -> &'a mut BTreeMap<String, SavedRecord> {
    db.stores.entry(store_name.to_string()).or_default()
}

fn write_database(path: &Path, db: &DatabaseFile) -> Result<(), StoreError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let tmp = NamedTempFile::new_in(dir)?;
    {
        let encoder = GzEncoder::new(tmp.as_file(), Compression::default());
        let mut writer = BufWriter::new(encoder);
        serialize_into(&mut writer, db)?;
        let encoder = writer.into_inner().map_err(|e| e.into_error())?;
        encoder.finish()?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn read_database(path: &Path) -> Result<DatabaseFile, StoreError> {
    let file = File::open(path)?;
    let decoder = GzDecoder::new(file);
    let mut reader = BufReader::new(decoder);
    Ok(deserialize_from(&mut reader)?)
}

fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn put_get_delete() {
        let dir = tempdir().unwrap();
        let mut store = Store::open(dir.path(), StoreConfig::default()).unwrap();
        assert!(store.is_empty());

        let record = store.put(DEFAULT_RECORD_ID, &json!({"rows": 3})).unwrap();
        assert!(record.timestamp.ends_with('Z'));
        let loaded = store.get(DEFAULT_RECORD_ID).unwrap();
        assert_eq!(loaded.data::<serde_json::Value>().unwrap(), json!({"rows": 3}));

        assert!(store.delete(DEFAULT_RECORD_ID).unwrap());
        assert!(!store.delete(DEFAULT_RECORD_ID).unwrap());
        assert!(store.get(DEFAULT_RECORD_ID).is_none());
    }

    #[test]
    fn records_survive_reopen() {
        let dir = tempdir().unwrap();
        {
            let mut store = Store::open(dir.path(), StoreConfig::default()).unwrap();
            store.put("a", &vec![1, 2, 3]).unwrap();
            store.put("b", "text").unwrap();
        }
        let store = Store::open(dir.path(), StoreConfig::default()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a").unwrap().data::<Vec<i32>>().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn clear_empties_only_the_configured_store() {
        let dir = tempdir().unwrap();
        let other_config = StoreConfig::new("SharedAppDB", 1, "other");
        let mut other = Store::open(dir.path(), other_config.clone()).unwrap();
        other.put("keep", &1).unwrap();
        drop(other);

        let mut store = Store::open(dir.path(), StoreConfig::default()).unwrap();
        store.put("x", &1).unwrap();
        store.clear().unwrap();
        assert!(store.is_empty());
        drop(store);

        let other = Store::open(dir.path(), other_config).unwrap();
        assert!(other.get("keep").is_some());
    }

    #[test]
    fn upgrade_keeps_records_and_downgrade_fails() {
        let dir = tempdir().unwrap();
        {
            let mut store = Store::open(dir.path(), StoreConfig::default()).unwrap();
            store.put("x", &true).unwrap();
        }
        let v2 = StoreConfig::new("SharedAppDB", 2, "appData");
        let upgraded = Store::open(dir.path(), v2).unwrap();
        assert!(upgraded.get("x").is_some());
        drop(upgraded);

        let err = Store::open(dir.path(), StoreConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            StoreError::VersionDowngrade { found: 2, requested: 1, .. }
        ));
    }

    #[test]
    fn database_names_map_to_safe_file_names() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::new("reports/2024", 1, "appData");
        let store = Store::open(dir.path(), config).unwrap();
        assert_eq!(store.path().file_name().unwrap(), "reports_2024.db.gz");
    }

    #[test]
    fn failed_write_leaves_records_untouched() {
        let dir = tempdir().unwrap();
        let db_dir = dir.path().join("db");
        let mut store = Store::open(&db_dir, StoreConfig::default()).unwrap();
        store.put("kept", &1).unwrap();
        fs::remove_dir_all(&db_dir).unwrap();

        assert!(store.put("k", &1).is_err());
        assert!(store.get("k").is_none());
        assert!(store.clear().is_err());
        assert!(store.get("kept").is_some());
        assert!(store.delete("kept").is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("SharedAppDB.db.gz"), b"not gzip").unwrap();
        assert!(Store::open(dir.path(), StoreConfig::default()).is_err());
    }
}
