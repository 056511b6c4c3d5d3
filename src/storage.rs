//! File-backed module storage.
//!
//! One JSON file holds an object per module. Modules mutate their own map
//! through [`ModuleStorage::get_data`] and persist with
//! [`ModuleStorage::sync`], which rewrites the whole file atomically.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

/// A module's persistent key/value map.
pub type ModuleData = Map<String, Value>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage file {path} is not a JSON object of module objects: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// The storage file and its in-memory contents.
#[derive(Debug)]
pub struct Storage {
    path: PathBuf,
    data: Mutex<BTreeMap<String, ModuleData>>,
    /// Held for the duration of a file write.
    write_lock: Mutex<()>,
}

impl Storage {
    /// Load `path`. A missing or blank file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Arc<Self>, StorageError> {
        let path = path.as_ref();
        let data = match fs::read(path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StorageError::Corrupt {
                path: path.to_path_buf(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No storage file yet, starting empty");
                BTreeMap::new()
            }
            Err(e) => return Err(StorageError::io(path, e)),
        };

        Ok(Arc::new(Self {
            path: path.to_path_buf(),
            data: Mutex::new(data),
            write_lock: Mutex::new(()),
        }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Handle for one module's slot.
    pub fn module(self: &Arc<Self>, name: &str) -> ModuleStorage {
        self.data.lock().entry(name.to_string()).or_default();
        ModuleStorage {
            name: name.to_string(),
            storage: Arc::clone(self),
        }
    }

    /// Names of modules with stored data.
    pub fn modules(&self) -> Vec<String> {
        self.data.lock().keys().cloned().collect()
    }

    fn persist(&self) -> Result<(), StorageError> {
        let _writing = self.write_lock.lock();
        let bytes = {
            let data = self.data.lock();
            serde_json::to_vec_pretty(&*data).map_err(|source| StorageError::Corrupt {
                path: self.path.clone(),
                source,
            })?
        };

        let temp_path = self.path.with_extension("json.tmp");
        let file = File::create(&temp_path).map_err(|e| StorageError::io(&temp_path, e))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(&bytes)
            .and_then(|()| writer.flush())
            .map_err(|e| StorageError::io(&temp_path, e))?;
        drop(writer);

        fs::rename(&temp_path, &self.path).map_err(|e| StorageError::io(&self.path, e))?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "Storage synced");
        Ok(())
    }
}

/// One module's view of the store.
#[derive(Debug, Clone)]
pub struct ModuleStorage {
    name: String,
    storage: Arc<Storage>,
}

impl ModuleStorage {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lock and borrow the module's map.
    ///
    /// Drop the guard before calling [`sync`](Self::sync).
    pub fn get_data(&self) -> MappedMutexGuard<'_, ModuleData> {
        MutexGuard::map(self.storage.data.lock(), |data| {
            data.entry(self.name.clone()).or_default()
        })
    }

    /// Write the whole store to disk. Blocks until the file is replaced.
    pub fn sync(&self) -> Result<(), StorageError> {
        self.storage.persist()
    }
}
