//! # Contexto de la Aplicación
//! src/context.rs
//!
//! Dependencias compartidas que reciben todos los handlers. Se construye una
//! vez al arrancar y se comparte entre workers con un `Arc`.

use crate::store::StoreBridge;
use std::path::{Path, PathBuf};

pub struct AppContext {
    store: StoreBridge,
    public_dir: PathBuf,
}

impl AppContext {
    pub fn new(store: StoreBridge, public_dir: impl AsRef<Path>) -> Self {
        Self {
            store,
            public_dir: public_dir.as_ref().to_path_buf(),
        }
    }

    pub fn store(&self) -> &StoreBridge {
        &self.store
    }

    /// Directorio de archivos estáticos
    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }

    #[cfg(test)]
    pub(crate) fn in_memory_for_tests() -> Self {
        let store = crate::store::SqliteStore::open_in_memory().unwrap();
        Self::new(StoreBridge::new(store), "./public")
    }
}
