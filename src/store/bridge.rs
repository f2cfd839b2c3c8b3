//! # Puente al Store
//! src/store/bridge.rs
//!
//! Todo acceso al store pasa por [`StoreBridge::with_store_lock`], que toma un
//! único `Mutex`. Así dos workers nunca ejecutan operaciones sobre la base al
//! mismo tiempo, aunque la conexión subyacente no sea `Sync`.
//!
//! Tras [`StoreBridge::close`] cualquier llamada devuelve
//! [`StoreError::Closed`].

use super::{StoreError, UserStore};
use std::sync::{Arc, Mutex, MutexGuard};

type SharedStore = Arc<Mutex<Option<Box<dyn UserStore>>>>;

/// Handle clonable al store compartido
#[derive(Clone)]
pub struct StoreBridge {
    inner: SharedStore,
}

impl StoreBridge {
    pub fn new<S: UserStore + 'static>(store: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(Box::new(store)))),
        }
    }

    /// Ejecuta `f` con acceso exclusivo al store
    ///
    /// # Ejemplo
    /// ```
    /// use users_server::store::{SqliteStore, StoreBridge, UserQuery};
    ///
    /// let bridge = StoreBridge::new(SqliteStore::open_in_memory().unwrap());
    /// let page = bridge
    ///     .with_store_lock(|store| store.list_users(&UserQuery::default()))
    ///     .unwrap();
    /// assert_eq!(page.total, 0);
    /// ```
    pub fn with_store_lock<R, F>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut dyn UserStore) -> Result<R, StoreError>,
    {
        let mut guard = self.lock();
        match guard.as_mut() {
            Some(store) => f(store.as_mut()),
            None => Err(StoreError::Closed),
        }
    }

    /// Libera el store. Es idempotente.
    pub fn close(&self) {
        let mut guard = self.lock();
        if guard.take().is_some() {
            log::info!("Store cerrado");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.lock().is_none()
    }

    /// Si un handler hizo panic con el lock tomado, el lock queda envenenado.
    /// Cada operación de SQLite es atómica, así que se recupera y se sigue.
    fn lock(&self) -> MutexGuard<'_, Option<Box<dyn UserStore>>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Lock del store envenenado, recuperando");
                self.inner.clear_poison();
                poisoned.into_inner()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{NewUser, SqliteStore};
    use std::thread;

    fn bridge() -> StoreBridge {
        StoreBridge::new(SqliteStore::open_in_memory().unwrap())
    }

    fn new_user(i: usize) -> NewUser {
        NewUser {
            name: format!("user_{}", i),
            email: format!("user{}@example.com", i),
            password: "pw_123".to_string(),
        }
    }

    #[test]
    fn test_concurrent_creates_are_serialized() {
        let bridge = bridge();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let bridge = bridge.clone();
                thread::spawn(move || bridge.with_store_lock(|s| s.create_user(&new_user(i))))
            })
            .collect();

        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        let total = bridge
            .with_store_lock(|s| s.list_users(&Default::default()))
            .unwrap()
            .total;
        assert_eq!(total, 8);
    }

    #[test]
    fn test_closed_store_returns_error() {
        let bridge = bridge();
        bridge.close();
        bridge.close();

        assert!(bridge.is_closed());
        let result = bridge.with_store_lock(|s| s.get_user(1));
        assert!(matches!(result, Err(StoreError::Closed)));
    }

    #[test]
    fn test_recovers_from_poisoned_lock() {
        let bridge = bridge();
        let b = bridge.clone();
        let _ = thread::spawn(move || {
            let _ = b.with_store_lock(|_store| -> Result<(), StoreError> { panic!("handler crash") });
        })
        .join();

        let created = bridge.with_store_lock(|s| s.create_user(&new_user(1)));
        assert!(created.is_ok());
    }
}
