//! # Store de Usuarios
//! src/store/mod.rs
//!
//! Contrato del almacenamiento de usuarios y sus tipos.
//!
//! - `sqlite`: implementación sobre SQLite (`rusqlite`)
//! - `bridge`: acceso serializado compartido entre workers
//!
//! Las contraseñas nunca salen del store: se guardan como SHA-256 en hex y
//! [`User`] no tiene campo de contraseña.

pub mod bridge;
pub mod sqlite;

pub use bridge::StoreBridge;
pub use sqlite::SqliteStore;

use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Usuario tal como se expone en la API
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: String,
}

/// Datos para crear un usuario (contraseña en claro, se hashea al guardar)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Cambios a aplicar; `None` deja el campo como está
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none()
    }
}

/// Columnas por las que se puede filtrar el listado
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterColumn {
    Id,
    Name,
    Email,
    CreatedAt,
}

impl FilterColumn {
    pub const ALL: [FilterColumn; 4] = [
        FilterColumn::Id,
        FilterColumn::Name,
        FilterColumn::Email,
        FilterColumn::CreatedAt,
    ];

    /// Sólo nombres de la lista blanca; cualquier otro se ignora
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.column() == name)
    }

    /// Nombre de la columna en SQL
    pub fn column(self) -> &'static str {
        match self {
            FilterColumn::Id => "id",
            FilterColumn::Name => "name",
            FilterColumn::Email => "email",
            FilterColumn::CreatedAt => "created_at",
        }
    }
}

/// Parámetros del listado
///
/// Todos los filtros son por subcadena (`LIKE %valor%`), incluido `id`:
/// `id=1` también devuelve los ids 10, 11, 21...
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuery {
    pub limit: u32,
    pub offset: u32,

    /// Subcadena buscada en `name` o `email`
    pub search: Option<String>,

    pub filters: Vec<(FilterColumn, String)>,
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            limit: 10,
            offset: 0,
            search: None,
            filters: Vec::new(),
        }
    }
}

/// Una página del listado más el total de filas que cumplen los filtros
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPage {
    pub users: Vec<User>,
    pub total: u64,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// Violación de unicidad (name o email repetido)
    #[error("Uniqueness conflict: {0}")]
    Conflict(String),

    #[error("Store is closed")]
    Closed,

    #[error("Database error: {0}")]
    Backend(#[from] rusqlite::Error),
}

/// Operaciones sobre usuarios
///
/// Las implementaciones no necesitan ser `Sync`: el acceso concurrente lo
/// serializa [`StoreBridge`].
pub trait UserStore: Send {
    fn create_user(&mut self, user: &NewUser) -> Result<User, StoreError>;

    fn get_user(&self, id: i64) -> Result<Option<User>, StoreError>;

    fn list_users(&self, query: &UserQuery) -> Result<UserPage, StoreError>;

    /// `Ok(None)` si el id no existe
    fn update_user(&mut self, id: i64, changes: &UserChanges) -> Result<Option<User>, StoreError>;

    /// `Ok(false)` si el id no existe
    fn delete_user(&mut self, id: i64) -> Result<bool, StoreError>;
}

/// SHA-256 en hexadecimal
pub fn hash_password(password: &str) -> String {
    let result = Sha256::digest(password.as_bytes());
    format!("{:x}", result)
}
