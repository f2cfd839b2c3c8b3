//! # Errores de Arranque
//! src/error.rs
//!
//! Fallos que impiden levantar el servidor. `main` los registra y sale con
//! código 1. Los errores por request no llegan aquí: se convierten en
//! respuestas o en un cierre de conexión.

use crate::store::StoreError;
use crate::workers::PoolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid bind address {0}")]
    Address(String),

    #[error("Failed to bind/listen on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open store: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to start worker pool: {0}")]
    Pool(#[from] PoolError),

    #[error("Failed to install signal handler: {0}")]
    Signal(std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
