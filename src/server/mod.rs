//! # Módulo del Servidor
//! src/server/mod.rs
//!
//! 1. Escucha en un puerto (socket2, SO_REUSEADDR)
//! 2. Acepta conexiones y las encola en el pool de workers
//! 3. Cada worker lee, parsea, enruta y responde un único request
//! 4. SIGINT/SIGTERM detienen el acceptor y disparan el apagado ordenado

pub mod signal;
pub mod tcp;

pub use tcp::{handle_connection, Server};
