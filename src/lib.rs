//! # Users Server
//! src/lib.rs
//!
//! Servidor HTTP con una API CRUD de usuarios sobre SQLite y archivos
//! estáticos, implementado sobre sockets bloqueantes y un pool fijo de
//! workers.
//!
//! ## Arquitectura
//!
//! ```text
//! Acceptor → WorkerPool → Request::parse → Router → Handler → StoreBridge
//!                                                      ↓
//!                                              Response → socket → close
//! ```
//!
//! - `http`: parsing de requests y construcción de respuestas
//! - `router`: patrones de path y despacho por método
//! - `workers`: pool de threads con cola circular acotada
//! - `store`: contrato del almacenamiento, SQLite y acceso serializado
//! - `handlers`: endpoints de la API y archivos estáticos
//! - `server`: listener TCP, atención de conexiones y señales
//! - `config`, `context`, `error`: configuración, dependencias compartidas
//!   y errores de arranque
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use users_server::config::Config;
//! use users_server::server::Server;
//!
//! let config = Config::from_args();
//! let server = Server::new(config).unwrap();
//! server.run().unwrap();
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod http;
pub mod router;
pub mod server;
pub mod store;
pub mod workers;
