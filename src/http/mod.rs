//! # Módulo HTTP
//!
//! Implementación mínima del protocolo, sin librerías de alto nivel:
//!
//! - Parsing de requests en una sola pasada (un único buffer por conexión)
//! - Decodificación de query strings
//! - Construcción de responses (siempre `Connection: close`)
//! - Códigos de estado
//!
//! No hay keep-alive, chunked encoding ni pipelining: cada conexión lleva
//! exactamente un request y una respuesta.

pub mod query;
pub mod request;
pub mod response;
pub mod status;

pub use query::QueryParam;
pub use request::{Method, ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
