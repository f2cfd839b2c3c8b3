//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! API para construir respuestas y serializarlas a bytes.
//!
//! ## Formato
//!
//! ```text
//! HTTP/1.1 201 Created\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 61\r\n
//! Connection: close\r\n
//! Server: users-server\r\n
//! \r\n
//! {"id":1,"name":"alice_1","email":"a@b.co","created_at":"..."}
//! ```
//!
//! `Content-Type`, `Content-Length` y `Connection` siempre se escriben en ese
//! orden; el resto de headers va detrás en orden de inserción. Todas las
//! respuestas cierran la conexión.

use super::StatusCode;
use serde_json::Value;

const DEFAULT_CONTENT_TYPE: &str = "text/html";

/// Respuesta HTTP completa
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,

    content_type: String,

    /// Headers adicionales en orden de inserción
    headers: Vec<(String, String)>,

    body: Vec<u8>,
}

impl Response {
    /// Crea una respuesta vacía con `Content-Type: text/html`
    ///
    /// # Ejemplo
    /// ```
    /// use users_server::http::{Response, StatusCode};
    ///
    /// let response = Response::new(StatusCode::Ok);
    /// assert!(response.body().is_empty());
    /// ```
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Agrega un header (si ya existe, se sobrescribe)
    ///
    /// `Content-Type` se guarda aparte; `Content-Length` y `Connection` se
    /// calculan al serializar y se ignoran aquí.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Versión mutable de [`Response::with_header`]
    pub fn add_header(&mut self, name: &str, value: &str) {
        if name.eq_ignore_ascii_case("Content-Type") {
            self.content_type = value.to_string();
            return;
        }
        if name.eq_ignore_ascii_case("Content-Length") || name.eq_ignore_ascii_case("Connection") {
            return;
        }

        match self.headers.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    /// Establece el body desde un string
    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.as_bytes().to_vec();
        self
    }

    /// Establece el body desde bytes (archivos estáticos)
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Respuesta JSON con el status indicado
    ///
    /// # Ejemplo
    /// ```
    /// use users_server::http::{Response, StatusCode};
    /// use serde_json::json;
    ///
    /// let response = Response::json(StatusCode::Created, &json!({"id": 1}));
    /// assert_eq!(response.body(), br#"{"id":1}"#);
    /// ```
    pub fn json(status: StatusCode, value: &Value) -> Self {
        Self::new(status)
            .with_header("Content-Type", "application/json")
            .with_body(&value.to_string())
    }

    /// Error JSON estructurado: `{"error": "<reason>", "message": "..."}`
    ///
    /// El mensaje se escapa correctamente al serializar.
    pub fn json_error(status: StatusCode, message: &str) -> Self {
        let body = serde_json::json!({
            "error": status.reason_phrase(),
            "message": message,
        });
        Self::json(status, &body)
    }

    /// Página HTML con el status indicado
    pub fn html(status: StatusCode, body: &str) -> Self {
        Self::new(status)
            .with_header("Content-Type", DEFAULT_CONTENT_TYPE)
            .with_body(body)
    }

    /// Página de error HTML mínima
    pub fn html_error(status: StatusCode, message: &str) -> Self {
        let body = format!(
            "<!DOCTYPE html>\n\
             <html>\n\
             <head><title>{status}</title></head>\n\
             <body>\n\
             <h1>{status}</h1>\n\
             <p>{message}</p>\n\
             <p><a href=\"/\">Go back to home</a></p>\n\
             </body>\n\
             </html>\n",
            status = status,
            message = html_escape::encode_text(message),
        );
        Self::html(status, &body)
    }

    /// Serializa la respuesta completa
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n",
            self.status,
            self.content_type,
            self.body.len()
        );

        for (name, value) in &self.headers {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }
        head.push_str("\r\n");

        let mut result = head.into_bytes();
        result.extend_from_slice(&self.body);
        result
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Busca un header adicional (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        if name.eq_ignore_ascii_case("Content-Type") {
            return Some(&self.content_type);
        }
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body parseado como JSON (usado en tests y logs)
    pub fn body_json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }
}
