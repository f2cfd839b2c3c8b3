//! # Parsing de Requests HTTP
//! src/http/request.rs
//!
//! Parser de una sola pasada sobre el buffer recibido en un único `read`.
//!
//! ## Formato
//!
//! ```text
//! POST /api/users?x=1 HTTP/1.1\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 52\r\n
//! \r\n
//! {"name":"alice_1","email":"a@b.co","password":"secret1"}
//! ```
//!
//! ## Pasos
//!
//! 1. Límite de tamaño total ([`MAX_REQUEST_SIZE`])
//! 2. Request line: método, path y versión opcional (por defecto `HTTP/1.1`)
//! 3. Rechazo de paths con `..` junto a un separador o bytes nulos
//! 4. Separación clean path / query string
//! 5. Query params decodificados (ver [`super::query`])
//! 6. `Content-Length` validado
//! 7. Body completo en el mismo buffer (no hay lecturas adicionales)

use super::query::{self, QueryParam};
use thiserror::Error;

/// Tamaño máximo de un request completo (headers + body)
pub const MAX_REQUEST_SIZE: usize = 8192;

/// Longitud máxima del token de método
pub const MAX_METHOD_LENGTH: usize = 15;

/// Longitud máxima del path crudo; también acota la query
pub const MAX_PATH_LENGTH: usize = 255;

/// Longitud máxima del token de versión
pub const MAX_VERSION_LENGTH: usize = 15;

const DEFAULT_VERSION: &str = "HTTP/1.1";

/// Métodos HTTP
///
/// Cualquier otro token se conserva en `Other` para que el router
/// pueda responder 405.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
    Other(String),
}

impl Method {
    fn from_token(token: &str) -> Self {
        match token {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "PATCH" => Method::PATCH,
            "DELETE" => Method::DELETE,
            other => Method::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::PATCH => "PATCH",
            Method::DELETE => "DELETE",
            Method::Other(token) => token,
        }
    }

    /// `false` para métodos que el servidor no reconoce
    pub fn is_known(&self) -> bool {
        !matches!(self, Method::Other(_))
    }
}

/// Razones por las que se rechaza un request
///
/// Cualquiera de ellas implica cerrar la conexión sin responder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Request too large: {0} bytes")]
    TooLarge(usize),

    #[error("Empty request")]
    EmptyRequest,

    #[error("Request head is not valid UTF-8")]
    InvalidEncoding,

    #[error("Invalid request line format")]
    InvalidRequestLine,

    #[error("Request line token too long: {0}")]
    TokenTooLong(&'static str),

    #[error("Unsafe path detected: {0}")]
    UnsafePath(String),

    #[error("Invalid Content-Length header: {0}")]
    InvalidContentLength(String),

    #[error("Incomplete request body: expected {expected} bytes, got {available}")]
    IncompleteBody { expected: usize, available: usize },
}

/// Request HTTP parseado
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,

    /// Path tal como llegó (con query)
    path: String,

    /// Path sin la query
    clean_path: String,

    /// Texto crudo después de `?`
    query_string: String,

    query_params: Vec<QueryParam>,

    /// Parámetros extraídos de un patrón `{name}` por el router
    url_params: Vec<(String, String)>,

    headers: Vec<(String, String)>,

    version: String,

    body: Option<Vec<u8>>,

    content_length: usize,
}

impl Request {
    /// Parsea un request desde bytes
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use users_server::http::Request;
    ///
    /// let raw = b"GET /api/users?limit=2 HTTP/1.1\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.clean_path(), "/api/users");
    /// assert_eq!(request.query_param("limit"), Some("2"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        if buffer.len() > MAX_REQUEST_SIZE {
            return Err(ParseError::TooLarge(buffer.len()));
        }

        let (head_bytes, body_start) = match find_subslice(buffer, b"\r\n\r\n") {
            Some(pos) => (&buffer[..pos], Some(pos + 4)),
            None => (buffer, None),
        };

        let head = std::str::from_utf8(head_bytes).map_err(|_| ParseError::InvalidEncoding)?;
        if head.trim().is_empty() {
            return Err(ParseError::EmptyRequest);
        }

        let mut lines = head.lines();
        let request_line = lines.next().ok_or(ParseError::InvalidRequestLine)?;
        let (method, path, version) = Self::parse_request_line(request_line)?;

        if !is_safe_path(&path) {
            return Err(ParseError::UnsafePath(path));
        }

        let (clean_path, query_string) = match path.split_once('?') {
            Some((clean, query)) => (clean.to_string(), query.to_string()),
            None => (path.clone(), String::new()),
        };
        let query_params = query::parse_query_string(&query_string);

        let headers = Self::parse_headers(lines);
        let content_length = Self::content_length_from(&headers)?;

        let body = if content_length > 0 {
            let start = body_start.ok_or(ParseError::IncompleteBody {
                expected: content_length,
                available: 0,
            })?;
            let available = buffer.len() - start;
            if available < content_length {
                return Err(ParseError::IncompleteBody {
                    expected: content_length,
                    available,
                });
            }
            Some(buffer[start..start + content_length].to_vec())
        } else {
            None
        };

        Ok(Request {
            method,
            path,
            clean_path,
            query_string,
            query_params,
            url_params: Vec::new(),
            headers,
            version,
            body,
            content_length,
        })
    }

    /// `METHOD PATH [VERSION]`, tokens separados por espacios
    fn parse_request_line(line: &str) -> Result<(Method, String, String), ParseError> {
        let mut tokens = line.split_whitespace();

        let method = tokens.next().ok_or(ParseError::InvalidRequestLine)?;
        let path = tokens.next().ok_or(ParseError::InvalidRequestLine)?;
        let version = tokens.next().unwrap_or(DEFAULT_VERSION);

        if method.len() > MAX_METHOD_LENGTH {
            return Err(ParseError::TokenTooLong("method"));
        }
        if path.len() > MAX_PATH_LENGTH {
            return Err(ParseError::TokenTooLong("path"));
        }
        if version.len() > MAX_VERSION_LENGTH {
            return Err(ParseError::TokenTooLong("version"));
        }

        Ok((Method::from_token(method), path.to_string(), version.to_string()))
    }

    /// Headers `Name: Value`; las líneas sin `:` se ignoran
    fn parse_headers<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<(String, String)> {
        let mut headers = Vec::new();

        for line in lines {
            if line.trim().is_empty() {
                break;
            }
            match line.split_once(':') {
                Some((name, value)) => {
                    headers.push((name.trim().to_string(), value.trim().to_string()));
                }
                None => log::debug!("Header sin ':' ignorado: {}", line),
            }
        }

        headers
    }

    fn content_length_from(headers: &[(String, String)]) -> Result<usize, ParseError> {
        let raw = match headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("Content-Length"))
        {
            Some((_, value)) => value,
            None => return Ok(0),
        };

        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::InvalidContentLength(raw.clone()));
        }

        match raw.parse::<usize>() {
            Ok(length) if length <= MAX_REQUEST_SIZE => Ok(length),
            _ => Err(ParseError::InvalidContentLength(raw.clone())),
        }
    }

    // === Acceso a los campos ===

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path crudo, incluida la query
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path sin query; es el que usa el router
    pub fn clean_path(&self) -> &str {
        &self.clean_path
    }

    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    pub fn query_params(&self) -> &[QueryParam] {
        &self.query_params
    }

    /// Primer valor para `key` en la query
    pub fn query_param(&self, key: &str) -> Option<&str> {
        query::find_param(&self.query_params, key)
    }

    pub fn url_params(&self) -> &[(String, String)] {
        &self.url_params
    }

    /// Valor de un parámetro `{key}` del patrón que hizo match
    pub fn url_param(&self, key: &str) -> Option<&str> {
        self.url_params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn set_url_params(&mut self, params: Vec<(String, String)>) {
        self.url_params = params;
    }

    /// Header por nombre (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Body, presente sólo si `Content-Length > 0`
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn content_length(&self) -> usize {
        self.content_length
    }
}

/// `..` pegado a un separador o byte nulo ⇒ inseguro
fn is_safe_path(path: &str) -> bool {
    const TRAVERSALS: [&str; 4] = ["../", "..\\", "/..", "\\.."];

    if path.contains('\0') {
        return false;
    }
    !TRAVERSALS.iter().any(|pattern| path.contains(pattern))
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_get() {
        let request = Request::parse(b"GET / HTTP/1.1\r\n\r\n").unwrap();

        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.path(), "/");
        assert_eq!(request.clean_path(), "/");
        assert!(request.query_params().is_empty());
        assert!(request.body().is_none());
    }

    #[test]
    fn test_missing_version_defaults() {
        let request = Request::parse(b"GET /about\r\n\r\n").unwrap();
        assert_eq!(request.version(), "HTTP/1.1");
    }

    #[test]
    fn test_version_is_kept() {
        let request = Request::parse(b"GET / HTTP/1.0\r\n\r\n").unwrap();
        assert_eq!(request.version(), "HTTP/1.0");
    }

    #[test]
    fn test_clean_path_and_query() {
        let request = Request::parse(b"GET /api/users?limit=2&offset=0&name=ali HTTP/1.1\r\n\r\n").unwrap();

        assert_eq!(request.path(), "/api/users?limit=2&offset=0&name=ali");
        assert_eq!(request.clean_path(), "/api/users");
        assert_eq!(request.query_string(), "limit=2&offset=0&name=ali");
        assert_eq!(request.query_param("limit"), Some("2"));
        assert_eq!(request.query_param("name"), Some("ali"));
    }

    #[test]
    fn test_unknown_method_is_preserved() {
        let request = Request::parse(b"OPTIONS / HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.method(), &Method::Other("OPTIONS".to_string()));
        assert!(!request.method().is_known());
    }

    #[test]
    fn test_headers_and_body() {
        let raw = b"POST /api/users HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\n\r\nhello";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.header("host"), Some("localhost"));
        assert_eq!(request.content_length(), 5);
        assert_eq!(request.body(), Some(&b"hello"[..]));
    }

    #[test]
    fn test_body_is_cut_to_content_length() {
        let raw = b"POST /x HTTP/1.1\r\nContent-Length: 3\r\n\r\nabcdef";
        let request = Request::parse(raw).unwrap();
        assert_eq!(request.body(), Some(&b"abc"[..]));
    }

    #[test]
    fn test_zero_content_length_ignores_body() {
        let raw = b"POST /x HTTP/1.1\r\nContent-Length: 0\r\n\r\nignored";
        let request = Request::parse(raw).unwrap();
        assert!(request.body().is_none());
        assert_eq!(request.content_length(), 0);
    }

    #[test]
    fn test_incomplete_body() {
        let raw = b"POST /x HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc";
        assert_eq!(
            Request::parse(raw).unwrap_err(),
            ParseError::IncompleteBody { expected: 10, available: 3 }
        );
    }

    #[test]
    fn test_content_length_without_terminator() {
        let raw = b"POST /x HTTP/1.1\r\nContent-Length: 4";
        assert!(matches!(Request::parse(raw), Err(ParseError::IncompleteBody { .. })));
    }

    #[test]
    fn test_invalid_content_length() {
        for value in ["-1", "abc", "12abc", "", "99999999"] {
            let raw = format!("POST /x HTTP/1.1\r\nContent-Length: {}\r\n\r\n", value);
            assert!(
                matches!(Request::parse(raw.as_bytes()), Err(ParseError::InvalidContentLength(_))),
                "value {:?} should be rejected",
                value
            );
        }
    }

    #[test]
    fn test_too_large() {
        let raw = vec![b'a'; MAX_REQUEST_SIZE + 1];
        assert_eq!(Request::parse(&raw).unwrap_err(), ParseError::TooLarge(MAX_REQUEST_SIZE + 1));
    }

    #[test]
    fn test_unsafe_paths() {
        for path in ["/../etc/passwd", "/css/../../x", "/a/..", "/..\\x"] {
            let raw = format!("GET {} HTTP/1.1\r\n\r\n", path);
            assert!(
                matches!(Request::parse(raw.as_bytes()), Err(ParseError::UnsafePath(_))),
                "path {} should be rejected",
                path
            );
        }
    }

    #[test]
    fn test_null_byte_in_path() {
        let raw = b"GET /a\0b HTTP/1.1\r\n\r\n";
        assert!(matches!(Request::parse(raw), Err(ParseError::UnsafePath(_))));
    }

    #[test]
    fn test_dots_inside_segment_are_allowed() {
        let request = Request::parse(b"GET /file..txt HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.clean_path(), "/file..txt");
    }

    #[test]
    fn test_query_counts_toward_path_length() {
        let raw = format!("GET /x?{} HTTP/1.1\r\n\r\n", "a".repeat(MAX_PATH_LENGTH - 2));
        assert_eq!(Request::parse(raw.as_bytes()).unwrap_err(), ParseError::TokenTooLong("path"));

        let raw = format!("GET /x?{} HTTP/1.1\r\n\r\n", "a".repeat(MAX_PATH_LENGTH - 3));
        let request = Request::parse(raw.as_bytes()).unwrap();
        assert_eq!(request.path().len(), MAX_PATH_LENGTH);
    }

    #[test]
    fn test_token_too_long() {
        let raw = format!("{} / HTTP/1.1\r\n\r\n", "M".repeat(MAX_METHOD_LENGTH + 1));
        assert_eq!(Request::parse(raw.as_bytes()).unwrap_err(), ParseError::TokenTooLong("method"));
    }

    #[test]
    fn test_empty_request() {
        assert_eq!(Request::parse(b"").unwrap_err(), ParseError::EmptyRequest);
        assert_eq!(Request::parse(b"  \r\n").unwrap_err(), ParseError::EmptyRequest);
    }

    #[test]
    fn test_invalid_request_line() {
        assert_eq!(Request::parse(b"GET\r\n\r\n").unwrap_err(), ParseError::InvalidRequestLine);
    }

    #[test]
    fn test_invalid_utf8_head() {
        assert_eq!(
            Request::parse(b"\xff\xfe / HTTP/1.1\r\n\r\n").unwrap_err(),
            ParseError::InvalidEncoding
        );
    }
}
