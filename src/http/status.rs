//! # Códigos de Estado HTTP
//! src/http/status.rs
//!
//! Códigos que puede devolver el servidor. Todos los errores que llegan al
//! cliente pasan por uno de estos valores:
//!
//! - **2xx**: 200 (lectura/actualización), 201 (usuario creado)
//! - **4xx**: 400 (validación), 401 (login), 404, 405, 409 (unicidad)
//! - **5xx**: 500 (fallo del store o de lectura de archivos)

/// Códigos de estado HTTP soportados
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok = 200,

    /// 201 Created - Recurso creado (POST /api/users)
    Created = 201,

    /// 400 Bad Request - Validación de entrada fallida
    BadRequest = 400,

    /// 401 Unauthorized - Credenciales vacías en /api/login
    Unauthorized = 401,

    /// 404 Not Found - Ruta o usuario inexistente
    NotFound = 404,

    /// 405 Method Not Allowed - Ruta conocida, método sin handler
    MethodNotAllowed = 405,

    /// 409 Conflict - Violación de unicidad (name/email)
    Conflict = 409,

    /// 500 Internal Server Error
    InternalServerError = 500,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use users_server::http::StatusCode;
    /// assert_eq!(StatusCode::Created.as_u16(), 201);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Texto de razón asociado al código
    ///
    /// También se usa como valor del campo `"error"` en los bodies JSON.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::Conflict => "Conflict",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }

    /// Verifica si el código indica éxito (2xx)
    pub fn is_success(&self) -> bool {
        matches!(self, StatusCode::Ok | StatusCode::Created)
    }

    /// Verifica si el código indica error del cliente (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.as_u16())
    }

    /// Verifica si el código indica error del servidor (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.as_u16())
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
