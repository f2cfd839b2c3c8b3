//! # Handlers
//!
//! Funciones que atienden cada ruta. Todas tienen la firma
//! [`Handler`](crate::router::Handler) y llegan al store sólo a través del
//! [`StoreBridge`](crate::store::StoreBridge) del contexto.
//!
//! - `users`: CRUD de `/api/users`
//! - `auth`: `/api/login` (verificación simulada)
//! - `static_files`: páginas y assets de `public/`
//! - `validate`: reglas de formato de los campos

pub mod auth;
pub mod static_files;
pub mod users;
pub mod validate;

use crate::http::{Response, StatusCode};
use crate::router::Router;
use crate::store::StoreError;
use thiserror::Error;

/// Errores que un handler de la API convierte en respuesta
///
/// El mensaje de cada variante es el que ve el cliente; los detalles
/// internos (errores de base de datos) sólo van al log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BadRequest,
            ApiError::Unauthorized(_) => StatusCode::Unauthorized,
            ApiError::NotFound(_) => StatusCode::NotFound,
            ApiError::Conflict(_) => StatusCode::Conflict,
            ApiError::Internal => StatusCode::InternalServerError,
        }
    }

    pub fn into_response(self) -> Response {
        Response::json_error(self.status(), &self.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(detail) => {
                log::debug!("Conflicto de unicidad: {}", detail);
                ApiError::Conflict("User with this name or email already exists".to_string())
            }
            other => {
                log::error!("Error del store: {}", other);
                ApiError::Internal
            }
        }
    }
}

/// Aplana el resultado de un handler de la API
pub(crate) fn respond(result: Result<Response, ApiError>) -> Response {
    result.unwrap_or_else(ApiError::into_response)
}

/// Registra todas las rutas del servidor
pub fn register_routes(router: &mut Router) {
    // Páginas y assets
    router.get("/", static_files::serve_static);
    router.get("/index.html", static_files::serve_static);
    router.get("/about", static_files::serve_static);
    router.get("/css/style.css", static_files::serve_static);
    router.get("/js/app.js", static_files::serve_static);

    // API
    router.get("/api/users", users::list_users);
    router.post("/api/users", users::create_user);
    router.get("/api/users/{id}", users::get_user);
    router.put("/api/users/{id}", users::update_user);
    router.patch("/api/users/{id}", users::patch_user);
    router.delete("/api/users/{id}", users::delete_user);
    router.post("/api/login", auth::login);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_status() {
        let conflict: ApiError = StoreError::Conflict("UNIQUE constraint failed".into()).into();
        assert_eq!(conflict.status(), StatusCode::Conflict);
        assert!(!conflict.to_string().contains("UNIQUE"));

        let closed: ApiError = StoreError::Closed.into();
        assert_eq!(closed.status(), StatusCode::InternalServerError);
    }

    #[test]
    fn test_api_error_response_is_structured_json() {
        let response = ApiError::NotFound("User not found".into()).into_response();
        let body = response.body_json().unwrap();

        assert_eq!(response.status(), StatusCode::NotFound);
        assert_eq!(body["error"], "Not Found");
        assert_eq!(body["message"], "User not found");
    }

    #[test]
    fn test_all_routes_registered() {
        let mut router = Router::new();
        register_routes(&mut router);
        assert_eq!(router.len(), 12);
    }
}
