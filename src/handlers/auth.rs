//! # Login
//! src/handlers/auth.rs
//!
//! Verificación de credenciales simulada: cualquier body no vacío se acepta.
//! No hay sesiones; el token devuelto es fijo.

use super::{respond, ApiError};
use crate::context::AppContext;
use crate::http::{Request, Response, StatusCode};
use serde_json::json;

pub const STUB_TOKEN: &str = "fake_jwt_token_123";

/// POST /api/login
pub fn login(req: &Request, _ctx: &AppContext) -> Response {
    respond(login_inner(req))
}

fn login_inner(req: &Request) -> Result<Response, ApiError> {
    match req.body() {
        Some(body) if !body.is_empty() => {
            log::info!("Login aceptado ({} bytes)", body.len());
            Ok(Response::json(
                StatusCode::Ok,
                &json!({
                    "message": "Login successful",
                    "token": STUB_TOKEN,
                }),
            ))
        }
        _ => Err(ApiError::Unauthorized(
            "Username and password are required".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_with_body() {
        let ctx = AppContext::in_memory_for_tests();
        let raw = b"POST /api/login HTTP/1.1\r\nContent-Length: 2\r\n\r\n{}";
        let response = login(&Request::parse(raw).unwrap(), &ctx);

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.body_json().unwrap()["token"], STUB_TOKEN);
    }

    #[test]
    fn test_login_without_body_is_401() {
        let ctx = AppContext::in_memory_for_tests();
        let raw = b"POST /api/login HTTP/1.1\r\n\r\n";
        let response = login(&Request::parse(raw).unwrap(), &ctx);

        assert_eq!(response.status(), StatusCode::Unauthorized);
        assert_eq!(response.body_json().unwrap()["error"], "Unauthorized");
    }
}
