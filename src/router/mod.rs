//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Mapea (método, path) a handlers.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router → Handler(&Request, &AppContext) → Response
//! ```
//!
//! La tabla se construye una vez al arrancar y después sólo se lee, por lo
//! que se comparte entre workers con un `Arc` sin locks.
//!
//! ## Orden de resolución
//!
//! 1. Método desconocido → 405.
//! 2. Rutas literales (`/`, `/about`, `/api/users`, ...).
//! 3. Rutas con parámetros (`/api/users/{id}`).
//! 4. Si el path coincidió con alguna ruta pero ninguna acepta el método → 405.
//! 5. Si no → 404.
//!
//! Una ruta literal nunca queda tapada por un patrón con placeholder.
//! Los errores son JSON bajo `/api/` y HTML en el resto.

pub mod pattern;

pub use pattern::{extract_params, match_path, PathPattern, PatternError};

use crate::context::AppContext;
use crate::http::{Method, Request, Response, StatusCode};

/// Valor del header `Server` en todas las respuestas
pub const SERVER_NAME: &str = "users-server/0.1";

/// Firma de los handlers
///
/// Reciben el request (con los parámetros de URL ya extraídos) y el contexto
/// compartido con el store.
pub type Handler = fn(&Request, &AppContext) -> Response;

struct Route {
    method: Method,
    pattern: PathPattern,
    handler: Handler,
}

/// Tabla de rutas
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registra una ruta
    ///
    /// # Ejemplo
    /// ```
    /// use users_server::context::AppContext;
    /// use users_server::http::{Method, Request, Response, StatusCode};
    /// use users_server::router::Router;
    ///
    /// fn hello(_req: &Request, _ctx: &AppContext) -> Response {
    ///     Response::html(StatusCode::Ok, "hello")
    /// }
    ///
    /// let mut router = Router::new();
    /// router.register(Method::GET, "/hello", hello);
    /// assert_eq!(router.len(), 1);
    /// ```
    pub fn register(&mut self, method: Method, pattern: &str, handler: Handler) {
        self.routes.push(Route {
            method,
            pattern: PathPattern::parse(pattern),
            handler,
        });
    }

    pub fn get(&mut self, pattern: &str, handler: Handler) {
        self.register(Method::GET, pattern, handler);
    }

    pub fn post(&mut self, pattern: &str, handler: Handler) {
        self.register(Method::POST, pattern, handler);
    }

    pub fn put(&mut self, pattern: &str, handler: Handler) {
        self.register(Method::PUT, pattern, handler);
    }

    pub fn patch(&mut self, pattern: &str, handler: Handler) {
        self.register(Method::PATCH, pattern, handler);
    }

    pub fn delete(&mut self, pattern: &str, handler: Handler) {
        self.register(Method::DELETE, pattern, handler);
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Resuelve el request y ejecuta el handler que corresponda
    ///
    /// Toma el request por valor para poder guardar en él los parámetros
    /// de URL antes de pasárselo al handler.
    pub fn route(&self, mut request: Request, ctx: &AppContext) -> Response {
        let mut response = self.dispatch(&mut request, ctx);
        add_common_headers(&mut response);
        response
    }

    fn dispatch(&self, request: &mut Request, ctx: &AppContext) -> Response {
        let path = request.clean_path().to_string();

        if !request.method().is_known() {
            log::debug!("Método no soportado: {}", request.method().as_str());
            return error_response(&path, StatusCode::MethodNotAllowed, "Method not allowed");
        }

        let mut path_known = false;

        for route in self.routes.iter().filter(|r| r.pattern.is_literal()) {
            if route.pattern.matches(&path) {
                path_known = true;
                if route.method == *request.method() {
                    request.set_url_params(Vec::new());
                    return (route.handler)(request, ctx);
                }
            }
        }

        for route in self.routes.iter().filter(|r| !r.pattern.is_literal()) {
            if !route.pattern.matches(&path) {
                continue;
            }
            path_known = true;
            if route.method != *request.method() {
                continue;
            }

            return match route.pattern.extract(&path) {
                Ok(params) => {
                    request.set_url_params(params);
                    (route.handler)(request, ctx)
                }
                Err(e) => {
                    log::debug!("Parámetros de URL inválidos en {}: {}", path, e);
                    error_response(&path, StatusCode::BadRequest, &e.to_string())
                }
            };
        }

        if path_known {
            error_response(&path, StatusCode::MethodNotAllowed, "Method not allowed")
        } else {
            error_response(&path, StatusCode::NotFound, "The requested resource was not found")
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// `true` para rutas de la API, que responden errores en JSON
pub fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

/// Respuesta de error con el formato adecuado al tipo de ruta
pub fn error_response(path: &str, status: StatusCode, message: &str) -> Response {
    if is_api_path(path) {
        Response::json_error(status, message)
    } else {
        Response::html_error(status, message)
    }
}

fn add_common_headers(response: &mut Response) {
    response.add_header("Server", SERVER_NAME);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Request;

    fn ok_handler(_req: &Request, _ctx: &AppContext) -> Response {
        Response::html(StatusCode::Ok, "literal")
    }

    fn param_handler(req: &Request, _ctx: &AppContext) -> Response {
        let id = req.url_param("id").unwrap_or("none");
        Response::html(StatusCode::Ok, &format!("param:{}", id))
    }

    fn route_raw(router: &Router, raw: &[u8]) -> Response {
        let ctx = AppContext::in_memory_for_tests();
        let request = Request::parse(raw).unwrap();
        router.route(request, &ctx)
    }

    fn body_text(response: &Response) -> String {
        String::from_utf8(response.body().to_vec()).unwrap()
    }

    #[test]
    fn test_router_creation() {
        let router = Router::new();
        assert!(router.is_empty());
    }

    #[test]
    fn test_route_found() {
        let mut router = Router::new();
        router.get("/about", ok_handler);

        let response = route_raw(&router, b"GET /about HTTP/1.1\r\n\r\n");
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.header("Server"), Some(SERVER_NAME));
    }

    #[test]
    fn test_query_string_does_not_affect_literal_match() {
        let mut router = Router::new();
        router.get("/about", ok_handler);

        let response = route_raw(&router, b"GET /about?x=1&y=2 HTTP/1.1\r\n\r\n");
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(body_text(&response), "literal");
    }

    #[test]
    fn test_literal_wins_over_placeholder() {
        let mut router = Router::new();
        router.get("/api/users/{id}", param_handler);
        router.get("/api/users/me", ok_handler);

        let response = route_raw(&router, b"GET /api/users/me HTTP/1.1\r\n\r\n");
        assert_eq!(body_text(&response), "literal");

        let response = route_raw(&router, b"GET /api/users/7 HTTP/1.1\r\n\r\n");
        assert_eq!(body_text(&response), "param:7");
    }

    #[test]
    fn test_not_found_is_html_for_pages() {
        let router = Router::new();
        let response = route_raw(&router, b"GET /nonexistent HTTP/1.1\r\n\r\n");

        assert_eq!(response.status(), StatusCode::NotFound);
        assert_eq!(response.content_type(), "text/html");
    }

    #[test]
    fn test_not_found_is_json_for_api() {
        let router = Router::new();
        let response = route_raw(&router, b"GET /api/nothing HTTP/1.1\r\n\r\n");

        assert_eq!(response.status(), StatusCode::NotFound);
        assert_eq!(response.body_json().unwrap()["error"], "Not Found");
    }

    #[test]
    fn test_known_path_wrong_method_is_405() {
        let mut router = Router::new();
        router.get("/api/users/{id}", param_handler);

        let response = route_raw(&router, b"POST /api/users/3 HTTP/1.1\r\n\r\n");
        assert_eq!(response.status(), StatusCode::MethodNotAllowed);
        assert_eq!(response.body_json().unwrap()["error"], "Method Not Allowed");
    }

    #[test]
    fn test_unknown_method_is_405() {
        let mut router = Router::new();
        router.get("/", ok_handler);

        let response = route_raw(&router, b"OPTIONS / HTTP/1.1\r\n\r\n");
        assert_eq!(response.status(), StatusCode::MethodNotAllowed);
    }

    #[test]
    fn test_method_specific_handlers() {
        fn created(_req: &Request, _ctx: &AppContext) -> Response {
            Response::new(StatusCode::Created)
        }

        let mut router = Router::new();
        router.get("/api/users", ok_handler);
        router.post("/api/users", created);

        let response = route_raw(&router, b"GET /api/users HTTP/1.1\r\n\r\n");
        assert_eq!(response.status(), StatusCode::Ok);

        let response = route_raw(&router, b"POST /api/users HTTP/1.1\r\n\r\n");
        assert_eq!(response.status(), StatusCode::Created);
    }

    #[test]
    fn test_is_api_path() {
        assert!(is_api_path("/api/users"));
        assert!(is_api_path("/api"));
        assert!(!is_api_path("/apiary"));
        assert!(!is_api_path("/"));
    }
}
