//! # Handlers de Usuarios
//! src/handlers/users.rs
//!
//! CRUD sobre `/api/users`:
//!
//! | Método | Ruta               | Respuesta                                   |
//! |--------|--------------------|---------------------------------------------|
//! | GET    | `/api/users`       | 200 `{users, count, total, limit, offset}`  |
//! | POST   | `/api/users`       | 201 usuario creado                          |
//! | GET    | `/api/users/{id}`  | 200 usuario                                 |
//! | PUT    | `/api/users/{id}`  | 200 usuario (name y email obligatorios)     |
//! | PATCH  | `/api/users/{id}`  | 200 usuario (al menos un campo)             |
//! | DELETE | `/api/users/{id}`  | 200 `{message, id}`                         |

use super::validate::{
    parse_id, parse_limit, parse_offset, validate_email, validate_name, validate_password,
};
use super::{respond, ApiError};
use crate::context::AppContext;
use crate::http::{Request, Response, StatusCode};
use crate::store::{FilterColumn, NewUser, User, UserChanges, UserQuery};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

/// Body de POST, PUT y PATCH. Qué campos son obligatorios depende del método.
#[derive(Debug, Default, Deserialize)]
struct UserBody {
    #[serde(default)]
    name: Option<String>,

    #[serde(default)]
    email: Option<String>,

    #[serde(default)]
    password: Option<String>,
}

/// Deserializa el body JSON del request
fn parse_json_body<T: DeserializeOwned>(req: &Request) -> Result<T, ApiError> {
    let body = match req.body() {
        Some(body) if !body.is_empty() => body,
        _ => return Err(ApiError::BadRequest("Request body is required".to_string())),
    };

    serde_json::from_slice(body).map_err(|e| {
        log::debug!("JSON inválido: {}", e);
        ApiError::BadRequest("Invalid JSON body".to_string())
    })
}

fn user_id(req: &Request) -> Result<i64, ApiError> {
    let raw = req
        .url_param("id")
        .ok_or_else(|| ApiError::BadRequest("Missing user id".to_string()))?;
    parse_id(raw)
}

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("User {} not found", id))
}

fn user_response(status: StatusCode, user: &User) -> Response {
    Response::json(status, &json!(user))
}

/// Valida los campos presentes y los convierte en cambios
fn validated_changes(body: UserBody) -> Result<UserChanges, ApiError> {
    if let Some(name) = &body.name {
        validate_name(name)?;
    }
    if let Some(email) = &body.email {
        validate_email(email)?;
    }
    if let Some(password) = &body.password {
        validate_password(password)?;
    }

    Ok(UserChanges {
        name: body.name,
        email: body.email,
        password: body.password,
    })
}

/// GET /api/users
///
/// Query: `limit`, `offset`, `search` y filtros por columna (`id`, `name`,
/// `email`, `created_at`). Cualquier otra clave se ignora.
pub fn list_users(req: &Request, ctx: &AppContext) -> Response {
    respond(list_users_inner(req, ctx))
}

fn list_users_inner(req: &Request, ctx: &AppContext) -> Result<Response, ApiError> {
    let limit = parse_limit(req.query_param("limit"))?;
    let offset = parse_offset(req.query_param("offset"))?;
    let search = req
        .query_param("search")
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let mut filters: Vec<(FilterColumn, String)> = Vec::new();
    for param in req.query_params() {
        let Some(column) = FilterColumn::from_name(&param.key) else {
            continue;
        };
        // Sólo la primera aparición de cada columna
        if filters.iter().any(|(c, _)| *c == column) {
            continue;
        }
        filters.push((column, param.value.clone()));
    }

    let query = UserQuery {
        limit,
        offset,
        search,
        filters,
    };
    let page = ctx.store().with_store_lock(|store| store.list_users(&query))?;

    Ok(Response::json(
        StatusCode::Ok,
        &json!({
            "users": page.users,
            "count": page.users.len(),
            "total": page.total,
            "limit": limit,
            "offset": offset,
        }),
    ))
}

/// POST /api/users
pub fn create_user(req: &Request, ctx: &AppContext) -> Response {
    respond(create_user_inner(req, ctx))
}

fn create_user_inner(req: &Request, ctx: &AppContext) -> Result<Response, ApiError> {
    let body: UserBody = parse_json_body(req)?;

    let (Some(name), Some(email), Some(password)) = (body.name, body.email, body.password) else {
        return Err(ApiError::BadRequest(
            "Missing required fields: name, email, password".to_string(),
        ));
    };

    validate_name(&name)?;
    validate_email(&email)?;
    validate_password(&password)?;

    let new_user = NewUser {
        name,
        email,
        password,
    };
    let user = ctx.store().with_store_lock(|store| store.create_user(&new_user))?;

    log::info!("Usuario creado: {} ({})", user.name, user.id);
    Ok(user_response(StatusCode::Created, &user))
}

/// GET /api/users/{id}
pub fn get_user(req: &Request, ctx: &AppContext) -> Response {
    respond(get_user_inner(req, ctx))
}

fn get_user_inner(req: &Request, ctx: &AppContext) -> Result<Response, ApiError> {
    let id = user_id(req)?;
    let user = ctx
        .store()
        .with_store_lock(|store| store.get_user(id))?
        .ok_or_else(|| not_found(id))?;

    Ok(user_response(StatusCode::Ok, &user))
}

/// PUT /api/users/{id}
pub fn update_user(req: &Request, ctx: &AppContext) -> Response {
    respond(update_user_inner(req, ctx))
}

fn update_user_inner(req: &Request, ctx: &AppContext) -> Result<Response, ApiError> {
    let id = user_id(req)?;
    let body: UserBody = parse_json_body(req)?;

    if body.name.is_none() || body.email.is_none() {
        return Err(ApiError::BadRequest(
            "Missing required fields: name, email".to_string(),
        ));
    }

    apply_changes(ctx, id, validated_changes(body)?)
}

/// PATCH /api/users/{id}
pub fn patch_user(req: &Request, ctx: &AppContext) -> Response {
    respond(patch_user_inner(req, ctx))
}

fn patch_user_inner(req: &Request, ctx: &AppContext) -> Result<Response, ApiError> {
    let id = user_id(req)?;
    let body: UserBody = parse_json_body(req)?;

    let changes = validated_changes(body)?;
    if changes.is_empty() {
        return Err(ApiError::BadRequest(
            "At least one of name, email or password is required".to_string(),
        ));
    }

    apply_changes(ctx, id, changes)
}

fn apply_changes(ctx: &AppContext, id: i64, changes: UserChanges) -> Result<Response, ApiError> {
    let user = ctx
        .store()
        .with_store_lock(|store| store.update_user(id, &changes))?
        .ok_or_else(|| not_found(id))?;

    log::info!("Usuario actualizado: {}", id);
    Ok(user_response(StatusCode::Ok, &user))
}

/// DELETE /api/users/{id}
pub fn delete_user(req: &Request, ctx: &AppContext) -> Response {
    respond(delete_user_inner(req, ctx))
}

fn delete_user_inner(req: &Request, ctx: &AppContext) -> Result<Response, ApiError> {
    let id = user_id(req)?;
    let deleted = ctx.store().with_store_lock(|store| store.delete_user(id))?;
    if !deleted {
        return Err(not_found(id));
    }

    log::info!("Usuario eliminado: {}", id);
    Ok(Response::json(
        StatusCode::Ok,
        &json!({
            "message": "User deleted successfully",
            "id": id,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::Router;

    fn router() -> Router {
        let mut router = Router::new();
        crate::handlers::register_routes(&mut router);
        router
    }

    fn send(router: &Router, ctx: &AppContext, method: &str, path: &str, body: &str) -> Response {
        let raw = if body.is_empty() {
            format!("{} {} HTTP/1.1\r\n\r\n", method, path)
        } else {
            format!(
                "{} {} HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
                method,
                path,
                body.len(),
                body
            )
        };
        let request = Request::parse(raw.as_bytes()).unwrap();
        router.route(request, ctx)
    }

    fn create(router: &Router, ctx: &AppContext, name: &str, email: &str) -> Response {
        let body = format!(r#"{{"name":"{}","email":"{}","password":"pw_123"}}"#, name, email);
        send(router, ctx, "POST", "/api/users", &body)
    }

    #[test]
    fn test_create_returns_201_without_password() {
        let (router, ctx) = (router(), AppContext::in_memory_for_tests());
        let response = create(&router, &ctx, "alice_1", "a@b.co");

        assert_eq!(response.status(), StatusCode::Created);
        let body = response.body_json().unwrap();
        assert_eq!(body["id"], 1);
        assert_eq!(body["name"], "alice_1");
        assert_eq!(body["email"], "a@b.co");
        assert!(body["created_at"].is_string());
        assert!(body.get("password").is_none());
    }

    #[test]
    fn test_duplicate_create_is_409() {
        let (router, ctx) = (router(), AppContext::in_memory_for_tests());
        create(&router, &ctx, "alice_1", "a@b.co");
        let response = create(&router, &ctx, "alice_1", "a@b.co");

        assert_eq!(response.status(), StatusCode::Conflict);
        assert_eq!(response.body_json().unwrap()["error"], "Conflict");
    }

    #[test]
    fn test_create_validation_errors() {
        let (router, ctx) = (router(), AppContext::in_memory_for_tests());

        let missing = send(&router, &ctx, "POST", "/api/users", r#"{"name":"alice_1"}"#);
        assert_eq!(missing.status(), StatusCode::BadRequest);

        let bad_email = create(&router, &ctx, "alice_1", "not-an-email");
        assert_eq!(bad_email.status(), StatusCode::BadRequest);

        let bad_json = send(&router, &ctx, "POST", "/api/users", "{not json");
        assert_eq!(bad_json.status(), StatusCode::BadRequest);

        let wrong_type = send(&router, &ctx, "POST", "/api/users", r#"{"name":5,"email":"a@b.co","password":"pw_1"}"#);
        assert_eq!(wrong_type.status(), StatusCode::BadRequest);

        let no_body = send(&router, &ctx, "POST", "/api/users", "");
        assert_eq!(no_body.status(), StatusCode::BadRequest);
    }

    #[test]
    fn test_get_user() {
        let (router, ctx) = (router(), AppContext::in_memory_for_tests());
        create(&router, &ctx, "alice_1", "a@b.co");

        let response = send(&router, &ctx, "GET", "/api/users/1", "");
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.body_json().unwrap()["name"], "alice_1");

        let missing = send(&router, &ctx, "GET", "/api/users/9999", "");
        assert_eq!(missing.status(), StatusCode::NotFound);
        assert_eq!(missing.body_json().unwrap()["error"], "Not Found");

        let invalid = send(&router, &ctx, "GET", "/api/users/abc", "");
        assert_eq!(invalid.status(), StatusCode::BadRequest);
    }

    #[test]
    fn test_list_with_limit_and_name_filter() {
        let (router, ctx) = (router(), AppContext::in_memory_for_tests());
        for i in 1..=5 {
            create(&router, &ctx, &format!("user_{}", i), &format!("u{}@example.com", i));
        }
        create(&router, &ctx, "alice_1", "alice@example.com");

        let response = send(&router, &ctx, "GET", "/api/users?limit=2&offset=1", "");
        let body = response.body_json().unwrap();
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(body["count"], 2);
        assert_eq!(body["total"], 6);
        assert_eq!(body["limit"], 2);
        assert_eq!(body["offset"], 1);
        assert_eq!(body["users"][0]["id"], 2);

        let response = send(&router, &ctx, "GET", "/api/users?name=alice", "");
        let body = response.body_json().unwrap();
        assert_eq!(body["total"], 1);
        assert_eq!(body["users"][0]["name"], "alice_1");

        let response = send(&router, &ctx, "GET", "/api/users?search=example.com&password=x", "");
        assert_eq!(response.body_json().unwrap()["total"], 6);
    }

    #[test]
    fn test_list_rejects_bad_limit() {
        let (router, ctx) = (router(), AppContext::in_memory_for_tests());
        let response = send(&router, &ctx, "GET", "/api/users?limit=500", "");
        assert_eq!(response.status(), StatusCode::BadRequest);
    }

    #[test]
    fn test_put_requires_name_and_email() {
        let (router, ctx) = (router(), AppContext::in_memory_for_tests());
        create(&router, &ctx, "alice_1", "a@b.co");

        let partial = send(&router, &ctx, "PUT", "/api/users/1", r#"{"name":"alice_2"}"#);
        assert_eq!(partial.status(), StatusCode::BadRequest);

        let full = send(&router, &ctx, "PUT", "/api/users/1", r#"{"name":"alice_2","email":"new@b.co"}"#);
        assert_eq!(full.status(), StatusCode::Ok);
        assert_eq!(full.body_json().unwrap()["email"], "new@b.co");

        let missing = send(&router, &ctx, "PUT", "/api/users/77", r#"{"name":"zed_1","email":"z@b.co"}"#);
        assert_eq!(missing.status(), StatusCode::NotFound);
    }

    #[test]
    fn test_patch_updates_subset() {
        let (router, ctx) = (router(), AppContext::in_memory_for_tests());
        create(&router, &ctx, "alice_1", "a@b.co");

        let response = send(&router, &ctx, "PATCH", "/api/users/1", r#"{"email":"x@y.io"}"#);
        let body = response.body_json().unwrap();
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(body["name"], "alice_1");
        assert_eq!(body["email"], "x@y.io");

        let empty = send(&router, &ctx, "PATCH", "/api/users/1", "{}");
        assert_eq!(empty.status(), StatusCode::BadRequest);
    }

    #[test]
    fn test_delete_user() {
        let (router, ctx) = (router(), AppContext::in_memory_for_tests());
        create(&router, &ctx, "alice_1", "a@b.co");

        let response = send(&router, &ctx, "DELETE", "/api/users/1", "");
        let body = response.body_json().unwrap();
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(body["id"], 1);
        assert_eq!(body["message"], "User deleted successfully");

        let again = send(&router, &ctx, "DELETE", "/api/users/1", "");
        assert_eq!(again.status(), StatusCode::NotFound);
    }

    #[test]
    fn test_closed_store_is_500_without_details() {
        let (router, ctx) = (router(), AppContext::in_memory_for_tests());
        ctx.store().close();

        let response = send(&router, &ctx, "GET", "/api/users/1", "");
        let body = response.body_json().unwrap();
        assert_eq!(response.status(), StatusCode::InternalServerError);
        assert_eq!(body["message"], "Internal server error");
    }
}
