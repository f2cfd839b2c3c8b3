//! # Validación de Entrada
//! src/handlers/validate.rs
//!
//! Reglas de formato para los campos de usuario y los parámetros de la API.
//! Cada función devuelve el valor ya convertido o un [`ApiError::BadRequest`]
//! con un mensaje apto para el cliente.

use super::ApiError;
use lazy_static::lazy_static;
use regex::Regex;

pub const MIN_NAME_LENGTH: usize = 3;
pub const MAX_NAME_LENGTH: usize = 50;
pub const MIN_EMAIL_LENGTH: usize = 5;
pub const MAX_EMAIL_LENGTH: usize = 100;
pub const MIN_PASSWORD_LENGTH: usize = 3;
pub const MAX_PASSWORD_LENGTH: usize = 50;

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

lazy_static! {
    /// Letras ASCII, dígitos y `_`
    static ref WORD_RE: Regex = Regex::new("^[A-Za-z0-9_]+$").unwrap();
}

fn is_word(value: &str, min: usize, max: usize) -> bool {
    let len = value.chars().count();
    (min..=max).contains(&len) && WORD_RE.is_match(value)
}

pub fn validate_name(name: &str) -> Result<(), ApiError> {
    if is_word(name, MIN_NAME_LENGTH, MAX_NAME_LENGTH) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Invalid name: must be {}-{} characters (letters, digits or underscore)",
            MIN_NAME_LENGTH, MAX_NAME_LENGTH
        )))
    }
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if is_word(password, MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Invalid password: must be {}-{} characters (letters, digits or underscore)",
            MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH
        )))
    }
}

pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ApiError::BadRequest("Invalid email format".to_string()))
    }
}

/// `local@domain.tld` sin espacios, con un solo `@` y un `.` en el dominio
fn is_valid_email(email: &str) -> bool {
    let len = email.chars().count();
    if !(MIN_EMAIL_LENGTH..=MAX_EMAIL_LENGTH).contains(&len) {
        return false;
    }
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    // El último punto no puede ir pegado al @ ni al final
    domain
        .rfind('.')
        .is_some_and(|i| i > 0 && i + 1 < domain.len())
}

/// Id de recurso: sólo dígitos, mayor que cero y dentro de `i64`
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    let invalid = || ApiError::BadRequest(format!("Invalid user id: {}", raw));

    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(invalid()),
    }
}

/// `limit` del listado; ausente → valor por defecto
pub fn parse_limit(raw: Option<&str>) -> Result<u32, ApiError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_LIMIT);
    };

    match raw.parse::<u32>() {
        Ok(limit) if (1..=MAX_LIMIT).contains(&limit) => Ok(limit),
        _ => Err(ApiError::BadRequest(format!(
            "Parameter 'limit' must be an integer between 1 and {}",
            MAX_LIMIT
        ))),
    }
}

/// `offset` del listado; ausente → 0
pub fn parse_offset(raw: Option<&str>) -> Result<u32, ApiError> {
    let Some(raw) = raw else {
        return Ok(0);
    };

    raw.parse::<u32>().map_err(|_| {
        ApiError::BadRequest("Parameter 'offset' must be a non-negative integer".to_string())
    })
}
