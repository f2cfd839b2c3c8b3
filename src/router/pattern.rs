//! # Patrones de Path
//! src/router/pattern.rs
//!
//! Un patrón es una secuencia de segmentos separados por `/`. Un segmento
//! `{name}` acepta cualquier segmento no vacío y lo asocia a `name`; el resto
//! debe coincidir literalmente. Patrón y path deben tener el mismo número de
//! segmentos (no hay comodines de longitud variable).
//!
//! Los separadores repetidos o finales no generan segmentos vacíos:
//! `/api/users/` y `/api//users` tienen los mismos segmentos que `/api/users`.

use thiserror::Error;

/// Máximo de parámetros `{name}` que se extraen de un path
pub const MAX_URL_PARAMS: usize = 5;

/// Longitud máxima del nombre de un parámetro
pub const MAX_PARAM_NAME_LENGTH: usize = 63;

/// Longitud máxima del valor de un parámetro
pub const MAX_PARAM_VALUE_LENGTH: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("Too many URL parameters (max {MAX_URL_PARAMS})")]
    TooManyParams,

    #[error("URL parameter name too long: {0}")]
    NameTooLong(String),

    #[error("URL parameter value too long for {0}")]
    ValueTooLong(String),

    #[error("Path does not match pattern")]
    NoMatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// Patrón de ruta ya segmentado
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Segmenta un patrón como `/api/users/{id}`
    pub fn parse(pattern: &str) -> Self {
        let segments = split_segments(pattern)
            .map(|segment| match param_name(segment) {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(segment.to_string()),
            })
            .collect();

        Self {
            raw: pattern.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// `true` si el patrón no tiene segmentos `{name}`
    pub fn is_literal(&self) -> bool {
        self.segments.iter().all(|s| matches!(s, Segment::Literal(_)))
    }

    /// Compara segmento a segmento
    pub fn matches(&self, clean_path: &str) -> bool {
        let path_segments: Vec<&str> = split_segments(clean_path).collect();
        if path_segments.len() != self.segments.len() {
            return false;
        }

        self.segments
            .iter()
            .zip(path_segments)
            .all(|(segment, value)| match segment {
                Segment::Literal(literal) => literal == value,
                Segment::Param(_) => !value.is_empty(),
            })
    }

    /// Extrae los pares `(name, value)` en orden de aparición
    pub fn extract(&self, clean_path: &str) -> Result<Vec<(String, String)>, PatternError> {
        if !self.matches(clean_path) {
            return Err(PatternError::NoMatch);
        }

        let mut params = Vec::new();
        for (segment, value) in self.segments.iter().zip(split_segments(clean_path)) {
            let Segment::Param(name) = segment else {
                continue;
            };

            if params.len() >= MAX_URL_PARAMS {
                return Err(PatternError::TooManyParams);
            }
            if name.len() > MAX_PARAM_NAME_LENGTH {
                return Err(PatternError::NameTooLong(name.clone()));
            }
            if value.len() > MAX_PARAM_VALUE_LENGTH {
                return Err(PatternError::ValueTooLong(name.clone()));
            }

            params.push((name.clone(), value.to_string()));
        }

        Ok(params)
    }
}

/// Atajo sin construir el patrón de antemano
///
/// ```
/// use users_server::router::pattern::match_path;
///
/// assert!(match_path("/api/users/{id}", "/api/users/42"));
/// assert!(!match_path("/api/users/{id}", "/api/users"));
/// ```
pub fn match_path(pattern: &str, clean_path: &str) -> bool {
    PathPattern::parse(pattern).matches(clean_path)
}

/// Atajo de [`PathPattern::extract`]
pub fn extract_params(pattern: &str, clean_path: &str) -> Result<Vec<(String, String)>, PatternError> {
    PathPattern::parse(pattern).extract(clean_path)
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// `{name}` con nombre no vacío
fn param_name(segment: &str) -> Option<&str> {
    let inner = segment.strip_prefix('{')?.strip_suffix('}')?;
    if inner.is_empty() {
        None
    } else {
        Some(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_match() {
        assert!(match_path("/api/users", "/api/users"));
        assert!(match_path("/api/users", "/api/users/"));
        assert!(!match_path("/api/users", "/api/user"));
        assert!(match_path("/", "/"));
    }

    #[test]
    fn test_segment_count_must_be_equal() {
        assert!(!match_path("/api/users/{id}", "/api/users/1/extra"));
        assert!(!match_path("/api/users/{id}", "/api/users"));
        assert!(!match_path("/", "/about"));
    }

    #[test]
    fn test_placeholder_matches_any_segment() {
        assert!(match_path("/api/users/{id}", "/api/users/42"));
        assert!(match_path("/api/users/{id}", "/api/users/abc"));
    }

    #[test]
    fn test_empty_braces_are_literal() {
        let pattern = PathPattern::parse("/x/{}");
        assert!(pattern.is_literal());
        assert!(pattern.matches("/x/{}"));
        assert!(!pattern.matches("/x/1"));
    }

    #[test]
    fn test_extract_single_id() {
        let params = extract_params("/api/users/{id}", "/api/users/42").unwrap();
        assert_eq!(params, vec![("id".to_string(), "42".to_string())]);
    }

    #[test]
    fn test_extract_multiple_in_order() {
        let params = extract_params("/a/{x}/b/{y}", "/a/1/b/2").unwrap();
        assert_eq!(
            params,
            vec![("x".to_string(), "1".to_string()), ("y".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn test_extract_no_match() {
        assert_eq!(
            extract_params("/api/users/{id}", "/api/other/1").unwrap_err(),
            PatternError::NoMatch
        );
    }

    #[test]
    fn test_extract_too_many_params() {
        let pattern = "/{a}/{b}/{c}/{d}/{e}/{f}";
        assert_eq!(
            extract_params(pattern, "/1/2/3/4/5/6").unwrap_err(),
            PatternError::TooManyParams
        );
        assert!(extract_params("/{a}/{b}/{c}/{d}/{e}", "/1/2/3/4/5").is_ok());
    }

    #[test]
    fn test_extract_value_too_long() {
        let path = format!("/api/users/{}", "9".repeat(MAX_PARAM_VALUE_LENGTH + 1));
        assert_eq!(
            extract_params("/api/users/{id}", &path).unwrap_err(),
            PatternError::ValueTooLong("id".to_string())
        );
    }

    #[test]
    fn test_is_literal() {
        assert!(PathPattern::parse("/css/style.css").is_literal());
        assert!(!PathPattern::parse("/api/users/{id}").is_literal());
    }
}
