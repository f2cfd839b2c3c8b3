//! # Query String
//! src/http/query.rs
//!
//! Parsing de la parte del path que va después de `?`.
//!
//! - Los pares se separan por `&` y cada par por el primer `=`.
//! - Clave y valor se decodifican (`%XX` → byte, `+` → espacio).
//! - Un `%` que no va seguido de dos dígitos hex se copia literal.
//! - Se conserva el orden de aparición; en la búsqueda gana la primera.

/// Máximo de parámetros de query que se conservan (el resto se ignora)
pub const MAX_QUERY_PARAMS: usize = 10;

/// Longitud máxima (sin decodificar) de una clave
pub const MAX_PARAM_KEY_LENGTH: usize = 63;

/// Longitud máxima (sin decodificar) de un valor
pub const MAX_PARAM_VALUE_LENGTH: usize = 255;

/// Par clave/valor ya decodificado
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParam {
    pub key: String,
    pub value: String,
}

impl QueryParam {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

/// Decodifica `%XX` y `+` en un string
///
/// Las secuencias mal formadas se pasan tal cual. Si el resultado no es
/// UTF-8 válido, los bytes inválidos se reemplazan por U+FFFD.
///
/// # Ejemplo
/// ```
/// use users_server::http::query::percent_decode;
///
/// assert_eq!(percent_decode("hello%20world"), "hello world");
/// assert_eq!(percent_decode("a+b"), "a b");
/// assert_eq!(percent_decode("100%"), "100%");
/// ```
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() && is_hex_pair(bytes[i + 1], bytes[i + 2]) => {
                out.push(hex_value(bytes[i + 1]) << 4 | hex_value(bytes[i + 2]));
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }

    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

fn is_hex_pair(a: u8, b: u8) -> bool {
    a.is_ascii_hexdigit() && b.is_ascii_hexdigit()
}

fn hex_value(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}

/// Parsea una query string en pares ordenados
///
/// - Segmentos vacíos (`a=1&&b=2`) se saltan.
/// - Una clave sin `=` se guarda con valor vacío.
/// - Pares con clave vacía (`=x`) o demasiado largos se descartan.
/// - Se conservan como máximo [`MAX_QUERY_PARAMS`] pares.
///
/// # Ejemplo
/// ```
/// use users_server::http::query::{parse_query_string, QueryParam};
///
/// let params = parse_query_string("a=1&b=2&debug");
/// assert_eq!(params, vec![
///     QueryParam::new("a", "1"),
///     QueryParam::new("b", "2"),
///     QueryParam::new("debug", ""),
/// ]);
/// ```
pub fn parse_query_string(query: &str) -> Vec<QueryParam> {
    let mut params = Vec::new();

    for token in query.split('&') {
        if params.len() >= MAX_QUERY_PARAMS {
            log::debug!("Query con más de {} parámetros, resto ignorado", MAX_QUERY_PARAMS);
            break;
        }
        if token.is_empty() {
            continue;
        }

        let (key, value) = match token.split_once('=') {
            Some((key, value)) => (key, value),
            None => (token, ""),
        };

        if key.is_empty() {
            continue;
        }
        if key.len() > MAX_PARAM_KEY_LENGTH || value.len() > MAX_PARAM_VALUE_LENGTH {
            log::debug!("Parámetro de query descartado por longitud: {}", key);
            continue;
        }

        params.push(QueryParam {
            key: percent_decode(key),
            value: percent_decode(value),
        });
    }

    params
}

/// Busca el valor de la primera aparición de `key`
pub fn find_param<'a>(params: &'a [QueryParam], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|p| p.key == key)
        .map(|p| p.value.as_str())
}
