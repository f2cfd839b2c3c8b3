//! # Archivos Estáticos
//! src/handlers/static_files.rs
//!
//! Sirve las páginas y assets de `public/`. Sólo se sirven las rutas
//! registradas en el router, así que el path nunca sale del directorio.

use crate::context::AppContext;
use crate::http::{Request, Response, StatusCode};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Tamaño máximo de archivo servido (10 MiB)
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

const DEFAULT_MIME: &str = "application/octet-stream";

const MIME_TYPES: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("js", "application/javascript"),
    ("json", "application/json"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("ico", "image/x-icon"),
    ("svg", "image/svg+xml"),
    ("txt", "text/plain"),
    ("pdf", "application/pdf"),
    ("xml", "application/xml"),
    ("zip", "application/zip"),
    ("mp4", "video/mp4"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("ttf", "font/ttf"),
    ("otf", "font/otf"),
];

/// MIME según la extensión (sin distinguir mayúsculas)
pub fn mime_type(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return DEFAULT_MIME;
    };

    MIME_TYPES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(ext))
        .map(|(_, mime)| *mime)
        .unwrap_or(DEFAULT_MIME)
}

/// Archivo relativo a `public/` para un path de request
pub fn resolve(clean_path: &str) -> PathBuf {
    match clean_path {
        "/" | "/index.html" => PathBuf::from("index.html"),
        "/about" => PathBuf::from("about.html"),
        other => PathBuf::from(other.trim_start_matches('/')),
    }
}

/// Handler de las rutas estáticas
pub fn serve_static(req: &Request, ctx: &AppContext) -> Response {
    let path = ctx.public_dir().join(resolve(req.clean_path()));
    serve_file(&path)
}

/// Lee el archivo completo y arma la respuesta
pub fn serve_file(path: &Path) -> Response {
    match read_limited(path) {
        Ok(contents) => {
            log::debug!("Sirviendo {} ({} bytes)", path.display(), contents.len());
            Response::new(StatusCode::Ok)
                .with_header("Content-Type", mime_type(path))
                .with_body_bytes(contents)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("Archivo no encontrado: {}", path.display());
            Response::html_error(
                StatusCode::NotFound,
                "The requested resource was not found on this server.",
            )
        }
        Err(e) => {
            log::error!("No se pudo leer {}: {}", path.display(), e);
            Response::html_error(StatusCode::InternalServerError, "Could not read file")
        }
    }
}

fn read_limited(path: &Path) -> io::Result<Vec<u8>> {
    let metadata = fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(io::Error::new(io::ErrorKind::NotFound, "not a regular file"));
    }
    if metadata.len() > MAX_FILE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("file too large: {} bytes", metadata.len()),
        ));
    }
    fs::read(path)
}
