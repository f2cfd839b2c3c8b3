//! # Configuración del Servidor
//! src/config.rs
//!
//! Argumentos posicionales y opciones con variable de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./server 8080 4 64 --db-path ./users.db --public-dir ./public
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_HOST=127.0.0.1 DB_PATH=:memory: ./server 3000
//! ```
//!
//! Los posicionales `[port] [workers] [queue]` se interpretan con tolerancia:
//! un valor no numérico, cero o fuera de rango se reemplaza por el valor por
//! defecto, y workers/cola se recortan a sus máximos.

use clap::Parser;
use std::ffi::OsString;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_WORKERS: usize = 5;
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Máximo de workers del pool
pub const MAX_WORKERS: usize = 5;

/// Máximo de conexiones esperando en la cola
pub const MAX_QUEUE_CAPACITY: usize = 100;

/// Argumentos tal como llegan de la línea de comandos
#[derive(Debug, Clone, Parser)]
#[command(name = "server")]
#[command(about = "Servidor HTTP con API CRUD de usuarios sobre SQLite")]
#[command(version)]
pub struct Args {
    /// Puerto de escucha (por defecto 8080)
    #[arg(allow_hyphen_values = true)]
    pub port: Option<String>,

    /// Número de workers (1-5, por defecto 5)
    #[arg(allow_hyphen_values = true)]
    pub workers: Option<String>,

    /// Capacidad de la cola de conexiones (1-100, por defecto 100)
    #[arg(allow_hyphen_values = true)]
    pub queue: Option<String>,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "HTTP_HOST")]
    pub host: String,

    /// Archivo SQLite (`:memory:` para una base temporal)
    #[arg(long = "db-path", default_value = "httpserver.db", env = "DB_PATH")]
    pub db_path: String,

    /// Directorio de archivos estáticos
    #[arg(long = "public-dir", default_value = "./public", env = "PUBLIC_DIR")]
    pub public_dir: String,

    /// Timeout de lectura por conexión en milisegundos
    #[arg(long = "recv-timeout-ms", default_value = "2000", env = "RECV_TIMEOUT_MS")]
    pub recv_timeout_ms: u64,

    /// Backlog del socket de escucha
    #[arg(long = "backlog", default_value = "10", env = "LISTEN_BACKLOG")]
    pub backlog: i32,
}

/// Configuración efectiva del servidor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub host: String,
    pub workers: usize,
    pub queue_capacity: usize,
    pub db_path: String,
    pub public_dir: String,
    pub recv_timeout_ms: u64,
    pub backlog: i32,
}

impl Config {
    /// Parsea los argumentos del proceso
    ///
    /// Si clap no puede parsearlos (opción desconocida, `--help`), imprime
    /// el mensaje y termina el proceso.
    pub fn from_args() -> Self {
        Self::from_parsed(Args::parse())
    }

    /// Igual que [`Config::from_args`] pero sobre una lista explícita
    ///
    /// # Ejemplo
    /// ```
    /// use users_server::config::Config;
    ///
    /// let config = Config::try_from_iter(["server", "3000", "9", "abc"]).unwrap();
    /// assert_eq!(config.port, 3000);
    /// assert_eq!(config.workers, 5);
    /// assert_eq!(config.queue_capacity, 100);
    /// ```
    pub fn try_from_iter<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Ok(Self::from_parsed(Args::try_parse_from(args)?))
    }

    fn from_parsed(args: Args) -> Self {
        Self {
            port: resolve_port(args.port.as_deref()),
            workers: resolve_bounded(args.workers.as_deref(), DEFAULT_WORKERS, MAX_WORKERS, "workers"),
            queue_capacity: resolve_bounded(
                args.queue.as_deref(),
                DEFAULT_QUEUE_CAPACITY,
                MAX_QUEUE_CAPACITY,
                "queue",
            ),
            host: args.host,
            db_path: args.db_path,
            public_dir: args.public_dir,
            recv_timeout_ms: args.recv_timeout_ms,
            backlog: args.backlog,
        }
    }

    /// Dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```
    /// use users_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("Worker count must be >= 1".to_string());
        }
        if self.queue_capacity == 0 {
            return Err("Queue capacity must be >= 1".to_string());
        }
        if self.recv_timeout_ms == 0 {
            return Err("Receive timeout must be > 0".to_string());
        }
        if self.backlog <= 0 {
            return Err("Listen backlog must be > 0".to_string());
        }
        if self.db_path.is_empty() {
            return Err("Database path must not be empty".to_string());
        }
        Ok(())
    }

    /// Registra la configuración efectiva
    pub fn print_summary(&self) {
        log::info!("Configuración:");
        log::info!("  Dirección:    {}", self.address());
        log::info!("  Workers:      {}", self.workers);
        log::info!("  Cola:         {}", self.queue_capacity);
        log::info!("  Base de datos: {}", self.db_path);
        log::info!("  Estáticos:    {}", self.public_dir);
        log::info!("  Recv timeout: {} ms", self.recv_timeout_ms);
        log::info!("  Backlog:      {}", self.backlog);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            host: "0.0.0.0".to_string(),
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            db_path: "httpserver.db".to_string(),
            public_dir: "./public".to_string(),
            recv_timeout_ms: 2000,
            backlog: 10,
        }
    }
}

fn resolve_port(raw: Option<&str>) -> u16 {
    let Some(raw) = raw else {
        return DEFAULT_PORT;
    };

    match raw.trim().parse::<u16>() {
        Ok(port) if port > 0 => port,
        _ => {
            log::warn!("Puerto inválido '{}', usando {}", raw, DEFAULT_PORT);
            DEFAULT_PORT
        }
    }
}

/// Entero positivo con valor por defecto y tope
fn resolve_bounded(raw: Option<&str>, default: usize, max: usize, what: &str) -> usize {
    let Some(raw) = raw else {
        return default;
    };

    match raw.trim().parse::<usize>() {
        Ok(0) | Err(_) => {
            log::warn!("Valor inválido para {} '{}', usando {}", what, raw, default);
            default
        }
        Ok(n) if n > max => {
            log::warn!("{} = {} excede el máximo, usando {}", what, n, max);
            max
        }
        Ok(n) => n,
    }
}
