//! # Servidor TCP
//! src/server/tcp.rs
//!
//! El acceptor corre en el thread principal y entrega cada conexión al pool
//! de workers. Cada worker lee un único request, lo enruta, escribe la
//! respuesta y cierra.
//!
//! ```text
//! accept ──submit──→ WorkerPool ──→ read → parse → route → write → close
//! ```
//!
//! Si el pool rechaza la conexión (se está apagando) se cierra sin responder.
//! Los requests mal formados también se cierran sin respuesta.
//!
//! Orden de apagado: dejar de aceptar → vaciar y unir el pool → cerrar store.

use super::signal;
use crate::config::Config;
use crate::context::AppContext;
use crate::error::ServerError;
use crate::handlers;
use crate::http::request::MAX_REQUEST_SIZE;
use crate::http::Request;
use crate::router::Router;
use crate::store::{SqliteStore, StoreBridge};
use crate::workers::WorkerPool;
use socket2::{Domain, Protocol, Socket, Type};
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Pausa del acceptor cuando no hay conexiones pendientes
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Servidor HTTP con pool fijo de workers
pub struct Server {
    config: Config,
    router: Arc<Router>,
    ctx: Arc<AppContext>,
    pool: WorkerPool,
}

impl Server {
    /// Abre el store indicado en la configuración y arranca el pool
    pub fn new(config: Config) -> Result<Self, ServerError> {
        config.validate().map_err(ServerError::Config)?;
        let store = SqliteStore::open(&config.db_path)?;
        Self::with_store(config, StoreBridge::new(store))
    }

    /// Igual que [`Server::new`] pero con un store ya abierto
    pub fn with_store(config: Config, store: StoreBridge) -> Result<Self, ServerError> {
        config.validate().map_err(ServerError::Config)?;

        let mut router = Router::new();
        handlers::register_routes(&mut router);

        let ctx = AppContext::new(store, &config.public_dir);
        let pool = WorkerPool::new(config.workers, config.queue_capacity)?;

        Ok(Self {
            config,
            router: Arc::new(router),
            ctx: Arc::new(ctx),
            pool,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn context(&self) -> &Arc<AppContext> {
        &self.ctx
    }

    /// Crea el socket de escucha (SO_REUSEADDR, backlog configurable)
    ///
    /// El listener queda en modo no bloqueante para poder consultar el flag
    /// de apagado entre intentos de `accept`.
    pub fn bind(&self) -> Result<TcpListener, ServerError> {
        let address = self.config.address();
        let addr = resolve_address(&address)?;
        let bind_error = |source: io::Error| ServerError::Bind {
            address: address.clone(),
            source,
        };

        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
            .map_err(bind_error)?;
        socket.set_reuse_address(true).map_err(bind_error)?;
        socket.bind(&addr.into()).map_err(bind_error)?;
        socket.listen(self.config.backlog).map_err(bind_error)?;
        socket.set_nonblocking(true).map_err(bind_error)?;

        let listener: TcpListener = socket.into();
        log::info!("Servidor escuchando en {}", listener.local_addr()?);
        Ok(listener)
    }

    /// Bucle de aceptación hasta que `shutdown` se active
    ///
    /// Los errores de `accept` se registran y el bucle sigue.
    pub fn serve(&self, listener: TcpListener, shutdown: &AtomicBool) -> Result<(), ServerError> {
        let recv_timeout = Duration::from_millis(self.config.recv_timeout_ms);

        while !shutdown.load(Ordering::SeqCst) {
            match listener.accept() {
                Ok((stream, peer)) => self.dispatch(stream, peer, recv_timeout),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    log::warn!("Error al aceptar conexión: {}", e);
                }
            }
        }

        log::info!("Dejando de aceptar conexiones");
        Ok(())
    }

    fn dispatch(&self, stream: TcpStream, peer: SocketAddr, recv_timeout: Duration) {
        if let Err(e) = prepare_stream(&stream, recv_timeout) {
            log::warn!("No se pudo configurar la conexión de {}: {}", peer, e);
            return;
        }

        let router = Arc::clone(&self.router);
        let ctx = Arc::clone(&self.ctx);

        let submitted = self.pool.submit(move || {
            if let Err(e) = handle_connection(stream, &router, &ctx) {
                log::warn!("Error atendiendo a {}: {}", peer, e);
            }
        });

        // El job rechazado se descarta con el stream dentro: la conexión se cierra
        if submitted.is_err() {
            log::warn!("Pool no disponible, conexión de {} descartada", peer);
        }
    }

    /// Vacía el pool y cierra el store
    pub fn shutdown(&self) {
        self.pool.shutdown();
        self.ctx.store().close();
        log::info!("Servidor detenido");
    }

    /// Arranca el servidor y bloquea hasta recibir SIGINT/SIGTERM
    pub fn run(self) -> Result<(), ServerError> {
        signal::install()?;
        let listener = self.bind()?;

        let result = self.serve(listener, signal::shutdown_flag());
        self.shutdown();
        result
    }
}

fn resolve_address(address: &str) -> Result<SocketAddr, ServerError> {
    address
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or_else(|| ServerError::Address(address.to_string()))
}

/// Las conexiones aceptadas heredan el modo no bloqueante del listener
fn prepare_stream(stream: &TcpStream, recv_timeout: Duration) -> io::Result<()> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(recv_timeout))?;
    Ok(())
}

/// Atiende una conexión completa: un request, una respuesta
///
/// Una conexión sin datos, un timeout de lectura o un request inválido se
/// cierran sin escribir nada.
pub fn handle_connection(mut stream: TcpStream, router: &Router, ctx: &AppContext) -> io::Result<()> {
    let start = Instant::now();

    // Un byte más que el máximo para detectar requests demasiado grandes
    let mut buffer = vec![0u8; MAX_REQUEST_SIZE + 1];
    let bytes_read = match stream.read(&mut buffer) {
        Ok(0) => {
            log::debug!("Conexión cerrada sin datos");
            return Ok(());
        }
        Ok(n) => n,
        Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
            log::debug!("Timeout de lectura");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let request = match Request::parse(&buffer[..bytes_read]) {
        Ok(request) => request,
        Err(e) => {
            log::warn!("Request rechazado: {}", e);
            return Ok(());
        }
    };

    let method = request.method().as_str().to_string();
    let path = request.path().to_string();

    let response = router.route(request, ctx);
    stream.write_all(&response.to_bytes())?;
    stream.flush()?;

    log::info!(
        "{} {} → {} ({:.2}ms)",
        method,
        path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}
