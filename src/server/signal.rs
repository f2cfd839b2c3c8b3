//! # Señales
//! src/server/signal.rs
//!
//! SIGINT y SIGTERM activan un flag global que el acceptor consulta entre
//! intentos de `accept`. El handler sólo hace un store atómico.

use crate::error::ServerError;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_signal(_sig: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

/// Instala el handler para SIGINT y SIGTERM
pub fn install() -> Result<(), ServerError> {
    for sig in [libc::SIGINT, libc::SIGTERM] {
        // SAFETY: el handler es async-signal-safe (sólo escribe un atómico)
        let previous = unsafe { libc::signal(sig, handle_signal as libc::sighandler_t) };
        if previous == libc::SIG_ERR {
            return Err(ServerError::Signal(io::Error::last_os_error()));
        }
    }

    log::debug!("Handlers de SIGINT/SIGTERM instalados");
    Ok(())
}

/// Flag que consulta el acceptor
pub fn shutdown_flag() -> &'static AtomicBool {
    &SHUTDOWN_REQUESTED
}
