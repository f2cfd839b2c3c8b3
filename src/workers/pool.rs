//! # Pool de Workers
//! src/workers/pool.rs
//!
//! Número fijo de threads que consumen una cola acotada de jobs.
//!
//! ## Sincronización
//!
//! - Un único `Mutex` protege la cola y el flag de shutdown.
//! - `not_empty`: los workers esperan aquí cuando no hay jobs.
//! - `not_full`: `submit` espera aquí cuando la cola está llena.
//!
//! El job se saca de la cola con el lock tomado y se ejecuta sin él, de modo
//! que ningún worker retiene la cola mientras atiende una conexión.
//!
//! ## Shutdown
//!
//! `shutdown()` activa el flag, despierta a todos y espera a que cada worker
//! termine. Los workers vacían la cola antes de salir. Llamarlo más de una vez
//! no hace nada.

use super::queue::RingQueue;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use thiserror::Error;

/// Trabajo que ejecuta un worker (en el servidor, atender una conexión)
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Errores al crear el pool
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("Worker count must be at least 1")]
    NoWorkers,

    #[error("Queue capacity must be at least 1")]
    NoCapacity,

    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// El pool ya no acepta trabajo
///
/// Devuelve el job para que el llamador decida qué hacer con él (el
/// servidor simplemente lo descarta, cerrando la conexión).
#[derive(Error)]
#[error("Worker pool is shutting down")]
pub struct SubmitError(pub Job);

impl std::fmt::Debug for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SubmitError(..)")
    }
}

struct PoolState {
    queue: RingQueue<Job>,
    shutdown: bool,
}

struct Shared {
    state: Mutex<PoolState>,
    not_empty: Condvar,
    not_full: Condvar,
}

impl Shared {
    /// Un job con panic no deja el estado a medias (se ejecuta fuera del
    /// lock), así que un lock envenenado se puede seguir usando.
    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Pool de tamaño fijo con cola FIFO acotada
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    size: usize,
    capacity: usize,
}

impl WorkerPool {
    /// Arranca `workers` threads sobre una cola de `capacity` huecos
    ///
    /// Si falla la creación de algún thread, se apagan los ya creados.
    pub fn new(workers: usize, capacity: usize) -> Result<Self, PoolError> {
        if workers == 0 {
            return Err(PoolError::NoWorkers);
        }
        if capacity == 0 {
            return Err(PoolError::NoCapacity);
        }

        let shared = Arc::new(Shared {
            state: Mutex::new(PoolState {
                queue: RingQueue::with_capacity(capacity),
                shutdown: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        });

        let pool = Self {
            shared,
            workers: Mutex::new(Vec::with_capacity(workers)),
            size: workers,
            capacity,
        };

        for id in 0..workers {
            let shared = Arc::clone(&pool.shared);
            let spawned = thread::Builder::new()
                .name(format!("worker-{}", id))
                .spawn(move || worker_loop(id, shared));

            match spawned {
                Ok(handle) => pool.lock_workers().push(handle),
                Err(e) => {
                    log::error!("No se pudo crear worker {}: {}", id, e);
                    pool.shutdown();
                    return Err(PoolError::Spawn(e));
                }
            }
        }

        log::info!("Pool iniciado: {} workers, cola de {}", workers, capacity);
        Ok(pool)
    }

    /// Encola un job
    ///
    /// Bloquea mientras la cola esté llena. Falla de inmediato si el pool
    /// está apagándose (también si empieza a apagarse durante la espera).
    pub fn submit<F>(&self, job: F) -> Result<(), SubmitError>
    where
        F: FnOnce() + Send + 'static,
    {
        let job: Job = Box::new(job);
        let mut state = self.shared.lock();

        while state.queue.is_full() && !state.shutdown {
            state = self
                .shared
                .not_full
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        if state.shutdown {
            return Err(SubmitError(job));
        }

        if let Err(job) = state.queue.push(job) {
            return Err(SubmitError(job));
        }
        drop(state);

        self.shared.not_empty.notify_one();
        Ok(())
    }

    /// Detiene el pool y espera a todos los workers
    ///
    /// Si otro thread ya está apagando el pool, espera a que termine de
    /// unir a los workers antes de volver.
    pub fn shutdown(&self) {
        {
            let mut state = self.shared.lock();
            if !state.shutdown {
                log::info!("Apagando pool ({} jobs pendientes)", state.queue.len());
            }
            state.shutdown = true;
        }

        self.shared.not_empty.notify_all();
        self.shared.not_full.notify_all();

        // El lock se mantiene durante los joins
        let mut workers = self.lock_workers();
        for handle in workers.drain(..) {
            let name = handle.thread().name().unwrap_or("worker").to_string();
            if handle.join().is_err() {
                log::error!("{} terminó con panic", name);
            }
        }
    }

    /// Número de workers
    pub fn size(&self) -> usize {
        self.size
    }

    /// Capacidad de la cola
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Jobs esperando en la cola
    pub fn queued(&self) -> usize {
        self.shared.lock().queue.len()
    }

    pub fn is_shutdown(&self) -> bool {
        self.shared.lock().shutdown
    }

    fn lock_workers(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(id: usize, shared: Arc<Shared>) {
    log::debug!("Worker {} iniciado", id);

    loop {
        let job = {
            let mut state = shared.lock();
            loop {
                if let Some(job) = state.queue.pop() {
                    break Some(job);
                }
                if state.shutdown {
                    break None;
                }
                state = shared
                    .not_empty
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        };

        let Some(job) = job else {
            break;
        };

        shared.not_full.notify_one();

        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
            log::error!("Worker {}: job terminó con panic: {}", id, panic_message(&payload));
        }
    }

    log::debug!("Worker {} terminado", id);
}

fn panic_message(payload: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
