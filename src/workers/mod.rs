//! # Workers
//!
//! Pool fijo de threads que atiende conexiones aceptadas.
//!
//! ```text
//! acceptor ──submit──→ [ cola circular acotada ] ──pop──→ worker-0..N
//! ```
//!
//! - `queue`: buffer circular FIFO sin sincronización propia
//! - `pool`: threads, lock, condvars y shutdown ordenado

pub mod pool;
pub mod queue;

pub use pool::{Job, PoolError, SubmitError, WorkerPool};
pub use queue::RingQueue;
