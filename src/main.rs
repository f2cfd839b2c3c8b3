//! # Users Server - Entry Point
//! src/main.rs
//!
//! ```bash
//! ./server [port] [workers] [queue] [--db-path FILE] [--public-dir DIR]
//! RUST_LOG=debug ./server 8080
//! ```

use users_server::config::Config;
use users_server::server::Server;

fn main() {
    pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .init();

    let config = Config::from_args();
    config.print_summary();

    let server = match Server::new(config) {
        Ok(server) => server,
        Err(e) => {
            log::error!("No se pudo iniciar el servidor: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        log::error!("Error fatal: {}", e);
        std::process::exit(1);
    }
}
