use std::process::ExitCode;
use std::sync::Arc;

mod api;
mod config;
mod error;
mod http;
mod logger;
mod routing;
mod server;

use crate::config::{AppState, Config};
use crate::error::StartupError;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_error(&format!("Failed to start server: {e}"));
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), StartupError> {
    let cfg = Config::load()?;
    logger::init(&cfg).map_err(StartupError::Logger)?;

    // Build the Tokio runtime, sizing worker threads from config
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build().map_err(StartupError::Runtime)?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), StartupError> {
    let addr = cfg.socket_addr()?;
    let listener =
        server::create_listener(addr).map_err(|source| StartupError::Bind { addr, source })?;
    let bound = listener.local_addr().unwrap_or(addr);

    let state = Arc::new(AppState::new(cfg));
    logger::log_server_start(&bound, &state.config, &state.routes);

    server::serve(listener, state, server::shutdown_signal()).await;
    Ok(())
}
