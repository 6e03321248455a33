// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)

use crate::logger;

/// Resolve when the process is asked to stop
///
/// | Signal  | Action        |
/// |---------|---------------|
/// | SIGTERM | Graceful stop |
/// | SIGINT  | Graceful stop |
///
/// Non-Unix targets only see Ctrl+C.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => logger::log_info("[SIGNAL] SIGTERM received"),
                    _ = sigint.recv() => logger::log_info("[SIGNAL] SIGINT received (Ctrl+C)"),
                }
                return;
            }
            (Err(e), _) | (_, Err(e)) => {
                logger::log_error(&format!(
                    "Failed to register signal handlers: {e}, falling back to Ctrl+C"
                ));
            }
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => logger::log_info("[SIGNAL] Ctrl+C received"),
        Err(e) => {
            logger::log_error(&format!("Failed to listen for Ctrl+C: {e}"));
            // Nothing can trigger shutdown; keep serving
            std::future::pending::<()>().await;
        }
    }
}
