// Server loop module
// Accepts connections until shutdown, then drains in-flight connections

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Poll interval while waiting for connections to drain
const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Serve `listener` until `shutdown` resolves.
///
/// After shutdown the listener is closed, open connections are told to close
/// once their current request is done, and they get up to
/// `performance.shutdown_timeout` seconds to finish. Returns the number of
/// connections still open when the wait ended.
pub async fn serve<S>(listener: TcpListener, state: Arc<AppState>, shutdown: S) -> usize
where
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let (stop_tx, stop_rx) = watch::channel(false);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, stop_rx.clone());
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = &mut shutdown => break,
        }
    }

    drop(listener);
    stop_tx.send_replace(true);
    drain_connections(&state).await
}

async fn drain_connections(state: &AppState) -> usize {
    logger::log_shutdown_started(state.connection_count());

    let deadline = tokio::time::Instant::now()
        + Duration::from_secs(state.config.performance.shutdown_timeout);

    while state.connection_count() > 0 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(DRAIN_POLL).await;
    }

    let remaining = state.connection_count();
    logger::log_shutdown_complete(remaining);
    remaining
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, EnvOverrides};
    use crate::server::create_listener;
    use std::net::SocketAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    fn test_config() -> Config {
        let mut config =
            Config::load_from("no-such-config-file", &EnvOverrides::default()).unwrap();
        config.logging.access_log = false;
        config.performance.shutdown_timeout = 2;
        config
    }

    fn test_state(max_connections: Option<u64>) -> Arc<AppState> {
        let mut config = test_config();
        config.performance.max_connections = max_connections;
        Arc::new(AppState::new(config))
    }

    async fn start(
        state: Arc<AppState>,
    ) -> (SocketAddr, oneshot::Sender<()>, tokio::task::JoinHandle<usize>) {
        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(serve(listener, state, async {
            let _ = rx.await;
        }));
        (addr, tx, handle)
    }

    async fn raw_request(addr: SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        // A rejected connection may already be reset
        let _ = stream.write_all(request.as_bytes()).await;
        let mut buf = Vec::new();
        let _ = stream.read_to_end(&mut buf).await;
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[tokio::test]
    async fn test_serves_health_over_tcp() {
        let (addr, tx, handle) = start(test_state(None)).await;

        let response = raw_request(
            addr,
            "GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
        assert!(response.contains(r#"{"status":"ok","service":"danaverse-api"}"#));

        tx.send(()).unwrap();
        assert_eq!(handle.await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_post_with_body_is_created() {
        let (addr, tx, handle) = start(test_state(None)).await;

        let response = raw_request(
            addr,
            "POST /api/v1/projects HTTP/1.1\r\nHost: localhost\r\nContent-Type: text/plain\r\n\
             Content-Length: 9\r\nConnection: close\r\n\r\nnot json!",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 201 Created"), "{response}");
        assert!(response.contains(r#"{"message":"Create project endpoint - coming soon"}"#));

        tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_route_over_tcp() {
        let (addr, tx, handle) = start(test_state(None)).await;

        let response = raw_request(
            addr,
            "GET /nope HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 404 Not Found"), "{response}");

        tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_limit_rejects() {
        let (addr, tx, handle) = start(test_state(Some(0))).await;

        let response = raw_request(
            addr,
            "GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.is_empty(), "{response}");

        tx.send(()).unwrap();
        assert_eq!(handle.await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_zero_timeouts_still_serve() {
        let mut config = test_config();
        config.performance.read_timeout = 0;
        config.performance.write_timeout = 0;
        let (addr, tx, handle) = start(Arc::new(AppState::new(config))).await;

        let response = raw_request(
            addr,
            "GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");

        tx.send(()).unwrap();
        assert_eq!(handle.await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_closes_idle_keep_alive() {
        let mut config = test_config();
        config.performance.shutdown_timeout = 10;
        let state = Arc::new(AppState::new(config));
        let (addr, tx, handle) = start(Arc::clone(&state)).await;

        // Keep-alive request; the connection stays open after the response
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        let mut buf = [0u8; 1024];
        let n = stream.read(&mut buf).await.unwrap();
        assert!(buf[..n].starts_with(b"HTTP/1.1 200 OK"));
        assert_eq!(state.connection_count(), 1);

        let started = tokio::time::Instant::now();
        tx.send(()).unwrap();
        assert_eq!(handle.await.unwrap(), 0);
        assert!(started.elapsed() < Duration::from_secs(5));

        // Server side closed the idle connection
        let n = stream.read(&mut buf).await.unwrap_or(0);
        assert_eq!(n, 0);
    }
}
