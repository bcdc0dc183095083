//! Echo server on a random loopback port.
//!
//! Accepted TCP streams are handed straight to the engine; the HTTP upgrade
//! is skipped since the engine only sees post-upgrade bytes.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use wsecho::{Config, serve};

pub struct TestServer {
    accept_loop: JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> (Self, SocketAddr) {
        Self::spawn_with(Config::default()).await
    }

    pub async fn spawn_with(config: Config) -> (Self, SocketAddr) {
        super::init_tracing();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let accept_loop = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let _ = stream.set_nodelay(true);
                tokio::spawn(serve(stream, config.clone()));
            }
        });

        (Self { accept_loop }, addr)
    }

    pub async fn shutdown(self) {
        self.accept_loop.abort();
        let _ = self.accept_loop.await;
    }
}
