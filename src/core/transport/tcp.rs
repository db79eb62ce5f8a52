//! TCP transport implementation.
//!
//! Line-delimited JSON-RPC over raw TCP sockets. Each connection gets its own
//! MCP session; all sessions share the server's gateway.

use std::net::SocketAddr;
use std::time::Duration;

use rmcp::ServiceExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{Instrument, info, info_span, warn};

use super::{TransportError, TransportResult, config::TcpConfig};
use crate::core::McpServer;

/// Pause after a failed `accept` before trying again.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// TCP transport handler.
pub struct TcpTransport {
    config: TcpConfig,
}

impl TcpTransport {
    /// Create a new TCP transport with the given config.
    pub fn new(config: TcpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Run the TCP transport. Never returns unless binding fails.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        info!("{} listening on {} (JSON-RPC over TCP)", server.name(), addr);

        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!("Failed to accept connection: {}", e);
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };

            if let Err(e) = stream.set_nodelay(true) {
                warn!("Failed to set TCP_NODELAY for {}: {}", peer, e);
            }

            tokio::spawn(
                Self::serve_client(server.clone(), stream, peer)
                    .instrument(info_span!("tcp_client", %peer)),
            );
        }
    }

    /// Serve one MCP session until the client disconnects.
    async fn serve_client(server: McpServer, stream: TcpStream, peer: SocketAddr) {
        info!("Accepted connection from {}", peer);

        let service = match server.serve(stream).await {
            Ok(service) => service,
            Err(e) => {
                warn!("MCP handshake with {} failed: {}", peer, e);
                return;
            }
        };

        match service.waiting().await {
            Ok(reason) => info!("Client {} disconnected: {:?}", peer, reason),
            Err(e) => warn!("Session with {} ended with error: {:?}", peer, e),
        }
    }
}
