//! WebSocket server
//!
//! Accepts TCP connections, upgrades them to WebSocket, and gives each one
//! its own task and [`Session`]. Within a connection requests are strictly
//! sequential: a reply is sent before the next message is read.

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{accept_async, WebSocketStream};
use tracing::{debug, info, warn};

use crate::dispatch::{Dispatcher, MessageChannel};
use crate::error::{GatewayError, Result};
use crate::session::Session;

/// [`MessageChannel`] over a server-side WebSocket.
pub struct WsChannel {
    stream: WebSocketStream<TcpStream>,
}

impl WsChannel {
    pub fn new(stream: WebSocketStream<TcpStream>) -> Self {
        Self { stream }
    }
}

fn transport(e: tungstenite::Error) -> GatewayError {
    GatewayError::Transport(e.to_string())
}

#[async_trait]
impl MessageChannel for WsChannel {
    async fn recv(&mut self) -> Result<Option<String>> {
        while let Some(msg) = self.stream.next().await {
            match msg {
                Ok(Message::Text(text)) => return Ok(Some(text.as_str().to_owned())),
                Ok(Message::Close(_)) => return Ok(None),
                Ok(Message::Binary(_)) => debug!("ignoring binary frame"),
                // Ping/pong are answered by tungstenite itself.
                Ok(_) => {}
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    return Ok(None)
                }
                Err(e) => return Err(transport(e)),
            }
        }
        Ok(None)
    }

    async fn send(&mut self, text: String) -> Result<()> {
        self.stream
            .send(Message::Text(text.into()))
            .await
            .map_err(transport)
    }
}

pub struct Server {
    listener: TcpListener,
    dispatcher: Dispatcher,
    base_dir: PathBuf,
}

impl Server {
    pub async fn bind(addr: &str, dispatcher: Dispatcher, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            dispatcher,
            base_dir: base_dir.into(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever.
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Accept connections until `shutdown` resolves. Connections already
    /// open keep running on their own tasks.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        info!(addr = %self.local_addr()?, "gateway listening");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (stream, addr) = match accepted {
                        Ok(pair) => pair,
                        Err(e) => {
                            warn!(error = %e, "accept failed");
                            continue;
                        }
                    };
                    let dispatcher = self.dispatcher.clone();
                    let base_dir = self.base_dir.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, addr, dispatcher, base_dir).await {
                            warn!(%addr, error = %e, "connection ended with error");
                        }
                    });
                }
                _ = &mut shutdown => {
                    info!("shutting down listener");
                    return Ok(());
                }
            }
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    dispatcher: Dispatcher,
    base_dir: PathBuf,
) -> Result<()> {
    let ws = accept_async(stream).await.map_err(transport)?;
    info!(%addr, "connection established");

    let mut channel = WsChannel::new(ws);
    let mut session = Session::new(addr.to_string(), base_dir);
    let result = dispatcher.serve_session(&mut channel, &mut session).await;

    let age = Utc::now() - session.started_at();
    info!(%addr, messages = session.messages(), "connection closed");
    debug!(
        %addr,
        duration_ms = age.num_milliseconds(),
        cwd = %session.directory().current().display(),
        directory_changes = session.directory().history().len(),
        "session summary"
    );
    result
}
