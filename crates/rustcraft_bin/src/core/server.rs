use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use bytes::BytesMut;
use rustcraft_config::ProtocolSettings;
use rustcraft_protocol::AsyncByteStream;
use rustcraft_protocol::framing::{self, FramingReadError};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tracing::{debug, error, info};

#[cfg(feature = "dev-sdk")]
use rustcraft_protocol::debug::DebugStream;
#[cfg(feature = "dev-sdk")]
use rustcraft_sdk::CaptureSink;

use crate::network::{LoginHandler, PlayerLogin};

pub struct MinecraftServer {
    listener: TcpListener,
    settings: Arc<ProtocolSettings>,
}

impl MinecraftServer {
    pub async fn new<A>(addr: A) -> Result<Self>
    where
        A: ToSocketAddrs + Display,
    {
        let listener = TcpListener::bind(&addr).await?;
        info!("[STARTUP] Server listening on {addr}");
        Ok(Self { listener, settings: Arc::new(ProtocolSettings::default()) })
    }

    pub async fn run(self) -> Result<()> {
        info!("[STARTUP] Ready to accept connections.");

        let settings = self.settings;
        loop {
            tokio::select! {
                biased; // futures are polled in the order they appear

                res = self.listener.accept() => {
                    handle_accept(Arc::clone(&settings), res).await;
                }
            }
        }
    }
}

async fn handle_accept(
    settings: Arc<ProtocolSettings>,
    res: std::io::Result<(TcpStream, SocketAddr)>,
) {
    let (socket, addr) = match res {
        Ok(pair) => pair,
        Err(e) => {
            error!("[NETWORK] accept error: {e}");
            return;
        }
    };
    info!("[CONNECTION] new connection from {addr}");

    tokio::spawn(async move {
        if let Err(e) = handle_client(socket, settings).await {
            error!("[CLIENT] connection error: {e}");
        }
    });
}

async fn handle_client(socket: TcpStream, settings: Arc<ProtocolSettings>) -> Result<()> {
    let mut login = LoginHandler::from(socket);
    let player = login.handle_login().await?;
    let socket = login.into_stream();

    #[cfg(feature = "dev-sdk")]
    {
        let sink = CaptureSink::logging_only();
        let mut stream = DebugStream::new(socket, sink, settings.debug.clone())
            .map_err(|e| anyhow::anyhow!("debug layer init failed: {e}"))?;
        let result = run_echo_loop(&mut stream, &player, &settings).await;
        stream.flush();
        return result;
    }

    #[cfg(not(feature = "dev-sdk"))]
    {
        let mut stream = socket;
        run_echo_loop(&mut stream, &player, &settings).await
    }
}

/// Demonstrates the framing layer end to end: reads length-prefixed
/// packet bodies and writes each one straight back out, until the peer
/// closes the connection.
async fn run_echo_loop(
    stream: &mut impl AsyncByteStream,
    player: &PlayerLogin,
    settings: &ProtocolSettings,
) -> Result<()> {
    let mut buf = BytesMut::new();
    let mut staging = BytesMut::new();
    loop {
        let body =
            match framing::read_packet_body_limited(stream, &mut buf, settings.max_packet_len)
                .await
            {
                Ok(body) => body,
                Err(FramingReadError::Io(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    info!("[CONNECTION] {} disconnected", player.username);
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };

        debug!("[PACKET] {} bytes from {}", body.len(), player.username);
        framing::write_packet(stream, &mut staging, &body).await?;
    }
}
