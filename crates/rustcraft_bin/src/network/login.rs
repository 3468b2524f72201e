//! A minimal handshake → login flow, the demonstration binary's one
//! concrete consumer of `rustcraft_protocol`'s framing and
//! `rustcraft_encoding`'s wire codec. Offline-mode only (no Yggdrasil
//! round trip, no encryption handshake) — `spec.md` §1 puts the
//! session/login state machine beyond this thin flow out of scope.

use anyhow::{Result, anyhow};
use bytes::BytesMut;
use rustcraft_encoding::endian;
use rustcraft_encoding::string;
use rustcraft_encoding::varint::varint_i32;
use rustcraft_protocol::framing;
use tokio::net::TcpStream;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::consts::NETWORK_VALID_PROTOCOL_VERSION;

#[derive(Debug, Clone)]
pub struct PlayerLogin {
    pub username: String,
    pub uuid: Uuid,
}

pub struct LoginHandler {
    stream: TcpStream,
    buf: BytesMut,
    protocol_version: i32,
}

impl From<TcpStream> for LoginHandler {
    fn from(stream: TcpStream) -> Self {
        LoginHandler { stream, buf: BytesMut::new(), protocol_version: 0 }
    }
}

impl LoginHandler {
    pub async fn handle_login(&mut self) -> Result<PlayerLogin> {
        debug!("[LOGIN] starting login flow");

        if let Err(e) = self.read_handshake().await {
            warn!("[LOGIN] handshake failed: {e}");
            self.send_disconnect("Invalid handshake").await.ok();
            return Err(e);
        }
        debug!("[LOGIN] handshake received, protocol version: {}", self.protocol_version);

        if self.protocol_version != NETWORK_VALID_PROTOCOL_VERSION {
            warn!(
                "[LOGIN] protocol version mismatch: {} (expected {})",
                self.protocol_version, NETWORK_VALID_PROTOCOL_VERSION
            );
            self.send_disconnect("Outdated client or server!").await.ok();
            return Err(anyhow!(
                "protocol version mismatch: {} vs {}",
                self.protocol_version,
                NETWORK_VALID_PROTOCOL_VERSION
            ));
        }

        let username = match self.read_login_start().await {
            Ok(name) => name,
            Err(e) => {
                warn!("[LOGIN] login start failed: {e}");
                self.send_disconnect("Invalid username").await.ok();
                return Err(e);
            }
        };

        if !Self::is_valid_username(&username) {
            warn!("[LOGIN] invalid username: {username}");
            self.send_disconnect("Invalid username").await.ok();
            return Err(anyhow!("invalid username: {username}"));
        }

        let uuid = Self::generate_offline_uuid(&username);
        self.send_login_success(&username, &uuid).await?;
        self.read_login_acknowledged().await?;

        info!("[LOGIN] player '{username}' ({uuid}) logged in");
        Ok(PlayerLogin { username, uuid })
    }

    async fn read_handshake(&mut self) -> Result<()> {
        let body = framing::read_packet_body(&mut self.stream, &mut self.buf)
            .await
            .map_err(|e| anyhow!("handshake framing error: {e}"))?;

        let (packet_id, rest) = varint_i32::decode(&body)?;
        if packet_id != 0x00 {
            return Err(anyhow!("expected Handshake packet (0x00), got {packet_id:#x}"));
        }
        let (version, rest) = varint_i32::decode(rest)?;
        let (_server_addr, rest) = string::decode(rest)?;
        let (_server_port, rest) = endian::read_be::<u16>(rest)?;
        let (next_state, _rest) = varint_i32::decode(rest)?;

        if next_state != 1 && next_state != 2 {
            return Err(anyhow!("expected Status (1) or Login (2) state, got {next_state}"));
        }
        self.protocol_version = version;
        Ok(())
    }

    async fn read_login_start(&mut self) -> Result<String> {
        let body = framing::read_packet_body(&mut self.stream, &mut self.buf)
            .await
            .map_err(|e| anyhow!("login start framing error: {e}"))?;

        let (packet_id, rest) = varint_i32::decode(&body)?;
        if packet_id != 0x00 {
            return Err(anyhow!("expected Login Start packet (0x00), got {packet_id:#x}"));
        }
        let (username, _rest) = string::decode(rest)?;
        Ok(username)
    }

    async fn read_login_acknowledged(&mut self) -> Result<()> {
        let body = framing::read_packet_body(&mut self.stream, &mut self.buf)
            .await
            .map_err(|e| anyhow!("login acknowledged framing error: {e}"))?;

        let (packet_id, _rest) = varint_i32::decode(&body)?;
        if packet_id != 0x03 {
            return Err(anyhow!("expected Login Acknowledged packet (0x03), got {packet_id:#x}"));
        }
        Ok(())
    }

    async fn send_login_success(&mut self, username: &str, uuid: &Uuid) -> Result<()> {
        let mut body = Vec::new();
        varint_i32::encode(0x02, &mut body);
        body.extend_from_slice(uuid.as_bytes());
        string::encode(username, &mut body)?;
        varint_i32::encode(0, &mut body); // properties: empty array

        let mut staging = BytesMut::new();
        framing::write_packet(&mut self.stream, &mut staging, &body)
            .await
            .map_err(|e| anyhow!("login success framing error: {e}"))
    }

    async fn send_disconnect(&mut self, reason: &str) -> Result<()> {
        let escaped = reason
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t");
        let json = format!(r#"{{"text":"{escaped}"}}"#);

        let mut body = Vec::new();
        varint_i32::encode(0x00, &mut body);
        string::encode(&json, &mut body)?;

        let mut staging = BytesMut::new();
        framing::write_packet(&mut self.stream, &mut staging, &body)
            .await
            .map_err(|e| anyhow!("disconnect framing error: {e}"))
    }

    fn generate_offline_uuid(username: &str) -> Uuid {
        let namespace = Uuid::NAMESPACE_DNS;
        let offline_name = format!("OfflinePlayer:{username}");
        Uuid::new_v3(&namespace, offline_name.as_bytes())
    }

    fn is_valid_username(username: &str) -> bool {
        if username.is_empty() || username.len() > 16 {
            return false;
        }
        username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    pub fn into_stream(self) -> TcpStream {
        self.stream
    }
}
