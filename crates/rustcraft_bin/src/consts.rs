use std::net::{IpAddr, Ipv4Addr, SocketAddr};

const SERVER_PORT: u16 = 25565;

pub const SERVER_ADDR: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), SERVER_PORT);

pub const NETWORK_VALID_PROTOCOL_VERSION: i32 = 772; // Minecraft 1.21.7
