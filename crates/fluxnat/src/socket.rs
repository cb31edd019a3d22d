use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};

/// An IPv4 address and port, used as the new value of a socket rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Socket {
    address: Ipv4Addr,
    port: u16,
}

impl Socket {
    pub const fn new(address: Ipv4Addr, port: u16) -> Self {
        Self { address, port }
    }

    pub const fn address(&self) -> Ipv4Addr {
        self.address
    }

    pub const fn port(&self) -> u16 {
        self.port
    }
}

impl From<SocketAddrV4> for Socket {
    fn from(addr: SocketAddrV4) -> Self {
        Self::new(*addr.ip(), addr.port())
    }
}

impl From<Socket> for SocketAddrV4 {
    fn from(sock: Socket) -> Self {
        SocketAddrV4::new(sock.address, sock.port)
    }
}

impl fmt::Display for Socket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}
