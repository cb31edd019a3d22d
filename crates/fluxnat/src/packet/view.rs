use std::net::Ipv4Addr;

use fluxnat_proto::{IcmpHeader, Ipv4Header, TcpHeader, TransportHeader, UdpHeader};

use crate::socket::Socket;

/// Which endpoint of a packet a translation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Source,
    Destination,
}

pub trait PacketView {
    fn ip(&self) -> &Ipv4Header;
    fn ip_mut(&mut self) -> &mut Ipv4Header;

    fn address(&self, direction: Direction) -> Ipv4Addr {
        match direction {
            Direction::Source => self.ip().src_addr(),
            Direction::Destination => self.ip().dst_addr(),
        }
    }

    fn set_address(&mut self, direction: Direction, addr: Ipv4Addr) {
        match direction {
            Direction::Source => self.ip_mut().set_src_addr(addr),
            Direction::Destination => self.ip_mut().set_dst_addr(addr),
        }
    }
}

#[derive(Debug)]
pub struct PortView<'p, H> {
    ip: &'p mut Ipv4Header,
    l4: &'p mut H,
}

pub type TcpView<'p> = PortView<'p, TcpHeader>;
pub type UdpView<'p> = PortView<'p, UdpHeader>;

impl<'p, H: TransportHeader> PortView<'p, H> {
    pub(crate) fn new(ip: &'p mut Ipv4Header, l4: &'p mut H) -> Self {
        Self { ip, l4 }
    }

    pub fn header(&self) -> &H {
        self.l4
    }

    pub fn header_mut(&mut self) -> &mut H {
        self.l4
    }

    pub fn port(&self, direction: Direction) -> u16 {
        match direction {
            Direction::Source => self.l4.src_port(),
            Direction::Destination => self.l4.dst_port(),
        }
    }

    pub fn set_port(&mut self, direction: Direction, port: u16) {
        match direction {
            Direction::Source => self.l4.set_src_port(port),
            Direction::Destination => self.l4.set_dst_port(port),
        }
    }

    pub fn socket(&self, direction: Direction) -> Socket {
        Socket::new(self.address(direction), self.port(direction))
    }

    /// Writes the address and port fields only. Checksums are not touched.
    pub fn set_socket(&mut self, direction: Direction, sock: Socket) {
        self.set_address(direction, sock.address());
        self.set_port(direction, sock.port());
    }
}

impl<H> PacketView for PortView<'_, H> {
    fn ip(&self) -> &Ipv4Header {
        self.ip
    }

    fn ip_mut(&mut self) -> &mut Ipv4Header {
        self.ip
    }
}

/// An ICMPv4 packet. The ICMP header is absent when the payload is too
/// short to hold one; address rewrites only need the IPv4 header.
#[derive(Debug)]
pub struct IcmpView<'p> {
    ip: &'p mut Ipv4Header,
    icmp: Option<&'p mut IcmpHeader>,
}

impl<'p> IcmpView<'p> {
    pub(crate) fn new(ip: &'p mut Ipv4Header, icmp: Option<&'p mut IcmpHeader>) -> Self {
        Self { ip, icmp }
    }

    pub fn header(&self) -> Option<&IcmpHeader> {
        self.icmp.as_deref()
    }
}

impl PacketView for IcmpView<'_> {
    fn ip(&self) -> &Ipv4Header {
        self.ip
    }

    fn ip_mut(&mut self) -> &mut Ipv4Header {
        self.ip
    }
}
