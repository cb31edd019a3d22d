pub mod checksum;
pub mod ipv4;
pub mod udp;
pub mod tcp;
pub mod icmp;

pub use checksum::checksum;
pub use ipv4::{Ipv4Header, Protocol, parse_ipv4_mut};
pub use udp::{UdpHeader, parse_udp_mut};
pub use tcp::{TcpHeader, parse_tcp_mut};
pub use icmp::{IcmpHeader, parse_icmp_mut};

pub trait TransportHeader {
    fn src_port(&self) -> u16;
    fn dst_port(&self) -> u16;
    fn set_src_port(&mut self, port: u16);
    fn set_dst_port(&mut self, port: u16);
    fn checksum(&self) -> u16;
    fn set_checksum(&mut self, check: u16);
}
