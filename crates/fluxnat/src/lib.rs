//! In-place NAT for IPv4 packets.
//!
//! Rewrites source or destination sockets, addresses and ports of TCP, UDP
//! and ICMP packets and keeps the IP and transport checksums consistent with
//! RFC 1624 incremental updates, never rescanning the payload.
//!
//! ```
//! use std::net::Ipv4Addr;
//! use fluxnat::{snat, Ipv4Packet, PacketBuilder, Socket};
//!
//! let mut buf = PacketBuilder::tcp(
//!     Socket::new(Ipv4Addr::new(10, 0, 0, 5), 4000),
//!     Socket::new(Ipv4Addr::new(10, 0, 0, 1), 80),
//! )
//! .build()?;
//!
//! let mut pkt = Ipv4Packet::new(&mut buf)?;
//! snat(&mut pkt, Socket::new(Ipv4Addr::new(203, 0, 113, 9), 50000));
//! assert!(pkt.checksums_valid());
//! # Ok::<(), fluxnat::NatError>(())
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod packet;
pub mod socket;
pub mod translate;

pub use fluxnat_proto as proto;

pub use builder::PacketBuilder;
pub use config::UdpChecksumPolicy;
pub use error::{NatError, Result};
pub use packet::{Direction, IcmpView, Ipv4Packet, PacketView, PortView, TcpView, Transport, UdpView};
pub use socket::Socket;
pub use translate::{
    dnat, icmp_dnat, icmp_snat, snat, tcp_dnat, tcp_snat, translate, udp_dnat, udp_snat,
    Replacement, Translator,
};
