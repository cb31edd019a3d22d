//! Address and port translation with incremental checksum updates.
//!
//! [`Translator::translate`] is the dispatcher: it narrows a packet to its
//! transport view once and hands the typed view to the TCP, UDP or ICMP
//! translator. Combinations a protocol cannot express (ports on ICMP, any
//! rewrite on an unknown protocol) leave the packet untouched.
//!
//! Every translator applies all checksum adjustments for a field before it
//! overwrites the field.

pub mod icmp;
pub mod tcp;
pub mod udp;

use std::net::{Ipv4Addr, SocketAddrV4};

use fluxnat_proto::checksum;
use fluxnat_proto::{Ipv4Header, Protocol, TransportHeader};
use tracing::trace;

use crate::config::UdpChecksumPolicy;
use crate::packet::{Direction, Ipv4Packet, Transport};
use crate::socket::Socket;

/// The new value written by a translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replacement {
    Socket(Socket),
    Address(Ipv4Addr),
    Port(u16),
}

impl From<Socket> for Replacement {
    fn from(sock: Socket) -> Self {
        Replacement::Socket(sock)
    }
}

impl From<SocketAddrV4> for Replacement {
    fn from(addr: SocketAddrV4) -> Self {
        Replacement::Socket(addr.into())
    }
}

impl From<Ipv4Addr> for Replacement {
    fn from(addr: Ipv4Addr) -> Self {
        Replacement::Address(addr)
    }
}

impl From<u16> for Replacement {
    fn from(port: u16) -> Self {
        Replacement::Port(port)
    }
}

/// Stateless packet translator. Holds configuration only, so one value can
/// be shared freely across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Translator {
    udp_checksum: UdpChecksumPolicy,
}

impl Translator {
    pub const DEFAULT: Translator = Translator {
        udp_checksum: UdpChecksumPolicy::Skip,
    };

    pub fn new() -> Self {
        Self::DEFAULT
    }

    pub fn udp_checksum(mut self, policy: UdpChecksumPolicy) -> Self {
        self.udp_checksum = policy;
        self
    }

    pub fn udp_checksum_policy(&self) -> UdpChecksumPolicy {
        self.udp_checksum
    }

    /// Rewrites the `direction` endpoint of `pkt` with `replacement`.
    pub fn translate(
        &self,
        pkt: &mut Ipv4Packet<'_>,
        replacement: impl Into<Replacement>,
        direction: Direction,
    ) {
        let replacement = replacement.into();
        match pkt.transport() {
            Transport::Tcp(mut view) => tcp::rewrite(&mut view, direction, replacement),
            Transport::Udp(mut view) => {
                udp::rewrite(&mut view, direction, replacement, self.udp_checksum)
            }
            Transport::Icmp(mut view) => match replacement {
                Replacement::Address(addr) => icmp::rewrite_address(&mut view, direction, addr),
                _ => trace!(
                    ?direction,
                    ?replacement,
                    "icmp has no ports, packet left untouched"
                ),
            },
            Transport::Other(protocol) => trace!(
                ?protocol,
                ?direction,
                ?replacement,
                "no translator for protocol, packet left untouched"
            ),
        }
    }

    pub fn snat(&self, pkt: &mut Ipv4Packet<'_>, to: impl Into<Replacement>) {
        self.translate(pkt, to, Direction::Source)
    }

    pub fn dnat(&self, pkt: &mut Ipv4Packet<'_>, to: impl Into<Replacement>) {
        self.translate(pkt, to, Direction::Destination)
    }

    /// TCP-only entry point.
    ///
    /// # Panics
    /// If `pkt` is not tagged TCP.
    pub fn tcp(
        &self,
        pkt: &mut Ipv4Packet<'_>,
        replacement: impl Into<Replacement>,
        direction: Direction,
    ) {
        expect_protocol(pkt, Protocol::Tcp);
        if let Transport::Tcp(mut view) = pkt.transport() {
            tcp::rewrite(&mut view, direction, replacement.into());
        }
    }

    /// UDP-only entry point.
    ///
    /// # Panics
    /// If `pkt` is not tagged UDP.
    pub fn udp(
        &self,
        pkt: &mut Ipv4Packet<'_>,
        replacement: impl Into<Replacement>,
        direction: Direction,
    ) {
        expect_protocol(pkt, Protocol::Udp);
        if let Transport::Udp(mut view) = pkt.transport() {
            udp::rewrite(&mut view, direction, replacement.into(), self.udp_checksum);
        }
    }

    /// ICMP-only entry point. ICMP has no ports, so only an address can be
    /// rewritten.
    ///
    /// # Panics
    /// If `pkt` is not tagged ICMP.
    pub fn icmp(&self, pkt: &mut Ipv4Packet<'_>, addr: Ipv4Addr, direction: Direction) {
        expect_protocol(pkt, Protocol::Icmp);
        if let Transport::Icmp(mut view) = pkt.transport() {
            icmp::rewrite_address(&mut view, direction, addr);
        }
    }
}

/// [`Translator::translate`] with the default configuration.
pub fn translate(pkt: &mut Ipv4Packet<'_>, replacement: impl Into<Replacement>, direction: Direction) {
    Translator::DEFAULT.translate(pkt, replacement, direction)
}

pub fn snat(pkt: &mut Ipv4Packet<'_>, to: impl Into<Replacement>) {
    Translator::DEFAULT.snat(pkt, to)
}

pub fn dnat(pkt: &mut Ipv4Packet<'_>, to: impl Into<Replacement>) {
    Translator::DEFAULT.dnat(pkt, to)
}

pub fn tcp_snat(pkt: &mut Ipv4Packet<'_>, to: impl Into<Replacement>) {
    Translator::DEFAULT.tcp(pkt, to, Direction::Source)
}

pub fn tcp_dnat(pkt: &mut Ipv4Packet<'_>, to: impl Into<Replacement>) {
    Translator::DEFAULT.tcp(pkt, to, Direction::Destination)
}

pub fn udp_snat(pkt: &mut Ipv4Packet<'_>, to: impl Into<Replacement>) {
    Translator::DEFAULT.udp(pkt, to, Direction::Source)
}

pub fn udp_dnat(pkt: &mut Ipv4Packet<'_>, to: impl Into<Replacement>) {
    Translator::DEFAULT.udp(pkt, to, Direction::Destination)
}

pub fn icmp_snat(pkt: &mut Ipv4Packet<'_>, addr: Ipv4Addr) {
    Translator::DEFAULT.icmp(pkt, addr, Direction::Source)
}

pub fn icmp_dnat(pkt: &mut Ipv4Packet<'_>, addr: Ipv4Addr) {
    Translator::DEFAULT.icmp(pkt, addr, Direction::Destination)
}

fn expect_protocol(pkt: &Ipv4Packet<'_>, expected: Protocol) {
    let actual = pkt.protocol();
    assert!(
        actual == expected,
        "{expected:?} translation called on a {actual:?} packet"
    );
}

pub(crate) fn recalc_ip_checksum(ip: &mut Ipv4Header, old: Ipv4Addr, new: Ipv4Addr) {
    let sum = checksum::adjust_words(ip.checksum(), old.octets(), new.octets());
    ip.set_checksum(sum);
}

pub(crate) fn recalc_l4_checksum<H: TransportHeader, const N: usize>(
    l4: &mut H,
    old: [u8; N],
    new: [u8; N],
) {
    let sum = checksum::adjust_words(l4.checksum(), old, new);
    l4.set_checksum(sum);
}
