//! UDP translation.
//!
//! Under [`UdpChecksumPolicy::Skip`] only the IP header checksum follows an
//! address change: the UDP checksum is left stale after socket, address and
//! port rewrites alike. [`UdpChecksumPolicy::Adjust`] updates it the same way
//! TCP does.

use std::net::Ipv4Addr;

use fluxnat_proto::{checksum, UdpHeader};
use tracing::trace;

use super::{recalc_ip_checksum, Replacement};
use crate::config::UdpChecksumPolicy;
use crate::packet::{Direction, PacketView, UdpView};
use crate::socket::Socket;

pub fn rewrite(
    view: &mut UdpView<'_>,
    direction: Direction,
    replacement: Replacement,
    policy: UdpChecksumPolicy,
) {
    match replacement {
        Replacement::Socket(sock) => rewrite_socket(view, direction, sock, policy),
        Replacement::Address(addr) => rewrite_address(view, direction, addr, policy),
        Replacement::Port(port) => rewrite_port(view, direction, port, policy),
    }
}

pub fn rewrite_socket(
    view: &mut UdpView<'_>,
    direction: Direction,
    new: Socket,
    policy: UdpChecksumPolicy,
) {
    let old = view.socket(direction);
    trace!(?direction, %old, %new, ?policy, "udp socket rewrite");

    recalc_ip_checksum(view.ip_mut(), old.address(), new.address());
    if policy == UdpChecksumPolicy::Adjust {
        recalc_udp_checksum(
            view.header_mut(),
            old.address().octets(),
            new.address().octets(),
        );
        recalc_udp_checksum(
            view.header_mut(),
            old.port().to_be_bytes(),
            new.port().to_be_bytes(),
        );
    }

    view.set_socket(direction, new);
}

pub fn rewrite_address(
    view: &mut UdpView<'_>,
    direction: Direction,
    new: Ipv4Addr,
    policy: UdpChecksumPolicy,
) {
    let old = view.address(direction);
    trace!(?direction, %old, %new, ?policy, "udp address rewrite");

    recalc_ip_checksum(view.ip_mut(), old, new);
    if policy == UdpChecksumPolicy::Adjust {
        recalc_udp_checksum(view.header_mut(), old.octets(), new.octets());
    }

    view.set_address(direction, new);
}

pub fn rewrite_port(
    view: &mut UdpView<'_>,
    direction: Direction,
    new: u16,
    policy: UdpChecksumPolicy,
) {
    let old = view.port(direction);
    trace!(?direction, old, new, ?policy, "udp port rewrite");

    if policy == UdpChecksumPolicy::Adjust {
        recalc_udp_checksum(view.header_mut(), old.to_be_bytes(), new.to_be_bytes());
    }

    view.set_port(direction, new);
}

fn recalc_udp_checksum<const N: usize>(udp: &mut UdpHeader, old: [u8; N], new: [u8; N]) {
    // zero: the sender computed no checksum
    if udp.checksum() == 0 {
        return;
    }
    match checksum::adjust_words(udp.checksum(), old, new) {
        0 => udp.set_checksum(0xFFFF),
        sum => udp.set_checksum(sum),
    }
}
