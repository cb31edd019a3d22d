use std::net::Ipv4Addr;

use tracing::trace;

use super::{recalc_ip_checksum, recalc_l4_checksum, Replacement};
use crate::packet::{Direction, PacketView, TcpView};
use crate::socket::Socket;

pub fn rewrite(view: &mut TcpView<'_>, direction: Direction, replacement: Replacement) {
    match replacement {
        Replacement::Socket(sock) => rewrite_socket(view, direction, sock),
        Replacement::Address(addr) => rewrite_address(view, direction, addr),
        Replacement::Port(port) => rewrite_port(view, direction, port),
    }
}

/// The TCP checksum covers both IP addresses through the pseudo-header, so
/// it is adjusted for the address as well as the port.
pub fn rewrite_socket(view: &mut TcpView<'_>, direction: Direction, new: Socket) {
    let old = view.socket(direction);
    trace!(?direction, %old, %new, "tcp socket rewrite");

    recalc_ip_checksum(view.ip_mut(), old.address(), new.address());
    recalc_l4_checksum(
        view.header_mut(),
        old.address().octets(),
        new.address().octets(),
    );
    recalc_l4_checksum(
        view.header_mut(),
        old.port().to_be_bytes(),
        new.port().to_be_bytes(),
    );

    view.set_socket(direction, new);
}

pub fn rewrite_address(view: &mut TcpView<'_>, direction: Direction, new: Ipv4Addr) {
    let old = view.address(direction);
    trace!(?direction, %old, %new, "tcp address rewrite");

    recalc_ip_checksum(view.ip_mut(), old, new);
    recalc_l4_checksum(view.header_mut(), old.octets(), new.octets());

    view.set_address(direction, new);
}

pub fn rewrite_port(view: &mut TcpView<'_>, direction: Direction, new: u16) {
    let old = view.port(direction);
    trace!(?direction, old, new, "tcp port rewrite");

    recalc_l4_checksum(view.header_mut(), old.to_be_bytes(), new.to_be_bytes());

    view.set_port(direction, new);
}
