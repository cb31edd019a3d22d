use std::net::Ipv4Addr;

use tracing::trace;

use super::recalc_ip_checksum;
use crate::packet::{Direction, IcmpView, PacketView};

/// ICMPv4 has no pseudo-header: only the IP header checksum changes.
pub fn rewrite_address(view: &mut IcmpView<'_>, direction: Direction, new: Ipv4Addr) {
    let old = view.address(direction);
    trace!(?direction, %old, %new, "icmp address rewrite");

    recalc_ip_checksum(view.ip_mut(), old, new);

    view.set_address(direction, new);
}
