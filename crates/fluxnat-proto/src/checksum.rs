//! One's-complement checksum arithmetic shared by IPv4, TCP, UDP and ICMP.
//!
//! All values handled here are 16-bit words in network byte order, read with
//! `u16::from_be_bytes`. Callers holding host-order integers convert them
//! with `to_be_bytes()` before handing them over.

use std::net::Ipv4Addr;

// Unfolded; a trailing odd byte is padded with zero on the right
pub fn ones_complement_sum(data: &[u8]) -> u32 {
    let mut sum: u32 = 0;
    let mut i = 0;
    while i + 1 < data.len() {
        let word = u16::from_be_bytes([data[i], data[i + 1]]);
        sum += word as u32;
        i += 2;
    }
    if i < data.len() {
        sum += (data[i] as u32) << 8;
    }
    sum
}

#[inline]
pub fn fold(mut sum: u32) -> u16 {
    while (sum >> 16) != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    sum as u16
}

pub fn checksum(data: &[u8]) -> u16 {
    !fold(ones_complement_sum(data))
}

pub(crate) fn sum_without_field(data: &[u8], offset: usize) -> u32 {
    let head = data.get(..offset).unwrap_or(data);
    let tail = data.get(offset + 2..).unwrap_or(&[]);
    ones_complement_sum(head) + ones_complement_sum(tail)
}

pub fn pseudo_header_sum(src: Ipv4Addr, dst: Ipv4Addr, proto: u8, len: u16) -> u32 {
    ones_complement_sum(&src.octets())
        + ones_complement_sum(&dst.octets())
        + proto as u32
        + len as u32
}

/// Incrementally updates `checksum` after one 16-bit word changed from
/// `old` to `new` (RFC 1624, eqn. 3):
///
/// ```text
/// HC' = ~(~HC + ~m + m')
/// ```
#[inline]
pub fn adjust(checksum: u16, old: u16, new: u16) -> u16 {
    let sum = (!checksum) as u32 + (!old) as u32 + new as u32;
    !fold(sum)
}

/// Applies [`adjust`] for every 16-bit word of a multi-word field, feeding
/// each word's result into the next.
///
/// `old` and `new` are the field's bytes in network order, e.g.
/// `addr.octets()` or `port.to_be_bytes()`.
#[inline]
pub fn adjust_words<const N: usize>(checksum: u16, old: [u8; N], new: [u8; N]) -> u16 {
    debug_assert!(N % 2 == 0, "checksum fields are whole 16-bit words");
    old.chunks_exact(2)
        .zip(new.chunks_exact(2))
        .fold(checksum, |sum, (o, n)| {
            adjust(
                sum,
                u16::from_be_bytes([o[0], o[1]]),
                u16::from_be_bytes([n[0], n[1]]),
            )
        })
}
