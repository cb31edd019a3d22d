use std::net::Ipv4Addr;

use crate::checksum::{fold, ones_complement_sum, sum_without_field};

pub const IPV4_HEADER_LEN: usize = std::mem::size_of::<Ipv4Header>();

pub const IPPROTO_ICMP: u8 = 1;
pub const IPPROTO_TCP: u8 = 6;
pub const IPPROTO_UDP: u8 = 17;

const CHECK_OFFSET: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Icmp,
    Tcp,
    Udp,
    Other(u8),
}

impl From<u8> for Protocol {
    fn from(value: u8) -> Self {
        match value {
            IPPROTO_ICMP => Protocol::Icmp,
            IPPROTO_TCP => Protocol::Tcp,
            IPPROTO_UDP => Protocol::Udp,
            other => Protocol::Other(other),
        }
    }
}

impl From<Protocol> for u8 {
    fn from(proto: Protocol) -> Self {
        match proto {
            Protocol::Icmp => IPPROTO_ICMP,
            Protocol::Tcp => IPPROTO_TCP,
            Protocol::Udp => IPPROTO_UDP,
            Protocol::Other(other) => other,
        }
    }
}

// Multi-byte fields hold network-order bytes
#[derive(Debug, Clone, Copy)]
#[repr(C, packed)]
pub struct Ipv4Header {
    pub ver_ihl: u8,
    pub tos: u8,
    pub total_len: u16,
    pub id: u16,
    pub frag_off: u16,
    pub ttl: u8,
    pub proto: u8,
    pub check: u16,
    pub src: u32,
    pub dst: u32,
}

impl Ipv4Header {
    pub fn version(&self) -> u8 {
        self.ver_ihl >> 4
    }

    pub fn ihl(&self) -> u8 {
        self.ver_ihl & 0x0F
    }

    pub fn header_len(&self) -> usize {
        (self.ihl() as usize) * 4
    }

    pub fn total_len(&self) -> u16 {
        u16::from_be(self.total_len)
    }

    pub fn protocol(&self) -> Protocol {
        Protocol::from(self.proto)
    }

    pub fn checksum(&self) -> u16 {
        u16::from_be(self.check)
    }

    pub fn set_checksum(&mut self, check: u16) {
        self.check = check.to_be();
    }

    pub fn src_addr(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from_be(self.src))
    }

    pub fn set_src_addr(&mut self, addr: Ipv4Addr) {
        self.src = u32::from(addr).to_be();
    }

    pub fn dst_addr(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from_be(self.dst))
    }

    pub fn set_dst_addr(&mut self, addr: Ipv4Addr) {
        self.dst = u32::from(addr).to_be();
    }

    pub fn as_bytes(&self) -> &[u8] {
        let ptr = self as *const Ipv4Header as *const u8;
        // Packed, no padding: every one of the 20 bytes is initialized.
        unsafe { std::slice::from_raw_parts(ptr, IPV4_HEADER_LEN) }
    }

    /// Header checksum computed from scratch over the fixed header and
    /// `options`, ignoring the stored value.
    pub fn compute_checksum(&self, options: &[u8]) -> u16 {
        let sum = sum_without_field(self.as_bytes(), CHECK_OFFSET) + ones_complement_sum(options);
        !fold(sum)
    }

    pub fn is_valid(&self, options: &[u8]) -> bool {
        fold(ones_complement_sum(self.as_bytes()) + ones_complement_sum(options)) == 0xFFFF
    }
}

pub fn parse_ipv4_mut(data: &mut [u8]) -> Option<(&mut Ipv4Header, &mut [u8], &mut [u8])> {
    if data.len() < IPV4_HEADER_LEN {
        return None;
    }

    let header_len = ((data[0] & 0x0F) as usize) * 4;
    if header_len < IPV4_HEADER_LEN || data.len() < header_len {
        return None;
    }

    let (head, payload) = data.split_at_mut(header_len);
    let (fixed, options) = head.split_at_mut(IPV4_HEADER_LEN);
    let header = unsafe { &mut *(fixed.as_mut_ptr() as *mut Ipv4Header) };

    Some((header, options, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> [u8; 24] {
        let mut data = [0u8; 24];
        data[0] = 0x45; // Version 4, IHL 5 (20 bytes)
        data[2..4].copy_from_slice(&24u16.to_be_bytes()); // Total length
        data[8] = 64; // TTL
        data[9] = 17; // Protocol UDP
        data[12..16].copy_from_slice(&[192, 168, 1, 1]); // src
        data[16..20].copy_from_slice(&[192, 168, 1, 100]); // dst
        data[20..24].copy_from_slice(&[0x11, 0x22, 0x33, 0x44]); // payload

        let csum = crate::checksum(&data[0..20]);
        data[10..12].copy_from_slice(&csum.to_be_bytes());
        data
    }

    #[test]
    fn test_ipv4_parsing() {
        let mut data = sample();
        let (header, options, payload) = parse_ipv4_mut(&mut data).expect("Should parse ipv4");
        assert_eq!(header.version(), 4);
        assert_eq!(header.ihl(), 5);
        assert_eq!(header.header_len(), 20);
        assert_eq!(header.total_len(), 24);
        assert_eq!(header.protocol(), Protocol::Udp);
        assert_eq!(header.src_addr(), Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(header.dst_addr(), Ipv4Addr::new(192, 168, 1, 100));
        assert!(options.is_empty());
        assert!(header.is_valid(options));
        assert_eq!(header.compute_checksum(options), header.checksum());
        assert_eq!(payload, &[0x11, 0x22, 0x33, 0x44]);
    }

    #[test]
    fn test_ipv4_with_options() {
        let mut data = [0u8; 28];
        data[0] = 0x47; // Version 4, IHL 7 (28 bytes)
        data[2..4].copy_from_slice(&28u16.to_be_bytes());
        data[20..28].copy_from_slice(&[0x01, 0x01, 0x01, 0x00, 0x94, 0x04, 0x00, 0x00]);

        let (header, options, payload) = parse_ipv4_mut(&mut data).expect("Should parse ipv4");
        assert_eq!(header.header_len(), 28);
        assert_eq!(options.len(), 8);
        assert_eq!(payload.len(), 0);

        let csum = header.compute_checksum(options);
        header.set_checksum(csum);
        assert!(header.is_valid(options));
    }

    #[test]
    fn test_ipv4_bad_ihl() {
        let mut data = sample();
        data[0] = 0x44;
        assert!(parse_ipv4_mut(&mut data).is_none());

        let mut short = [0x4f_u8; 24];
        assert!(parse_ipv4_mut(&mut short).is_none());
    }

    #[test]
    fn test_setters_write_wire_order() {
        let mut data = sample();
        {
            let (header, _, _) = parse_ipv4_mut(&mut data).unwrap();
            header.set_src_addr(Ipv4Addr::new(10, 0, 0, 5));
            header.set_checksum(0xBEEF);
        }
        assert_eq!(&data[12..16], &[10, 0, 0, 5]);
        assert_eq!(&data[10..12], &[0xBE, 0xEF]);
        // untouched
        assert_eq!(&data[16..20], &[192, 168, 1, 100]);
    }

    #[test]
    fn test_protocol_tag_roundtrip() {
        assert_eq!(Protocol::from(6), Protocol::Tcp);
        assert_eq!(Protocol::from(47), Protocol::Other(47));
        assert_eq!(u8::from(Protocol::Icmp), 1);
    }
}
