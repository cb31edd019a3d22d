use crate::checksum::{fold, pseudo_header_sum, sum_without_field};
use crate::ipv4::{Ipv4Header, IPPROTO_UDP};
use crate::TransportHeader;

const CHECK_OFFSET: usize = 6;

#[derive(Debug, Clone, Copy)]
#[repr(C, packed)]
pub struct UdpHeader {
    pub src_port: u16,
    pub dst_port: u16,
    pub len: u16,
    pub check: u16,
}

impl UdpHeader {
    pub fn src_port(&self) -> u16 {
        u16::from_be(self.src_port)
    }

    pub fn set_src_port(&mut self, port: u16) {
        self.src_port = port.to_be();
    }

    pub fn dst_port(&self) -> u16 {
        u16::from_be(self.dst_port)
    }

    pub fn set_dst_port(&mut self, port: u16) {
        self.dst_port = port.to_be();
    }

    pub fn length(&self) -> u16 {
        u16::from_be(self.len)
    }

    // zero: the sender computed none
    pub fn checksum(&self) -> u16 {
        u16::from_be(self.check)
    }

    pub fn set_checksum(&mut self, check: u16) {
        self.check = check.to_be();
    }
}

impl TransportHeader for UdpHeader {
    fn src_port(&self) -> u16 {
        UdpHeader::src_port(self)
    }

    fn dst_port(&self) -> u16 {
        UdpHeader::dst_port(self)
    }

    fn set_src_port(&mut self, port: u16) {
        UdpHeader::set_src_port(self, port)
    }

    fn set_dst_port(&mut self, port: u16) {
        UdpHeader::set_dst_port(self, port)
    }

    fn checksum(&self) -> u16 {
        UdpHeader::checksum(self)
    }

    fn set_checksum(&mut self, check: u16) {
        UdpHeader::set_checksum(self, check)
    }
}

/// UDP checksum computed from scratch over the pseudo-header and `datagram`
/// (header plus payload). A result of zero is returned as `0xFFFF`, since
/// zero on the wire means "no checksum".
pub fn datagram_checksum(ip: &Ipv4Header, datagram: &[u8]) -> u16 {
    let mut sum = pseudo_header_sum(
        ip.src_addr(),
        ip.dst_addr(),
        IPPROTO_UDP,
        datagram.len() as u16,
    );
    sum += sum_without_field(datagram, CHECK_OFFSET);
    match !fold(sum) {
        0 => 0xFFFF,
        check => check,
    }
}

pub fn parse_udp_mut(data: &mut [u8]) -> Option<(&mut UdpHeader, &mut [u8])> {
    if data.len() < std::mem::size_of::<UdpHeader>() {
        return None;
    }

    let (head, payload) = data.split_at_mut(std::mem::size_of::<UdpHeader>());
    let header = unsafe { &mut *(head.as_mut_ptr() as *mut UdpHeader) };
    Some((header, payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::ones_complement_sum;
    use crate::ipv4::parse_ipv4_mut;

    fn ip_header() -> [u8; 20] {
        let mut ip = [0u8; 20];
        ip[0] = 0x45;
        ip[2..4].copy_from_slice(&32u16.to_be_bytes());
        ip[8] = 64;
        ip[9] = IPPROTO_UDP;
        ip[12..16].copy_from_slice(&[192, 168, 1, 1]);
        ip[16..20].copy_from_slice(&[192, 168, 1, 100]);
        ip
    }

    #[test]
    fn test_udp_parsing_and_checksum() {
        let mut ip = ip_header();
        let (ip, _, _) = parse_ipv4_mut(&mut ip).expect("Should parse ipv4");

        let mut data = [0u8; 12];
        data[0..2].copy_from_slice(&1234u16.to_be_bytes()); // src port
        data[2..4].copy_from_slice(&80u16.to_be_bytes()); // dst port
        data[4..6].copy_from_slice(&12u16.to_be_bytes()); // length (8 + 4)
        data[8..12].copy_from_slice(&[0x11, 0x22, 0x33, 0x44]); // payload

        let csum = datagram_checksum(ip, &data);
        data[6..8].copy_from_slice(&csum.to_be_bytes());

        let total = pseudo_header_sum(ip.src_addr(), ip.dst_addr(), IPPROTO_UDP, 12)
            + ones_complement_sum(&data);
        assert_eq!(fold(total), 0xFFFF);

        let (header, payload) = parse_udp_mut(&mut data).expect("Should parse udp");
        assert_eq!(header.src_port(), 1234);
        assert_eq!(header.dst_port(), 80);
        assert_eq!(header.length(), 12);
        assert_eq!(header.checksum(), csum);
        assert_eq!(payload, &[0x11, 0x22, 0x33, 0x44]);
    }

    #[test]
    fn test_udp_too_short() {
        let mut data = [0u8; 7];
        assert!(parse_udp_mut(&mut data).is_none());
    }
}
