use crate::checksum::{fold, pseudo_header_sum, sum_without_field};
use crate::ipv4::{Ipv4Header, IPPROTO_TCP};
use crate::TransportHeader;

const CHECK_OFFSET: usize = 16;

#[derive(Debug, Clone, Copy)]
#[repr(C, packed)]
pub struct TcpHeader {
    pub src_port: u16,
    pub dst_port: u16,
    pub seq: u32,
    pub ack: u32,
    pub data_off_res_flags: u16,
    pub window: u16,
    pub check: u16,
    pub urg_ptr: u16,
}

impl TcpHeader {
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

    // Data offset in 32-bit words
    pub fn data_offset(&self) -> u8 {
        let val = u16::from_be(self.data_off_res_flags);
        ((val >> 12) & 0xF) as u8
    }

    pub fn header_len(&self) -> usize {
        (self.data_offset() as usize) * 4
    }

    pub fn flags(&self) -> u16 {
        u16::from_be(self.data_off_res_flags) & 0x01FF
    }

    pub fn checksum(&self) -> u16 {
        u16::from_be(self.check)
    }

    pub fn set_checksum(&mut self, check: u16) {
        self.check = check.to_be();
    }
}

impl TransportHeader for TcpHeader {
    fn src_port(&self) -> u16 {
        TcpHeader::src_port(self)
    }

    fn dst_port(&self) -> u16 {
        TcpHeader::dst_port(self)
    }

    fn set_src_port(&mut self, port: u16) {
        TcpHeader::set_src_port(self, port)
    }

    fn set_dst_port(&mut self, port: u16) {
        TcpHeader::set_dst_port(self, port)
    }

    fn checksum(&self) -> u16 {
        TcpHeader::checksum(self)
    }

    fn set_checksum(&mut self, check: u16) {
        TcpHeader::set_checksum(self, check)
    }
}

pub fn segment_checksum(ip: &Ipv4Header, segment: &[u8]) -> u16 {
    let mut sum = pseudo_header_sum(
        ip.src_addr(),
        ip.dst_addr(),
        IPPROTO_TCP,
        segment.len() as u16,
    );
    sum += sum_without_field(segment, CHECK_OFFSET);
    !fold(sum)
}

pub fn parse_tcp_mut(data: &mut [u8]) -> Option<(&mut TcpHeader, &mut [u8])> {
    if data.len() < std::mem::size_of::<TcpHeader>() {
        return None;
    }

    let header_len = ((data[12] >> 4) as usize) * 4;
    // header_len must be at least 20 bytes (5 words)
    if header_len < 20 || data.len() < header_len {
        return None;
    }

    let (head, payload) = data.split_at_mut(header_len);
    let header = unsafe { &mut *(head.as_mut_ptr() as *mut TcpHeader) };
    Some((header, payload))
}
