use crate::checksum::{fold, sum_without_field};

const CHECK_OFFSET: usize = 2;

#[derive(Debug, Clone, Copy)]
#[repr(C, packed)]
pub struct IcmpHeader {
    pub kind: u8,
    pub code: u8,
    pub check: u16,
}

impl IcmpHeader {
    pub fn checksum(&self) -> u16 {
        u16::from_be(self.check)
    }
}

// ICMPv4 has no pseudo-header
pub fn message_checksum(message: &[u8]) -> u16 {
    !fold(sum_without_field(message, CHECK_OFFSET))
}

pub fn parse_icmp_mut(data: &mut [u8]) -> Option<(&mut IcmpHeader, &mut [u8])> {
    if data.len() < std::mem::size_of::<IcmpHeader>() {
        return None;
    }

    let (head, payload) = data.split_at_mut(std::mem::size_of::<IcmpHeader>());
    let header = unsafe { &mut *(head.as_mut_ptr() as *mut IcmpHeader) };
    Some((header, payload))
}
