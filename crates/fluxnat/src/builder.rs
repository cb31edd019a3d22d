use std::net::Ipv4Addr;

use fluxnat_proto::ipv4::{IPPROTO_ICMP, IPPROTO_TCP, IPPROTO_UDP, IPV4_HEADER_LEN};

use crate::error::{NatError, Result};
use crate::packet::Ipv4Packet;
use crate::socket::Socket;

const MAX_OPTIONS_LEN: usize = 40;

#[derive(Debug, Clone, Copy)]
enum Layer4 {
    Tcp { src_port: u16, dst_port: u16 },
    Udp { src_port: u16, dst_port: u16 },
    IcmpEcho { ident: u16, seq: u16 },
    Raw(u8),
}

/// Builds well-formed IPv4 packets with correct checksums.
pub struct PacketBuilder {
    src: Ipv4Addr,
    dst: Ipv4Addr,
    layer4: Layer4,
    ttl: u8,
    id: u16,
    options: Vec<u8>,
    payload: Vec<u8>,
    udp_checksum: bool,
}

impl PacketBuilder {
    fn new(src: Ipv4Addr, dst: Ipv4Addr, layer4: Layer4) -> Self {
        Self {
            src,
            dst,
            layer4,
            ttl: 64,
            id: 0,
            options: Vec::new(),
            payload: Vec::new(),
            udp_checksum: true,
        }
    }

    pub fn tcp(src: Socket, dst: Socket) -> Self {
        Self::new(
            src.address(),
            dst.address(),
            Layer4::Tcp {
                src_port: src.port(),
                dst_port: dst.port(),
            },
        )
    }

    pub fn udp(src: Socket, dst: Socket) -> Self {
        Self::new(
            src.address(),
            dst.address(),
            Layer4::Udp {
                src_port: src.port(),
                dst_port: dst.port(),
            },
        )
    }

    pub fn icmp_echo(src: Ipv4Addr, dst: Ipv4Addr, ident: u16, seq: u16) -> Self {
        Self::new(src, dst, Layer4::IcmpEcho { ident, seq })
    }

    /// A packet whose payload follows the IPv4 header with no transport header.
    pub fn raw(protocol: u8, src: Ipv4Addr, dst: Ipv4Addr) -> Self {
        Self::new(src, dst, Layer4::Raw(protocol))
    }

    pub fn ttl(mut self, ttl: u8) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn id(mut self, id: u16) -> Self {
        self.id = id;
        self
    }

    /// IPv4 options, zero-padded to a multiple of four bytes.
    pub fn options(mut self, options: &[u8]) -> Self {
        self.options = options.to_vec();
        self
    }

    pub fn payload(mut self, payload: &[u8]) -> Self {
        self.payload = payload.to_vec();
        self
    }

    /// When disabled, UDP packets are sent with a zero checksum.
    pub fn udp_checksum(mut self, enabled: bool) -> Self {
        self.udp_checksum = enabled;
        self
    }

    pub fn build(self) -> Result<Vec<u8>> {
        let options_len = self.options.len().div_ceil(4) * 4;
        if options_len > MAX_OPTIONS_LEN {
            return Err(NatError::InvalidLayout(format!(
                "{} bytes of IPv4 options (max {MAX_OPTIONS_LEN})",
                self.options.len()
            )));
        }

        let (protocol, l4_header_len) = match self.layer4 {
            Layer4::Tcp { .. } => (IPPROTO_TCP, 20),
            Layer4::Udp { .. } => (IPPROTO_UDP, 8),
            Layer4::IcmpEcho { .. } => (IPPROTO_ICMP, 8),
            Layer4::Raw(protocol) => (protocol, 0),
        };

        let header_len = IPV4_HEADER_LEN + options_len;
        let l4_len = l4_header_len + self.payload.len();
        let total = header_len + l4_len;
        if total > u16::MAX as usize {
            return Err(NatError::InvalidLayout(format!(
                "{total}-byte packet exceeds the IPv4 maximum"
            )));
        }

        let mut buf = vec![0u8; total];
        buf[0] = 0x40 | (header_len / 4) as u8;
        buf[2..4].copy_from_slice(&(total as u16).to_be_bytes());
        buf[4..6].copy_from_slice(&self.id.to_be_bytes());
        buf[6..8].copy_from_slice(&0x4000u16.to_be_bytes()); // DF
        buf[8] = self.ttl;
        buf[9] = protocol;
        buf[12..16].copy_from_slice(&self.src.octets());
        buf[16..20].copy_from_slice(&self.dst.octets());
        buf[IPV4_HEADER_LEN..IPV4_HEADER_LEN + self.options.len()].copy_from_slice(&self.options);

        let l4 = &mut buf[header_len..];
        match self.layer4 {
            Layer4::Tcp { src_port, dst_port } => {
                l4[0..2].copy_from_slice(&src_port.to_be_bytes());
                l4[2..4].copy_from_slice(&dst_port.to_be_bytes());
                l4[4..8].copy_from_slice(&1u32.to_be_bytes()); // seq
                l4[12] = 0x50; // data offset 5
                l4[13] = 0x18; // PSH | ACK
                l4[14..16].copy_from_slice(&u16::MAX.to_be_bytes()); // window
            }
            Layer4::Udp { src_port, dst_port } => {
                l4[0..2].copy_from_slice(&src_port.to_be_bytes());
                l4[2..4].copy_from_slice(&dst_port.to_be_bytes());
                l4[4..6].copy_from_slice(&(l4_len as u16).to_be_bytes());
            }
            Layer4::IcmpEcho { ident, seq } => {
                l4[0] = 8; // Echo Request
                l4[4..6].copy_from_slice(&ident.to_be_bytes());
                l4[6..8].copy_from_slice(&seq.to_be_bytes());
            }
            Layer4::Raw(_) => {}
        }
        l4[l4_header_len..].copy_from_slice(&self.payload);

        Ipv4Packet::new(&mut buf)?.fill_checksums();

        if let (Layer4::Udp { .. }, false) = (self.layer4, self.udp_checksum) {
            buf[header_len + 6..header_len + 8].fill(0);
        }

        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{Direction, PacketView, Transport};
    use fluxnat_proto::Protocol;

    fn sock(a: [u8; 4], port: u16) -> Socket {
        Socket::new(Ipv4Addr::from(a), port)
    }

    #[test]
    fn test_build_tcp() {
        let mut buf = PacketBuilder::tcp(sock([10, 0, 0, 5], 4000), sock([10, 0, 0, 1], 80))
            .payload(b"GET / HTTP/1.1\r\n\r\n")
            .build()
            .expect("Should build tcp");
        assert_eq!(buf.len(), 20 + 20 + 18);

        let mut pkt = Ipv4Packet::new(&mut buf).unwrap();
        assert!(pkt.checksums_valid());
        match pkt.transport() {
            Transport::Tcp(view) => {
                assert_eq!(view.socket(Direction::Source), sock([10, 0, 0, 5], 4000));
                assert_eq!(view.socket(Direction::Destination), sock([10, 0, 0, 1], 80));
                assert_eq!(view.header().header_len(), 20);
            }
            other => panic!("expected tcp, got {other:?}"),
        }
    }

    #[test]
    fn test_build_udp_without_checksum() {
        let mut buf = PacketBuilder::udp(sock([10, 0, 0, 5], 5353), sock([224, 0, 0, 251], 5353))
            .payload(&[1, 2, 3])
            .udp_checksum(false)
            .build()
            .unwrap();
        let pkt = Ipv4Packet::new(&mut buf).unwrap();
        assert_eq!(pkt.stored_transport_checksum(), Some(0));
        assert!(pkt.checksums_valid());
    }

    #[test]
    fn test_build_icmp_with_options() {
        let mut buf = PacketBuilder::icmp_echo(Ipv4Addr::new(10, 0, 0, 5), Ipv4Addr::new(8, 8, 8, 8), 7, 1)
            .options(&[0x94, 0x04, 0x00, 0x00, 0x01])
            .build()
            .unwrap();
        let pkt = Ipv4Packet::new(&mut buf).unwrap();
        assert_eq!(pkt.header().header_len(), 28);
        assert_eq!(pkt.options(), &[0x94, 0x04, 0x00, 0x00, 0x01, 0, 0, 0]);
        assert_eq!(pkt.protocol(), Protocol::Icmp);
        assert_eq!(pkt.address(Direction::Destination), Ipv4Addr::new(8, 8, 8, 8));
        assert!(pkt.checksums_valid());
    }

    #[test]
    fn test_build_rejects_oversized() {
        let err = PacketBuilder::raw(47, Ipv4Addr::LOCALHOST, Ipv4Addr::LOCALHOST)
            .options(&[1u8; 41])
            .build()
            .unwrap_err();
        assert!(matches!(err, NatError::InvalidLayout(_)));

        let err = PacketBuilder::raw(47, Ipv4Addr::LOCALHOST, Ipv4Addr::LOCALHOST)
            .payload(&vec![0u8; 65535])
            .build()
            .unwrap_err();
        assert!(matches!(err, NatError::InvalidLayout(_)));
    }
}
