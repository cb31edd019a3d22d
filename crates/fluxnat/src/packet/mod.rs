mod view;

pub use view::{Direction, IcmpView, PacketView, PortView, TcpView, UdpView};

use fluxnat_proto::ipv4::IPV4_HEADER_LEN;
use fluxnat_proto::{icmp, tcp, udp};
use fluxnat_proto::{parse_icmp_mut, parse_ipv4_mut, parse_tcp_mut, parse_udp_mut};
use fluxnat_proto::{IcmpHeader, Ipv4Header, Protocol, TcpHeader, UdpHeader};

use crate::error::{NatError, Result};

const TCP_MIN_LEN: usize = std::mem::size_of::<TcpHeader>();
const UDP_HEADER_LEN: usize = std::mem::size_of::<UdpHeader>();
const ICMP_HEADER_LEN: usize = std::mem::size_of::<IcmpHeader>();

/// A mutable IPv4 packet over a caller-owned buffer.
///
/// The buffer must start with the IPv4 header. Bytes past the header's
/// total length (link-layer padding) are not part of the packet.
#[derive(Debug)]
pub struct Ipv4Packet<'a> {
    header: &'a mut Ipv4Header,
    options: &'a mut [u8],
    payload: &'a mut [u8],
}

/// The transport layer of a packet, narrowed from its protocol tag.
///
/// A TCP or UDP packet whose payload is too short for its header is `Other`:
/// there is no port to translate. ICMP stays `Icmp`, since its address
/// rewrite never reads the ICMP header.
#[derive(Debug)]
pub enum Transport<'p> {
    Tcp(TcpView<'p>),
    Udp(UdpView<'p>),
    Icmp(IcmpView<'p>),
    Other(Protocol),
}

impl<'a> Ipv4Packet<'a> {
    pub fn new(buf: &'a mut [u8]) -> Result<Self> {
        let available = buf.len();
        if available < IPV4_HEADER_LEN {
            return Err(NatError::TooShort(available));
        }

        let version = buf[0] >> 4;
        if version != 4 {
            return Err(NatError::NotIpv4(version));
        }

        let header_len = ((buf[0] & 0x0F) as usize) * 4;
        if header_len < IPV4_HEADER_LEN || header_len > available {
            return Err(NatError::BadHeaderLength(header_len));
        }

        let total = u16::from_be_bytes([buf[2], buf[3]]) as usize;
        if total < header_len || total > available {
            return Err(NatError::BadTotalLength { total, available });
        }

        let (packet, _padding) = buf.split_at_mut(total);
        let (header, options, payload) =
            parse_ipv4_mut(packet).ok_or(NatError::BadHeaderLength(header_len))?;

        Ok(Self {
            header,
            options,
            payload,
        })
    }

    pub fn header(&self) -> &Ipv4Header {
        self.header
    }

    pub fn header_mut(&mut self) -> &mut Ipv4Header {
        self.header
    }

    pub fn protocol(&self) -> Protocol {
        self.header.protocol()
    }

    pub fn options(&self) -> &[u8] {
        self.options
    }

    /// Transport header and data, up to the IPv4 total length.
    pub fn payload(&self) -> &[u8] {
        self.payload
    }

    /// Narrows the packet to its transport view. This is the only place the
    /// protocol tag is inspected.
    pub fn transport(&mut self) -> Transport<'_> {
        let protocol = self.header.protocol();
        let ip = &mut *self.header;
        let payload = &mut *self.payload;

        match protocol {
            Protocol::Tcp => match parse_tcp_mut(payload) {
                Some((tcp, _)) => Transport::Tcp(PortView::new(ip, tcp)),
                None => Transport::Other(protocol),
            },
            Protocol::Udp => match parse_udp_mut(payload) {
                Some((udp, _)) => Transport::Udp(PortView::new(ip, udp)),
                None => Transport::Other(protocol),
            },
            Protocol::Icmp => {
                let icmp = parse_icmp_mut(payload).map(|(icmp, _)| icmp);
                Transport::Icmp(IcmpView::new(ip, icmp))
            }
            Protocol::Other(_) => Transport::Other(protocol),
        }
    }

    /// IPv4 header checksum computed from scratch.
    pub fn compute_ip_checksum(&self) -> u16 {
        self.header.compute_checksum(self.options)
    }

    /// Transport checksum computed from scratch, or `None` when the packet
    /// carries no recognized transport header.
    pub fn compute_transport_checksum(&self) -> Option<u16> {
        self.transport_check().map(|(_, check)| check)
    }

    /// Transport checksum as stored in the packet.
    pub fn stored_transport_checksum(&self) -> Option<u16> {
        let (offset, _) = self.transport_check()?;
        Some(u16::from_be_bytes([
            self.payload[offset],
            self.payload[offset + 1],
        ]))
    }

    /// Whether every stored checksum matches its coverage region. A zero UDP
    /// checksum counts as valid.
    pub fn checksums_valid(&self) -> bool {
        if !self.header.is_valid(self.options) {
            return false;
        }
        match (self.stored_transport_checksum(), self.compute_transport_checksum()) {
            (Some(0), _) if self.protocol() == Protocol::Udp => true,
            (Some(stored), Some(computed)) => stored == computed,
            _ => true,
        }
    }

    /// Recomputes the IPv4 and transport checksums over the whole packet.
    /// Used when building packets; translation never calls it.
    pub fn fill_checksums(&mut self) {
        if let Some((offset, check)) = self.transport_check() {
            self.payload[offset..offset + 2].copy_from_slice(&check.to_be_bytes());
        }
        let check = self.compute_ip_checksum();
        self.header.set_checksum(check);
    }

    // Offset of the checksum field within the payload and the from-scratch value.
    fn transport_check(&self) -> Option<(usize, u16)> {
        let payload = &*self.payload;
        match self.protocol() {
            Protocol::Tcp if payload.len() >= TCP_MIN_LEN => {
                Some((16, tcp::segment_checksum(self.header, payload)))
            }
            Protocol::Udp if payload.len() >= UDP_HEADER_LEN => {
                let len = (u16::from_be_bytes([payload[4], payload[5]]) as usize)
                    .clamp(UDP_HEADER_LEN, payload.len());
                Some((6, udp::datagram_checksum(self.header, &payload[..len])))
            }
            Protocol::Icmp if payload.len() >= ICMP_HEADER_LEN => {
                Some((2, icmp::message_checksum(payload)))
            }
            _ => None,
        }
    }
}

impl PacketView for Ipv4Packet<'_> {
    fn ip(&self) -> &Ipv4Header {
        self.header
    }

    fn ip_mut(&mut self) -> &mut Ipv4Header {
        self.header
    }
}
