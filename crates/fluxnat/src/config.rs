/// How UDP checksums are treated when addresses or ports are rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UdpChecksumPolicy {
    /// Only the IP header checksum is updated. The UDP checksum is left as
    /// it was, stale whenever a pseudo-header address or a port changed.
    #[default]
    Skip,
    /// The UDP checksum is adjusted alongside every address and port change.
    /// A zero checksum (sender computed none) stays zero.
    Adjust,
}
