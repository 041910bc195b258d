//! # IPv4 Range Model
//!
//! A continuous, inclusive range of IPv4 addresses. CIDR blocks are turned into
//! a range spanning the network address up to and including the broadcast
//! address; nothing is stripped from either end.

use std::net::Ipv4Addr;

use pnet::ipnetwork::Ipv4Network;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    /// Ascending iterator over every address in the range.
    ///
    /// Produced lazily, so a `/8` costs nothing until it is consumed.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Ipv4Addr> + Clone + Send + use<> {
        let start: u32 = u32::from(self.start_addr);
        let end: u32 = u32::from(self.end_addr);
        (start..=end).map(Ipv4Addr::from)
    }

    /// Number of addresses in the range. Zero when `end_addr < start_addr`.
    pub fn len(&self) -> u64 {
        let start: u64 = u32::from(self.start_addr).into();
        let end: u64 = u32::from(self.end_addr).into();
        if end < start { 0 } else { end - start + 1 }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Creates the range covered by `ip/prefix`, host bits masked off.
pub fn cidr_range(ip: Ipv4Addr, prefix: u8) -> anyhow::Result<Ipv4Range> {
    let network = Ipv4Network::new(ip, prefix)?;
    Ok(Ipv4Range::new(network.network(), network.broadcast()))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
