//! # Scan Target Model
//!
//! Turns the input list into candidate socket addresses.
//!
//! Every non-blank line of the input is one target:
//! * A single IPv4 address (e.g. `104.16.0.1`).
//! * A CIDR block (e.g. `104.16.0.0/24`), expanded to every address from the
//!   network address to the broadcast address, ascending.
//!
//! Lines are parsed up front, addresses are produced lazily. Input order is
//! kept and nothing is deduplicated: an address listed twice is probed twice.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::path::Path;
use std::str::FromStr;

use tracing::warn;

use crate::error::TargetError;
use crate::network::range::{self, Ipv4Range};

/// One parsed line of the input list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// A single address, probed as-is.
    Host { target_addr: Ipv4Addr },
    /// Every address of a CIDR block, network and broadcast included.
    Range { ipv4_range: Ipv4Range },
}

impl FromStr for Target {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Some(target) = parse_cidr_range(s)? {
            return Ok(target);
        }

        parse_host(s)
    }
}

impl Target {
    pub fn len(&self) -> u64 {
        match self {
            Target::Host { .. } => 1,
            Target::Range { ipv4_range } => ipv4_range.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn addrs(&self) -> impl Iterator<Item = Ipv4Addr> + Send + use<> {
        let range = match *self {
            Target::Host { target_addr } => Ipv4Range::new(target_addr, target_addr),
            Target::Range { ipv4_range } => ipv4_range,
        };
        range.iter()
    }
}

/// The parsed input list.
#[derive(Clone, Debug, Default)]
pub struct TargetList {
    targets: Vec<Target>,
}

impl TargetList {
    pub fn new(targets: Vec<Target>) -> Self {
        Self { targets }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Reads one target per line.
    ///
    /// Blank lines and `#` comments are ignored. Lines that do not parse are
    /// reported and skipped; only I/O errors abort.
    pub fn from_reader<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut targets = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let token = line.trim();
            if token.is_empty() || token.starts_with('#') {
                continue;
            }

            match token.parse::<Target>() {
                Ok(target) => targets.push(target),
                Err(e) => warn!("Skipping line {}: {e}", idx + 1),
            }
        }

        Ok(Self { targets })
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Total number of candidates the list expands to.
    pub fn len(&self) -> u64 {
        self.targets.iter().map(Target::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lazily expands every target into `(address, port)` candidates, in
    /// input order.
    pub fn candidates(&self, port: u16) -> impl Iterator<Item = SocketAddrV4> + Send + use<> {
        self.targets
            .clone()
            .into_iter()
            .flat_map(|target| target.addrs())
            .map(move |addr| SocketAddrV4::new(addr, port))
    }
}

fn parse_host(s: &str) -> Result<Target, TargetError> {
    s.parse::<Ipv4Addr>()
        .map(|target_addr| Target::Host { target_addr })
        .map_err(|_| TargetError::InvalidAddress {
            token: s.to_string(),
        })
}

/// Parses CIDR notation like "104.16.0.0/24". `Ok(None)` when `s` has no '/'.
fn parse_cidr_range(s: &str) -> Result<Option<Target>, TargetError> {
    let Some((ip_str, prefix_str)) = s.split_once('/') else {
        return Ok(None);
    };

    let invalid = |reason: String| TargetError::InvalidCidr {
        token: s.to_string(),
        reason,
    };

    let ipv4_addr = ip_str
        .parse::<Ipv4Addr>()
        .map_err(|e| invalid(format!("invalid address '{ip_str}': {e}")))?;

    let prefix = prefix_str
        .parse::<u8>()
        .map_err(|e| invalid(format!("invalid prefix '{prefix_str}': {e}")))?;

    let ipv4_range = range::cidr_range(ipv4_addr, prefix).map_err(|e| invalid(e.to_string()))?;

    Ok(Some(Target::Range { ipv4_range }))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
