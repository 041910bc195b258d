use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

use crate::edge::directory::DirectoryEntry;

/// A candidate that answered as a genuine edge node.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub addr: SocketAddrV4,
    /// Datacenter code reported by the node (`colo=`).
    pub colo: String,
    /// `None` when the code is valid but missing from the directory.
    pub region: Option<String>,
    pub city: Option<String>,
    /// Time spent establishing the TCP connection.
    pub latency: Duration,
}

impl ProbeResult {
    pub fn new(
        addr: SocketAddrV4,
        colo: String,
        location: Option<&DirectoryEntry>,
        latency: Duration,
    ) -> Self {
        Self {
            addr,
            colo,
            region: location.map(|l| l.region.clone()),
            city: location.map(|l| l.city.clone()),
            latency,
        }
    }

    pub fn ip(&self) -> Ipv4Addr {
        *self.addr.ip()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn latency_label(&self) -> String {
        format!("{} ms", self.latency.as_millis())
    }
}

/// A row of the final report.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRecord {
    pub probe: ProbeResult,
    /// Download rate in kB/s. `None` when the throughput stage is disabled,
    /// `Some(0.0)` when the measurement failed.
    pub throughput: Option<f64>,
}

impl EdgeRecord {
    pub fn measured(probe: ProbeResult, throughput: f64) -> Self {
        Self {
            probe,
            throughput: Some(throughput),
        }
    }

    pub fn throughput_label(&self) -> Option<String> {
        self.throughput.map(|kbps| format!("{kbps:.0} kB/s"))
    }
}

impl From<ProbeResult> for EdgeRecord {
    fn from(probe: ProbeResult) -> Self {
        Self {
            probe,
            throughput: None,
        }
    }
}
