//! Identity probe for a single candidate.
//!
//! A candidate survives only when all of these hold:
//! 1. it accepts a TCP connection within the connect timeout;
//! 2. the trace request over that connection completes within the request
//!    timeout;
//! 3. the body echoes the identity marker;
//! 4. the body names a datacenter.
//!
//! The directory lookup never rejects a candidate: an unknown code still
//! yields a result, just without region and city.

use std::net::SocketAddrV4;
use std::sync::Arc;

use edgescan_common::edge::directory::Directory;
use edgescan_common::edge::record::ProbeResult;
use edgescan_common::error::ProbeError;

use crate::network::transport::EdgeTransport;
use crate::trace;

pub struct Prober {
    transport: Arc<dyn EdgeTransport>,
    directory: Arc<Directory>,
    marker: String,
}

impl Prober {
    pub fn new(transport: Arc<dyn EdgeTransport>, directory: Arc<Directory>, marker: String) -> Self {
        Self {
            transport,
            directory,
            marker,
        }
    }

    pub async fn probe(&self, target: SocketAddrV4) -> Result<ProbeResult, ProbeError> {
        let exchange = self.transport.trace(target).await?;
        let info = trace::parse(&exchange.body, &self.marker)?;
        let location = self.directory.get(&info.colo);

        Ok(ProbeResult::new(target, info.colo, location, exchange.handshake))
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::transport::{TraceExchange, Transfer};
    use async_trait::async_trait;
    use edgescan_common::edge::directory::DirectoryEntry;
    use std::time::Duration;

    struct CannedTransport {
        body: &'static str,
    }

    #[async_trait]
    impl EdgeTransport for CannedTransport {
        async fn trace(&self, _target: SocketAddrV4) -> Result<TraceExchange, ProbeError> {
            Ok(TraceExchange {
                handshake: Duration::from_millis(12),
                body: self.body.to_string(),
            })
        }

        async fn download(&self, _target: SocketAddrV4) -> Result<Transfer, ProbeError> {
            Err(ProbeError::MissingMarker)
        }
    }

    fn prober(body: &'static str) -> Prober {
        let directory = Directory::new([DirectoryEntry {
            code: "SJC".to_string(),
            latitude: 37.36,
            longitude: -121.92,
            country: "US".to_string(),
            region: "North America".to_string(),
            city: "San Jose".to_string(),
        }]);
        Prober::new(
            Arc::new(CannedTransport { body }),
            Arc::new(directory),
            "uag=Mozilla/5.0".to_string(),
        )
    }

    fn target() -> SocketAddrV4 {
        "203.0.113.7:443".parse().unwrap()
    }

    #[tokio::test]
    async fn known_datacenter_gets_geography() {
        let result = prober("uag=Mozilla/5.0\ncolo=SJC\n").probe(target()).await.unwrap();

        assert_eq!(result.colo, "SJC");
        assert_eq!(result.region.as_deref(), Some("North America"));
        assert_eq!(result.city.as_deref(), Some("San Jose"));
        assert_eq!(result.latency, Duration::from_millis(12));
        assert_eq!(result.addr, target());
    }

    #[tokio::test]
    async fn unknown_datacenter_still_survives() {
        let result = prober("uag=Mozilla/5.0\ncolo=XYZ\n").probe(target()).await.unwrap();

        assert_eq!(result.colo, "XYZ");
        assert!(result.region.is_none());
        assert!(result.city.is_none());
    }

    #[tokio::test]
    async fn missing_marker_drops_the_candidate() {
        let outcome = prober("colo=SJC\n").probe(target()).await;
        assert!(matches!(outcome, Err(ProbeError::MissingMarker)));
    }
}
