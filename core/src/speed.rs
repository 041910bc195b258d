use std::sync::Arc;

use edgescan_common::edge::record::{EdgeRecord, ProbeResult};
use tracing::{info, warn};

use crate::network::transport::EdgeTransport;

/// Measures download throughput against probe survivors.
///
/// A failed measurement is recorded as zero rather than dropping the node: it
/// passed identity validation and still belongs in the report.
pub struct SpeedTester {
    transport: Arc<dyn EdgeTransport>,
}

impl SpeedTester {
    pub fn new(transport: Arc<dyn EdgeTransport>) -> Self {
        Self { transport }
    }

    pub async fn measure(&self, probe: ProbeResult) -> EdgeRecord {
        let kbps = match self.transport.download(probe.addr).await {
            Ok(transfer) => {
                let kbps = transfer.kilobytes_per_sec();
                info!("{} download speed {kbps:.0} kB/s", probe.addr);
                kbps
            }
            Err(e) => {
                warn!("{} speed test failed: {e}", probe.addr);
                0.0
            }
        };

        EdgeRecord::measured(probe, kbps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::transport::{TraceExchange, Transfer};
    use async_trait::async_trait;
    use edgescan_common::error::ProbeError;
    use std::net::SocketAddrV4;
    use std::time::Duration;

    struct FixedDownload(Option<Transfer>);

    #[async_trait]
    impl EdgeTransport for FixedDownload {
        async fn trace(&self, _target: SocketAddrV4) -> Result<TraceExchange, ProbeError> {
            Err(ProbeError::MissingColo)
        }

        async fn download(&self, target: SocketAddrV4) -> Result<Transfer, ProbeError> {
            self.0.ok_or_else(|| {
                ProbeError::Connect(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    format!("{target} refused"),
                ))
            })
        }
    }

    fn survivor() -> ProbeResult {
        ProbeResult {
            addr: "198.51.100.9:443".parse().unwrap(),
            colo: "FRA".to_string(),
            region: Some("Europe".to_string()),
            city: Some("Frankfurt".to_string()),
            latency: Duration::from_millis(30),
        }
    }

    #[tokio::test]
    async fn successful_download_reports_rate() {
        let tester = SpeedTester::new(Arc::new(FixedDownload(Some(Transfer {
            bytes: 5 * 1024 * 1024,
            elapsed: Duration::from_secs(5),
        }))));

        let record = tester.measure(survivor()).await;
        assert_eq!(record.throughput, Some(1024.0));
        assert_eq!(record.probe, survivor());
    }

    #[tokio::test]
    async fn failed_download_is_zero_not_dropped() {
        let tester = SpeedTester::new(Arc::new(FixedDownload(None)));

        let record = tester.measure(survivor()).await;
        assert_eq!(record.throughput, Some(0.0));
        assert_eq!(record.probe.colo, "FRA");
    }
}
