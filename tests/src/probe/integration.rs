use std::sync::Arc;

use edgescan_common::error::ProbeError;
use edgescan_core::network::transport::{EdgeTransport, HttpTransport};
use edgescan_core::probe::Prober;

use crate::support::{self, Reply};

const TRACE: &[u8] = b"fl=12f1\nh=edge.test\nip=127.0.0.1\nts=1700000000.1\nuag=Mozilla/5.0\ncolo=SJC\nhttp=http/1.1\ntls=off\n";

fn prober() -> Prober {
    let cfg = support::local_config();
    let transport = HttpTransport::new(&cfg).unwrap();
    Prober::new(
        Arc::new(transport),
        Arc::new(support::directory()),
        cfg.identity_marker(),
    )
}

/*************************************************************
                     Identity probe over TCP
**************************************************************/

#[tokio::test]
async fn genuine_node_is_accepted() {
    let addr = support::serve(Reply::ok(TRACE)).await;

    let result = prober().probe(addr).await.unwrap();

    assert_eq!(result.addr, addr);
    assert_eq!(result.colo, "SJC");
    assert_eq!(result.city.as_deref(), Some("San Jose"));
    assert!(result.latency < support::local_config().connect_timeout);
}

#[tokio::test]
async fn chunked_trace_is_decoded() {
    let mut raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n".to_vec();
    raw.extend_from_slice(format!("{:x}\r\n", TRACE.len()).as_bytes());
    raw.extend_from_slice(TRACE);
    raw.extend_from_slice(b"\r\n0\r\n\r\n");
    let addr = support::serve(Reply::Raw(raw)).await;

    let result = prober().probe(addr).await.unwrap();
    assert_eq!(result.colo, "SJC");
}

#[tokio::test]
async fn stalled_exchange_yields_nothing() {
    let addr = support::serve(Reply::Stall).await;

    let outcome = prober().probe(addr).await;
    assert!(
        matches!(outcome, Err(ProbeError::ExchangeTimeout(_))),
        "Expected exchange timeout, received: {outcome:?}"
    );
}

#[tokio::test]
async fn response_without_marker_yields_nothing() {
    let addr = support::serve(Reply::ok(b"fl=1\ncolo=SJC\n")).await;

    let outcome = prober().probe(addr).await;
    assert!(matches!(outcome, Err(ProbeError::MissingMarker)), "{outcome:?}");
}

#[tokio::test]
async fn response_without_colo_yields_nothing() {
    let addr = support::serve(Reply::ok(b"uag=Mozilla/5.0\ncolo=\n")).await;

    let outcome = prober().probe(addr).await;
    assert!(matches!(outcome, Err(ProbeError::MissingColo)), "{outcome:?}");
}

#[tokio::test]
async fn error_status_is_judged_by_content() {
    let addr = support::serve(Reply::status(403, TRACE)).await;

    let result = prober().probe(addr).await.unwrap();
    assert_eq!(result.colo, "SJC");
}

#[tokio::test]
async fn refused_connection_is_unreachable() {
    let addr = support::closed_port().await;

    let err = prober().probe(addr).await.unwrap_err();
    assert!(err.is_unreachable(), "{err:?}");
}

/*************************************************************
                    Throughput over TCP
**************************************************************/

#[tokio::test]
async fn download_counts_body_bytes() {
    let body = vec![0u8; 64 * 1024];
    let addr = support::serve(Reply::ok(&body)).await;
    let transport = HttpTransport::new(&support::local_config()).unwrap();

    let transfer = transport.download(addr).await.unwrap();
    assert_eq!(transfer.bytes, 64 * 1024);
    assert!(transfer.kilobytes_per_sec() > 0.0);
}

#[tokio::test]
async fn download_error_status_fails() {
    let addr = support::serve(Reply::status(404, b"not here")).await;
    let transport = HttpTransport::new(&support::local_config()).unwrap();

    let outcome = transport.download(addr).await;
    assert!(matches!(outcome, Err(ProbeError::Status(404))), "{outcome:?}");
}

#[tokio::test]
async fn stalled_download_times_out() {
    let addr = support::serve(Reply::Stall).await;
    let transport = HttpTransport::new(&support::local_config()).unwrap();

    let outcome = transport.download(addr).await;
    assert!(matches!(outcome, Err(ProbeError::ExchangeTimeout(_))), "{outcome:?}");
}

#[tokio::test]
async fn deadline_mid_body_keeps_bytes_received() {
    let addr = support::serve(Reply::stalled_body(10 * 1024 * 1024, 32 * 1024)).await;
    let cfg = support::local_config();
    let transport = HttpTransport::new(&cfg).unwrap();

    let transfer = transport.download(addr).await.unwrap();
    assert_eq!(transfer.bytes, 32 * 1024);
    assert!(transfer.elapsed >= cfg.download_timeout);
    assert!(transfer.kilobytes_per_sec() > 0.0);
}
