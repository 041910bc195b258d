use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use async_trait::async_trait;
use edgescan_common::config::Config;
use edgescan_common::edge::directory::{Directory, DirectoryEntry};
use edgescan_common::error::ProbeError;
use edgescan_core::network::transport::{EdgeTransport, TraceExchange, Transfer};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/*************************************************************
                      Mock edge transport
**************************************************************/

#[derive(Clone)]
pub struct Edge {
    pub colo: &'static str,
    pub latency_ms: u64,
    /// `None` makes the throughput test fail.
    pub kbps: Option<u64>,
}

/// Answers only for the addresses it knows; everything else is unreachable.
#[derive(Default)]
pub struct MockTransport {
    edges: HashMap<Ipv4Addr, Edge>,
}

impl MockTransport {
    pub fn with(mut self, ip: [u8; 4], edge: Edge) -> Self {
        self.edges.insert(Ipv4Addr::from(ip), edge);
        self
    }
}

#[async_trait]
impl EdgeTransport for MockTransport {
    async fn trace(&self, target: SocketAddrV4) -> Result<TraceExchange, ProbeError> {
        let edge = self
            .edges
            .get(target.ip())
            .ok_or(ProbeError::ConnectTimeout(Duration::from_secs(1)))?;

        Ok(TraceExchange {
            handshake: Duration::from_millis(edge.latency_ms),
            body: format!("fl=1\nip={}\nuag=Mozilla/5.0\ncolo={}\nhttp=http/1.1\n", target.ip(), edge.colo),
        })
    }

    async fn download(&self, target: SocketAddrV4) -> Result<Transfer, ProbeError> {
        let kbps = self
            .edges
            .get(target.ip())
            .and_then(|edge| edge.kbps)
            .ok_or(ProbeError::Status(503))?;

        Ok(Transfer {
            bytes: kbps * 1024,
            elapsed: Duration::from_secs(1),
        })
    }
}

pub fn directory() -> Directory {
    Directory::new([
        entry("ABC", "R1", "C1"),
        entry("LHR", "Europe", "London"),
        entry("SJC", "North America", "San Jose"),
    ])
}

fn entry(code: &str, region: &str, city: &str) -> DirectoryEntry {
    DirectoryEntry {
        code: code.to_string(),
        latitude: 0.0,
        longitude: 0.0,
        country: "XX".to_string(),
        region: region.to_string(),
        city: city.to_string(),
    }
}

/*************************************************************
                  Local HTTP servers on loopback
**************************************************************/

#[derive(Clone)]
pub enum Reply {
    /// Raw response bytes, written after the request head arrives.
    Raw(Vec<u8>),
    /// Accept and read the request, then never answer.
    Stall,
    /// Write these bytes, then hold the connection open without sending more.
    Truncated(Vec<u8>),
}

impl Reply {
    pub fn ok(body: &[u8]) -> Self {
        Self::status(200, body)
    }

    pub fn status(code: u16, body: &[u8]) -> Self {
        let mut raw = format!(
            "HTTP/1.1 {code} X\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .into_bytes();
        raw.extend_from_slice(body);
        Self::Raw(raw)
    }

    /// A 200 that promises `promised` body bytes but sends only `sent`.
    pub fn stalled_body(promised: usize, sent: usize) -> Self {
        let mut raw = format!("HTTP/1.1 200 OK\r\nContent-Length: {promised}\r\n\r\n").into_bytes();
        raw.resize(raw.len() + sent, b'x');
        Self::Truncated(raw)
    }
}

/// Serves `reply` to every connection until the test ends.
pub async fn serve(reply: Reply) -> SocketAddrV4 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = match listener.local_addr().unwrap() {
        SocketAddr::V4(addr) => addr,
        SocketAddr::V6(_) => unreachable!("bound to an IPv4 address"),
    };

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let reply = reply.clone();

            tokio::spawn(async move {
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }

                match reply {
                    Reply::Raw(raw) => {
                        let _ = socket.write_all(&raw).await;
                        let _ = socket.shutdown().await;
                    }
                    Reply::Stall => {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                    }
                    Reply::Truncated(raw) => {
                        let _ = socket.write_all(&raw).await;
                        let _ = socket.flush().await;
                        tokio::time::sleep(Duration::from_secs(30)).await;
                    }
                }
            });
        }
    });

    addr
}

/// An address on loopback that refuses connections.
pub async fn closed_port() -> SocketAddrV4 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = match listener.local_addr().unwrap() {
        SocketAddr::V4(addr) => addr,
        SocketAddr::V6(_) => unreachable!("bound to an IPv4 address"),
    };
    drop(listener);
    addr
}

/// Plain-HTTP configuration with short timeouts, for loopback servers.
pub fn local_config() -> Config {
    Config {
        trace_url: "http://edge.test/cdn-cgi/trace".to_string(),
        speed_url: "http://edge.test/100mb.bin".to_string(),
        connect_timeout: Duration::from_millis(500),
        request_timeout: Duration::from_millis(300),
        download_timeout: Duration::from_millis(500),
        ..Config::default()
    }
}
