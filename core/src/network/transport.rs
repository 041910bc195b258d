//! The seam between the measurement stages and the network.
//!
//! Stages only ever talk to an [`EdgeTransport`]. [`HttpTransport`] is the real
//! implementation: plain TCP from tokio, wrapped in TLS when the URL asks for
//! it, with a hand-written HTTP/1.1 exchange on top so that the request rides
//! on the exact connection whose handshake was timed.

use std::net::SocketAddrV4;
use std::time::Duration;

use async_trait::async_trait;
use edgescan_common::config::Config;
use edgescan_common::error::ProbeError;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout, timeout_at};
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::pki_types::ServerName;

use crate::network::endpoint::Endpoint;
use crate::network::{http, tls};

/// Trace bodies are a few hundred bytes; anything bigger is not a trace.
const MAX_TRACE_BODY: usize = 64 * 1024;

/// What one identity probe saw.
#[derive(Debug, Clone)]
pub struct TraceExchange {
    /// Time to establish the TCP connection.
    pub handshake: Duration,
    pub body: String,
}

/// What one throughput attempt moved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transfer {
    pub bytes: u64,
    pub elapsed: Duration,
}

impl Transfer {
    pub fn kilobytes_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.bytes as f64 / secs / 1024.0
    }
}

#[async_trait]
pub trait EdgeTransport: Send + Sync {
    /// Connects to `target`, times the TCP handshake, then requests the trace
    /// document over that same connection.
    async fn trace(&self, target: SocketAddrV4) -> Result<TraceExchange, ProbeError>;

    /// Opens a fresh connection to `target` and downloads the reference file.
    async fn download(&self, target: SocketAddrV4) -> Result<Transfer, ProbeError>;
}

struct Route {
    endpoint: Endpoint,
    tls: Option<TlsRoute>,
}

struct TlsRoute {
    connector: TlsConnector,
    server_name: ServerName<'static>,
}

impl Route {
    fn new(raw_url: &str, connector: &mut Option<TlsConnector>) -> anyhow::Result<Self> {
        let endpoint = Endpoint::parse(raw_url)?;

        let tls = if endpoint.tls {
            let connector = match connector.as_ref() {
                Some(shared) => shared.clone(),
                None => {
                    let built = tls::connector()?;
                    *connector = Some(built.clone());
                    built
                }
            };
            Some(TlsRoute {
                connector,
                server_name: tls::server_name(&endpoint.host)?,
            })
        } else {
            None
        };

        Ok(Self { endpoint, tls })
    }

    async fn handshake(
        &self,
        tls: &TlsRoute,
        stream: TcpStream,
    ) -> Result<TlsStream<TcpStream>, ProbeError> {
        tls.connector
            .connect(tls.server_name.clone(), stream)
            .await
            .map_err(ProbeError::Tls)
    }
}

pub struct HttpTransport {
    trace: Route,
    speed: Route,
    connect_timeout: Duration,
    request_timeout: Duration,
    download_timeout: Duration,
}

impl HttpTransport {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let mut connector = None;

        Ok(Self {
            trace: Route::new(&cfg.trace_url, &mut connector)?,
            speed: Route::new(&cfg.speed_url, &mut connector)?,
            connect_timeout: cfg.connect_timeout,
            request_timeout: cfg.request_timeout,
            download_timeout: cfg.download_timeout,
        })
    }

    async fn connect(&self, target: SocketAddrV4) -> Result<(TcpStream, Duration), ProbeError> {
        let start = Instant::now();

        let stream = match timeout(self.connect_timeout, TcpStream::connect(target)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(ProbeError::Connect(e)),
            Err(_elapsed) => return Err(ProbeError::ConnectTimeout(self.connect_timeout)),
        };
        let handshake = start.elapsed();

        let _ = stream.set_nodelay(true);
        Ok((stream, handshake))
    }

    async fn fetch_trace(&self, stream: TcpStream) -> Result<Vec<u8>, ProbeError> {
        let route = &self.trace;
        match &route.tls {
            Some(tls) => {
                let mut stream = route.handshake(tls, stream).await?;
                fetch_small(&mut stream, &route.endpoint).await
            }
            None => {
                let mut stream = stream;
                fetch_small(&mut stream, &route.endpoint).await
            }
        }
    }
}

#[async_trait]
impl EdgeTransport for HttpTransport {
    async fn trace(&self, target: SocketAddrV4) -> Result<TraceExchange, ProbeError> {
        let (stream, handshake) = self.connect(target).await?;

        let body = timeout(self.request_timeout, self.fetch_trace(stream))
            .await
            .map_err(|_| ProbeError::ExchangeTimeout(self.request_timeout))??;

        Ok(TraceExchange {
            handshake,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }

    async fn download(&self, target: SocketAddrV4) -> Result<Transfer, ProbeError> {
        let (stream, _) = self.connect(target).await?;

        let start = Instant::now();
        let deadline = start + self.download_timeout;
        let route = &self.speed;

        let bytes = match &route.tls {
            Some(tls) => {
                let mut stream = timeout_at(deadline, route.handshake(tls, stream))
                    .await
                    .map_err(|_| ProbeError::ExchangeTimeout(self.download_timeout))??;
                download_over(&mut stream, &route.endpoint, deadline, self.download_timeout).await?
            }
            None => {
                let mut stream = stream;
                download_over(&mut stream, &route.endpoint, deadline, self.download_timeout).await?
            }
        };

        Ok(Transfer {
            bytes,
            elapsed: start.elapsed(),
        })
    }
}

async fn send_get<S>(stream: &mut S, endpoint: &Endpoint) -> Result<(), ProbeError>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(http::get_request(endpoint).as_bytes()).await?;
    stream.flush().await?;
    Ok(())
}

/// One request, one small body. Status codes are not judged here; the trace
/// content decides whether the node is genuine.
async fn fetch_small<S>(stream: &mut S, endpoint: &Endpoint) -> Result<Vec<u8>, ProbeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    send_get(stream, endpoint).await?;
    let (head, rest) = http::read_head(stream).await?;
    http::read_body(stream, &head, rest, MAX_TRACE_BODY).await
}

async fn download_over<S>(
    stream: &mut S,
    endpoint: &Endpoint,
    deadline: Instant,
    budget: Duration,
) -> Result<u64, ProbeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (head, rest) = timeout_at(deadline, async {
        send_get(stream, endpoint).await?;
        http::read_head(stream).await
    })
    .await
    .map_err(|_| ProbeError::ExchangeTimeout(budget))??;

    if !head.is_success() {
        return Err(ProbeError::Status(head.status));
    }

    http::drain_body(stream, &head, rest.len() as u64, deadline).await
}
