use std::io;
use std::time::Duration;

use thiserror::Error;

/// A line of the input list that could not be turned into a target.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("invalid IPv4 address '{token}'")]
    InvalidAddress { token: String },

    #[error("invalid CIDR block '{token}': {reason}")]
    InvalidCidr { token: String, reason: String },
}

/// Why a single candidate (or a single throughput attempt) failed.
///
/// Never fatal: the probe stage drops the candidate, the throughput stage
/// records zero.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("connection failed: {0}")]
    Connect(#[source] io::Error),

    #[error("connection not established within {0:?}")]
    ConnectTimeout(Duration),

    #[error("exchange did not complete within {0:?}")]
    ExchangeTimeout(Duration),

    #[error("TLS handshake failed: {0}")]
    Tls(#[source] io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed HTTP response: {0}")]
    MalformedResponse(&'static str),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("response does not echo the identity marker")]
    MissingMarker,

    #[error("response carries no datacenter code")]
    MissingColo,
}

impl ProbeError {
    /// Failures that happened before the candidate accepted a TCP connection.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ProbeError::Connect(_) | ProbeError::ConnectTimeout(_))
    }
}
