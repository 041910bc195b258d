//! Just enough HTTP/1.1 to send one `GET` over a connection we opened
//! ourselves and read the answer back.
//!
//! Requests always carry `Connection: close`. Bodies are delimited by
//! `Content-Length`, chunked encoding, or the peer closing the stream.

use std::io;

use edgescan_common::config::USER_AGENT;
use edgescan_common::error::ProbeError;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::Instant;

use crate::network::endpoint::Endpoint;

const READ_CHUNK: usize = 16 * 1024;
const MAX_HEAD_LEN: usize = 16 * 1024;
const MAX_HEADERS: usize = 64;

pub fn get_request(endpoint: &Endpoint) -> String {
    format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nUser-Agent: {USER_AGENT}\r\nAccept: */*\r\nConnection: close\r\n\r\n",
        endpoint.path, endpoint.host
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: u16,
    pub content_length: Option<u64>,
    pub chunked: bool,
}

impl ResponseHead {
    /// Parses a response head from the start of `raw`.
    ///
    /// Returns the head and the offset where the body starts, or `None` while
    /// the head is still incomplete.
    pub fn parse(raw: &[u8]) -> Result<Option<(Self, usize)>, ProbeError> {
        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut response = httparse::Response::new(&mut headers);

        let body_offset = match response.parse(raw) {
            Ok(httparse::Status::Complete(offset)) => offset,
            Ok(httparse::Status::Partial) => return Ok(None),
            Err(_) => return Err(ProbeError::MalformedResponse("invalid HTTP/1.x response head")),
        };
        let status = response
            .code
            .ok_or(ProbeError::MalformedResponse("missing status code"))?;

        let mut head = ResponseHead {
            status,
            content_length: None,
            chunked: false,
        };

        for header in response.headers.iter() {
            let value = std::str::from_utf8(header.value)
                .map_err(|_| ProbeError::MalformedResponse("header value is not UTF-8"))?
                .trim();
            if header.name.eq_ignore_ascii_case("content-length") {
                head.content_length = Some(
                    value
                        .parse()
                        .map_err(|_| ProbeError::MalformedResponse("bad Content-Length"))?,
                );
            } else if header.name.eq_ignore_ascii_case("transfer-encoding") {
                head.chunked = value
                    .split(',')
                    .any(|coding| coding.trim().eq_ignore_ascii_case("chunked"));
            }
        }

        // Chunked framing wins over a length, as RFC 9112 requires.
        if head.chunked {
            head.content_length = None;
        }

        Ok(Some((head, body_offset)))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Reads up to the end of the header block.
///
/// Returns the parsed head and whatever body bytes arrived with it.
pub async fn read_head<S>(stream: &mut S) -> Result<(ResponseHead, Vec<u8>), ProbeError>
where
    S: AsyncRead + Unpin,
{
    let mut buf: Vec<u8> = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    loop {
        if !buf.is_empty() {
            if let Some((head, offset)) = ResponseHead::parse(&buf)? {
                let rest = buf.split_off(offset);
                return Ok((head, rest));
            }
        }
        if buf.len() > MAX_HEAD_LEN {
            return Err(ProbeError::MalformedResponse("header block too large"));
        }

        let n = read_some(stream, &mut chunk).await?;
        if n == 0 {
            return Err(ProbeError::MalformedResponse("connection closed before response head"));
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

/// Reads a complete body of at most `limit` bytes.
pub async fn read_body<S>(
    stream: &mut S,
    head: &ResponseHead,
    mut body: Vec<u8>,
    limit: usize,
) -> Result<Vec<u8>, ProbeError>
where
    S: AsyncRead + Unpin,
{
    let mut chunk = vec![0u8; READ_CHUNK];

    loop {
        if let Some(len) = head.content_length {
            if body.len() as u64 >= len {
                body.truncate(len as usize);
                return Ok(body);
            }
        }
        if head.chunked {
            if let Some(decoded) = decode_chunked(&body, limit)? {
                return Ok(decoded);
            }
        }
        if body.len() > limit {
            return Err(ProbeError::MalformedResponse("response body too large"));
        }

        let n = read_some(stream, &mut chunk).await?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    match (head.content_length, head.chunked) {
        (Some(_), _) => Err(ProbeError::MalformedResponse("body shorter than Content-Length")),
        (None, true) => Err(ProbeError::MalformedResponse("truncated chunked body")),
        (None, false) => Ok(body),
    }
}

/// Counts body bytes until the body ends, the peer closes, or `deadline`
/// passes. Running into the deadline is not an error; the caller gets the
/// bytes received so far.
///
/// Chunk framing is counted as payload; it is a rounding error next to the
/// data itself.
pub async fn drain_body<S>(
    stream: &mut S,
    head: &ResponseHead,
    already_read: u64,
    deadline: Instant,
) -> Result<u64, ProbeError>
where
    S: AsyncRead + Unpin,
{
    let mut total = already_read;
    let mut chunk = vec![0u8; READ_CHUNK];

    loop {
        if head.content_length.is_some_and(|len| total >= len) {
            break;
        }

        let n = match tokio::time::timeout_at(deadline, read_some(stream, &mut chunk)).await {
            Ok(res) => res?,
            Err(_elapsed) => break,
        };
        if n == 0 {
            break;
        }
        total += n as u64;
    }

    Ok(match head.content_length {
        Some(len) => total.min(len),
        None => total,
    })
}

/// A read where a peer that hangs up without a TLS `close_notify` counts as
/// a clean end of stream.
async fn read_some<S>(stream: &mut S, buf: &mut [u8]) -> Result<usize, ProbeError>
where
    S: AsyncRead + Unpin,
{
    match stream.read(buf).await {
        Ok(n) => Ok(n),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(0),
        Err(e) => Err(ProbeError::Io(e)),
    }
}

/// Decodes a chunked body of at most `limit` decoded bytes. `Ok(None)` while
/// the terminating chunk has not arrived yet.
pub fn decode_chunked(raw: &[u8], limit: usize) -> Result<Option<Vec<u8>>, ProbeError> {
    let mut decoded = Vec::new();
    let mut pos = 0;

    loop {
        let (consumed, size) = match httparse::parse_chunk_size(&raw[pos..]) {
            Ok(httparse::Status::Complete(parsed)) => parsed,
            Ok(httparse::Status::Partial) => return Ok(None),
            Err(_) => return Err(ProbeError::MalformedResponse("bad chunk size")),
        };
        pos += consumed;

        if size == 0 {
            return Ok(Some(decoded));
        }

        let size = usize::try_from(size)
            .ok()
            .filter(|size| decoded.len().saturating_add(*size) <= limit)
            .ok_or(ProbeError::MalformedResponse("chunked body too large"))?;
        let end = pos
            .checked_add(size)
            .ok_or(ProbeError::MalformedResponse("chunk size overflow"))?;
        let Some(next) = end.checked_add(2).filter(|next| *next <= raw.len()) else {
            return Ok(None);
        };

        if &raw[end..next] != b"\r\n" {
            return Err(ProbeError::MalformedResponse("chunk not terminated by CRLF"));
        }
        decoded.extend_from_slice(&raw[pos..end]);
        pos = next;
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
