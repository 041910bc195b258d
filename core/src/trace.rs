//! Parser for the CDN trace body.
//!
//! The trace endpoint answers with `key=value` lines, for example:
//!
//! ```text
//! fl=29f12
//! h=speed.cloudflare.com
//! ip=203.0.113.9
//! uag=Mozilla/5.0
//! colo=SJC
//! ```
//!
//! Two things are read from it:
//! * the echo marker (`uag=<User-Agent>`), which must appear verbatim;
//! * the datacenter code: the run of `A-Z` that directly follows `colo=`.
//!   Occurrences are scanned in order and the first non-empty run wins.

use edgescan_common::error::ProbeError;

const COLO_KEY: &str = "colo=";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceInfo {
    pub colo: String,
}

/// Validates a trace body and pulls the datacenter code out of it.
pub fn parse(body: &str, marker: &str) -> Result<TraceInfo, ProbeError> {
    if !body.contains(marker) {
        return Err(ProbeError::MissingMarker);
    }

    let colo = colo(body).ok_or(ProbeError::MissingColo)?;
    Ok(TraceInfo {
        colo: colo.to_string(),
    })
}

/// The datacenter code carried by `body`, if any.
pub fn colo(body: &str) -> Option<&str> {
    body.match_indices(COLO_KEY).find_map(|(idx, _)| {
        let value = &body[idx + COLO_KEY.len()..];
        let len = value
            .bytes()
            .take_while(|b| b.is_ascii_uppercase())
            .count();
        (len > 0).then(|| &value[..len])
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
