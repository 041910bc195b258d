use anyhow::{Context, bail};
use url::Url;

/// What a request needs to know about a URL once the TCP connection already
/// exists: whether to wrap it in TLS, which name to present, and what to ask
/// for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub tls: bool,
    /// Used for SNI and the `Host` header.
    pub host: String,
    /// Path plus query, always starting with `/`.
    pub path: String,
}

impl Endpoint {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let url = Url::parse(raw).with_context(|| format!("invalid URL '{raw}'"))?;

        let tls = match url.scheme() {
            "https" => true,
            "http" => false,
            other => bail!("unsupported scheme '{other}' in '{raw}'"),
        };

        let host = url
            .host_str()
            .with_context(|| format!("URL '{raw}' has no host"))?
            .to_string();

        let mut path = url.path().to_string();
        if let Some(query) = url.query() {
            path.push('?');
            path.push_str(query);
        }

        Ok(Self { tls, host, path })
    }
}
