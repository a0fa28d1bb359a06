//! Forward proxy descriptors.

use std::fmt;
use url::Url;

use crate::ledger::types::{LedgerError, LedgerResult};

/// Scheme assumed for proxy entries written as bare `host:port`.
pub const DEFAULT_PROXY_SCHEME: &str = "http://";

/// Prefix `http://` unless the entry already names a scheme.
pub fn normalize_proxy_uri(raw: &str) -> String {
    let raw = raw.trim();
    if raw.contains("://") {
        raw.to_string()
    } else {
        format!("{}{}", DEFAULT_PROXY_SCHEME, raw)
    }
}

/// A proxy URI bound to one account for the whole run.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyDescriptor {
    uri: String,
}

impl ProxyDescriptor {
    /// Normalize and validate a proxy entry.
    pub fn parse(raw: &str) -> LedgerResult<Self> {
        let uri = normalize_proxy_uri(raw);
        let parsed = Url::parse(&uri).map_err(|_| LedgerError::InvalidProxy(redact(&uri)))?;
        if parsed.host_str().is_none() {
            return Err(LedgerError::InvalidProxy(redact(&uri)));
        }
        Ok(Self { uri })
    }

    pub fn as_str(&self) -> &str {
        &self.uri
    }

    /// The URI with any password masked, for logs.
    pub fn redacted(&self) -> String {
        redact(&self.uri)
    }
}

fn redact(uri: &str) -> String {
    match Url::parse(uri) {
        Ok(mut url) if url.password().is_some() => {
            let _ = url.set_password(Some("***"));
            url.to_string()
        }
        _ => uri.to_string(),
    }
}

impl fmt::Display for ProxyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl fmt::Debug for ProxyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProxyDescriptor({})", self.redacted())
    }
}
