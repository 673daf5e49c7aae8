//! Page context — what the tracker knows about the page it is running on.

use url::Url;

use crate::error::{BeaconError, BeaconResult};

/// The page a tracker is attached to. Read, never written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    pub hostname: String,
}

impl PageContext {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
        }
    }

    /// Derive the context from a full page URL, e.g. `https://shop.example.com/cart`.
    pub fn from_url(page_url: &str) -> BeaconResult<Self> {
        let url = Url::parse(page_url)
            .map_err(|e| BeaconError::InvalidPageUrl(format!("{page_url}: {e}")))?;
        let host = url
            .host_str()
            .ok_or_else(|| BeaconError::InvalidPageUrl(format!("{page_url}: no host")))?;
        Ok(Self::new(host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_url() {
        let ctx = PageContext::from_url("https://shop.example.com:8443/cart?x=1").unwrap();
        assert_eq!(ctx.hostname, "shop.example.com");
    }

    #[test]
    fn test_from_url_rejects_hostless() {
        assert!(PageContext::from_url("data:text/plain,hello").is_err());
        assert!(PageContext::from_url("not a url").is_err());
    }
}
