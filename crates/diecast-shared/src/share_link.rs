//! Shareable product links.
//!
//! A link is the application's base address with a single `product` query
//! parameter. Inbound links are resolved by reading that parameter only; any
//! other parameter (session tokens, identity payloads appended by older
//! builds or by third parties) is ignored and never echoed back. After a link
//! is consumed the visible address must be replaced with
//! [`SharedLink::sanitized_location`], which carries no query at all.

use url::Url;

use crate::constants::SHARE_PARAM;
use crate::types::ProductId;

/// Result of consuming an inbound address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedLink {
    pub product_id: Option<ProductId>,
    /// The address with every query parameter and the fragment removed.
    pub sanitized_location: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ShareLinkError {
    #[error("Invalid base address: {0}")]
    InvalidBase(String),
}

/// Extract the shared product id from an address or a raw query string.
///
/// Accepts `?product=42`, `product=42&x=1` and absolute URLs. Returns `None`
/// when the parameter is missing or not a positive integer.
pub fn extract_shared_product_id(raw: &str) -> Option<ProductId> {
    let raw = raw.trim();
    let query = match Url::parse(raw) {
        Ok(url) => url.query().unwrap_or_default().to_string(),
        Err(_) => bare_query(raw).to_string(),
    };

    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == SHARE_PARAM)
        .and_then(|(_, value)| value.parse::<ProductId>().ok())
        .filter(|id| id.0 > 0)
}

/// Strip the query string and fragment from an address.
pub fn sanitize_location(raw: &str) -> String {
    let raw = raw.trim();
    match Url::parse(raw) {
        Ok(mut url) => {
            url.set_query(None);
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => raw
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}

/// Resolve an inbound address and produce the scrubbed address in one step.
pub fn consume(raw: &str) -> SharedLink {
    SharedLink {
        product_id: extract_shared_product_id(raw),
        sanitized_location: sanitize_location(raw),
    }
}

/// Build the shareable address of a product.
pub fn share_url(base: &str, id: ProductId) -> Result<String, ShareLinkError> {
    let mut url = Url::parse(base.trim()).map_err(|e| ShareLinkError::InvalidBase(e.to_string()))?;
    url.set_fragment(None);
    url.query_pairs_mut()
        .clear()
        .append_pair(SHARE_PARAM, &id.to_string());
    Ok(url.to_string())
}

fn bare_query(raw: &str) -> &str {
    let without_fragment = raw.split('#').next().unwrap_or_default();
    match without_fragment.split_once('?') {
        Some((_, query)) => query,
        None => without_fragment,
    }
}
