//! Content-addressed locator translation.

use crate::error::ResolveError;

/// Returns `true` if the locator uses the `ipfs:` scheme (case-insensitive).
pub fn is_ipfs_link(link: &str) -> bool {
    starts_with_ignore_case(link, "ipfs:")
}

/// Rewrite an `ipfs://` locator to a gateway URL.
///
/// Two historical forms are accepted, both mapping to the same gateway path:
/// `ipfs://ipfs/<path>` and `ipfs://<path>`. An `ipfs:` locator matching
/// neither is a malformed record: a fault, not a not-found.
pub fn ipfs_gateway_url(gateway: &str, link: &str) -> Result<String, ResolveError> {
    let path = if starts_with_ignore_case(link, "ipfs://ipfs/") {
        &link[12..]
    } else if starts_with_ignore_case(link, "ipfs://") {
        &link[7..]
    } else {
        return Err(ResolveError::UnsupportedIpfsLink(link.to_string()));
    };

    Ok(format!("{gateway}{path}"))
}

/// Translate a locator into a fetchable URL.
///
/// `ipfs:` locators are rewritten through the gateway; every other scheme
/// passes through unchanged (an already-fetchable URL is a no-op).
pub fn translate(gateway: &str, locator: &str) -> Result<String, ResolveError> {
    if is_ipfs_link(locator) {
        ipfs_gateway_url(gateway, locator)
    } else {
        Ok(locator.to_string())
    }
}

// Byte-wise comparison: safe on any UTF-8 boundary, ASCII prefixes only.
fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}
