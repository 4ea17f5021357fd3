//! Destination URL normalization.
//!
//! Destinations are stored in canonical form so that re-shortening the same
//! URL can be detected by plain string equality.

use url::Url;

/// Schemes a destination may use. Everything else (`javascript:`, `data:`,
/// `file:`, ...) is rejected outright.
const ALLOWED_SCHEMES: &[&str] = &["http", "https"];

/// Errors produced while normalizing a destination URL.
#[derive(Debug, thiserror::Error)]
pub enum DestinationError {
    #[error("Invalid destination URL: {0}")]
    Malformed(String),

    #[error("Scheme '{0}' is not allowed; only http and https destinations are accepted")]
    SchemeNotAllowed(String),
}

/// Normalizes a destination URL to its canonical form.
///
/// The parser already lowercases the host and omits default ports from the
/// serialization, so this only has to enforce the scheme allow-list and strip
/// the fragment. Path case, query parameters, and explicit non-default ports
/// are preserved.
///
/// Normalization is idempotent: feeding the output back in returns the same
/// string, which is what makes destination-equality dedupe sound.
///
/// # Errors
///
/// Returns [`DestinationError::Malformed`] for unparseable input and
/// [`DestinationError::SchemeNotAllowed`] for non-HTTP(S) schemes.
pub fn normalize_destination(input: &str) -> Result<String, DestinationError> {
    let mut url =
        Url::parse(input.trim()).map_err(|e| DestinationError::Malformed(e.to_string()))?;

    if !ALLOWED_SCHEMES.contains(&url.scheme()) {
        return Err(DestinationError::SchemeNotAllowed(url.scheme().to_string()));
    }

    url.set_fragment(None);

    Ok(url.to_string())
}
