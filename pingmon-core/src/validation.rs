//! Host name and IPv4 address validation
//!
//! A host is accepted when it is either a dotted-quad IPv4 address or a
//! domain name with an alphabetic top-level label. Validation is purely
//! syntactic; nothing here touches the network.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Maximum accepted host length in characters
pub const MAX_HOST_LEN: usize = 255;

/// Maximum length of a single domain label
pub const MAX_LABEL_LEN: usize = 63;

/// Cached regex for a single non-final domain label
static DOMAIN_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9-]*[a-zA-Z0-9])?$")
        .expect("DOMAIN_LABEL is a valid regex pattern")
});

/// Cached regex for the top-level label
static TOP_LEVEL_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z]{2,}$").expect("TOP_LEVEL_LABEL is a valid regex pattern")
});

/// Reasons a host string is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// Host is empty or longer than [`MAX_HOST_LEN`]
    #[error("Host name cannot be empty or longer than 255 characters")]
    Length,
    /// Host is neither an IPv4 address nor a domain name
    #[error("Invalid host format")]
    InvalidFormat,
}

/// Validates a host string as an IPv4 address or a domain name
///
/// # Errors
///
/// Returns [`HostError::Length`] for empty or overlong input and
/// [`HostError::InvalidFormat`] when the string matches neither form.
pub fn validate_host(host: &str) -> Result<(), HostError> {
    if host.is_empty() || host.chars().count() > MAX_HOST_LEN {
        return Err(HostError::Length);
    }

    if is_ipv4_address(host) {
        return Ok(());
    }

    // Digits-and-dots that failed the IPv4 rule are never domains
    if looks_numeric(host) {
        return Err(HostError::InvalidFormat);
    }

    if is_valid_domain(host) {
        Ok(())
    } else {
        Err(HostError::InvalidFormat)
    }
}

/// Returns `true` if [`validate_host`] accepts the host
#[must_use]
pub fn is_valid_host(host: &str) -> bool {
    validate_host(host).is_ok()
}

/// Checks for a dotted-quad IPv4 address without leading zeros
///
/// `"0"` is a valid segment, `"01"` is not.
#[must_use]
pub fn is_ipv4_address(host: &str) -> bool {
    let segments: Vec<&str> = host.split('.').collect();
    if segments.len() != 4 {
        return false;
    }

    segments.iter().all(|segment| {
        if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        if segment.len() > 1 && segment.starts_with('0') {
            return false;
        }
        segment.parse::<u16>().is_ok_and(|value| value <= 255)
    })
}

/// Checks domain syntax: alphanumeric labels with inner hyphens, separated by
/// single dots, ending in an alphabetic label of two or more characters
#[must_use]
pub fn is_valid_domain(host: &str) -> bool {
    if host.is_empty() || host.len() > MAX_HOST_LEN {
        return false;
    }

    let labels: Vec<&str> = host.split('.').collect();
    // A bare label has no top-level domain
    let Some((tld, rest)) = labels.split_last() else {
        return false;
    };
    if rest.is_empty() {
        return false;
    }

    let labels_ok = rest
        .iter()
        .all(|label| label.len() <= MAX_LABEL_LEN && DOMAIN_LABEL.is_match(label));

    labels_ok && tld.len() <= MAX_LABEL_LEN && TOP_LEVEL_LABEL.is_match(tld)
}

fn looks_numeric(host: &str) -> bool {
    host.bytes().all(|b| b.is_ascii_digit() || b == b'.')
}
