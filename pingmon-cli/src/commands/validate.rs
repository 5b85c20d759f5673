//! Host syntax validation command.

use pingmon_core::validation::{is_ipv4_address, validate_host};

use crate::error::CliError;
use crate::util::{GREEN, Output};

/// Validate command handler
pub fn cmd_validate(host: &str, out: Output) -> Result<(), CliError> {
    validate_host(host).map_err(|e| CliError::InvalidHost {
        host: host.to_string(),
        reason: e.to_string(),
    })?;

    if !out.quiet {
        let kind = if is_ipv4_address(host) {
            "IPv4 address"
        } else {
            "domain name"
        };
        println!("{} {host} is a valid {kind}", out.paint(GREEN, "✓"));
    }
    Ok(())
}
