//! Property-based tests for host validation

use pingmon_core::validation::{HostError, MAX_HOST_LEN, is_ipv4_address, validate_host};
use proptest::prelude::*;

// ============================================================================
// Strategies for generating test data
// ============================================================================

/// Strategy for a domain label that satisfies the label rules
fn arb_label() -> impl Strategy<Value = String> {
    "[a-z0-9]([a-z0-9-]{0,20}[a-z0-9])?"
}

/// Strategy for an alphabetic top-level label
fn arb_tld() -> impl Strategy<Value = String> {
    "[a-z]{2,6}"
}

/// Strategy for well-formed domain names
fn arb_domain() -> impl Strategy<Value = String> {
    (prop::collection::vec(arb_label(), 1..4), arb_tld())
        .prop_map(|(labels, tld)| format!("{}.{tld}", labels.join(".")))
}

// ============================================================================
// IPv4 addresses
// ============================================================================

proptest! {
    #[test]
    fn every_dotted_quad_in_range_is_valid(a in 0u8..=255, b in 0u8..=255, c in 0u8..=255, d in 0u8..=255) {
        let host = format!("{a}.{b}.{c}.{d}");
        prop_assert!(is_ipv4_address(&host));
        prop_assert_eq!(validate_host(&host), Ok(()));
    }

    #[test]
    fn out_of_range_segment_is_invalid(value in 256u32..100_000, position in 0usize..4) {
        let mut segments = vec!["1".to_string(); 4];
        segments[position] = value.to_string();
        let host = segments.join(".");
        prop_assert_eq!(validate_host(&host), Err(HostError::InvalidFormat));
    }

    #[test]
    fn leading_zero_segment_is_invalid(value in 0u8..=99, position in 0usize..4) {
        let mut segments = vec!["10".to_string(); 4];
        segments[position] = format!("0{value}");
        let host = segments.join(".");
        prop_assert_eq!(validate_host(&host), Err(HostError::InvalidFormat));
    }

    #[test]
    fn wrong_segment_count_is_invalid(segments in prop::collection::vec(0u8..=255, 1..8)) {
        prop_assume!(segments.len() != 4);
        let host = segments.iter().map(ToString::to_string).collect::<Vec<_>>().join(".");
        prop_assert!(!is_ipv4_address(&host));
        prop_assert!(validate_host(&host).is_err());
    }
}

// ============================================================================
// Domain names
// ============================================================================

proptest! {
    #[test]
    fn generated_domains_are_valid(domain in arb_domain()) {
        prop_assert_eq!(validate_host(&domain), Ok(()));
    }

    #[test]
    fn domain_with_empty_label_is_invalid(domain in arb_domain()) {
        let broken = domain.replacen('.', "..", 1);
        prop_assert_eq!(validate_host(&broken), Err(HostError::InvalidFormat));
    }

    #[test]
    fn single_label_is_invalid(label in "[a-z]{1,20}") {
        prop_assert_eq!(validate_host(&label), Err(HostError::InvalidFormat));
    }

    #[test]
    fn numeric_tld_is_invalid(label in arb_label(), tld in "[0-9]{2,4}") {
        let host = format!("{label}.{tld}");
        prop_assert!(validate_host(&host).is_err());
    }

    #[test]
    fn validation_is_deterministic(host in "\\PC{0,40}") {
        prop_assert_eq!(validate_host(&host), validate_host(&host));
    }
}

// ============================================================================
// Length bounds
// ============================================================================

proptest! {
    #[test]
    fn overlong_input_is_a_length_error(extra in 1usize..64) {
        let host = "a".repeat(MAX_HOST_LEN + extra);
        prop_assert_eq!(validate_host(&host), Err(HostError::Length));
    }
}
