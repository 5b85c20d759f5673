//! Property-based tests for monitor settings

use pingmon_core::probe::PROBE_GRACE;
use pingmon_core::settings::{MonitorSettings, ProbeKind};
use proptest::prelude::*;

fn grace_ms() -> u64 {
    PROBE_GRACE.as_millis() as u64
}

fn arb_probe_kind() -> impl Strategy<Value = ProbeKind> {
    prop_oneof![Just(ProbeKind::Ping), Just(ProbeKind::Tcp)]
}

proptest! {
    #[test]
    fn valid_settings_survive_toml(
        a in 1u8..=254,
        interval in 1u64..3600,
        probe_ms in 1u64..5000,
        extra_ms in 0u64..5000,
        probe in arb_probe_kind(),
        port in 1u16..=u16::MAX,
    ) {
        let settings = MonitorSettings {
            host: format!("10.0.0.{a}"),
            interval_secs: interval,
            probe_timeout_ms: probe_ms,
            stop_timeout_ms: probe_ms + grace_ms() + extra_ms,
            probe,
            tcp_port: port,
            ..MonitorSettings::default()
        };
        prop_assert!(settings.validate().is_ok());

        let text = settings.to_toml_string().unwrap();
        let parsed = MonitorSettings::from_toml_str(&text).unwrap();
        prop_assert_eq!(parsed, settings);
    }

    #[test]
    fn probe_outlasting_stop_timeout_is_rejected(stop_ms in 1u64..5000, over in 1u64..5000) {
        let settings = MonitorSettings {
            probe_timeout_ms: (stop_ms + over).saturating_sub(grace_ms()).max(1),
            stop_timeout_ms: stop_ms,
            ..MonitorSettings::default()
        };
        prop_assert!(settings.validate().is_err());
    }
}
