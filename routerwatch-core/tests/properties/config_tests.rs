//! Property-based tests for settings persistence

use proptest::prelude::*;
use routerwatch_core::config::{MAX_INTERVAL_SECS, MIN_INTERVAL_SECS, PollingSettings};
use routerwatch_core::{ConfigManager, RouterSettings};
use tempfile::TempDir;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// The effective interval is always within bounds and otherwise unchanged
    #[test]
    fn interval_is_clamped(interval_secs in any::<u64>()) {
        let polling = PollingSettings { interval_secs };
        let effective = polling.effective_interval_secs();
        prop_assert!((MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS).contains(&effective));
        if (MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS).contains(&interval_secs) {
            prop_assert_eq!(effective, interval_secs);
        }
    }

    /// Saved settings load back with the same connection fields
    #[test]
    fn settings_survive_save_and_load(
        host in "[a-z]{1,12}(\\.lan)?",
        port in 1u16..=u16::MAX,
        username in "[a-z]{1,8}",
        interval_secs in 5u64..3600,
    ) {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_config_dir(dir.path().to_path_buf());

        let mut settings = RouterSettings::default();
        settings.router.host.clone_from(&host);
        settings.router.port = port;
        settings.router.username.clone_from(&username);
        settings.polling.interval_secs = interval_secs;
        manager.save_settings(&settings).unwrap();

        let loaded = manager.load_settings().unwrap();
        prop_assert_eq!(loaded.router.host, host);
        prop_assert_eq!(loaded.router.port, port);
        prop_assert_eq!(loaded.router.username, username);
        prop_assert_eq!(loaded.polling, settings.polling);
        prop_assert!(loaded.router.password.is_none());
    }
}
