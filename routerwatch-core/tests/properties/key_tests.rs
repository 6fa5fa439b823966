//! Property-based tests for metric keys and per-field lookup

use std::collections::BTreeMap;

use proptest::prelude::*;
use routerwatch_core::monitoring::{Direction, InterfaceCounters, MetricKey, MetricValue};
use routerwatch_core::SystemSnapshot;

fn arb_interfaces() -> impl Strategy<Value = BTreeMap<String, InterfaceCounters>> {
    prop::collection::btree_map(
        "[a-z]{2,5}[0-9]?(_[0-9])?",
        (any::<u64>(), any::<u64>()).prop_map(|(rx_bytes, tx_bytes)| InterfaceCounters {
            rx_bytes,
            tx_bytes,
            ..InterfaceCounters::default()
        }),
        0..6,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every catalogued key resolves and parses back from its string form
    #[test]
    fn catalog_keys_resolve_and_round_trip(interfaces in arb_interfaces()) {
        let snapshot = SystemSnapshot {
            interfaces: interfaces.clone(),
            ..SystemSnapshot::default()
        };

        let keys = MetricKey::catalog(&snapshot);
        prop_assert_eq!(keys.len(), MetricKey::FIXED.len() + 2 * interfaces.len());

        for key in keys {
            prop_assert!(snapshot.value(&key).is_some());
            prop_assert_eq!(key.to_string().parse::<MetricKey>(), Ok(key));
        }
    }

    /// Interface keys return that interface's byte counters
    #[test]
    fn interface_values_match_counters(interfaces in arb_interfaces()) {
        let snapshot = SystemSnapshot {
            interfaces: interfaces.clone(),
            ..SystemSnapshot::default()
        };

        for (name, counters) in &interfaces {
            let rx = MetricKey::Interface { name: name.clone(), direction: Direction::Rx };
            let tx = MetricKey::Interface { name: name.clone(), direction: Direction::Tx };
            prop_assert_eq!(snapshot.value(&rx), Some(MetricValue::Integer(counters.rx_bytes)));
            prop_assert_eq!(snapshot.value(&tx), Some(MetricValue::Integer(counters.tx_bytes)));
        }
    }
}
