//! Property-based tests for the router status parsers

use proptest::prelude::*;
use routerwatch_core::monitoring::{LoadAverage, MetricsParser, ZERO_MAC, percent_used};

// ========== Strategies ==========

/// Interface names as routers report them
fn arb_interface_name() -> impl Strategy<Value = String> {
    "(eth|br|wlan|ppp|vlan)[0-9]{1,2}"
}

/// A MAC address, occasionally the all-zero placeholder
fn arb_mac() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => proptest::array::uniform6(any::<u8>()).prop_map(|b| {
            format!(
                "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
                b[0], b[1], b[2], b[3], b[4], b[5]
            )
        }),
        1 => Just(ZERO_MAC.to_string()),
    ]
}

/// One ARP row: (ip, mac, device)
fn arb_arp_row() -> impl Strategy<Value = (String, String, String)> {
    (
        (1u8..=254, 1u8..=254).prop_map(|(a, b)| format!("192.168.{a}.{b}")),
        arb_mac(),
        arb_interface_name(),
    )
}

/// Counters for one /proc/net/dev row
fn arb_counters() -> impl Strategy<Value = (u64, u64, u64, u64)> {
    (any::<u64>(), any::<u32>(), any::<u64>(), any::<u32>())
        .prop_map(|(rb, rp, tb, tp)| (rb, u64::from(rp), tb, u64::from(tp)))
}

fn net_dev_row(name: &str, (rx_bytes, rx_packets, tx_bytes, tx_packets): (u64, u64, u64, u64)) -> String {
    format!("  {name}: {rx_bytes} {rx_packets} 0 0 0 0 0 0 {tx_bytes} {tx_packets} 0 0 0 0 0 0")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// No parser panics on arbitrary input
    #[test]
    fn parsers_never_panic(input in ".{0,400}") {
        let _ = MetricsParser::parse_loadavg(&input);
        let _ = MetricsParser::parse_memory(&input);
        let _ = MetricsParser::parse_uptime(&input);
        let _ = MetricsParser::parse_interfaces(&input);
        let _ = MetricsParser::parse_arp_table(&input);
    }

    /// Malformed load average falls back to all zeros
    #[test]
    fn malformed_loadavg_defaults_to_zero(input in "[xyz /]{0,40}") {
        let load = MetricsParser::parse_loadavg(&input).unwrap_or_default();
        prop_assert_eq!(load, LoadAverage::default());
    }

    /// Well-formed load averages are read in order
    #[test]
    fn loadavg_reads_first_three_tokens(
        one in 0.0f64..64.0,
        five in 0.0f64..64.0,
        fifteen in 0.0f64..64.0,
        running in 1u32..100,
        total in 100u32..5000,
        last_pid in 1u32..65535,
    ) {
        let line = format!("{one:.2} {five:.2} {fifteen:.2} {running}/{total} {last_pid}");
        let load = MetricsParser::parse_loadavg(&line).unwrap();
        prop_assert_eq!(load.one, format!("{one:.2}").parse::<f64>().unwrap());
        prop_assert_eq!(load.five, format!("{five:.2}").parse::<f64>().unwrap());
        prop_assert_eq!(load.fifteen, format!("{fifteen:.2}").parse::<f64>().unwrap());
    }

    /// Memory percentage is bounded and rounded to one decimal
    #[test]
    fn memory_percent_bounded_and_rounded(total in 1u64..4_000_000, used_share in 0.0f64..=1.0) {
        let used = (total as f64 * used_share) as u64;
        let free = total - used;
        let output = format!("header\nMem: {total} {used} {free} 0 0 0");

        let mem = MetricsParser::parse_memory(&output).unwrap();
        let expected = ((used as f64 / total as f64) * 100.0 * 10.0).round_ties_even() / 10.0;
        prop_assert!((0.0..=100.0).contains(&mem.percent_used));
        prop_assert!((mem.percent_used - expected).abs() < 1e-9);
        prop_assert_eq!((mem.total_mb, mem.used_mb, mem.free_mb), (total, used, free));
    }

    /// Percentage stays in range even when used exceeds total
    #[test]
    fn percent_used_always_in_range(used in any::<u64>(), total in any::<u64>()) {
        let percent = percent_used(used, total);
        prop_assert!((0.0..=100.0).contains(&percent));
        if total == 0 {
            prop_assert!(percent.abs() < f64::EPSILON);
        }
    }

    /// Uptime decomposition accounts for every whole minute
    #[test]
    fn uptime_decomposition_is_consistent(secs in 0u64..1_000_000_000, frac in 0u32..100) {
        let uptime = MetricsParser::parse_uptime(&format!("{secs}.{frac:02} 12345.67")).unwrap();
        prop_assert_eq!(uptime.seconds, secs);
        prop_assert!(uptime.hours() < 24);
        prop_assert!(uptime.minutes() < 60);
        let accounted = uptime.days() * 86_400 + uptime.hours() * 3_600 + uptime.minutes() * 60;
        prop_assert!(accounted <= secs && secs - accounted < 60);
        let expected_display =
            format!("{}d {}h {}m", uptime.days(), uptime.hours(), uptime.minutes());
        prop_assert_eq!(uptime.to_string(), expected_display);
    }

    /// Zero-MAC neighbours are dropped and table order is kept
    #[test]
    fn arp_excludes_zero_mac(rows in prop::collection::vec(arb_arp_row(), 0..20)) {
        let mut output = String::from("IP address HW type Flags HW address Mask Device\n");
        for (ip, mac, dev) in &rows {
            output.push_str(&format!("{ip} 0x1 0x2 {mac} * {dev}\n"));
        }

        let devices = MetricsParser::parse_arp_table(&output);
        let expected: Vec<_> = rows.iter().filter(|(_, mac, _)| mac != ZERO_MAC).collect();
        prop_assert_eq!(devices.len(), expected.len());
        for (device, (ip, mac, dev)) in devices.iter().zip(expected) {
            prop_assert_eq!(&device.ip, ip);
            prop_assert_eq!(&device.mac, mac);
            prop_assert_eq!(&device.interface, dev);
        }
    }

    /// Short interface rows are skipped without disturbing valid ones
    #[test]
    fn short_interface_rows_are_skipped(
        rows in prop::collection::btree_map(arb_interface_name(), arb_counters(), 0..8),
        short_fields in 1usize..9,
    ) {
        let mut output = String::from("Inter-|   Receive\n face |bytes\n");
        for (name, counters) in &rows {
            output.push_str(&net_dev_row(name, *counters));
            output.push('\n');
            let short: Vec<String> = (0..short_fields).map(|i| i.to_string()).collect();
            output.push_str(&format!("  bad{name}: {}\n", short.join(" ")));
        }

        let interfaces = MetricsParser::parse_interfaces(&output).unwrap();
        prop_assert_eq!(interfaces.len(), rows.len());
        for (name, (rx_bytes, rx_packets, tx_bytes, tx_packets)) in &rows {
            let parsed = &interfaces[name];
            prop_assert_eq!(parsed.rx_bytes, *rx_bytes);
            prop_assert_eq!(parsed.rx_packets, *rx_packets);
            prop_assert_eq!(parsed.tx_bytes, *tx_bytes);
            prop_assert_eq!(parsed.tx_packets, *tx_packets);
        }
    }

    /// A row that stops after the tx bytes column rejects the whole table
    #[test]
    fn ten_field_interface_row_rejects_table(
        rows in prop::collection::btree_map(arb_interface_name(), arb_counters(), 0..8),
        (rx_bytes, rx_packets, tx_bytes, _) in arb_counters(),
    ) {
        let mut output = String::from("Inter-|   Receive\n face |bytes\n");
        for (name, counters) in &rows {
            output.push_str(&net_dev_row(name, *counters));
            output.push('\n');
        }
        output.push_str(&format!("  ppp0: {rx_bytes} {rx_packets} 0 0 0 0 0 0 {tx_bytes}\n"));

        prop_assert!(MetricsParser::parse_interfaces(&output).is_err());
    }
}

// ========== Literal fixtures ==========

#[test]
fn loadavg_end_to_end_values() {
    let load = MetricsParser::parse_loadavg("0.15 0.22 0.10 1/234 5678").unwrap();
    assert_eq!(
        load,
        LoadAverage {
            one: 0.15,
            five: 0.22,
            fifteen: 0.10,
        }
    );
}

#[test]
fn memory_end_to_end_values() {
    let mem =
        MetricsParser::parse_memory("              total used free\nMem: 256 120 136 0 10 80")
            .unwrap();
    assert_eq!((mem.total_mb, mem.used_mb, mem.free_mb), (256, 120, 136));
    assert!((mem.percent_used - 46.9).abs() < f64::EPSILON);
}
