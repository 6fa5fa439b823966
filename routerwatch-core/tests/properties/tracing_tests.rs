//! Property-based tests for the tracing configuration

use proptest::prelude::*;
use routerwatch_core::tracing::default_directives;
use routerwatch_core::{TracingConfig, TracingLevel, TracingOutput, span_names};

// ========== Strategies ==========

/// Strategy for generating tracing levels
fn arb_tracing_level() -> impl Strategy<Value = TracingLevel> {
    prop_oneof![
        Just(TracingLevel::Error),
        Just(TracingLevel::Warn),
        Just(TracingLevel::Info),
        Just(TracingLevel::Debug),
        Just(TracingLevel::Trace),
    ]
}

/// Strategy for generating tracing output types
fn arb_tracing_output() -> impl Strategy<Value = TracingOutput> {
    prop_oneof![Just(TracingOutput::Stdout), Just(TracingOutput::Stderr),]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Builder methods compose without clobbering each other
    #[test]
    fn tracing_config_builder_composable(
        level in arb_tracing_level(),
        output in arb_tracing_output(),
        span_events in any::<bool>(),
        filter in proptest::option::of("[a-z_]{1,12}=(warn|debug)"),
    ) {
        let config = TracingConfig::new()
            .with_level(level)
            .with_output(output)
            .with_span_events(span_events);
        let config = match filter.clone() {
            Some(f) => config.with_filter(f),
            None => config,
        };

        prop_assert_eq!(config.level, level);
        prop_assert_eq!(config.output, output);
        prop_assert_eq!(config.include_span_events, span_events);
        prop_assert_eq!(config.filter, filter);
    }

    /// Level names parse back regardless of case
    #[test]
    fn tracing_level_case_insensitive(level in arb_tracing_level()) {
        let level_str = level.to_string();
        prop_assert_eq!(level_str.to_lowercase().parse::<TracingLevel>(), Ok(level));
        prop_assert_eq!(level_str.to_uppercase().parse::<TracingLevel>(), Ok(level));
    }

    /// Default directives name both crates at the chosen level
    #[test]
    fn default_directives_use_level(level in arb_tracing_level()) {
        let directives = default_directives(level);
        let core_directive = format!("routerwatch_core={level}");
        let cli_directive = format!("routerwatch_cli={level}");
        prop_assert!(directives.contains(&core_directive));
        prop_assert!(directives.contains(&cli_directive));
    }
}

#[test]
fn span_names_follow_naming_convention() {
    for name in [
        span_names::POLL_CYCLE,
        span_names::POLL_TIMER,
        span_names::SESSION_TEST,
        span_names::CONTROL_REBOOT,
        span_names::MONITOR_SETUP,
        span_names::CONFIG_LOAD,
        span_names::CONFIG_SAVE,
    ] {
        assert!(name.contains('.'), "{name} should be category.operation");
    }
}

#[test]
fn default_config_is_reasonable() {
    let config = TracingConfig::default();
    assert_eq!(config.level, TracingLevel::Info);
    assert_eq!(config.output, TracingOutput::Stderr);
    assert!(!config.include_span_events);
    assert!(config.filter.is_none());
}
