//! Integration tests for refresh coalescing and failure isolation

use std::time::Duration;

use futures::future::join_all;
use routerwatch_core::monitoring::{LOADAVG_COMMAND, MEMORY_COMMAND, UNKNOWN_UPTIME, UPTIME_COMMAND};
use routerwatch_core::testing::ScriptedTransport;
use routerwatch_core::{PollFailure, PollResult, PollScheduler, PollState, control};

use super::handle_with;

fn scheduler_with(transport: &ScriptedTransport) -> PollScheduler {
    PollScheduler::new(handle_with(transport), Duration::from_secs(30))
}

// ========== Coalescing ==========

#[tokio::test]
async fn concurrent_refreshes_share_one_cycle() {
    let transport = ScriptedTransport::router_fixture();
    transport.set_latency(Duration::from_millis(20));
    let scheduler = scheduler_with(&transport);

    let results = join_all((0..8).map(|_| scheduler.refresh())).await;

    assert_eq!(transport.connect_count(), 1);
    assert_eq!(transport.executed_commands().len(), 5);
    assert!(results[0].is_success());
    assert!(results.iter().all(|r| *r == results[0]));
    assert_eq!(scheduler.state(), PollState::Idle);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn refreshes_from_many_tasks_share_one_cycle() {
    let transport = ScriptedTransport::router_fixture();
    transport.set_latency(Duration::from_millis(50));
    let scheduler = scheduler_with(&transport);

    let first = tokio::spawn({
        let scheduler = scheduler.clone();
        async move { scheduler.refresh().await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(scheduler.state(), PollState::Refreshing);

    let joiners: Vec<_> = (0..4)
        .map(|_| {
            let scheduler = scheduler.clone();
            tokio::spawn(async move { scheduler.refresh().await })
        })
        .collect();

    let expected = first.await.unwrap();
    for joiner in joiners {
        assert_eq!(joiner.await.unwrap(), expected);
    }
    assert_eq!(transport.connect_count(), 1);
}

#[tokio::test]
async fn refresh_after_completion_starts_new_cycle() {
    let transport = ScriptedTransport::router_fixture();
    let scheduler = scheduler_with(&transport);

    let first = scheduler.refresh().await;
    let second = scheduler.refresh().await;

    assert_eq!(transport.connect_count(), 2);
    assert!(second.timestamp() >= first.timestamp());
}

// ========== Failure isolation ==========

#[tokio::test]
async fn failed_cycle_keeps_last_snapshot() {
    let transport = ScriptedTransport::router_fixture();
    let scheduler = scheduler_with(&transport);

    let good = scheduler.refresh().await;
    let good_snapshot = good.snapshot().cloned();

    transport.set_connect_fails(true);
    let failed = scheduler.refresh().await;
    assert_eq!(
        failed.failure_reason(),
        Some(&PollFailure::Connect("192.168.1.1:22".to_string()))
    );
    assert!(!scheduler.last_update_success());
    assert_eq!(scheduler.last_snapshot(), good_snapshot);

    transport.set_connect_fails(false);
    transport.set_response(MEMORY_COMMAND, "header\nMem: 512 256 256 0 0 0");
    let recovered = scheduler.refresh().await;
    assert!(recovered.is_success());
    assert!(scheduler.last_update_success());
    assert_eq!(scheduler.last_snapshot().unwrap().memory_total_mb, 512);
}

#[tokio::test]
async fn broken_commands_degrade_fields_not_the_cycle() {
    let transport = ScriptedTransport::router_fixture()
        .with_response(LOADAVG_COMMAND, "not a load average")
        .with_exec_error(UPTIME_COMMAND);
    let scheduler = scheduler_with(&transport);

    let result = scheduler.refresh().await;
    let snapshot = result.snapshot().unwrap();
    assert!(snapshot.cpu_load_1.abs() < f64::EPSILON);
    assert_eq!(snapshot.uptime_display, UNKNOWN_UPTIME);
    assert_eq!(snapshot.memory_used_mb, 120);
    assert_eq!(snapshot.connected_devices_count, 2);
    assert!(scheduler.last_update_success());
}

#[tokio::test]
async fn subscribers_observe_failure_then_recovery() {
    let transport = ScriptedTransport::router_fixture();
    transport.set_connect_fails(true);
    let scheduler = scheduler_with(&transport);
    let mut rx = scheduler.subscribe();

    scheduler.refresh().await;
    rx.changed().await.unwrap();
    assert!(matches!(
        rx.borrow_and_update().as_ref(),
        Some(PollResult::Failure { .. })
    ));

    transport.set_connect_fails(false);
    scheduler.refresh().await;
    rx.changed().await.unwrap();
    assert!(rx.borrow_and_update().as_ref().is_some_and(PollResult::is_success));
}

// ========== Shared session ==========

#[tokio::test]
async fn reboot_and_poll_never_overlap_on_the_session() {
    let transport = ScriptedTransport::router_fixture();
    transport.set_latency(Duration::from_millis(5));
    let scheduler = scheduler_with(&transport);

    let (result, rebooted) = tokio::join!(
        scheduler.refresh(),
        control::reboot(scheduler.session())
    );

    assert!(result.is_success());
    assert!(rebooted);
    assert_eq!(transport.max_concurrent_ops(), 1);
    assert!(
        transport
            .executed_commands()
            .contains(&control::REBOOT_COMMAND.to_string())
    );
}

#[tokio::test]
async fn timer_publishes_until_stopped() {
    let transport = ScriptedTransport::router_fixture();
    let scheduler = PollScheduler::new(handle_with(&transport), Duration::from_millis(50));
    let mut rx = scheduler.subscribe();

    let timer = scheduler.start();
    for _ in 0..3 {
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().as_ref().is_some_and(PollResult::is_success));
    }
    timer.stop().await;

    let cycles = transport.connect_count();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(transport.connect_count(), cycles);
}
