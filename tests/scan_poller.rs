//! 扫描任务轮询：进度推进、终态退出、失败即停、单循环互斥

mod common;

use std::sync::Arc;
use std::time::Duration;

use app_lib::error::ApiError;
use app_lib::models::market::ScanStatus;
use app_lib::models::stock::Action;
use app_lib::services::store::Store;
use common::*;

const INTERVAL: Duration = Duration::from_millis(1000);

fn setup() -> (Arc<MockApi>, Store) {
    let api = Arc::new(MockApi::new());
    let store = Store::with_poll_interval(api.clone(), INTERVAL);
    (api, store)
}

#[tokio::test(start_paused = true)]
async fn test_poll_until_completed() {
    let (api, store) = setup();
    api.push_scan_start(Ok(task("t1", ScanStatus::Pending, 0, 200)));

    let mut completed = task("t1", ScanStatus::Completed, 200, 200);
    completed.buy_signals = Some(vec![scan_result("sh600519", Action::Buy, 85)]);
    completed.sell_signals = Some(vec![]);
    api.script_scan(
        "t1",
        vec![
            Ok(task("t1", ScanStatus::Running, 50, 200)),
            Ok(task("t1", ScanStatus::Running, 150, 200)),
            Ok(completed.clone()),
        ],
    );

    assert!(store.start_scan(200).await);
    assert!(store.is_scan_polling());
    assert_eq!(store.snapshot().scan_task.unwrap().status, ScanStatus::Pending);

    wait_until(&store, |s| !s.scan_polling).await;

    let state = store.snapshot();
    assert_eq!(state.scan_task, Some(completed));
    assert!(state.error.is_none());
    assert_eq!(api.calls("get_scan_result"), 3);

    // 终态后不再查询
    tokio::time::sleep(INTERVAL * 5).await;
    assert_eq!(api.calls("get_scan_result"), 3);
}

#[tokio::test(start_paused = true)]
async fn test_poll_stops_on_failure_and_keeps_last_state() {
    let (api, store) = setup();
    api.push_scan_start(Ok(task("t2", ScanStatus::Pending, 0, 200)));
    api.script_scan(
        "t2",
        vec![
            Ok(task("t2", ScanStatus::Running, 80, 200)),
            Err(ApiError::new("无法连接服务器")),
        ],
    );

    assert!(store.start_scan(200).await);
    wait_until(&store, |s| !s.scan_polling).await;

    let state = store.snapshot();
    let last = state.scan_task.unwrap();
    assert_eq!(last.status, ScanStatus::Running);
    assert_eq!(last.processed, 80);
    // 轮询失败只停止循环，不写 error
    assert!(state.error.is_none());
    assert_eq!(api.calls("get_scan_result"), 2);

    tokio::time::sleep(INTERVAL * 5).await;
    assert_eq!(api.calls("get_scan_result"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_second_start_reuses_running_loop() {
    let (api, store) = setup();
    api.push_scan_start(Ok(task("t3", ScanStatus::Pending, 0, 200)));
    api.push_scan_start(Ok(task("t3", ScanStatus::Pending, 0, 200)));
    api.script_scan("t3", vec![Ok(task("t3", ScanStatus::Running, 10, 200))]);

    assert!(store.start_scan(200).await);
    assert!(store.start_scan(200).await);
    assert_eq!(api.calls("start_scan"), 2);

    tokio::time::sleep(INTERVAL * 5).await;

    // 单个循环在 5 秒内最多查询 6 次；两个循环会翻倍
    let calls = api.calls("get_scan_result");
    assert!((5..=6).contains(&calls), "unexpected poll count: {}", calls);
    assert!(store.is_scan_polling());

    store.stop_scan_polling().await;
    assert!(!store.is_scan_polling());
    assert_eq!(store.snapshot().scan_task.unwrap().processed, 10);

    tokio::time::sleep(INTERVAL * 3).await;
    assert_eq!(api.calls("get_scan_result"), calls);
}

#[tokio::test(start_paused = true)]
async fn test_start_failure_does_not_poll() {
    let (api, store) = setup();
    api.push_scan_start(Err(ApiError::new("扫描任务已在进行中")));

    assert!(!store.start_scan(200).await);

    let state = store.snapshot();
    assert!(state.scan_task.is_none());
    assert!(!state.scan_polling);
    assert_eq!(state.error.as_deref(), Some("扫描任务已在进行中"));

    tokio::time::sleep(INTERVAL * 3).await;
    assert_eq!(api.calls("get_scan_result"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_new_scan_switches_running_loop() {
    let (api, store) = setup();
    api.push_scan_start(Ok(task("a", ScanStatus::Pending, 0, 200)));
    api.push_scan_start(Ok(task("b", ScanStatus::Pending, 0, 100)));
    api.script_scan("a", vec![Ok(task("a", ScanStatus::Running, 10, 200))]);
    api.script_scan(
        "b",
        vec![
            Ok(task("b", ScanStatus::Running, 40, 100)),
            Ok(task("b", ScanStatus::Completed, 100, 100)),
        ],
    );

    assert!(store.start_scan(200).await);
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(store.snapshot().scan_task.unwrap().task_id, "a");

    assert!(store.start_scan(100).await);
    assert_eq!(store.snapshot().scan_task.unwrap().task_id, "b");

    wait_until(&store, |s| !s.scan_polling).await;

    let last = store.snapshot().scan_task.unwrap();
    assert_eq!(last.task_id, "b");
    assert_eq!(last.status, ScanStatus::Completed);
    assert_eq!(last.processed, 100);
}

#[tokio::test(start_paused = true)]
async fn test_terminal_start_response_skips_polling() {
    let (api, store) = setup();
    api.push_scan_start(Ok(task("t4", ScanStatus::Completed, 200, 200)));

    assert!(store.start_scan(200).await);
    wait_until(&store, |s| !s.scan_polling).await;

    assert_eq!(api.calls("get_scan_result"), 0);
    assert_eq!(store.snapshot().scan_task.unwrap().status, ScanStatus::Completed);
}

#[tokio::test(start_paused = true)]
async fn test_restart_after_completion_polls_again() {
    let (api, store) = setup();
    api.push_scan_start(Ok(task("t5", ScanStatus::Pending, 0, 200)));
    api.push_scan_start(Ok(task("t6", ScanStatus::Pending, 0, 200)));
    api.script_scan("t5", vec![Ok(task("t5", ScanStatus::Completed, 200, 200))]);
    api.script_scan("t6", vec![Ok(task("t6", ScanStatus::Failed, 0, 200))]);

    assert!(store.start_scan(200).await);
    wait_until(&store, |s| !s.scan_polling).await;

    assert!(store.start_scan(200).await);
    assert!(store.is_scan_polling());
    wait_until(&store, |s| !s.scan_polling).await;

    assert_eq!(api.calls("get_scan_result"), 2);
    assert_eq!(store.snapshot().scan_task.unwrap().status, ScanStatus::Failed);
}

#[tokio::test(start_paused = true)]
async fn test_stop_before_loop_first_runs_releases_guard() {
    let (api, store) = setup();
    api.push_scan_start(Ok(task("s1", ScanStatus::Pending, 0, 200)));
    api.push_scan_start(Ok(task("s2", ScanStatus::Pending, 0, 200)));
    api.script_scan("s1", vec![Ok(task("s1", ScanStatus::Running, 10, 200))]);
    api.script_scan("s2", vec![Ok(task("s2", ScanStatus::Completed, 200, 200))]);

    assert!(store.start_scan(200).await);
    // 循环尚未被调度就停止
    store.stop_scan_polling().await;
    assert!(!store.is_scan_polling());
    assert!(!store.has_poll_task());
    assert_eq!(api.calls("get_scan_result"), 0);

    // 下一次扫描仍能正常启动轮询
    assert!(store.start_scan(200).await);
    assert!(store.is_scan_polling());
    tokio::time::sleep(INTERVAL * 5).await;

    let last = store.snapshot().scan_task.unwrap();
    assert_eq!(last.task_id, "s2");
    assert_eq!(last.status, ScanStatus::Completed);
    assert!(!store.is_scan_polling());
    assert_eq!(api.calls("get_scan_result"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_finished_loop_releases_handle() {
    let (api, store) = setup();
    api.push_scan_start(Ok(task("h1", ScanStatus::Pending, 0, 200)));
    api.script_scan(
        "h1",
        vec![
            Ok(task("h1", ScanStatus::Running, 100, 200)),
            Ok(task("h1", ScanStatus::Completed, 200, 200)),
        ],
    );

    assert!(store.start_scan(200).await);
    assert!(store.has_poll_task());

    wait_until(&store, |s| !s.scan_polling).await;
    // 标志清除后循环任务随即退出
    tokio::time::sleep(INTERVAL).await;
    assert!(!store.has_poll_task());

    // 没有运行中的循环时停止是空操作
    store.stop_scan_polling().await;
    assert!(!store.is_scan_polling());
}

#[tokio::test(start_paused = true)]
async fn test_failed_poll_releases_handle() {
    let (api, store) = setup();
    api.push_scan_start(Ok(task("h2", ScanStatus::Pending, 0, 200)));
    api.script_scan("h2", vec![Err(ApiError::new("无法连接服务器"))]);

    assert!(store.start_scan(200).await);
    wait_until(&store, |s| !s.scan_polling).await;
    tokio::time::sleep(INTERVAL).await;

    assert!(!store.has_poll_task());
    assert_eq!(api.calls("get_scan_result"), 1);
}
