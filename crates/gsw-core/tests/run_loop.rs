use async_trait::async_trait;
use gsw_core::{LoopState, WatchConfig, WatchError, Watcher};
use gsw_model::Observation;
use gsw_observer::{ObserveError, ResourceObserver};
use gsw_test_utils::{
    create_cluster, decode_error, observation_of, temp_snapshot_path, RecordingNotifier,
    StaticObserver,
};
use mockall::mock;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

mock! {
    pub Observer {}

    #[async_trait]
    impl ResourceObserver for Observer {
        async fn wait_ready(&self) -> Result<(), ObserveError>;
        async fn observe(&self) -> Result<Observation, ObserveError>;
    }
}

#[tokio::test]
async fn test_observation_failure_terminates_run() {
    let (_dir, path) = temp_snapshot_path();
    let mut observer = MockObserver::new();
    observer.expect_wait_ready().times(1).returning(|| Ok(()));
    observer
        .expect_observe()
        .times(1)
        .returning(|| Err(decode_error("garden-dev/broken")));

    let notifier = Arc::new(RecordingNotifier::new());
    let mut watcher = Watcher::new(&WatchConfig::new(&path), observer, notifier.clone()).unwrap();

    let err = watcher.run(CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, WatchError::Observe(ObserveError::Decode { .. })));
    assert_eq!(watcher.state(), LoopState::Terminated);
    assert_eq!(notifier.count(), 0);
    assert!(!path.exists());
}

#[tokio::test]
async fn test_readiness_failure_skips_cycles() {
    let (_dir, path) = temp_snapshot_path();
    let mut observer = MockObserver::new();
    observer
        .expect_wait_ready()
        .times(1)
        .returning(|| Err(decode_error("garden")));
    observer.expect_observe().never();

    let mut watcher = Watcher::new(&WatchConfig::new(&path), observer, RecordingNotifier::new()).unwrap();

    assert!(watcher.run(CancellationToken::new()).await.is_err());
    assert_eq!(watcher.cycles(), 0);
}

#[tokio::test]
async fn test_failure_after_successful_cycles_keeps_last_snapshot() {
    let (_dir, path) = temp_snapshot_path();
    let observer = Arc::new(
        StaticObserver::new([observation_of([create_cluster("A", "v1")])]).then_fail("A"),
    );
    let config = WatchConfig::new(&path).with_interval(Duration::from_millis(5));
    let mut watcher = Watcher::new(&config, observer.clone(), RecordingNotifier::new()).unwrap();

    let err = watcher.run(CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, WatchError::Observe(_)));
    assert_eq!(observer.observe_calls(), 2);
    assert_eq!(watcher.store().load().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_during_wait_returns_promptly() {
    let (_dir, path) = temp_snapshot_path();
    let observer = Arc::new(StaticObserver::new([observation_of([create_cluster("A", "v1")])]));
    let config = WatchConfig::new(&path).with_interval(Duration::from_secs(3600));
    let mut watcher = Watcher::new(&config, observer.clone(), RecordingNotifier::new()).unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    let started = tokio::time::Instant::now();
    watcher.run(cancel).await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(3600));
    assert_eq!(watcher.state(), LoopState::Terminated);
    assert_eq!(observer.ready_calls(), 1);
    assert_eq!(observer.observe_calls(), 1);
}

#[tokio::test]
async fn test_cancelled_token_runs_no_cycle() {
    let (_dir, path) = temp_snapshot_path();
    let observer = Arc::new(StaticObserver::new([observation_of([create_cluster("A", "v1")])]));
    let mut watcher = Watcher::new(&WatchConfig::new(&path), observer.clone(), RecordingNotifier::new()).unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    watcher.run(cancel).await.unwrap();

    assert_eq!(observer.observe_calls(), 0);
    assert_eq!(watcher.state(), LoopState::Terminated);
}

#[test]
fn test_invalid_config_rejected_before_start() {
    let result = Watcher::new(&WatchConfig::default(), StaticObserver::new(std::iter::empty()), RecordingNotifier::new());
    assert!(matches!(result, Err(WatchError::Config(_))));
}
