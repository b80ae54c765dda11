//! Status Poller Integration Tests
//!
//! Exercises the poller at its production timer values on a paused
//! clock, including the full wiring against the simulator and store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use docmind::pipeline::{PipelineSimulator, StageDelays};
use docmind::poll::{PollConfig, PollHooks, PollState, StatusPoller};
use docmind::store::{DocumentStore, JsonStore};
use docmind::ProcessingStatus;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::time::sleep;

fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let clone = count.clone();
    (count, move || {
        clone.fetch_add(1, Ordering::SeqCst);
    })
}

#[tokio::test(start_paused = true)]
async fn test_default_timer_values_time_out_after_two_minutes() {
    let (refreshes, refresh) = counter();
    let (timeouts, on_timeout) = counter();

    let mut poller = StatusPoller::new(
        PollConfig::default(),
        refresh,
        PollHooks::new().on_timeout(on_timeout),
    );

    poller.observe(Some(ProcessingStatus::Processing));
    sleep(Duration::from_millis(200_000)).await;

    // Ticks at 5s..115s fire; the tick sharing the 120s deadline loses
    // to the timeout.
    assert_eq!(refreshes.load(Ordering::SeqCst), 23);
    assert_eq!(timeouts.load(Ordering::SeqCst), 1);
    assert_eq!(poller.state(), PollState::Terminal);
}

#[tokio::test(start_paused = true)]
async fn test_completion_preempts_timeout() {
    let (completes, on_complete) = counter();
    let (timeouts, on_timeout) = counter();
    let (_refreshes, refresh) = counter();

    let mut poller = StatusPoller::new(
        PollConfig::default(),
        refresh,
        PollHooks::new().on_complete(on_complete).on_timeout(on_timeout),
    );

    poller.observe(Some(ProcessingStatus::Processing));
    sleep(Duration::from_secs(10)).await;
    poller.observe(Some(ProcessingStatus::Completed));

    // Well past the would-be timeout.
    sleep(Duration::from_secs(300)).await;

    assert_eq!(completes.load(Ordering::SeqCst), 1);
    assert_eq!(timeouts.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_poller_drives_refreshes_until_simulator_completes() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(JsonStore::open(temp.path()).await.unwrap());
    let simulator = PipelineSimulator::with_delays(
        store.clone() as Arc<dyn DocumentStore>,
        StageDelays {
            upload: Duration::from_secs(6),
            processing: Duration::from_secs(6),
        },
    );

    let owner = "user@example.com";
    let doc = simulator
        .register_upload(owner, "notes.pdf", "uploads/notes.pdf")
        .await
        .unwrap();

    // Refreshes fetch the latest status and report it back through a
    // channel; the observation loop feeds each value to the poller.
    let (status_tx, mut status_rx) = mpsc::channel::<Option<ProcessingStatus>>(8);
    let refresh = {
        let store = store.clone();
        let owner = owner.to_string();
        move || {
            let store = store.clone();
            let owner = owner.clone();
            let status_tx = status_tx.clone();
            tokio::spawn(async move {
                let status = store
                    .get_document(&owner, doc.id)
                    .await
                    .ok()
                    .map(|d| d.processing_status);
                let _ = status_tx.send(status).await;
            });
        }
    };

    let (completes, on_complete) = counter();
    let (fails, on_fail) = counter();
    let (timeouts, on_timeout) = counter();

    let mut poller = StatusPoller::new(
        PollConfig::default(),
        refresh,
        PollHooks::new()
            .on_complete(on_complete)
            .on_fail(on_fail)
            .on_timeout(on_timeout),
    );

    let mut observed = vec![doc.processing_status];
    poller.observe(Some(doc.processing_status));

    while poller.state() == PollState::Polling {
        let Some(status) = status_rx.recv().await else {
            break;
        };
        if let Some(status) = status {
            observed.push(status);
        }
        poller.observe(status);
    }

    assert_eq!(completes.load(Ordering::SeqCst), 1);
    assert_eq!(fails.load(Ordering::SeqCst), 0);
    assert_eq!(timeouts.load(Ordering::SeqCst), 0);

    // Observed statuses never regress along the lifecycle order.
    let rank = |s: &ProcessingStatus| match s {
        ProcessingStatus::Uploading => 0,
        ProcessingStatus::Processing => 1,
        ProcessingStatus::Completed | ProcessingStatus::Failed => 2,
    };
    assert!(observed.windows(2).all(|w| rank(&w[0]) <= rank(&w[1])));
    assert_eq!(*observed.last().unwrap(), ProcessingStatus::Completed);
}

#[tokio::test(start_paused = true)]
async fn test_teardown_mid_poll_leaves_no_timers() {
    let (refreshes, refresh) = counter();
    let (timeouts, on_timeout) = counter();

    let mut poller = StatusPoller::new(
        PollConfig::default(),
        refresh,
        PollHooks::new().on_timeout(on_timeout),
    );

    poller.observe(Some(ProcessingStatus::Uploading));
    sleep(Duration::from_secs(12)).await;
    let seen = refreshes.load(Ordering::SeqCst);
    assert!(seen >= 2);

    poller.cancel();

    sleep(Duration::from_secs(300)).await;
    assert_eq!(refreshes.load(Ordering::SeqCst), seen);
    assert_eq!(timeouts.load(Ordering::SeqCst), 0);
    assert_eq!(poller.state(), PollState::Idle);
}
