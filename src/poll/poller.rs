//! Bounded, cancellable status poller.
//!
//! Converts a discrete status value plus a refresh side-effect into a
//! time-bounded, self-terminating observation loop. The poller never
//! fetches anything itself: it invokes the supplied refresh callback at a
//! fixed cadence and reacts to the status it is handed on each
//! re-evaluation. One spawned task carries both timers (repeating tick +
//! one-shot timeout) so cancelling the task cancels everything.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant};
use tracing::debug;

use crate::config::{DEFAULT_MAX_POLL_DURATION_MS, DEFAULT_POLL_INTERVAL_MS};
use crate::domain::ProcessingStatus;

/// Timer settings for one poller instance
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Inert when false: observations cancel timers and do nothing else
    pub enabled: bool,

    /// Refresh cadence
    pub interval: Duration,

    /// Maximum total polling duration per status observation
    pub max_duration: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_duration: Duration::from_millis(DEFAULT_MAX_POLL_DURATION_MS),
        }
    }
}

type Hook = Arc<dyn Fn() + Send + Sync>;

/// Terminal callbacks, each invoked at most once per poller instance
#[derive(Clone, Default)]
pub struct PollHooks {
    on_complete: Option<Hook>,
    on_fail: Option<Hook>,
    on_timeout: Option<Hook>,
}

impl PollHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_complete(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Arc::new(hook));
        self
    }

    pub fn on_fail(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_fail = Some(Arc::new(hook));
        self
    }

    pub fn on_timeout(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_timeout = Some(Arc::new(hook));
        self
    }
}

/// Poller-local state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// No timers armed
    Idle,

    /// Repeating tick + timeout armed for a non-terminal status
    Polling,

    /// A terminal hook fired; absorbing for this instance
    Terminal,
}

/// A single observation loop over one document's lifecycle.
///
/// Callers feed every fresh status value to [`StatusPoller::observe`];
/// the poller arms, re-arms, or tears down its timers accordingly. Once
/// terminal (completed, failed, or timed out) the instance ignores all
/// further observations; observing a new lifecycle needs a new instance.
pub struct StatusPoller {
    config: PollConfig,
    refresh: Hook,
    hooks: PollHooks,

    /// Set exactly once, by whichever side (observation or timeout task)
    /// reaches a terminal condition first.
    terminal: Arc<AtomicBool>,

    /// Status the current timers were armed for
    observed: Option<ProcessingStatus>,

    task: Option<JoinHandle<()>>,
}

impl StatusPoller {
    pub fn new(
        config: PollConfig,
        refresh: impl Fn() + Send + Sync + 'static,
        hooks: PollHooks,
    ) -> Self {
        Self {
            config,
            refresh: Arc::new(refresh),
            hooks,
            terminal: Arc::new(AtomicBool::new(false)),
            observed: None,
            task: None,
        }
    }

    /// Re-evaluate against a (possibly unknown) status value.
    pub fn observe(&mut self, status: Option<ProcessingStatus>) {
        if self.terminal.load(Ordering::SeqCst) {
            return;
        }

        if !self.config.enabled {
            self.stop_timers();
            return;
        }

        let Some(status) = status else {
            self.stop_timers();
            return;
        };

        match status {
            ProcessingStatus::Completed => self.finish(self.hooks.on_complete.clone()),
            ProcessingStatus::Failed => self.finish(self.hooks.on_fail.clone()),
            non_terminal => {
                // Re-observing the status the timers are already armed
                // for must not create duplicates.
                if self.task.is_some() && self.observed == Some(non_terminal) {
                    return;
                }

                self.stop_timers();
                self.observed = Some(non_terminal);
                self.start_timers();
            }
        }
    }

    /// Tear down all timers without firing any hook. Idempotent; safe at
    /// any time. Dropping the poller does the same.
    pub fn cancel(&mut self) {
        self.stop_timers();
    }

    pub fn state(&self) -> PollState {
        if self.terminal.load(Ordering::SeqCst) {
            PollState::Terminal
        } else if self.task.is_some() {
            PollState::Polling
        } else {
            PollState::Idle
        }
    }

    fn finish(&mut self, hook: Option<Hook>) {
        self.stop_timers();
        if !self.terminal.swap(true, Ordering::SeqCst) {
            if let Some(hook) = hook {
                hook();
            }
        }
    }

    fn start_timers(&mut self) {
        let refresh = Arc::clone(&self.refresh);
        let on_timeout = self.hooks.on_timeout.clone();
        let terminal = Arc::clone(&self.terminal);
        let interval = self.config.interval;
        let max_duration = self.config.max_duration;

        debug!(?interval, ?max_duration, "Polling started");

        self.task = Some(tokio::spawn(async move {
            let timeout = sleep(max_duration);
            tokio::pin!(timeout);

            let mut ticker = interval_at(Instant::now() + interval, interval);

            loop {
                // Timeout wins a tick/timeout tie so no refresh fires at
                // or after the deadline.
                tokio::select! {
                    biased;

                    _ = &mut timeout => {
                        if !terminal.swap(true, Ordering::SeqCst) {
                            debug!("Polling timed out");
                            if let Some(hook) = on_timeout {
                                hook();
                            }
                        }
                        break;
                    }

                    _ = ticker.tick() => refresh(),
                }
            }
        }));
    }

    fn stop_timers(&mut self) {
        self.observed = None;
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.stop_timers();
    }
}
