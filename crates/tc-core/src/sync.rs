//! Background cache sweeper.
//!
//! Runs [`ConfigCache::sweep`] on a named thread at a fixed interval. The
//! loop sleeps on a channel so [`AutoSync::stop`] wakes it immediately.

use crate::cache::ConfigCache;
use crate::log_event;
use crate::logging::{event_names, LogContext, Stage};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Handle to the running sweeper thread.
pub struct AutoSync {
    stop_tx: Option<Sender<()>>,
    thread: Option<thread::JoinHandle<()>>,
    ticks: Arc<AtomicU64>,
    interval: Duration,
    log: LogContext,
}

impl std::fmt::Debug for AutoSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoSync")
            .field("interval", &self.interval)
            .field("ticks", &self.ticks())
            .field("running", &self.is_running())
            .finish()
    }
}

impl AutoSync {
    /// Start sweeping `cache` every `interval`.
    pub fn start(
        cache: Arc<ConfigCache>,
        interval: Duration,
        log: LogContext,
    ) -> std::io::Result<Self> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let ticks = Arc::new(AtomicU64::new(0));
        let thread_ticks = ticks.clone();
        let thread_log = log.clone();

        let thread = thread::Builder::new()
            .name("tc-sync".to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        run_tick(&cache, &thread_log);
                        thread_ticks.fetch_add(1, Ordering::Relaxed);
                    }
                    // Explicit stop, or the handle was dropped.
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        log_event!(
            log,
            INFO,
            event_names::SYNC_STARTED,
            Stage::Sync,
            "auto-sync started",
            interval_secs = interval.as_secs()
        );

        Ok(Self {
            stop_tx: Some(stop_tx),
            thread: Some(thread),
            ticks,
            interval,
            log,
        })
    }

    /// Number of completed sweep ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Signal the thread and wait for it to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
            log_event!(
                self.log,
                INFO,
                event_names::SYNC_STOPPED,
                Stage::Sync,
                "auto-sync stopped",
                ticks = self.ticks()
            );
        }
    }
}

impl Drop for AutoSync {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// One sweep. A panic is logged and swallowed so later ticks still run.
fn run_tick(cache: &ConfigCache, log: &LogContext) {
    match catch_unwind(AssertUnwindSafe(|| cache.sweep())) {
        Ok(outcome) => {
            log_event!(
                log,
                DEBUG,
                event_names::SYNC_TICK,
                Stage::Sync,
                "sweep finished",
                refreshed = outcome.refreshed,
                evicted = outcome.evicted,
                untouched = outcome.untouched
            );
        }
        Err(panic) => {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            log_event!(
                log,
                ERROR,
                event_names::SYNC_FAILED,
                Stage::Sync,
                "sweep tick panicked",
                reason = %reason
            );
        }
    }
}
