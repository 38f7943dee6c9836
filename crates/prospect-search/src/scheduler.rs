//! The serialized request lane.
//!
//! All outbound calls to the search surface funnel through one worker task
//! draining a bounded queue. That single lane is what makes the spacing,
//! jitter, and per-minute accounting correct no matter how many callers
//! submit concurrently: two network calls are never in flight closer
//! together than the enforced pacing allows.

use crate::error::SearchError;
use crate::pacing::{jitter, Cooldown, RateWindow};
use prospect_core::SearchConfig;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};

/// How many submissions may queue up before senders are backpressured.
const LANE_DEPTH: usize = 64;

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Handle to the single-lane request scheduler.
///
/// Jobs run strictly in submission order; each job starts only after its
/// predecessor finished, whether that predecessor succeeded or failed.
/// Dropping the handle shuts the lane down once queued work has drained.
pub(crate) struct RequestScheduler {
    tx: mpsc::Sender<Job>,
}

impl RequestScheduler {
    /// Spawn the worker task. Must be called from within a Tokio runtime.
    pub(crate) fn spawn(config: &SearchConfig, cooldown: Arc<Cooldown>) -> Self {
        let (tx, rx) = mpsc::channel(LANE_DEPTH);
        let pacing = Pacing {
            min_delay: config.min_delay,
            jitter_max: config.jitter_max,
            window: RateWindow::new(config.per_minute_cap),
            cooldown,
            last_request: None,
        };
        tokio::spawn(drain_lane(rx, pacing));
        Self { tx }
    }

    /// Submit a unit of work and await its result.
    ///
    /// The task executes exactly once, on the lane, after every previously
    /// submitted task has resolved and the pacing waits have been honoured.
    pub(crate) async fn run<T, F>(&self, task: F) -> Result<T, SearchError>
    where
        T: Send + 'static,
        F: Future<Output = T> + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: Job = Box::pin(async move {
            let _ = reply_tx.send(task.await);
        });
        self.tx
            .send(job)
            .await
            .map_err(|_| SearchError::LaneClosed)?;
        reply_rx.await.map_err(|_| SearchError::LaneClosed)
    }
}

/// Mutable pacing state owned by the worker. No locking is needed beyond
/// the lane itself: every mutation happens from the one worker task.
struct Pacing {
    min_delay: Duration,
    jitter_max: Duration,
    window: RateWindow,
    cooldown: Arc<Cooldown>,
    last_request: Option<Instant>,
}

async fn drain_lane(mut rx: mpsc::Receiver<Job>, mut pacing: Pacing) {
    while let Some(job) = rx.recv().await {
        // 1. Honour an active cooldown before anything else.
        let cooldown_wait = pacing.cooldown.remaining();
        if cooldown_wait > Duration::ZERO {
            let wait = cooldown_wait + jitter(pacing.jitter_max);
            tracing::debug!(wait_ms = wait.as_millis() as u64, "waiting out cooldown");
            tokio::time::sleep(wait).await;
        }

        // 2. Honour the rolling per-minute window.
        let window_wait = pacing.window.admit(Instant::now());
        if window_wait > Duration::ZERO {
            let wait = window_wait + jitter(pacing.jitter_max);
            tracing::debug!(
                wait_ms = wait.as_millis() as u64,
                "per-minute cap reached, waiting for window slot"
            );
            tokio::time::sleep(wait).await;
        }

        // 3. Honour the minimum inter-request spacing.
        if let Some(last) = pacing.last_request {
            let spacing = pacing.min_delay.saturating_sub(last.elapsed());
            tokio::time::sleep(spacing + jitter(pacing.jitter_max)).await;
        }

        // 4. Account for the request, then 5. let it fire.
        let now = Instant::now();
        pacing.last_request = Some(now);
        pacing.window.record(now);
        job.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn quick_config() -> SearchConfig {
        SearchConfig {
            min_delay: Duration::from_millis(1),
            jitter_max: Duration::ZERO,
            per_minute_cap: 100,
            ..SearchConfig::default()
        }
    }

    #[tokio::test]
    async fn test_run_returns_task_output() {
        let scheduler = RequestScheduler::spawn(&quick_config(), Arc::new(Cooldown::default()));
        let out = scheduler.run(async { 7u32 }).await.expect("lane alive");
        assert_eq!(out, 7);
    }

    #[tokio::test]
    async fn test_jobs_run_in_submission_order() {
        let scheduler = Arc::new(RequestScheduler::spawn(
            &quick_config(),
            Arc::new(Cooldown::default()),
        ));
        let order = Arc::new(Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for i in 0..5u32 {
            let scheduler = scheduler.clone();
            let order = order.clone();
            handles.push(tokio::spawn(async move {
                scheduler
                    .run(async move {
                        order.lock().expect("order lock").push(i);
                    })
                    .await
                    .expect("lane alive");
            }));
            // Submit in a fixed order.
            tokio::task::yield_now().await;
        }
        for handle in handles {
            handle.await.expect("join");
        }

        let seen = order.lock().expect("order lock").clone();
        let mut sorted = seen.clone();
        sorted.sort_unstable();
        assert_eq!(seen, sorted, "lane must preserve submission order");
    }

    #[tokio::test]
    async fn test_failed_predecessor_does_not_stall_lane() {
        let scheduler = RequestScheduler::spawn(&quick_config(), Arc::new(Cooldown::default()));

        let failed = scheduler
            .run(async { Err::<(), &str>("boom") })
            .await
            .expect("lane alive");
        assert!(failed.is_err());

        // The next job still runs after the failed one.
        let out = scheduler.run(async { 1u8 }).await.expect("lane alive");
        assert_eq!(out, 1);
    }

    #[tokio::test]
    async fn test_active_cooldown_delays_execution() {
        let cooldown = Arc::new(Cooldown::default());
        cooldown.extend(Duration::from_millis(80));
        let scheduler = RequestScheduler::spawn(&quick_config(), cooldown);

        let started = Instant::now();
        scheduler.run(async {}).await.expect("lane alive");
        assert!(
            started.elapsed() >= Duration::from_millis(70),
            "request fired before the cooldown elapsed"
        );
    }
}
