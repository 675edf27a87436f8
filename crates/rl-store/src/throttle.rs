//! Trailing-edge throttle for async operations
//!
//! The first call in an idle period opens a window of `interval`. Every call
//! made while the window is open waits for it to close, and only the most
//! recent of them runs; the others return `None`. A burst of calls therefore
//! runs the operation at most once per window. Runs never overlap: a winner
//! that is due while a previous run is still in flight waits for it to finish.

use parking_lot::Mutex;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Default)]
struct ThrottleState {
    /// When the open window closes
    deadline: Option<Instant>,
    latest_ticket: u64,
}

#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    state: Mutex<ThrottleState>,
    in_flight: tokio::sync::Mutex<()>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: Mutex::new(ThrottleState::default()),
            in_flight: tokio::sync::Mutex::new(()),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run `operation` when the window closes, unless a later call supersedes
    /// this one
    pub async fn run<F, Fut, T>(&self, operation: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let (ticket, deadline) = {
            let mut state = self.state.lock();
            state.latest_ticket += 1;
            let now = Instant::now();
            let deadline = match state.deadline {
                Some(deadline) if deadline > now => deadline,
                _ => {
                    let deadline = now + self.interval;
                    state.deadline = Some(deadline);
                    deadline
                }
            };
            (state.latest_ticket, deadline)
        };

        tokio::time::sleep_until(deadline).await;
        if self.is_superseded(ticket) {
            debug!(ticket, "Throttled call superseded");
            return None;
        }

        let _in_flight = self.in_flight.lock().await;
        if self.is_superseded(ticket) {
            debug!(ticket, "Throttled call superseded while waiting for previous run");
            return None;
        }

        Some(operation().await)
    }

    fn is_superseded(&self, ticket: u64) -> bool {
        self.state.lock().latest_ticket != ticket
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    const WINDOW: Duration = Duration::from_millis(500);

    #[tokio::test(start_paused = true)]
    async fn test_single_call_runs_when_window_closes() {
        let throttle = Throttle::new(WINDOW);
        let start = Instant::now();

        let result = throttle.run(|| async { 7 }).await;

        assert_eq!(result, Some(7));
        assert_eq!(Instant::now(), start + WINDOW);
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_within_window_run_once_with_latest() {
        let throttle = Throttle::new(WINDOW);
        let runs = AtomicU32::new(0);
        let start = Instant::now();

        let run = |label: &'static str| {
            let runs = &runs;
            let throttle = &throttle;
            async move {
                throttle
                    .run(|| async move {
                        runs.fetch_add(1, Ordering::SeqCst);
                        (label, Instant::now())
                    })
                    .await
            }
        };

        let (first, second, third) = tokio::join!(run("first"), run("second"), run("third"));

        assert_eq!(first, None);
        assert_eq!(second, None);
        let (label, at) = third.unwrap();
        assert_eq!(label, "third");
        assert_eq!(at, start + WINDOW);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_call_joins_open_window() {
        let throttle = Throttle::new(WINDOW);
        let runs = AtomicU32::new(0);
        let start = Instant::now();

        let early = async {
            throttle
                .run(|| async {
                    runs.fetch_add(1, Ordering::SeqCst);
                })
                .await
        };
        let late = async {
            tokio::time::sleep(Duration::from_millis(400)).await;
            throttle
                .run(|| async {
                    runs.fetch_add(1, Ordering::SeqCst);
                    Instant::now()
                })
                .await
        };

        let (early, late) = tokio::join!(early, late);

        assert!(early.is_none());
        assert_eq!(late, Some(start + WINDOW));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_after_window_opens_new_window() {
        let throttle = Throttle::new(WINDOW);

        throttle.run(|| async {}).await;
        tokio::time::sleep(Duration::from_millis(1)).await;

        let before = Instant::now();
        assert!(throttle.run(|| async {}).await.is_some());
        assert_eq!(Instant::now(), before + WINDOW);
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_never_overlap() {
        let throttle = Arc::new(Throttle::new(WINDOW));
        let active = Arc::new(AtomicU32::new(0));
        let max_active = Arc::new(AtomicU32::new(0));

        let spawn_run = |delay: Duration| {
            let throttle = throttle.clone();
            let active = active.clone();
            let max_active = max_active.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                throttle
                    .run(|| async {
                        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                        max_active.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_secs(2)).await;
                        active.fetch_sub(1, Ordering::SeqCst);
                    })
                    .await
            })
        };

        // The second window closes at 1.1s while the first run lasts until 2.5s
        let a = spawn_run(Duration::ZERO);
        let b = spawn_run(Duration::from_millis(600));

        assert!(a.await.unwrap().is_some());
        assert!(b.await.unwrap().is_some());
        assert_eq!(max_active.load(Ordering::SeqCst), 1);
    }
}
