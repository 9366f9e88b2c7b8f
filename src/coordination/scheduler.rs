//! Periodic job scheduler
//!
//! Owns the clock tick and feed poll jobs. Each job runs on its own tokio
//! task and awaits its previous firing before the next one; missed ticks are
//! skipped rather than bunched up.

use dashmap::DashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Opaque handle to a scheduled job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

struct ScheduledTask {
    name: String,
    cancel: watch::Sender<bool>,
}

/// Runs named jobs at fixed periods until stopped
pub struct Scheduler {
    tasks: DashMap<u64, ScheduledTask>,
    next_id: AtomicU64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            tasks: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Start `job` every `period`. The first firing happens one period from
    /// now.
    pub fn start<F, Fut>(&self, name: &str, period: Duration, mut job: F) -> TaskHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let task_name = name.to_string();

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = cancel_rx.changed() => break,
                    _ = ticker.tick() => job().await,
                }
            }
            debug!("Task {} exited", task_name);
        });

        info!("Started task {} (every {}ms)", name, period.as_millis());
        self.tasks.insert(
            id,
            ScheduledTask {
                name: name.to_string(),
                cancel: cancel_tx,
            },
        );
        TaskHandle(id)
    }

    /// Stop a job. Returns false if it was already stopped.
    ///
    /// A firing already in progress is allowed to finish; no further
    /// firings happen.
    pub fn stop(&self, handle: TaskHandle) -> bool {
        match self.tasks.remove(&handle.0) {
            Some((_, task)) => {
                let _ = task.cancel.send(true);
                info!("Stopped task {}", task.name);
                true
            }
            None => {
                debug!("Task {:?} already stopped", handle);
                false
            }
        }
    }

    /// Stop every job; returns how many were running
    pub fn stop_all(&self) -> usize {
        let ids: Vec<u64> = self.tasks.iter().map(|entry| *entry.key()).collect();
        ids.into_iter()
            .filter(|id| self.stop(TaskHandle(*id)))
            .count()
    }

    /// Tie a job's lifetime to the returned guard
    pub fn guard(&self, handle: TaskHandle) -> JobGuard<'_> {
        JobGuard {
            scheduler: self,
            handle,
        }
    }

    pub fn active_count(&self) -> usize {
        self.tasks.len()
    }
}

/// Stops its job when dropped
#[must_use = "dropping the guard stops the job"]
pub struct JobGuard<'a> {
    scheduler: &'a Scheduler,
    handle: TaskHandle,
}

impl JobGuard<'_> {
    pub fn handle(&self) -> TaskHandle {
        self.handle
    }
}

impl Drop for JobGuard<'_> {
    fn drop(&mut self) {
        self.scheduler.stop(self.handle);
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn counting_job(
        counter: &Arc<AtomicUsize>,
    ) -> impl FnMut() -> std::future::Ready<()> + Send + 'static {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_fires_each_period() {
        let scheduler = Scheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));

        scheduler.start("tick", Duration::from_secs(1), counting_job(&counter));
        assert_eq!(scheduler.active_count(), 1);

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        let scheduler = Scheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let handle = scheduler.start("poll", Duration::from_secs(5), counting_job(&counter));
        tokio::time::sleep(Duration::from_millis(5500)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        assert!(scheduler.stop(handle));
        assert!(!scheduler.stop(handle));
        assert_eq!(scheduler.active_count(), 0);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_all() {
        let scheduler = Scheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let tick = scheduler.start("tick", Duration::from_secs(1), counting_job(&counter));
        let poll = scheduler.start("poll", Duration::from_secs(5), counting_job(&counter));
        assert_eq!(scheduler.active_count(), 2);

        assert_eq!(scheduler.stop_all(), 2);
        assert_eq!(scheduler.stop_all(), 0);
        assert!(!scheduler.stop(tick));
        assert!(!scheduler.stop(poll));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_guard_stops_job_on_drop() {
        let scheduler = Scheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));

        {
            let guard = scheduler.guard(scheduler.start(
                "tick",
                Duration::from_secs(1),
                counting_job(&counter),
            ));
            tokio::time::sleep(Duration::from_millis(2500)).await;
            assert_eq!(counter.load(Ordering::SeqCst), 2);
            assert!(scheduler.stop(guard.handle()));
        }
        assert_eq!(scheduler.active_count(), 0);

        let guard = scheduler.guard(scheduler.start(
            "poll",
            Duration::from_secs(1),
            counting_job(&counter),
        ));
        drop(guard);
        assert_eq!(scheduler.active_count(), 0);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_job_does_not_overlap() {
        let scheduler = Scheduler::new();
        let running = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let (r, m) = (Arc::clone(&running), Arc::clone(&max_seen));
        scheduler.start("slow", Duration::from_secs(1), move || {
            let (r, m) = (Arc::clone(&r), Arc::clone(&m));
            async move {
                let now = r.fetch_add(1, Ordering::SeqCst) + 1;
                m.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(3)).await;
                r.fetch_sub(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_secs(12)).await;
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }
}
