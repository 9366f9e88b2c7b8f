use chrono::{DateTime, FixedOffset, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::adapters::{fetch_record, DisplaySurface, FeedSource};
use crate::config::AppConfig;
use crate::coordination::Scheduler;
use crate::domain::{AggregateTotals, EventPhase, EventWindow, Outcome, ScoreCategory, Scoreboard};
use crate::error::{CupError, Result};
use crate::scoreboard::{aggregate, EventStateMachine, PhaseReport};

use super::presenter::Presenter;

/// Wall-clock source
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Last-known board state, replaced wholesale on every poll and tick
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    pub scoreboard: Option<Scoreboard>,
    pub totals: AggregateTotals,
    pub phase: Option<EventPhase>,
    pub outcome: Option<Outcome>,
    pub last_poll: Option<DateTime<Utc>>,
    pub failed_polls: u64,
}

/// Drives the board: feed polling, clock ticks, and the end-of-event stop
#[derive(Clone)]
pub struct ScoreboardService {
    categories: Arc<Vec<ScoreCategory>>,
    feed: Arc<dyn FeedSource>,
    surface: Arc<dyn DisplaySurface>,
    presenter: Arc<Presenter>,
    machine: Arc<Mutex<EventStateMachine>>,
    state: Arc<RwLock<BoardState>>,
    scheduler: Arc<Scheduler>,
    ended_tx: Arc<watch::Sender<bool>>,
    window: EventWindow,
    offset: FixedOffset,
    tick_interval: Duration,
    poll_interval: Duration,
    clock: Clock,
}

impl ScoreboardService {
    /// Build the service. Invalid configuration is rejected here.
    pub fn new(
        config: &AppConfig,
        feed: Arc<dyn FeedSource>,
        surface: Arc<dyn DisplaySurface>,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(|errors| CupError::InvalidConfig(errors.join("; ")))?;
        let window = config.window()?;
        let offset = config.display_offset()?;
        let (ended_tx, _) = watch::channel(false);

        Ok(Self {
            categories: Arc::new(config.categories.clone()),
            feed,
            surface,
            presenter: Arc::new(Presenter::from_config(config)),
            machine: Arc::new(Mutex::new(EventStateMachine::new(window))),
            state: Arc::new(RwLock::new(BoardState::default())),
            scheduler: Arc::new(Scheduler::new()),
            ended_tx: Arc::new(ended_tx),
            window,
            offset,
            tick_interval: Duration::from_millis(config.clock.tick_interval_ms),
            poll_interval: Duration::from_millis(config.feed.poll_interval_ms),
            clock: Arc::new(Utc::now),
        })
    }

    /// Replace the wall clock
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub async fn state(&self) -> BoardState {
        self.state.read().await.clone()
    }

    pub fn window(&self) -> &EventWindow {
        &self.window
    }

    /// Number of periodic jobs still scheduled
    pub fn active_jobs(&self) -> usize {
        self.scheduler.active_count()
    }

    /// Fetch a snapshot and redraw the scores.
    ///
    /// On failure the previous snapshot stays on the board.
    pub async fn poll_once(&self) -> Result<AggregateTotals> {
        if *self.ended_tx.borrow() {
            debug!("Event ended, skipping poll");
            return Ok(self.state.read().await.totals);
        }

        let record = match fetch_record(self.feed.as_ref()).await {
            Ok(record) => record,
            Err(e) => {
                self.state.write().await.failed_polls += 1;
                warn!("Skipping poll of {}: {}", self.feed.describe(), e);
                return Err(e);
            }
        };

        let board = aggregate(&record, &self.categories);
        let totals = board.totals;
        debug!(
            "Snapshot: {} categories, totals {} - {}",
            board.categories.len(),
            totals.left,
            totals.right
        );

        self.presenter.show_scoreboard(self.surface.as_ref(), &board);
        self.surface.flush();

        let mut state = self.state.write().await;
        state.scoreboard = Some(board);
        state.totals = totals;
        state.last_poll = Some((self.clock)());
        Ok(totals)
    }

    /// Advance the clock display and the event phase
    pub async fn tick(&self) -> PhaseReport {
        let now = (self.clock)();
        let totals = self.state.read().await.totals;
        let report = self.machine.lock().await.observe(now, totals);

        {
            let mut state = self.state.write().await;
            state.phase = Some(report.phase);
            state.outcome = report.outcome;
        }

        self.presenter.show_clock(self.surface.as_ref(), &report);
        self.surface.flush();

        if report.just_ended {
            if let Some(outcome) = report.outcome {
                info!("{}", self.presenter.announcement(outcome));
            }
            self.ended_tx.send_replace(true);
        }
        report
    }

    /// Run until the event ends or `shutdown` resolves
    pub async fn run<S>(&self, shutdown: S) -> Result<BoardState>
    where
        S: Future<Output = ()>,
    {
        info!(
            "Scoreboard for {} .. {} reading {}",
            self.window.start,
            self.window.end,
            self.feed.describe()
        );
        self.presenter
            .show_event_window(self.surface.as_ref(), &self.window, self.offset);

        // Prime the totals so an already-ended event resolves from real data
        if let Err(e) = self.poll_once().await {
            if e.is_configuration() {
                return Err(e);
            }
        }
        if self.tick().await.phase.is_terminal() {
            return Ok(self.state().await);
        }

        let tick_guard = {
            let service = self.clone();
            let handle = self.scheduler.start("clock_tick", self.tick_interval, move || {
                let service = service.clone();
                async move {
                    service.tick().await;
                }
            });
            self.scheduler.guard(handle)
        };
        let poll_guard = {
            let service = self.clone();
            let handle = self.scheduler.start("feed_poll", self.poll_interval, move || {
                let service = service.clone();
                async move {
                    if let Err(e) = service.poll_once().await {
                        if !e.is_feed_failure() {
                            error!("Feed poll failed: {}", e);
                        }
                    }
                }
            });
            self.scheduler.guard(handle)
        };

        let mut ended_rx = self.ended_tx.subscribe();
        tokio::select! {
            res = ended_rx.wait_for(|ended| *ended) => {
                if res.is_err() {
                    warn!("End-of-event channel closed");
                }
            }
            _ = shutdown => {
                info!("Shutdown requested");
            }
        }

        drop(tick_guard);
        drop(poll_guard);
        Ok(self.state().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::feed::MockFeedSource;
    use crate::adapters::MemorySurface;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const FEED: &str = "hooDonors,hokieDonors,hooRaised,hokieRaised,names\n\
                        10,5,1000,2500.5,\"Max Saperstone, Becca Goldberg\"\n";

    fn config() -> AppConfig {
        let mut config = AppConfig::shipped("mock");
        config.categories = vec![
            ScoreCategory::new("donors", "hooDonors", "hokieDonors", 3),
            ScoreCategory::new("raised", "hooRaised", "hokieRaised", 5).with_currency(true),
        ];
        config
    }

    fn fixed_clock(at: DateTime<Utc>) -> Clock {
        Arc::new(move || at)
    }

    /// Feed that succeeds `ok_calls` times, then fails
    fn feed(ok_calls: usize) -> (MockFeedSource, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut mock = MockFeedSource::new();
        mock.expect_describe().return_const("mock feed".to_string());
        mock.expect_fetch().returning(move || {
            if counter.fetch_add(1, Ordering::SeqCst) < ok_calls {
                Ok(FEED.to_string())
            } else {
                Err(CupError::FeedUnavailable("connection reset".to_string()))
            }
        });
        (mock, calls)
    }

    fn service(
        ok_calls: usize,
        now: DateTime<Utc>,
    ) -> (ScoreboardService, Arc<MemorySurface>, Arc<AtomicUsize>) {
        let (mock, calls) = feed(ok_calls);
        let surface = Arc::new(MemorySurface::new());
        let service = ScoreboardService::new(&config(), Arc::new(mock), surface.clone())
            .unwrap()
            .with_clock(fixed_clock(now));
        (service, surface, calls)
    }

    #[tokio::test]
    async fn test_poll_updates_board() {
        let config = config();
        let (service, surface, _) = service(usize::MAX, config.window().unwrap().start);

        let totals = service.poll_once().await.unwrap();
        assert_eq!(totals, AggregateTotals::new(3, 5));

        assert_eq!(surface.text("hooRaised").as_deref(), Some("1,000.00"));
        assert_eq!(surface.text("hokieRaised").as_deref(), Some("2,500.50"));
        assert_eq!(surface.text("hooTotal").as_deref(), Some("3"));
        assert_eq!(surface.labels("names").unwrap().len(), 2);

        let state = service.state().await;
        assert_eq!(state.totals, totals);
        assert!(state.last_poll.is_some());
    }

    #[tokio::test]
    async fn test_failed_poll_keeps_previous_snapshot() {
        let config = config();
        let (service, surface, calls) = service(1, config.window().unwrap().start);

        service.poll_once().await.unwrap();
        let err = service.poll_once().await.unwrap_err();
        assert!(err.is_feed_failure());
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let state = service.state().await;
        assert_eq!(state.totals, AggregateTotals::new(3, 5));
        assert_eq!(state.failed_polls, 1);
        assert_eq!(surface.text("hokieTotal").as_deref(), Some("5"));
    }

    #[tokio::test]
    async fn test_tick_before_start_counts_to_start() {
        let config = config();
        let start = config.window().unwrap().start;
        let (service, surface, _) = service(usize::MAX, start - chrono::Duration::days(2));

        let report = service.tick().await;
        assert_eq!(report.phase, EventPhase::NotStarted);
        assert_eq!(surface.text("days").as_deref(), Some("2"));
        assert_eq!(surface.text("countdown-text").as_deref(), Some("The Cup Starts In"));
    }

    #[tokio::test]
    async fn test_run_after_end_resolves_immediately() {
        let config = config();
        let end = config.window().unwrap().end;
        let (service, surface, _) = service(usize::MAX, end + chrono::Duration::hours(1));

        let state = service.run(std::future::pending()).await.unwrap();
        assert_eq!(state.phase, Some(EventPhase::Ended));
        assert_eq!(state.outcome, Some(Outcome::RightWins));
        assert_eq!(service.active_jobs(), 0);
        assert_eq!(
            surface.labels("countdown").unwrap()[0],
            "Hokies win the 2025 Commonwealth Kiddush Cup!"
        );
        assert_eq!(surface.text("end-date").as_deref(), Some("December 7th"));
    }

    #[tokio::test]
    async fn test_run_with_unreachable_feed_ends_in_tie() {
        let config = config();
        let end = config.window().unwrap().end;
        let (service, _, _) = service(0, end);

        let state = service.run(std::future::pending()).await.unwrap();
        assert_eq!(state.outcome, Some(Outcome::Tie));
        assert_eq!(state.failed_polls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_jobs_when_event_ends() {
        let config = config();
        let end = config.window().unwrap().end;
        let (mock, calls) = feed(usize::MAX);
        let surface = Arc::new(MemorySurface::new());

        // Virtual clock: three seconds before the end, advancing with tokio time
        let base = tokio::time::Instant::now();
        let clock: Clock = Arc::new(move || {
            end - chrono::Duration::seconds(3)
                + chrono::Duration::from_std(base.elapsed())
                    .unwrap_or_else(|_| chrono::Duration::zero())
        });
        let service = ScoreboardService::new(&config, Arc::new(mock), surface.clone())
            .unwrap()
            .with_clock(clock);

        let state = service.run(std::future::pending()).await.unwrap();
        assert_eq!(state.outcome, Some(Outcome::RightWins));
        assert_eq!(service.active_jobs(), 0);

        let polls = calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), polls);

        // Stopping again is harmless
        assert_eq!(service.scheduler.stop_all(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_honours_shutdown() {
        let config = config();
        let start = config.window().unwrap().start;
        let (service, _, _) = service(usize::MAX, start);

        let state = service
            .run(tokio::time::sleep(Duration::from_secs(2)))
            .await
            .unwrap();
        assert_eq!(state.phase, Some(EventPhase::InProgress));
        assert_eq!(state.outcome, None);
        assert_eq!(service.active_jobs(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_run_stops_jobs() {
        let config = config();
        let start = config.window().unwrap().start;
        let (service, _, calls) = service(usize::MAX, start);

        let cancelled = tokio::time::timeout(
            Duration::from_secs(6),
            service.run(std::future::pending()),
        )
        .await;
        assert!(cancelled.is_err());
        assert_eq!(service.active_jobs(), 0);

        let polls = calls.load(Ordering::SeqCst);
        assert_eq!(polls, 2);
        drop(service);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), polls);
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let mut config = config();
        config.categories.clear();
        let (mock, _) = feed(0);

        let surface = Arc::new(MemorySurface::new());
        let result = ScoreboardService::new(&config, Arc::new(mock), surface);
        assert!(matches!(result, Err(CupError::InvalidConfig(_))));
    }
}
