//! Timer operations and the background ticker
//!
//! The ticker task only touches the `TimerEngine`; committing elapsed time to
//! the ledger happens in `finish_timer` under the writer lock. `finish_timer`
//! holds the timer lock for the whole commit, so no tick can land between
//! reading the elapsed counter and resetting it.
//!
//! Lock order is timer, then ticker. The ticker is stopped while the timer
//! lock is still held, so a concurrent start or resume always spawns after
//! the stop and never finds a handle that is about to be aborted.

use crate::error::Result;
use crate::session::{lock, Session, TARGET};
use std::sync::{Arc, Mutex};
use timevillage_core::{CategoryId, Rejection, Subject, TimerEngine, TimerView};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

impl Session {
    /// Start a fresh session for `category`
    ///
    /// Returns `Ok(false)` without changing anything when the timer is
    /// already running.
    pub fn start_timer(&self, category: CategoryId) -> Result<bool> {
        if self.store.load_category(category)?.is_none() {
            return Err(Rejection::CategoryNotFound(category).into());
        }
        let view = {
            let mut timer = lock(&self.timer);
            if !timer.start(category) {
                return Ok(false);
            }
            timer.view()
        };
        tracing::debug!(target: TARGET, %category, "Timer started");
        self.timer_view.publish(view);
        self.spawn_ticker();
        Ok(true)
    }

    /// Continue a paused session without resetting its counter
    pub fn resume_timer(&self) -> bool {
        let view = {
            let mut timer = lock(&self.timer);
            if !timer.resume() {
                return false;
            }
            timer.view()
        };
        self.timer_view.publish(view);
        self.spawn_ticker();
        true
    }

    /// Stop counting; the session can still be finished later
    pub fn pause_timer(&self) -> bool {
        let view = {
            let mut timer = lock(&self.timer);
            if !timer.pause() {
                return false;
            }
            self.stop_ticker();
            timer.view()
        };
        self.timer_view.publish(view);
        true
    }

    /// Count one second by hand
    ///
    /// Used when no runtime drives the ticker; ignored while idle.
    pub fn tick_timer(&self) -> bool {
        tick(&self.timer, &self.timer_view)
    }

    /// End the session, crediting its elapsed seconds to the ledger
    ///
    /// Returns the credited amount; `None` when nothing had been counted, in
    /// which case the ledger is not touched. If the ledger write fails the
    /// timer keeps its session so it can be finished again.
    pub fn finish_timer(&self) -> Result<Option<u64>> {
        let mut timer = lock(&self.timer);
        let elapsed = timer.session_elapsed();
        let category = timer.active_category();

        if elapsed > 0 {
            let ledger = self.credit(elapsed)?;
            tracing::info!(
                target: TARGET,
                category = ?category.map(|c| c.raw()),
                elapsed,
                balance = ledger.accumulated_time,
                lifetime = ledger.global_time,
                "Timer session committed"
            );
        }
        let credited = timer.finish();
        let view = timer.view();
        self.stop_ticker();
        drop(timer);

        self.timer_view.publish(view);
        Ok(credited)
    }

    /// Current timer snapshot
    pub fn timer(&self) -> TimerView {
        lock(&self.timer).view()
    }

    fn spawn_ticker(&self) {
        let Some(runtime) = &self.runtime else {
            return;
        };
        let mut ticker = lock(&self.ticker);
        if ticker.as_ref().is_some_and(|t| !t.is_finished()) {
            return;
        }

        let timer = self.timer.clone();
        let view = self.timer_view.clone();
        let period = self.config.tick_interval();
        *ticker = Some(runtime.spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // idle ticks are skipped; the task lives until stopped
            loop {
                interval.tick().await;
                tick(&timer, &view);
            }
        }));
    }

    /// Abort the ticker; callers hold the timer lock
    fn stop_ticker(&self) {
        if let Some(ticker) = lock(&self.ticker).take() {
            ticker.abort();
        }
    }
}

/// Advance the engine by one second and publish; false once idle
fn tick(timer: &Arc<Mutex<TimerEngine>>, view: &Subject<TimerView>) -> bool {
    let snapshot = {
        let mut timer = lock(timer);
        if !timer.tick() {
            return false;
        }
        timer.view()
    };
    view.publish(snapshot);
    true
}

#[cfg(test)]
mod tests {
    use crate::session::lock;
    use crate::session::tests::open_session;
    use std::sync::Arc;
    use std::time::Duration;
    use timevillage_core::PolicyKind;

    #[test]
    fn test_study_session_scenario() {
        let session = open_session(PolicyKind::HubCapped);
        let study = session.add_category("Study", None).unwrap();

        assert!(session.start_timer(study.id).unwrap());
        for _ in 0..120 {
            assert!(session.tick_timer());
        }
        assert_eq!(session.finish_timer().unwrap(), Some(120));

        let ledger = session.ledger().unwrap();
        assert_eq!(ledger.accumulated_time, 120);
        assert_eq!(ledger.global_time, 120);
        let timer = session.timer();
        assert_eq!(timer.session_elapsed, 0);
        assert!(timer.active_category.is_none());
        assert!(!timer.running);
    }

    #[test]
    fn test_finish_twice_credits_once() {
        let session = open_session(PolicyKind::HubCapped);
        let work = session.add_category("Work", None).unwrap();
        session.start_timer(work.id).unwrap();
        session.tick_timer();
        session.tick_timer();

        assert_eq!(session.finish_timer().unwrap(), Some(2));
        assert_eq!(session.finish_timer().unwrap(), None);
        assert_eq!(session.ledger().unwrap().accumulated_time, 2);
    }

    #[test]
    fn test_finish_without_elapsed_leaves_ledger() {
        let session = open_session(PolicyKind::HubCapped);
        let work = session.add_category("Work", None).unwrap();
        session.start_timer(work.id).unwrap();
        let mut views = session.subscribe_village();
        views.latest();

        assert_eq!(session.finish_timer().unwrap(), None);
        assert!(views.try_recv().is_none());
        assert_eq!(session.ledger().unwrap().global_time, 0);
    }

    #[test]
    fn test_start_while_running_is_noop() {
        let session = open_session(PolicyKind::HubCapped);
        let study = session.add_category("Study", None).unwrap();
        let work = session.add_category("Work", None).unwrap();

        assert!(session.start_timer(study.id).unwrap());
        session.tick_timer();
        assert!(!session.start_timer(work.id).unwrap());
        assert_eq!(session.timer().active_category, Some(study.id));
        assert_eq!(session.timer().session_elapsed, 1);
    }

    #[test]
    fn test_pause_keeps_elapsed() {
        let session = open_session(PolicyKind::HubCapped);
        let study = session.add_category("Study", None).unwrap();
        session.start_timer(study.id).unwrap();
        session.tick_timer();
        session.tick_timer();

        assert!(session.pause_timer());
        assert!(!session.tick_timer());
        assert_eq!(session.timer().session_elapsed, 2);

        assert!(session.resume_timer());
        session.tick_timer();
        assert_eq!(session.finish_timer().unwrap(), Some(3));
    }

    #[test]
    fn test_start_unknown_category() {
        let session = open_session(PolicyKind::HubCapped);
        let err = session
            .start_timer(timevillage_core::CategoryId::new(7))
            .unwrap_err();
        assert!(err.is_rejection());
        assert!(!session.timer().running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_counts_periods() {
        let session = open_session(PolicyKind::HubCapped);
        let study = session.add_category("Study", None).unwrap();
        let mut timer_views = session.subscribe_timer();

        session.start_timer(study.id).unwrap();
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(session.timer().session_elapsed, 3);
        assert_eq!(timer_views.latest().unwrap().session_elapsed, 3);

        session.pause_timer();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(session.timer().session_elapsed, 3);

        session.resume_timer();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(session.finish_timer().unwrap(), Some(4));
        assert_eq!(session.ledger().unwrap().accumulated_time, 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_running_timer_always_has_ticker() {
        let session = Arc::new(open_session(PolicyKind::HubCapped));
        let study = session.add_category("Study", None).unwrap();
        session.start_timer(study.id).unwrap();

        let workers: Vec<_> = (0..4)
            .map(|i| {
                let session = session.clone();
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        if i % 2 == 0 {
                            session.pause_timer();
                        } else {
                            session.resume_timer();
                        }
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        session.resume_timer();
        assert!(session.timer().running);
        let live = lock(&session.ticker)
            .as_ref()
            .is_some_and(|ticker| !ticker.is_finished());
        assert!(live);

        session.pause_timer();
        assert!(lock(&session.ticker).is_none());
    }
}
