use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Interval, MissedTickBehavior};
use twap_core::Timestamp;

/// Shortest period the clock accepts; zero would spin
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// One fire event of the schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// 1-based position in the schedule
    pub index: u32,
    /// Wall-clock time the tick was delivered
    pub at: Timestamp,
}

/// Result of waiting on the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Fire(Tick),
    /// Cancel was observed; no tick is delivered after this
    Cancelled,
    /// Every scheduled tick has already fired
    Exhausted,
}

/// Handle that stops a [`SliceClock`]
///
/// Cheap to clone and safe to call from any task. Cancelling twice is a no-op.
#[derive(Debug, Clone)]
pub struct ClockCanceller {
    tx: Arc<watch::Sender<bool>>,
}

impl ClockCanceller {
    pub fn cancel(&self) {
        let was_cancelled = self.tx.send_replace(true);
        if !was_cancelled {
            log::debug!("Slice clock cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Finite, fixed-interval tick producer
///
/// The first tick fires immediately, each following one `period` after the
/// previous. A late consumer delays the rest of the schedule rather than
/// receiving a burst of catch-up ticks.
pub struct SliceClock {
    interval: Interval,
    period: Duration,
    count: u32,
    fired: u32,
    cancel_rx: watch::Receiver<bool>,
    // Keeps the sender alive so `cancel_rx` never reports a closed channel
    canceller: ClockCanceller,
}

impl SliceClock {
    /// Start a schedule of `count` ticks spaced by `period`
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(period: Duration, count: u32) -> (Self, ClockCanceller) {
        let period = period.max(MIN_PERIOD);
        let (tx, cancel_rx) = watch::channel(false);
        let canceller = ClockCanceller { tx: Arc::new(tx) };

        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let clock = Self {
            interval,
            period,
            count,
            fired: 0,
            cancel_rx,
            canceller: canceller.clone(),
        };

        (clock, canceller)
    }

    /// Wait for the next tick, a cancel, or the end of the schedule
    ///
    /// A cancel that lands in the same instant as a tick wins: the tick is
    /// swallowed and `Cancelled` is returned.
    pub async fn tick(&mut self) -> TickOutcome {
        if self.is_cancelled() {
            return TickOutcome::Cancelled;
        }
        if self.fired >= self.count {
            return TickOutcome::Exhausted;
        }

        tokio::select! {
            biased;

            _ = wait_cancelled(&mut self.cancel_rx) => TickOutcome::Cancelled,

            _ = self.interval.tick() => {
                if self.is_cancelled() {
                    return TickOutcome::Cancelled;
                }
                self.fired += 1;
                TickOutcome::Fire(Tick {
                    index: self.fired,
                    at: Utc::now(),
                })
            }
        }
    }

    pub fn cancel(&self) {
        self.canceller.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_rx.borrow()
    }

    pub fn canceller(&self) -> ClockCanceller {
        self.canceller.clone()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Ticks still to come if nobody cancels
    pub fn remaining(&self) -> u32 {
        self.count.saturating_sub(self.fired)
    }
}

async fn wait_cancelled(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|cancelled| *cancelled).await.is_err() {
        // Sender gone: nobody can cancel any more
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_are_spaced_by_period() {
        let (mut clock, _canceller) = SliceClock::start(Duration::from_secs(5), 3);
        let start = Instant::now();

        let mut offsets = Vec::new();
        while let TickOutcome::Fire(tick) = clock.tick().await {
            offsets.push((tick.index, start.elapsed().as_secs()));
        }

        assert_eq!(offsets, vec![(1, 0), (2, 5), (3, 10)]);
        assert_eq!(clock.tick().await, TickOutcome::Exhausted);
        assert_eq!(clock.remaining(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_wakes_blocked_waiter() {
        let (mut clock, canceller) = SliceClock::start(Duration::from_secs(60), 3);
        assert!(matches!(clock.tick().await, TickOutcome::Fire(_)));

        let start = Instant::now();
        let waiter = tokio::spawn(async move {
            let outcome = clock.tick().await;
            (outcome, clock)
        });

        tokio::time::sleep(Duration::from_secs(1)).await;
        canceller.cancel();

        let (outcome, clock) = waiter.await.unwrap();
        assert_eq!(outcome, TickOutcome::Cancelled);
        assert!(start.elapsed() < Duration::from_secs(60));
        assert_eq!(clock.remaining(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_tick_after_cancel() {
        let (mut clock, canceller) = SliceClock::start(Duration::from_millis(10), 5);
        canceller.cancel();

        // Even after the timer would have fired, cancel wins
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(clock.tick().await, TickOutcome::Cancelled);
        assert_eq!(clock.tick().await, TickOutcome::Cancelled);
        assert_eq!(clock.remaining(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_is_idempotent() {
        let (clock, canceller) = SliceClock::start(Duration::from_secs(1), 2);
        canceller.cancel();
        canceller.cancel();
        clock.cancel();

        assert!(canceller.is_cancelled());
        assert!(clock.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_consumer_is_delayed_not_bursted() {
        let (mut clock, _canceller) = SliceClock::start(Duration::from_secs(2), 3);
        let start = Instant::now();

        assert!(matches!(clock.tick().await, TickOutcome::Fire(_)));
        // Consumer stalls well past the second deadline
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(matches!(clock.tick().await, TickOutcome::Fire(_)));
        let second = start.elapsed();
        assert!(matches!(clock.tick().await, TickOutcome::Fire(_)));

        assert!(start.elapsed() - second >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_period_is_clamped() {
        let (clock, _canceller) = SliceClock::start(Duration::ZERO, 1);
        assert_eq!(clock.period(), MIN_PERIOD);
    }
}
