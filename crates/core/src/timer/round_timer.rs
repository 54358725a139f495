use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Period of the countdown.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

pub type TimeoutCallback = Box<dyn FnOnce() + Send + 'static>;

struct TimerState {
    time_remaining: u32,
    on_timeout: Option<TimeoutCallback>,
    running: bool,
    /// Armed with time left but no ticker scheduled (paused, or set without starting).
    suspended: bool,
    /// Bumped whenever a schedule is created or cancelled; ticks from an older schedule bail.
    generation: u64,
    ticker: Option<JoinHandle<()>>,
    /// When the running schedule's next tick is due.
    next_tick: Option<Instant>,
    /// Delay before the first tick after a resume; keeps the part of a second already counted.
    carry: Duration,
}

enum Tick {
    Continue,
    Expired(Option<TimeoutCallback>),
    Cancelled,
}

/// One-second countdown driven by a Tokio task.
///
/// Every public method takes the state lock, and every tick re-checks its schedule generation
/// under that same lock, so once `stop_timer`, `reset_timer` or `pause_timer` returns no tick
/// from the old schedule can change the remaining time or fire the callback.
pub struct RoundTimer {
    state: Arc<Mutex<TimerState>>,
    runtime: Handle,
}

impl RoundTimer {
    pub fn new(runtime: Handle) -> Self {
        Self {
            state: Arc::new(Mutex::new(TimerState {
                time_remaining: 0,
                on_timeout: None,
                running: false,
                suspended: false,
                generation: 0,
                ticker: None,
                next_tick: None,
                carry: TICK_INTERVAL,
            })),
            runtime,
        }
    }

    /// Timer bound to the runtime of the calling context.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Arms the timer without starting it. `resume_timer` starts the countdown.
    pub fn set_time<F>(&self, seconds: u32, on_timeout: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.state.lock();
        Self::cancel(&mut state);
        state.time_remaining = seconds;
        state.on_timeout = Some(Box::new(on_timeout));
        state.suspended = seconds > 0;
        state.carry = TICK_INTERVAL;
        log::debug!("Timer armed with {}s", seconds);
    }

    /// Arms the timer and starts counting down, replacing any running schedule.
    pub fn start_timer<F>(&self, seconds: u32, on_timeout: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.state.lock();
        Self::cancel(&mut state);
        state.time_remaining = seconds;
        state.on_timeout = Some(Box::new(on_timeout));

        if seconds > 0 {
            self.spawn_ticker(&mut state, TICK_INTERVAL);
            log::debug!("Timer started with {}s", seconds);
        }
    }

    /// Suspends the countdown, keeping the remaining time and the progress toward the next tick.
    pub fn pause_timer(&self) {
        let mut state = self.state.lock();
        if !state.running {
            return;
        }
        let carry = state
            .next_tick
            .map(|due| due.saturating_duration_since(Instant::now()))
            .unwrap_or(TICK_INTERVAL);
        Self::cancel(&mut state);
        state.suspended = true;
        state.carry = carry;
        log::debug!("Timer paused at {}s", state.time_remaining);
    }

    /// Continues a suspended countdown. No-op while running, after a stop, or at zero.
    pub fn resume_timer(&self) {
        let mut state = self.state.lock();
        if !state.suspended || state.time_remaining == 0 {
            return;
        }
        state.suspended = false;
        let first_tick = state.carry;
        self.spawn_ticker(&mut state, first_tick);
        log::debug!("Timer resumed at {}s", state.time_remaining);
    }

    /// Cancels the schedule, keeping the remaining time and the callback.
    pub fn stop_timer(&self) {
        let mut state = self.state.lock();
        Self::cancel(&mut state);
    }

    /// Cancels the schedule, zeroes the remaining time and drops the callback.
    pub fn reset_timer(&self) {
        let mut state = self.state.lock();
        Self::cancel(&mut state);
        state.time_remaining = 0;
        state.on_timeout = None;
    }

    pub fn time_remaining(&self) -> u32 {
        self.state.lock().time_remaining
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().suspended
    }

    fn cancel(state: &mut TimerState) {
        state.generation = state.generation.wrapping_add(1);
        state.running = false;
        state.suspended = false;
        state.next_tick = None;
        if let Some(ticker) = state.ticker.take() {
            ticker.abort();
        }
    }

    fn spawn_ticker(&self, state: &mut TimerState, first_tick: Duration) {
        state.generation = state.generation.wrapping_add(1);
        state.running = true;

        let start = Instant::now() + first_tick;
        state.next_tick = Some(start);
        state.carry = TICK_INTERVAL;

        let generation = state.generation;
        let shared = Arc::downgrade(&self.state);

        state.ticker = Some(self.runtime.spawn(async move {
            let mut interval = interval_at(start, TICK_INTERVAL);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                match Self::tick(&shared, generation) {
                    Tick::Continue => {}
                    Tick::Expired(on_timeout) => {
                        log::debug!("Timer expired");
                        if let Some(on_timeout) = on_timeout {
                            on_timeout();
                        }
                        break;
                    }
                    Tick::Cancelled => break,
                }
            }
        }));
    }

    fn tick(shared: &Weak<Mutex<TimerState>>, generation: u64) -> Tick {
        let Some(shared) = shared.upgrade() else {
            return Tick::Cancelled;
        };
        let mut state = shared.lock();

        if state.generation != generation || !state.running {
            return Tick::Cancelled;
        }
        if state.time_remaining == 0 {
            state.running = false;
            state.ticker = None;
            return Tick::Cancelled;
        }

        state.time_remaining -= 1;
        if state.time_remaining > 0 {
            state.next_tick = Some(Instant::now() + TICK_INTERVAL);
            return Tick::Continue;
        }

        state.running = false;
        state.ticker = None;
        state.next_tick = None;
        Tick::Expired(state.on_timeout.take())
    }
}

impl Drop for RoundTimer {
    fn drop(&mut self) {
        Self::cancel(&mut self.state.lock());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::time::sleep;

    use super::*;

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let hits = Arc::clone(&count);
        (count, move || {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_sets_initial_time() {
        let timer = RoundTimer::current();
        timer.start_timer(60, || {});
        assert_eq!(timer.time_remaining(), 60);
        assert!(timer.is_running());
        assert!(!timer.is_paused());
    }

    #[tokio::test(start_paused = true)]
    async fn test_counts_down_once_per_second() {
        let timer = RoundTimer::current();
        timer.start_timer(5, || {});

        sleep(Duration::from_millis(1500)).await;
        assert_eq!(timer.time_remaining(), 4);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(timer.time_remaining(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fires_exactly_once() {
        let timer = RoundTimer::current();
        let (count, on_timeout) = counter();
        timer.start_timer(2, on_timeout);

        sleep(Duration::from_secs(3)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(timer.time_remaining(), 0);
        assert!(!timer.is_running());

        sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_keeps_remaining_time() {
        let timer = RoundTimer::current();
        timer.start_timer(10, || {});

        sleep(Duration::from_millis(1500)).await;
        timer.stop_timer();
        assert_eq!(timer.time_remaining(), 9);
        assert!(!timer.is_running());

        sleep(Duration::from_secs(3)).await;
        assert_eq!(timer.time_remaining(), 9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_pending_timeout() {
        let timer = RoundTimer::current();
        let (count, on_timeout) = counter();
        timer.start_timer(1, on_timeout);

        sleep(Duration::from_millis(900)).await;
        timer.stop_timer();

        sleep(Duration::from_secs(3)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(timer.time_remaining(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_after_stop_is_noop() {
        let timer = RoundTimer::current();
        timer.start_timer(10, || {});
        sleep(Duration::from_millis(1500)).await;
        timer.stop_timer();

        timer.resume_timer();
        assert!(!timer.is_running());
        sleep(Duration::from_secs(2)).await;
        assert_eq!(timer.time_remaining(), 9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_and_resume() {
        let timer = RoundTimer::current();
        timer.start_timer(10, || {});

        sleep(Duration::from_millis(2500)).await;
        timer.pause_timer();
        assert_eq!(timer.time_remaining(), 8);
        assert!(timer.is_paused());
        assert!(!timer.is_running());

        sleep(Duration::from_secs(5)).await;
        assert_eq!(timer.time_remaining(), 8);

        timer.resume_timer();
        assert!(timer.is_running());
        sleep(Duration::from_millis(1200)).await;
        assert_eq!(timer.time_remaining(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_keeps_partial_second() {
        let timer = RoundTimer::current();
        timer.start_timer(10, || {});

        // 0.9s of every second is counted before each pause
        for _ in 0..5 {
            sleep(Duration::from_millis(900)).await;
            timer.pause_timer();
            sleep(Duration::from_secs(2)).await;
            timer.resume_timer();
        }
        assert_eq!(timer.time_remaining(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_finishes_interrupted_second() {
        let timer = RoundTimer::current();
        timer.start_timer(10, || {});

        sleep(Duration::from_millis(700)).await;
        timer.pause_timer();
        sleep(Duration::from_secs(4)).await;
        timer.resume_timer();

        sleep(Duration::from_millis(200)).await;
        assert_eq!(timer.time_remaining(), 10);
        sleep(Duration::from_millis(200)).await;
        assert_eq!(timer.time_remaining(), 9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_while_running_is_idempotent() {
        let timer = RoundTimer::current();
        timer.start_timer(10, || {});
        timer.resume_timer();
        timer.resume_timer();

        sleep(Duration::from_millis(1500)).await;
        assert_eq!(timer.time_remaining(), 9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_time_waits_for_resume() {
        let timer = RoundTimer::current();
        let (count, on_timeout) = counter();
        timer.set_time(2, on_timeout);
        assert_eq!(timer.time_remaining(), 2);
        assert!(!timer.is_running());

        sleep(Duration::from_secs(3)).await;
        assert_eq!(timer.time_remaining(), 2);

        timer.resume_timer();
        sleep(Duration::from_millis(2500)).await;
        assert_eq!(timer.time_remaining(), 0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_zeroes_and_stops() {
        let timer = RoundTimer::current();
        let (count, on_timeout) = counter();
        timer.start_timer(10, on_timeout);
        timer.reset_timer();
        assert_eq!(timer.time_remaining(), 0);

        timer.resume_timer();
        sleep(Duration::from_secs(12)).await;
        assert_eq!(timer.time_remaining(), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_schedule() {
        let timer = RoundTimer::current();
        let (first, on_first) = counter();
        let (second, on_second) = counter();

        timer.start_timer(1, on_first);
        timer.start_timer(20, on_second);
        assert_eq!(timer.time_remaining(), 20);

        sleep(Duration::from_millis(1500)).await;
        assert_eq!(timer.time_remaining(), 19);
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_seconds_never_runs() {
        let timer = RoundTimer::current();
        let (count, on_timeout) = counter();
        timer.start_timer(0, on_timeout);
        assert!(!timer.is_running());

        sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
