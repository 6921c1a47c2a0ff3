//! Clock abstraction supporting real, manual and simulated time.
//!
//! Everything that needs "now" receives an `Arc<dyn TimeSource>` instead of reading the
//! host clock directly, so the sun position can be driven by a fixed clock in tests, by
//! a settable clock that advances on every read for demos, or by an accelerated clock
//! for the `simulate` command.

use chrono::{DateTime, Local, NaiveDateTime, TimeDelta, TimeZone};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration as StdDuration, Instant};

/// Trait for abstracting time operations
pub trait TimeSource: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Local>;

    /// Sleep for the specified duration (or simulate it)
    fn sleep(&self, duration: StdDuration);

    /// Check if this is a simulated time source
    fn is_simulated(&self) -> bool;

    /// Check if simulation has ended (always false for real time)
    fn is_ended(&self) -> bool {
        false
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn to_chrono(duration: StdDuration) -> TimeDelta {
    TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX)
}

/// Host wall clock.
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: StdDuration) {
        std::thread::sleep(duration);
    }

    fn is_simulated(&self) -> bool {
        false
    }
}

/// Settable clock for tests and demos.
///
/// The clock holds a fixed instant that only changes through [`set`](Self::set) and
/// [`advance`](Self::advance), unless an automatic step is configured, in which case
/// every call to `now()` returns the current instant and then moves it forward by the
/// step. `sleep` advances the clock instead of blocking.
pub struct ManualTimeSource {
    current: Mutex<DateTime<Local>>,
    auto_advance: Option<TimeDelta>,
}

impl ManualTimeSource {
    /// A clock frozen at `start`.
    pub fn fixed(start: DateTime<Local>) -> Self {
        Self {
            current: Mutex::new(start),
            auto_advance: None,
        }
    }

    /// A clock starting at `start` that moves forward by `step` on every read.
    pub fn advancing(start: DateTime<Local>, step: StdDuration) -> Self {
        Self {
            current: Mutex::new(start),
            auto_advance: Some(to_chrono(step)),
        }
    }

    /// Override the current instant.
    pub fn set(&self, instant: DateTime<Local>) {
        *lock(&self.current) = instant;
    }

    /// Move the clock forward.
    pub fn advance(&self, duration: StdDuration) {
        let mut current = lock(&self.current);
        if let Some(next) = current.checked_add_signed(to_chrono(duration)) {
            *current = next;
        }
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> DateTime<Local> {
        let mut current = lock(&self.current);
        let observed = *current;
        if let Some(next) = self
            .auto_advance
            .and_then(|step| current.checked_add_signed(step))
        {
            *current = next;
        }
        observed
    }

    fn sleep(&self, duration: StdDuration) {
        self.advance(duration);
    }

    fn is_simulated(&self) -> bool {
        true
    }
}

/// Accelerated clock running from a start instant to an end instant.
///
/// Two modes are supported:
/// - Linear acceleration: simulated time flows at `multiplier` times real time.
/// - Fast-forward (multiplier = 0.0): time only moves when `sleep` is called, and
///   then jumps by exactly the requested duration.
pub struct SimulatedTimeSource {
    start_time: DateTime<Local>,
    end_time: DateTime<Local>,
    /// 0.0 means fast-forward mode
    time_multiplier: f64,
    /// Real instant the simulation started, for linear mode
    started_at: Instant,
    /// Simulated time in fast-forward mode
    fast_forward_current: Mutex<DateTime<Local>>,
}

impl SimulatedTimeSource {
    /// Create a new simulated time source.
    ///
    /// Negative multipliers fall back to one simulated hour per real second.
    pub fn new(start_time: DateTime<Local>, end_time: DateTime<Local>, multiplier: f64) -> Self {
        let time_multiplier = if multiplier == 0.0 {
            0.0
        } else if multiplier < 0.0 {
            crate::common::constants::DEFAULT_SIMULATION_MULTIPLIER
        } else {
            multiplier
        };

        Self {
            start_time,
            end_time,
            time_multiplier,
            started_at: Instant::now(),
            fast_forward_current: Mutex::new(start_time),
        }
    }

    pub fn is_fast_forward(&self) -> bool {
        self.time_multiplier == 0.0
    }

    pub fn multiplier(&self) -> f64 {
        self.time_multiplier
    }

    fn current_time(&self) -> DateTime<Local> {
        let simulated = if self.is_fast_forward() {
            *lock(&self.fast_forward_current)
        } else {
            let elapsed_secs = self.started_at.elapsed().as_secs_f64() * self.time_multiplier;
            let elapsed = StdDuration::try_from_secs_f64(elapsed_secs).unwrap_or(StdDuration::MAX);
            self.start_time
                .checked_add_signed(to_chrono(elapsed))
                .unwrap_or(self.end_time)
        };
        simulated.min(self.end_time)
    }
}

impl TimeSource for SimulatedTimeSource {
    fn now(&self) -> DateTime<Local> {
        self.current_time()
    }

    fn sleep(&self, duration: StdDuration) {
        if self.is_fast_forward() {
            let mut current = lock(&self.fast_forward_current);
            *current = current
                .checked_add_signed(to_chrono(duration))
                .map_or(self.end_time, |next| next.min(self.end_time));
            drop(current);
            // Let other threads run and logs flush
            std::thread::sleep(StdDuration::from_millis(1));
            return;
        }

        // Never sleep past the end of the simulation
        let remaining = (self.end_time - self.current_time())
            .to_std()
            .unwrap_or(StdDuration::ZERO);
        let simulated = duration.min(remaining);
        let real_secs = simulated.as_secs_f64() / self.time_multiplier;
        if real_secs > 0.0 {
            std::thread::sleep(StdDuration::from_secs_f64(real_secs));
        }
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn is_ended(&self) -> bool {
        self.current_time() >= self.end_time
    }
}

/// Parse a datetime string in the format "YYYY-MM-DD HH:MM:SS" as local time.
pub fn parse_datetime(s: &str) -> Result<DateTime<Local>, String> {
    let naive = NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M:%S")
        .map_err(|e| format!("Invalid datetime format: {e}. Use YYYY-MM-DD HH:MM:SS"))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| "Ambiguous or invalid local time".to_string())
}
