//! Decorator node and the status transform library.
//!
//! A [`Decorator`] owns one child and one [`Transform`]. The transform sees the child's status and
//! decides what the decorator reports. Returning `Running` for a *terminal* child status means
//! "run the child again now": the decorator resets the child and ticks it again within the same
//! call. Returning anything for a *running* child is passed straight up, so `Running` from a child
//! that is still in progress never turns into a retry loop.
//!
//! Stateful transforms ([`Repeat`], [`Retry`], [`Timeout`], [`Cooldown`]) keep their counters and
//! timestamps in plain fields; [`Transform::reset`] puts them back to their initial values.

use std::time::{Duration, Instant};

use bonsai_core::{Blackboard, Clock, MonotonicClock};

use crate::bt::{Node, Status};

pub trait Transform: Send + 'static {
    /// Map the child's status to the decorator's status.
    fn apply(&mut self, status: Status) -> Status;

    /// Checked before the child is ticked. `Some` short-circuits the tick with that status.
    fn gate(&mut self) -> Option<Status> {
        None
    }

    fn reset(&mut self) {}
}

pub struct Decorator<T> {
    child: Box<dyn Node>,
    transform: T,
    halted: bool,
}

impl<T> Decorator<T>
where
    T: Transform,
{
    pub fn new(transform: T, child: Box<dyn Node>) -> Self {
        Self {
            child,
            transform,
            halted: false,
        }
    }

    pub fn transform(&self) -> &T {
        &self.transform
    }

    pub fn child(&self) -> &dyn Node {
        self.child.as_ref()
    }
}

impl<T> Node for Decorator<T>
where
    T: Transform,
{
    fn tick(&mut self, blackboard: &Blackboard) -> Status {
        if self.halted {
            return Status::Failure;
        }

        if let Some(status) = self.transform.gate() {
            return status;
        }

        loop {
            let child_status = self.child.tick(blackboard);
            let status = self.transform.apply(child_status);

            if child_status.is_running() {
                if status.is_terminal() {
                    // The transform gave up on an in-flight child (e.g. timed out).
                    self.child.reset();
                }
                return status;
            }

            if status.is_terminal() {
                return status;
            }

            tracing::trace!(?child_status, "decorator re-running child");
            self.child.reset();
        }
    }

    fn reset(&mut self) {
        self.halted = false;
        self.transform.reset();
        self.child.reset();
    }

    fn halt(&mut self) {
        self.halted = true;
        self.child.halt();
    }

    fn is_halted(&self) -> bool {
        self.halted
    }
}

/// Swaps `Success` and `Failure`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inverter;

impl Transform for Inverter {
    fn apply(&mut self, status: Status) -> Status {
        status.invert()
    }
}

/// Reports `Success` for any finished child.
#[derive(Debug, Clone, Copy, Default)]
pub struct Succeeder;

impl Transform for Succeeder {
    fn apply(&mut self, status: Status) -> Status {
        match status {
            Status::Running => Status::Running,
            Status::Success | Status::Failure => Status::Success,
        }
    }
}

/// Reports `Failure` for any finished child.
#[derive(Debug, Clone, Copy, Default)]
pub struct Failer;

impl Transform for Failer {
    fn apply(&mut self, status: Status) -> Status {
        match status {
            Status::Running => Status::Running,
            Status::Success | Status::Failure => Status::Failure,
        }
    }
}

/// Re-runs a succeeding child until it has succeeded `max` times.
///
/// The first failure ends the repetition with `Failure`. Without a bound the child is repeated
/// until it fails or returns `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repeat {
    max: Option<u32>,
    successes: u32,
}

impl Repeat {
    /// `times` is clamped to at least one run.
    pub fn times(times: u32) -> Self {
        Self {
            max: Some(times.max(1)),
            successes: 0,
        }
    }

    pub fn forever() -> Self {
        Self {
            max: None,
            successes: 0,
        }
    }

    pub fn successes(&self) -> u32 {
        self.successes
    }
}

impl Transform for Repeat {
    fn apply(&mut self, status: Status) -> Status {
        match status {
            Status::Running => Status::Running,
            Status::Failure => {
                self.successes = 0;
                Status::Failure
            }
            Status::Success => {
                self.successes = self.successes.saturating_add(1);
                match self.max {
                    Some(max) if self.successes >= max => {
                        self.successes = 0;
                        Status::Success
                    }
                    _ => Status::Running,
                }
            }
        }
    }

    fn reset(&mut self) {
        self.successes = 0;
    }
}

/// Re-runs a failing child until it has failed `max` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retry {
    max: Option<u32>,
    failures: u32,
}

impl Retry {
    /// `times` is clamped to at least one attempt.
    pub fn times(times: u32) -> Self {
        Self {
            max: Some(times.max(1)),
            failures: 0,
        }
    }

    pub fn forever() -> Self {
        Self {
            max: None,
            failures: 0,
        }
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }
}

impl Transform for Retry {
    fn apply(&mut self, status: Status) -> Status {
        match status {
            Status::Running => Status::Running,
            Status::Success => {
                self.failures = 0;
                Status::Success
            }
            Status::Failure => {
                self.failures = self.failures.saturating_add(1);
                match self.max {
                    Some(max) if self.failures >= max => {
                        self.failures = 0;
                        tracing::debug!(attempts = max, "retry budget exhausted");
                        Status::Failure
                    }
                    _ => Status::Running,
                }
            }
        }
    }

    fn reset(&mut self) {
        self.failures = 0;
    }
}

/// Fails the child once it has been observed for longer than `limit`.
///
/// The clock starts at the first tick after the decorator was idle and stops when the child
/// finishes. Expiry is only noticed at tick time.
#[derive(Debug, Clone)]
pub struct Timeout<C = MonotonicClock> {
    limit: Duration,
    started: Option<Instant>,
    clock: C,
}

impl Timeout<MonotonicClock> {
    pub fn new(limit: Duration) -> Self {
        Self::with_clock(limit, MonotonicClock)
    }
}

impl<C> Timeout<C>
where
    C: Clock,
{
    pub fn with_clock(limit: Duration, clock: C) -> Self {
        Self {
            limit,
            started: None,
            clock,
        }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub fn is_armed(&self) -> bool {
        self.started.is_some()
    }
}

impl<C> Transform for Timeout<C>
where
    C: Clock,
{
    fn apply(&mut self, status: Status) -> Status {
        let now = self.clock.now();
        let started = *self.started.get_or_insert(now);

        if now.saturating_duration_since(started) >= self.limit {
            self.started = None;
            tracing::debug!(limit_ms = self.limit.as_millis() as u64, "timeout expired");
            return Status::Failure;
        }

        if status.is_terminal() {
            self.started = None;
        }
        status
    }

    fn reset(&mut self) {
        self.started = None;
    }
}

/// After a success, refuses to run the child again until `period` has passed.
///
/// While cooling down the decorator reports `Failure` and the child is not ticked.
#[derive(Debug, Clone)]
pub struct Cooldown<C = MonotonicClock> {
    period: Duration,
    last_success: Option<Instant>,
    clock: C,
}

impl Cooldown<MonotonicClock> {
    pub fn new(period: Duration) -> Self {
        Self::with_clock(period, MonotonicClock)
    }
}

impl<C> Cooldown<C>
where
    C: Clock,
{
    pub fn with_clock(period: Duration, clock: C) -> Self {
        Self {
            period,
            last_success: None,
            clock,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_cooling_down(&self) -> bool {
        match self.last_success {
            Some(at) => self.clock.now().saturating_duration_since(at) < self.period,
            None => false,
        }
    }
}

impl<C> Transform for Cooldown<C>
where
    C: Clock,
{
    fn apply(&mut self, status: Status) -> Status {
        if status.is_success() {
            self.last_success = Some(self.clock.now());
        }
        status
    }

    fn gate(&mut self) -> Option<Status> {
        if self.is_cooling_down() {
            tracing::debug!("cooldown active, skipping child");
            return Some(Status::Failure);
        }
        None
    }

    fn reset(&mut self) {
        self.last_success = None;
    }
}

/// Stateless transform from a closure.
///
/// The closure is called with every child status, including `Running`. Returning `Running` for a
/// terminal status re-runs the child immediately, so a closure that always does so never returns.
pub struct FnTransform<F> {
    func: F,
}

impl<F> FnTransform<F>
where
    F: FnMut(Status) -> Status + Send + 'static,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Transform for FnTransform<F>
where
    F: FnMut(Status) -> Status + Send + 'static,
{
    fn apply(&mut self, status: Status) -> Status {
        (self.func)(status)
    }
}
