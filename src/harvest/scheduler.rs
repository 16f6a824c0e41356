use crate::Result;
use core::time::Duration;
use ohno::bail;

const LOG_TARGET: &str = " scheduler";

/// What a job asks the scheduler to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// The job has nothing more to do.
    Done,

    /// The job made what progress it could and wants to be invoked again after the interval.
    Retry,
}

/// Where the scheduler is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// A job invocation is pending or active.
    Running,

    /// Sleeping until the next invocation.
    WaitingInterval,

    /// Terminal.
    Stopped,
}

/// Re-invokes a job on a fixed interval until it reports [`Signal::Done`].
///
/// Invocations never overlap: the next one starts only after the previous one has returned
/// and the interval has elapsed.
#[derive(Debug, Clone)]
pub struct RetryScheduler {
    interval: Duration,
    max_attempts: Option<u32>,
    state: SchedulerState,
    attempts: u32,
}

impl RetryScheduler {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
            state: SchedulerState::Running,
            attempts: 0,
        }
    }

    /// Give up with an error once `max_attempts` invocations have asked for a retry.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub const fn state(&self) -> SchedulerState {
        self.state
    }

    /// Number of job invocations made so far.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Drive `job` until it reports [`Signal::Done`], returning the number of invocations.
    ///
    /// # Errors
    ///
    /// Stops and returns the job's error as soon as one is reported, or an error when the
    /// attempt limit is reached.
    pub async fn run<F>(&mut self, mut job: F) -> Result<u32>
    where
        F: AsyncFnMut() -> Result<Signal>,
    {
        if self.state == SchedulerState::Stopped {
            bail!("scheduler has already stopped");
        }

        loop {
            self.state = SchedulerState::Running;
            self.attempts += 1;

            let signal = match job().await {
                Ok(signal) => signal,
                Err(e) => {
                    self.state = SchedulerState::Stopped;
                    return Err(e);
                }
            };

            match signal {
                Signal::Done => {
                    self.state = SchedulerState::Stopped;
                    log::debug!(target: LOG_TARGET, "Job finished after {} attempt(s)", self.attempts);
                    return Ok(self.attempts);
                }
                Signal::Retry => {
                    if self.max_attempts.is_some_and(|max| self.attempts >= max) {
                        self.state = SchedulerState::Stopped;
                        bail!("giving up after {} attempt(s)", self.attempts);
                    }

                    self.state = SchedulerState::WaitingInterval;
                    log::info!(target: LOG_TARGET, "Attempt {} needs a retry, waiting {:?}", self.attempts, self.interval);
                    tokio::time::sleep(self.interval).await;
                }
            }
        }
    }
}
