use std::ops::Add;
use std::time::{Duration, Instant};

/// 可重置的静默期计时器，不依赖任何事件循环。
///
/// 每次 `schedule` 都会覆盖待发值并把截止时间推迟到 `now + quiet`；
/// 只有在截止时间之后调用 `fire` 才会取出值。时间由调用方传入，
/// 所以 `I` 既可以是 `std::time::Instant`，也可以是 tokio 的 `Instant`。
#[derive(Debug)]
pub struct Debouncer<T, I = Instant> {
    quiet: Duration,
    pending: Option<(T, I)>,
}

impl<T, I> Debouncer<T, I>
where
    I: Copy + Ord + Add<Duration, Output = I>,
{
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    pub fn schedule(&mut self, value: T, now: I) {
        self.pending = Some((value, now + self.quiet));
    }

    pub fn deadline(&self) -> Option<I> {
        self.pending.as_ref().map(|(_, at)| *at)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn fire(&mut self, now: I) -> Option<T> {
        match self.pending {
            Some((_, at)) if now >= at => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }
}
