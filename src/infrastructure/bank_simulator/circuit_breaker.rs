use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Failures within `window` before the breaker opens.
    pub failure_threshold: u32,
    /// Rolling window over which failures are counted.
    pub window: Duration,
    /// How long the breaker stays open before allowing a half-open trial.
    pub open_for: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug)]
struct BreakerInner {
    state: BreakerState,
    opened_at: Option<Instant>,
    failures: VecDeque<Instant>,
}

/// Shared across request tasks; all state behind one mutex.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(BreakerInner {
                state: BreakerState::Closed,
                opened_at: None,
                failures: VecDeque::new(),
            }),
        }
    }

    /// Whether a call may go out. While open, returns false until the
    /// cool-down elapses, then lets a single half-open trial through.
    pub fn try_acquire(&self) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        match inner.state {
            BreakerState::Closed | BreakerState::HalfOpen => true,
            BreakerState::Open => {
                let cooled_down = inner
                    .opened_at
                    .map(|opened_at| opened_at.elapsed() >= self.config.open_for)
                    .unwrap_or(true);

                if cooled_down {
                    inner.state = BreakerState::HalfOpen;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        inner.state = BreakerState::Closed;
        inner.opened_at = None;
        inner.failures.clear();
    }

    pub fn record_failure(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let now = Instant::now();

        if inner.state == BreakerState::HalfOpen {
            inner.state = BreakerState::Open;
            inner.opened_at = Some(now);
            return;
        }

        inner.failures.push_back(now);
        while let Some(oldest) = inner.failures.front() {
            if now.duration_since(*oldest) > self.config.window {
                inner.failures.pop_front();
            } else {
                break;
            }
        }

        if inner.state == BreakerState::Closed
            && inner.failures.len() >= self.config.failure_threshold as usize
        {
            inner.state = BreakerState::Open;
            inner.opened_at = Some(now);
        }
    }

    pub fn is_open(&self) -> bool {
        let inner = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        inner.state == BreakerState::Open
    }
}
