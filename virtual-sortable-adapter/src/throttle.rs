/// Leading-edge time throttle: lets a signal through at most once per `interval_ms`.
///
/// Time is supplied by the caller, so the throttle works with any clock (frame time, a
/// monotonic timer, or a fake clock in tests).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Throttle {
    interval_ms: u64,
    last_ms: Option<u64>,
}

impl Throttle {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_ms: None,
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Returns `true` (and starts a new interval) if the signal may fire at `now_ms`.
    ///
    /// A clock that goes backwards counts as a new interval.
    pub fn ready(&mut self, now_ms: u64) -> bool {
        if let Some(last) = self.last_ms {
            if now_ms >= last && now_ms - last < self.interval_ms {
                return false;
            }
        }
        self.last_ms = Some(now_ms);
        true
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
