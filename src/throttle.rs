use std::time::{Duration, Instant};

/// Minimum spacing between accepted preview renders.
pub const PREVIEW_INTERVAL: Duration = Duration::from_millis(100);

/// Rate limiter for preview refreshes.
///
/// Requests arriving within the interval of the last *accepted* one are
/// dropped outright, not delayed or coalesced; a dropped request leaves
/// the stored timestamp untouched. Owned by the app, no global state.
pub struct PreviewThrottle {
    min_interval: Duration,
    last_accepted: Option<Instant>,
}

impl PreviewThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_accepted: None,
        }
    }

    /// Accept or drop a request arriving now.
    pub fn try_accept(&mut self) -> bool {
        self.accept_at(Instant::now())
    }

    /// Same decision with an explicit clock, so tests stay deterministic.
    pub fn accept_at(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_accepted {
            if now.duration_since(last) < self.min_interval {
                return false;
            }
        }
        self.last_accepted = Some(now);
        true
    }
}

impl Default for PreviewThrottle {
    fn default() -> Self {
        Self::new(PREVIEW_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_request_is_accepted() {
        let mut throttle = PreviewThrottle::default();
        assert!(throttle.accept_at(Instant::now()));
    }

    #[test]
    fn test_rapid_second_request_is_dropped() {
        let mut throttle = PreviewThrottle::default();
        let start = Instant::now();
        assert!(throttle.accept_at(start));
        assert!(!throttle.accept_at(start + Duration::from_millis(50)));
    }

    #[test]
    fn test_spaced_request_is_accepted() {
        let mut throttle = PreviewThrottle::default();
        let start = Instant::now();
        assert!(throttle.accept_at(start));
        assert!(throttle.accept_at(start + Duration::from_millis(150)));
    }

    #[test]
    fn test_dropped_request_does_not_advance_clock() {
        let mut throttle = PreviewThrottle::default();
        let start = Instant::now();
        assert!(throttle.accept_at(start));
        // Dropped at +60ms; the next request at +120ms measures from the
        // original acceptance and goes through.
        assert!(!throttle.accept_at(start + Duration::from_millis(60)));
        assert!(throttle.accept_at(start + Duration::from_millis(120)));
    }

    #[test]
    fn test_boundary_interval_is_accepted() {
        let mut throttle = PreviewThrottle::default();
        let start = Instant::now();
        assert!(throttle.accept_at(start));
        assert!(throttle.accept_at(start + PREVIEW_INTERVAL));
    }
}
