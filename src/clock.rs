//! Wall-clock to fixed-tick conversion
//!
//! Frame callbacks arrive at whatever rate the browser manages. The clock
//! accumulates real elapsed time and releases whole simulation ticks, so
//! physics speed is independent of the display rate.

use crate::consts::{MAX_FRAME_DELTA_MS, MAX_TICKS_PER_FRAME, TICK_MS};

#[derive(Debug, Clone)]
pub struct FrameClock {
    tick_ms: f64,
    max_ticks: u32,
    accumulator: f64,
    last_time: Option<f64>,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(TICK_MS, MAX_TICKS_PER_FRAME)
    }
}

impl FrameClock {
    pub fn new(tick_ms: f64, max_ticks: u32) -> Self {
        Self {
            tick_ms,
            max_ticks,
            accumulator: 0.0,
            last_time: None,
        }
    }

    /// Feed a frame timestamp (ms) and get the number of ticks to run.
    ///
    /// The first call only records the timestamp. Long stalls are clamped
    /// and any backlog beyond `max_ticks` is dropped rather than replayed.
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        let Some(last) = self.last_time.replace(now_ms) else {
            return 0;
        };

        let dt = (now_ms - last).clamp(0.0, MAX_FRAME_DELTA_MS);
        self.accumulator += dt;

        let mut ticks = 0;
        while self.accumulator >= self.tick_ms && ticks < self.max_ticks {
            self.accumulator -= self.tick_ms;
            ticks += 1;
        }

        if self.accumulator >= self.tick_ms {
            log::debug!("Frame clock dropping {:.1} ms of backlog", self.accumulator);
            self.accumulator %= self.tick_ms;
        }

        ticks
    }

    /// Forget timing history (e.g. after the tab was hidden)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_time = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_runs_nothing() {
        let mut clock = FrameClock::new(10.0, 5);
        assert_eq!(clock.advance(1000.0), 0);
    }

    #[test]
    fn test_releases_whole_ticks() {
        let mut clock = FrameClock::new(10.0, 5);
        clock.advance(0.0);
        assert_eq!(clock.advance(15.0), 1);
        // 5 ms carried over + 5 ms
        assert_eq!(clock.advance(20.0), 1);
        assert_eq!(clock.advance(29.0), 0);
    }

    #[test]
    fn test_fast_display_does_not_speed_up_physics() {
        let mut clock = FrameClock::new(10.0, 5);
        clock.advance(0.0);
        let mut total = 0;
        // 400 Hz frames for 100 ms
        for i in 1..=40 {
            total += clock.advance(i as f64 * 2.5);
        }
        assert_eq!(total, 10);
    }

    #[test]
    fn test_backlog_is_capped() {
        let mut clock = FrameClock::new(10.0, 5);
        clock.advance(0.0);
        assert_eq!(clock.advance(200.0), 5);
        // Surplus was dropped, not replayed
        assert_eq!(clock.advance(201.0), 0);
    }

    #[test]
    fn test_clock_going_backwards_is_ignored() {
        let mut clock = FrameClock::new(10.0, 5);
        clock.advance(100.0);
        assert_eq!(clock.advance(50.0), 0);
        assert_eq!(clock.advance(60.0), 1);
    }

    #[test]
    fn test_reset_forgets_last_frame() {
        let mut clock = FrameClock::new(10.0, 5);
        clock.advance(0.0);
        clock.reset();
        assert_eq!(clock.advance(5000.0), 0);
    }
}
