use std::time::Duration;

use inpage_dom::Rect;
use tokio::time::Instant;

/// Ticks closer than this to the previous sample are ignored when waiting
/// for more than one frame
pub const MIN_FRAME_GAP: Duration = Duration::from_millis(15);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilitySample {
    pub rect: Rect,
    /// Same rect seen on `raf_count` consecutive samples after the first
    pub stable: bool,
    /// Stable, or this is the first sample (nothing to compare against yet)
    pub stable_for_logs: bool,
}

/// Tracks the bounding rect of one element across ticks of one poll.
#[derive(Debug, Clone)]
pub struct StabilityWindow {
    raf_count: u32,
    min_frame_gap: Duration,
    ticks: u64,
    last_rect: Option<Rect>,
    same_position_counter: u32,
    last_time: Option<Instant>,
}

impl StabilityWindow {
    pub fn new(raf_count: u32) -> Self {
        Self {
            raf_count,
            min_frame_gap: MIN_FRAME_GAP,
            ticks: 0,
            last_rect: None,
            same_position_counter: 0,
            last_time: None,
        }
    }

    pub fn with_min_frame_gap(mut self, gap: Duration) -> Self {
        self.min_frame_gap = gap;
        self
    }

    pub fn raf_count(&self) -> u32 {
        self.raf_count
    }

    /// Count a tick. The first tick of a poll runs in the same frame the
    /// poll started in and cannot show movement, so it returns `false` and
    /// must not be sampled.
    pub fn begin_tick(&mut self) -> bool {
        self.ticks += 1;
        self.ticks > 1
    }

    /// Sample `rect` at `now`. Returns `None` when the tick is skipped for
    /// arriving within the minimum frame gap.
    pub fn observe(&mut self, now: Instant, rect: Rect) -> Option<StabilitySample> {
        if self.raf_count > 1 {
            if let Some(last) = self.last_time {
                if now.saturating_duration_since(last) < self.min_frame_gap {
                    return None;
                }
            }
        }
        self.last_time = Some(now);

        if self.last_rect == Some(rect) {
            self.same_position_counter += 1;
        } else {
            self.same_position_counter = 0;
        }
        let stable = self.same_position_counter >= self.raf_count;
        let stable_for_logs = stable || self.last_rect.is_none();
        self.last_rect = Some(rect);

        Some(StabilitySample {
            rect,
            stable,
            stable_for_logs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECT: Rect = Rect {
        x: 10.0,
        y: 20.0,
        width: 30.0,
        height: 40.0,
    };

    fn ms(base: Instant, offset: u64) -> Instant {
        base + Duration::from_millis(offset)
    }

    #[test]
    fn first_tick_is_a_warm_up() {
        let mut window = StabilityWindow::new(1);
        assert!(!window.begin_tick());
        assert!(window.begin_tick());
        assert!(window.begin_tick());
    }

    #[test]
    fn stable_after_raf_count_identical_samples() {
        let base = Instant::now();
        let mut window = StabilityWindow::new(2);
        let first = window.observe(ms(base, 0), RECT).unwrap();
        assert!(!first.stable);
        assert!(first.stable_for_logs);

        let second = window.observe(ms(base, 16), RECT).unwrap();
        assert!(!second.stable);
        assert!(!second.stable_for_logs);

        let third = window.observe(ms(base, 32), RECT).unwrap();
        assert!(third.stable);
    }

    #[test]
    fn frames_inside_the_gap_are_skipped() {
        let base = Instant::now();
        let mut window = StabilityWindow::new(2);
        window.observe(ms(base, 0), RECT).unwrap();
        assert!(window.observe(ms(base, 5), RECT).is_none());
        assert!(window.observe(ms(base, 14), RECT).is_none());
        assert!(!window.observe(ms(base, 15), RECT).unwrap().stable);
        assert!(window.observe(ms(base, 31), RECT).unwrap().stable);
    }

    #[test]
    fn single_frame_waits_ignore_the_gap() {
        let base = Instant::now();
        let mut window = StabilityWindow::new(1);
        window.observe(ms(base, 0), RECT).unwrap();
        assert!(window.observe(ms(base, 1), RECT).unwrap().stable);
    }

    #[test]
    fn movement_resets_the_counter() {
        let base = Instant::now();
        let moved = Rect { x: 11.0, ..RECT };
        let mut window = StabilityWindow::new(1);
        window.observe(ms(base, 0), RECT).unwrap();
        assert!(window.observe(ms(base, 16), RECT).unwrap().stable);

        let sample = window.observe(ms(base, 32), moved).unwrap();
        assert!(!sample.stable);
        assert!(!sample.stable_for_logs);
        assert!(window.observe(ms(base, 48), moved).unwrap().stable);
    }
}
