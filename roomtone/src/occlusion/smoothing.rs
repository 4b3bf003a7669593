//! First-order parameter smoothing
//!
//! Targets jump when a recompute fires; the audible value follows with an
//! exponential lag so parameter changes never step. The per-tick blend
//! factor is `1 - e^(-rate * dt)`, which makes convergence depend only on
//! elapsed wall-clock time, not on how that time was sliced into ticks.

use serde::{Deserialize, Serialize};

/// A value chasing a target through an exponential low-pass
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Smoothed {
    current: f32,
    target: f32,
}

impl Smoothed {
    /// Start with current and target both at `value`
    pub fn new(value: f32) -> Self {
        Self {
            current: value,
            target: value,
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Snap current straight to `value`, abandoning any chase in progress
    pub fn jump_to(&mut self, value: f32) {
        self.current = value;
        self.target = value;
    }

    /// Advance one tick and return the new current value
    pub fn advance(&mut self, rate: f32, dt: f32) -> f32 {
        let k = 1.0 - (-(rate * dt).max(0.0)).exp();
        self.current += (self.target - self.current) * k;
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_shrinks_every_tick() {
        let mut value = Smoothed::new(0.0);
        value.set_target(1.0);

        let mut previous_gap = 1.0f32;
        for _ in 0..30 {
            value.advance(10.0, 1.0 / 60.0);
            let gap = (value.target() - value.current()).abs();
            assert!(gap < previous_gap, "gap must strictly decrease");
            previous_gap = gap;
        }
    }

    #[test]
    fn one_second_at_rate_ten_converges() {
        let mut value = Smoothed::new(0.0);
        value.set_target(1.0);

        for _ in 0..60 {
            value.advance(10.0, 1.0 / 60.0);
        }
        // Remaining gap is e^-10 regardless of tick slicing
        assert!(value.current() >= 0.9999, "got {}", value.current());
        assert!(value.current() < 1.0);
    }

    #[test]
    fn slicing_does_not_change_convergence() {
        let mut coarse = Smoothed::new(0.0);
        coarse.set_target(1.0);
        coarse.advance(10.0, 1.0);

        let mut fine = Smoothed::new(0.0);
        fine.set_target(1.0);
        for _ in 0..1000 {
            fine.advance(10.0, 0.001);
        }

        assert!((coarse.current() - fine.current()).abs() < 0.001);
    }

    #[test]
    fn retarget_mid_flight_chases_the_new_value() {
        let mut value = Smoothed::new(1.0);
        value.set_target(0.0);
        for _ in 0..10 {
            value.advance(10.0, 1.0 / 60.0);
        }
        let mid = value.current();
        assert!(mid < 1.0 && mid > 0.0);

        value.set_target(1.0);
        value.advance(10.0, 1.0 / 60.0);
        assert!(value.current() > mid);
    }

    #[test]
    fn zero_dt_is_a_no_op() {
        let mut value = Smoothed::new(0.25);
        value.set_target(0.75);
        value.advance(10.0, 0.0);
        assert_eq!(value.current(), 0.25);
    }

    #[test]
    fn jump_to_snaps_both_ends() {
        let mut value = Smoothed::new(0.0);
        value.set_target(1.0);
        value.advance(10.0, 0.1);

        value.jump_to(0.5);
        assert_eq!(value.current(), 0.5);
        assert_eq!(value.target(), 0.5);
    }
}
