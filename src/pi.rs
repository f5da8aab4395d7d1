//! Proportional-integral controller with forward Euler integration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{check_limits, Result};

/// Gains and limits of a PI controller
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PiConfig {
    pub kp: f32,
    pub ki: f32,
    /// Output clamp as `(min, max)`, applied after the feed-forward term
    pub output_limits: Option<(f32, f32)>,
    /// Hold the integral while the output is saturated in the direction of the error
    pub anti_windup: bool,
}

impl PiConfig {
    /// Unbounded PI controller
    pub fn new(kp: f32, ki: f32) -> Self {
        Self {
            kp,
            ki,
            output_limits: None,
            anti_windup: false,
        }
    }

    /// Clamp the output into `[min, max]`
    pub fn with_limits(mut self, min: f32, max: f32) -> Self {
        self.output_limits = Some((min, max));
        self
    }

    /// Enable conditional integration while saturated
    pub fn with_anti_windup(mut self) -> Self {
        self.anti_windup = true;
        self
    }

    pub fn validate(&self) -> Result<()> {
        match self.output_limits {
            Some((min, max)) => check_limits(min, max),
            None => Ok(()),
        }
    }
}

/// PI controller state: the integral of the error and the last output.
#[derive(Debug, Clone)]
pub struct PiController {
    config: PiConfig,
    integral: f32,
    output: f32,
    saturated_high: bool,
    saturated_low: bool,
}

impl PiController {
    pub fn new(config: PiConfig) -> Self {
        Self {
            config,
            integral: 0.0,
            output: 0.0,
            saturated_high: false,
            saturated_low: false,
        }
    }

    /// Integrate the error over `dt` and return `kp * error + ki * integral`.
    pub fn update(&mut self, error: f32, dt: f32) -> f32 {
        self.update_with_feedforward(error, dt, 0.0)
    }

    /// Like [`PiController::update`], with a nominal term added before the
    /// output is clamped.
    pub fn update_with_feedforward(&mut self, error: f32, dt: f32, feedforward: f32) -> f32 {
        let winding_up = (self.saturated_high && error > 0.0) || (self.saturated_low && error < 0.0);
        if !(self.config.anti_windup && winding_up) {
            self.integral += error * dt;
        }

        let unclamped = feedforward + self.config.kp * error + self.config.ki * self.integral;

        self.output = match self.config.output_limits {
            Some((min, max)) => {
                self.saturated_high = unclamped >= max;
                self.saturated_low = unclamped <= min;
                unclamped.clamp(min, max)
            }
            None => unclamped,
        };

        self.output
    }

    /// Accumulated error integral
    pub fn integral(&self) -> f32 {
        self.integral
    }

    /// Last returned output
    pub fn output(&self) -> f32 {
        self.output
    }

    /// Whether the last output hit one of the limits
    pub fn is_saturated(&self) -> bool {
        self.saturated_high || self.saturated_low
    }

    pub fn config(&self) -> &PiConfig {
        &self.config
    }

    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.output = 0.0;
        self.saturated_high = false;
        self.saturated_low = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn proportional_only() {
        let mut pi = PiController::new(PiConfig::new(2.0, 0.0));
        assert_eq!(pi.update(5.0, 0.1), 10.0);
    }

    #[test]
    fn integral_accumulates_with_euler() {
        let mut pi = PiController::new(PiConfig::new(0.0, 1.0));
        pi.update(10.0, 0.1);
        assert_relative_eq!(pi.integral(), 1.0);
        pi.update(10.0, 0.1);
        assert_relative_eq!(pi.integral(), 2.0);
        assert_relative_eq!(pi.output(), 2.0);
    }

    #[test]
    fn feedforward_is_added_before_clamp() {
        let mut pi = PiController::new(PiConfig::new(1.0, 0.0).with_limits(0.1, 0.9));
        assert_relative_eq!(pi.update_with_feedforward(0.1, 1.0, 0.5), 0.6);
        assert_relative_eq!(pi.update_with_feedforward(1.0, 1.0, 0.5), 0.9);
        assert!(pi.is_saturated());
        assert_relative_eq!(pi.update_with_feedforward(-1.0, 1.0, 0.5), 0.1);
    }

    #[test]
    fn anti_windup_holds_integral_while_saturated() {
        let mut pi = PiController::new(PiConfig::new(0.0, 1.0).with_limits(-1.0, 1.0).with_anti_windup());
        for _ in 0..10 {
            pi.update(1.0, 1.0);
        }
        // The first update reaches the limit, the rest are held.
        assert_relative_eq!(pi.integral(), 1.0);
        assert!(pi.is_saturated());

        // Error of the opposite sign integrates straight away.
        pi.update(-0.5, 1.0);
        assert_relative_eq!(pi.integral(), 0.5);
    }

    #[test]
    fn without_anti_windup_integral_keeps_growing() {
        let mut pi = PiController::new(PiConfig::new(0.0, 1.0).with_limits(-1.0, 1.0));
        for _ in 0..10 {
            pi.update(1.0, 1.0);
        }
        assert_relative_eq!(pi.integral(), 10.0);
        assert_eq!(pi.output(), 1.0);
    }

    #[test]
    fn inverted_limits_are_rejected() {
        assert!(PiConfig::new(1.0, 1.0).with_limits(1.0, -1.0).validate().is_err());
    }
}
