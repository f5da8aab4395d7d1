//! Discrete integrators used inside the SOGI.

/// A fixed-step discrete integrator.
pub trait Integrator {
    /// Create an integrator for the given sample time
    fn new(sample_time: f32) -> Self;

    /// Integrate one input sample
    fn update(&mut self, x: f32);

    /// Current value of the integral
    fn value(&self) -> f32;

    /// Clear the accumulated state
    fn reset(&mut self);
}

/// Explicit first-order (forward Euler) integrator: `acc += x * dt`.
#[derive(Debug, Clone)]
pub struct ForwardEuler {
    sample_time: f32,
    acc: f32,
}

impl Integrator for ForwardEuler {
    fn new(sample_time: f32) -> Self {
        Self {
            sample_time,
            acc: 0.0,
        }
    }

    fn update(&mut self, x: f32) {
        self.acc += x * self.sample_time;
    }

    fn value(&self) -> f32 {
        self.acc
    }

    fn reset(&mut self) {
        self.acc = 0.0;
    }
}

/// Third order integrator with weights 23, -16 and 5 over the last three
/// accumulator values.
#[derive(Debug, Clone)]
pub struct ThirdOrder {
    /// Gain is sample_time / 12
    integrator_gain: f32,
    z1: f32,
    z2: f32,
    z3: f32,
}

impl Integrator for ThirdOrder {
    fn new(sample_time: f32) -> Self {
        Self {
            integrator_gain: sample_time / 12.0,
            z1: 0.0,
            z2: 0.0,
            z3: 0.0,
        }
    }

    fn update(&mut self, x: f32) {
        self.z3 = self.z2;
        self.z2 = self.z1;
        self.z1 += x * self.integrator_gain;
    }

    fn value(&self) -> f32 {
        self.z1 * 23.0 - self.z2 * 16.0 + self.z3 * 5.0
    }

    fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
        self.z3 = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn euler_integrates_constant_linearly() {
        let mut int = ForwardEuler::new(0.01);
        for _ in 0..100 {
            int.update(2.0);
        }
        assert_relative_eq!(int.value(), 2.0, epsilon = 1e-4);
    }

    #[test]
    fn third_order_integrates_constant_with_half_step_lead() {
        // 23n - 16(n - 1) + 5(n - 2) = 12n + 6, so the value is dt * (n + 0.5)
        let mut int = ThirdOrder::new(0.01);
        for _ in 0..100 {
            int.update(1.0);
        }
        assert_relative_eq!(int.value(), 1.005, epsilon = 1e-4);
    }

    #[test]
    fn reset_clears_state() {
        let mut int = ThirdOrder::new(0.1);
        int.update(3.0);
        int.update(3.0);
        int.reset();
        assert_eq!(int.value(), 0.0);

        let mut int = ForwardEuler::new(0.1);
        int.update(3.0);
        int.reset();
        assert_eq!(int.value(), 0.0);
    }
}
