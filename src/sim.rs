//! Fixed-step simulation harness.
//!
//! Every loop in the crate is a [`Step`]: an immutable configuration plus a
//! small state, advanced one input sample at a time. [`simulate`] runs a
//! stepper over an input sequence and collects what it returns.

use alloc::vec::Vec;

use crate::error::{check_sample_time, Result};

/// One discrete update of a simulated system
pub trait Step {
    type Input;
    type Output;

    /// Advance the state by one sample and return the logged outputs
    fn step(&mut self, input: Self::Input) -> Self::Output;
}

/// Run `stepper` over every input and collect the outputs.
pub fn simulate<S, I>(stepper: &mut S, inputs: I) -> Vec<S::Output>
where
    S: Step,
    I: IntoIterator<Item = S::Input>,
{
    let inputs = inputs.into_iter();
    let mut outputs = Vec::with_capacity(inputs.size_hint().0);
    outputs.extend(inputs.map(|input| stepper.step(input)));
    log::debug!("simulated {} steps", outputs.len());
    outputs
}

/// Fixed time step and number of steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeGrid {
    pub dt: f32,
    pub num_steps: usize,
}

impl TimeGrid {
    /// Grid covering `duration` seconds in steps of `dt`.
    ///
    /// The count is rounded so that durations which are whole multiples of
    /// `dt` do not lose their last step to floating point error.
    pub fn from_duration(duration: f32, dt: f32) -> Result<Self> {
        check_sample_time(dt)?;
        let num_steps = if duration > 0.0 {
            (duration / dt + 0.5) as usize
        } else {
            0
        };
        Ok(Self { dt, num_steps })
    }

    /// Time of step `n`
    pub fn time(&self, n: usize) -> f32 {
        n as f32 * self.dt
    }

    /// Times of all steps, starting at zero
    pub fn times(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.num_steps).map(move |n| self.time(n))
    }

    /// Same duration with a step `factor` times finer
    pub fn refined(&self, factor: usize) -> Self {
        Self {
            dt: self.dt / factor as f32,
            num_steps: self.num_steps * factor,
        }
    }

    pub fn duration(&self) -> f32 {
        self.time(self.num_steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    struct Accumulator(f32);

    impl Step for Accumulator {
        type Input = f32;
        type Output = f32;

        fn step(&mut self, input: f32) -> f32 {
            self.0 += input;
            self.0
        }
    }

    #[test]
    fn simulate_collects_every_output() {
        let mut acc = Accumulator(0.0);
        let out = simulate(&mut acc, vec![1.0, 2.0, 3.0]);
        assert_eq!(out, vec![1.0, 3.0, 6.0]);
        assert_eq!(acc.0, 6.0);
    }

    #[test]
    fn grid_rounds_step_count() {
        let grid = TimeGrid::from_duration(0.6, 1e-4).unwrap();
        assert_eq!(grid.num_steps, 6000);
        let grid = TimeGrid::from_duration(5e-3, 1e-7).unwrap();
        assert_eq!(grid.num_steps, 50_000);
    }

    #[test]
    fn refined_grid_keeps_duration() {
        let grid = TimeGrid::from_duration(1.0, 1e-4).unwrap();
        let fine = grid.refined(10);
        assert_eq!(fine.num_steps, 100_000);
        approx::assert_abs_diff_eq!(fine.duration(), grid.duration(), epsilon = 1e-4);
    }

    #[test]
    fn times_start_at_zero() {
        let grid = TimeGrid::from_duration(1e-3, 1e-4).unwrap();
        let times: alloc::vec::Vec<f32> = grid.times().collect();
        assert_eq!(times.len(), 10);
        assert_eq!(times[0], 0.0);
    }

    #[test]
    fn negative_step_is_rejected() {
        assert!(TimeGrid::from_duration(1.0, -1e-4).is_err());
    }
}
