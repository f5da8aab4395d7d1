//! Test signals fed to the loops.

use core::f32::consts::PI;

use alloc::vec::Vec;
use micromath::F32Ext;

use crate::error::{ConfigError, Result};
use crate::pll::{wrap_phase, PI2};
use crate::transform::AlphaBeta;

/// Sine wave with harmonics given as `(order, relative amplitude)`
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub amplitude: f32,
    /// Fundamental frequency in Hz
    pub frequency: f32,
    pub harmonics: Vec<(f32, f32)>,
}

impl Waveform {
    pub fn sine(amplitude: f32, frequency: f32) -> Self {
        Self {
            amplitude,
            frequency,
            harmonics: Vec::new(),
        }
    }

    pub fn with_harmonic(mut self, order: f32, relative_amplitude: f32) -> Self {
        self.harmonics.push((order, relative_amplitude));
        self
    }

    pub fn omega(&self) -> f32 {
        2.0 * PI * self.frequency
    }

    pub fn sample(&self, t: f32) -> f32 {
        let wt = self.omega() * t;
        let distortion: f32 = self
            .harmonics
            .iter()
            .map(|&(order, rel)| rel * (order * wt).sin())
            .sum();
        self.amplitude * (wt.sin() + distortion)
    }
}

/// Phase-continuous step from `f_initial` to `f_final` at `step_time`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyStep {
    pub amplitude: f32,
    pub f_initial: f32,
    pub f_final: f32,
    pub step_time: f32,
}

impl FrequencyStep {
    /// Unwrapped phase at `t`
    pub fn phase(&self, t: f32) -> f32 {
        if t < self.step_time {
            PI2 * self.f_initial * t
        } else {
            PI2 * (self.f_initial * self.step_time + self.f_final * (t - self.step_time))
        }
    }

    /// Phase at `t` reduced into `[0, 2π)`
    pub fn wrapped_phase(&self, t: f32) -> f32 {
        let phase = self.phase(t);
        wrap_phase(phase - PI2 * (phase / PI2).floor())
    }

    pub fn frequency(&self, t: f32) -> f32 {
        if t < self.step_time {
            self.f_initial
        } else {
            self.f_final
        }
    }

    /// Cosine on alpha and sine on beta, a space vector rotating at the
    /// current frequency
    pub fn alpha_beta(&self, t: f32) -> AlphaBeta {
        let (sin, cos) = self.phase(t).sin_cos();
        AlphaBeta::new(self.amplitude * cos, self.amplitude * sin)
    }
}

/// Keep every `every`-th sample, starting with the first.
pub fn decimate<T: Clone>(samples: &[T], every: usize) -> Result<Vec<T>> {
    if every == 0 {
        return Err(ConfigError::ZeroDecimation);
    }
    Ok(samples.iter().step_by(every).cloned().collect())
}
