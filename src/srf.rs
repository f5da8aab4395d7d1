//! Synchronous reference frame PLL for alpha-beta (or three-phase) inputs.

use core::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{check_sample_time, ConfigError, Result};
use crate::pi::{PiConfig, PiController};
use crate::pll::{wrap_phase, PllResult, PllState, PI2};
use crate::sim::Step;
use crate::transform::{clarke, park, Abc, AlphaBeta};

/// Configuration for the SRF-PLL
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SrfPllConfig {
    pub sample_time: f32,
    pub kp: f32,
    pub ki: f32,
    /// Added to the PI output to form the frequency estimate. Zero leaves the
    /// loop to find the frequency on its own.
    pub omega_feedforward: f32,
}

impl Default for SrfPllConfig {
    /// Gains wide enough to follow a 50 Hz to 100 Hz step at 10 kHz
    fn default() -> Self {
        Self {
            sample_time: 1e-4,
            kp: 225.0,
            ki: 10_000.0,
            omega_feedforward: 0.0,
        }
    }
}

impl SrfPllConfig {
    /// Same gains with the nominal grid frequency fed forward
    pub fn with_nominal_frequency(mut self, frequency: f32) -> Self {
        self.omega_feedforward = 2.0 * PI * frequency;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_sample_time(self.sample_time)?;
        let advance = self.omega_feedforward * self.sample_time;
        if !(-PI2 < advance && advance < PI2) {
            return Err(ConfigError::PhaseStepTooLarge(advance));
        }
        Ok(())
    }
}

/// SRF-PLL: Park transform at the estimated angle, PI on `vq`.
#[derive(Debug, Clone)]
pub struct SrfPll {
    config: SrfPllConfig,
    pi: PiController,
    theta: f32,
    omega: f32,
}

impl SrfPll {
    pub fn new(config: SrfPllConfig) -> Self {
        log::debug!("SRF-PLL created with {config:?}");

        Self {
            pi: PiController::new(PiConfig::new(config.kp, config.ki)),
            theta: 0.0,
            omega: config.omega_feedforward,
            config,
        }
    }

    pub fn try_new(config: SrfPllConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Update the PLL with one alpha-beta sample
    pub fn update(&mut self, ab: AlphaBeta) -> PllResult {
        let dq = park(ab, self.theta);

        // vq is the phase error driven to zero
        let dt = self.config.sample_time;
        let pi_output = self.pi.update(dq.q, dt);
        self.omega = self.config.omega_feedforward + pi_output;
        self.theta = wrap_phase(self.theta + self.omega * dt);

        PllResult {
            v_alpha: ab.alpha,
            v_beta: ab.beta,
            vd: dq.d,
            vq: dq.q,
            pi_output,
            omega: self.omega,
            theta: self.theta,
        }
    }

    /// Update the PLL with one three-phase sample
    pub fn update_abc(&mut self, abc: Abc) -> PllResult {
        self.update(clarke(abc))
    }

    pub fn state(&self) -> PllState {
        PllState {
            theta: self.theta,
            omega: self.omega,
            integral_error: self.pi.integral(),
            ..Default::default()
        }
    }

    pub fn config(&self) -> &SrfPllConfig {
        &self.config
    }

    pub fn reset(&mut self) {
        self.pi.reset();
        self.theta = 0.0;
        self.omega = self.config.omega_feedforward;
    }
}

impl Step for SrfPll {
    type Input = AlphaBeta;
    type Output = PllResult;

    fn step(&mut self, input: AlphaBeta) -> PllResult {
        self.update(input)
    }
}
