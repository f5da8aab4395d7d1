//! SOGI-PLL for single-phase inputs.
//!
//! The SOGI is a band-pass filter centred on the grid frequency that also
//! produces the quadrature signal, so a single measured voltage can feed
//! the Park transform of a synchronous reference frame PLL.

use core::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{check_sample_time, ConfigError, Result};
use crate::integrator::{ForwardEuler, Integrator};
use crate::pi::{PiConfig, PiController};
use crate::pll::{wrap_phase, PllResult, PllState, PI2};
use crate::sim::Step;
use crate::transform::{park, AlphaBeta};

/// SOGI generic over the integration method
#[derive(Debug, Clone)]
pub struct Sogi<I = ForwardEuler> {
    k: f32,
    integrator_1: I,
    integrator_2: I,
}

impl<I: Integrator> Sogi<I> {
    /// Create a new SOGI with a given k and sample time (used for the integrators)
    pub fn new(k: f32, sample_time: f32) -> Self {
        Self {
            k,
            integrator_1: I::new(sample_time),
            integrator_2: I::new(sample_time),
        }
    }

    /// Update the SOGI with a new voltage measurement, centred on `omega`.
    /// Returns the in-phase and quadrature components after the update.
    pub fn update(&mut self, v: f32, omega: f32) -> AlphaBeta {
        let x1 = self.integrator_1.value();
        let x2 = self.integrator_2.value();

        let e = v - x1;
        self.integrator_1.update(omega * (self.k * e - x2));
        self.integrator_2.update(omega * x1);

        self.output()
    }

    /// Current `(v_alpha, v_beta)`
    pub fn output(&self) -> AlphaBeta {
        AlphaBeta::new(self.integrator_1.value(), self.integrator_2.value())
    }

    pub fn reset(&mut self) {
        self.integrator_1.reset();
        self.integrator_2.reset();
    }
}

/// Configuration for the SOGI-PLL
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PllConfig {
    pub sample_time: f32,
    pub sogi_k: f32,
    pub pi_proportional_gain: f32,
    pub pi_integral_gain: f32,
    /// Nominal grid angular frequency, also the PI feed-forward term
    pub omega_zero: f32,
    /// Centre the SOGI on the PLL estimate instead of `omega_zero`
    pub frequency_adaptive: bool,
}

impl Default for PllConfig {
    /// 50 Hz grid sampled at 10 kHz
    fn default() -> Self {
        Self {
            sample_time: 1.0 / 10_000.0,
            sogi_k: 1.0,
            pi_proportional_gain: 20.0,
            pi_integral_gain: 5.0,
            omega_zero: 2.0 * PI * 50.0,
            frequency_adaptive: false,
        }
    }
}

impl PllConfig {
    pub fn validate(&self) -> Result<()> {
        check_sample_time(self.sample_time)?;
        let advance = self.omega_zero * self.sample_time;
        if !(-PI2 < advance && advance < PI2) {
            return Err(ConfigError::PhaseStepTooLarge(advance));
        }
        Ok(())
    }
}

/// SOGI-PLL implementation
#[derive(Debug, Clone)]
pub struct SogiPll<I = ForwardEuler> {
    config: PllConfig,
    sogi: Sogi<I>,
    pi: PiController,
    theta: f32,
    omega: f32,
}

impl<I: Integrator> SogiPll<I> {
    /// Create a new SOGI-PLL with a given configuration
    pub fn new(config: PllConfig) -> Self {
        log::debug!("SOGI-PLL created with {config:?}");

        Self {
            sogi: Sogi::new(config.sogi_k, config.sample_time),
            pi: PiController::new(PiConfig::new(
                config.pi_proportional_gain,
                config.pi_integral_gain,
            )),
            theta: 0.0,
            omega: config.omega_zero,
            config,
        }
    }

    /// Validate the configuration before creating the PLL
    pub fn try_new(config: PllConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Update the PLL with a new voltage measurement
    pub fn update(&mut self, v: f32) -> PllResult {
        let centre = if self.config.frequency_adaptive {
            self.omega
        } else {
            self.config.omega_zero
        };
        let ab = self.sogi.update(v, centre);

        let dq = park(ab, self.theta);

        let dt = self.config.sample_time;
        self.omega = self
            .pi
            .update_with_feedforward(dq.q, dt, self.config.omega_zero);
        self.theta = wrap_phase(self.theta + self.omega * dt);

        PllResult {
            v_alpha: ab.alpha,
            v_beta: ab.beta,
            vd: dq.d,
            vq: dq.q,
            pi_output: self.omega - self.config.omega_zero,
            omega: self.omega,
            theta: self.theta,
        }
    }

    pub fn state(&self) -> PllState {
        let ab = self.sogi.output();
        PllState {
            x1: ab.alpha,
            x2: ab.beta,
            theta: self.theta,
            omega: self.omega,
            integral_error: self.pi.integral(),
        }
    }

    pub fn config(&self) -> &PllConfig {
        &self.config
    }

    /// Return to the initial state: filters and integral cleared, phase at
    /// zero and frequency at nominal.
    pub fn reset(&mut self) {
        self.sogi.reset();
        self.pi.reset();
        self.theta = 0.0;
        self.omega = self.config.omega_zero;
    }
}

impl<I: Integrator> Step for SogiPll<I> {
    type Input = f32;
    type Output = PllResult;

    fn step(&mut self, input: f32) -> PllResult {
        self.update(input)
    }
}
