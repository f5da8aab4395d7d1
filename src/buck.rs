//! Buck converter with an ideal synchronous switch.
//!
//! The inductor current and capacitor voltage are integrated with forward
//! Euler at a time step much finer than the switching period. In closed
//! loop a PI controller on the output voltage updates the duty cycle once
//! per switching period, at the start of the period.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{check_limits, check_positive, check_sample_time, ConfigError, Result};
use crate::pi::{PiConfig, PiController};
use crate::sim::Step;

/// Power stage component values
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BuckCircuit {
    /// Henry
    pub inductance: f32,
    /// Farad
    pub capacitance: f32,
    /// Ohm
    pub load_resistance: f32,
}

impl BuckCircuit {
    pub fn validate(&self) -> Result<()> {
        check_positive("inductance", self.inductance)?;
        check_positive("capacitance", self.capacitance)?;
        check_positive("load resistance", self.load_resistance)
    }
}

/// Switching frequency and integration step
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Switching {
    /// Hz
    pub frequency: f32,
    /// Integration step in seconds
    pub time_step: f32,
}

impl Default for Switching {
    /// 50 kHz switching integrated at 0.1 µs
    fn default() -> Self {
        Self {
            frequency: 50e3,
            time_step: 1e-7,
        }
    }
}

impl Switching {
    pub fn period(&self) -> f32 {
        1.0 / self.frequency
    }

    /// Integration steps per switching period, at least one
    pub fn steps_per_period(&self) -> u32 {
        ((self.period() / self.time_step + 0.5) as u32).max(1)
    }

    pub fn validate(&self) -> Result<()> {
        check_positive("switching frequency", self.frequency)?;
        check_sample_time(self.time_step)?;
        if self.period() < self.time_step {
            return Err(ConfigError::SwitchingPeriodTooShort {
                period: self.period(),
                time_step: self.time_step,
            });
        }
        Ok(())
    }
}

/// Output voltage controller
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BuckControllerConfig {
    pub kp: f32,
    pub ki: f32,
    pub duty_min: f32,
    pub duty_max: f32,
    /// Add the nominal duty `v_ref / v_in` to the PI output
    pub feedforward: bool,
    /// Hold the integral while the duty cycle sits on a limit
    pub anti_windup: bool,
}

impl Default for BuckControllerConfig {
    fn default() -> Self {
        Self {
            kp: 0.05,
            ki: 5.0,
            duty_min: 0.1,
            duty_max: 0.9,
            feedforward: true,
            anti_windup: false,
        }
    }
}

impl BuckControllerConfig {
    /// PI stage with the output clamped to the duty limits
    pub fn pi_config(&self) -> PiConfig {
        let config = PiConfig::new(self.kp, self.ki).with_limits(self.duty_min, self.duty_max);
        if self.anti_windup {
            config.with_anti_windup()
        } else {
            config
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_duty(self.duty_min)?;
        check_duty(self.duty_max)?;
        check_limits(self.duty_min, self.duty_max)
    }
}

fn check_duty(duty: f32) -> Result<()> {
    if (0.0..=1.0).contains(&duty) {
        Ok(())
    } else {
        Err(ConfigError::DutyOutOfRange(duty))
    }
}

/// How the duty cycle is set
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DutyControl {
    /// Fixed duty cycle
    Open { duty: f32 },
    /// PI regulation of the output voltage
    Closed(BuckControllerConfig),
}

/// Complete converter configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BuckConfig {
    pub circuit: BuckCircuit,
    pub switching: Switching,
    pub control: DutyControl,
}

impl BuckConfig {
    pub fn validate(&self) -> Result<()> {
        self.circuit.validate()?;
        self.switching.validate()?;
        match self.control {
            DutyControl::Open { duty } => check_duty(duty),
            DutyControl::Closed(controller) => controller.validate(),
        }
    }
}

/// Supply and reference voltage for one step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BuckInput {
    pub v_in: f32,
    /// Ignored in open loop
    pub v_ref: f32,
}

/// Converter state carried between steps
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BuckState {
    pub inductor_current: f32,
    pub capacitor_voltage: f32,
    pub integral_error: f32,
    pub duty_cycle: f32,
}

/// Values logged on every step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BuckSample {
    pub inductor_current: f32,
    pub capacitor_voltage: f32,
    pub switch_on: bool,
    pub duty_cycle: f32,
    /// Last controller error (held between controller updates)
    pub error: f32,
    /// Last PI output (held between controller updates)
    pub pi_output: f32,
    /// The controller ran on this step
    pub controller_updated: bool,
}

#[derive(Debug, Clone)]
pub struct BuckConverter {
    config: BuckConfig,
    steps_per_period: u32,
    state: BuckState,
    step_index: u64,
    pi: Option<PiController>,
    error: f32,
    pi_output: f32,
}

impl BuckConverter {
    pub fn new(config: BuckConfig) -> Self {
        log::debug!("buck converter created with {config:?}");

        let (duty_cycle, pi) = match config.control {
            DutyControl::Open { duty } => (duty, None),
            DutyControl::Closed(controller) => (
                controller.duty_min,
                Some(PiController::new(controller.pi_config())),
            ),
        };

        Self {
            steps_per_period: config.switching.steps_per_period(),
            state: BuckState {
                duty_cycle,
                ..Default::default()
            },
            step_index: 0,
            pi,
            error: 0.0,
            pi_output: 0.0,
            config,
        }
    }

    pub fn try_new(config: BuckConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn update(&mut self, input: BuckInput) -> BuckSample {
        let phase = (self.step_index % u64::from(self.steps_per_period)) as u32;
        self.step_index += 1;

        let controller_updated = phase == 0 && self.regulate(input);

        let switch_on = (phase as f32) < self.state.duty_cycle * self.steps_per_period as f32;

        let BuckCircuit {
            inductance,
            capacitance,
            load_resistance,
        } = self.config.circuit;
        let v_c = self.state.capacitor_voltage;
        let i_l = self.state.inductor_current;

        let di_l = if switch_on {
            (input.v_in - v_c) / inductance
        } else {
            -v_c / inductance
        };
        let dv_c = (i_l - v_c / load_resistance) / capacitance;

        let dt = self.config.switching.time_step;
        self.state.inductor_current += di_l * dt;
        self.state.capacitor_voltage += dv_c * dt;

        BuckSample {
            inductor_current: self.state.inductor_current,
            capacitor_voltage: self.state.capacitor_voltage,
            switch_on,
            duty_cycle: self.state.duty_cycle,
            error: self.error,
            pi_output: self.pi_output,
            controller_updated,
        }
    }

    /// Run the voltage controller. Returns false in open loop.
    fn regulate(&mut self, input: BuckInput) -> bool {
        let DutyControl::Closed(controller) = self.config.control else {
            return false;
        };
        let Some(pi) = self.pi.as_mut() else {
            return false;
        };

        let nominal = if controller.feedforward && input.v_in > 0.0 {
            input.v_ref / input.v_in
        } else {
            0.0
        };

        // The integral advances by one switching period per update
        self.error = input.v_ref - self.state.capacitor_voltage;
        let duty = pi.update_with_feedforward(self.error, self.config.switching.period(), nominal);
        self.pi_output = controller.kp * self.error + controller.ki * pi.integral();
        self.state.integral_error = pi.integral();
        self.state.duty_cycle = duty;

        log::trace!(
            "buck controller: error {} pi {} duty {}",
            self.error,
            self.pi_output,
            duty
        );
        if pi.is_saturated() {
            log::trace!("buck duty cycle saturated at {duty}");
        }
        true
    }

    pub fn state(&self) -> &BuckState {
        &self.state
    }

    pub fn config(&self) -> &BuckConfig {
        &self.config
    }

    pub fn steps_per_period(&self) -> u32 {
        self.steps_per_period
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }
}

impl Step for BuckConverter {
    type Input = BuckInput;
    type Output = BuckSample;

    fn step(&mut self, input: BuckInput) -> BuckSample {
        self.update(input)
    }
}
