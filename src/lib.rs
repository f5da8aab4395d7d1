//! Discrete-time power electronics control loops
//!
//! Fixed-step simulations of the loops found in grid-tied and DC-DC
//! converters:
//!
//! - [`SogiPll`]: SOGI-PLL for a single measured voltage
//! - [`SrfPll`]: synchronous reference frame PLL for alpha-beta or
//!   three-phase inputs
//! - [`BuckConverter`]: buck power stage, open loop or with a PI voltage
//!   controller running once per switching period
//! - [`filter`]: Bode response of passive filters and their Tustin
//!   discretization into biquads
//!
//! Every loop implements [`Step`], so a whole run is one call:
//!
//! ```rust
//! use pe_control::{simulate, PllConfig, SogiPll, Waveform, TimeGrid};
//!
//! let config = PllConfig::default();
//! let grid = TimeGrid::from_duration(0.2, config.sample_time).unwrap();
//! let input = Waveform::sine(1.0, 50.0).with_harmonic(3.0, 0.02);
//!
//! let mut pll: SogiPll = SogiPll::new(config);
//! let results = simulate(&mut pll, grid.times().map(|t| input.sample(t)));
//!
//! assert_eq!(results.len(), grid.num_steps);
//! ```
//!
//! SOGI-PLL parameters for a 50 Hz grid sampled at 10 kHz:
//!
//! ```text
//! sogi_k: 1.0
//! pi_proportional_gain: 20.0
//! pi_integral_gain: 5.0
//! ```
//!
//! All arithmetic is `f32` through `micromath`, as on the target MCU.

#![no_std]

extern crate alloc;

pub mod buck;
pub mod error;
pub mod filter;
pub mod integrator;
mod math;
pub mod pi;
pub mod pll;
pub mod signal;
pub mod sim;
pub mod sogi;
pub mod srf;
pub mod transform;

pub use buck::{
    BuckCircuit, BuckConfig, BuckControllerConfig, BuckConverter, BuckInput, BuckSample,
    BuckState, DutyControl, Switching,
};
pub use error::ConfigError;
pub use filter::{Biquad, BodePoint, ContinuousSystem, FirstOrderSection, FirstOrderTf, SecondOrderTf};
pub use integrator::{ForwardEuler, Integrator, ThirdOrder};
pub use pi::{PiConfig, PiController};
pub use pll::{wrap_phase, PllResult, PllState};
pub use signal::{decimate, FrequencyStep, Waveform};
pub use sim::{simulate, Step, TimeGrid};
pub use sogi::{PllConfig, Sogi, SogiPll};
pub use srf::{SrfPll, SrfPllConfig};
pub use transform::{clarke, inverse_park, park, Abc, AlphaBeta, Dq};
