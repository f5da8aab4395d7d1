//! Configuration errors.
//!
//! Step functions never fail; everything that can be rejected is rejected
//! when a configuration is validated.

use thiserror::Error;

/// Error returned by the `validate` methods of the configuration records.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// Sample or integration time is zero, negative or not finite.
    #[error("sample time must be positive and finite, got {0}")]
    InvalidSampleTime(f32),

    /// A physical quantity that must be strictly positive is not.
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },

    /// Lower limit above upper limit.
    #[error("limits out of order: min {min} > max {max}")]
    InvertedLimits { min: f32, max: f32 },

    /// Duty cycle outside `[0, 1]`.
    #[error("duty cycle {0} outside [0, 1]")]
    DutyOutOfRange(f32),

    /// Nominal phase advance per step is a full turn or more, so a single
    /// wrap per step cannot keep the phase in range.
    #[error("nominal phase advance of {0} rad per step is a full turn or more")]
    PhaseStepTooLarge(f32),

    /// Switching period is shorter than one integration step.
    #[error("switching period of {period} s is shorter than the time step {time_step} s")]
    SwitchingPeriodTooShort { period: f32, time_step: f32 },

    /// Decimation by zero.
    #[error("decimation factor must be at least 1")]
    ZeroDecimation,
}

/// Shorthand for results carrying a [`ConfigError`].
pub type Result<T> = core::result::Result<T, ConfigError>;

pub(crate) fn check_sample_time(sample_time: f32) -> Result<()> {
    if sample_time.is_finite() && sample_time > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidSampleTime(sample_time))
    }
}

pub(crate) fn check_positive(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

pub(crate) fn check_limits(min: f32, max: f32) -> Result<()> {
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvertedLimits { min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_time_must_be_positive_and_finite() {
        assert!(check_sample_time(1e-4).is_ok());
        assert_eq!(check_sample_time(0.0), Err(ConfigError::InvalidSampleTime(0.0)));
        assert!(check_sample_time(f32::NAN).is_err());
        assert!(check_sample_time(f32::INFINITY).is_err());
    }

    #[test]
    fn positive_check_names_the_field() {
        match check_positive("inductance", -1.0) {
            Err(ConfigError::NonPositive { name, value }) => {
                assert_eq!(name, "inductance");
                assert_eq!(value, -1.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn limits_may_be_equal() {
        assert!(check_limits(0.5, 0.5).is_ok());
        assert!(check_limits(0.9, 0.1).is_err());
    }
}
