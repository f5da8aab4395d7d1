//! Pieces shared by the phase-locked loops.

use core::f32::consts::{FRAC_1_SQRT_2, PI};

use crate::math;

pub(crate) const PI2: f32 = PI * 2.0;

/// Wrap a phase angle into `[0, 2π)` with a single correction.
///
/// One turn is subtracted at or above `2π` and added below zero, which is
/// exact as long as the angle moved by less than a turn since it was last
/// wrapped. An addition that rounds onto `2π` yields `0`.
pub fn wrap_phase(theta: f32) -> f32 {
    let wrapped = if theta >= PI2 {
        theta - PI2
    } else if theta < 0.0 {
        theta + PI2
    } else {
        theta
    };

    if (0.0..PI2).contains(&wrapped) {
        wrapped
    } else {
        0.0
    }
}

/// Result returned by the PLLs on every step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PllResult {
    pub v_alpha: f32,
    pub v_beta: f32,
    pub vd: f32,
    pub vq: f32,
    /// PI controller output before the feed-forward term
    pub pi_output: f32,
    /// Estimated angular frequency in rad/s
    pub omega: f32,
    /// Estimated phase in `[0, 2π)`
    pub theta: f32,
}

impl PllResult {
    pub fn v_rms(&self) -> f32 {
        FRAC_1_SQRT_2 * math::sqrt(self.v_alpha * self.v_alpha + self.v_beta * self.v_beta)
    }

    /// Estimated frequency in Hz
    pub fn frequency(&self) -> f32 {
        self.omega / PI2
    }
}

/// Snapshot of the loop state carried between steps
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PllState {
    /// In-phase filter state (SOGI only)
    pub x1: f32,
    /// Quadrature filter state (SOGI only)
    pub x2: f32,
    pub theta: f32,
    pub omega: f32,
    pub integral_error: f32,
}
