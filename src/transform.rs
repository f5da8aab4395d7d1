//! Clarke and Park reference frame transforms.

use micromath::F32Ext;

use crate::math;

const FRAC_1_SQRT_3: f32 = 0.577_350_26;

/// Stationary orthogonal frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AlphaBeta {
    pub alpha: f32,
    pub beta: f32,
}

impl AlphaBeta {
    pub fn new(alpha: f32, beta: f32) -> Self {
        Self { alpha, beta }
    }

    /// Length of the space vector
    pub fn magnitude(&self) -> f32 {
        math::sqrt(self.alpha * self.alpha + self.beta * self.beta)
    }
}

/// Rotating frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Dq {
    pub d: f32,
    pub q: f32,
}

/// Three-phase stationary frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Abc {
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

/// Amplitude invariant Clarke transform
pub fn clarke(abc: Abc) -> AlphaBeta {
    AlphaBeta {
        alpha: (2.0 * abc.a - abc.b - abc.c) / 3.0,
        beta: (abc.b - abc.c) * FRAC_1_SQRT_3,
    }
}

/// Park transform onto a frame rotated by `theta`
pub fn park(ab: AlphaBeta, theta: f32) -> Dq {
    let (sin, cos) = theta.sin_cos();
    Dq {
        d: ab.alpha * cos + ab.beta * sin,
        q: -ab.alpha * sin + ab.beta * cos,
    }
}

/// Inverse Park transform
pub fn inverse_park(dq: Dq, theta: f32) -> AlphaBeta {
    let (sin, cos) = theta.sin_cos();
    AlphaBeta {
        alpha: dq.d * cos - dq.q * sin,
        beta: dq.d * sin + dq.q * cos,
    }
}
