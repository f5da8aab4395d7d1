//! Continuous passive filters: frequency response and Tustin discretization.
//!
//! Transfer functions are kept in polynomial form with the coefficients of
//! the highest power of `s` first. The bilinear substitution
//! `s = (2/T)(z - 1)/(z + 1)` turns them into difference equations that are
//! run one sample at a time, the way a controller ISR would.

use core::f32::consts::PI;

use alloc::vec::Vec;
use micromath::F32Ext;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{check_positive, check_sample_time, Result};
use crate::math;
use crate::sim::Step;

/// One point of a Bode plot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodePoint {
    /// rad/s
    pub omega: f32,
    pub magnitude_db: f32,
    pub phase_deg: f32,
}

/// `a * b` for complex numbers as `(re, im)`
#[inline]
fn cmul(a: (f32, f32), b: (f32, f32)) -> (f32, f32) {
    (a.0 * b.0 - a.1 * b.1, a.0 * b.1 + a.1 * b.0)
}

#[inline]
fn mag2(a: (f32, f32)) -> f32 {
    a.0 * a.0 + a.1 * a.1
}

#[inline]
fn angle(a: (f32, f32)) -> f32 {
    a.1.atan2(a.0)
}

/// A continuous-time LTI system with a rational transfer function.
pub trait ContinuousSystem {
    /// Numerator evaluated at `s = jω`
    fn numerator_at(&self, omega: f32) -> (f32, f32);

    /// Denominator evaluated at `s = jω`
    fn denominator_at(&self, omega: f32) -> (f32, f32);

    /// `H(jω)` as `(re, im)`
    fn response(&self, omega: f32) -> (f32, f32) {
        let num = self.numerator_at(omega);
        let den = self.denominator_at(omega);
        let den_conj = (den.0, -den.1);
        let scaled = cmul(num, den_conj);
        let d = mag2(den);
        (scaled.0 / d, scaled.1 / d)
    }

    /// Magnitude in dB and phase in degrees at `omega`.
    ///
    /// The phase is the numerator angle minus the denominator angle, so a
    /// second order low-pass runs continuously from 0 to -180 degrees.
    fn bode(&self, omega: f32) -> BodePoint {
        let num = self.numerator_at(omega);
        let den = self.denominator_at(omega);
        BodePoint {
            omega,
            magnitude_db: 10.0 * (mag2(num) / mag2(den)).log10(),
            phase_deg: (angle(num) - angle(den)) * 180.0 / PI,
        }
    }

    fn bode_sweep<I>(&self, omegas: I) -> Vec<BodePoint>
    where
        I: IntoIterator<Item = f32>,
        Self: Sized,
    {
        omegas.into_iter().map(|omega| self.bode(omega)).collect()
    }
}

/// `(b0 s + b1) / (a0 s + a1)`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FirstOrderTf {
    pub num: [f32; 2],
    pub den: [f32; 2],
}

impl FirstOrderTf {
    /// Current drawn by a series R-L branch from the applied voltage, `1 / (Ls + R)`
    pub fn rl_admittance(resistance: f32, inductance: f32) -> Result<Self> {
        check_positive("inductance", inductance)?;
        Ok(Self {
            num: [0.0, 1.0],
            den: [inductance, resistance],
        })
    }

    /// Bilinear discretization at `sample_time`
    pub fn tustin(&self, sample_time: f32) -> Result<FirstOrderSection> {
        check_sample_time(sample_time)?;
        let k = 2.0 / sample_time;
        let [b0, b1] = self.num;
        let [a0, a1] = self.den;

        // (b0 k (z - 1) + b1 (z + 1)) / (a0 k (z - 1) + a1 (z + 1))
        let norm = a0 * k + a1;
        Ok(FirstOrderSection::new(
            [(b0 * k + b1) / norm, (b1 - b0 * k) / norm],
            (a1 - a0 * k) / norm,
        ))
    }
}

impl ContinuousSystem for FirstOrderTf {
    fn numerator_at(&self, omega: f32) -> (f32, f32) {
        (self.num[1], self.num[0] * omega)
    }

    fn denominator_at(&self, omega: f32) -> (f32, f32) {
        (self.den[1], self.den[0] * omega)
    }
}

/// `(b0 s² + b1 s + b2) / (a0 s² + a1 s + a2)`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SecondOrderTf {
    pub num: [f32; 3],
    pub den: [f32; 3],
}

impl SecondOrderTf {
    /// Series R-L feeding a capacitor, output across the capacitor:
    /// `1 / (LC s² + RC s + 1)`
    pub fn lc_low_pass(resistance: f32, inductance: f32, capacitance: f32) -> Result<Self> {
        check_positive("inductance", inductance)?;
        check_positive("capacitance", capacitance)?;
        Ok(Self {
            num: [0.0, 0.0, 1.0],
            den: [inductance * capacitance, resistance * capacitance, 1.0],
        })
    }

    /// `ω0² / (s² + 2ζω0 s + ω0²)`
    pub fn resonant_pole(omega_0: f32, zeta: f32) -> Result<Self> {
        check_positive("resonant frequency", omega_0)?;
        let w2 = omega_0 * omega_0;
        Ok(Self {
            num: [0.0, 0.0, w2],
            den: [1.0, 2.0 * zeta * omega_0, w2],
        })
    }

    /// Bilinear discretization at `sample_time`
    pub fn tustin(&self, sample_time: f32) -> Result<Biquad> {
        check_sample_time(sample_time)?;
        let k = 2.0 / sample_time;
        let k2 = k * k;

        // c0 k²(z - 1)² + c1 k(z² - 1) + c2 (z + 1)², by powers of z
        let expand = |[c0, c1, c2]: [f32; 3]| {
            [
                c0 * k2 + c1 * k + c2,
                2.0 * (c2 - c0 * k2),
                c0 * k2 - c1 * k + c2,
            ]
        };
        let b = expand(self.num);
        let a = expand(self.den);
        let norm = a[0];

        Ok(Biquad::new(
            [b[0] / norm, b[1] / norm, b[2] / norm],
            [a[1] / norm, a[2] / norm],
        ))
    }

    /// Undamped natural frequency `sqrt(a2 / a0)` in rad/s
    pub fn natural_frequency(&self) -> f32 {
        math::sqrt(self.den[2] / self.den[0])
    }
}

impl ContinuousSystem for SecondOrderTf {
    fn numerator_at(&self, omega: f32) -> (f32, f32) {
        let [c0, c1, c2] = self.num;
        (c2 - c0 * omega * omega, c1 * omega)
    }

    fn denominator_at(&self, omega: f32) -> (f32, f32) {
        let [c0, c1, c2] = self.den;
        (c2 - c0 * omega * omega, c1 * omega)
    }
}

/// `y(n) = b0 u(n) + b1 u(n-1) - a1 y(n-1)`
#[derive(Debug, Clone, PartialEq)]
pub struct FirstOrderSection {
    b: [f32; 2],
    a1: f32,
    u1: f32,
    y1: f32,
}

impl FirstOrderSection {
    pub fn new(b: [f32; 2], a1: f32) -> Self {
        Self {
            b,
            a1,
            u1: 0.0,
            y1: 0.0,
        }
    }

    pub fn update(&mut self, u: f32) -> f32 {
        let y = self.b[0] * u + self.b[1] * self.u1 - self.a1 * self.y1;
        self.u1 = u;
        self.y1 = y;
        y
    }

    pub fn coefficients(&self) -> ([f32; 2], f32) {
        (self.b, self.a1)
    }

    pub fn dc_gain(&self) -> f32 {
        (self.b[0] + self.b[1]) / (1.0 + self.a1)
    }

    pub fn reset(&mut self) {
        self.u1 = 0.0;
        self.y1 = 0.0;
    }
}

impl Step for FirstOrderSection {
    type Input = f32;
    type Output = f32;

    fn step(&mut self, input: f32) -> f32 {
        self.update(input)
    }
}

/// Direct form I biquad:
/// `y(n) = b0 u(n) + b1 u(n-1) + b2 u(n-2) - a1 y(n-1) - a2 y(n-2)`
#[derive(Debug, Clone, PartialEq)]
pub struct Biquad {
    b: [f32; 3],
    a: [f32; 2],
    u: [f32; 2],
    y: [f32; 2],
}

impl Biquad {
    pub fn new(b: [f32; 3], a: [f32; 2]) -> Self {
        Self {
            b,
            a,
            u: [0.0; 2],
            y: [0.0; 2],
        }
    }

    pub fn update(&mut self, u: f32) -> f32 {
        let y = self.b[0] * u + self.b[1] * self.u[0] + self.b[2] * self.u[1]
            - self.a[0] * self.y[0]
            - self.a[1] * self.y[1];

        self.u[1] = self.u[0];
        self.u[0] = u;
        self.y[1] = self.y[0];
        self.y[0] = y;
        y
    }

    /// `(b, [a1, a2])`, the leading denominator coefficient being 1
    pub fn coefficients(&self) -> ([f32; 3], [f32; 2]) {
        (self.b, self.a)
    }

    pub fn dc_gain(&self) -> f32 {
        (self.b[0] + self.b[1] + self.b[2]) / (1.0 + self.a[0] + self.a[1])
    }

    pub fn reset(&mut self) {
        self.u = [0.0; 2];
        self.y = [0.0; 2];
    }
}

impl Step for Biquad {
    type Input = f32;
    type Output = f32;

    fn step(&mut self, input: f32) -> f32 {
        self.update(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    const T: f32 = 200e-6;

    #[test]
    fn lc_tustin_matches_closed_form_difference_equation() {
        let (r, l, c) = (0.05, 1e-3, 500e-6);
        let mut biquad = SecondOrderTf::lc_low_pass(r, l, c)
            .unwrap()
            .tustin(T)
            .unwrap();

        // Closed form divided through by LC
        let k2 = (2.0 / T) * (2.0 / T);
        let lc = 1.0 / (l * c);
        let norm = k2 + 2.0 * r / (l * T) + lc;
        let mut u = [0.0f32; 3];
        let mut y = [0.0f32; 3];

        for n in 0..200 {
            u[0] = if n % 37 < 18 { 100.0 } else { -50.0 };
            y[0] = (lc * (u[0] + 2.0 * u[1] + u[2])
                - y[1] * (-2.0 * k2 + 2.0 * lc)
                - y[2] * (k2 - 2.0 * r / (l * T) + lc))
                / norm;

            let out = biquad.update(u[0]);
            assert_abs_diff_eq!(out, y[0], epsilon = 1e-2 * y[0].abs().max(1.0));

            u[2] = u[1];
            u[1] = u[0];
            y[2] = y[1];
            y[1] = y[0];
        }
    }

    #[test]
    fn rl_tustin_matches_trapezoidal_current() {
        let (r, l) = (1e-2, 1e-3);
        let section = FirstOrderTf::rl_admittance(r, l).unwrap().tustin(T).unwrap();
        let (b, a1) = section.coefficients();

        // i(n) = (T v(n) + T v(n-1) + (2L - TR) i(n-1)) / (2L + TR)
        let norm = 2.0 * l + T * r;
        assert_abs_diff_eq!(b[0], T / norm, epsilon = 1e-6);
        assert_abs_diff_eq!(b[1], T / norm, epsilon = 1e-6);
        assert_abs_diff_eq!(-a1, (2.0 * l - T * r) / norm, epsilon = 1e-6);
    }

    #[test]
    fn tustin_preserves_dc_gain() {
        let biquad = SecondOrderTf::resonant_pole(1000.0, 0.1)
            .unwrap()
            .tustin(T)
            .unwrap();
        assert_abs_diff_eq!(biquad.dc_gain(), 1.0, epsilon = 1e-3);

        let section = FirstOrderTf::rl_admittance(2.0, 1e-3)
            .unwrap()
            .tustin(T)
            .unwrap();
        assert_abs_diff_eq!(section.dc_gain(), 0.5, epsilon = 1e-3);
    }

    #[test]
    fn step_response_settles_at_dc_gain() {
        let mut biquad = SecondOrderTf::resonant_pole(1000.0, 0.7)
            .unwrap()
            .tustin(T)
            .unwrap();
        let mut y = 0.0;
        for _ in 0..500 {
            y = biquad.update(1.0);
        }
        assert_abs_diff_eq!(y, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn zero_input_stays_at_zero() {
        let mut biquad = SecondOrderTf::lc_low_pass(0.1, 0.01, 1e-3)
            .unwrap()
            .tustin(T)
            .unwrap();
        for _ in 0..100 {
            assert_eq!(biquad.update(0.0), 0.0);
        }
    }

    #[test]
    fn bode_of_resonant_pole() {
        let tf = SecondOrderTf::resonant_pole(1000.0, 0.1).unwrap();

        let dc = tf.bode(0.0);
        assert_abs_diff_eq!(dc.magnitude_db, 0.0, epsilon = 0.05);
        assert_abs_diff_eq!(dc.phase_deg, 0.0, epsilon = 0.5);

        // |H(jω0)| = 1 / (2ζ) = 5, about 14 dB, at -90 degrees
        let peak = tf.bode(1000.0);
        assert_abs_diff_eq!(peak.magnitude_db, 13.98, epsilon = 0.1);
        assert_abs_diff_eq!(peak.phase_deg, -90.0, epsilon = 1.0);

        // -40 dB per decade well above resonance
        let high = tf.bode(100_000.0);
        assert_abs_diff_eq!(high.magnitude_db, -80.0, epsilon = 0.2);
        assert!(high.phase_deg < -175.0 && high.phase_deg > -180.5);
    }

    #[test]
    fn response_matches_bode_magnitude() {
        let tf = SecondOrderTf::lc_low_pass(0.1, 0.01, 1e-3).unwrap();
        let h = tf.response(200.0);
        let db = 10.0 * mag2(h).log10();
        assert_abs_diff_eq!(db, tf.bode(200.0).magnitude_db, epsilon = 0.05);
    }

    #[test]
    fn sweep_covers_every_frequency() {
        let tf = SecondOrderTf::lc_low_pass(0.1, 0.01, 1e-3).unwrap();
        let points = tf.bode_sweep((1..=100).map(|n| n as f32 * 10.0));
        assert_eq!(points.len(), 100);
        assert_eq!(points[99].omega, 1000.0);
        assert!(points[99].magnitude_db < points[0].magnitude_db);
    }

    #[test]
    fn natural_frequency_of_lc() {
        let tf = SecondOrderTf::lc_low_pass(0.1, 0.01, 1e-4).unwrap();
        // 1 / sqrt(LC)
        assert_relative_eq!(tf.natural_frequency(), 1000.0, max_relative = 1e-3);

        let tf = SecondOrderTf::lc_low_pass(0.1, 0.01, 2e-4).unwrap();
        assert_relative_eq!(tf.natural_frequency(), 707.106_8, max_relative = 1e-3);
    }
}
