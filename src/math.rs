//! Square root accurate to f32 precision.

use micromath::F32Ext;

/// `micromath`'s estimate refined with two Newton steps. Each step squares
/// the relative error, so a few percent becomes well under one ulp.
pub(crate) fn sqrt(x: f32) -> f32 {
    if x == 0.0 || (x.is_infinite() && x > 0.0) {
        return x;
    }
    if !(x > 0.0) {
        return f32::NAN;
    }

    let mut y = F32Ext::sqrt(x);
    for _ in 0..2 {
        y = 0.5 * (y + x / y);
    }
    y
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn matches_exact_roots() {
        for (x, root) in [(2.0, 1.414_213_5), (25.0, 5.0), (1e-6, 1e-3), (52_812.5, 229.810_57)] {
            assert_relative_eq!(sqrt(x), root, max_relative = 1e-5);
        }
    }

    #[test]
    fn edge_values() {
        assert_eq!(sqrt(0.0), 0.0);
        assert_eq!(sqrt(f32::INFINITY), f32::INFINITY);
        assert!(sqrt(-1.0).is_nan());
        assert!(sqrt(f32::NAN).is_nan());
    }
}
