//! # Complex Number Module
//!
//! A minimal complex value type for the direct Gabor/Fourier summations.
//!
//! Every operation returns a new value except the `+=` accumulate, which is
//! only meant for the running sums inside the transform loops.

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Complex number `re + i·im`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ComplexNumber {
    pub re: f64,
    pub im: f64,
}

impl ComplexNumber {
    pub const ZERO: ComplexNumber = ComplexNumber { re: 0.0, im: 0.0 };

    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Unit phasor `e^(i·phi)`.
    pub fn from_phase(phi: f64) -> Self {
        let (sin, cos) = phi.sin_cos();
        Self { re: cos, im: sin }
    }

    /// Adds `z` to the running value in place.
    pub fn add(&mut self, z: ComplexNumber) {
        self.re += z.re;
        self.im += z.im;
    }

    pub fn multiply(self, z: ComplexNumber) -> Self {
        Self {
            re: self.re * z.re - self.im * z.im,
            im: self.re * z.im + self.im * z.re,
        }
    }

    /// Scales both components by the real factor `r`.
    pub fn scale(self, r: f64) -> Self {
        Self {
            re: self.re * r,
            im: self.im * r,
        }
    }

    /// Divides both components by the real number `r`.
    ///
    /// This is a true division. The transform engine multiplies by `dt` with
    /// [`ComplexNumber::scale`] instead of dividing by `1 / dt`.
    pub fn divide(self, r: f64) -> Self {
        Self {
            re: self.re / r,
            im: self.im / r,
        }
    }

    /// Magnitude, that is `A` in `A·e^(i·phi)`.
    pub fn abs(self) -> f64 {
        self.re.hypot(self.im)
    }

    /// Phase, that is `phi` in `A·e^(i·phi)`, in `(-π, π]`.
    pub fn phase(self) -> f64 {
        self.im.atan2(self.re)
    }

    pub fn conj(self) -> Self {
        Self {
            re: self.re,
            im: -self.im,
        }
    }

    pub fn real(self) -> f64 {
        self.re
    }

    pub fn is_zero(self) -> bool {
        self.re == 0.0 && self.im == 0.0
    }
}

impl AddAssign for ComplexNumber {
    fn add_assign(&mut self, rhs: ComplexNumber) {
        self.add(rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const EPS: f64 = 1e-12;

    #[test]
    fn multiply_follows_complex_rules() {
        let a = ComplexNumber::new(1.0, 2.0);
        let b = ComplexNumber::new(3.0, -1.0);
        let p = a.multiply(b);
        assert!((p.re - 5.0).abs() < EPS);
        assert!((p.im - 5.0).abs() < EPS);
    }

    #[test]
    fn accumulate_mutates_in_place() {
        let mut acc = ComplexNumber::ZERO;
        for k in 0..4 {
            acc += ComplexNumber::new(k as f64, -(k as f64));
        }
        assert_eq!(acc, ComplexNumber::new(6.0, -6.0));
    }

    #[test]
    fn divide_is_a_true_division() {
        let z = ComplexNumber::new(4.0, -2.0).divide(2.0);
        assert_eq!(z, ComplexNumber::new(2.0, -1.0));
        assert_eq!(z.scale(2.0), ComplexNumber::new(4.0, -2.0));
    }

    #[test]
    fn polar_accessors() {
        let z = ComplexNumber::new(-1.0, 0.0);
        assert!((z.abs() - 1.0).abs() < EPS);
        assert!((z.phase() - PI).abs() < EPS);

        let w = ComplexNumber::from_phase(PI / 3.0);
        assert!((w.abs() - 1.0).abs() < EPS);
        assert!((w.phase() - PI / 3.0).abs() < EPS);
        assert!((w.conj().phase() + PI / 3.0).abs() < EPS);
        assert_eq!(w.real(), w.re);
    }
}
