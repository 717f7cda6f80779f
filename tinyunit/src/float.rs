// SPDX-License-Identifier: Apache-2.0

//! Approximate floating-point equality based on ULP distance.
//!
//! Instead of a fixed epsilon, two values compare equal when their bit
//! patterns are at most [`MAX_ULPS`] representable steps apart in a
//! monotonic biased-integer ordering. The ordering maps negative
//! sign-magnitude patterns through two's-complement negation and sets the
//! sign bit on non-negative patterns, so adjacent floats map to adjacent
//! integers on either side of zero.

/// Maximum biased-integer distance at which two operands still compare equal.
pub const MAX_ULPS: u64 = 4;

/// Bit-level view of one comparison operand.
///
/// Width-independent: `sign_bit` is 31 for single precision and 63 for
/// double precision, and everything else is derived from it.
#[derive(Debug, Clone, Copy)]
pub struct FloatRepr {
    bits: u64,
    nan: bool,
    infinite: bool,
    negative: bool,
    sign_bit: u32,
}

impl FloatRepr {
    /// Build the representation of a single-precision operand.
    pub fn single(value: f32) -> Self {
        Self {
            bits: u64::from(value.to_bits()),
            nan: value.is_nan(),
            infinite: value.is_infinite(),
            negative: value.is_sign_negative(),
            sign_bit: 31,
        }
    }

    /// Build the representation of a double-precision operand.
    pub fn double(value: f64) -> Self {
        Self {
            bits: value.to_bits(),
            nan: value.is_nan(),
            infinite: value.is_infinite(),
            negative: value.is_sign_negative(),
            sign_bit: 63,
        }
    }

    /// Map the sign-magnitude pattern to the monotonic biased ordering.
    fn biased(&self) -> u64 {
        let sign = 1u64 << self.sign_bit;
        let mask = sign | (sign - 1);
        if self.negative {
            self.bits.wrapping_neg() & mask
        } else {
            self.bits | sign
        }
    }
}

/// ULP-distance equality over two operands of the same width.
///
/// NaN is never equal to anything, including itself. Operands that differ
/// in infiniteness or in sign are never equal; in particular
/// `+0.0 != -0.0`, which is by design rather than a bug.
pub fn almost_equal(a: FloatRepr, b: FloatRepr) -> bool {
    if a.nan || b.nan {
        return false;
    }
    if a.infinite != b.infinite || a.negative != b.negative {
        return false;
    }
    a.biased().abs_diff(b.biased()) <= MAX_ULPS
}

/// Single-precision convenience wrapper around [`almost_equal`].
pub fn float_eq(a: f32, b: f32) -> bool {
    almost_equal(FloatRepr::single(a), FloatRepr::single(b))
}

/// Double-precision convenience wrapper around [`almost_equal`].
pub fn double_eq(a: f64, b: f64) -> bool {
    almost_equal(FloatRepr::double(a), FloatRepr::double(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflexive_for_finite_values() {
        for &x in &[0.0f32, 1.0, -1.0, 1.5e-38, f32::MIN_POSITIVE, 3.4e38, -2.7e-20] {
            assert!(float_eq(x, x));
        }
        for &x in &[0.0f64, 1.0, -1.0, 2.2e-308, f64::MIN_POSITIVE, 1.7e308] {
            assert!(double_eq(x, x));
        }
    }

    #[test]
    fn symmetric() {
        let pairs = [(1.0f32, 1.0 + f32::EPSILON), (0.1, 0.1000001), (5.0, -5.0)];
        for &(a, b) in &pairs {
            assert_eq!(float_eq(a, b), float_eq(b, a));
        }
    }

    #[test]
    fn nan_is_never_equal() {
        assert!(!float_eq(f32::NAN, f32::NAN));
        assert!(!float_eq(f32::NAN, 1.0));
        assert!(!double_eq(f64::NAN, f64::NAN));
    }

    #[test]
    fn signed_zeros_differ() {
        assert!(!float_eq(0.0, -0.0));
        assert!(!double_eq(0.0, -0.0));
        assert!(float_eq(0.0, 0.0));
        assert!(float_eq(-0.0, -0.0));
    }

    #[test]
    fn infinities() {
        assert!(float_eq(f32::INFINITY, f32::INFINITY));
        assert!(!float_eq(f32::INFINITY, f32::NEG_INFINITY));
        assert!(!float_eq(f32::INFINITY, f32::MAX));
        assert!(double_eq(f64::NEG_INFINITY, f64::NEG_INFINITY));
    }

    #[test]
    fn single_precision_boundary_at_four_ulps() {
        let base = 1.0f32;
        let four = f32::from_bits(base.to_bits() + 4);
        let five = f32::from_bits(base.to_bits() + 5);
        assert!(float_eq(base, four));
        assert!(!float_eq(base, five));
    }

    #[test]
    fn double_precision_boundary_at_four_ulps() {
        let base = -2.5f64;
        let four = f64::from_bits(base.to_bits() + 4);
        let five = f64::from_bits(base.to_bits() + 5);
        assert!(double_eq(base, four));
        assert!(!double_eq(base, five));
    }

    #[test]
    fn near_zero_same_sign_is_close() {
        // Smallest positive subnormal is one biased step away from +0.0.
        let tiny = f32::from_bits(1);
        assert!(float_eq(0.0, tiny));
        let tiny_neg = f32::from_bits(0x8000_0001);
        assert!(float_eq(-0.0, tiny_neg));
        // Crossing zero changes sign, so the comparison refuses outright.
        assert!(!float_eq(tiny, tiny_neg));
    }

    #[test]
    fn accumulated_rounding_stays_within_tolerance() {
        let step = 0.1f32;
        let mut sum = 0.0f32;
        for _ in 0..10 {
            sum += step;
        }
        let product = step * 10.0;
        assert!(float_eq(sum, product));
        assert_ne!(sum.to_bits(), product.to_bits());
    }
}
