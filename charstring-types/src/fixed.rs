//! 16.16 fixed-point numbers.

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// 32-bit signed fixed point number with 16 bits of fraction.
///
/// This is the numeric domain of the charstring operand stack. Integer
/// operands are converted on push, so every value on the stack, in the
/// transient array and in the current point shares this representation.
///
/// Unlike the primitive integer types, arithmetic never panics: every
/// operation saturates to `MIN` or `MAX` on overflow.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bytemuck", derive(bytemuck::Zeroable, bytemuck::Pod))]
#[repr(transparent)]
pub struct Fixed(i32);

impl Fixed {
    /// Minimum value.
    pub const MIN: Self = Self(i32::MIN);

    /// Maximum value.
    pub const MAX: Self = Self(i32::MAX);

    /// This type's smallest representable value
    pub const EPSILON: Self = Self(1);

    /// Zero.
    pub const ZERO: Self = Self(0);

    /// One.
    pub const ONE: Self = Self(1 << Self::FRACT_BITS);

    const FRACT_BITS: u32 = 16;
    const INT_MASK: i32 = !0 << Self::FRACT_BITS;
    const ROUND: i32 = 1 << (Self::FRACT_BITS - 1);

    /// Creates a new value from the raw 16.16 bit pattern.
    pub const fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    /// Returns the raw 16.16 bit pattern.
    pub const fn to_bits(self) -> i32 {
        self.0
    }

    /// Creates a fixed point value from an integer.
    ///
    /// Integers outside the 16-bit range wrap.
    pub const fn from_i32(value: i32) -> Self {
        Self(value.wrapping_shl(Self::FRACT_BITS))
    }

    /// Returns the value rounded to the nearest integer, with ties
    /// rounding up.
    pub const fn to_i32(self) -> i32 {
        self.0.saturating_add(Self::ROUND) >> Self::FRACT_BITS
    }

    /// Returns the nearest integer value.
    pub const fn round(self) -> Self {
        Self(self.0.saturating_add(Self::ROUND) & Self::INT_MASK)
    }

    /// Returns the largest integer less than or equal to the number.
    pub const fn floor(self) -> Self {
        Self(self.0 & Self::INT_MASK)
    }

    /// Returns the absolute value of the number.
    ///
    /// `Fixed::MIN` has no positive counterpart and saturates to `Fixed::MAX`.
    pub const fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// Returns the square root, or zero for negative values.
    pub fn sqrt(self) -> Self {
        if self.0 <= 0 {
            return Self::ZERO;
        }
        // sqrt(v / 2^16) * 2^16 == sqrt(v * 2^16)
        let radicand = (self.0 as u64) << Self::FRACT_BITS;
        Self(isqrt(radicand) as i32)
    }

    /// Saturating addition.
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Saturating subtraction.
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Creates a fixed point value from an `f64`.
    ///
    /// This operation is lossy; the float will be rounded to the nearest
    /// representable value.
    pub fn from_f64(x: f64) -> Self {
        // rounds half away from zero without relying on std float methods
        let bias = if x.is_sign_negative() { -0.5 } else { 0.5 };
        Self((x * Self::ONE.0 as f64 + bias) as _)
    }

    /// Returns the value as an `f64`.
    ///
    /// This operation is lossless: all representable values can be
    /// round-tripped.
    pub fn to_f64(self) -> f64 {
        let int = ((self.0 & Self::INT_MASK) >> Self::FRACT_BITS) as f64;
        let fract = (self.0 & !Self::INT_MASK) as f64 / Self::ONE.0 as f64;
        int + fract
    }
}

/// Integer square root (floor) by Newton iteration.
fn isqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    let mut x = n;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

fn saturate(value: i64) -> Fixed {
    Fixed(value.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
}

impl Add for Fixed {
    type Output = Self;
    #[inline(always)]
    fn add(self, other: Self) -> Self {
        self.saturating_add(other)
    }
}

impl AddAssign for Fixed {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Fixed {
    type Output = Self;
    #[inline(always)]
    fn sub(self, other: Self) -> Self {
        self.saturating_sub(other)
    }
}

impl SubAssign for Fixed {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Neg for Fixed {
    type Output = Self;
    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl Mul for Fixed {
    type Output = Self;
    /// Rounding multiplication, saturating on overflow.
    fn mul(self, other: Self) -> Self {
        let product = self.0 as i64 * other.0 as i64;
        saturate((product + Self::ROUND as i64) >> Self::FRACT_BITS)
    }
}

impl Div for Fixed {
    type Output = Self;
    /// Truncating division, saturating on overflow.
    ///
    /// Dividing a nonzero value by zero saturates toward the sign of the
    /// dividend and `0 / 0` is zero.
    fn div(self, other: Self) -> Self {
        if other.0 == 0 {
            return match self.0 {
                0 => Self::ZERO,
                n if n < 0 => Self::MIN,
                _ => Self::MAX,
            };
        }
        saturate(((self.0 as i64) << Self::FRACT_BITS) / other.0 as i64)
    }
}

impl From<i32> for Fixed {
    fn from(value: i32) -> Self {
        Self::from_i32(value)
    }
}

//hack: we can losslessly go to float, so use those fmt impls
impl std::fmt::Display for Fixed {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.to_f64(), f)
    }
}

impl std::fmt::Debug for Fixed {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.to_f64(), f)
    }
}
