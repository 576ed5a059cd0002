use crate::common::*;
use std::cmp::Ordering;
use std::fmt;
use std::ops;

/// A runtime numeric value. Integer arithmetic stays exact until it would
/// overflow or a fractional result forces a float.
#[derive(Debug, Copy, Clone)]
pub enum Number {
    Int(Int),
    Float(Float),
}

impl Number {
    pub const ZERO: Self = Self::Int(0);

    pub fn as_float(self) -> Float {
        match self {
            Self::Int(n) => n as Float,
            Self::Float(x) => x,
        }
    }

    /// Truncates toward zero. Used to resolve computed dice counts and
    /// side counts.
    pub fn trunc_int(self) -> Int {
        match self {
            Self::Int(n) => n,
            Self::Float(x) => x.trunc() as Int,
        }
    }

    pub fn apply(self, op: BinaryOperator, rhs: Self) -> Self {
        use BinaryOperator::*;

        match op {
            Add => self.checked(rhs, Int::checked_add, |a, b| a + b),
            Sub => self.checked(rhs, Int::checked_sub, |a, b| a - b),
            Mul => self.checked(rhs, Int::checked_mul, |a, b| a * b),
            // division is always performed on floats
            Div => Self::Float(self.as_float() / rhs.as_float()),
            Rem => self.checked(rhs, Int::checked_rem, |a, b| a % b),
            Pow => self.pow(rhs),
        }
    }

    /// Integer arithmetic when both sides are integers and the operation
    /// does not overflow, float arithmetic otherwise. An integer `x % 0`
    /// has no checked result and falls through to the float path, giving
    /// NaN rather than a panic.
    fn checked(
        self,
        rhs: Self,
        int_op: impl Fn(Int, Int) -> Option<Int>,
        float_op: impl Fn(Float, Float) -> Float,
    ) -> Self {
        if let (Self::Int(a), Self::Int(b)) = (self, rhs) {
            if let Some(n) = int_op(a, b) {
                return Self::Int(n);
            }
        }
        Self::Float(float_op(self.as_float(), rhs.as_float()))
    }

    fn pow(self, rhs: Self) -> Self {
        if let (Self::Int(base), Self::Int(exp)) = (self, rhs) {
            if let Ok(exp) = u32::try_from(exp) {
                if let Some(n) = base.checked_pow(exp) {
                    return Self::Int(n);
                }
            }
        }
        Self::Float(self.as_float().powf(rhs.as_float()))
    }

    pub fn apply_fn(self, func: Function) -> Self {
        match (func, self) {
            (Function::Abs, Self::Int(n)) => Self::Int(n.abs()),
            // integers are already whole
            (_, Self::Int(n)) => Self::Int(n),
            (Function::Floor, Self::Float(x)) => Self::Float(x.floor()),
            (Function::Ceil, Self::Float(x)) => Self::Float(x.ceil()),
            (Function::Round, Self::Float(x)) => Self::Float(x.round()),
            (Function::Abs, Self::Float(x)) => Self::Float(x.abs()),
        }
    }
}

impl From<Int> for Number {
    fn from(n: Int) -> Self {
        Self::Int(n)
    }
}

impl From<Float> for Number {
    fn from(x: Float) -> Self {
        Self::Float(x)
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.as_float() == other.as_float()
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_float().partial_cmp(&other.as_float())
    }
}

impl ops::Add for Number {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.apply(BinaryOperator::Add, rhs)
    }
}

impl ops::AddAssign for Number {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Float(x) => write!(f, "{}", x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BinaryOperator::*;

    #[test]
    fn test_int_arithmetic_stays_int() {
        assert_eq!(Number::Int(2).apply(Add, Number::Int(3)), Number::Int(5));
        assert_eq!(Number::Int(2).apply(Mul, Number::Int(3)), Number::Int(6));
        assert_eq!(Number::Int(7).apply(Rem, Number::Int(3)), Number::Int(1));
        assert!(matches!(
            Number::Int(2).apply(Sub, Number::Int(5)),
            Number::Int(-3)
        ));
    }

    #[test]
    fn test_division_is_float() {
        assert!(matches!(
            Number::Int(7).apply(Div, Number::Int(2)),
            Number::Float(x) if x == 3.5
        ));
        assert!(matches!(
            Number::Int(6).apply(Div, Number::Int(2)),
            Number::Float(x) if x == 3.0
        ));
    }

    #[test]
    fn test_overflow_falls_back_to_float() {
        let big = Number::Int(Int::MAX);
        assert!(matches!(big.apply(Add, Number::Int(1)), Number::Float(_)));
        assert!(matches!(big.apply(Mul, Number::Int(2)), Number::Float(_)));
    }

    #[test]
    fn test_rem_by_zero_is_nan() {
        match Number::Int(5).apply(Rem, Number::Int(0)) {
            Number::Float(x) => assert!(x.is_nan()),
            n => panic!("expected NaN, got {:?}", n),
        }
    }

    #[test]
    fn test_pow() {
        assert_eq!(Number::Int(2).apply(Pow, Number::Int(10)), Number::Int(1024));
        // negative exponents leave the integers
        assert!(matches!(
            Number::Int(2).apply(Pow, Number::Int(-1)),
            Number::Float(x) if x == 0.5
        ));
        assert!(matches!(
            Number::Float(4.0).apply(Pow, Number::Float(0.5)),
            Number::Float(x) if x == 2.0
        ));
    }

    #[test]
    fn test_functions() {
        assert_eq!(Number::Float(3.7).apply_fn(Function::Floor), Number::Float(3.0));
        assert_eq!(Number::Float(3.2).apply_fn(Function::Ceil), Number::Float(4.0));
        assert_eq!(Number::Float(3.5).apply_fn(Function::Round), Number::Float(4.0));
        assert_eq!(Number::Float(-2.5).apply_fn(Function::Abs), Number::Float(2.5));
        assert_eq!(Number::Int(-3).apply_fn(Function::Abs), Number::Int(3));
        assert_eq!(Number::Int(5).apply_fn(Function::Floor), Number::Int(5));
    }

    #[test]
    fn test_mixed_comparison() {
        assert_eq!(Number::Int(3), Number::Float(3.0));
        assert!(Number::Int(3) < Number::Float(3.5));
        assert!(Number::Float(2.5) < Number::Int(3));
    }

    #[test]
    fn test_trunc_int() {
        assert_eq!(Number::Float(2.9).trunc_int(), 2);
        assert_eq!(Number::Float(-2.9).trunc_int(), -2);
        assert_eq!(Number::Int(4).trunc_int(), 4);
    }
}
