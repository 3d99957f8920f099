use core::mem::size_of;

use crate::codec::{
    F32_BYTES, F64_BYTES, deserialize_f32, deserialize_f64, serialize_f32, serialize_f64,
};

/// Operand type selected by an opcode's suffix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
}

impl Kind {
    /// Slot order used by the opcode table for every ten-slot family.
    pub const SLOTS: [Kind; 10] = [
        Kind::U8,
        Kind::I8,
        Kind::U16,
        Kind::I16,
        Kind::U32,
        Kind::I32,
        Kind::U64,
        Kind::I64,
        Kind::F32,
        Kind::F64,
    ];

    pub const fn width(self) -> Width {
        match self {
            Kind::U8 | Kind::I8 => Width::W8,
            Kind::U16 | Kind::I16 => Width::W16,
            Kind::U32 | Kind::I32 | Kind::F32 => Width::W32,
            Kind::U64 | Kind::I64 | Kind::F64 => Width::W64,
        }
    }
}

/// Unsigned operand width used by the bit, address and stack opcodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Width {
    W8,
    W16,
    W32,
    W64,
}

impl Width {
    pub const SLOTS: [Width; 4] = [Width::W8, Width::W16, Width::W32, Width::W64];

    pub const fn bytes(self) -> usize {
        match self {
            Width::W8 => 1,
            Width::W16 => 2,
            Width::W32 => 4,
            Width::W64 => 8,
        }
    }

    pub const fn bits(self) -> u32 {
        match self {
            Width::W8 => u8::BITS,
            Width::W16 => u16::BITS,
            Width::W32 => u32::BITS,
            Width::W64 => u64::BITS,
        }
    }

    /// All ones in the low `bits()` bits.
    pub const fn mask(self) -> u64 {
        match self {
            Width::W8 => u8::MAX as u64,
            Width::W16 => u16::MAX as u64,
            Width::W32 => u32::MAX as u64,
            Width::W64 => u64::MAX,
        }
    }
}

/// A value that can live on the byte stack.
///
/// `to_stack` yields the bytes in push order (most significant first) and
/// `from_stack` rebuilds the value from the same order.
pub trait Scalar: Copy + PartialOrd + core::fmt::Debug {
    type Bytes: AsRef<[u8]> + AsMut<[u8]> + Default;
    const WIDTH: Width;

    fn to_stack(self) -> Self::Bytes;
    fn from_stack(bytes: Self::Bytes) -> Self;
}

macro_rules! integer_scalar {
    ($($ty:ty => $width:ident),* $(,)?) => {$(
        impl Scalar for $ty {
            type Bytes = [u8; size_of::<$ty>()];
            const WIDTH: Width = Width::$width;

            fn to_stack(self) -> Self::Bytes {
                self.to_be_bytes()
            }

            fn from_stack(bytes: Self::Bytes) -> Self {
                <$ty>::from_be_bytes(bytes)
            }
        }
    )*};
}

integer_scalar!(
    u8 => W8,
    i8 => W8,
    u16 => W16,
    i16 => W16,
    u32 => W32,
    i32 => W32,
    u64 => W64,
    i64 => W64,
);

impl Scalar for f32 {
    type Bytes = [u8; F32_BYTES];
    const WIDTH: Width = Width::W32;

    fn to_stack(self) -> Self::Bytes {
        serialize_f32(self)
    }

    fn from_stack(bytes: Self::Bytes) -> Self {
        deserialize_f32(bytes)
    }
}

impl Scalar for f64 {
    type Bytes = [u8; F64_BYTES];
    const WIDTH: Width = Width::W64;

    fn to_stack(self) -> Self::Bytes {
        serialize_f64(self)
    }

    fn from_stack(bytes: Self::Bytes) -> Self {
        deserialize_f64(bytes)
    }
}

/// Arithmetic contract of one operand type.
///
/// `Wide` is the result type of ADD, SUB and MUL: the next wider integer of
/// the same signedness below 64 bits, the type itself otherwise. Integer
/// results wrap in `Wide`. `divide` and `remainder` return `None` on a zero
/// divisor and never promote.
pub trait Arithmetic: Scalar {
    type Wide: Scalar;

    fn promoted_add(self, rhs: Self) -> Self::Wide;
    fn promoted_sub(self, rhs: Self) -> Self::Wide;
    fn promoted_mul(self, rhs: Self) -> Self::Wide;
    fn divide(self, rhs: Self) -> Option<Self>;
    fn remainder(self, rhs: Self) -> Option<Self>;
}

macro_rules! integer_arithmetic {
    ($($ty:ty => $wide:ty),* $(,)?) => {$(
        impl Arithmetic for $ty {
            type Wide = $wide;

            fn promoted_add(self, rhs: Self) -> $wide {
                <$wide>::from(self).wrapping_add(<$wide>::from(rhs))
            }

            fn promoted_sub(self, rhs: Self) -> $wide {
                <$wide>::from(self).wrapping_sub(<$wide>::from(rhs))
            }

            fn promoted_mul(self, rhs: Self) -> $wide {
                <$wide>::from(self).wrapping_mul(<$wide>::from(rhs))
            }

            // Past the zero check only MIN / -1 overflows: the quotient
            // wraps to MIN and the remainder is 0.
            fn divide(self, rhs: Self) -> Option<Self> {
                if rhs == 0 {
                    return None;
                }
                Some(self.checked_div(rhs).unwrap_or(self))
            }

            fn remainder(self, rhs: Self) -> Option<Self> {
                if rhs == 0 {
                    return None;
                }
                Some(self.checked_rem(rhs).unwrap_or(0))
            }
        }
    )*};
}

integer_arithmetic!(
    u8 => u16,
    i8 => i16,
    u16 => u32,
    i16 => i32,
    u32 => u64,
    i32 => i64,
    u64 => u64,
    i64 => i64,
);

macro_rules! float_arithmetic {
    ($($ty:ty),* $(,)?) => {$(
        impl Arithmetic for $ty {
            type Wide = $ty;

            fn promoted_add(self, rhs: Self) -> $ty {
                self + rhs
            }

            fn promoted_sub(self, rhs: Self) -> $ty {
                self - rhs
            }

            fn promoted_mul(self, rhs: Self) -> $ty {
                self * rhs
            }

            fn divide(self, rhs: Self) -> Option<Self> {
                Some(self / rhs)
            }

            // The opcode table has no float MOD; kept for a total impl.
            fn remainder(self, rhs: Self) -> Option<Self> {
                Some(self % rhs)
            }
        }
    )*};
}

float_arithmetic!(f32, f64);
