//! The opcode table.
//!
//! Opcode values are the bytecode wire format and never change. Each opcode
//! decodes into an [`Instruction`]: an operation family plus the operand
//! [`Kind`] or [`Width`] its suffix names.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::scalar::{Kind, Width};

use Comparison as C;
use Instruction as I;
use Kind as K;
use Width as W;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Neq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl Comparison {
    pub fn holds<T: PartialOrd>(self, lhs: T, rhs: T) -> bool {
        match self {
            Comparison::Eq => lhs == rhs,
            Comparison::Neq => lhs != rhs,
            Comparison::Lt => lhs < rhs,
            Comparison::LtEq => lhs <= rhs,
            Comparison::Gt => lhs > rhs,
            Comparison::GtEq => lhs >= rhs,
        }
    }
}

/// Decoded form of an opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    Add(Kind),
    Sub(Kind),
    Mul(Kind),
    Div(Kind),
    Mod(Kind),
    Compare(Comparison, Kind),
    And,
    Or,
    Xor,
    Not,
    BitAnd(Width),
    BitOr(Width),
    BitXor(Width),
    BitNot(Width),
    LeftShift(Width),
    RightShift(Width),
    Jump(Width),
    JumpIf(Width),
    Push(Width),
    Pop(Width),
    Load(Width),
    Store(Width),
    Call(Width),
    Ret(Width),
    Argc,
    Arg,
    Halt,
    Syscall,
}

macro_rules! opcode_table {
    ($($name:ident = $value:literal => $instruction:expr,)*) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
        #[repr(u8)]
        pub enum Opcode {
            $($name = $value,)*
        }

        impl Opcode {
            pub const ALL: &'static [Opcode] = &[$(Opcode::$name,)*];

            pub const fn instruction(self) -> Instruction {
                match self {
                    $(Opcode::$name => $instruction,)*
                }
            }
        }
    };
}

opcode_table! {
    AddU8         = 0x01 => I::Add(K::U8),
    AddI8         = 0x02 => I::Add(K::I8),
    AddU16        = 0x03 => I::Add(K::U16),
    AddI16        = 0x04 => I::Add(K::I16),
    AddU32        = 0x05 => I::Add(K::U32),
    AddI32        = 0x06 => I::Add(K::I32),
    AddU64        = 0x07 => I::Add(K::U64),
    AddI64        = 0x08 => I::Add(K::I64),
    AddF32        = 0x09 => I::Add(K::F32),
    AddF64        = 0x0A => I::Add(K::F64),
    SubU8         = 0x0B => I::Sub(K::U8),
    SubI8         = 0x0C => I::Sub(K::I8),
    SubU16        = 0x0D => I::Sub(K::U16),
    SubI16        = 0x0E => I::Sub(K::I16),
    SubU32        = 0x0F => I::Sub(K::U32),
    SubI32        = 0x10 => I::Sub(K::I32),
    SubU64        = 0x11 => I::Sub(K::U64),
    SubI64        = 0x12 => I::Sub(K::I64),
    SubF32        = 0x13 => I::Sub(K::F32),
    SubF64        = 0x14 => I::Sub(K::F64),
    MulU8         = 0x15 => I::Mul(K::U8),
    MulI8         = 0x16 => I::Mul(K::I8),
    MulU16        = 0x17 => I::Mul(K::U16),
    MulI16        = 0x18 => I::Mul(K::I16),
    MulU32        = 0x19 => I::Mul(K::U32),
    MulI32        = 0x1A => I::Mul(K::I32),
    MulU64        = 0x1B => I::Mul(K::U64),
    MulI64        = 0x1C => I::Mul(K::I64),
    MulF32        = 0x1D => I::Mul(K::F32),
    MulF64        = 0x1E => I::Mul(K::F64),
    DivU8         = 0x1F => I::Div(K::U8),
    DivI8         = 0x20 => I::Div(K::I8),
    DivU16        = 0x21 => I::Div(K::U16),
    DivI16        = 0x22 => I::Div(K::I16),
    DivU32        = 0x23 => I::Div(K::U32),
    DivI32        = 0x24 => I::Div(K::I32),
    DivU64        = 0x25 => I::Div(K::U64),
    DivI64        = 0x26 => I::Div(K::I64),
    DivF32        = 0x27 => I::Div(K::F32),
    DivF64        = 0x28 => I::Div(K::F64),
    ModU8         = 0x29 => I::Mod(K::U8),
    ModI8         = 0x2A => I::Mod(K::I8),
    ModU16        = 0x2B => I::Mod(K::U16),
    ModI16        = 0x2C => I::Mod(K::I16),
    ModU32        = 0x2D => I::Mod(K::U32),
    ModI32        = 0x2E => I::Mod(K::I32),
    ModU64        = 0x2F => I::Mod(K::U64),
    ModI64        = 0x30 => I::Mod(K::I64),
    EqU8          = 0x31 => I::Compare(C::Eq, K::U8),
    EqU16         = 0x33 => I::Compare(C::Eq, K::U16),
    EqU32         = 0x35 => I::Compare(C::Eq, K::U32),
    EqU64         = 0x37 => I::Compare(C::Eq, K::U64),
    EqF32         = 0x39 => I::Compare(C::Eq, K::F32),
    EqF64         = 0x3A => I::Compare(C::Eq, K::F64),
    NeqU8         = 0x3B => I::Compare(C::Neq, K::U8),
    NeqU16        = 0x3D => I::Compare(C::Neq, K::U16),
    NeqU32        = 0x3F => I::Compare(C::Neq, K::U32),
    NeqU64        = 0x41 => I::Compare(C::Neq, K::U64),
    NeqF32        = 0x43 => I::Compare(C::Neq, K::F32),
    NeqF64        = 0x44 => I::Compare(C::Neq, K::F64),
    LtU8          = 0x45 => I::Compare(C::Lt, K::U8),
    LtI8          = 0x46 => I::Compare(C::Lt, K::I8),
    LtU16         = 0x47 => I::Compare(C::Lt, K::U16),
    LtI16         = 0x48 => I::Compare(C::Lt, K::I16),
    LtU32         = 0x49 => I::Compare(C::Lt, K::U32),
    LtI32         = 0x4A => I::Compare(C::Lt, K::I32),
    LtU64         = 0x4B => I::Compare(C::Lt, K::U64),
    LtI64         = 0x4C => I::Compare(C::Lt, K::I64),
    LtF32         = 0x4D => I::Compare(C::Lt, K::F32),
    LtF64         = 0x4E => I::Compare(C::Lt, K::F64),
    LtEqU8        = 0x4F => I::Compare(C::LtEq, K::U8),
    LtEqI8        = 0x50 => I::Compare(C::LtEq, K::I8),
    LtEqU16       = 0x51 => I::Compare(C::LtEq, K::U16),
    LtEqI16       = 0x52 => I::Compare(C::LtEq, K::I16),
    LtEqU32       = 0x53 => I::Compare(C::LtEq, K::U32),
    LtEqI32       = 0x54 => I::Compare(C::LtEq, K::I32),
    LtEqU64       = 0x55 => I::Compare(C::LtEq, K::U64),
    LtEqI64       = 0x56 => I::Compare(C::LtEq, K::I64),
    LtEqF32       = 0x57 => I::Compare(C::LtEq, K::F32),
    LtEqF64       = 0x58 => I::Compare(C::LtEq, K::F64),
    GtU8          = 0x59 => I::Compare(C::Gt, K::U8),
    GtI8          = 0x5A => I::Compare(C::Gt, K::I8),
    GtU16         = 0x5B => I::Compare(C::Gt, K::U16),
    GtI16         = 0x5C => I::Compare(C::Gt, K::I16),
    GtU32         = 0x5D => I::Compare(C::Gt, K::U32),
    GtI32         = 0x5E => I::Compare(C::Gt, K::I32),
    GtU64         = 0x5F => I::Compare(C::Gt, K::U64),
    GtI64         = 0x60 => I::Compare(C::Gt, K::I64),
    GtF32         = 0x61 => I::Compare(C::Gt, K::F32),
    GtF64         = 0x62 => I::Compare(C::Gt, K::F64),
    GtEqU8        = 0x63 => I::Compare(C::GtEq, K::U8),
    GtEqI8        = 0x64 => I::Compare(C::GtEq, K::I8),
    GtEqU16       = 0x65 => I::Compare(C::GtEq, K::U16),
    GtEqI16       = 0x66 => I::Compare(C::GtEq, K::I16),
    GtEqU32       = 0x67 => I::Compare(C::GtEq, K::U32),
    GtEqI32       = 0x68 => I::Compare(C::GtEq, K::I32),
    GtEqU64       = 0x69 => I::Compare(C::GtEq, K::U64),
    GtEqI64       = 0x6A => I::Compare(C::GtEq, K::I64),
    GtEqF32       = 0x6B => I::Compare(C::GtEq, K::F32),
    GtEqF64       = 0x6C => I::Compare(C::GtEq, K::F64),
    And           = 0x6D => I::And,
    Or            = 0x6E => I::Or,
    Xor           = 0x6F => I::Xor,
    Not           = 0x70 => I::Not,
    BitAndU8      = 0x71 => I::BitAnd(W::W8),
    BitAndU16     = 0x72 => I::BitAnd(W::W16),
    BitAndU32     = 0x73 => I::BitAnd(W::W32),
    BitAndU64     = 0x74 => I::BitAnd(W::W64),
    BitOrU8       = 0x75 => I::BitOr(W::W8),
    BitOrU16      = 0x76 => I::BitOr(W::W16),
    BitOrU32      = 0x77 => I::BitOr(W::W32),
    BitOrU64      = 0x78 => I::BitOr(W::W64),
    BitXorU8      = 0x79 => I::BitXor(W::W8),
    BitXorU16     = 0x7A => I::BitXor(W::W16),
    BitXorU32     = 0x7B => I::BitXor(W::W32),
    BitXorU64     = 0x7C => I::BitXor(W::W64),
    BitNotU8      = 0x7D => I::BitNot(W::W8),
    BitNotU16     = 0x7E => I::BitNot(W::W16),
    BitNotU32     = 0x7F => I::BitNot(W::W32),
    BitNotU64     = 0x80 => I::BitNot(W::W64),
    LeftShiftU8   = 0x81 => I::LeftShift(W::W8),
    LeftShiftU16  = 0x82 => I::LeftShift(W::W16),
    LeftShiftU32  = 0x83 => I::LeftShift(W::W32),
    LeftShiftU64  = 0x84 => I::LeftShift(W::W64),
    RightShiftU8  = 0x85 => I::RightShift(W::W8),
    RightShiftU16 = 0x86 => I::RightShift(W::W16),
    RightShiftU32 = 0x87 => I::RightShift(W::W32),
    RightShiftU64 = 0x88 => I::RightShift(W::W64),
    JmpU8         = 0x89 => I::Jump(W::W8),
    JmpU16        = 0x8A => I::Jump(W::W16),
    JmpU32        = 0x8B => I::Jump(W::W32),
    JmpU64        = 0x8C => I::Jump(W::W64),
    JmpIfU8       = 0x8D => I::JumpIf(W::W8),
    JmpIfU16      = 0x8E => I::JumpIf(W::W16),
    JmpIfU32      = 0x8F => I::JumpIf(W::W32),
    JmpIfU64      = 0x90 => I::JumpIf(W::W64),
    PushU8        = 0x91 => I::Push(W::W8),
    PushU16       = 0x92 => I::Push(W::W16),
    PushU32       = 0x93 => I::Push(W::W32),
    PushU64       = 0x94 => I::Push(W::W64),
    PopU8         = 0x95 => I::Pop(W::W8),
    PopU16        = 0x96 => I::Pop(W::W16),
    PopU32        = 0x97 => I::Pop(W::W32),
    PopU64        = 0x98 => I::Pop(W::W64),
    LoadU8        = 0x99 => I::Load(W::W8),
    LoadU16       = 0x9A => I::Load(W::W16),
    LoadU32       = 0x9B => I::Load(W::W32),
    LoadU64       = 0x9C => I::Load(W::W64),
    StoreU8       = 0x9D => I::Store(W::W8),
    StoreU16      = 0x9E => I::Store(W::W16),
    StoreU32      = 0x9F => I::Store(W::W32),
    StoreU64      = 0xA0 => I::Store(W::W64),
    CallU8        = 0xA1 => I::Call(W::W8),
    CallU16       = 0xA2 => I::Call(W::W16),
    CallU32       = 0xA3 => I::Call(W::W32),
    CallU64       = 0xA4 => I::Call(W::W64),
    RetU8         = 0xA5 => I::Ret(W::W8),
    RetU16        = 0xA6 => I::Ret(W::W16),
    RetU32        = 0xA7 => I::Ret(W::W32),
    RetU64        = 0xA8 => I::Ret(W::W64),
    Argc          = 0xA9 => I::Argc,
    Arg           = 0xAA => I::Arg,
    Halt          = 0xAB => I::Halt,
    Syscall       = 0xAC => I::Syscall,
}
