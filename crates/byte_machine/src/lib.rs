#![no_std]

#![cfg_attr(
    not(test),
    deny(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::todo,
        clippy::unimplemented,
        clippy::indexing_slicing,
        clippy::string_slice,
        clippy::arithmetic_side_effects,
        clippy::panicking_unwrap,
        clippy::out_of_bounds_indexing,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
    )
)]
#![cfg_attr(not(test), warn(clippy::missing_panics_doc))]

//! A byte-addressed stack machine.
//!
//! A [`Machine`] executes a flat bytecode buffer against three regions:
//! `code`, borrowed from the embedder and never written; an operand `stack`
//! of raw bytes; and a flat variable `store`. Both owned regions are sized
//! once at construction and never grow.
//!
//! Types live in the opcode, not in the value. `ADD_u16` pops two 16-bit
//! values (two bytes each, most significant byte pushed first) and pushes a
//! 32-bit sum; `ADD_f` pops two IEEE singles encoded the same way. Calls keep
//! their bookkeeping on the operand stack itself, see [`frame`].
//!
//! Every fault is reported as a [`Fault`] from [`Machine::run`]. After a
//! fault the registers and buffers are left where the fault found them; call
//! [`Machine::reset`] before running again.
//!
//! [`Machine::new`] talks to the host kernel and exists only on Linux with
//! the `host-syscall` feature. [`Machine::sandboxed`] takes the same
//! arguments everywhere and refuses every syscall. [`Machine::with_host`]
//! accepts any [`SyscallHost`].
//!
//! A machine is driven by one thread at a time (`run` takes `&mut self`).
//! Separate machines share nothing and may run in parallel.

extern crate alloc;

use thiserror_no_std::Error;
use tracing::{debug, trace};

pub mod builder;
pub mod codec;
pub mod config;
pub mod frame;
pub mod opcode;
pub mod scalar;
pub mod stack;
pub mod store;
pub mod syscall;

pub use builder::{BuildError, CodeBuilder};
pub use config::MachineConfig;
pub use opcode::{Comparison, Instruction, Opcode};
pub use scalar::{Arithmetic, Kind, Scalar, Width};
pub use stack::OperandStack;
pub use store::VariableStore;
#[cfg(all(feature = "host-syscall", target_os = "linux"))]
pub use syscall::LibcHost;
pub use syscall::{DenySyscalls, MAX_SYSCALL_ARGS, SyscallHost};

use crate::frame::Frame;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    #[error("attempted operation would overflow the stack")]
    StackOverflow,
    #[error("attempted operation would underflow the stack")]
    StackUnderflow,
    #[error("store address {0} is out of bounds")]
    StoreOutOfBounds(u64),
    #[error("program counter {0} is outside the code")]
    CodeOutOfBounds(usize),
    #[error("jump target {0} is outside the code")]
    InvalidJumpTarget(u64),
    #[error("{0:?} with a zero divisor")]
    DivisionByZero(Opcode),
    #[error("syscall argument count {0} is not in 0..=5")]
    InvalidSyscallArity(u8),
    #[error("syscall {0} refused by the host")]
    SyscallDenied(u64),
    #[error("the byte {0} is not an opcode")]
    InvalidOpcode(u8),
    #[error("could not reserve {0} bytes")]
    AllocationFailure(usize),
    #[error("no call frame is active")]
    NoActiveFrame,
    #[error("argument {index} requested from a frame with {argc} arguments")]
    ArgumentOutOfRange { index: u8, argc: u8 },
    #[error("saved frame register {0} is not valid")]
    CorruptFrame(u64),
}

/// Snapshot of the machine registers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Registers {
    pub pc: usize,
    pub sp: usize,
    pub fp: usize,
}

enum Flow {
    Continue,
    Halt,
}

/// Expands `$body` once per operand kind with `$t` bound to the Rust type.
macro_rules! for_kind {
    ($kind:expr, $t:ident => $body:expr) => {
        match $kind {
            Kind::U8 => {
                type $t = u8;
                $body
            }
            Kind::I8 => {
                type $t = i8;
                $body
            }
            Kind::U16 => {
                type $t = u16;
                $body
            }
            Kind::I16 => {
                type $t = i16;
                $body
            }
            Kind::U32 => {
                type $t = u32;
                $body
            }
            Kind::I32 => {
                type $t = i32;
                $body
            }
            Kind::U64 => {
                type $t = u64;
                $body
            }
            Kind::I64 => {
                type $t = i64;
                $body
            }
            Kind::F32 => {
                type $t = f32;
                $body
            }
            Kind::F64 => {
                type $t = f64;
                $body
            }
        }
    };
}

#[derive(Debug)]
pub struct Machine<'c, H> {
    code: &'c [u8],
    stack: OperandStack,
    store: VariableStore,
    pc: usize,
    fp: usize,
    host: H,
}

#[cfg(all(feature = "host-syscall", target_os = "linux"))]
impl<'c> Machine<'c, LibcHost> {
    /// Machine whose SYSCALL opcode calls straight into the host kernel.
    pub fn new(
        code: &'c [u8],
        stack_capacity: usize,
        store_capacity: usize,
    ) -> Result<Self, Fault> {
        Self::with_host(
            code,
            MachineConfig::new(stack_capacity, store_capacity),
            LibcHost,
        )
    }
}

impl<'c> Machine<'c, DenySyscalls> {
    /// Machine whose SYSCALL opcode always faults with
    /// [`Fault::SyscallDenied`]. Available on every target and feature set,
    /// unlike [`Machine::new`].
    pub fn sandboxed(
        code: &'c [u8],
        stack_capacity: usize,
        store_capacity: usize,
    ) -> Result<Self, Fault> {
        Self::with_host(
            code,
            MachineConfig::new(stack_capacity, store_capacity),
            DenySyscalls,
        )
    }
}

impl<'c, H: SyscallHost> Machine<'c, H> {
    pub fn with_host(code: &'c [u8], config: MachineConfig, host: H) -> Result<Self, Fault> {
        let stack = OperandStack::with_capacity(config.stack_capacity)?;
        let store = VariableStore::with_capacity(config.store_capacity)?;
        debug!(
            stack_capacity = config.stack_capacity,
            store_capacity = config.store_capacity,
            code_len = code.len(),
            "machine created"
        );
        Ok(Self {
            code,
            stack,
            store,
            pc: 0,
            fp: 0,
            host,
        })
    }

    pub fn code(&self) -> &'c [u8] {
        self.code
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn sp(&self) -> usize {
        self.stack.sp()
    }

    pub fn fp(&self) -> usize {
        self.fp
    }

    pub fn registers(&self) -> Registers {
        Registers {
            pc: self.pc,
            sp: self.stack.sp(),
            fp: self.fp,
        }
    }

    pub fn stack(&self) -> &OperandStack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut OperandStack {
        &mut self.stack
    }

    pub fn store(&self) -> &VariableStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut VariableStore {
        &mut self.store
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Empties the stack and zeroes `pc` and `fp`. The store is kept.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.pc = 0;
        self.fp = 0;
    }

    /// Runs from `start_pc` until HALT or a fault.
    ///
    /// A `code` buffer replaces the current one for this and later runs.
    /// The stack, store and `fp` carry over from the previous run.
    pub fn run(&mut self, code: Option<&'c [u8]>, start_pc: usize) -> Result<(), Fault> {
        if let Some(code) = code {
            self.code = code;
        }
        self.pc = start_pc;
        debug!(pc = start_pc, code_len = self.code.len(), "run");

        let result = self.dispatch();
        match &result {
            Ok(()) => debug!(pc = self.pc, sp = self.stack.sp(), "halt"),
            Err(fault) => debug!(
                pc = self.pc,
                sp = self.stack.sp(),
                fp = self.fp,
                %fault,
                "fault"
            ),
        }
        result
    }

    fn dispatch(&mut self) -> Result<(), Fault> {
        loop {
            let at = self.pc;
            let byte = self.fetch_byte()?;
            let opcode = Opcode::try_from(byte).map_err(|_| Fault::InvalidOpcode(byte))?;
            trace!(pc = at, ?opcode, sp = self.stack.sp(), fp = self.fp, "step");
            if let Flow::Halt = self.execute(opcode)? {
                return Ok(());
            }
        }
    }

    fn execute(&mut self, opcode: Opcode) -> Result<Flow, Fault> {
        match opcode.instruction() {
            Instruction::Add(kind) => {
                for_kind!(kind, T => self.binary(|a: T, b: T| Ok(a.promoted_add(b))))?
            }
            Instruction::Sub(kind) => {
                for_kind!(kind, T => self.binary(|a: T, b: T| Ok(a.promoted_sub(b))))?
            }
            Instruction::Mul(kind) => {
                for_kind!(kind, T => self.binary(|a: T, b: T| Ok(a.promoted_mul(b))))?
            }
            Instruction::Div(kind) => for_kind!(kind, T => self.binary(|a: T, b: T| {
                a.divide(b).ok_or(Fault::DivisionByZero(opcode))
            }))?,
            Instruction::Mod(kind) => for_kind!(kind, T => self.binary(|a: T, b: T| {
                a.remainder(b).ok_or(Fault::DivisionByZero(opcode))
            }))?,
            Instruction::Compare(comparison, kind) => for_kind!(kind, T => self.binary(|a: T, b: T| {
                Ok(u8::from(comparison.holds(a, b)))
            }))?,
            Instruction::And => self.logical(|a, b| a && b)?,
            Instruction::Or => self.logical(|a, b| a || b)?,
            Instruction::Xor => self.logical(|a, b| (a || b) && !(a && b))?,
            Instruction::Not => {
                let value = self.stack.pop_byte()?;
                self.stack.push_byte(u8::from(value == 0))?;
            }
            Instruction::BitAnd(width) => self.bitwise(width, |a, b| a & b)?,
            Instruction::BitOr(width) => self.bitwise(width, |a, b| a | b)?,
            Instruction::BitXor(width) => self.bitwise(width, |a, b| a ^ b)?,
            Instruction::BitNot(width) => {
                let value = self.stack.pop_unsigned(width)?;
                self.stack.push_unsigned(width, !value & width.mask())?;
            }
            // Operands are zero extended, so any amount >= the width shifts
            // every bit out and leaves zero.
            Instruction::LeftShift(width) => self.shift(width, |value, amount| {
                value.checked_shl(amount).unwrap_or(0)
            })?,
            Instruction::RightShift(width) => self.shift(width, |value, amount| {
                value.checked_shr(amount).unwrap_or(0)
            })?,
            Instruction::Jump(width) => {
                let target = self.stack.pop_unsigned(width)?;
                self.pc = self.jump_target(target)?;
            }
            Instruction::JumpIf(width) => {
                let target = self.stack.pop_unsigned(width)?;
                let condition = self.stack.pop_byte()?;
                if condition != 0 {
                    self.pc = self.jump_target(target)?;
                }
            }
            Instruction::Push(width) => {
                let bytes = self.fetch_immediate(width.bytes())?;
                self.stack.push_bytes(bytes)?;
            }
            Instruction::Pop(width) => self.stack.drop_bytes(width.bytes())?,
            Instruction::Load(width) => {
                let address = self.stack.pop_unsigned(width)?;
                let value = self.store.load(address)?;
                self.stack.push_byte(value)?;
            }
            Instruction::Store(width) => {
                let address = self.stack.pop_unsigned(width)?;
                let value = self.stack.pop_byte()?;
                self.store.store(address, value)?;
            }
            Instruction::Call(width) => {
                let target = self.stack.pop_unsigned(width)?;
                let target = self.jump_target(target)?;
                let frame = frame::enter(&mut self.stack, self.pc, self.fp)?;
                self.fp = frame.base();
                self.pc = target;
            }
            Instruction::Ret(width) => {
                let value = self.stack.pop_unsigned(width)?;
                let resume = frame::leave(&mut self.stack, Frame::at(self.fp))?;
                self.stack.push_unsigned(width, value)?;
                self.pc = resume.pc;
                self.fp = resume.fp;
            }
            Instruction::Argc => {
                let argc = Frame::at(self.fp).argc(&self.stack)?;
                self.stack.push_byte(argc)?;
            }
            Instruction::Arg => {
                let index = self.stack.pop_byte()?;
                let value = Frame::at(self.fp).arg(&self.stack, index)?;
                self.stack.push_byte(value)?;
            }
            Instruction::Halt => return Ok(Flow::Halt),
            Instruction::Syscall => {
                let (number, args) = syscall::pop_request(&mut self.stack)?;
                trace!(number, argc = args.len(), "syscall");
                let result = self.host.syscall(number, &args)?;
                self.stack.push(result)?;
            }
        }
        Ok(Flow::Continue)
    }

    fn fetch_byte(&mut self) -> Result<u8, Fault> {
        let byte = *self
            .code
            .get(self.pc)
            .ok_or(Fault::CodeOutOfBounds(self.pc))?;
        self.pc = self
            .pc
            .checked_add(1)
            .ok_or(Fault::CodeOutOfBounds(self.pc))?;
        Ok(byte)
    }

    fn fetch_immediate(&mut self, len: usize) -> Result<&'c [u8], Fault> {
        let code = self.code;
        let end = self
            .pc
            .checked_add(len)
            .ok_or(Fault::CodeOutOfBounds(self.pc))?;
        let bytes = code
            .get(self.pc..end)
            .ok_or(Fault::CodeOutOfBounds(self.pc))?;
        self.pc = end;
        Ok(bytes)
    }

    fn jump_target(&self, target: u64) -> Result<usize, Fault> {
        usize::try_from(target)
            .ok()
            .filter(|index| *index < self.code.len())
            .ok_or(Fault::InvalidJumpTarget(target))
    }

    /// Pops the right operand, then the left, and pushes `op(left, right)`.
    fn binary<T: Scalar, R: Scalar>(
        &mut self,
        op: impl FnOnce(T, T) -> Result<R, Fault>,
    ) -> Result<(), Fault> {
        let rhs = self.stack.pop::<T>()?;
        let lhs = self.stack.pop::<T>()?;
        self.stack.push(op(lhs, rhs)?)
    }

    fn logical(&mut self, op: impl FnOnce(bool, bool) -> bool) -> Result<(), Fault> {
        let rhs = self.stack.pop_byte()? != 0;
        let lhs = self.stack.pop_byte()? != 0;
        self.stack.push_byte(u8::from(op(lhs, rhs)))
    }

    fn bitwise(&mut self, width: Width, op: impl FnOnce(u64, u64) -> u64) -> Result<(), Fault> {
        let rhs = self.stack.pop_unsigned(width)?;
        let lhs = self.stack.pop_unsigned(width)?;
        self.stack.push_unsigned(width, op(lhs, rhs) & width.mask())
    }

    /// Pops a one-byte shift amount, then the value.
    fn shift(&mut self, width: Width, op: impl FnOnce(u64, u32) -> u64) -> Result<(), Fault> {
        let amount = self.stack.pop_byte()?;
        let value = self.stack.pop_unsigned(width)?;
        self.stack
            .push_unsigned(width, op(value, u32::from(amount)) & width.mask())
    }
}
