//! Call frames on the operand stack.
//!
//! A call leaves this layout, bottom to top:
//!
//! ```text
//! [arg 0] .. [arg n-1] [argc] [return pc: 8] [saved fp: 8] | frame locals ..
//!                                                          ^ fp
//! ```
//!
//! The caller pushes the arguments and `argc`, CALL pushes the two saved
//! registers and moves `fp` to the new top. All offsets below `fp` are
//! defined here and nowhere else.

use crate::Fault;
use crate::stack::OperandStack;

/// Bytes used to save one register (pc or fp) in a frame header.
pub const SAVED_REGISTER_BYTES: usize = 8;
/// Return pc plus saved fp.
pub const FRAME_HEADER_BYTES: usize = 2 * SAVED_REGISTER_BYTES;
const ARGC_BYTES: usize = 1;
const ARGC_OFFSET: usize = FRAME_HEADER_BYTES + ARGC_BYTES;

/// Registers restored by a return.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resume {
    pub pc: usize,
    pub fp: usize,
}

/// View of the active frame, anchored at `fp`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    base: usize,
}

impl Frame {
    pub fn at(fp: usize) -> Self {
        Self { base: fp }
    }

    pub fn base(self) -> usize {
        self.base
    }

    /// Stack index of the argument count, `fp - 17`.
    fn argc_index(self) -> Result<usize, Fault> {
        self.base
            .checked_sub(ARGC_OFFSET)
            .ok_or(Fault::NoActiveFrame)
    }

    pub fn argc(self, stack: &OperandStack) -> Result<u8, Fault> {
        stack.peek_at(self.argc_index()?)
    }

    /// Argument `index`, counted from the first byte the caller pushed.
    pub fn arg(self, stack: &OperandStack, index: u8) -> Result<u8, Fault> {
        let argc_index = self.argc_index()?;
        let argc = stack.peek_at(argc_index)?;
        if index >= argc {
            return Err(Fault::ArgumentOutOfRange { index, argc });
        }
        let slot = argc_index
            .checked_sub(usize::from(argc))
            .and_then(|first| first.checked_add(usize::from(index)))
            .ok_or(Fault::StackUnderflow)?;
        stack.peek_at(slot)
    }
}

/// Saves `return_pc` and `caller_fp` and opens a frame on top of them.
pub fn enter(
    stack: &mut OperandStack,
    return_pc: usize,
    caller_fp: usize,
) -> Result<Frame, Fault> {
    stack.push(return_pc as u64)?;
    stack.push(caller_fp as u64)?;
    Ok(Frame::at(stack.sp()))
}

/// Unwinds `frame`: drops its locals, the saved registers, `argc` and the
/// arguments. The caller pushes the return value afterwards.
pub fn leave(stack: &mut OperandStack, frame: Frame) -> Result<Resume, Fault> {
    stack.truncate(frame.base())?;
    let saved_fp = stack.pop::<u64>()?;
    let return_pc = stack.pop::<u64>()?;
    let argc = stack.pop_byte()?;
    stack.drop_bytes(usize::from(argc))?;

    let fp = usize::try_from(saved_fp).map_err(|_| Fault::CorruptFrame(saved_fp))?;
    if fp > stack.sp() {
        return Err(Fault::CorruptFrame(saved_fp));
    }
    let pc = usize::try_from(return_pc).map_err(|_| Fault::CorruptFrame(return_pc))?;
    Ok(Resume { pc, fp })
}
