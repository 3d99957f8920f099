use super::*;

use crate::scalar::{Scalar, Width};

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("the code buffer is too small")]
    BufferTooSmall,
    #[error("patch at {0} is outside the emitted code")]
    PatchOutOfRange(usize),
}

/// Writes bytecode into a caller-provided buffer.
///
/// Nothing is parsed or resolved here: callers emit opcodes and `PUSH_*`
/// immediates in order, and patch jump targets they only know later.
pub struct CodeBuilder<'a> {
    buffer: &'a mut [u8],
    free: usize,
}

impl<'a> CodeBuilder<'a> {
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer, free: 0 }
    }

    /// Offset of the next byte to be emitted.
    pub fn here(&self) -> usize {
        self.free
    }

    fn add_bytes(&mut self, bytes: &[u8]) -> Result<(), BuildError> {
        let Some(end) = self.free.checked_add(bytes.len()) else {
            return Err(BuildError::BufferTooSmall);
        };
        let Some(slot) = self.buffer.get_mut(self.free..end) else {
            return Err(BuildError::BufferTooSmall);
        };
        slot.copy_from_slice(bytes);
        self.free = end;
        Ok(())
    }

    pub fn op(&mut self, op: Opcode) -> Result<&mut Self, BuildError> {
        self.add_bytes(&[u8::from(op)])?;
        Ok(self)
    }

    pub fn ops(&mut self, ops: &[Opcode]) -> Result<&mut Self, BuildError> {
        for op in ops {
            self.op(*op)?;
        }
        Ok(self)
    }

    /// Emits the `PUSH_*` matching `T`'s width followed by `value`.
    pub fn push<T: Scalar>(&mut self, value: T) -> Result<&mut Self, BuildError> {
        self.op(push_opcode(T::WIDTH))?;
        self.add_bytes(value.to_stack().as_ref())?;
        Ok(self)
    }

    /// Emits a `PUSH_*` with a zeroed immediate and returns the immediate's
    /// offset for a later [`CodeBuilder::patch`].
    pub fn push_placeholder<T: Scalar>(&mut self) -> Result<usize, BuildError> {
        self.op(push_opcode(T::WIDTH))?;
        let at = self.free;
        self.add_bytes(T::Bytes::default().as_ref())?;
        Ok(at)
    }

    pub fn patch<T: Scalar>(&mut self, at: usize, value: T) -> Result<&mut Self, BuildError> {
        let bytes = value.to_stack();
        let Some(end) = at.checked_add(bytes.as_ref().len()) else {
            return Err(BuildError::PatchOutOfRange(at));
        };
        if end > self.free {
            return Err(BuildError::PatchOutOfRange(at));
        }
        let Some(slot) = self.buffer.get_mut(at..end) else {
            return Err(BuildError::PatchOutOfRange(at));
        };
        slot.copy_from_slice(bytes.as_ref());
        Ok(self)
    }

    /// Emits bytes verbatim, opcode or not.
    pub fn raw(&mut self, bytes: &[u8]) -> Result<&mut Self, BuildError> {
        self.add_bytes(bytes)?;
        Ok(self)
    }

    /// Length of the emitted code.
    pub fn finish(self) -> usize {
        self.free
    }
}

fn push_opcode(width: Width) -> Opcode {
    match width {
        Width::W8 => Opcode::PushU8,
        Width::W16 => Opcode::PushU16,
        Width::W32 => Opcode::PushU32,
        Width::W64 => Opcode::PushU64,
    }
}
