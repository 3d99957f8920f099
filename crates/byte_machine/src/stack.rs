use alloc::alloc::{Layout, alloc_zeroed};
use alloc::vec::Vec;

use crate::Fault;
use crate::scalar::{Scalar, Width};

/// Fixed-capacity operand stack of raw bytes.
///
/// `sp` is the number of bytes in use. The buffer is allocated once and
/// never grows; every operation that would leave `0..=capacity` fails
/// before touching any byte.
#[derive(Debug)]
pub struct OperandStack {
    bytes: Vec<u8>,
    sp: usize,
}

impl OperandStack {
    pub fn with_capacity(capacity: usize) -> Result<Self, Fault> {
        Ok(Self {
            bytes: reserve_zeroed(capacity)?,
            sp: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    pub fn sp(&self) -> usize {
        self.sp
    }

    /// The bytes currently in use, bottom first.
    pub fn as_slice(&self) -> &[u8] {
        self.bytes.get(..self.sp).unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.sp = 0;
    }

    pub fn push_byte(&mut self, byte: u8) -> Result<(), Fault> {
        self.push_bytes(&[byte])
    }

    pub fn pop_byte(&mut self) -> Result<u8, Fault> {
        let sp = self.sp.checked_sub(1).ok_or(Fault::StackUnderflow)?;
        let byte = *self.bytes.get(sp).ok_or(Fault::StackUnderflow)?;
        self.sp = sp;
        Ok(byte)
    }

    /// Pushes `bytes` in order, so the last byte ends up on top.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<(), Fault> {
        let end = self
            .sp
            .checked_add(bytes.len())
            .ok_or(Fault::StackOverflow)?;
        let slot = self
            .bytes
            .get_mut(self.sp..end)
            .ok_or(Fault::StackOverflow)?;
        slot.copy_from_slice(bytes);
        self.sp = end;
        Ok(())
    }

    /// Pops `out.len()` bytes into `out`, restoring push order.
    pub fn pop_bytes(&mut self, out: &mut [u8]) -> Result<(), Fault> {
        let start = self
            .sp
            .checked_sub(out.len())
            .ok_or(Fault::StackUnderflow)?;
        let top = self
            .bytes
            .get(start..self.sp)
            .ok_or(Fault::StackUnderflow)?;
        out.copy_from_slice(top);
        self.sp = start;
        Ok(())
    }

    pub fn push<T: Scalar>(&mut self, value: T) -> Result<(), Fault> {
        self.push_bytes(value.to_stack().as_ref())
    }

    pub fn pop<T: Scalar>(&mut self) -> Result<T, Fault> {
        let mut bytes = T::Bytes::default();
        self.pop_bytes(bytes.as_mut())?;
        Ok(T::from_stack(bytes))
    }

    /// Pushes the low `width` bytes of `value`.
    pub fn push_unsigned(&mut self, width: Width, value: u64) -> Result<(), Fault> {
        match width {
            Width::W8 => self.push(value as u8),
            Width::W16 => self.push(value as u16),
            Width::W32 => self.push(value as u32),
            Width::W64 => self.push(value),
        }
    }

    /// Pops an unsigned value of `width`, zero extended.
    pub fn pop_unsigned(&mut self, width: Width) -> Result<u64, Fault> {
        Ok(match width {
            Width::W8 => u64::from(self.pop::<u8>()?),
            Width::W16 => u64::from(self.pop::<u16>()?),
            Width::W32 => u64::from(self.pop::<u32>()?),
            Width::W64 => self.pop::<u64>()?,
        })
    }

    /// Discards `count` bytes without reading them.
    pub fn drop_bytes(&mut self, count: usize) -> Result<(), Fault> {
        self.sp = self.sp.checked_sub(count).ok_or(Fault::StackUnderflow)?;
        Ok(())
    }

    /// Cuts the stack back to `sp`. Growing through this is not allowed.
    pub fn truncate(&mut self, sp: usize) -> Result<(), Fault> {
        if sp > self.sp {
            return Err(Fault::StackUnderflow);
        }
        self.sp = sp;
        Ok(())
    }

    /// Reads the byte at absolute stack index `index`, counted from the
    /// bottom, without popping it.
    pub fn peek_at(&self, index: usize) -> Result<u8, Fault> {
        if index >= self.sp {
            return Err(Fault::StackUnderflow);
        }
        self.bytes.get(index).copied().ok_or(Fault::StackUnderflow)
    }
}

/// Allocates `len` zeroed bytes, reporting failure instead of aborting.
///
/// The buffer comes straight from `alloc_zeroed`, so no byte is written
/// here and untouched pages stay uncommitted on overcommitting hosts.
pub(crate) fn reserve_zeroed(len: usize) -> Result<Vec<u8>, Fault> {
    if len == 0 {
        return Ok(Vec::new());
    }
    let layout = Layout::array::<u8>(len).map_err(|_| Fault::AllocationFailure(len))?;
    // SAFETY: `layout` has a nonzero size.
    let ptr = unsafe { alloc_zeroed(layout) };
    if ptr.is_null() {
        return Err(Fault::AllocationFailure(len));
    }
    // SAFETY: `ptr` comes from the global allocator with the layout of `len`
    // bytes, all of them initialized to zero.
    Ok(unsafe { Vec::from_raw_parts(ptr, len, len) })
}
