//! The host syscall boundary.
//!
//! SYSCALL is the only opcode that reaches outside the machine. It does so
//! through [`SyscallHost`], which takes a syscall number and at most
//! [`MAX_SYSCALL_ARGS`] 64-bit arguments and returns the raw 64-bit result.

use heapless::Vec;

use crate::Fault;
use crate::stack::OperandStack;

pub const MAX_SYSCALL_ARGS: usize = 5;

pub type SyscallArgs = Vec<u64, MAX_SYSCALL_ARGS>;

pub trait SyscallHost {
    /// Performs syscall `number` with `args` in call order.
    fn syscall(&mut self, number: u64, args: &[u64]) -> Result<i64, Fault>;
}

impl<H: SyscallHost + ?Sized> SyscallHost for &mut H {
    fn syscall(&mut self, number: u64, args: &[u64]) -> Result<i64, Fault> {
        (**self).syscall(number, args)
    }
}

/// Host that refuses every syscall.
#[derive(Clone, Copy, Debug, Default)]
pub struct DenySyscalls;

impl SyscallHost for DenySyscalls {
    fn syscall(&mut self, number: u64, _args: &[u64]) -> Result<i64, Fault> {
        Err(Fault::SyscallDenied(number))
    }
}

/// Host backed by `libc::syscall`.
///
/// Arguments and result pass through unchanged, so failures come back as
/// the host's `-1`/`errno` convention rather than as a [`Fault`].
#[cfg(all(feature = "host-syscall", target_os = "linux"))]
#[derive(Clone, Copy, Debug, Default)]
pub struct LibcHost;

#[cfg(all(feature = "host-syscall", target_os = "linux"))]
impl SyscallHost for LibcHost {
    fn syscall(&mut self, number: u64, args: &[u64]) -> Result<i64, Fault> {
        use libc::c_long;

        let n = number as c_long;
        let a = |i: usize| args.get(i).copied().unwrap_or(0) as c_long;
        // SAFETY: the bytecode asked for exactly this call; the machine hands
        // over plain integers and touches none of the memory they may name.
        let result = unsafe {
            match args.len() {
                0 => libc::syscall(n),
                1 => libc::syscall(n, a(0)),
                2 => libc::syscall(n, a(0), a(1)),
                3 => libc::syscall(n, a(0), a(1), a(2)),
                4 => libc::syscall(n, a(0), a(1), a(2), a(3)),
                5 => libc::syscall(n, a(0), a(1), a(2), a(3), a(4)),
                other => return Err(Fault::InvalidSyscallArity(other as u8)),
            }
        };
        #[allow(
            clippy::useless_conversion,
            reason = "c_long is i32 on 32-bit Linux targets"
        )]
        let result = i64::from(result);
        Ok(result)
    }
}

/// Pops a SYSCALL request: `argc`, then `argc` arguments, then the number.
///
/// Arguments were pushed in call order, so the last one comes off first.
pub(crate) fn pop_request(stack: &mut OperandStack) -> Result<(u64, SyscallArgs), Fault> {
    let argc = stack.pop_byte()?;
    if usize::from(argc) > MAX_SYSCALL_ARGS {
        return Err(Fault::InvalidSyscallArity(argc));
    }
    let mut args = SyscallArgs::new();
    for _ in 0..argc {
        args.push(stack.pop::<u64>()?)
            .map_err(|_| Fault::InvalidSyscallArity(argc))?;
    }
    args.reverse();
    let number = stack.pop::<u64>()?;
    Ok((number, args))
}
