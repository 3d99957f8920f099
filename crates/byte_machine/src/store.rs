use alloc::vec::Vec;

use crate::Fault;
use crate::stack::reserve_zeroed;

/// Flat, untyped variable memory addressed by byte.
///
/// Wider variables are the program's business: they occupy consecutive
/// addresses and are moved one byte per LOAD/STORE.
#[derive(Debug)]
pub struct VariableStore {
    cells: Vec<u8>,
}

impl VariableStore {
    pub fn with_capacity(capacity: usize) -> Result<Self, Fault> {
        Ok(Self {
            cells: reserve_zeroed(capacity)?,
        })
    }

    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    pub fn load(&self, address: u64) -> Result<u8, Fault> {
        let index = self.index(address)?;
        self.cells
            .get(index)
            .copied()
            .ok_or(Fault::StoreOutOfBounds(address))
    }

    pub fn store(&mut self, address: u64, value: u8) -> Result<(), Fault> {
        let index = self.index(address)?;
        let cell = self
            .cells
            .get_mut(index)
            .ok_or(Fault::StoreOutOfBounds(address))?;
        *cell = value;
        Ok(())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.cells
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.cells
    }

    fn index(&self, address: u64) -> Result<usize, Fault> {
        usize::try_from(address).map_err(|_| Fault::StoreOutOfBounds(address))
    }
}
