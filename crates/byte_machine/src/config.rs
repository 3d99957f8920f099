#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_STACK_CAPACITY: usize = 4096;
pub const DEFAULT_STORE_CAPACITY: usize = 4096;

/// Sizes of the buffers a machine allocates once at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MachineConfig {
    pub stack_capacity: usize,
    pub store_capacity: usize,
}

impl MachineConfig {
    pub const fn new(stack_capacity: usize, store_capacity: usize) -> Self {
        Self {
            stack_capacity,
            store_capacity,
        }
    }

    pub const fn with_stack_capacity(mut self, stack_capacity: usize) -> Self {
        self.stack_capacity = stack_capacity;
        self
    }

    pub const fn with_store_capacity(mut self, store_capacity: usize) -> Self {
        self.store_capacity = store_capacity;
        self
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_STACK_CAPACITY, DEFAULT_STORE_CAPACITY)
    }
}
