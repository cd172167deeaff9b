use alloc::{boxed::Box, vec::Vec};

use crate::errors::ThreadError;

/// A zero-initialised stack block owned by exactly one task.
#[derive(Debug)]
pub struct TaskStack {
    memory: Box<[u8]>,
}

impl TaskStack {
    /// Allocates `size` zeroed bytes, reporting exhaustion instead of
    /// aborting through the global allocation error handler.
    pub fn allocate(size: usize) -> Result<Self, ThreadError> {
        let mut memory = Vec::new();
        memory
            .try_reserve_exact(size)
            .map_err(|_| ThreadError::AllocationFailure)?;
        memory.resize(size, 0u8);
        Ok(Self {
            memory: memory.into_boxed_slice(),
        })
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.memory
    }

    /// Address range covered by the block, bottom inclusive, top exclusive.
    pub fn bounds(&self) -> (usize, usize) {
        let bottom = self.memory.as_ptr() as usize;
        (bottom, bottom + self.memory.len())
    }
}
