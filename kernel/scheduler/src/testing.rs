//! Host stand-in for the platform layer.

use core::cell::Cell;
use std::vec::Vec;

use pal::{ExecutionContext, InterruptControl, ThreadEntry};

pub(crate) const BOOT_STACK_POINTER: usize = 0xFFFF_8000_0001_0000;
pub(crate) const BOOT_ADDRESS_SPACE: usize = 0x1000;

/// Emulates a processor closely enough for the scheduler: a live stack
/// pointer that swaps exchange, a page-table base register, the interrupt
/// flag and a count of acknowledged interrupts.
pub(crate) struct MockPlatform {
    live_stack_pointer: Cell<usize>,
    address_space: Cell<usize>,
    interrupts_enabled: Cell<bool>,
    acknowledged: Cell<usize>,
    swaps: Cell<usize>,
    // Interrupt flag observed at every acknowledgment.
    masked_at_acknowledgment: Cell<bool>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            live_stack_pointer: Cell::new(BOOT_STACK_POINTER),
            address_space: Cell::new(BOOT_ADDRESS_SPACE),
            interrupts_enabled: Cell::new(false),
            acknowledged: Cell::new(0),
            swaps: Cell::new(0),
            masked_at_acknowledgment: Cell::new(true),
        }
    }

    pub fn live_stack_pointer(&self) -> usize {
        self.live_stack_pointer.get()
    }

    pub fn acknowledged(&self) -> usize {
        self.acknowledged.get()
    }

    pub fn swaps(&self) -> usize {
        self.swaps.get()
    }

    pub fn always_masked_when_acknowledging(&self) -> bool {
        self.masked_at_acknowledgment.get()
    }

    pub fn set_address_space(&self, address_space: usize) {
        self.address_space.set(address_space);
    }
}

impl InterruptControl for MockPlatform {
    fn interrupts_enabled(&self) -> bool {
        self.interrupts_enabled.get()
    }

    fn disable_interrupts(&self) {
        self.interrupts_enabled.set(false);
    }

    fn enable_interrupts(&self) {
        self.interrupts_enabled.set(true);
    }

    fn end_of_interrupt(&self) {
        if self.interrupts_enabled.get() {
            self.masked_at_acknowledgment.set(false);
        }
        self.acknowledged.set(self.acknowledged.get() + 1);
    }
}

impl ExecutionContext for MockPlatform {
    fn stack_pointer(&self) -> usize {
        self.live_stack_pointer.get()
    }

    fn address_space(&self) -> usize {
        self.address_space.get()
    }

    fn prepare_stack(&self, stack: &mut [u8], entry: ThreadEntry) -> usize {
        // Top word holds the entry address so tests can tell frames apart.
        let top = (stack.as_mut_ptr() as usize + stack.len()) & !0xF;
        let slot = top - core::mem::size_of::<usize>();
        unsafe { (slot as *mut usize).write(entry as usize) };
        slot
    }

    unsafe fn swap(&self, from: *mut usize, to: *const usize, address_space: usize) {
        self.swaps.set(self.swaps.get() + 1);
        *from = self.live_stack_pointer.get();
        self.address_space.set(address_space);
        self.live_stack_pointer.set(*to);
    }
}

pub(crate) extern "C" fn idle_entry() {}

pub(crate) extern "C" fn worker_entry() {}

pub(crate) fn ids<I: Iterator<Item = crate::task::TaskInfo>>(tasks: I) -> Vec<u64> {
    tasks.map(|task| task.id.as_u64()).collect()
}
