#![cfg_attr(not(test), no_std)]

pub mod logging;

/// Entry point of a kernel thread. Returning from it deletes the thread.
pub type ThreadEntry = extern "C" fn();

pub trait HardwareControl {
    fn init(&self);
    fn halt(&self) -> !;
}

pub trait InterruptControl {
    fn interrupts_enabled(&self) -> bool;
    fn disable_interrupts(&self);
    fn enable_interrupts(&self);
    /// Acknowledge the timer interrupt to the interrupt controller.
    fn end_of_interrupt(&self);
}

/// Saving and restoring of execution contexts.
///
/// The portable scheduler never looks at register contents, it only hands
/// slots holding saved stack pointers to [`ExecutionContext::swap`].
pub trait ExecutionContext {
    /// Stack pointer of the calling context.
    fn stack_pointer(&self) -> usize;

    /// Active page-table base register value.
    fn address_space(&self) -> usize;

    /// Writes a synthetic initial frame at the top of `stack` so the first
    /// swap into it lands at `entry`, with a return address that deletes the
    /// thread. Returns the stack pointer to save for the new context.
    fn prepare_stack(&self, stack: &mut [u8], entry: ThreadEntry) -> usize;

    /// Saves the running context, storing its stack pointer into `*from`,
    /// switches to `address_space` and resumes the context whose stack
    /// pointer is read from `*to` after the store.
    ///
    /// # Safety
    /// Interrupts must be disabled for the whole call. `from` and `to` must
    /// be valid, and `*to` must hold a stack pointer produced by a previous
    /// swap or by [`ExecutionContext::prepare_stack`]. `from == to` is allowed
    /// and returns without changing anything.
    unsafe fn swap(&self, from: *mut usize, to: *const usize, address_space: usize);
}
