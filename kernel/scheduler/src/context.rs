use pal::ExecutionContext;

/// A pending transfer of the processor from one saved context to another.
///
/// The scheduler only decides *which* slots take part; performing the
/// transfer is left to the caller so it can release any lock around the
/// scheduler first. The slots stay valid until the next ring mutation.
#[must_use = "the processor is only transferred once the switch is performed"]
#[derive(Debug, PartialEq, Eq)]
pub struct ContextSwitch {
    pub(crate) from: *mut usize,
    pub(crate) to: *const usize,
    pub(crate) address_space: usize,
}

impl ContextSwitch {
    /// True for the deliberate `swap(current, current)` of a tick that does
    /// not rotate the ring.
    pub fn is_noop(&self) -> bool {
        self.from as *const usize == self.to
    }

    /// Performs the transfer.
    ///
    /// # Safety
    /// Interrupts must be masked, and the scheduler that produced this
    /// switch must not have been mutated since.
    pub unsafe fn perform<E: ExecutionContext + ?Sized>(self, context: &E) {
        context.swap(self.from, self.to, self.address_space);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockPlatform;

    #[test]
    fn swap_into_the_same_slot_changes_nothing() {
        let platform = MockPlatform::new();
        let mut slot = platform.live_stack_pointer();
        let slot_pointer = &mut slot as *mut usize;
        let switch = ContextSwitch {
            from: slot_pointer,
            to: slot_pointer,
            address_space: platform.address_space(),
        };
        assert!(switch.is_noop());
        let before = slot;
        unsafe { switch.perform(&platform) };
        assert_eq!(slot, before);
        assert_eq!(platform.live_stack_pointer(), before);
    }

    #[test]
    fn swap_saves_outgoing_and_loads_incoming() {
        let platform = MockPlatform::new();
        let live = platform.live_stack_pointer();
        let mut from = 0usize;
        let to = 0x7000usize;
        let switch = ContextSwitch {
            from: &mut from,
            to: &to,
            address_space: 0x2000,
        };
        assert!(!switch.is_noop());
        unsafe { switch.perform(&platform) };
        assert_eq!(from, live);
        assert_eq!(platform.live_stack_pointer(), 0x7000);
        assert_eq!(platform.address_space(), 0x2000);
    }
}
