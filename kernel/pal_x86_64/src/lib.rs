#![no_std]

use pal::{ExecutionContext, HardwareControl, InterruptControl, ThreadEntry};
use x86_64::instructions::interrupts;

pub mod context;
pub mod pic;
pub mod pit;
pub mod qemu_test_helpers;
pub mod serial;

#[derive(Debug, Clone, Copy)]
pub struct Platform {}

impl HardwareControl for Platform {
    fn halt(&self) -> ! {
        loop {
            x86_64::instructions::hlt();
        }
    }

    fn init(&self) {
        serial::init();
        pal::logging::set_sink(&serial::SERIAL_LOG);
    }
}

impl InterruptControl for Platform {
    #[inline]
    fn interrupts_enabled(&self) -> bool {
        interrupts::are_enabled()
    }

    #[inline]
    fn disable_interrupts(&self) {
        interrupts::disable();
    }

    #[inline]
    fn enable_interrupts(&self) {
        interrupts::enable();
    }

    #[inline]
    fn end_of_interrupt(&self) {
        pic::end_of_interrupt();
    }
}

impl ExecutionContext for Platform {
    #[inline]
    fn stack_pointer(&self) -> usize {
        context::read_stack_pointer()
    }

    #[inline]
    fn address_space(&self) -> usize {
        context::read_page_table_base()
    }

    fn prepare_stack(&self, stack: &mut [u8], entry: ThreadEntry) -> usize {
        context::build_initial_frame(stack, entry)
    }

    #[inline]
    unsafe fn swap(&self, from: *mut usize, to: *const usize, address_space: usize) {
        context::pal_context_swap(from, to, address_space);
    }
}

pub static PAL_PLATFORM: Platform = Platform {};
