use lazy_static::lazy_static;
use x86_64::structures::idt::{InterruptDescriptorTable, InterruptStackFrame};

use pal::info;
use pal_x86_64::pic::TIMER_VECTOR;

use super::gdt::DOUBLE_FAULT_IST_INDEX;

lazy_static! {
    static ref IDT: InterruptDescriptorTable = {
        let mut idt = InterruptDescriptorTable::new();
        idt.breakpoint.set_handler_fn(InterruptHandlers::breakpoint_handler);
        unsafe {
            idt.double_fault
                .set_handler_fn(InterruptHandlers::double_fault_handler)
                .set_stack_index(DOUBLE_FAULT_IST_INDEX);
        }
        idt[TIMER_VECTOR as usize].set_handler_fn(InterruptHandlers::timer_interrupt_handler);
        idt
    };
}

pub fn init() {
    IDT.load();
}

struct InterruptHandlers {}

impl InterruptHandlers {
    extern "x86-interrupt" fn breakpoint_handler(stack_frame: InterruptStackFrame) {
        info!("EXCEPTION: BREAKPOINT\n{:#?}", stack_frame);
    }

    extern "x86-interrupt" fn double_fault_handler(
        stack_frame: InterruptStackFrame,
        error_code: u64,
    ) -> ! {
        panic!(
            "EXCEPTION: DOUBLE FAULT: {}\n{:#?}",
            error_code, stack_frame
        );
    }

    // May return on a different thread's stack; the interrupted thread
    // resumes here the next time it is scheduled.
    extern "x86-interrupt" fn timer_interrupt_handler(_stack_frame: InterruptStackFrame) {
        crate::thread::timer_tick();
    }
}

#[cfg(test)]
mod tests {
    #[test_case]
    fn breakpoint_returns() {
        super::super::breakpoint();
    }
}
