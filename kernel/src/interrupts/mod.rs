pub(crate) mod gdt;
pub(crate) mod idt;

use pal_x86_64::{pic, pit};

/// Timer interrupts per second. One tick is one quantum unit.
pub const TIMER_FREQUENCY: u32 = 1000;

/// Loads the descriptor tables and starts the timer. Interrupts stay
/// disabled; the caller enables them once tasking is set up.
pub fn init() {
    gdt::init();
    idt::init();
    pic::init();
    let divisor = pit::init(TIMER_FREQUENCY);
    pal::verbose!("PIT programmed for {} Hz, divisor {}", TIMER_FREQUENCY, divisor);
}

pub fn breakpoint() {
    x86_64::instructions::interrupts::int3();
}
