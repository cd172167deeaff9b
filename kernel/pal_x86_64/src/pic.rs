use pic8259::ChainedPics;
use spin::Mutex;
use x86_64::instructions::port::Port;

pub const PIC_1_OFFSET: u8 = 32;
pub const PIC_2_OFFSET: u8 = PIC_1_OFFSET + 8;
pub const TIMER_VECTOR: u8 = PIC_1_OFFSET;

const PIC_1_COMMAND_PORT: u16 = 0x20;
const END_OF_INTERRUPT: u8 = 0x20;

pub static PICS: Mutex<ChainedPics> =
    Mutex::new(unsafe { ChainedPics::new(PIC_1_OFFSET, PIC_2_OFFSET) });

/// Remaps both 8259 controllers above the exception vectors and leaves only
/// the timer line unmasked.
pub fn init() {
    let mut pics = PICS.lock();
    unsafe {
        pics.initialize();
        pics.write_masks(0b1111_1110, 0b1111_1111);
    }
}

/// Acknowledges the timer interrupt on the primary controller.
///
/// Written directly rather than through `PICS` so the timer path never
/// contends for the controller lock.
#[inline]
pub fn end_of_interrupt() {
    let mut command: Port<u8> = Port::new(PIC_1_COMMAND_PORT);
    unsafe { command.write(END_OF_INTERRUPT) };
}
