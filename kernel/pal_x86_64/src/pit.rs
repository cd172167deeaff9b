use x86_64::instructions::port::Port;

const PIT_BASE_FREQUENCY: u32 = 1_193_182;
const PIT_CHANNEL_0: u16 = 0x40;
const PIT_COMMAND: u16 = 0x43;
// Channel 0, lobyte/hibyte access, mode 3 (square wave), binary.
const PIT_RATE_GENERATOR: u8 = 0b0011_0110;

/// Programs channel 0 to fire IRQ 0 `frequency` times per second.
///
/// The divisor is clamped to what the 16 bit counter can hold.
pub fn init(frequency: u32) -> u16 {
    let divisor = (PIT_BASE_FREQUENCY / frequency.max(1)).clamp(1, u16::MAX as u32) as u16;
    let mut command: Port<u8> = Port::new(PIT_COMMAND);
    let mut channel: Port<u8> = Port::new(PIT_CHANNEL_0);
    unsafe {
        command.write(PIT_RATE_GENERATOR);
        channel.write((divisor & 0xFF) as u8);
        channel.write((divisor >> 8) as u8);
    }
    divisor
}
