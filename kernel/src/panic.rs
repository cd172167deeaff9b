#[allow(unused_imports)]
use core::panic::PanicInfo;

#[cfg(not(test))]
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    use pal::{fatal, HardwareControl, InterruptControl};
    use pal_x86_64::PAL_PLATFORM;

    // Keep the timer from switching away from the failing thread.
    PAL_PLATFORM.disable_interrupts();
    fatal!("HALT: {}", info);
    PAL_PLATFORM.halt();
}

#[cfg(test)]
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    use pal::{HardwareControl, InterruptControl};
    use pal_x86_64::qemu_test_helpers::{exit_qemu, QemuExitCode};
    use pal_x86_64::{serial_println, PAL_PLATFORM};

    PAL_PLATFORM.disable_interrupts();
    serial_println!("[failed]");
    serial_println!("Error: {}", info);
    exit_qemu(QemuExitCode::Failed);
    PAL_PLATFORM.halt();
}
