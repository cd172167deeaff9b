#![no_std]
#![no_main]
#![feature(abi_x86_interrupt)]
#![feature(custom_test_frameworks)]
#![test_runner(crate::test_runner::test_runner)]
#![reexport_test_harness_main = "test_main"]
include!(concat!(env!("OUT_DIR"), "/metadata_constants.rs"));
extern crate alloc;

mod interrupts;
mod memory;
mod panic;
mod test_runner;
mod thread;

use pal::{info, HardwareControl, InterruptControl};
use pal_x86_64::{serial_println, PAL_PLATFORM};

#[no_mangle]
pub extern "C" fn _start() -> ! {
    early_init();
    test_hook();
    kernel_main();
}

fn test_hook() {
    #[cfg(test)]
    test_main();
}

fn early_init() {
    PAL_PLATFORM.init();
    serial_println!("Oxidized kernel");
    serial_println!("Version     : {}", METADATA_VERSION.unwrap_or("unknown"));
    serial_println!("Architecture: {}", METADATA_BUILD_ARCH);
    serial_println!("Compiler    : {}", METADATA_BUILD_TARGET);
    serial_println!("Profile     : {}", METADATA_PROFILE);
    memory::init();
    interrupts::init();
}

fn kernel_main() -> ! {
    thread::bootstrap();
    thread::new_thread(report_tasks, "report");
    thread::finalize_bootstrap();
    info!("Enabling interrupts");
    PAL_PLATFORM.enable_interrupts();
    PAL_PLATFORM.halt();
}

/// Lists the ready ring once, then returns, which deletes the thread.
extern "C" fn report_tasks() {
    let tasks = thread::tasks();
    info!("{} task(s) in the ready ring", tasks.len());
    for task in tasks {
        info!(
            "  {:>4} {:<12} {:?} quantum {}/{}",
            task.id, task.name, task.state, task.remaining_quantum, task.quantum
        );
    }
    info!(
        "Heap: {} bytes used, {} bytes free",
        memory::ALLOCATOR.used(),
        memory::ALLOCATOR.free()
    );
}
