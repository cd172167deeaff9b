use core::fmt::{Arguments, Write};

use lazy_static::lazy_static;
use pal::logging::{LogLevel, LogSink};
use spin::Mutex;
use uart_16550::SerialPort;
use x86_64::instructions::interrupts;

const COM1: u16 = 0x3F8;

lazy_static! {
    pub static ref SERIAL1: Mutex<SerialPort> = {
        let mut serial_port = unsafe { SerialPort::new(COM1) };
        serial_port.init();
        Mutex::new(serial_port)
    };
}

pub fn init() {
    lazy_static::initialize(&SERIAL1);
}

#[doc(hidden)]
pub fn _print(args: Arguments) {
    // The timer handler logs too; never let it spin on a lock held by the
    // code it interrupted.
    interrupts::without_interrupts(|| {
        let _ = SERIAL1.lock().write_fmt(args);
    });
}

#[macro_export]
macro_rules! serial_print {
    ($($arg:tt)*) => ($crate::serial::_print(format_args!($($arg)*)));
}

#[macro_export]
macro_rules! serial_println {
    () => ($crate::serial_print!("\n"));
    ($($arg:tt)*) => ($crate::serial_print!("{}\n", format_args!($($arg)*)));
}

pub struct SerialLogSink;

impl LogSink for SerialLogSink {
    fn write_record(&self, log_level: LogLevel, args: Arguments) {
        _print(format_args!("[{}]: {}\n", log_level, args));
    }
}

pub static SERIAL_LOG: SerialLogSink = SerialLogSink;
