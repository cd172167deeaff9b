use core::fmt::{Arguments, Display};

use spin::Once;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    DEBUG,
    VERBOSE,
    INFO,
    WARNING,
    ERROR,
    FATAL,
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LogLevel::DEBUG => write!(f, "DEBUG  "),
            LogLevel::VERBOSE => write!(f, "VERBOSE"),
            LogLevel::INFO => write!(f, "INFO   "),
            LogLevel::WARNING => write!(f, "WARNING"),
            LogLevel::ERROR => write!(f, "ERROR  "),
            LogLevel::FATAL => write!(f, "FATAL  "),
        }
    }
}

/// Destination for log records, usually a serial port.
pub trait LogSink: Sync {
    fn write_record(&self, log_level: LogLevel, args: Arguments);
}

static SINK: Once<&'static dyn LogSink> = Once::new();

/// Installs the log sink. Only the first call has an effect.
pub fn set_sink(sink: &'static dyn LogSink) {
    SINK.call_once(|| sink);
}

#[doc(hidden)]
pub fn _print(log_level: LogLevel, args: Arguments) {
    // Best effort: without a sink the record is dropped.
    if let Some(sink) = SINK.get() {
        sink.write_record(log_level, args);
    }
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::logging::_print($crate::logging::LogLevel::DEBUG, format_args!($($arg)*));
    };
}

#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {
        $crate::logging::_print($crate::logging::LogLevel::VERBOSE, format_args!($($arg)*));
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::logging::_print($crate::logging::LogLevel::INFO, format_args!($($arg)*));
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::logging::_print($crate::logging::LogLevel::WARNING, format_args!($($arg)*));
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::logging::_print($crate::logging::LogLevel::ERROR, format_args!($($arg)*));
    };
}

#[macro_export]
macro_rules! fatal {
    ($($arg:tt)*) => {
        $crate::logging::_print($crate::logging::LogLevel::FATAL, format_args!($($arg)*));
    };
}
