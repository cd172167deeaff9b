#![cfg_attr(not(test), no_std)]
//! Round-robin preemptive tasking for a single processor.
//!
//! Lifecycle: [`Scheduler::bootstrap`] promotes the running context into the
//! first task, [`Scheduler::new_thread`] and [`Scheduler::delete`] grow and
//! shrink the ready ring, [`Scheduler::finalize_bootstrap`] moves to the
//! [`Ready`] phase where the timer drives [`Scheduler::tick`].
extern crate alloc;

pub mod config;
pub mod context;
pub mod critical;
pub mod errors;
pub mod ring;
pub mod scheduler;
pub mod stack;
pub mod task;

#[cfg(test)]
pub(crate) mod testing;

pub use config::SchedulerConfig;
pub use context::ContextSwitch;
pub use critical::CriticalSection;
pub use errors::ThreadError;
pub use scheduler::{Bootstrapping, Phase, Ready, Scheduler};
pub use task::{TaskHandle, TaskId, TaskInfo, TaskState};
