//! Kernel-wide tasking.
//!
//! A single scheduler lives behind [`TASKING`]. Every call masks interrupts
//! before taking the lock and releases the lock before a returned
//! [`ContextSwitch`] is performed, so the incoming thread never starts with
//! the lock held.
use alloc::vec::Vec;
use core::mem;

use pal::{warn, InterruptControl, ThreadEntry};
use pal_x86_64::{Platform, PAL_PLATFORM};
use scheduler::{
    Bootstrapping, ContextSwitch, CriticalSection, Ready, Scheduler, SchedulerConfig, TaskId,
    TaskInfo, ThreadError,
};
use spin::Mutex;

enum Tasking {
    Uninitialized,
    Bootstrapping(Scheduler<Platform, Bootstrapping>),
    Ready(Scheduler<Platform, Ready>),
}

static TASKING: Mutex<Tasking> = Mutex::new(Tasking::Uninitialized);

macro_rules! with_scheduler {
    ($tasking:expr, $scheduler:ident => $body:expr) => {
        match $tasking {
            Tasking::Bootstrapping($scheduler) => $body,
            Tasking::Ready($scheduler) => $body,
            Tasking::Uninitialized => panic!("Tasking has not been initialized"),
        }
    };
}

/// Turns the boot context into the kernel task. Call once, with interrupts
/// disabled.
pub fn bootstrap() {
    bootstrap_with(SchedulerConfig::default());
}

pub fn bootstrap_with(config: SchedulerConfig) {
    let _guard = CriticalSection::enter(&PAL_PLATFORM);
    let mut tasking = TASKING.lock();
    if !matches!(*tasking, Tasking::Uninitialized) {
        panic!("Tasking initialized twice");
    }
    match Scheduler::bootstrap(PAL_PLATFORM, config) {
        Ok(scheduler) => *tasking = Tasking::Bootstrapping(scheduler),
        Err(e) => panic!("Unable to bootstrap tasking: {}", e),
    }
}

/// Starts a kernel thread at `entry`. Running out of memory is fatal.
pub fn new_thread(entry: ThreadEntry, name: &'static str) -> TaskId {
    let _guard = CriticalSection::enter(&PAL_PLATFORM);
    let mut tasking = TASKING.lock();
    let created = with_scheduler!(&mut *tasking, scheduler => scheduler.new_thread(entry, name));
    match created {
        Ok(id) => id,
        Err(e) => panic!("Unable to create thread {}: {}", name, e),
    }
}

pub fn delete(id: TaskId) -> Result<(), ThreadError> {
    let _guard = CriticalSection::enter(&PAL_PLATFORM);
    let switch = {
        let mut tasking = TASKING.lock();
        with_scheduler!(&mut *tasking, scheduler => scheduler.delete(id))?
    };
    if let Some(switch) = switch {
        perform(switch);
    }
    Ok(())
}

pub fn delete_current() -> Result<(), ThreadError> {
    let _guard = CriticalSection::enter(&PAL_PLATFORM);
    let switch = {
        let mut tasking = TASKING.lock();
        with_scheduler!(&mut *tasking, scheduler => scheduler.delete_current())?
    };
    if let Some(switch) = switch {
        perform(switch);
    }
    Ok(())
}

/// Ends the bootstrap phase. From here on the timer rotates the ring.
pub fn finalize_bootstrap() {
    let _guard = CriticalSection::enter(&PAL_PLATFORM);
    let mut tasking = TASKING.lock();
    *tasking = match mem::replace(&mut *tasking, Tasking::Uninitialized) {
        Tasking::Bootstrapping(scheduler) => Tasking::Ready(scheduler.finalize_bootstrap()),
        Tasking::Ready(_) => panic!("Bootstrap finalized twice"),
        Tasking::Uninitialized => panic!("Tasking has not been initialized"),
    };
}

pub fn current() -> Option<TaskInfo> {
    let _guard = CriticalSection::enter(&PAL_PLATFORM);
    let tasking = TASKING.lock();
    match &*tasking {
        Tasking::Uninitialized => None,
        Tasking::Bootstrapping(scheduler) => scheduler.current(),
        Tasking::Ready(scheduler) => scheduler.current(),
    }
}

pub fn is_ready() -> bool {
    let _guard = CriticalSection::enter(&PAL_PLATFORM);
    matches!(*TASKING.lock(), Tasking::Ready(_))
}

/// Every task in scheduling order, starting with the current one.
pub fn tasks() -> Vec<TaskInfo> {
    let _guard = CriticalSection::enter(&PAL_PLATFORM);
    let tasking = TASKING.lock();
    match &*tasking {
        Tasking::Uninitialized => Vec::new(),
        Tasking::Bootstrapping(scheduler) => scheduler.snapshot(),
        Tasking::Ready(scheduler) => scheduler.snapshot(),
    }
}

/// Body of the timer interrupt. Before bootstrap is finalized the tick is
/// only acknowledged.
pub fn timer_tick() {
    let _guard = CriticalSection::enter(&PAL_PLATFORM);
    let switch = {
        let mut tasking = TASKING.lock();
        match &mut *tasking {
            Tasking::Ready(scheduler) => scheduler.tick(),
            _ => {
                PAL_PLATFORM.end_of_interrupt();
                return;
            }
        }
    };
    match switch {
        Ok(switch) => perform(switch),
        Err(e) => panic!("Scheduler tick failed: {}", e),
    }
}

/// Return address planted under every thread entry point.
#[no_mangle]
pub extern "C" fn thread_exit() -> ! {
    if let Err(e) = delete_current() {
        warn!("Thread could not delete itself: {}", e);
    }
    panic!("Deleted thread was resumed");
}

fn perform(switch: ContextSwitch) {
    // Interrupts are masked by the caller's critical section and the lock is
    // released, so the ring cannot move under the switch.
    unsafe { switch.perform(&PAL_PLATFORM) };
}
