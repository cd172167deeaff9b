pub const KIB: usize = 1024usize;

pub const DEFAULT_QUANTUM: u32 = 500;
pub const DEFAULT_BOOTSTRAP_QUANTUM: u32 = 100;
pub const DEFAULT_STACK_SIZE: usize = 16 * KIB;

/// Smallest stack that still fits the initial frame written by the platform.
pub const MINIMUM_STACK_SIZE: usize = 256;

/// Tunables of a [`crate::Scheduler`].
///
/// Only built through [`SchedulerConfig::new`] and the `with_*` setters, so
/// quanta are at least one tick and stacks hold the initial frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    quantum: u32,
    bootstrap_quantum: u32,
    stack_size: usize,
}

impl SchedulerConfig {
    pub const fn new() -> Self {
        Self {
            quantum: DEFAULT_QUANTUM,
            bootstrap_quantum: DEFAULT_BOOTSTRAP_QUANTUM,
            stack_size: DEFAULT_STACK_SIZE,
        }
    }

    // A zero quantum would make a task unschedulable, so every setter clamps
    // to at least one tick.
    pub const fn with_quantum(mut self, quantum: u32) -> Self {
        self.quantum = if quantum == 0 { 1 } else { quantum };
        self
    }

    pub const fn with_bootstrap_quantum(mut self, quantum: u32) -> Self {
        self.bootstrap_quantum = if quantum == 0 { 1 } else { quantum };
        self
    }

    pub const fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = if stack_size < MINIMUM_STACK_SIZE {
            MINIMUM_STACK_SIZE
        } else {
            stack_size
        };
        self
    }

    /// Ticks per turn for threads created with `new_thread`.
    pub const fn quantum(&self) -> u32 {
        self.quantum
    }

    /// Ticks per turn for the bootstrap task.
    pub const fn bootstrap_quantum(&self) -> u32 {
        self.bootstrap_quantum
    }

    /// Size in bytes of every thread stack.
    pub const fn stack_size(&self) -> usize {
        self.stack_size
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_kernel_constants() {
        let config = SchedulerConfig::default();
        assert_eq!(config.quantum(), 500);
        assert_eq!(config.bootstrap_quantum(), 100);
        assert_eq!(config.stack_size(), 16 * 1024);
    }

    #[test]
    fn setters_clamp_degenerate_values() {
        let config = SchedulerConfig::new()
            .with_quantum(0)
            .with_bootstrap_quantum(0)
            .with_stack_size(8);
        assert_eq!(config.quantum(), 1);
        assert_eq!(config.bootstrap_quantum(), 1);
        assert_eq!(config.stack_size(), MINIMUM_STACK_SIZE);
    }

    #[test]
    fn zero_sized_stack_request_still_fits_a_thread() {
        use crate::{
            testing::{worker_entry, MockPlatform},
            Scheduler,
        };

        let config = SchedulerConfig::default()
            .with_stack_size(0)
            .with_quantum(0);
        let mut scheduler = Scheduler::bootstrap(MockPlatform::new(), config)
            .unwrap()
            .finalize_bootstrap();
        scheduler.new_thread(worker_entry, "tiny").unwrap();
        let created = scheduler.tasks().nth(1).unwrap();
        assert!(created.owns_stack);
        assert_eq!(created.quantum, 1);
        assert_eq!(created.remaining_quantum, 1);
    }
}
