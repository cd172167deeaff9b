use alloc::vec::Vec;
use core::{
    marker::PhantomData,
    ptr,
    sync::atomic::{AtomicU64, Ordering},
};

use pal::{debug, fatal, info, warn, ExecutionContext, InterruptControl, ThreadEntry};

use crate::{
    config::SchedulerConfig,
    context::ContextSwitch,
    critical::CriticalSection,
    errors::ThreadError,
    ring::TaskRing,
    stack::TaskStack,
    task::{Task, TaskHandle, TaskId, TaskInfo, TaskState},
};

pub const BOOTSTRAP_TASK_NAME: &str = "kernel_early";
pub const KERNEL_TASK_NAME: &str = "[KERNEL]";

mod sealed {
    pub trait Sealed {}
}

/// Initialization phase of a [`Scheduler`].
pub trait Phase: sealed::Sealed {
    /// Whether full system initialization has completed.
    const READY: bool;
}

/// Between [`Scheduler::bootstrap`] and [`Scheduler::finalize_bootstrap`].
/// New threads become current immediately and deleting the current task
/// never transfers control.
pub struct Bootstrapping;

/// Steady state: the timer drives [`Scheduler::tick`] and deleting the
/// current task transfers control to its successor.
pub struct Ready;

impl sealed::Sealed for Bootstrapping {}
impl sealed::Sealed for Ready {}

impl Phase for Bootstrapping {
    const READY: bool = false;
}

impl Phase for Ready {
    const READY: bool = true;
}

struct TaskTable {
    config: SchedulerConfig,
    ring: TaskRing,
    current: TaskHandle,
    bootstrap_task: TaskHandle,
    next_id: AtomicU64,
    // Stack of a task that deleted itself while running on it. Freed by the
    // next lifecycle operation, once execution has moved elsewhere.
    retired_stack: Option<TaskStack>,
    // Save slot for contexts that must never be resumed.
    discarded_stack_pointer: usize,
}

/// Owner of the ready ring and of the current-task reference.
///
/// The phase parameter encodes whether full system initialization has
/// completed; it only ever moves from [`Bootstrapping`] to [`Ready`].
pub struct Scheduler<P, S: Phase> {
    platform: P,
    table: TaskTable,
    phase: PhantomData<S>,
}

impl<P: InterruptControl + ExecutionContext> Scheduler<P, Bootstrapping> {
    /// Promotes the running context into the first task.
    ///
    /// Must run once, with interrupts disabled, before any other task exists.
    /// The live stack pointer and address space are adopted as they are; no
    /// stack is allocated.
    pub fn bootstrap(platform: P, config: SchedulerConfig) -> Result<Self, ThreadError> {
        let next_id = AtomicU64::new(0);
        let (ring, handle) = {
            let _guard = CriticalSection::enter(&platform);
            debug!("Creating kernel task");
            let id = TaskId::new(next_id.fetch_add(1, Ordering::SeqCst));
            let task = Task::adopt_running(
                id,
                BOOTSTRAP_TASK_NAME,
                platform.stack_pointer(),
                platform.address_space(),
                config.bootstrap_quantum(),
            );
            let mut ring = TaskRing::new();
            let handle = ring.insert_first(task)?;
            (ring, handle)
        };
        info!("Tasking initialized");

        Ok(Self {
            platform,
            table: TaskTable {
                config,
                ring,
                current: handle,
                bootstrap_task: handle,
                next_id,
                retired_stack: None,
                discarded_stack_pointer: 0,
            },
            phase: PhantomData,
        })
    }

    /// Ends the bootstrap phase: the startup context becomes the canonical
    /// current task again, under its steady-state name.
    pub fn finalize_bootstrap(mut self) -> Scheduler<P, Ready> {
        {
            let _guard = CriticalSection::enter(&self.platform);
            let table = &mut self.table;
            table.current = table.bootstrap_task;
            if let Some(kernel) = table.ring.get_mut(table.bootstrap_task) {
                kernel.name = KERNEL_TASK_NAME;
                kernel.state = TaskState::Running;
            }
            table.check_ring();
        }
        info!("Bootstrap finalized, {} task(s) ready", self.table.ring.len());

        Scheduler {
            platform: self.platform,
            table: self.table,
            phase: PhantomData,
        }
    }
}

impl<P: InterruptControl + ExecutionContext> Scheduler<P, Ready> {
    /// Timer interrupt body.
    ///
    /// Charges the tick to the current task while it has quantum left and
    /// answers with the no-op `swap(current, current)`. Once the quantum is
    /// spent it is refilled and the ring rotates; the rotating tick counts as
    /// the first one of the incoming task. The interrupt is acknowledged
    /// exactly once either way, before the returned switch is performed.
    pub fn tick(&mut self) -> Result<ContextSwitch, ThreadError> {
        let _guard = CriticalSection::enter(&self.platform);
        let switch = self.table.rotate();
        self.platform.end_of_interrupt();
        switch
    }
}

impl<P: InterruptControl + ExecutionContext, S: Phase> Scheduler<P, S> {
    /// Creates a thread that starts at `entry` and deletes itself when
    /// `entry` returns.
    ///
    /// Both the stack and the record slot are secured before the ring is
    /// touched, so an [`ThreadError::AllocationFailure`] leaves everything as
    /// it was. While bootstrapping, the new task becomes current at once.
    pub fn new_thread(
        &mut self,
        entry: ThreadEntry,
        name: &'static str,
    ) -> Result<TaskId, ThreadError> {
        let _guard = CriticalSection::enter(&self.platform);
        let table = &mut self.table;
        table.retired_stack = None;
        debug!("Allocating thread {}", name);

        let mut stack = TaskStack::allocate(table.config.stack_size())?;
        table.ring.reserve()?;

        let address_space = self.platform.address_space();
        let stack_pointer = self.platform.prepare_stack(stack.as_mut_slice(), entry);
        let id = TaskId::new(table.next_id.fetch_add(1, Ordering::SeqCst));
        let task = Task::new(
            id,
            name,
            stack,
            stack_pointer,
            address_space,
            table.config.quantum(),
        );
        let handle = table.ring.insert_after(table.current, task)?;
        if !S::READY {
            // Only the current task is ever marked Running.
            if let Some(previous) = table.ring.get_mut(table.current) {
                if previous.state == TaskState::Running {
                    previous.state = TaskState::Ready;
                }
            }
            table.current = handle;
        }
        table.check_ring();

        info!("Created thread with ID: {}, {}", id, name);
        Ok(id)
    }

    /// Deletes the task with `id`.
    ///
    /// Deleting the current task moves current to its successor. Once the
    /// scheduler is [`Ready`] the returned switch must be performed right
    /// away: it abandons the deleted context, which is never resumed.
    pub fn delete(&mut self, id: TaskId) -> Result<Option<ContextSwitch>, ThreadError> {
        let _guard = CriticalSection::enter(&self.platform);
        let handle = match self.table.ring.find(self.table.current, id) {
            Ok(handle) => handle,
            Err(e) => {
                warn!("{}", e);
                return Err(e);
            }
        };
        self.table.remove(handle, S::READY)
    }

    /// [`Scheduler::delete`] for the current task, without the lookup.
    pub fn delete_current(&mut self) -> Result<Option<ContextSwitch>, ThreadError> {
        let _guard = CriticalSection::enter(&self.platform);
        let current = self.table.current;
        self.table.remove(current, S::READY)
    }

    pub fn current(&self) -> Option<TaskInfo> {
        self.table.ring.get(self.table.current).map(Task::info)
    }

    pub fn current_id(&self) -> Option<TaskId> {
        self.table.ring.get(self.table.current).map(Task::id)
    }

    /// Every live task in scheduling order, starting with the current one.
    pub fn tasks(&self) -> impl Iterator<Item = TaskInfo> + '_ {
        self.table
            .ring
            .iter(self.table.current)
            .map(|(_, task)| task.info())
    }

    pub fn snapshot(&self) -> Vec<TaskInfo> {
        self.tasks().collect()
    }

    pub fn task_count(&self) -> usize {
        self.table.ring.len()
    }

    pub fn is_ready(&self) -> bool {
        S::READY
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }
}

impl TaskTable {
    fn rotate(&mut self) -> Result<ContextSwitch, ThreadError> {
        let current = self.current;
        let task = self
            .ring
            .get_mut(current)
            .ok_or(ThreadError::RingConsistencyViolation)?;

        if task.remaining_quantum > 0 {
            task.remaining_quantum -= 1;
            return self.switch_between(current, current);
        }

        task.remaining_quantum = task.quantum;
        task.state = TaskState::Ready;
        let next = task.next;

        let incoming = self
            .ring
            .get_mut(next)
            .ok_or(ThreadError::RingConsistencyViolation)?;
        incoming.remaining_quantum = incoming.remaining_quantum.saturating_sub(1);
        incoming.state = TaskState::Running;
        self.current = next;

        self.switch_between(current, next)
    }

    fn remove(
        &mut self,
        handle: TaskHandle,
        ready: bool,
    ) -> Result<Option<ContextSwitch>, ThreadError> {
        if !ready && handle == self.bootstrap_task {
            return Err(ThreadError::BootstrapTaskPinned);
        }
        let was_current = handle == self.current;
        let successor = self.ring.next_of(handle)?;
        let task = self.ring.unlink(handle)?;
        info!("Deleting thread ID: {}, {}", task.id, task.name);

        if !was_current {
            drop(task);
            self.check_ring();
            return Ok(None);
        }

        self.current = successor;
        // Execution may still be on this stack; see `retired_stack`.
        self.retired_stack = task.stack;
        if !ready {
            // The boot context keeps executing until finalize, so it is the
            // one Running task whenever it is current.
            if successor == self.bootstrap_task {
                if let Some(kernel) = self.ring.get_mut(successor) {
                    kernel.state = TaskState::Running;
                }
            }
            self.check_ring();
            return Ok(None);
        }
        self.check_ring();

        let incoming = self
            .ring
            .get_mut(successor)
            .ok_or(ThreadError::RingConsistencyViolation)?;
        incoming.state = TaskState::Running;
        Ok(Some(ContextSwitch {
            from: ptr::addr_of_mut!(self.discarded_stack_pointer),
            to: ptr::addr_of!(incoming.saved_stack_pointer),
            address_space: incoming.address_space,
        }))
    }

    fn switch_between(
        &mut self,
        from: TaskHandle,
        to: TaskHandle,
    ) -> Result<ContextSwitch, ThreadError> {
        let outgoing = self
            .ring
            .get_mut(from)
            .ok_or(ThreadError::RingConsistencyViolation)?;
        let from_slot = ptr::addr_of_mut!(outgoing.saved_stack_pointer);
        if from == to {
            return Ok(ContextSwitch {
                from: from_slot,
                to: from_slot,
                address_space: outgoing.address_space,
            });
        }

        let incoming = self
            .ring
            .get(to)
            .ok_or(ThreadError::RingConsistencyViolation)?;
        Ok(ContextSwitch {
            from: from_slot,
            to: ptr::addr_of!(incoming.saved_stack_pointer),
            address_space: incoming.address_space,
        })
    }

    fn check_ring(&self) {
        if !cfg!(debug_assertions) {
            return;
        }
        if let Err(e) = self.ring.verify(self.current) {
            fatal!("Ready ring verification failed: {}", e);
            panic!("{}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        ids, idle_entry, worker_entry, MockPlatform, BOOT_ADDRESS_SPACE, BOOT_STACK_POINTER,
    };
    use std::vec::Vec;

    fn config() -> SchedulerConfig {
        SchedulerConfig::new().with_stack_size(4096)
    }

    fn bootstrap() -> Scheduler<MockPlatform, Bootstrapping> {
        Scheduler::bootstrap(MockPlatform::new(), config()).unwrap()
    }

    fn ready_with(names: &[&'static str], quantum: u32) -> Scheduler<MockPlatform, Ready> {
        let config = config()
            .with_quantum(quantum)
            .with_bootstrap_quantum(quantum);
        let mut scheduler = Scheduler::bootstrap(MockPlatform::new(), config).unwrap();
        // Seeding keeps moving current forward, so creation order is ring order.
        for name in names {
            scheduler.new_thread(worker_entry, *name).unwrap();
        }
        scheduler.finalize_bootstrap()
    }

    fn tick(scheduler: &mut Scheduler<MockPlatform, Ready>) -> &'static str {
        let switch = scheduler.tick().unwrap();
        unsafe { switch.perform(scheduler.platform()) };
        scheduler.current().unwrap().name
    }

    fn assert_ring_consistent<S: Phase>(scheduler: &Scheduler<MockPlatform, S>) {
        scheduler
            .table
            .ring
            .verify(scheduler.table.current)
            .unwrap();
    }

    #[test]
    fn bootstrap_yields_a_self_looped_kernel_task() {
        let scheduler = bootstrap();
        assert_eq!(scheduler.task_count(), 1);
        let kernel = scheduler.current().unwrap();
        assert_eq!(kernel.id, TaskId::new(0));
        assert_eq!(kernel.name, BOOTSTRAP_TASK_NAME);
        assert_eq!(kernel.saved_stack_pointer, BOOT_STACK_POINTER);
        assert_eq!(kernel.address_space, BOOT_ADDRESS_SPACE);
        assert_eq!(kernel.quantum, 100);
        assert!(!kernel.owns_stack);
        let handle = scheduler.table.current;
        let record = scheduler.table.ring.get(handle).unwrap();
        assert_eq!(record.next, handle);
        assert_eq!(record.prev, handle);
        assert!(!scheduler.is_ready());
    }

    #[test]
    fn new_thread_before_finalize_becomes_current() {
        let mut scheduler = bootstrap();
        let id = scheduler.new_thread(idle_entry, "idle").unwrap();
        let current = scheduler.current().unwrap();
        assert_eq!(current.id, id);
        assert_eq!(current.state, TaskState::Created);
        assert_eq!(current.quantum, 500);
        assert_eq!(current.remaining_quantum, 500);
        assert!(current.owns_stack);
    }

    #[test]
    fn new_thread_after_finalize_keeps_current_and_splices_after_it() {
        let mut scheduler = bootstrap().finalize_bootstrap();
        let first = scheduler.new_thread(worker_entry, "first").unwrap();
        let second = scheduler.new_thread(worker_entry, "second").unwrap();
        assert_eq!(scheduler.current_id(), Some(TaskId::new(0)));
        assert_eq!(
            ids(scheduler.tasks()),
            [0, second.as_u64(), first.as_u64()]
        );
    }

    #[test]
    fn new_thread_captures_the_creators_address_space() {
        let mut scheduler = bootstrap().finalize_bootstrap();
        scheduler.platform().set_address_space(0x5000);
        scheduler.new_thread(worker_entry, "mapped").unwrap();
        let created = scheduler.tasks().nth(1).unwrap();
        assert_eq!(created.address_space, 0x5000);
    }

    #[test]
    fn new_thread_builds_the_platform_frame_inside_its_stack() {
        let mut scheduler = bootstrap();
        scheduler.new_thread(worker_entry, "worker").unwrap();
        let handle = scheduler.table.current;
        let task = scheduler.table.ring.get(handle).unwrap();
        let (bottom, top) = task.stack.as_ref().unwrap().bounds();
        assert!(task.saved_stack_pointer >= bottom && task.saved_stack_pointer < top);
        let entry = unsafe { *(task.saved_stack_pointer as *const usize) };
        assert_eq!(entry, worker_entry as usize);
    }

    #[test]
    fn allocation_failure_leaves_the_ring_untouched() {
        let config = SchedulerConfig::new().with_stack_size(usize::MAX);
        let mut scheduler = Scheduler::bootstrap(MockPlatform::new(), config).unwrap();
        let before = scheduler.snapshot();
        assert_eq!(
            scheduler.new_thread(worker_entry, "too big").unwrap_err(),
            ThreadError::AllocationFailure
        );
        assert_eq!(scheduler.snapshot(), before);
        assert_ring_consistent(&scheduler);
    }

    #[test]
    fn ids_are_strictly_increasing_and_never_reused() {
        let mut scheduler = bootstrap().finalize_bootstrap();
        let mut issued = Vec::new();
        for round in 0..32 {
            let id = scheduler.new_thread(worker_entry, "worker").unwrap();
            issued.push(id);
            if round % 3 == 0 {
                assert!(scheduler.delete(id).unwrap().is_none());
            }
        }
        assert!(issued.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(issued.iter().all(|id| *id > TaskId::new(0)));
    }

    #[test]
    fn ring_stays_consistent_across_create_delete_sequences() {
        let mut scheduler = bootstrap().finalize_bootstrap();
        let mut live: Vec<TaskId> = Vec::new();
        let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
        for _ in 0..500 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            match seed % 4 {
                0 | 1 => live.push(scheduler.new_thread(worker_entry, "worker").unwrap()),
                2 if !live.is_empty() => {
                    let id = live.remove((seed as usize / 4) % live.len());
                    let switch = scheduler.delete(id).unwrap();
                    if let Some(switch) = switch {
                        unsafe { switch.perform(scheduler.platform()) };
                    }
                }
                _ => {
                    let switch = scheduler.tick().unwrap();
                    unsafe { switch.perform(scheduler.platform()) };
                }
            }
            assert_ring_consistent(&scheduler);
            assert_eq!(scheduler.task_count(), live.len() + 1);
        }
    }

    #[test]
    fn round_robin_follows_the_ring_for_whole_quanta() {
        let mut scheduler = ready_with(&["A", "B", "C"], 2);
        assert_eq!(scheduler.current().unwrap().remaining_quantum, 2);
        let running: Vec<&str> = (0..8).map(|_| tick(&mut scheduler)).collect();
        assert_eq!(running, ["[KERNEL]", "[KERNEL]", "A", "A", "B", "B", "C", "C"]);
        assert_eq!(tick(&mut scheduler), "[KERNEL]");
    }

    #[test]
    fn every_task_gets_exactly_its_quantum_per_revolution() {
        let names = ["A", "B", "C", "D"];
        let quantum = 3;
        let mut scheduler = ready_with(&names, quantum);
        // Walk to the start of a fresh turn for the kernel task.
        while scheduler.current().unwrap().name != "D" {
            tick(&mut scheduler);
        }
        while scheduler.current().unwrap().name == "D" {
            tick(&mut scheduler);
        }

        let k = names.len() + 1;
        let mut counts = std::collections::HashMap::new();
        let first = scheduler.current().unwrap().name;
        *counts.entry(first).or_insert(0u32) += 1;
        for _ in 1..(k as u32 * quantum) {
            *counts.entry(tick(&mut scheduler)).or_insert(0u32) += 1;
        }
        assert_eq!(counts.len(), k);
        assert!(counts.values().all(|count| *count == quantum));
        assert_eq!(tick(&mut scheduler), first);
    }

    #[test]
    fn non_rotating_tick_is_a_noop_swap_that_acknowledges() {
        let mut scheduler = ready_with(&["A"], 5);
        let acknowledged = scheduler.platform().acknowledged();
        let switch = scheduler.tick().unwrap();
        assert!(switch.is_noop());
        let before = scheduler.snapshot();
        let live = scheduler.platform().live_stack_pointer();
        unsafe { switch.perform(scheduler.platform()) };
        assert_eq!(scheduler.snapshot(), before);
        assert_eq!(scheduler.platform().live_stack_pointer(), live);
        assert_eq!(scheduler.platform().acknowledged(), acknowledged + 1);
    }

    #[test]
    fn every_tick_acknowledges_exactly_once_with_interrupts_masked() {
        let mut scheduler = ready_with(&["A", "B"], 1);
        scheduler.platform().enable_interrupts();
        for expected in 1..=20 {
            tick(&mut scheduler);
            assert_eq!(scheduler.platform().acknowledged(), expected);
        }
        assert!(scheduler.platform().always_masked_when_acknowledging());
        assert!(scheduler.platform().interrupts_enabled());
    }

    #[test]
    fn rotation_switches_address_space_and_stack() {
        let mut scheduler = ready_with(&["A"], 1);
        scheduler.platform().set_address_space(0x9000);
        let target = scheduler.tasks().nth(1).unwrap();
        tick(&mut scheduler);
        assert_eq!(tick(&mut scheduler), "A");
        assert_eq!(scheduler.platform().live_stack_pointer(), target.saved_stack_pointer);
        assert_eq!(scheduler.platform().address_space(), target.address_space);
        let kernel = scheduler.tasks().nth(1).unwrap();
        assert_eq!(kernel.saved_stack_pointer, BOOT_STACK_POINTER);
        assert_eq!(kernel.state, TaskState::Ready);
    }

    #[test]
    fn deleting_a_non_current_task_preserves_current_and_order() {
        let mut scheduler = ready_with(&["A", "B", "C"], 4);
        tick(&mut scheduler);
        let current = scheduler.current().unwrap();
        let b = scheduler.tasks().find(|t| t.name == "B").unwrap();
        assert!(scheduler.delete(b.id).unwrap().is_none());
        assert_eq!(scheduler.current().unwrap(), current);
        let names: Vec<&str> = scheduler.tasks().map(|t| t.name).collect();
        assert_eq!(names, ["[KERNEL]", "A", "C"]);
    }

    #[test]
    fn deleting_the_current_task_runs_its_successor_next() {
        let mut scheduler = ready_with(&["A", "B"], 2);
        tick(&mut scheduler);
        tick(&mut scheduler);
        assert_eq!(tick(&mut scheduler), "A");
        let a = scheduler.current().unwrap();
        let b = scheduler.tasks().nth(1).unwrap();

        let switch = scheduler.delete(a.id).unwrap().unwrap();
        assert!(!switch.is_noop());
        assert_eq!(scheduler.current().unwrap().id, b.id);
        unsafe { switch.perform(scheduler.platform()) };
        assert_eq!(scheduler.platform().live_stack_pointer(), b.saved_stack_pointer);
        assert_eq!(scheduler.current().unwrap().state, TaskState::Running);
        // Quantum of the successor is left as it was.
        assert_eq!(scheduler.current().unwrap().remaining_quantum, b.remaining_quantum);
        assert!(scheduler.table.retired_stack.is_some());

        scheduler.new_thread(worker_entry, "reaper").unwrap();
        assert!(scheduler.table.retired_stack.is_none());
    }

    #[test]
    fn delete_current_skips_the_lookup_but_behaves_the_same() {
        let mut scheduler = ready_with(&["A"], 1);
        let successor = scheduler.tasks().nth(1).unwrap();
        let switch = scheduler.delete_current().unwrap().unwrap();
        unsafe { switch.perform(scheduler.platform()) };
        assert_eq!(scheduler.current().unwrap().id, successor.id);
        assert_eq!(scheduler.task_count(), 1);
        assert_eq!(scheduler.platform().swaps(), 1);
    }

    #[test]
    fn deleting_current_while_bootstrapping_defers_the_transfer() {
        let mut scheduler = bootstrap();
        let a = scheduler.new_thread(worker_entry, "A").unwrap();
        assert!(scheduler.delete(a).unwrap().is_none());
        assert_eq!(scheduler.current_id(), Some(TaskId::new(0)));
        assert_eq!(scheduler.platform().swaps(), 0);
    }

    #[test]
    fn bootstrap_task_is_pinned_until_finalized() {
        let mut scheduler = bootstrap();
        scheduler.new_thread(worker_entry, "A").unwrap();
        assert_eq!(
            scheduler.delete(TaskId::new(0)).unwrap_err(),
            ThreadError::BootstrapTaskPinned
        );
        assert_eq!(scheduler.task_count(), 2);

        let mut scheduler = scheduler.finalize_bootstrap();
        let switch = scheduler.delete(TaskId::new(0)).unwrap().unwrap();
        unsafe { switch.perform(scheduler.platform()) };
        assert_eq!(scheduler.current().unwrap().name, "A");
    }

    #[test]
    fn deleting_a_missing_id_changes_nothing() {
        let mut scheduler = ready_with(&["A", "B"], 3);
        tick(&mut scheduler);
        let before = scheduler.snapshot();
        let handle = scheduler.table.current;
        assert_eq!(
            scheduler.delete(TaskId::new(99)).unwrap_err(),
            ThreadError::TaskNotFound(TaskId::new(99))
        );
        assert_eq!(scheduler.snapshot(), before);
        assert_eq!(scheduler.table.current, handle);
    }

    #[test]
    fn the_last_task_cannot_be_deleted() {
        let mut scheduler = bootstrap().finalize_bootstrap();
        assert_eq!(
            scheduler.delete_current().unwrap_err(),
            ThreadError::LastTask
        );
        assert_eq!(scheduler.task_count(), 1);
        assert_ring_consistent(&scheduler);
    }

    fn assert_running_is_current<S: Phase>(scheduler: &Scheduler<MockPlatform, S>) {
        let current = scheduler.current_id();
        for task in scheduler.tasks() {
            if task.state == TaskState::Running {
                assert_eq!(Some(task.id), current, "{} is Running", task.name);
            }
        }
    }

    #[test]
    fn only_the_current_task_is_marked_running_while_bootstrapping() {
        let mut scheduler = bootstrap();
        let a = scheduler.new_thread(worker_entry, "A").unwrap();
        let b = scheduler.new_thread(worker_entry, "B").unwrap();
        assert_running_is_current(&scheduler);
        let states: Vec<_> = scheduler.tasks().map(|t| (t.id, t.state)).collect();
        assert_eq!(
            states,
            [
                (b, TaskState::Created),
                (TaskId::new(0), TaskState::Ready),
                (a, TaskState::Created),
            ]
        );

        assert!(scheduler.delete(b).unwrap().is_none());
        assert_eq!(scheduler.current().unwrap().state, TaskState::Running);
        assert_running_is_current(&scheduler);

        let scheduler = scheduler.finalize_bootstrap();
        assert_running_is_current(&scheduler);
        assert_eq!(scheduler.tasks().nth(1).unwrap().state, TaskState::Created);
    }

    #[test]
    fn finalize_reinstalls_the_kernel_task() {
        let mut scheduler = bootstrap();
        scheduler.new_thread(worker_entry, "A").unwrap();
        assert_eq!(scheduler.current().unwrap().name, "A");
        let scheduler = scheduler.finalize_bootstrap();
        let kernel = scheduler.current().unwrap();
        assert_eq!(kernel.id, TaskId::new(0));
        assert_eq!(kernel.name, KERNEL_TASK_NAME);
        assert_eq!(kernel.state, TaskState::Running);
        assert!(scheduler.is_ready());
    }

    #[test]
    fn lifecycle_operations_restore_the_interrupt_flag() {
        let mut scheduler = bootstrap().finalize_bootstrap();
        scheduler.platform().enable_interrupts();
        let id = scheduler.new_thread(worker_entry, "A").unwrap();
        assert!(scheduler.platform().interrupts_enabled());
        assert!(scheduler.delete(TaskId::new(42)).is_err());
        assert!(scheduler.platform().interrupts_enabled());
        assert!(scheduler.delete(id).unwrap().is_none());
        assert!(scheduler.platform().interrupts_enabled());
    }
}
