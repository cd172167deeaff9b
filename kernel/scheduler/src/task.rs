use core::fmt::Display;

use crate::stack::TaskStack;

/// Unique thread identifier. Never reused while the scheduler lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct TaskId(u64);

impl TaskId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable reference to a slot in the ready ring arena.
///
/// The generation changes every time a slot is released, so a handle to a
/// deleted task never resolves to whatever reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Built with a synthetic frame, never ran.
    Created,
    /// In the ring waiting for its turn.
    Ready,
    /// Holds the processor.
    Running,
}

#[derive(Debug)]
pub struct Task {
    pub(crate) id: TaskId,
    pub(crate) name: &'static str,
    pub(crate) saved_stack_pointer: usize,
    pub(crate) stack: Option<TaskStack>,
    pub(crate) address_space: usize,
    pub(crate) quantum: u32,
    pub(crate) remaining_quantum: u32,
    pub(crate) state: TaskState,
    pub(crate) next: TaskHandle,
    pub(crate) prev: TaskHandle,
}

impl Task {
    /// Record for a thread that gets its own stack. Links are filled in when
    /// the record is spliced into the ring.
    pub(crate) fn new(
        id: TaskId,
        name: &'static str,
        stack: TaskStack,
        saved_stack_pointer: usize,
        address_space: usize,
        quantum: u32,
    ) -> Self {
        Self {
            id,
            name,
            saved_stack_pointer,
            stack: Some(stack),
            address_space,
            quantum,
            remaining_quantum: quantum,
            state: TaskState::Created,
            next: TaskHandle::DANGLING,
            prev: TaskHandle::DANGLING,
        }
    }

    /// Record for the context that is already running: no stack of its own,
    /// the live stack pointer and address space are adopted as they are.
    pub(crate) fn adopt_running(
        id: TaskId,
        name: &'static str,
        stack_pointer: usize,
        address_space: usize,
        quantum: u32,
    ) -> Self {
        Self {
            id,
            name,
            saved_stack_pointer: stack_pointer,
            stack: None,
            address_space,
            quantum,
            remaining_quantum: quantum,
            state: TaskState::Running,
            next: TaskHandle::DANGLING,
            prev: TaskHandle::DANGLING,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn info(&self) -> TaskInfo {
        TaskInfo {
            id: self.id,
            name: self.name,
            quantum: self.quantum,
            remaining_quantum: self.remaining_quantum,
            state: self.state,
            saved_stack_pointer: self.saved_stack_pointer,
            address_space: self.address_space,
            owns_stack: self.stack.is_some(),
        }
    }
}

impl TaskHandle {
    pub(crate) const DANGLING: TaskHandle = TaskHandle {
        index: u32::MAX,
        generation: u32::MAX,
    };
}

/// Copy of the observable fields of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskInfo {
    pub id: TaskId,
    pub name: &'static str,
    pub quantum: u32,
    pub remaining_quantum: u32,
    pub state: TaskState,
    pub saved_stack_pointer: usize,
    pub address_space: usize,
    pub owns_stack: bool,
}
