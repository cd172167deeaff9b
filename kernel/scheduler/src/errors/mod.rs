use core::fmt::Display;

use crate::task::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadError {
    /// A stack block or task record could not be allocated.
    AllocationFailure,
    TaskNotFound(TaskId),
    /// The ready ring links do not form a single consistent circle.
    RingConsistencyViolation,
    /// Removing the task would leave the ready ring empty.
    LastTask,
    /// The bootstrap task is re-installed by `finalize_bootstrap` and can't
    /// be deleted before that.
    BootstrapTaskPinned,
}

impl Display for ThreadError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ThreadError::AllocationFailure => write!(f, "Unable to allocate task stack or record"),
            ThreadError::TaskNotFound(id) => write!(f, "Task with ID {} does not exist", id),
            ThreadError::RingConsistencyViolation => write!(f, "Ready ring is corrupted"),
            ThreadError::LastTask => write!(f, "Refusing to delete the last task in the ready ring"),
            ThreadError::BootstrapTaskPinned => {
                write!(f, "The bootstrap task cannot be deleted before bootstrap is finalized")
            }
        }
    }
}

impl core::error::Error for ThreadError {}
