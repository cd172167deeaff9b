use alloc::vec::Vec;

use crate::{
    errors::ThreadError,
    task::{Task, TaskHandle, TaskId},
};

enum SlotState {
    Occupied(Task),
    Vacant { next_free: Option<u32> },
}

struct Slot {
    generation: u32,
    state: SlotState,
}

/// Circular doubly-linked ring of every live task.
///
/// Records live in an arena and link to each other through [`TaskHandle`]s.
/// Released slots are chained through an intrusive free list, so removing a
/// task never allocates.
pub struct TaskRing {
    slots: Vec<Slot>,
    free_head: Option<u32>,
    len: usize,
}

impl TaskRing {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Makes sure the next insert can store a record without allocating.
    pub fn reserve(&mut self) -> Result<(), ThreadError> {
        if self.free_head.is_some() || self.slots.len() < self.slots.capacity() {
            return Ok(());
        }
        self.slots
            .try_reserve(1)
            .map_err(|_| ThreadError::AllocationFailure)
    }

    pub fn get(&self, handle: TaskHandle) -> Option<&Task> {
        let slot = self.slots.get(handle.index as usize)?;
        match &slot.state {
            SlotState::Occupied(task) if slot.generation == handle.generation => Some(task),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, handle: TaskHandle) -> Option<&mut Task> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        match &mut slot.state {
            SlotState::Occupied(task) if slot.generation == handle.generation => Some(task),
            _ => None,
        }
    }

    pub fn contains(&self, handle: TaskHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Successor of `handle` in ring order.
    pub fn next_of(&self, handle: TaskHandle) -> Result<TaskHandle, ThreadError> {
        self.get(handle)
            .map(|task| task.next)
            .ok_or(ThreadError::RingConsistencyViolation)
    }

    /// Stores the very first record as a one-element self-loop.
    pub fn insert_first(&mut self, task: Task) -> Result<TaskHandle, ThreadError> {
        if !self.is_empty() {
            return Err(ThreadError::RingConsistencyViolation);
        }
        self.reserve()?;
        let handle = self.store(task);
        let task = self.task_mut(handle)?;
        task.next = handle;
        task.prev = handle;
        Ok(handle)
    }

    /// Splices `task` in right after `current`. O(1).
    pub fn insert_after(
        &mut self,
        current: TaskHandle,
        task: Task,
    ) -> Result<TaskHandle, ThreadError> {
        let next = self.next_of(current)?;
        self.reserve()?;
        let handle = self.store(task);
        {
            let inserted = self.task_mut(handle)?;
            inserted.prev = current;
            inserted.next = next;
        }
        self.task_mut(current)?.next = handle;
        self.task_mut(next)?.prev = handle;
        Ok(handle)
    }

    /// Removes `handle` from the ring, reconnecting its neighbours, and hands
    /// the record back to the caller. O(1).
    pub fn unlink(&mut self, handle: TaskHandle) -> Result<Task, ThreadError> {
        let (prev, next) = {
            let task = self.get(handle).ok_or(ThreadError::RingConsistencyViolation)?;
            (task.prev, task.next)
        };
        if next == handle {
            return Err(ThreadError::LastTask);
        }
        self.task_mut(prev)?.next = next;
        self.task_mut(next)?.prev = prev;
        self.release(handle)
    }

    /// Walks the ring starting at `start` looking for `id`.
    ///
    /// The walk ends after one full revolution, and never takes more steps
    /// than there are live records, so it terminates even when the links are
    /// broken.
    pub fn find(&self, start: TaskHandle, id: TaskId) -> Result<TaskHandle, ThreadError> {
        let mut handle = start;
        for _ in 0..self.len {
            let task = match self.get(handle) {
                Some(task) => task,
                None => break,
            };
            if task.id == id {
                return Ok(handle);
            }
            handle = task.next;
            if handle == start {
                break;
            }
        }
        Err(ThreadError::TaskNotFound(id))
    }

    /// Ring-order traversal starting at `start`, one revolution at most.
    pub fn iter(&self, start: TaskHandle) -> RingIter<'_> {
        RingIter {
            ring: self,
            start,
            next: Some(start),
            remaining: self.len,
        }
    }

    /// Checks every ring invariant reachable from `start`.
    ///
    /// Never allocates, so it can run while the heap is exhausted. The id
    /// check compares pairs and is quadratic in the ring length.
    pub fn verify(&self, start: TaskHandle) -> Result<(), ThreadError> {
        let mut visited = 0;
        let mut handle = start;
        loop {
            let task = self.get(handle).ok_or(ThreadError::RingConsistencyViolation)?;
            let next = self.get(task.next).ok_or(ThreadError::RingConsistencyViolation)?;
            let prev = self.get(task.prev).ok_or(ThreadError::RingConsistencyViolation)?;
            if next.prev != handle || prev.next != handle {
                return Err(ThreadError::RingConsistencyViolation);
            }
            visited += 1;
            if visited > self.len {
                return Err(ThreadError::RingConsistencyViolation);
            }
            handle = task.next;
            if handle == start {
                break;
            }
        }
        if visited != self.len {
            return Err(ThreadError::RingConsistencyViolation);
        }

        // The links are sound here, so every walk below covers the ring once.
        for (position, (_, task)) in self.iter(start).enumerate() {
            if self
                .iter(start)
                .skip(position + 1)
                .any(|(_, other)| other.id == task.id)
            {
                return Err(ThreadError::RingConsistencyViolation);
            }
        }
        Ok(())
    }

    fn task_mut(&mut self, handle: TaskHandle) -> Result<&mut Task, ThreadError> {
        self.get_mut(handle)
            .ok_or(ThreadError::RingConsistencyViolation)
    }

    // Callers reserve first, so neither branch allocates.
    fn store(&mut self, task: Task) -> TaskHandle {
        self.len += 1;
        match self.free_head {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                if let SlotState::Vacant { next_free } = slot.state {
                    self.free_head = next_free;
                }
                slot.state = SlotState::Occupied(task);
                TaskHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    state: SlotState::Occupied(task),
                });
                TaskHandle {
                    index,
                    generation: 0,
                }
            }
        }
    }

    fn release(&mut self, handle: TaskHandle) -> Result<Task, ThreadError> {
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .ok_or(ThreadError::RingConsistencyViolation)?;
        let vacant = SlotState::Vacant {
            next_free: self.free_head,
        };
        match core::mem::replace(&mut slot.state, vacant) {
            SlotState::Occupied(task) => {
                slot.generation = slot.generation.wrapping_add(1);
                self.free_head = Some(handle.index);
                self.len -= 1;
                Ok(task)
            }
            previous => {
                slot.state = previous;
                Err(ThreadError::RingConsistencyViolation)
            }
        }
    }
}

impl Default for TaskRing {
    fn default() -> Self {
        Self::new()
    }
}

pub struct RingIter<'a> {
    ring: &'a TaskRing,
    start: TaskHandle,
    next: Option<TaskHandle>,
    remaining: usize,
}

impl<'a> Iterator for RingIter<'a> {
    type Item = (TaskHandle, &'a Task);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.next?;
        if self.remaining == 0 {
            return None;
        }
        let task = self.ring.get(handle)?;
        self.remaining -= 1;
        self.next = if task.next == self.start {
            None
        } else {
            Some(task.next)
        };
        Some((handle, task))
    }
}
