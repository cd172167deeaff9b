use core::{
    alloc::{GlobalAlloc, Layout},
    ptr,
};

use linked_list_allocator::LockedHeap;
use x86_64::instructions::interrupts;

use pal::debug;

pub const KERNEL_HEAP_SIZE: usize = 1024 * 1024; // 1mb

static mut KERNEL_HEAP: [u8; KERNEL_HEAP_SIZE] = [0; KERNEL_HEAP_SIZE];

/// Kernel heap. Thread stacks come from here.
///
/// The heap lock is a spin lock and the timer may preempt a thread at any
/// instruction, so every operation runs with interrupts masked. Otherwise a
/// thread preempted while holding the lock would leave the next allocating
/// thread spinning forever.
pub(crate) struct KernelAllocator(LockedHeap);

impl KernelAllocator {
    pub const fn empty() -> KernelAllocator {
        KernelAllocator(LockedHeap::empty())
    }

    fn init(&self, heap_start: *mut u8, heap_size: usize) {
        interrupts::without_interrupts(|| unsafe {
            self.0.lock().init(heap_start, heap_size);
        });
    }

    pub fn used(&self) -> usize {
        interrupts::without_interrupts(|| self.0.lock().used())
    }

    pub fn free(&self) -> usize {
        interrupts::without_interrupts(|| self.0.lock().free())
    }
}

unsafe impl GlobalAlloc for KernelAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        interrupts::without_interrupts(|| self.0.alloc(layout))
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        interrupts::without_interrupts(|| self.0.dealloc(ptr, layout))
    }
}

#[global_allocator]
pub(crate) static ALLOCATOR: KernelAllocator = KernelAllocator::empty();

pub fn init() {
    let heap_start = unsafe { ptr::addr_of_mut!(KERNEL_HEAP) } as *mut u8;
    ALLOCATOR.init(heap_start, KERNEL_HEAP_SIZE);
    debug!(
        "Kernel heap at {:p}, {} bytes free",
        heap_start,
        ALLOCATOR.free()
    );
}
