use core::{arch::asm, arch::global_asm, mem::size_of};

use pal::ThreadEntry;

/// RFLAGS of a thread's first run: interrupts on, reserved bit 1 set.
const INITIAL_RFLAGS: usize = 0x202;

/// Words in the frame `pal_context_swap` pops: r15, r14, r13, r12, rbx, rbp
/// and rflags, followed by the return address.
const SAVED_REGISTER_WORDS: usize = 7;

// Callee-preserved registers and RFLAGS are kept on the outgoing stack; only
// the stack pointer is stored in the task record. The incoming stack pointer
// is loaded after the outgoing one is stored, so swapping a context with
// itself is a clean no-op.
global_asm!(
    "
    .global pal_context_swap
pal_context_swap:
    pushfq
    push    rbp
    push    rbx
    push    r12
    push    r13
    push    r14
    push    r15
    mov     [rdi], rsp
    mov     cr3, rdx
    mov     rsp, [rsi]
    pop     r15
    pop     r14
    pop     r13
    pop     r12
    pop     rbx
    pop     rbp
    popfq
    ret

    .global pal_thread_return
pal_thread_return:
    // Reached through the entry function's `ret`.
    and     rsp, -16
    call    thread_exit
    ud2
"
);

extern "C" {
    /// # Safety
    /// See [`pal::ExecutionContext::swap`].
    pub fn pal_context_swap(from: *mut usize, to: *const usize, address_space: usize);

    fn pal_thread_return();
}

/// Lays out the frame `pal_context_swap` expects at the top of `stack`:
///
/// ```text
///  top - 8   pal_thread_return   <- return address seen by `entry`
///  top - 16  entry               <- popped by `ret`
///  top - 24  rflags
///  top - 32  rbp .. top - 72 r15 <- returned stack pointer
/// ```
///
/// After `ret` the stack pointer is `top - 8`, which is what the System V
/// ABI expects on function entry.
pub fn build_initial_frame(stack: &mut [u8], entry: ThreadEntry) -> usize {
    let word = size_of::<usize>();
    let frame_words = SAVED_REGISTER_WORDS + 2;
    assert!(
        stack.len() >= (frame_words + 2) * word,
        "Thread stack of {} bytes cannot hold the initial frame",
        stack.len()
    );

    let top = (stack.as_mut_ptr() as usize + stack.len()) & !0xF;
    let frame = top - frame_words * word;
    let mut words = [0usize; SAVED_REGISTER_WORDS + 2];
    words[SAVED_REGISTER_WORDS - 1] = INITIAL_RFLAGS;
    words[SAVED_REGISTER_WORDS] = entry as usize;
    words[SAVED_REGISTER_WORDS + 1] = pal_thread_return as usize;

    for (index, value) in words.iter().enumerate() {
        unsafe { (frame as *mut usize).add(index).write(*value) };
    }
    frame
}

#[inline]
pub fn read_stack_pointer() -> usize {
    let rsp: usize;
    unsafe {
        asm!("mov {}, rsp", out(reg) rsp, options(nomem, nostack, preserves_flags));
    }
    rsp
}

#[inline]
pub fn read_page_table_base() -> usize {
    let cr3: usize;
    unsafe {
        asm!("mov {}, cr3", out(reg) cr3, options(nomem, nostack, preserves_flags));
    }
    cr3
}
