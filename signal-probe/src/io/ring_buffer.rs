//! Interrupt-to-main-loop byte ring buffer.
//!
//! The receive interrupt is the only producer; the main loop is the only
//! consumer. Each index is stored by exactly one side and loaded by the other,
//! so plain atomic loads and stores with Acquire/Release ordering are enough.
//! No read-modify-write atomics are needed, which keeps the buffer usable on
//! cores without them (Cortex-M0).
//!
//! # Safety Contract
//!
//! - Only ONE context may call [`write()`](RingBuffer::write) (the receive ISR).
//! - Only ONE context may call [`read()`](RingBuffer::read) and
//!   [`clear()`](RingBuffer::clear) (the main loop).

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use crate::constants::RING_BUFFER_SIZE;

/// Ring buffer sized for the command UART.
pub type RxRingBuffer = RingBuffer<RING_BUFFER_SIZE>;

/// Fixed-capacity single-producer single-consumer byte FIFO.
///
/// The usable capacity is `N - 1`: one slot stays empty so that
/// `head == tail` always means "empty". When the buffer is full, new bytes
/// are dropped; unread data is never overwritten.
pub struct RingBuffer<const N: usize> {
    buffer: UnsafeCell<[u8; N]>,
    /// Write position (only stored by the producer).
    head: AtomicUsize,
    /// Read position (only stored by the consumer).
    tail: AtomicUsize,
    /// Bytes dropped because the buffer was full (only stored by the producer).
    dropped: AtomicU32,
}

// SAFETY: the producer only writes the slot at `head` before publishing it,
// the consumer only reads slots in `tail..head`. Index ownership is split as
// described in the module docs.
unsafe impl<const N: usize> Sync for RingBuffer<N> {}

impl<const N: usize> RingBuffer<N> {
    /// Create an empty buffer. Usable in `static` initializers.
    pub const fn new() -> Self {
        assert!(N >= 2, "ring buffer must have at least 2 slots (1 usable)");

        RingBuffer {
            buffer: UnsafeCell::new([0; N]),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Store one byte (producer side). Never blocks.
    ///
    /// Returns `false` and drops the byte when the buffer is full.
    pub fn write(&self, byte: u8) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let next = (head + 1) % N;

        if next == self.tail.load(Ordering::Acquire) {
            let dropped = self.dropped.load(Ordering::Relaxed);
            self.dropped.store(dropped.wrapping_add(1), Ordering::Relaxed);
            return false;
        }

        // SAFETY: sole producer; `next != tail` means the consumer is not
        // reading this slot.
        unsafe {
            (*self.buffer.get())[head] = byte;
        }

        // Release publishes the byte before the new head.
        self.head.store(next, Ordering::Release);
        true
    }

    /// Take the oldest byte (consumer side). `None` when empty.
    pub fn read(&self) -> Option<u8> {
        let tail = self.tail.load(Ordering::Relaxed);

        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: sole consumer; `tail != head` means the slot was published.
        let byte = unsafe { (*self.buffer.get())[tail] };

        self.tail.store((tail + 1) % N, Ordering::Release);
        Some(byte)
    }

    /// Read up to `buf.len()` bytes; returns how many were copied.
    pub fn read_into(&self, buf: &mut [u8]) -> usize {
        let mut count = 0;
        for slot in buf.iter_mut() {
            match self.read() {
                Some(byte) => {
                    *slot = byte;
                    count += 1;
                }
                None => break,
            }
        }
        count
    }

    /// Discard everything currently buffered (consumer side).
    pub fn clear(&self) {
        let head = self.head.load(Ordering::Acquire);
        self.tail.store(head, Ordering::Release);
    }

    pub fn is_empty(&self) -> bool {
        self.tail.load(Ordering::Acquire) == self.head.load(Ordering::Acquire)
    }

    pub fn is_full(&self) -> bool {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        (head + 1) % N == tail
    }

    /// Number of unread bytes.
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        (head + N - tail) % N
    }

    /// Usable capacity (`N - 1`).
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Total bytes dropped on overflow since creation.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
