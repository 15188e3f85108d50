//! Line assembly from the receive ring buffer.
//!
//! The receive interrupt stores raw bytes; the main loop calls
//! [`LineAssembler::drain`] to turn them into complete lines. A line that is
//! still arriving stays in the assembler between calls, so a command split
//! across several interrupts is reassembled without loss.
//!
//! | Input | Effect |
//! |-------|--------|
//! | `\n` | line finished; trailing `\r`/`\n` trimmed; enqueued unless blank |
//! | byte while line < 511 | appended |
//! | byte while line = 511 | discarded until the next `\n` |

use super::command_queue::{CommandQueue, Line};
use super::ring_buffer::RingBuffer;

/// Accumulates bytes of the line currently being received.
pub struct LineAssembler {
    current: Line,
    /// Bytes were discarded from `current` because it was full.
    truncated: bool,
}

impl LineAssembler {
    pub const fn new() -> Self {
        LineAssembler {
            current: Line::new(),
            truncated: false,
        }
    }

    /// Consume bytes up to and including the next newline.
    ///
    /// Returns the finished line, or `None` when the ring buffer ran dry first
    /// (the partial line is kept) or the finished line was blank.
    pub fn next_line<const N: usize>(&mut self, rx: &RingBuffer<N>) -> Option<Line> {
        while let Some(byte) = rx.read() {
            if byte == b'\n' {
                return self.finish();
            }
            if self.current.push(byte).is_err() {
                self.truncated = true;
            }
        }
        None
    }

    /// Move every complete line currently in `rx` into `queue`.
    ///
    /// Stops when the ring buffer is empty. Lines that find the queue full
    /// are dropped. Returns the number of lines enqueued.
    pub fn drain<const N: usize>(&mut self, rx: &RingBuffer<N>, queue: &mut CommandQueue) -> usize {
        let mut enqueued = 0;
        while !rx.is_empty() {
            if let Some(line) = self.next_line(rx) {
                if queue.push(line) {
                    enqueued += 1;
                }
            }
        }
        enqueued
    }

    /// Bytes of the unfinished line.
    pub fn pending(&self) -> &[u8] {
        &self.current
    }

    fn finish(&mut self) -> Option<Line> {
        let mut line = core::mem::take(&mut self.current);

        if self.truncated {
            self.truncated = false;
            #[cfg(feature = "defmt")]
            defmt::warn!("command line truncated to {} bytes", line.len());
        }

        while matches!(line.last(), Some(b'\r') | Some(b'\n')) {
            line.pop();
        }

        if line.is_empty() {
            None
        } else {
            Some(line)
        }
    }
}

impl Default for LineAssembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::COMMAND_QUEUE_DEPTH;
    use crate::io::command_queue::MAX_LINE_LEN;
    use crate::io::ring_buffer::RxRingBuffer;

    fn feed(rx: &RxRingBuffer, bytes: &[u8]) {
        for b in bytes {
            assert!(rx.write(*b));
        }
    }

    #[test]
    fn line_equals_input_up_to_newline() {
        let rx = RxRingBuffer::new();
        let mut asm = LineAssembler::new();
        let mut q = CommandQueue::new();

        feed(&rx, b"{\"cmd\":\"READ_FW\"}\n");
        assert_eq!(asm.drain(&rx, &mut q), 1);
        assert_eq!(q.pop().unwrap().as_slice(), b"{\"cmd\":\"READ_FW\"}");
    }

    #[test]
    fn partial_line_survives_between_drains() {
        let rx = RxRingBuffer::new();
        let mut asm = LineAssembler::new();
        let mut q = CommandQueue::new();

        feed(&rx, b"READ_");
        assert_eq!(asm.drain(&rx, &mut q), 0);
        assert_eq!(asm.pending(), b"READ_");

        feed(&rx, b"HW\r\n");
        assert_eq!(asm.drain(&rx, &mut q), 1);
        assert_eq!(q.pop().unwrap().as_slice(), b"READ_HW");
        assert!(asm.pending().is_empty());
    }

    #[test]
    fn blank_lines_are_ignored() {
        let rx = RxRingBuffer::new();
        let mut asm = LineAssembler::new();
        let mut q = CommandQueue::new();

        feed(&rx, b"\r\n\n\r\nabc\n");
        assert_eq!(asm.drain(&rx, &mut q), 1);
        assert_eq!(q.pop().unwrap().as_slice(), b"abc");
    }

    #[test]
    fn several_lines_in_one_drain() {
        let rx = RxRingBuffer::new();
        let mut asm = LineAssembler::new();
        let mut q = CommandQueue::new();

        feed(&rx, b"one\ntwo\nthree\nfour\nfive\n");
        assert_eq!(asm.drain(&rx, &mut q), COMMAND_QUEUE_DEPTH);
        assert_eq!(q.dropped(), 1);
        assert_eq!(q.pop().unwrap().as_slice(), b"one");
    }

    #[test]
    fn next_line_stops_after_first_newline() {
        let rx = RxRingBuffer::new();
        let mut asm = LineAssembler::new();

        feed(&rx, b"a\nb\n");
        assert_eq!(asm.next_line(&rx).unwrap().as_slice(), b"a");
        assert_eq!(rx.len(), 2);
        assert_eq!(asm.next_line(&rx).unwrap().as_slice(), b"b");
        assert!(asm.next_line(&rx).is_none());
    }

    #[test]
    fn overlong_line_is_truncated() {
        let rx = RxRingBuffer::new();
        let mut asm = LineAssembler::new();
        let mut q = CommandQueue::new();

        // Fill in chunks so the ring buffer never overflows
        let mut remaining = MAX_LINE_LEN + 40;
        while remaining > 0 {
            let chunk = remaining.min(100);
            for _ in 0..chunk {
                assert!(rx.write(b'x'));
            }
            asm.drain(&rx, &mut q);
            remaining -= chunk;
        }
        feed(&rx, b"\nnext\n");
        assert_eq!(asm.drain(&rx, &mut q), 2);

        let long = q.pop().unwrap();
        assert_eq!(long.len(), MAX_LINE_LEN);
        assert!(long.iter().all(|&b| b == b'x'));
        assert_eq!(q.pop().unwrap().as_slice(), b"next");
    }
}
