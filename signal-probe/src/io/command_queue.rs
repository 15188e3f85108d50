//! Bounded FIFO of complete command lines.

use heapless::{Deque, Vec};

use crate::constants::{COMMAND_LENGTH, COMMAND_QUEUE_DEPTH};

/// Longest line stored; one slot of [`COMMAND_LENGTH`] is the terminator.
pub const MAX_LINE_LEN: usize = COMMAND_LENGTH - 1;

/// One received command line without its terminator.
pub type Line = Vec<u8, MAX_LINE_LEN>;

/// Queue of lines waiting for the main loop.
///
/// Owned by the main loop only. A full queue drops new lines and counts them;
/// queued lines are never replaced.
pub struct CommandQueue {
    lines: Deque<Line, COMMAND_QUEUE_DEPTH>,
    dropped: u32,
}

impl CommandQueue {
    pub const fn new() -> Self {
        CommandQueue {
            lines: Deque::new(),
            dropped: 0,
        }
    }

    /// Append a line. Returns `false` if the queue was full and the line
    /// was dropped.
    pub fn push(&mut self, line: Line) -> bool {
        match self.lines.push_back(line) {
            Ok(()) => true,
            Err(_) => {
                self.dropped = self.dropped.wrapping_add(1);
                #[cfg(feature = "defmt")]
                defmt::warn!("command queue full, line dropped ({} total)", self.dropped);
                false
            }
        }
    }

    /// Remove the oldest line.
    pub fn pop(&mut self) -> Option<Line> {
        self.lines.pop_front()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.lines.is_full()
    }

    /// Lines dropped because the queue was full.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}
