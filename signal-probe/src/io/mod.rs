//! Byte ingestion from the receive interrupt to the main loop.
//!
//! ## Components
//!
//! | Type | Context | Description |
//! |------|---------|-------------|
//! | [`RingBuffer`] | ISR writes, main loop reads | Lock-free SPSC byte FIFO, drop-on-full |
//! | [`LineAssembler`] | main loop | Turns buffered bytes into newline-terminated lines |
//! | [`CommandQueue`] | main loop | Bounded FIFO of complete lines, drop-on-full |
//!
//! ## Data flow
//!
//! ```text
//! UART RX ISR → RingBuffer::write()
//!     main loop → LineAssembler::drain() → CommandQueue → dispatch
//! ```

pub mod command_queue;
pub mod line;
pub mod ring_buffer;

pub use command_queue::{CommandQueue, Line, MAX_LINE_LEN};
pub use line::LineAssembler;
pub use ring_buffer::{RingBuffer, RxRingBuffer};
