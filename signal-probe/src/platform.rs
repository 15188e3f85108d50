//! Traits implemented by the hardware layer.
//!
//! The core never touches peripherals directly. Board support code provides a
//! blocking byte sink, a millisecond tick and a status indicator; the receive
//! interrupt feeds bytes into a [`RingBuffer`](crate::io::RingBuffer).

/// Blocking byte sink (typically a UART transmit path).
pub trait SerialPort {
    /// Error reported by the underlying transmitter.
    type Error;

    /// Write every byte of `bytes`, blocking until the hardware accepted them.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Whether the transmit path cannot accept more bytes right now.
    ///
    /// Blocking ports that always accept data keep the default.
    fn is_full(&self) -> bool {
        false
    }
}

/// Free-running millisecond tick.
///
/// The counter wraps at `u32::MAX`; consumers compare with `wrapping_sub`.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

/// Single on/off status output (an LED on most boards).
pub trait StatusIndicator {
    fn set(&mut self, on: bool);
}

/// Indicator for boards without a spare output.
pub struct NoIndicator;

impl StatusIndicator for NoIndicator {
    fn set(&mut self, _on: bool) {}
}

/// Adapts any `embedded-hal` output pin into a [`StatusIndicator`].
///
/// Pin errors are ignored: the indicator is advisory.
#[cfg(feature = "embedded-hal")]
pub struct PinIndicator<P> {
    pin: P,
}

#[cfg(feature = "embedded-hal")]
impl<P: embedded_hal::digital::OutputPin> PinIndicator<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Return the wrapped pin.
    pub fn release(self) -> P {
        self.pin
    }
}

#[cfg(feature = "embedded-hal")]
impl<P: embedded_hal::digital::OutputPin> StatusIndicator for PinIndicator<P> {
    fn set(&mut self, on: bool) {
        let _ = if on { self.pin.set_high() } else { self.pin.set_low() };
    }
}

#[cfg(all(test, feature = "embedded-hal"))]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::{ErrorType, OutputPin};

    struct FakePin {
        high: bool,
        writes: usize,
    }

    impl ErrorType for FakePin {
        type Error = Infallible;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            self.writes += 1;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high = true;
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn pin_indicator_drives_pin() {
        let mut led = PinIndicator::new(FakePin { high: false, writes: 0 });
        led.set(true);
        assert!(led.pin.high);
        led.set(false);
        let pin = led.release();
        assert!(!pin.high);
        assert_eq!(pin.writes, 2);
    }
}
