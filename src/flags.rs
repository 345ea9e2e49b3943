//! Error flags reported through ERRFL and the sticky accumulator that
//! collects them across transactions.

use core::sync::atomic::{AtomicU16, Ordering};

bitflags::bitflags! {
    /// Error conditions reported by the ERRFL register (0x0001)
    ///
    /// Bit positions match ERRFL; bit 8 is unused.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ErrorFlags: u16 {
        /// AGC reached its minimum (0) or maximum (255) value
        const AGC_WARNING = 1 << 0;
        /// Magnetic field is half of the regulated value (AGC = 255)
        const MAG_HALF = 1 << 1;
        /// ECC corrected one bit in the OTP shadow (P2RAM) customer area
        const P2RAM_WARNING = 1 << 2;
        /// ECC detected two or more uncorrectable bits in P2RAM
        const P2RAM_ERROR = 1 << 3;
        /// Non-compliant SPI frame
        const FRAMING_ERROR = 1 << 4;
        /// Invalid SPI command
        const COMMAND_ERROR = 1 << 5;
        /// CRC mismatch on a received SPI frame
        const CRC_ERROR = 1 << 6;
        /// Internal oscillator or watchdog test failed
        const WATCHDOG_ERROR = 1 << 7;
        /// Internal offset compensation not finished
        const OFFSET_COMP_NOT_FINISHED = 1 << 9;
        /// CORDIC overflow
        const CORDIC_OVERFLOW = 1 << 10;
    }
}

impl ErrorFlags {
    /// Failures that put the delivery of a frame itself in doubt
    ///
    /// Only these trigger a retry.
    pub const COMMUNICATION: Self = Self::CRC_ERROR.union(Self::FRAMING_ERROR);

    /// Map a raw ERRFL value, ignoring unused and reserved bits
    #[must_use]
    pub const fn from_register(errfl: u16) -> Self {
        Self::from_bits_truncate(errfl)
    }

    /// Whether a CRC or framing error is present
    #[must_use]
    pub const fn has_communication_error(&self) -> bool {
        self.intersects(Self::COMMUNICATION)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ErrorFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "ErrorFlags({=u16:#06x})", self.bits());
    }
}

/// Accumulates [`ErrorFlags`] until they are drained
///
/// The device clears ERRFL on every read, so the driver folds each value it
/// reads into this set. Bits are only ever OR-ed in; [`StickyErrors::drain`]
/// swaps the set for an empty one in a single atomic step, so a bit raised
/// concurrently lands either in the drained value or in the next one.
#[derive(Debug, Default)]
pub struct StickyErrors {
    bits: AtomicU16,
}

#[cfg(feature = "defmt")]
impl defmt::Format for StickyErrors {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "StickyErrors({})", self.peek());
    }
}

impl StickyErrors {
    /// Create an empty accumulator
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bits: AtomicU16::new(0),
        }
    }

    /// OR the flags decoded from a raw ERRFL value into the set
    pub fn accumulate(&self, errfl: u16) {
        self.insert(ErrorFlags::from_register(errfl));
    }

    /// OR already decoded flags into the set
    pub fn insert(&self, flags: ErrorFlags) {
        if !flags.is_empty() {
            self.bits.fetch_or(flags.bits(), Ordering::AcqRel);
        }
    }

    /// Return everything accumulated since the last drain and clear the set
    pub fn drain(&self) -> ErrorFlags {
        ErrorFlags::from_bits_retain(self.bits.swap(0, Ordering::AcqRel))
    }

    /// Current set, without clearing it
    #[must_use]
    pub fn peek(&self) -> ErrorFlags {
        ErrorFlags::from_bits_retain(self.bits.load(Ordering::Acquire))
    }
}
