//! Diagnostics register for AS5047U

use crate::register::{Register, TypedRegister};

/// Diagnostics flags from the `DIA` register (0x3FF5)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Diagnostics {
    raw: u16,
}

impl Diagnostics {
    /// Wrap a raw DIA value
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self { raw }
    }

    /// Raw DIA content
    #[must_use]
    pub const fn raw(&self) -> u16 {
        self.raw
    }

    /// `VDD_mode`: supply mode
    ///
    /// - `false` = 3.3 V operation
    /// - `true` = 5 V operation
    #[must_use]
    pub const fn vdd_5v(&self) -> bool {
        self.raw & 0x0001 != 0
    }

    /// `LoopsFinished`: all magnetic core loops finished after power-up
    #[must_use]
    pub const fn loops_finished(&self) -> bool {
        self.raw & 0x0002 != 0
    }

    /// COF: CORDIC overflow, angle and magnitude are unusable while set
    #[must_use]
    pub const fn cordic_overflow(&self) -> bool {
        self.raw & 0x0004 != 0
    }

    /// `Comp_l`: AGC at its low limit, magnetic field too strong
    #[must_use]
    pub const fn comp_low(&self) -> bool {
        self.raw & 0x0008 != 0
    }

    /// `Comp_h`: AGC at its high limit, magnetic field too weak
    #[must_use]
    pub const fn comp_high(&self) -> bool {
        self.raw & 0x0010 != 0
    }

    /// `MagHalf`: magnetic field is half of the regulated value
    #[must_use]
    pub const fn mag_half(&self) -> bool {
        self.raw & 0x0020 != 0
    }

    /// Cosine offset compensation finished
    #[must_use]
    pub const fn cos_offset_finished(&self) -> bool {
        self.raw & 0x0040 != 0
    }

    /// Sine offset compensation finished
    #[must_use]
    pub const fn sin_offset_finished(&self) -> bool {
        self.raw & 0x0080 != 0
    }

    /// Offset compensation finished
    ///
    /// Set once after power-up when the offset compensation algorithm has
    /// finished and stays set afterwards
    #[must_use]
    pub const fn offset_comp_finished(&self) -> bool {
        self.raw & 0x0100 != 0
    }

    /// AGC settled after power-up
    #[must_use]
    pub const fn agc_finished(&self) -> bool {
        self.raw & 0x0200 != 0
    }

    /// Two-bit SPI frame counter
    #[must_use]
    pub const fn spi_count(&self) -> u8 {
        ((self.raw >> 11) & 0b11) as u8
    }

    /// Neither `Comp_h` nor `Comp_l` is set
    #[must_use]
    pub const fn magnetic_field_ok(&self) -> bool {
        !self.comp_high() && !self.comp_low()
    }

    /// Angle data can be trusted: no CORDIC overflow and the AGC is inside
    /// its regulation range
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        !self.cordic_overflow() && self.magnetic_field_ok()
    }
}

impl From<u16> for Diagnostics {
    fn from(raw: u16) -> Self {
        Self::new(raw)
    }
}

impl TypedRegister for Diagnostics {
    const REGISTER: Register = Register::Dia;

    fn from_bits(bits: u16) -> Self {
        Self::new(bits)
    }

    fn bits(&self) -> u16 {
        self.raw
    }
}
