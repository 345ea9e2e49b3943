//! Driver for the AS5047U magnetic position sensor

use embedded_hal::spi::SpiDevice;

use crate::{
    config::Config,
    diagnostics::Diagnostics,
    error::Error,
    flags::{ErrorFlags, StickyErrors},
    frame::{self, Frame, FrameFormat, MAX_FRAME_LEN, Response},
    register::{
        AgcRegister, AngleCompensatedRegister, AngleUncompensatedRegister,
        CordicMagnitudeRegister, ErrorFlagRegister, Register, TypedRegister, VelocityRegister,
    },
};

/// Maximum angle value (14-bit: 0-16383, representing 0-360°)
pub const ANGLE_MAX: u16 = 0x3FFF + 1;

/// Degrees per second represented by one velocity LSB
pub const VELOCITY_DEG_PER_LSB: f32 = 24.141;
/// Radians per second represented by one velocity LSB
pub const VELOCITY_RAD_PER_LSB: f32 = VELOCITY_DEG_PER_LSB * core::f32::consts::PI / 180.0;
/// Revolutions per minute represented by one velocity LSB
pub const VELOCITY_RPM_PER_LSB: f32 = VELOCITY_DEG_PER_LSB * (60.0 / 360.0);

/// Convert a 14-bit angle to degrees (0.0 to 359.978)
#[must_use]
pub fn angle_to_degrees(angle: u16) -> f32 {
    f32::from(angle) * 360.0 / f32::from(ANGLE_MAX)
}

/// AS5047U driver instance
///
/// Every operation blocks for the duration of its SPI frames. Reads never
/// fail on CRC or framing errors: after the retry budget is spent they
/// return the last value obtained. Drain [`As5047u::sticky_errors`] to find
/// out whether a value can be trusted. Writes report a CRC/framing-clean
/// acknowledgment as `Ok(true)`.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct As5047u<SPI> {
    spi: SPI,
    frame_format: FrameFormat,
    pad: u8,
    pub(crate) retries: u8,
    sticky: StickyErrors,
}

impl<SPI, E> As5047u<SPI>
where
    SPI: SpiDevice<u8, Error = E>,
{
    /// Create a new AS5047U driver instance with the default [`Config`]
    /// (16-bit frames, no retries, zero pad byte)
    pub fn new(spi: SPI) -> Self {
        Self::with_config(spi, Config::default())
    }

    /// Create a new AS5047U driver instance
    pub fn with_config(spi: SPI, config: Config) -> Self {
        Self {
            spi,
            frame_format: config.frame_format,
            pad: config.pad,
            retries: config.retries,
            sticky: StickyErrors::new(),
        }
    }

    /// Release the SPI bus, consuming the driver
    pub fn release(self) -> SPI {
        self.spi
    }

    /// Current SPI frame format
    #[must_use]
    pub fn frame_format(&self) -> FrameFormat {
        self.frame_format
    }

    /// Change the SPI frame format used by every following transaction
    ///
    /// The sensor itself must be configured for the same format.
    pub fn set_frame_format(&mut self, frame_format: FrameFormat) {
        self.frame_format = frame_format;
    }

    /// Pad byte leading every 32-bit frame
    #[must_use]
    pub fn pad(&self) -> u8 {
        self.pad
    }

    /// Set the daisy-chain pad byte sent as the first byte of 32-bit frames
    pub fn set_pad(&mut self, pad: u8) {
        self.pad = pad;
    }

    /// Return and clear the error flags accumulated since the last call
    ///
    /// Every register read also reads ERRFL and adds its flags here.
    pub fn sticky_errors(&self) -> ErrorFlags {
        self.sticky.drain()
    }

    /// Clock out one frame and decode what came back
    fn exchange(&mut self, frame: Frame) -> Result<Response, Error<E>> {
        let tx = frame.as_bytes();
        let mut rx = [0u8; MAX_FRAME_LEN];
        let rx = &mut rx[..tx.len()];
        self.spi.transfer(rx, tx).map_err(Error::Communication)?;

        #[cfg(feature = "defmt")]
        defmt::trace!("SPI frame sent {=[u8]:x}, received {=[u8]:x}", tx, rx);

        Ok(frame::decode(self.frame_format, rx))
    }

    /// Read a register without touching the sticky error set
    ///
    /// This follows the command-response protocol:
    /// - Transaction 1: Send read command, ignore response
    /// - Transaction 2: Send NOP, receive actual data
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn raw_read_register(&mut self, register: Register) -> Result<u16, Error<E>> {
        let address = u16::from(register);

        #[cfg(feature = "defmt")]
        defmt::trace!("Reading register 0x{:04X}", address);

        self.exchange(frame::encode_command(
            self.frame_format,
            address,
            true,
            self.pad,
        ))?;
        let response = self.exchange(frame::nop(self.frame_format, self.pad))?;

        #[cfg(feature = "defmt")]
        if !response.crc_valid() {
            defmt::warn!(
                "CRC mismatch reading 0x{:04X}: word 0x{:04X}, crc {:?}",
                address,
                response.word(),
                response.crc()
            );
        }

        #[cfg(feature = "defmt")]
        defmt::trace!("Register 0x{:04X} value: 0x{:04X}", address, response.payload());

        Ok(response.payload())
    }

    /// Read a register, then ERRFL; returns the value and that ERRFL content
    fn read_register_checked(&mut self, register: Register) -> Result<(u16, ErrorFlags), Error<E>> {
        let value = self.raw_read_register(register)?;
        let errfl = self.raw_read_register(Register::ErrFl)?;
        self.sticky.accumulate(errfl);
        Ok((value, ErrorFlags::from_register(errfl)))
    }

    /// Read a register and fold the following ERRFL read into the sticky
    /// error set
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn read_register(&mut self, register: Register) -> Result<u16, Error<E>> {
        self.read_register_checked(register).map(|(value, _)| value)
    }

    /// Read a register, repeating while ERRFL reports a CRC or framing error
    ///
    /// Makes at most `retries + 1` attempts and returns the last value read,
    /// even if every attempt was flagged. The flags stay in the sticky error
    /// set for the caller to inspect.
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn read_register_with_retries(
        &mut self,
        register: Register,
        retries: u8,
    ) -> Result<u16, Error<E>> {
        let mut attempt = 0;
        loop {
            let (value, flags) = self.read_register_checked(register)?;
            if !flags.has_communication_error() || attempt == retries {
                return Ok(value);
            }
            attempt += 1;

            #[cfg(feature = "defmt")]
            defmt::debug!(
                "Retrying read of 0x{:04X} ({}/{}): {}",
                u16::from(register),
                attempt,
                retries,
                flags
            );
        }
    }

    /// Write a register
    ///
    /// This follows the write protocol:
    /// - Transaction 1: Send write command
    /// - Transaction 2: Send data frame
    /// - Read ERRFL to check the write arrived intact
    ///
    /// The sequence is repeated while ERRFL reports a CRC or framing error,
    /// up to `retries + 1` times. Other flags do not cause a retry, but every
    /// ERRFL value read here lands in the sticky error set.
    ///
    /// Returns `Ok(false)` if every attempt was rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn write_register(
        &mut self,
        register: Register,
        data: u16,
        retries: u8,
    ) -> Result<bool, Error<E>> {
        let address = u16::from(register);

        #[cfg(feature = "defmt")]
        defmt::debug!("Writing 0x{:04X} to register 0x{:04X}", data, address);

        for _ in 0..=retries {
            self.exchange(frame::encode_command(
                self.frame_format,
                address,
                false,
                self.pad,
            ))?;
            self.exchange(frame::encode_data(self.frame_format, data, self.pad))?;

            let errfl = ErrorFlags::from_register(self.read_register(Register::ErrFl)?);
            self.sticky.insert(errfl);
            if !errfl.has_communication_error() {
                #[cfg(feature = "defmt")]
                defmt::trace!("Write to register 0x{:04X} successful", address);
                return Ok(true);
            }

            #[cfg(feature = "defmt")]
            defmt::warn!("Write to 0x{:04X} rejected: {}", address, errfl);
        }

        Ok(false)
    }

    /// Read a typed register
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn read_reg<R: TypedRegister>(&mut self) -> Result<R, Error<E>> {
        self.read_register(R::REGISTER).map(R::from_bits)
    }

    /// Read a typed register with retries on CRC or framing errors
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn read_reg_with_retries<R: TypedRegister>(&mut self, retries: u8) -> Result<R, Error<E>> {
        self.read_register_with_retries(R::REGISTER, retries)
            .map(R::from_bits)
    }

    /// Write a typed register
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn write_reg<R: TypedRegister>(&mut self, reg: &R, retries: u8) -> Result<bool, Error<E>> {
        self.write_register(R::REGISTER, reg.bits(), retries)
    }

    pub(crate) fn modify_reg<R: TypedRegister>(
        &mut self,
        retries: u8,
        f: impl FnOnce(&mut R),
    ) -> Result<bool, Error<E>> {
        let mut reg = self.read_reg::<R>()?;

        f(&mut reg);

        self.write_reg(&reg, retries)
    }

    /// Get the 14-bit angle with dynamic angle error compensation
    ///
    /// Value ranges from 0 to 16383 (0° to 359.978°)
    /// Use [`ANGLE_MAX`] constant for conversion calculations
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn angle(&mut self, retries: u8) -> Result<u16, Error<E>> {
        self.read_reg_with_retries::<AngleCompensatedRegister>(retries)
            .map(|r| r.daecang())
    }

    /// Get the 14-bit angle without dynamic angle error compensation
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn raw_angle(&mut self, retries: u8) -> Result<u16, Error<E>> {
        self.read_reg_with_retries::<AngleUncompensatedRegister>(retries)
            .map(|r| r.cordicang())
    }

    /// Get the compensated angle in degrees
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn angle_degrees(&mut self, retries: u8) -> Result<f32, Error<E>> {
        self.angle(retries).map(angle_to_degrees)
    }

    /// Get the signed 14-bit velocity in LSB
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn velocity(&mut self, retries: u8) -> Result<i16, Error<E>> {
        self.read_reg_with_retries::<VelocityRegister>(retries)
            .map(|r| r.velocity())
    }

    /// Get the velocity in degrees per second
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn velocity_deg_per_sec(&mut self, retries: u8) -> Result<f32, Error<E>> {
        self.velocity(retries)
            .map(|v| f32::from(v) * VELOCITY_DEG_PER_LSB)
    }

    /// Get the velocity in radians per second
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn velocity_rad_per_sec(&mut self, retries: u8) -> Result<f32, Error<E>> {
        self.velocity(retries)
            .map(|v| f32::from(v) * VELOCITY_RAD_PER_LSB)
    }

    /// Get the velocity in revolutions per minute
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn velocity_rpm(&mut self, retries: u8) -> Result<f32, Error<E>> {
        self.velocity(retries)
            .map(|v| f32::from(v) * VELOCITY_RPM_PER_LSB)
    }

    /// Get the automatic gain control value (0-255)
    ///
    /// - 0 = high magnetic field (close to sensor)
    /// - 255 = low magnetic field (far from sensor)
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn agc(&mut self, retries: u8) -> Result<u8, Error<E>> {
        self.read_reg_with_retries::<AgcRegister>(retries)
            .map(|r| r.agc())
    }

    /// Get the 14-bit magnitude value from CORDIC
    ///
    /// Useful for checking magnet presence and strength
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn magnitude(&mut self, retries: u8) -> Result<u16, Error<E>> {
        self.read_reg_with_retries::<CordicMagnitudeRegister>(retries)
            .map(|r| r.cmag())
    }

    /// Read and clear the ERRFL register
    ///
    /// Reads up to `retries + 1` times, stopping at the first all-clear
    /// value, and returns the last value read.
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn error_flags(&mut self, retries: u8) -> Result<ErrorFlagRegister, Error<E>> {
        let mut errfl = ErrorFlagRegister::from_bits(0);
        for _ in 0..=retries {
            errfl = self.read_reg::<ErrorFlagRegister>()?;
            if errfl.bits() == 0 {
                break;
            }
        }
        Ok(errfl)
    }

    /// Get the diagnostics register
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn diagnostics(&mut self, retries: u8) -> Result<Diagnostics, Error<E>> {
        self.read_reg_with_retries::<Diagnostics>(retries)
    }
}
