//! Configuration of the non-volatile settings registers.
//!
//! Every setter reads the register, changes its fields and writes it back
//! with the given retry budget. Out-of-range arguments are clamped to the
//! nearest value the register field can hold.

use embedded_hal::spi::SpiDevice;

use crate::{
    As5047u, Error,
    register::{
        AbiCountMode, AngleOutputSource, Direction, DisableRegister, Hysteresis,
        Settings1Register, Settings2Register, Settings3Register, ZeroPositionLsbRegister,
        ZeroPositionMsbRegister,
    },
};

/// ABIRES code for each binary resolution from 10 to 14 bits
const ABI_RESOLUTION_CODES: [u8; 5] = [0b010, 0b001, 0b000, 0b011, 0b100];

impl<SPI, E> As5047u<SPI>
where
    SPI: SpiDevice<u8, Error = E>,
{
    /// Get the 14-bit zero position offset
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn zero_position(&mut self, retries: u8) -> Result<u16, Error<E>> {
        let msb = self.read_reg_with_retries::<ZeroPositionMsbRegister>(retries)?;
        let lsb = self.read_reg_with_retries::<ZeroPositionLsbRegister>(retries)?;

        Ok((u16::from(msb.zposm()) << 6) | u16::from(lsb.zposl()))
    }

    /// Set the 14-bit angle that reads as zero
    ///
    /// The upper 8 bits go to ZPOSM and the lower 6 bits to ZPOSL; the
    /// diagnostic enable bits in ZPOSL are preserved. ZPOSL is not written if
    /// the ZPOSM write fails.
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    #[allow(clippy::cast_possible_truncation)]
    pub fn set_zero_position(&mut self, angle: u16, retries: u8) -> Result<bool, Error<E>> {
        let msb = ((angle >> 6) & 0xFF) as u8;
        let lsb = (angle & 0b11_1111) as u8;

        Ok(self.modify_reg(retries, |r: &mut ZeroPositionMsbRegister| r.set_zposm(msb))?
            && self.modify_reg(retries, |r: &mut ZeroPositionLsbRegister| r.set_zposl(lsb))?)
    }

    /// Define the rotation direction for increasing angle
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn set_direction(&mut self, direction: Direction, retries: u8) -> Result<bool, Error<E>> {
        self.modify_reg(retries, |r: &mut Settings2Register| {
            r.set_dir(direction == Direction::CounterClockwise);
        })
    }

    /// Set the binary ABI resolution, 10 to 14 bits
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn set_abi_resolution(&mut self, bits: u8, retries: u8) -> Result<bool, Error<E>> {
        let code = ABI_RESOLUTION_CODES[usize::from(bits.clamp(10, 14) - 10)];
        self.modify_reg(retries, |r: &mut Settings3Register| r.set_abires(code))
    }

    /// Select binary or decimal ABI pulse counts
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn set_abi_count_mode(&mut self, mode: AbiCountMode, retries: u8) -> Result<bool, Error<E>> {
        self.modify_reg(retries, |r: &mut Settings2Register| {
            r.set_abi_dec(mode == AbiCountMode::Decimal);
        })
    }

    /// Set the index pulse length in LSB: `1` selects 1 LSB, anything else
    /// selects the default 3 LSB
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn set_index_pulse_length(&mut self, lsb: u8, retries: u8) -> Result<bool, Error<E>> {
        self.modify_reg(retries, |r: &mut Settings2Register| r.set_iwidth(lsb == 1))
    }

    /// Set the number of UVW pole pairs, 1 to 7
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn set_uvw_pole_pairs(&mut self, pairs: u8, retries: u8) -> Result<bool, Error<E>> {
        let code = pairs.clamp(1, 7) - 1;
        self.modify_reg(retries, |r: &mut Settings3Register| r.set_uvwpp(code))
    }

    /// Enable the ABI and UVW outputs and place the PWM output
    ///
    /// | ABI | UVW | PWM | Pin I | Pin W |
    /// |-----|-----|-----|-------|-------|
    /// |  1  |  0  |  0  | I     | -     |
    /// |  1  |  0  |  1  | I     | PWM   |
    /// |  0  |  1  |  0  | -     | W     |
    /// |  0  |  1  |  1  | PWM   | W     |
    /// |  1  |  1  |  x  | I     | W     |
    /// |  0  |  0  |  1  | -     | PWM   |
    /// |  0  |  0  |  0  | -     | -     |
    ///
    /// With both interfaces enabled UVW_ABI follows the ABI setting and
    /// PWMon is still written as requested, although the pins are taken.
    ///
    /// DISABLE is written first; SETTINGS2 is not written if that fails.
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn configure_interface(
        &mut self,
        abi: bool,
        uvw: bool,
        pwm: bool,
        retries: u8,
    ) -> Result<bool, Error<E>> {
        let mut disable = self.read_reg::<DisableRegister>()?;
        let mut settings2 = self.read_reg::<Settings2Register>()?;

        disable.set_abi_off(!abi);
        disable.set_uvw_off(!uvw);
        settings2.set_uvw_abi(uvw && !abi);
        settings2.set_pwmon(pwm);

        Ok(self.write_reg(&disable, retries)? && self.write_reg(&settings2, retries)?)
    }

    /// Enable or disable dynamic angle error compensation
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn set_dynamic_angle_compensation(
        &mut self,
        enable: bool,
        retries: u8,
    ) -> Result<bool, Error<E>> {
        self.modify_reg(retries, |r: &mut Settings2Register| r.set_daecdis(!enable))
    }

    /// Enable or disable the adaptive filter
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn set_adaptive_filter(&mut self, enable: bool, retries: u8) -> Result<bool, Error<E>> {
        self.modify_reg(retries, |r: &mut DisableRegister| r.set_filter_disable(!enable))
    }

    /// Set the adaptive filter K_min and K_max codes (0 to 7)
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn set_filter_parameters(
        &mut self,
        k_min: u8,
        k_max: u8,
        retries: u8,
    ) -> Result<bool, Error<E>> {
        let (k_min, k_max) = (k_min.min(7), k_max.min(7));
        self.modify_reg(retries, |r: &mut Settings1Register| {
            r.set_k_min(k_min);
            r.set_k_max(k_max);
        })
    }

    /// Select the noise setting for 150 °C operation (NOISESET)
    ///
    /// Enabling it extends the range to 150 °C at the cost of more noise.
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn set_high_temperature_mode(&mut self, enable: bool, retries: u8) -> Result<bool, Error<E>> {
        self.modify_reg(retries, |r: &mut Settings2Register| r.set_noiseset(enable))
    }

    /// Get the incremental output hysteresis
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn hysteresis(&mut self) -> Result<Hysteresis, Error<E>> {
        self.read_reg::<Settings3Register>()
            .map(|r| Hysteresis::from(r.hys()))
    }

    /// Set the incremental output hysteresis
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn set_hysteresis(&mut self, hysteresis: Hysteresis, retries: u8) -> Result<bool, Error<E>> {
        self.modify_reg(retries, |r: &mut Settings3Register| {
            r.set_hys(hysteresis as u8);
        })
    }

    /// Get the angle source returned from address 0x3FFF
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn angle_output_source(&mut self) -> Result<AngleOutputSource, Error<E>> {
        self.read_reg::<Settings2Register>().map(|r| {
            if r.data_select() {
                AngleOutputSource::Uncompensated
            } else {
                AngleOutputSource::Compensated
            }
        })
    }

    /// Select the angle source returned from address 0x3FFF
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn set_angle_output_source(
        &mut self,
        source: AngleOutputSource,
        retries: u8,
    ) -> Result<bool, Error<E>> {
        self.modify_reg(retries, |r: &mut Settings2Register| {
            r.set_data_select(source == AngleOutputSource::Uncompensated);
        })
    }
}
