//! Permanent programming of the non-volatile settings into OTP memory.

use embedded_hal::spi::SpiDevice;

use crate::{
    As5047u, Error,
    frame::FrameFormat,
    register::{EccChecksumRegister, EccRegister, ProgrammingRegister, Register},
};

/// PROG polls before the burn is considered hung
const BURN_POLL_ATTEMPTS: u16 = 15_000;

/// PROG content once a burn has completed: only PROGEN left set
const BURN_DONE: u16 = 0x0001;

/// Step of the OTP sequence that deviated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum OtpFailure {
    /// The current angle could not be stored as zero position
    ZeroLock,
    /// ECC enable or checksum write rejected
    EccSetup,
    /// A shadow register changed between snapshot and burn
    ShadowChanged,
    /// PROGEN or PROGOTP write rejected
    Burn,
    /// PROG never reported completion
    Timeout,
    /// Shadow registers reloaded from OTP differ from the snapshot
    Verify,
}

enum Abort<E> {
    Transport(Error<E>),
    Failed(OtpFailure),
}

impl<E> From<Error<E>> for Abort<E> {
    fn from(err: Error<E>) -> Self {
        Self::Transport(err)
    }
}

impl<E> From<OtpFailure> for Abort<E> {
    fn from(failure: OtpFailure) -> Self {
        Self::Failed(failure)
    }
}

fn ensure(ok: bool, failure: OtpFailure) -> Result<(), OtpFailure> {
    if ok { Ok(()) } else { Err(failure) }
}

impl<SPI, E> As5047u<SPI>
where
    SPI: SpiDevice<u8, Error = E>,
{
    /// Burn the current configuration into OTP memory
    ///
    /// The current angle becomes the permanent zero position. The shadow
    /// registers ZPOSM to SETTINGS3 are then protected with the device
    /// computed ECC checksum, burned, reloaded from OTP and compared with the
    /// values read before the burn.
    ///
    /// 16-bit frames are replaced by 24-bit CRC frames for the duration of
    /// the sequence. The original frame format is restored on every exit,
    /// including transport errors. Internal writes use the retry budget from
    /// [`crate::Config::retries`].
    ///
    /// Returns `Ok(false)` if any step deviated. The burn is irreversible:
    /// once it has been triggered a later failure cannot be undone.
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn program_otp(&mut self) -> Result<bool, Error<E>> {
        let backup = self.frame_format();
        if backup == FrameFormat::Spi16 {
            self.set_frame_format(FrameFormat::Spi24);
        }

        let outcome = self.commit_otp();
        self.set_frame_format(backup);

        match outcome {
            Ok(()) => {
                #[cfg(feature = "defmt")]
                defmt::info!("OTP programming verified");
                Ok(true)
            }
            #[cfg_attr(not(feature = "defmt"), allow(unused_variables))]
            Err(Abort::Failed(failure)) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("OTP programming aborted: {}", failure);
                Ok(false)
            }
            Err(Abort::Transport(err)) => Err(err),
        }
    }

    fn commit_otp(&mut self) -> Result<(), Abort<E>> {
        let retries = self.retries;

        let angle = self.angle(retries)?;
        ensure(self.set_zero_position(angle, retries)?, OtpFailure::ZeroLock)?;

        let snapshot = self.read_shadow()?;

        let mut ecc = self.read_reg::<EccRegister>()?;
        ecc.set_ecc_en(true);
        ensure(self.write_reg(&ecc, retries)?, OtpFailure::EccSetup)?;
        let checksum = self.read_reg::<EccChecksumRegister>()?.ecc_s();
        ecc.set_ecc_chsum(checksum);
        ensure(self.write_reg(&ecc, retries)?, OtpFailure::EccSetup)?;

        ensure(self.read_shadow()? == snapshot, OtpFailure::ShadowChanged)?;

        let mut prog = ProgrammingRegister::default();
        prog.set_progen(true);
        ensure(self.write_reg(&prog, retries)?, OtpFailure::Burn)?;
        prog.set_progotp(true);
        ensure(self.write_reg(&prog, retries)?, OtpFailure::Burn)?;

        self.wait_for_burn()?;

        #[cfg(feature = "defmt")]
        defmt::debug!("OTP burn complete, verifying");

        // Cleared shadow registers can only match the snapshot again if the
        // refresh really reloads them from OTP.
        for register in Register::OTP_SHADOW {
            ensure(self.write_register(register, 0, retries)?, OtpFailure::Verify)?;
        }

        let mut prog = ProgrammingRegister::default();
        prog.set_progver(true);
        ensure(self.write_reg(&prog, retries)?, OtpFailure::Verify)?;
        prog.set_otpref(true);
        ensure(self.write_reg(&prog, retries)?, OtpFailure::Verify)?;
        prog.set_otpref(false);
        ensure(self.write_reg(&prog, retries)?, OtpFailure::Verify)?;

        ensure(self.read_shadow()? == snapshot, OtpFailure::Verify)?;
        Ok(())
    }

    fn wait_for_burn(&mut self) -> Result<(), Abort<E>> {
        for _ in 0..BURN_POLL_ATTEMPTS {
            if self.read_register(Register::Prog)? == BURN_DONE {
                return Ok(());
            }
        }
        Err(OtpFailure::Timeout.into())
    }

    fn read_shadow(&mut self) -> Result<[u16; Register::OTP_SHADOW.len()], Error<E>> {
        let mut values = [0; Register::OTP_SHADOW.len()];
        for (value, register) in values.iter_mut().zip(Register::OTP_SHADOW) {
            *value = self.read_register(register)?;
        }
        Ok(values)
    }
}
