//! Register map and typed register values for the AS5047U.

use crate::flags::ErrorFlags;

/// Register addresses for AS5047U
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
#[repr(u16)]
pub enum Register {
    /// No operation
    Nop = 0x0000,
    /// Error flags, cleared on read
    ErrFl = 0x0001,
    /// OTP programming control
    Prog = 0x0003,

    /// Output and filter disable
    Disable = 0x0015,
    /// Zero position MSB
    ZPosM = 0x0016,
    /// Zero position LSB and diagnostic enables
    ZPosL = 0x0017,
    /// Custom setting register 1 (adaptive filter)
    Settings1 = 0x0018,
    /// Custom setting register 2
    Settings2 = 0x0019,
    /// Custom setting register 3 (ABI/UVW resolution, hysteresis)
    Settings3 = 0x001A,
    /// ECC configuration
    Ecc = 0x001B,

    /// ECC checksum calculated from the current shadow registers
    EccChecksum = 0x3FD0,
    /// Diagnostics
    Dia = 0x3FF5,
    /// Automatic gain control
    Agc = 0x3FF9,
    /// Raw sine channel
    SinData = 0x3FFA,
    /// Raw cosine channel
    CosData = 0x3FFB,
    /// Velocity (14-bit, two's complement)
    Vel = 0x3FFC,
    /// CORDIC magnitude (14-bit)
    Mag = 0x3FFD,
    /// Measured angle without dynamic angle error compensation (14-bit)
    AngleUnc = 0x3FFE,
    /// Measured angle with dynamic angle error compensation (14-bit)
    AngleCom = 0x3FFF,
}

impl Register {
    /// Non-volatile shadow registers burned into OTP, in address order
    pub const OTP_SHADOW: [Register; 5] = [
        Register::ZPosM,
        Register::ZPosL,
        Register::Settings1,
        Register::Settings2,
        Register::Settings3,
    ];

    /// Register address
    #[must_use]
    pub const fn address(self) -> u16 {
        self as u16
    }
}

impl From<Register> for u16 {
    fn from(reg: Register) -> u16 {
        reg as u16
    }
}

/// A register value type bound to a fixed address
///
/// Used by [`crate::As5047u::read_reg`] and [`crate::As5047u::write_reg`].
pub trait TypedRegister: Sized {
    /// Address the value is read from and written to
    const REGISTER: Register;

    /// Build the value from the 14-bit register content
    fn from_bits(bits: u16) -> Self;

    /// Raw register content
    fn bits(&self) -> u16;
}

macro_rules! typed_register {
    ($($ty:ident => $reg:ident),* $(,)?) => {
        $(
            impl TypedRegister for $ty {
                const REGISTER: Register = Register::$reg;

                fn from_bits(bits: u16) -> Self {
                    Self(bits)
                }

                fn bits(&self) -> u16 {
                    self.0
                }
            }
        )*
    };
}

typed_register! {
    ErrorFlagRegister => ErrFl,
    ProgrammingRegister => Prog,
    DisableRegister => Disable,
    ZeroPositionMsbRegister => ZPosM,
    ZeroPositionLsbRegister => ZPosL,
    Settings1Register => Settings1,
    Settings2Register => Settings2,
    Settings3Register => Settings3,
    EccRegister => Ecc,
    EccChecksumRegister => EccChecksum,
    AgcRegister => Agc,
    SinDataRegister => SinData,
    CosDataRegister => CosData,
    VelocityRegister => Vel,
    CordicMagnitudeRegister => Mag,
    AngleUncompensatedRegister => AngleUnc,
    AngleCompensatedRegister => AngleCom,
}

/// Sign-extend a 14-bit two's complement value
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub const fn sign_extend_14(raw: u16) -> i16 {
    ((raw << 2) as i16) >> 2
}

bitfield::bitfield! {
    /// ERRFL
    ///
    /// Reading the ERRFL register automatically clears its contents
    #[derive(Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct ErrorFlagRegister(u16);
    impl Debug;
    u8;
    /// CORDIC overflow
    pub cordic_overflow, _: 10;
    /// Offset compensation not finished
    pub offcomp_not_finished, _: 9;
    /// Watchdog test failed
    pub wdtst, _: 7;
    /// CRC error on a frame sent to the device
    pub crc_error, _: 6;
    /// Invalid command
    pub command_error, _: 5;
    /// Non-compliant SPI frame
    pub framing_error, _: 4;
    /// P2RAM uncorrectable ECC error
    pub p2ram_error, _: 3;
    /// P2RAM single-bit ECC correction
    pub p2ram_warning, _: 2;
    /// Magnetic field half of regulated value
    pub mag_half, _: 1;
    /// AGC at its minimum or maximum
    pub agc_warning, _: 0;
}

impl ErrorFlagRegister {
    /// Decoded error flags
    #[must_use]
    pub const fn flags(&self) -> ErrorFlags {
        ErrorFlags::from_register(self.0)
    }
}

bitfield::bitfield! {
    /// PROG
    ///
    /// The PROG register is used for programming the OTP memory
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct ProgrammingRegister(u16);
    impl Debug;
    u8;
    /// Program verify: must be set to 1 for verifying the correctness of the
    /// OTP programming
    pub progver, set_progver: 6;
    /// Start OTP programming cycle
    pub progotp, set_progotp: 3;
    /// Refreshes the non-volatile memory content with the OTP programmed
    /// content
    pub otpref, set_otpref: 2;
    /// Program OTP enable: enables programming the entire OTP memory
    pub progen, set_progen: 0;
}

bitfield::bitfield! {
    /// DISABLE
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct DisableRegister(u16);
    impl Debug;
    u8;
    /// Disable the adaptive filter
    pub filter_disable, set_filter_disable: 6;
    /// Tristate the ABI outputs
    pub abi_off, set_abi_off: 1;
    /// Tristate the UVW outputs
    pub uvw_off, set_uvw_off: 0;
}

bitfield::bitfield! {
    /// ZPOSM
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct ZeroPositionMsbRegister(u16);
    impl Debug;
    u8;
    /// 8 most significant bits of the zero position
    pub zposm, set_zposm: 7, 0;
}

bitfield::bitfield! {
    /// ZPOSL
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct ZeroPositionLsbRegister(u16);
    impl Debug;
    u8;
    /// Enables the contribution of MAGL (magnetic field strength too low) to
    /// the error flag
    pub dia2_en, set_dia2_en: 7;
    /// Enables the contribution of MAGH (magnetic field strength too high)
    /// to the error flag
    pub dia1_en, set_dia1_en: 6;
    /// 6 least significant bits of the zero position
    pub zposl, set_zposl: 5, 0;
}

bitfield::bitfield! {
    /// SETTINGS1
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Settings1Register(u16);
    impl Debug;
    u8;
    pub dia4_en, set_dia4_en: 7;
    pub dia3_en, set_dia3_en: 6;
    /// Adaptive filter minimum coefficient code
    pub k_min, set_k_min: 5, 3;
    /// Adaptive filter maximum coefficient code
    pub k_max, set_k_max: 2, 0;
}

bitfield::bitfield! {
    /// SETTINGS2
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Settings2Register(u16);
    impl Debug;
    u8;
    /// Enables PWM (setting of UVW_ABI Bit necessary)
    pub pwmon, set_pwmon: 7;
    /// This bit defines which data can be read form address 0x3FFF.
    ///
    /// - `0` = ANGLECOM
    /// - `1` = ANGLEUNC
    pub data_select, set_data_select: 6;
    /// ABI decimal or binary selection of the ABI pulses per revolution
    pub abi_dec, set_abi_dec: 5;
    /// Disable Dynamic Angle Error Compensation
    ///
    /// - `0` = DAE compensation ON
    /// - `1` = DAE compensation OFF
    pub daecdis, set_daecdis: 4;
    /// Defines the PWM Output
    ///
    /// - `0` = ABI is operating, W is used as PWM
    /// - `1` = UVW is operating, I is used as PWM
    pub uvw_abi, set_uvw_abi: 3;
    /// Rotation direction
    pub dir, set_dir: 2;
    /// Noise setting for 150 °C operation
    pub noiseset, set_noiseset: 1;
    /// Index pulse width: `0` = 3 LSB, `1` = 1 LSB
    pub iwidth, set_iwidth: 0;
}

bitfield::bitfield! {
    /// SETTINGS3
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Settings3Register(u16);
    impl Debug;
    u8;
    /// Resolution of ABI
    pub abires, set_abires: 7, 5;
    /// Hysteresis setting
    pub hys, set_hys: 4, 3;
    /// UVW number of pole pairs
    ///
    /// - `000` = 1
    /// - `001` = 2
    /// - `010` = 3
    /// - `011` = 4
    /// - `100` = 5
    /// - `101` = 6
    /// - `110` = 7
    /// - `111` = 7
    pub uvwpp, set_uvwpp: 2, 0;
}

bitfield::bitfield! {
    /// ECC
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct EccRegister(u16);
    impl Debug;
    u8;
    /// Enable ECC protection of the OTP content
    pub ecc_en, set_ecc_en: 7;
    /// ECC checksum to burn with the configuration
    pub ecc_chsum, set_ecc_chsum: 6, 0;
}

bitfield::bitfield! {
    /// ECC_CHECKSUM
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct EccChecksumRegister(u16);
    impl Debug;
    u8;
    /// Checksum calculated by the device from the shadow registers
    pub ecc_s, _: 6, 0;
}

bitfield::bitfield! {
    /// AGC
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct AgcRegister(u16);
    impl Debug;
    u8;
    /// Automatic gain control value
    pub agc, _: 7, 0;
}

bitfield::bitfield! {
    /// SINDATA
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct SinDataRegister(u16);
    impl Debug;
    pub u16, raw, _: 13, 0;
}

bitfield::bitfield! {
    /// COSDATA
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct CosDataRegister(u16);
    impl Debug;
    pub u16, raw, _: 13, 0;
}

impl SinDataRegister {
    /// Signed sine channel value
    #[must_use]
    pub fn value(&self) -> i16 {
        sign_extend_14(self.raw())
    }
}

impl CosDataRegister {
    /// Signed cosine channel value
    #[must_use]
    pub fn value(&self) -> i16 {
        sign_extend_14(self.raw())
    }
}

bitfield::bitfield! {
    /// VEL
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct VelocityRegister(u16);
    impl Debug;
    u8;
    /// Velocity as 14-bit two's complement
    pub u16, raw, _: 13, 0;
}

impl VelocityRegister {
    /// Signed velocity in LSB
    #[must_use]
    pub fn velocity(&self) -> i16 {
        sign_extend_14(self.raw())
    }
}

bitfield::bitfield! {
    /// MAG
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct CordicMagnitudeRegister(u16);
    impl Debug;
    u8;
    /// CORDIC magnitude information
    pub u16, cmag, _: 13, 0;
}

bitfield::bitfield! {
    /// ANGLEUNC
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct AngleUncompensatedRegister(u16);
    impl Debug;
    u8;
    /// Angle information without dynamic angle error compensation
    pub u16, cordicang, _: 13, 0;
}

bitfield::bitfield! {
    /// ANGLECOM
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct AngleCompensatedRegister(u16);
    impl Debug;
    u8;
    /// Angle information with dynamic angle error compensation
    pub u16, daecang, _: 13, 0;
}

/// Incremental output hysteresis (SETTINGS3.HYS)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Hysteresis {
    /// 1 LSB (~0.17°)
    #[default]
    Lsb1 = 0b00,
    /// 2 LSB (~0.35°)
    Lsb2 = 0b01,
    /// 3 LSB (~0.52°)
    Lsb3 = 0b10,
    /// No hysteresis
    None = 0b11,
}

impl From<u8> for Hysteresis {
    fn from(code: u8) -> Self {
        match code & 0b11 {
            0b00 => Self::Lsb1,
            0b01 => Self::Lsb2,
            0b10 => Self::Lsb3,
            _ => Self::None,
        }
    }
}

/// Angle returned from address 0x3FFF (SETTINGS2.Data_select)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AngleOutputSource {
    /// Compensated angle (ANGLECOM)
    #[default]
    Compensated,
    /// Uncompensated angle (ANGLEUNC)
    Uncompensated,
}

/// ABI pulses per revolution counted in binary or decimal steps
/// (SETTINGS2.ABI_DEC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AbiCountMode {
    #[default]
    Binary,
    Decimal,
}

/// Rotation direction for increasing angle (SETTINGS2.DIR)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// DIR = 0
    #[default]
    Clockwise,
    /// DIR = 1
    CounterClockwise,
}
