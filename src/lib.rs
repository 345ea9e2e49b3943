#![no_std]
#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

mod config;
pub mod crc;
mod diagnostics;
mod driver;
mod error;
mod flags;
pub mod frame;
mod otp;
mod register;
mod settings;

pub use config::Config;
pub use crc::crc8;
pub use diagnostics::Diagnostics;
pub use driver::{
    ANGLE_MAX, As5047u, VELOCITY_DEG_PER_LSB, VELOCITY_RAD_PER_LSB, VELOCITY_RPM_PER_LSB,
    angle_to_degrees,
};
pub use error::Error;
pub use flags::{ErrorFlags, StickyErrors};
pub use frame::FrameFormat;
pub use register::{
    AbiCountMode, AgcRegister, AngleCompensatedRegister, AngleOutputSource,
    AngleUncompensatedRegister, CordicMagnitudeRegister, CosDataRegister, Direction,
    DisableRegister, EccChecksumRegister, EccRegister, ErrorFlagRegister, Hysteresis,
    ProgrammingRegister, Register, Settings1Register, Settings2Register, Settings3Register,
    SinDataRegister, TypedRegister, VelocityRegister, ZeroPositionLsbRegister,
    ZeroPositionMsbRegister, sign_extend_14,
};
