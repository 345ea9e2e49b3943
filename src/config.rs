//! Driver configuration.

use crate::frame::FrameFormat;

/// Driver settings applied at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Frame format used for every transaction
    pub frame_format: FrameFormat,
    /// Retry budget for the writes issued by [`crate::As5047u::program_otp`]
    pub retries: u8,
    /// Pad byte leading every 32-bit frame
    pub pad: u8,
}

impl Config {
    /// Use `frame_format` for every transaction
    #[must_use]
    pub const fn frame_format(mut self, frame_format: FrameFormat) -> Self {
        self.frame_format = frame_format;
        self
    }

    /// Retry budget for internal writes
    #[must_use]
    pub const fn retries(mut self, retries: u8) -> Self {
        self.retries = retries;
        self
    }

    /// Pad byte for daisy-chained 32-bit frames
    #[must_use]
    pub const fn pad(mut self, pad: u8) -> Self {
        self.pad = pad;
        self
    }
}
