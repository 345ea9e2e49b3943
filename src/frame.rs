//! SPI frame encoding and decoding.
//!
//! Every frame carries one 16-bit word: a command (R/W flag in bit 14 plus a
//! 14-bit address) or data (14-bit payload). The 24-bit and 32-bit formats
//! append a CRC-8 over that word, and the 32-bit format prepends a pad byte
//! used when several devices share one SPI word in a daisy chain.

use crate::crc;

const READ_FLAG: u16 = 0x4000;
const DATA_MASK: u16 = 0x3FFF;
const WARNING_FLAG: u16 = 0x8000;
const ERROR_FLAG: u16 = 0x4000;

/// Longest frame on the wire (32-bit format)
pub const MAX_FRAME_LEN: usize = 4;

/// SPI frame format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameFormat {
    /// 16-bit frames without CRC
    #[default]
    Spi16,
    /// 24-bit frames with CRC-8
    Spi24,
    /// 32-bit frames with a leading pad byte and CRC-8
    Spi32,
}

impl FrameFormat {
    /// Number of bytes exchanged per frame
    #[must_use]
    pub const fn byte_len(self) -> usize {
        match self {
            Self::Spi16 => 2,
            Self::Spi24 => 3,
            Self::Spi32 => 4,
        }
    }

    /// Whether frames in this format carry a CRC
    #[must_use]
    pub const fn has_crc(self) -> bool {
        !matches!(self, Self::Spi16)
    }
}

/// One encoded frame, ready to be clocked out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    bytes: [u8; MAX_FRAME_LEN],
    len: usize,
}

impl Frame {
    fn from_word(format: FrameFormat, word: u16, pad: u8) -> Self {
        let [hi, lo] = word.to_be_bytes();
        let bytes = match format {
            FrameFormat::Spi16 => [hi, lo, 0, 0],
            FrameFormat::Spi24 => [hi, lo, crc::crc8(word), 0],
            FrameFormat::Spi32 => [pad, hi, lo, crc::crc8(word)],
        };
        Self {
            bytes,
            len: format.byte_len(),
        }
    }

    /// The bytes to transmit
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Encode a read or write command for `address`
///
/// Only the lower 14 bits of the address are used.
#[must_use]
pub fn encode_command(format: FrameFormat, address: u16, read: bool, pad: u8) -> Frame {
    let word = if read {
        READ_FLAG | (address & DATA_MASK)
    } else {
        address & DATA_MASK
    };
    Frame::from_word(format, word, pad)
}

/// Encode the data frame that follows a write command
///
/// Only the lower 14 bits of the payload are used.
#[must_use]
pub fn encode_data(format: FrameFormat, payload: u16, pad: u8) -> Frame {
    Frame::from_word(format, payload & DATA_MASK, pad)
}

/// Frame clocked out while collecting the response of the previous command
///
/// The 16-bit format sends an all-zero word; the CRC formats send a read of
/// the NOP register so that the device sees a valid checksum.
#[must_use]
pub fn nop(format: FrameFormat, pad: u8) -> Frame {
    match format {
        FrameFormat::Spi16 => Frame::from_word(format, 0x0000, pad),
        FrameFormat::Spi24 | FrameFormat::Spi32 => encode_command(format, 0x0000, true, pad),
    }
}

/// A decoded frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Response {
    word: u16,
    crc: Option<u8>,
}

impl Response {
    /// The full 16-bit word, status bits included
    #[must_use]
    pub const fn word(&self) -> u16 {
        self.word
    }

    /// The 14-bit address or payload field
    #[must_use]
    pub const fn payload(&self) -> u16 {
        self.word & DATA_MASK
    }

    /// The CRC carried by the frame, if the format has one
    #[must_use]
    pub const fn crc(&self) -> Option<u8> {
        self.crc
    }

    /// Check the carried CRC; frames without a CRC always pass
    #[must_use]
    pub const fn crc_valid(&self) -> bool {
        match self.crc {
            Some(crc) => crc::verify_crc8(self.word, crc),
            None => true,
        }
    }

    /// Bit 14: error flag in a device response, R/W flag in a command
    #[must_use]
    pub const fn error_flag(&self) -> bool {
        self.word & ERROR_FLAG != 0
    }

    /// Bit 15: warning flag in a device response
    #[must_use]
    pub const fn warning_flag(&self) -> bool {
        self.word & WARNING_FLAG != 0
    }
}

/// Decode a received frame
///
/// `bytes` must hold at least [`FrameFormat::byte_len`] bytes; missing bytes are
/// read as zero.
#[must_use]
pub fn decode(format: FrameFormat, bytes: &[u8]) -> Response {
    let byte = |i: usize| bytes.get(i).copied().unwrap_or(0);
    match format {
        FrameFormat::Spi16 => Response {
            word: u16::from_be_bytes([byte(0), byte(1)]),
            crc: None,
        },
        FrameFormat::Spi24 => Response {
            word: u16::from_be_bytes([byte(0), byte(1)]),
            crc: Some(byte(2)),
        },
        FrameFormat::Spi32 => Response {
            word: u16::from_be_bytes([byte(1), byte(2)]),
            crc: Some(byte(3)),
        },
    }
}
