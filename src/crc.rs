//! CRC-8 used by the 24-bit and 32-bit SPI frames.

const SEED: u8 = 0xC4;
const POLYNOMIAL: u8 = 0x1D;

/// Calculate the CRC-8 of a 16-bit frame payload
///
/// Polynomial `x^8 + x^4 + x^3 + x^2 + 1` (0x1D), seed 0xC4, final XOR 0xFF.
/// Bits are processed MSB first.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn crc8(data: u16) -> u8 {
    let mut crc = SEED;
    let mut i = 0;
    while i < 16 {
        let feedback = ((data >> (15 - i)) as u8 ^ (crc >> 7)) & 1;
        crc = (crc << 1) ^ (POLYNOMIAL * feedback);
        i += 1;
    }
    crc ^ 0xFF
}

/// Verify a received CRC against the payload it protects
#[must_use]
pub const fn verify_crc8(data: u16, crc: u8) -> bool {
    crc8(data) == crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_reference_values() {
        assert_eq!(crc8(0x0000), 0xF1);
        assert_eq!(crc8(0x4000), 0x1B);
        assert_eq!(crc8(0x4001), 0x06);
        assert_eq!(crc8(0x3FFF), 0x57);
        assert_eq!(crc8(0x1234), 0xE3);
    }

    #[test]
    fn usable_in_const_context() {
        const NOP_READ: u8 = crc8(0x4000);
        assert_eq!(NOP_READ, 0x1B);
    }

    #[test]
    fn detects_single_bit_flips() {
        let payload = 0x2ABC;
        let crc = crc8(payload);
        for bit in 0..16 {
            assert!(!verify_crc8(payload ^ (1 << bit), crc));
        }
        assert!(verify_crc8(payload, crc));
    }
}
