//! Simulated AS5047U for multi-frame sequences.
//!
//! Answers one frame late like the real device, infers the frame format from
//! the frame length, checks incoming CRCs and models ERRFL clear-on-read and
//! the OTP burn and refresh cycle.

#![allow(dead_code)]

use std::collections::VecDeque;

use as5047u::crc8;
use embedded_hal::spi::{self, ErrorKind, ErrorType, Operation, SpiDevice};

pub const ERRFL: u16 = 0x0001;
pub const PROG: u16 = 0x0003;
pub const ECC: u16 = 0x001B;
pub const ECC_CHECKSUM: u16 = 0x3FD0;

/// First and last address burned into OTP
pub const OTP_FIRST: u16 = 0x0016;
pub const OTP_LAST: u16 = ECC;

pub const CRC_ERROR: u16 = 1 << 6;

const READ_FLAG: u16 = 0x4000;
const ADDRESS_MASK: u16 = 0x3FFF;

const PROGEN: u16 = 1 << 0;
const OTPREF: u16 = 1 << 2;
const PROGOTP: u16 = 1 << 3;

/// Transport failure injected with [`FakeSensor::fail_after_frames`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFault;

impl spi::Error for BusFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// When `trigger` is written, overwrite `target` with `value`
#[derive(Debug, Clone, Copy)]
pub struct Tamper {
    pub trigger: u16,
    pub target: u16,
    pub value: u16,
}

#[derive(Debug)]
pub struct FakeSensor {
    pub regs: Vec<u16>,
    /// Burned OTP content for `OTP_FIRST..=OTP_LAST`
    pub otp: [u16; 6],
    pub ecc_checksum: u16,

    /// ERRFL bits raised by the device itself, cleared on read
    pub errfl: u16,
    /// OR-ed into every ERRFL read
    pub force_errfl: u16,
    /// One-shot values OR-ed into the next ERRFL reads
    pub injected_errfl: VecDeque<u16>,
    /// Number of upcoming data frames discarded as CRC failures
    pub corrupt_data_frames: usize,
    /// Frames accepted before every transfer fails with [`BusFault`]
    pub fail_after_frames: Option<usize>,

    /// PROG polls answered as busy after a burn is triggered
    pub burn_polls: usize,
    pub burn_hangs: bool,
    pub burn_triggered: bool,
    pub tamper: Option<Tamper>,
    /// Applied to the shadow registers after every OTP refresh
    pub corrupt_reload: Option<(u16, u16)>,

    /// Address of every write command received
    pub write_commands: Vec<u16>,
    /// Every completed write as `(address, value)`
    pub writes: Vec<(u16, u16)>,
    pub frame_lens: Vec<usize>,

    next_response: u16,
    pending_write: Option<u16>,
    busy_polls: usize,
}

impl Default for FakeSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeSensor {
    pub fn new() -> Self {
        Self {
            regs: vec![0; 0x4000],
            otp: [0; 6],
            ecc_checksum: 0x2A,
            errfl: 0,
            force_errfl: 0,
            injected_errfl: VecDeque::new(),
            corrupt_data_frames: 0,
            fail_after_frames: None,
            burn_polls: 3,
            burn_hangs: false,
            burn_triggered: false,
            tamper: None,
            corrupt_reload: None,
            write_commands: Vec::new(),
            writes: Vec::new(),
            frame_lens: Vec::new(),
            next_response: 0,
            pending_write: None,
            busy_polls: 0,
        }
    }

    pub fn with_reg(mut self, address: u16, value: u16) -> Self {
        self.regs[usize::from(address)] = value;
        self
    }

    pub fn reg(&self, address: u16) -> u16 {
        self.regs[usize::from(address)]
    }

    pub fn write_commands_to(&self, address: u16) -> usize {
        self.write_commands.iter().filter(|&&a| a == address).count()
    }

    fn frame(&mut self, tx: &[u8]) -> Result<Vec<u8>, BusFault> {
        if let Some(remaining) = self.fail_after_frames.as_mut() {
            if *remaining == 0 {
                return Err(BusFault);
            }
            *remaining -= 1;
        }
        self.frame_lens.push(tx.len());

        let response = self.next_response;
        let (word, crc) = match tx.len() {
            2 => (u16::from_be_bytes([tx[0], tx[1]]), None),
            3 => (u16::from_be_bytes([tx[0], tx[1]]), Some(tx[2])),
            4 => (u16::from_be_bytes([tx[1], tx[2]]), Some(tx[3])),
            n => panic!("unexpected {n}-byte frame"),
        };

        if crc.is_some_and(|crc| crc != crc8(word)) {
            self.errfl |= CRC_ERROR;
            self.pending_write = None;
            self.next_response = 0;
        } else {
            self.receive(word);
        }

        Ok(encode(tx.len(), response))
    }

    fn receive(&mut self, word: u16) {
        if let Some(address) = self.pending_write.take() {
            if self.corrupt_data_frames > 0 {
                self.corrupt_data_frames -= 1;
                self.errfl |= CRC_ERROR;
                self.next_response = 0;
                return;
            }
            let value = word & ADDRESS_MASK;
            self.write(address, value);
            self.next_response = value;
            return;
        }

        let address = word & ADDRESS_MASK;
        if word & READ_FLAG != 0 {
            self.next_response = self.read(address);
        } else if address == 0 {
            // 16-bit NOP
            self.next_response = 0;
        } else {
            self.write_commands.push(address);
            self.pending_write = Some(address);
            self.next_response = self.reg(address);
        }
    }

    fn read(&mut self, address: u16) -> u16 {
        match address {
            0 => 0,
            ERRFL => {
                let injected = self.injected_errfl.pop_front().unwrap_or(0);
                let value = self.errfl | self.force_errfl | injected;
                self.errfl = 0;
                value
            }
            PROG if self.reg(PROG) & PROGOTP != 0 => {
                if self.burn_hangs {
                    return self.reg(PROG);
                }
                if self.busy_polls > 0 {
                    self.busy_polls -= 1;
                    return self.reg(PROG);
                }
                self.regs[usize::from(PROG)] = PROGEN;
                PROGEN
            }
            ECC_CHECKSUM => self.ecc_checksum,
            _ => self.reg(address),
        }
    }

    fn write(&mut self, address: u16, value: u16) {
        self.writes.push((address, value));
        self.regs[usize::from(address)] = value;

        if address == PROG {
            if value & (PROGEN | PROGOTP) == PROGEN | PROGOTP {
                for (i, otp) in self.otp.iter_mut().enumerate() {
                    *otp = self.regs[usize::from(OTP_FIRST) + i];
                }
                self.burn_triggered = true;
                self.busy_polls = self.burn_polls;
            }
            if value & OTPREF != 0 {
                for (i, otp) in self.otp.iter().enumerate() {
                    self.regs[usize::from(OTP_FIRST) + i] = *otp;
                }
                if let Some((target, corrupted)) = self.corrupt_reload {
                    self.regs[usize::from(target)] = corrupted;
                }
            }
        }

        if let Some(tamper) = self.tamper {
            if tamper.trigger == address {
                self.regs[usize::from(tamper.target)] = tamper.value;
            }
        }
    }
}

fn encode(len: usize, word: u16) -> Vec<u8> {
    let [hi, lo] = word.to_be_bytes();
    match len {
        2 => vec![hi, lo],
        3 => vec![hi, lo, crc8(word)],
        _ => vec![0, hi, lo, crc8(word)],
    }
}

impl ErrorType for FakeSensor {
    type Error = BusFault;
}

impl SpiDevice for FakeSensor {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), BusFault> {
        for operation in operations {
            match operation {
                Operation::Transfer(read, write) => {
                    let rx = self.frame(write)?;
                    let n = read.len().min(rx.len());
                    read[..n].copy_from_slice(&rx[..n]);
                }
                Operation::TransferInPlace(buf) => {
                    let rx = self.frame(&buf[..])?;
                    let n = buf.len().min(rx.len());
                    buf[..n].copy_from_slice(&rx[..n]);
                }
                Operation::Write(write) => {
                    self.frame(write)?;
                }
                Operation::Read(read) => {
                    let rx = self.frame(&vec![0; read.len()])?;
                    let n = read.len().min(rx.len());
                    read[..n].copy_from_slice(&rx[..n]);
                }
                Operation::DelayNs(_) => {}
            }
        }
        Ok(())
    }
}
