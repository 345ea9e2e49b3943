//! OTP commit sequence against the simulated sensor.

mod common;

use as5047u::{As5047u, Config, Error, FrameFormat};
use common::{BusFault, ECC, FakeSensor, OTP_FIRST, PROG, Tamper};

const ANGLE: u16 = 0x3FFF;
const SETTINGS1: u16 = 0x0018;
const SETTINGS2: u16 = 0x0019;
const SETTINGS3: u16 = 0x001A;

fn configured_sensor() -> FakeSensor {
    FakeSensor::new()
        .with_reg(ANGLE, 0x1234)
        .with_reg(SETTINGS1, 0x0012)
        .with_reg(SETTINGS2, 0x0005)
        .with_reg(SETTINGS3, 0x0041)
}

#[test]
fn burns_and_verifies() {
    let mut sensor = As5047u::new(configured_sensor());

    assert!(sensor.program_otp().unwrap());
    assert_eq!(sensor.frame_format(), FrameFormat::Spi16);

    let fake = sensor.release();
    assert!(fake.burn_triggered);
    // Current angle locked in as zero position
    assert_eq!(fake.otp[0], 0x0048);
    assert_eq!(fake.otp[1], 0x0034);
    assert_eq!(fake.otp[2..5], [0x0012, 0x0005, 0x0041]);
    assert_eq!(fake.otp[5], 0x0080 | fake.ecc_checksum);
    assert_eq!(fake.reg(ECC), 0x0080 | fake.ecc_checksum);

    // 16-bit transport is upgraded to CRC frames for the whole sequence
    assert!(fake.frame_lens.iter().all(|&len| len == 3));

    // Burn trigger, then verify with a refresh toggle
    let prog_writes: Vec<u16> = fake
        .writes
        .iter()
        .filter(|(address, _)| *address == PROG)
        .map(|&(_, value)| value)
        .collect();
    assert_eq!(prog_writes, [0x0001, 0x0009, 0x0040, 0x0044, 0x0040]);

    // Shadow registers cleared before the refresh and reloaded by it
    for address in OTP_FIRST..ECC {
        assert!(fake.writes.contains(&(address, 0)));
    }
    assert_eq!(fake.reg(SETTINGS2), 0x0005);
}

#[test]
fn keeps_32bit_frames() {
    let config = Config::default().frame_format(FrameFormat::Spi32);
    let mut sensor = As5047u::with_config(configured_sensor(), config);

    assert!(sensor.program_otp().unwrap());
    assert_eq!(sensor.frame_format(), FrameFormat::Spi32);
    assert!(sensor.release().frame_lens.iter().all(|&len| len == 4));
}

#[test]
fn aborts_before_burn_when_shadow_changes() {
    let mut fake = configured_sensor();
    fake.tamper = Some(Tamper {
        trigger: ECC,
        target: SETTINGS2,
        value: 0x0010,
    });
    let mut sensor = As5047u::new(fake);

    assert!(!sensor.program_otp().unwrap());
    assert_eq!(sensor.frame_format(), FrameFormat::Spi16);

    let fake = sensor.release();
    assert!(!fake.burn_triggered);
    assert_eq!(fake.write_commands_to(PROG), 0);
}

#[test]
fn times_out_when_burn_never_completes() {
    let mut fake = configured_sensor();
    fake.burn_hangs = true;
    let mut sensor = As5047u::with_config(fake, Config::default().frame_format(FrameFormat::Spi24));

    assert!(!sensor.program_otp().unwrap());
    assert_eq!(sensor.frame_format(), FrameFormat::Spi24);

    let fake = sensor.release();
    assert!(fake.burn_triggered);
    // No verification writes after the timeout
    assert_eq!(fake.write_commands_to(PROG), 2);
}

#[test]
fn reports_verification_mismatch() {
    let mut fake = configured_sensor();
    fake.corrupt_reload = Some((SETTINGS1, 0x0007));
    let mut sensor = As5047u::new(fake);

    assert!(!sensor.program_otp().unwrap());
    assert_eq!(sensor.frame_format(), FrameFormat::Spi16);
    assert!(sensor.release().burn_triggered);
}

#[test]
fn aborts_when_zero_lock_write_fails() {
    let mut fake = configured_sensor();
    fake.force_errfl = common::CRC_ERROR;
    let mut sensor = As5047u::with_config(fake, Config::default().retries(1));

    assert!(!sensor.program_otp().unwrap());

    let fake = sensor.release();
    assert_eq!(fake.write_commands_to(0x0016), 2);
    assert!(!fake.burn_triggered);
}

#[test]
fn restores_frame_format_on_transport_error() {
    let mut fake = configured_sensor();
    fake.fail_after_frames = Some(10);
    let mut sensor = As5047u::new(fake);

    assert_eq!(sensor.program_otp(), Err(Error::Communication(BusFault)));
    assert_eq!(sensor.frame_format(), FrameFormat::Spi16);
    assert!(!sensor.release().burn_triggered);
}
