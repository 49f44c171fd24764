#![no_std]

/// Marks the start of an individual LED control report.
pub const MAGIC_SEQUENCE: &[u8; 3] = b"\x0c\x02\x00";
pub const LED_COUNT_OFFSET: usize = 3;
pub const STRIP_INDEX_OFFSET: usize = 4;

/// The device exposes 90 individually addressable LEDs.
pub const LEN_MAX: usize = 90;
/// Selects individual LED control, the only mode supported here.
pub const STRIP_INDEX: u8 = 0x0F;

pub const BYTES_PER_LED: usize = 3;
/// Bytes 5..13 are reserved and always zero.
pub const RGB_DATA_OFFSET: usize = 13;

/// Length of the report without the report type byte.
pub const REPORT_LENGTH: usize = 0x175;
pub const REPORT_TYPE: u8 = 0x2A;
pub const REPORT_TYPE_LEN: usize = 1;
pub const FRAMED_REPORT_LENGTH: usize = REPORT_TYPE_LEN + REPORT_LENGTH;

const _: () = assert!(RGB_DATA_OFFSET + BYTES_PER_LED * LEN_MAX <= REPORT_LENGTH);
