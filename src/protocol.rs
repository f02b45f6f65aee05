use crate::types::{FrameKind, RawAxisTriple, StatusFlags};
use crate::{MotionPlusError, Result};

// -- Report geometry --
pub const FRAME_SIZE: usize = 6;

/// Largest raw axis value (14 bits).
pub const RAW_MAX: u16 = 0x3FFF;

/// Mask selecting the six high bits stored in a companion byte.
pub const HIGH_BITS_MASK: u8 = 0xFC;

// -- Status bits --
pub const YAW_SLOW_BIT: u8 = 0x02; // frame[3]
pub const PITCH_SLOW_BIT: u8 = 0x01; // frame[3]
pub const ROLL_SLOW_BIT: u8 = 0x02; // frame[4]
pub const EXTENSION_CONNECTED_BIT: u8 = 0x01; // frame[4]

/// Selector bit in frame[5] of a multiplexed report: set for gyroscope data.
pub const FRAME_KIND_BIT: u8 = 0x02;

// -- Device-side register setup, performed by the transport --
pub const REG_MOTIONPLUS_ACTIVATE: u32 = 0xA6_00FE;
pub const ACTIVATE_STANDALONE: u8 = 0x04;
pub const ACTIVATE_NUNCHUK_PASSTHROUGH: u8 = 0x05;
pub const REG_EXTENSION_INIT: u32 = 0xA4_0040;
pub const REG_EXTENSION_CALIBRATION: u32 = 0xA4_0030;
pub const EXTENSION_CALIBRATION_LEN: u16 = 0x000F;

/// Check that a report has exactly [`FRAME_SIZE`] bytes.
pub fn as_frame(data: &[u8]) -> Result<&[u8; FRAME_SIZE]> {
    data.try_into().map_err(|_| MotionPlusError::InvalidFrameLength {
        expected: FRAME_SIZE,
        actual: data.len(),
    })
}

/// Combine a low byte with the six high bits of its companion byte.
/// The companion's two low bits are status bits and are masked off.
fn combine(low: u8, companion: u8) -> u16 {
    (low as u16) ^ (((companion & HIGH_BITS_MASK) as u16) << 6)
}

/// Decode a 6-byte gyroscope report.
///
/// Report layout:
/// - `[0..2]`: yaw, roll, pitch low bytes
/// - `[3]`: yaw high bits (7..2), yaw slow (1), pitch slow (0)
/// - `[4]`: roll high bits (7..2), roll slow (1), extension connected (0)
/// - `[5]`: pitch high bits (7..2), two bits owned by the multiplexer
pub fn decode_frame(frame: &[u8; FRAME_SIZE]) -> (RawAxisTriple, StatusFlags) {
    let raw = RawAxisTriple {
        yaw: combine(frame[0], frame[3]),
        roll: combine(frame[1], frame[4]),
        pitch: combine(frame[2], frame[5]),
    };

    let mut status = StatusFlags::empty();
    status.set(StatusFlags::YAW_SLOW, frame[3] & YAW_SLOW_BIT != 0);
    status.set(StatusFlags::PITCH_SLOW, frame[3] & PITCH_SLOW_BIT != 0);
    status.set(StatusFlags::ROLL_SLOW, frame[4] & ROLL_SLOW_BIT != 0);
    status.set(
        StatusFlags::EXTENSION_CONNECTED,
        frame[4] & EXTENSION_CONNECTED_BIT != 0,
    );

    (raw, status)
}

/// Decode a report of unchecked length. Anything but 6 bytes is rejected.
pub fn decode(data: &[u8]) -> Result<(RawAxisTriple, StatusFlags)> {
    as_frame(data).map(decode_frame)
}

/// Determine which decoder a multiplexed report belongs to.
pub fn frame_kind(frame: &[u8; FRAME_SIZE]) -> FrameKind {
    if (frame[5] & FRAME_KIND_BIT) >> 1 == 1 {
        FrameKind::MotionPlus
    } else {
        FrameKind::Extension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_yaw_high_bits() {
        let frame = [0x12, 0x00, 0x00, 0xFC, 0x00, 0x00];
        let (raw, status) = decode(&frame).unwrap();
        assert_eq!(raw.yaw, 0x3F12);
        assert_eq!(raw.roll, 0);
        assert_eq!(raw.pitch, 0);
        assert!(status.is_empty());
    }

    #[test]
    fn test_decode_all_axes() {
        // yaw:   0xAB ^ (0x54 << 6) = 0x15AB
        // roll:  0xCD ^ (0xA8 << 6) = 0x2ACD
        // pitch: 0xEF ^ (0x04 << 6) = 0x01EF
        let frame = [0xAB, 0xCD, 0xEF, 0x54, 0xA8, 0x04];
        let (raw, _) = decode(&frame).unwrap();
        assert_eq!(raw, RawAxisTriple::new(0x15AB, 0x2ACD, 0x01EF));
    }

    #[test]
    fn test_status_bits_do_not_leak_into_readings() {
        let plain = [0x10, 0x20, 0x30, 0x40, 0x80, 0xC0];
        let flagged = [0x10, 0x20, 0x30, 0x43, 0x83, 0xC3];
        let (a, _) = decode(&plain).unwrap();
        let (b, status) = decode(&flagged).unwrap();
        assert_eq!(a, b);
        assert!(status.yaw_slow());
        assert!(status.pitch_slow());
        assert!(status.roll_slow());
        assert!(status.extension_connected());
    }

    #[test]
    fn test_status_bits_individually() {
        let cases: [([u8; 2], StatusFlags); 4] = [
            ([0x02, 0x00], StatusFlags::YAW_SLOW),
            ([0x01, 0x00], StatusFlags::PITCH_SLOW),
            ([0x00, 0x02], StatusFlags::ROLL_SLOW),
            ([0x00, 0x01], StatusFlags::EXTENSION_CONNECTED),
        ];
        for ([b3, b4], expected) in cases {
            let frame = [0, 0, 0, b3, b4, 0];
            let (_, status) = decode(&frame).unwrap();
            assert_eq!(status, expected, "bytes {:02x} {:02x}", b3, b4);
        }
    }

    #[test]
    fn test_decode_extremes() {
        let (raw, _) = decode(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]).unwrap();
        assert_eq!(raw, RawAxisTriple::new(RAW_MAX, RAW_MAX, RAW_MAX));

        let (raw, status) = decode(&[0; FRAME_SIZE]).unwrap();
        assert_eq!(raw, RawAxisTriple::default());
        assert!(status.is_empty());
    }

    #[test]
    fn test_decode_is_deterministic() {
        let frame = [0x5A, 0xA5, 0x3C, 0xC3, 0x96, 0x69];
        assert_eq!(decode(&frame).unwrap(), decode(&frame).unwrap());
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        match decode(&[0u8; 5]) {
            Err(MotionPlusError::InvalidFrameLength { expected, actual }) => {
                assert_eq!(expected, 6);
                assert_eq!(actual, 5);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(decode(&[0u8; 7]).is_err());
        assert!(decode(&[]).is_err());
    }

    #[test]
    fn test_frame_kind() {
        assert_eq!(frame_kind(&[0, 0, 0, 0, 0, 0x02]), FrameKind::MotionPlus);
        assert_eq!(frame_kind(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]), FrameKind::MotionPlus);
        assert_eq!(frame_kind(&[0, 0, 0, 0, 0, 0xFD]), FrameKind::Extension);
    }

    #[test]
    fn test_frame_kind_after_length_check() {
        let report: &[u8] = &[0x10, 0x20, 0x30, 0x40, 0x50, 0x62];
        let frame = as_frame(report).unwrap();
        assert_eq!(frame_kind(frame), FrameKind::MotionPlus);
        assert!(as_frame(&report[..2]).is_err());
    }
}
