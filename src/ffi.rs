//! C FFI layer for motionplus.
//!
//! Provides an opaque handle-based API for C/C++ transports.
//! The generated C header is written to `include/motionplus.h` by cbindgen.

use crate::engine::SpeedEngine;
use crate::error::LastError;
use crate::protocol;
use crate::types::SpeedEvent;
use crate::MotionPlusError;
use std::ffi::{c_char, c_int};
use std::time::Instant;

/// Record `err` for `mp_last_error` and return the C failure code.
fn fail(err: MotionPlusError) -> c_int {
    LastError::set(&err);
    -1
}

/// Opaque engine handle for C consumers.
pub struct MpEngine {
    engine: SpeedEngine,
    /// Reference point for event timestamps.
    epoch: Instant,
}

/// Decoded report in C-compatible layout.
#[repr(C)]
pub struct MpRawFrame {
    /// Raw readings [yaw, roll, pitch], 14 bits each.
    pub raw: [u16; 3],
    pub yaw_slow: bool,
    pub pitch_slow: bool,
    pub roll_slow: bool,
    pub extension_connected: bool,
}

/// Speed event in C-compatible layout.
#[repr(C)]
pub struct MpSpeedEvent {
    pub yaw_left_speed: f64,
    pub roll_left_speed: f64,
    pub pitch_down_speed: f64,
    /// Seconds since the engine was created.
    pub timestamp_s: f64,
}

impl MpSpeedEvent {
    fn from_event(event: &SpeedEvent, epoch: Instant) -> Self {
        Self {
            yaw_left_speed: event.yaw_left_speed,
            roll_left_speed: event.roll_left_speed,
            pitch_down_speed: event.pitch_down_speed,
            timestamp_s: event.timestamp.duration_since(epoch).as_secs_f64(),
        }
    }
}

/// Decode a 6-byte report.
/// Returns 0 on success, -1 on error (check mp_last_error()).
///
/// # Safety
/// `data` must point to `len` readable bytes and `out` to a writable
/// `MpRawFrame`, or either may be null.
#[no_mangle]
pub unsafe extern "C" fn mp_decode(data: *const u8, len: usize, out: *mut MpRawFrame) -> c_int {
    if data.is_null() {
        return fail(MotionPlusError::NullArgument("data"));
    }
    if out.is_null() {
        return fail(MotionPlusError::NullArgument("out"));
    }
    let bytes = std::slice::from_raw_parts(data, len);

    match protocol::decode(bytes) {
        Ok((raw, status)) => {
            out.write(MpRawFrame {
                raw: [raw.yaw, raw.roll, raw.pitch],
                yaw_slow: status.yaw_slow(),
                pitch_slow: status.pitch_slow(),
                roll_slow: status.roll_slow(),
                extension_connected: status.extension_connected(),
            });
            0
        }
        Err(e) => fail(e),
    }
}

/// Create an engine with default calibration settings.
#[no_mangle]
pub extern "C" fn mp_engine_new() -> *mut MpEngine {
    Box::into_raw(Box::new(MpEngine {
        engine: SpeedEngine::new(),
        epoch: Instant::now(),
    }))
}

/// Free an engine.
///
/// # Safety
/// `engine` must be a pointer returned by `mp_engine_new`, or null.
#[no_mangle]
pub unsafe extern "C" fn mp_engine_free(engine: *mut MpEngine) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

/// Decode and submit one 6-byte report.
/// Returns 1 if `out` was filled with a speed event, 0 if the engine is still
/// calibrating, -1 on error.
///
/// # Safety
/// `engine` must be a valid engine pointer, `data` must point to `len`
/// readable bytes and `out` to a writable `MpSpeedEvent`, or any may be null.
#[no_mangle]
pub unsafe extern "C" fn mp_engine_submit(
    engine: *mut MpEngine,
    data: *const u8,
    len: usize,
    out: *mut MpSpeedEvent,
) -> c_int {
    if engine.is_null() {
        return fail(MotionPlusError::NullArgument("engine"));
    }
    if data.is_null() {
        return fail(MotionPlusError::NullArgument("data"));
    }
    if out.is_null() {
        return fail(MotionPlusError::NullArgument("out"));
    }
    let handle = &mut *engine;
    let bytes = std::slice::from_raw_parts(data, len);

    match handle.engine.submit_frame(bytes) {
        Ok(Some(event)) => {
            out.write(MpSpeedEvent::from_event(&event, handle.epoch));
            1
        }
        Ok(None) => 0,
        Err(e) => fail(e),
    }
}

/// Discard calibration; the engine recalibrates from the next reports.
///
/// # Safety
/// `engine` must be a valid engine pointer, or null.
#[no_mangle]
pub unsafe extern "C" fn mp_engine_reset(engine: *mut MpEngine) {
    if let Some(handle) = engine.as_mut() {
        handle.engine.reset_calibration();
    }
}

/// Check whether all three axes are calibrated.
///
/// # Safety
/// `engine` must be a valid engine pointer, or null.
#[no_mangle]
pub unsafe extern "C" fn mp_engine_is_calibrated(engine: *const MpEngine) -> bool {
    match engine.as_ref() {
        Some(handle) => handle.engine.is_calibrated(),
        None => false,
    }
}

/// Get the last error message recorded on the calling thread. Returns NULL if
/// no error. The pointer is valid until the next failing motionplus call on
/// the same thread.
#[no_mangle]
pub extern "C" fn mp_last_error() -> *const c_char {
    LastError::as_ptr()
}

/// Clear the last error message.
#[no_mangle]
pub extern "C" fn mp_clear_error() {
    LastError::clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_through_ffi() {
        let frame = [0x12u8, 0x00, 0x00, 0xFE, 0x01, 0x00];
        let mut out = MpRawFrame {
            raw: [0; 3],
            yaw_slow: false,
            pitch_slow: false,
            roll_slow: false,
            extension_connected: false,
        };
        let rc = unsafe { mp_decode(frame.as_ptr(), frame.len(), &mut out) };
        assert_eq!(rc, 0);
        assert_eq!(out.raw, [0x3F12, 0, 0]);
        assert!(out.yaw_slow);
        assert!(!out.pitch_slow);
        assert!(out.extension_connected);
    }

    #[test]
    fn test_engine_lifecycle() {
        let engine = mp_engine_new();
        let frame = [0u8, 0, 0, 0x40, 0x40, 0x40];
        let mut event = MpSpeedEvent {
            yaw_left_speed: -1.0,
            roll_left_speed: -1.0,
            pitch_down_speed: -1.0,
            timestamp_s: -1.0,
        };

        unsafe {
            for _ in 0..50 {
                assert_eq!(mp_engine_submit(engine, frame.as_ptr(), 6, &mut event), 0);
            }
            assert!(mp_engine_is_calibrated(engine));
            assert_eq!(mp_engine_submit(engine, frame.as_ptr(), 6, &mut event), 1);
            assert_eq!(event.yaw_left_speed, 0.0);
            assert!(event.timestamp_s >= 0.0);

            assert_eq!(mp_engine_submit(engine, frame.as_ptr(), 5, &mut event), -1);
            assert!(!mp_last_error().is_null());

            mp_engine_reset(engine);
            assert!(!mp_engine_is_calibrated(engine));
            mp_engine_free(engine);
        }
    }

    fn last_error() -> String {
        let ptr = mp_last_error();
        assert!(!ptr.is_null());
        unsafe { std::ffi::CStr::from_ptr(ptr) }
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn test_null_handles() {
        unsafe {
            assert!(!mp_engine_is_calibrated(std::ptr::null()));
            mp_engine_reset(std::ptr::null_mut());
            mp_engine_free(std::ptr::null_mut());
            assert_eq!(
                mp_engine_submit(std::ptr::null_mut(), std::ptr::null(), 0, std::ptr::null_mut()),
                -1
            );
        }
    }

    #[test]
    fn test_null_arguments_set_last_error() {
        let frame = [0u8; 6];
        let engine = mp_engine_new();

        unsafe {
            mp_clear_error();
            assert_eq!(
                mp_engine_submit(std::ptr::null_mut(), frame.as_ptr(), 6, std::ptr::null_mut()),
                -1
            );
            assert_eq!(last_error(), "Null pointer passed for `engine`");

            assert_eq!(
                mp_engine_submit(engine, frame.as_ptr(), 6, std::ptr::null_mut()),
                -1
            );
            assert_eq!(last_error(), "Null pointer passed for `out`");

            assert_eq!(mp_decode(std::ptr::null(), 6, std::ptr::null_mut()), -1);
            assert_eq!(last_error(), "Null pointer passed for `data`");

            mp_engine_free(engine);
        }
        mp_clear_error();
        assert!(mp_last_error().is_null());
    }
}
