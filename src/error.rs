use std::cell::RefCell;
use std::ffi::{c_char, CString};

/// Errors that can occur while decoding or calibrating MotionPlus data.
#[derive(Debug, thiserror::Error)]
pub enum MotionPlusError {
    #[error("Invalid frame length: expected {expected} bytes, got {actual}")]
    InvalidFrameLength { expected: usize, actual: usize },

    #[error("Register operation failed: {0}")]
    Register(String),

    #[error("Speed stream stopped")]
    StreamStopped,

    #[error("Timeout waiting for data")]
    Timeout,

    #[error("Null pointer passed for `{0}`")]
    NullArgument(&'static str),
}

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Per-thread last-error storage for the C FFI layer.
///
/// Each thread owns its message, so a failure on one thread never frees a
/// string another thread is reading.
pub(crate) struct LastError;

impl LastError {
    pub fn set(err: &MotionPlusError) {
        let msg = CString::new(err.to_string()).unwrap_or_default();
        LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(msg));
    }

    pub fn clear() {
        LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
    }

    /// Valid until the next `set` or `clear` on the calling thread.
    pub fn as_ptr() -> *const c_char {
        LAST_ERROR.with(|slot| match slot.borrow().as_ref() {
            Some(msg) => msg.as_ptr(),
            None => std::ptr::null(),
        })
    }
}
