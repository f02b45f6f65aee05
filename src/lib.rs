//! # motionplus - gyroscope extension decoding and calibration
//!
//! Turns raw 6-byte MotionPlus reports into calibrated angular speeds.
//! Provides:
//! - Pure report decoding (14-bit yaw/roll/pitch plus status bits)
//! - Per-axis zero-rate calibration from a window of still samples
//! - Speed events delivered to listeners or through a channel
//! - Standalone and Nunchuk pass-through drivers over a transport-provided register interface
//! - C FFI for integration with C/C++ transports
//!
//! ## Quick Start
//! ```no_run
//! use motionplus::SpeedEngine;
//! use std::time::Duration;
//!
//! let mut engine = SpeedEngine::new();
//! let stream = engine.stream(64);
//!
//! # let report = [0u8; 6];
//! // Once per report from the transport:
//! engine.submit_frame(&report).unwrap();
//!
//! if let Ok(event) = stream.recv_timeout(Duration::from_millis(10)) {
//!     println!("yaw: {:+.2}", event.yaw_left_speed);
//! }
//! ```

pub mod error;
pub mod types;
pub mod protocol;
pub mod calibration;
pub mod engine;
pub mod stream;
pub mod driver;
pub mod ffi;

pub use error::MotionPlusError;
pub use types::*;
pub use protocol::decode;
pub use engine::{EngineConfig, ListenerId, SpeedEngine, SpeedListener};
pub use stream::SpeedStream;
pub use driver::{ExtensionSink, MotionPlus, MotionPlusNunchuk, RegisterIo};

/// Result type alias for motionplus operations.
pub type Result<T> = std::result::Result<T, MotionPlusError>;
