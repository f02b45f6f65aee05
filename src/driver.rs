//! Drivers tying the decoder and [`SpeedEngine`] to a transport.
//!
//! [`MotionPlus`] handles a gyroscope attached on its own. [`MotionPlusNunchuk`]
//! handles the pass-through mode where gyroscope and secondary-extension
//! reports alternate on the same stream; the secondary reports are forwarded
//! untouched to an [`ExtensionSink`].

use crate::engine::SpeedEngine;
use crate::protocol::{self, FRAME_SIZE};
use crate::types::{FrameKind, SpeedEvent};
use crate::Result;

/// Register access provided by the transport layer.
pub trait RegisterIo {
    /// Write `data` starting at a 24-bit register address.
    fn write_register(&mut self, address: u32, data: &[u8]) -> Result<()>;

    /// Request `len` bytes starting at `address`. The reply arrives through
    /// the transport, not through this call.
    fn read_register(&mut self, address: u32, len: u16) -> Result<()>;
}

/// Consumer of secondary-extension reports in pass-through mode.
pub trait ExtensionSink {
    fn extension_data(&mut self, frame: &[u8; FRAME_SIZE]);
}

impl<F> ExtensionSink for F
where
    F: FnMut(&[u8; FRAME_SIZE]),
{
    fn extension_data(&mut self, frame: &[u8; FRAME_SIZE]) {
        self(frame)
    }
}

/// Standalone gyroscope extension.
pub struct MotionPlus {
    engine: SpeedEngine,
}

impl MotionPlus {
    pub fn new(engine: SpeedEngine) -> Self {
        Self { engine }
    }

    /// Activate the extension. Must succeed before reports arrive in the
    /// documented layout.
    pub fn initialize(&mut self, io: &mut dyn RegisterIo) -> Result<()> {
        io.write_register(protocol::REG_MOTIONPLUS_ACTIVATE, &[protocol::ACTIVATE_STANDALONE])
            .inspect_err(|e| log::warn!("MotionPlus activation failed: {}", e))
    }

    /// Decode and process one extension report.
    pub fn handle_report(&mut self, data: &[u8]) -> Result<Option<SpeedEvent>> {
        self.engine.submit_frame(data)
    }

    pub fn engine(&self) -> &SpeedEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SpeedEngine {
        &mut self.engine
    }
}

/// Gyroscope multiplexed with a secondary extension.
pub struct MotionPlusNunchuk<S> {
    engine: SpeedEngine,
    sink: S,
}

impl<S: ExtensionSink> MotionPlusNunchuk<S> {
    pub fn new(engine: SpeedEngine, sink: S) -> Self {
        Self { engine, sink }
    }

    /// Switch to pass-through mode, initialise the secondary extension and
    /// request its calibration block.
    pub fn initialize(&mut self, io: &mut dyn RegisterIo) -> Result<()> {
        let result = io
            .write_register(
                protocol::REG_MOTIONPLUS_ACTIVATE,
                &[protocol::ACTIVATE_NUNCHUK_PASSTHROUGH],
            )
            .and_then(|_| io.write_register(protocol::REG_EXTENSION_INIT, &[0x00]))
            .and_then(|_| {
                io.read_register(
                    protocol::REG_EXTENSION_CALIBRATION,
                    protocol::EXTENSION_CALIBRATION_LEN,
                )
            });
        result.inspect_err(|e| log::warn!("Pass-through setup failed: {}", e))
    }

    /// Route one report: gyroscope data is decoded and submitted, anything
    /// else goes to the sink.
    pub fn handle_report(&mut self, data: &[u8]) -> Result<Option<SpeedEvent>> {
        let frame = protocol::as_frame(data)?;
        match protocol::frame_kind(frame) {
            FrameKind::MotionPlus => {
                let (raw, status) = protocol::decode_frame(frame);
                Ok(self.engine.submit(raw, status))
            }
            FrameKind::Extension => {
                self.sink.extension_data(frame);
                Ok(None)
            }
        }
    }

    pub fn engine(&self) -> &SpeedEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SpeedEngine {
        &mut self.engine
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MotionPlusError;

    #[derive(Default)]
    struct RecordingIo {
        writes: Vec<(u32, Vec<u8>)>,
        reads: Vec<(u32, u16)>,
        fail_writes: bool,
    }

    impl RegisterIo for RecordingIo {
        fn write_register(&mut self, address: u32, data: &[u8]) -> Result<()> {
            if self.fail_writes {
                return Err(MotionPlusError::Register("write rejected".into()));
            }
            self.writes.push((address, data.to_vec()));
            Ok(())
        }

        fn read_register(&mut self, address: u32, len: u16) -> Result<()> {
            self.reads.push((address, len));
            Ok(())
        }
    }

    #[test]
    fn test_standalone_initialize() {
        let mut io = RecordingIo::default();
        let mut driver = MotionPlus::new(SpeedEngine::new());
        driver.initialize(&mut io).unwrap();
        assert_eq!(io.writes, vec![(0xA6_00FE, vec![0x04])]);
        assert!(io.reads.is_empty());
    }

    #[test]
    fn test_passthrough_initialize() {
        let mut io = RecordingIo::default();
        let mut driver = MotionPlusNunchuk::new(SpeedEngine::new(), |_: &[u8; 6]| {});
        driver.initialize(&mut io).unwrap();
        assert_eq!(
            io.writes,
            vec![(0xA6_00FE, vec![0x05]), (0xA4_0040, vec![0x00])]
        );
        assert_eq!(io.reads, vec![(0xA4_0030, 0x000F)]);
    }

    #[test]
    fn test_initialize_propagates_failure() {
        let mut io = RecordingIo {
            fail_writes: true,
            ..Default::default()
        };
        let mut driver = MotionPlusNunchuk::new(SpeedEngine::new(), |_: &[u8; 6]| {});
        assert!(matches!(
            driver.initialize(&mut io),
            Err(MotionPlusError::Register(_))
        ));
        assert!(io.reads.is_empty());
    }

    #[test]
    fn test_standalone_handle_report() {
        let mut driver = MotionPlus::new(SpeedEngine::new());
        assert!(driver.handle_report(&[0; 3]).is_err());

        let still = [0x00, 0x00, 0x00, 0x80, 0x80, 0x80];
        for _ in 0..50 {
            assert!(driver.handle_report(&still).unwrap().is_none());
        }
        assert!(driver.engine().is_calibrated());
        assert!(driver.handle_report(&still).unwrap().is_some());
    }

    #[test]
    fn test_multiplexed_routing() {
        let mut forwarded = Vec::new();
        {
            let sink = |frame: &[u8; 6]| forwarded.push(*frame);
            let mut driver = MotionPlusNunchuk::new(SpeedEngine::new(), sink);

            // Gyroscope reports carry 0x02 in frame[5].
            let gyro = [0x10, 0x20, 0x30, 0x80, 0x80, 0x82];
            let nunchuk = [0x7F, 0x80, 0x11, 0x22, 0x33, 0x0C];

            for _ in 0..50 {
                assert!(driver.handle_report(&gyro).unwrap().is_none());
                assert!(driver.handle_report(&nunchuk).unwrap().is_none());
            }
            assert!(driver.engine().is_calibrated());
            assert_eq!(driver.engine().baseline().pitch, Some(0x2030));
            assert!(driver.handle_report(&gyro).unwrap().is_some());
            assert!(matches!(
                driver.handle_report(&nunchuk[..4]),
                Err(MotionPlusError::InvalidFrameLength { actual: 4, .. })
            ));
        }
        assert_eq!(forwarded.len(), 50);
        assert_eq!(forwarded[0], [0x7F, 0x80, 0x11, 0x22, 0x33, 0x0C]);
    }
}
