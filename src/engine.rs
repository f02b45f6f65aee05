use crate::calibration::Calibration;
use crate::protocol;
use crate::stream::SpeedStream;
use crate::types::{Axis, CalibrationBaseline, CalibrationStatus, RawAxisTriple, SpeedEvent, StatusFlags};
use crate::Result;
use std::time::Instant;

/// Tunables for calibration and speed conversion.
///
/// The defaults match the peripheral's documented behaviour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Number of recent readings evaluated for stillness.
    pub window: usize,
    /// Largest accepted spread (max - min) within the window.
    pub tolerance: u16,
    /// Speeds with a smaller magnitude are reported as exactly zero.
    pub noise_floor: f64,
    /// Raw units per speed unit when the slow flag is set.
    pub slow_scale: f64,
    /// Raw units per speed unit when the slow flag is clear.
    pub fast_scale: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window: 50,
            tolerance: 75,
            noise_floor: 0.5,
            slow_scale: 20.0,
            fast_scale: 4.0,
        }
    }
}

/// Receives a [`SpeedEvent`] for every calibrated frame.
///
/// Listeners run synchronously on the thread calling [`SpeedEngine::submit`],
/// so a slow listener stalls frame processing. Hand work off (for example via
/// [`SpeedEngine::stream`]) if it may block.
pub trait SpeedListener: Send {
    fn speed_changed(&mut self, event: SpeedEvent);

    /// A closed listener is removed after the current notification round.
    fn is_closed(&self) -> bool {
        false
    }
}

impl<F> SpeedListener for F
where
    F: FnMut(SpeedEvent) + Send,
{
    fn speed_changed(&mut self, event: SpeedEvent) {
        self(event)
    }
}

/// Handle returned by [`SpeedEngine::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Calibration and speed conversion for one gyroscope.
///
/// Not synchronized: wrap in a `Mutex` if frames may be submitted from more
/// than one thread.
pub struct SpeedEngine {
    config: EngineConfig,
    calibration: Calibration,
    listeners: Vec<(ListenerId, Box<dyn SpeedListener>)>,
    next_id: u64,
}

impl SpeedEngine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            calibration: Calibration::new(config.window, config.tolerance),
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Process one decoded frame.
    ///
    /// While any axis is uncalibrated the frame only feeds calibration and no
    /// event is produced, even for axes that are already calibrated.
    pub fn submit(&mut self, raw: RawAxisTriple, status: StatusFlags) -> Option<SpeedEvent> {
        let Some(baseline) = self.calibration.ready_baseline() else {
            self.calibration.observe(&raw);
            if self.calibration.is_ready() {
                log::info!("Gyroscope calibrated: {:?}", self.calibration.baseline());
            }
            return None;
        };

        let speed = |axis: Axis| self.speed(axis, raw.get(axis), baseline[axis.index()], status);

        let event = SpeedEvent {
            yaw_left_speed: speed(Axis::Yaw),
            roll_left_speed: speed(Axis::Roll),
            pitch_down_speed: speed(Axis::Pitch),
            timestamp: Instant::now(),
        };

        for (_, listener) in &mut self.listeners {
            listener.speed_changed(event);
        }
        self.listeners.retain(|(id, listener)| {
            let closed = listener.is_closed();
            if closed {
                log::debug!("Removing closed listener {:?}", id);
            }
            !closed
        });

        Some(event)
    }

    /// Decode a raw 6-byte report and submit it.
    pub fn submit_frame(&mut self, data: &[u8]) -> Result<Option<SpeedEvent>> {
        let (raw, status) = protocol::decode(data)?;
        Ok(self.submit(raw, status))
    }

    fn speed(&self, axis: Axis, raw: u16, baseline: u16, status: StatusFlags) -> f64 {
        let scale = if status.is_slow(axis) {
            self.config.slow_scale
        } else {
            self.config.fast_scale
        };
        let speed = (raw as f64 - baseline as f64) / scale;
        if speed.abs() < self.config.noise_floor {
            0.0
        } else {
            speed
        }
    }

    /// Discard all calibration data. The next frames start a fresh window per axis.
    pub fn reset_calibration(&mut self) {
        self.calibration.reset();
        log::info!("Gyroscope calibration reset");
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_ready()
    }

    pub fn baseline(&self) -> CalibrationBaseline {
        self.calibration.baseline()
    }

    pub fn calibration_status(&self) -> CalibrationStatus {
        self.calibration.status()
    }

    /// Register a listener. Listeners are notified in registration order; a
    /// listener registered twice is notified twice.
    pub fn subscribe<L>(&mut self, listener: L) -> ListenerId
    where
        L: SpeedListener + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        match self.listeners.iter().position(|(lid, _)| *lid == id) {
            Some(index) => {
                self.listeners.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Subscribe a bounded channel and return its receiving end.
    ///
    /// Events are dropped when the channel is full.
    pub fn stream(&mut self, capacity: usize) -> SpeedStream {
        SpeedStream::attach(self, capacity)
    }
}

impl Default for SpeedEngine {
    fn default() -> Self {
        Self::new()
    }
}
