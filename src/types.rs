use std::fmt;
use std::time::Instant;

/// One of the three rotational measurement channels.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Yaw = 0,
    Roll = 1,
    Pitch = 2,
}

impl Axis {
    /// All axes in frame order.
    pub const ALL: [Axis; 3] = [Axis::Yaw, Axis::Roll, Axis::Pitch];

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::Yaw => "yaw",
            Axis::Roll => "roll",
            Axis::Pitch => "pitch",
        };
        f.write_str(name)
    }
}

/// Raw 14-bit gyroscope readings for one frame, each in `0..=16383`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawAxisTriple {
    pub yaw: u16,
    pub roll: u16,
    pub pitch: u16,
}

impl RawAxisTriple {
    pub const fn new(yaw: u16, roll: u16, pitch: u16) -> Self {
        Self { yaw, roll, pitch }
    }

    pub const fn get(&self, axis: Axis) -> u16 {
        match axis {
            Axis::Yaw => self.yaw,
            Axis::Roll => self.roll,
            Axis::Pitch => self.pitch,
        }
    }
}

bitflags::bitflags! {
    /// Per-frame status bits carried in the companion bytes of a report.
    ///
    /// A set `*_SLOW` bit selects the slow (high sensitivity) scale for that axis.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[repr(C)]
    pub struct StatusFlags: u8 {
        const YAW_SLOW            = 1 << 0;
        const PITCH_SLOW          = 1 << 1;
        const ROLL_SLOW           = 1 << 2;
        const EXTENSION_CONNECTED = 1 << 3;
    }
}

impl StatusFlags {
    pub fn yaw_slow(self) -> bool {
        self.contains(Self::YAW_SLOW)
    }

    pub fn pitch_slow(self) -> bool {
        self.contains(Self::PITCH_SLOW)
    }

    pub fn roll_slow(self) -> bool {
        self.contains(Self::ROLL_SLOW)
    }

    pub fn extension_connected(self) -> bool {
        self.contains(Self::EXTENSION_CONNECTED)
    }

    /// Slow flag for the given axis.
    pub fn is_slow(self, axis: Axis) -> bool {
        match axis {
            Axis::Yaw => self.yaw_slow(),
            Axis::Roll => self.roll_slow(),
            Axis::Pitch => self.pitch_slow(),
        }
    }
}

/// Calibrated angular speeds for one frame.
///
/// Positive values mean yaw to the left, roll to the left and pitch down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedEvent {
    pub yaw_left_speed: f64,
    pub roll_left_speed: f64,
    pub pitch_down_speed: f64,
    /// Monotonic capture time.
    pub timestamp: Instant,
}

impl SpeedEvent {
    pub fn speed(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Yaw => self.yaw_left_speed,
            Axis::Roll => self.roll_left_speed,
            Axis::Pitch => self.pitch_down_speed,
        }
    }
}

/// Zero-rate raw value per axis. `None` until that axis has calibrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalibrationBaseline {
    pub yaw: Option<u16>,
    pub roll: Option<u16>,
    pub pitch: Option<u16>,
}

impl CalibrationBaseline {
    pub fn get(&self, axis: Axis) -> Option<u16> {
        match axis {
            Axis::Yaw => self.yaw,
            Axis::Roll => self.roll,
            Axis::Pitch => self.pitch,
        }
    }
}

/// Calibration progress of a single axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisStatus {
    pub calibrated: bool,
    /// Samples collected since the last reset.
    pub samples: usize,
}

/// Calibration progress of all three axes, indexed by [`Axis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationStatus {
    pub axes: [AxisStatus; 3],
}

impl CalibrationStatus {
    pub fn axis(&self, axis: Axis) -> AxisStatus {
        self.axes[axis.index()]
    }

    pub fn is_ready(&self) -> bool {
        self.axes.iter().all(|a| a.calibrated)
    }
}

/// Which collaborator a multiplexed report belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Gyroscope data for this crate's decoder.
    MotionPlus,
    /// Joystick/button/accelerometer data for the secondary extension.
    Extension,
}
