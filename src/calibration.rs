//! Zero-rate calibration.
//!
//! Each axis keeps the most recent `window` raw readings. Once the window is
//! full and its spread (max - min) is within tolerance, the midpoint becomes
//! that axis's baseline and the axis stops collecting. An axis that never
//! holds still never calibrates; there is no timeout.

use crate::types::{Axis, AxisStatus, CalibrationBaseline, CalibrationStatus, RawAxisTriple};
use std::collections::VecDeque;

/// Stillness detector for a single axis.
#[derive(Debug, Clone)]
pub struct AxisCalibrator {
    window: VecDeque<u16>,
    capacity: usize,
    tolerance: u16,
    samples: usize,
    baseline: Option<u16>,
}

impl AxisCalibrator {
    pub fn new(capacity: usize, tolerance: u16) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            tolerance,
            samples: 0,
            baseline: None,
        }
    }

    /// Feed one raw reading. Returns the baseline if this sample completed calibration.
    ///
    /// Readings are ignored once the axis is calibrated.
    pub fn push(&mut self, value: u16) -> Option<u16> {
        if self.baseline.is_some() {
            return None;
        }

        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(value);
        self.samples += 1;

        if self.window.len() < self.capacity {
            return None;
        }

        let (min, max) = self
            .window
            .iter()
            .fold((u16::MAX, u16::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let spread = max - min;

        if spread > self.tolerance {
            log::trace!("window rejected: spread {} > {}", spread, self.tolerance);
            return None;
        }

        let baseline = ((min as u32 + max as u32) / 2) as u16;
        self.baseline = Some(baseline);
        self.window.clear();
        Some(baseline)
    }

    pub fn baseline(&self) -> Option<u16> {
        self.baseline
    }

    pub fn is_calibrated(&self) -> bool {
        self.baseline.is_some()
    }

    /// Total readings accepted since the last reset.
    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn reset(&mut self) {
        self.window.clear();
        self.samples = 0;
        self.baseline = None;
    }
}

/// Independent calibration state for yaw, roll and pitch.
#[derive(Debug, Clone)]
pub struct Calibration {
    axes: [AxisCalibrator; 3],
}

impl Calibration {
    pub fn new(window: usize, tolerance: u16) -> Self {
        Self {
            axes: std::array::from_fn(|_| AxisCalibrator::new(window, tolerance)),
        }
    }

    /// Feed one frame to every axis that is still uncalibrated.
    pub fn observe(&mut self, raw: &RawAxisTriple) {
        for axis in Axis::ALL {
            let cal = &mut self.axes[axis.index()];
            let value = raw.get(axis);
            if let Some(baseline) = cal.push(value) {
                log::debug!(
                    "{} calibrated: baseline={} after {} samples",
                    axis,
                    baseline,
                    cal.samples()
                );
            }
        }
    }

    pub fn axis(&self, axis: Axis) -> &AxisCalibrator {
        &self.axes[axis.index()]
    }

    pub fn is_ready(&self) -> bool {
        self.axes.iter().all(AxisCalibrator::is_calibrated)
    }

    /// Baselines indexed by [`Axis`], once every axis has calibrated.
    pub fn ready_baseline(&self) -> Option<[u16; 3]> {
        Some([
            self.axes[0].baseline()?,
            self.axes[1].baseline()?,
            self.axes[2].baseline()?,
        ])
    }

    pub fn baseline(&self) -> CalibrationBaseline {
        CalibrationBaseline {
            yaw: self.axis(Axis::Yaw).baseline(),
            roll: self.axis(Axis::Roll).baseline(),
            pitch: self.axis(Axis::Pitch).baseline(),
        }
    }

    pub fn status(&self) -> CalibrationStatus {
        CalibrationStatus {
            axes: std::array::from_fn(|i| AxisStatus {
                calibrated: self.axes[i].is_calibrated(),
                samples: self.axes[i].samples(),
            }),
        }
    }

    pub fn reset(&mut self) {
        for cal in &mut self.axes {
            cal.reset();
        }
    }
}
