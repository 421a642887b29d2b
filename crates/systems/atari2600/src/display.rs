//! Video standard and display geometry detection
//!
//! The 2600 has no fixed frame length: the kernel decides when to raise
//! VSYNC, so the number of scan lines per frame is whatever the game makes
//! it. The detector watches the interval between VSYNC pulses and snaps it to
//! one of the geometries a display could actually lock onto.

use emu_core::logging::{log, LogCategory, LogLevel};
use serde::{Deserialize, Serialize};

/// Allowed distance between a measured interval and a known geometry
pub const LINE_TOLERANCE: u16 = 3;

/// NTSC color subcarrier crystal
pub const MASTER_CLOCK_NTSC: u32 = 3_579_575;
/// PAL crystal
pub const MASTER_CLOCK_PAL: u32 = 3_546_894;

/// Scan lines per frame a display can lock onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayGeometry {
    Lines262,
    Lines312,
    Lines328,
    Lines342,
}

impl DisplayGeometry {
    pub const ALL: [DisplayGeometry; 4] = [
        DisplayGeometry::Lines262,
        DisplayGeometry::Lines312,
        DisplayGeometry::Lines328,
        DisplayGeometry::Lines342,
    ];

    pub fn lines(self) -> u16 {
        match self {
            DisplayGeometry::Lines262 => 262,
            DisplayGeometry::Lines312 => 312,
            DisplayGeometry::Lines328 => 328,
            DisplayGeometry::Lines342 => 342,
        }
    }

    /// Exact match only
    pub fn from_lines(lines: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.lines() == lines)
    }

    /// Nearest geometry within [`LINE_TOLERANCE`] of `interval`
    pub fn nearest(interval: u16) -> Option<Self> {
        Self::ALL
            .into_iter()
            .map(|g| (g, g.lines().abs_diff(interval)))
            .filter(|&(_, distance)| distance <= LINE_TOLERANCE)
            .min_by_key(|&(_, distance)| distance)
            .map(|(g, _)| g)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoStandard {
    #[default]
    Ntsc,
    Pal,
}

impl VideoStandard {
    pub fn default_geometry(self) -> DisplayGeometry {
        match self {
            VideoStandard::Ntsc => DisplayGeometry::Lines262,
            VideoStandard::Pal => DisplayGeometry::Lines312,
        }
    }

    pub fn master_clock(self) -> u32 {
        match self {
            VideoStandard::Ntsc => MASTER_CLOCK_NTSC,
            VideoStandard::Pal => MASTER_CLOCK_PAL,
        }
    }

    /// The 6507 runs at a third of the TIA clock
    pub fn cpu_clock(self) -> u32 {
        self.master_clock() / 3
    }
}

/// Tracks the committed display geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayTimingDetector {
    current: DisplayGeometry,
    commits: u32,
}

impl DisplayTimingDetector {
    pub fn new(initial: DisplayGeometry) -> Self {
        Self {
            current: initial,
            commits: 0,
        }
    }

    /// Feed the number of lines between two VSYNC pulses.
    ///
    /// Returns the new geometry when this pulse changed it.
    pub fn observe(&mut self, interval: u16) -> Option<DisplayGeometry> {
        let candidate = DisplayGeometry::nearest(interval)?;
        if candidate == self.current {
            return None;
        }

        let previous = self.current;
        self.current = candidate;
        self.commits += 1;
        log(LogCategory::Video, LogLevel::Info, || {
            format!(
                "Video: VSYNC interval {} lines, geometry {} -> {}",
                interval,
                previous.lines(),
                candidate.lines()
            )
        });
        Some(candidate)
    }

    pub fn geometry(&self) -> DisplayGeometry {
        self.current
    }

    /// Number of geometry changes since construction
    pub fn commits(&self) -> u32 {
        self.commits
    }
}
