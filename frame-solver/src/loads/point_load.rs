//! Point loads on members

use serde::{Deserialize, Serialize};

/// Direction of a member load
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LoadDirection {
    /// Force in member's local x direction (axial)
    Fx,
    /// Force in member's local y direction
    Fy,
    /// Force in member's local z direction
    Fz,
    /// Moment about member's local x axis (torsion)
    Mx,
    /// Moment about member's local y axis
    My,
    /// Moment about member's local z axis
    Mz,
    /// Force in global X direction
    FX,
    /// Force in global Y direction
    FY,
    /// Force in global Z direction
    FZ,
    /// Moment about global X axis
    MX,
    /// Moment about global Y axis
    MY,
    /// Moment about global Z axis
    MZ,
}

impl LoadDirection {
    /// Check if this is a local coordinate direction
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Fx | Self::Fy | Self::Fz | Self::Mx | Self::My | Self::Mz
        )
    }

    /// Check if this direction is a moment rather than a force
    pub fn is_moment(&self) -> bool {
        matches!(
            self,
            Self::Mx | Self::My | Self::Mz | Self::MX | Self::MY | Self::MZ
        )
    }

    /// Axis index 0/1/2 (x/y/z) in whichever system the direction refers to
    pub fn axis(&self) -> usize {
        match self {
            Self::Fx | Self::Mx | Self::FX | Self::MX => 0,
            Self::Fy | Self::My | Self::FY | Self::MY => 1,
            Self::Fz | Self::Mz | Self::FZ | Self::MZ => 2,
        }
    }

    /// Parse "Fy", "FY", "MZ" ... (case sensitive, local lowercase axis)
    pub fn parse(label: &str) -> Option<Self> {
        Some(match label {
            "Fx" => Self::Fx,
            "Fy" => Self::Fy,
            "Fz" => Self::Fz,
            "Mx" => Self::Mx,
            "My" => Self::My,
            "Mz" => Self::Mz,
            "FX" => Self::FX,
            "FY" => Self::FY,
            "FZ" => Self::FZ,
            "MX" => Self::MX,
            "MY" => Self::MY,
            "MZ" => Self::MZ,
            _ => return None,
        })
    }
}

/// A concentrated force or moment on a member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointLoad {
    /// Load magnitude
    pub magnitude: f64,
    /// Distance from i-node
    pub position: f64,
    /// Load direction
    pub direction: LoadDirection,
    /// Load case
    pub case: String,
}

impl PointLoad {
    /// Create a new point load
    pub fn new(magnitude: f64, position: f64, direction: LoadDirection, case: &str) -> Self {
        Self {
            magnitude,
            position,
            direction,
            case: case.to_string(),
        }
    }

    /// Create a downward (negative Y) point load in global coordinates
    pub fn downward(magnitude: f64, position: f64, case: &str) -> Self {
        Self::new(-magnitude.abs(), position, LoadDirection::FY, case)
    }

    /// Create an axial load (in local x direction)
    pub fn axial(magnitude: f64, position: f64, case: &str) -> Self {
        Self::new(magnitude, position, LoadDirection::Fx, case)
    }
}
