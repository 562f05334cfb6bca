//! Support conditions

use serde::{Deserialize, Serialize};

use super::DOF_LABELS;
use crate::error::{FrameError, FrameResult};

/// Support conditions at a node
///
/// Restraints are rigid: a restrained DOF is held at zero displacement, or at
/// its enforced value when one is given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Support {
    /// Restrained in X translation
    pub dx: bool,
    /// Restrained in Y translation
    pub dy: bool,
    /// Restrained in Z translation
    pub dz: bool,
    /// Restrained in X rotation
    pub rx: bool,
    /// Restrained in Y rotation
    pub ry: bool,
    /// Restrained in Z rotation
    pub rz: bool,

    /// Enforced displacements [DX, DY, DZ, RX, RY, RZ]
    #[serde(default)]
    pub enforced: [Option<f64>; 6],
}

impl Support {
    /// Create a new support with no restraints
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fully fixed support (all DOFs restrained)
    pub fn fixed() -> Self {
        Self::with_restraints(true, true, true, true, true, true)
    }

    /// Create a pinned support (translations restrained, rotations free)
    pub fn pinned() -> Self {
        Self::with_restraints(true, true, true, false, false, false)
    }

    /// Create a roller support (Y translation restrained only)
    pub fn roller_y() -> Self {
        Self::with_restraints(false, true, false, false, false, false)
    }

    /// Create a support with specific restraints
    pub fn with_restraints(dx: bool, dy: bool, dz: bool, rx: bool, ry: bool, rz: bool) -> Self {
        Self {
            dx,
            dy,
            dz,
            rx,
            ry,
            rz,
            enforced: [None; 6],
        }
    }

    /// Restrain a DOF (0-5, in [`DOF_LABELS`] order) at a prescribed displacement
    pub fn with_enforced(mut self, dof: usize, value: f64) -> FrameResult<Self> {
        let restraint = match dof {
            0 => &mut self.dx,
            1 => &mut self.dy,
            2 => &mut self.dz,
            3 => &mut self.rx,
            4 => &mut self.ry,
            5 => &mut self.rz,
            _ => {
                return Err(FrameError::InvalidInput(format!(
                    "enforced displacement DOF must be 0-5, got {}",
                    dof
                )))
            }
        };
        *restraint = true;
        self.enforced[dof] = Some(value);
        Ok(self)
    }

    /// Labels of DOFs that carry an enforced value without being restrained
    pub(crate) fn unrestrained_enforced(&self) -> Vec<&'static str> {
        self.restraints()
            .into_iter()
            .zip(self.enforced)
            .zip(DOF_LABELS)
            .filter(|((restrained, enforced), _)| !restrained && enforced.is_some())
            .map(|(_, label)| label)
            .collect()
    }

    /// Restraint flags as [DX, DY, DZ, RX, RY, RZ]
    pub fn restraints(&self) -> [bool; 6] {
        [self.dx, self.dy, self.dz, self.rx, self.ry, self.rz]
    }

    /// Get list of restrained DOF indices (0-5)
    pub fn restrained_dofs(&self) -> Vec<usize> {
        (0..6).filter(|&i| self.restraints()[i]).collect()
    }

    /// Check if any DOF is restrained
    pub fn is_supported(&self) -> bool {
        self.restraints().iter().any(|&r| r)
    }

    /// Count number of restrained DOFs
    pub fn num_restrained(&self) -> usize {
        self.restraints().iter().filter(|&&r| r).count()
    }
}
