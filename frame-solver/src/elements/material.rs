//! Material properties

use serde::{Deserialize, Serialize};

use crate::error::{FrameError, FrameResult};

/// Elastic material used by frame members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Modulus of elasticity (Young's modulus)
    pub e: f64,
    /// Shear modulus
    pub g: f64,
    /// Poisson's ratio
    pub nu: f64,
    /// Density
    pub rho: f64,
}

impl Material {
    /// Create a new material with given properties
    pub fn new(e: f64, g: f64, nu: f64, rho: f64) -> Self {
        Self { e, g, nu, rho }
    }

    /// Create a new isotropic material from E and nu
    /// G is calculated as E / (2 * (1 + nu))
    pub fn isotropic(e: f64, nu: f64, rho: f64) -> Self {
        let g = e / (2.0 * (1.0 + nu));
        Self::new(e, g, nu, rho)
    }

    /// Structural steel in SI base units (Pa, kg/m³)
    pub fn steel() -> Self {
        Self::new(200e9, 77e9, 0.3, 7850.0)
    }

    /// Reject materials that would give a meaningless stiffness matrix
    pub(crate) fn validate(&self, name: &str) -> FrameResult<()> {
        if !(self.e.is_finite() && self.e > 0.0) {
            return Err(FrameError::InvalidInput(format!(
                "material '{name}' must have a positive elastic modulus (got {})",
                self.e
            )));
        }
        if !(self.g.is_finite() && self.g > 0.0) {
            return Err(FrameError::InvalidInput(format!(
                "material '{name}' must have a positive shear modulus (got {})",
                self.g
            )));
        }
        if !self.nu.is_finite() || !self.rho.is_finite() {
            return Err(FrameError::InvalidInput(format!(
                "material '{name}' has non-finite properties"
            )));
        }
        Ok(())
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::steel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isotropic_material() {
        let mat = Material::isotropic(200e9, 0.3, 7850.0);
        let expected_g = 200e9 / (2.0 * 1.3);
        assert!((mat.g - expected_g).abs() < 1.0);
    }

    #[test]
    fn test_invalid_modulus_rejected() {
        let mat = Material::new(0.0, 77e9, 0.3, 7850.0);
        assert!(matches!(
            mat.validate("Bad"),
            Err(FrameError::InvalidInput(_))
        ));
        assert!(Material::steel().validate("Steel").is_ok());
    }
}
