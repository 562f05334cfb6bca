//! Section properties for frame members
//!
//! Depth is measured along the member's local y axis and width along local z,
//! so `iz` governs bending in the local x-y plane (the `Mz` / `dy` diagrams).

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{FrameError, FrameResult};

/// Cross-section properties for frame members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Cross-sectional area
    pub a: f64,
    /// Moment of inertia about local y-axis
    pub iy: f64,
    /// Moment of inertia about local z-axis
    pub iz: f64,
    /// Torsional constant
    pub j: f64,
    /// Depth along local y (optional)
    #[serde(default)]
    pub depth: Option<f64>,
    /// Width along local z (optional)
    #[serde(default)]
    pub width: Option<f64>,
}

impl Section {
    /// Create a new section with basic properties
    pub fn new(a: f64, iy: f64, iz: f64, j: f64) -> Self {
        Self {
            a,
            iy,
            iz,
            j,
            depth: None,
            width: None,
        }
    }

    /// Create a solid rectangular section
    pub fn rectangular(width: f64, depth: f64) -> Self {
        let a = width * depth;
        let iz = width * depth.powi(3) / 12.0;
        let iy = depth * width.powi(3) / 12.0;

        // Torsional constant for a rectangle (approximate)
        let (long, short) = if width > depth { (width, depth) } else { (depth, width) };
        let j = long * short.powi(3) / 3.0 * (1.0 - 0.63 * short / long);

        Self {
            a,
            iy,
            iz,
            j,
            depth: Some(depth),
            width: Some(width),
        }
    }

    /// Create a solid circular section
    pub fn circular(diameter: f64) -> Self {
        let r = diameter / 2.0;
        let i = PI * r.powi(4) / 4.0;

        Self {
            a: PI * r.powi(2),
            iy: i,
            iz: i,
            j: 2.0 * i,
            depth: Some(diameter),
            width: Some(diameter),
        }
    }

    /// Create a hollow circular (pipe) section
    pub fn pipe(outer_diameter: f64, wall_thickness: f64) -> Self {
        let r_o = outer_diameter / 2.0;
        let r_i = r_o - wall_thickness;
        let i = PI * (r_o.powi(4) - r_i.powi(4)) / 4.0;

        Self {
            a: PI * (r_o.powi(2) - r_i.powi(2)),
            iy: i,
            iz: i,
            j: 2.0 * i,
            depth: Some(outer_diameter),
            width: Some(outer_diameter),
        }
    }

    /// Create a wide flange (I-beam) section with its web along local y
    ///
    /// # Arguments
    /// * `depth` - Total depth of section
    /// * `flange_width` - Width of flange
    /// * `flange_thickness` - Thickness of flange
    /// * `web_thickness` - Thickness of web
    pub fn wide_flange(
        depth: f64,
        flange_width: f64,
        flange_thickness: f64,
        web_thickness: f64,
    ) -> Self {
        let bf = flange_width;
        let tf = flange_thickness;
        let tw = web_thickness;
        let d = depth;
        let hw = d - 2.0 * tf;

        let a = 2.0 * bf * tf + hw * tw;
        // Strong axis bending is about local z
        let iz = (bf * d.powi(3) - (bf - tw) * hw.powi(3)) / 12.0;
        let iy = (2.0 * tf * bf.powi(3) + hw * tw.powi(3)) / 12.0;
        let j = (2.0 * bf * tf.powi(3) + hw * tw.powi(3)) / 3.0;

        Self {
            a,
            iy,
            iz,
            j,
            depth: Some(d),
            width: Some(bf),
        }
    }

    /// Create a box/tube section
    pub fn box_section(width: f64, depth: f64, wall_thickness: f64) -> Self {
        let t = wall_thickness;
        let b = width;
        let d = depth;
        let bi = b - 2.0 * t;
        let di = d - 2.0 * t;

        let a = b * d - bi * di;
        let iz = (b * d.powi(3) - bi * di.powi(3)) / 12.0;
        let iy = (d * b.powi(3) - di * bi.powi(3)) / 12.0;

        // Bredt's formula for a closed thin-walled section
        let am = (b - t) * (d - t);
        let s = 2.0 * (b + d) - 4.0 * t;
        let j = 4.0 * am.powi(2) * t / s;

        Self {
            a,
            iy,
            iz,
            j,
            depth: Some(d),
            width: Some(b),
        }
    }

    /// Get the radius of gyration about y-axis
    pub fn ry(&self) -> f64 {
        (self.iy / self.a).sqrt()
    }

    /// Get the radius of gyration about z-axis
    pub fn rz(&self) -> f64 {
        (self.iz / self.a).sqrt()
    }

    pub(crate) fn validate(&self, name: &str) -> FrameResult<()> {
        for (label, value) in [("A", self.a), ("Iy", self.iy), ("Iz", self.iz), ("J", self.j)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(FrameError::InvalidInput(format!(
                    "section '{name}' must have a positive {label} (got {value})"
                )));
            }
        }
        Ok(())
    }
}
