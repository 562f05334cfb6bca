//! Distributed loads on members

use serde::{Deserialize, Serialize};

use super::point_load::LoadDirection;

/// A linearly varying distributed (line) load on a member
///
/// Intensities are per unit of member length, whether the direction is local
/// or global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributedLoad {
    /// Start magnitude (at start position)
    pub w1: f64,
    /// End magnitude (at end position)
    pub w2: f64,
    /// Start position (distance from i-node)
    pub x1: f64,
    /// End position (distance from i-node), `None` for the member end
    #[serde(default)]
    pub x2: Option<f64>,
    /// Load direction
    pub direction: LoadDirection,
    /// Load case
    pub case: String,
}

impl DistributedLoad {
    /// Create a new distributed load between two positions
    pub fn new(w1: f64, w2: f64, x1: f64, x2: f64, direction: LoadDirection, case: &str) -> Self {
        Self {
            w1,
            w2,
            x1,
            x2: Some(x2),
            direction,
            case: case.to_string(),
        }
    }

    /// Create a uniform distributed load over the full member length
    pub fn uniform(w: f64, direction: LoadDirection, case: &str) -> Self {
        Self {
            w1: w,
            w2: w,
            x1: 0.0,
            x2: None,
            direction,
            case: case.to_string(),
        }
    }

    /// Create a uniform downward load (negative global Y)
    pub fn uniform_downward(w: f64, case: &str) -> Self {
        Self::uniform(-w.abs(), LoadDirection::FY, case)
    }

    /// Create a triangular load (zero at start, max at end)
    pub fn triangular(w_max: f64, x1: f64, x2: f64, direction: LoadDirection, case: &str) -> Self {
        Self::new(0.0, w_max, x1, x2, direction, case)
    }

    /// Check if the load is uniform (constant magnitude)
    pub fn is_uniform(&self) -> bool {
        (self.w1 - self.w2).abs() < 1e-10
    }

    /// End position on a member of the given length
    pub fn end(&self, length: f64) -> f64 {
        self.x2.unwrap_or(length)
    }

    /// Total force from this load on a member of the given length
    pub fn total_force(&self, length: f64) -> f64 {
        (self.w1 + self.w2) / 2.0 * (self.end(length) - self.x1)
    }

    /// Distance of the load resultant from the i-node
    pub fn centroid(&self, length: f64) -> f64 {
        let x2 = self.end(length);
        let span = x2 - self.x1;
        let sum = self.w1 + self.w2;
        if sum.abs() < 1e-15 {
            return self.x1 + span / 2.0;
        }
        self.x1 + span * (self.w1 + 2.0 * self.w2) / (3.0 * sum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_load_spans_member() {
        let load = DistributedLoad::uniform(-30.0, LoadDirection::Fy, "D");
        assert!(load.is_uniform());
        assert_eq!(load.end(6.0), 6.0);
        assert!((load.total_force(6.0) + 180.0).abs() < 1e-10);
        assert!((load.centroid(6.0) - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_triangular_centroid() {
        let load = DistributedLoad::triangular(10.0, 0.0, 3.0, LoadDirection::Fy, "L");
        assert!((load.total_force(6.0) - 15.0).abs() < 1e-10);
        assert!((load.centroid(6.0) - 2.0).abs() < 1e-10);
    }
}
