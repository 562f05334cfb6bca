//! Member loads as singularity (Macaulay) functions
//!
//! Every factored member load is reduced to a set of [`LoadTerm`]s acting
//! along the member's local axes. Summing their integrals from the i-end
//! gives closed-form internal force, slope and deflection functions, and the
//! same integrals taken over a fixed-fixed member give the fixed end
//! reactions used for assembly.

use serde::{Deserialize, Serialize};

use super::{Mat3, Vec12, Vec3};
use crate::loads::{DistributedLoad, LoadDirection, PointLoad};

/// Component magnitudes smaller than this are dropped when resolving loads
const COMPONENT_TOL: f64 = 1e-12;

/// Which one-sided limit to take where a term starts exactly at `x`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Exclude terms starting at `x`
    Left,
    /// Include terms starting at `x`
    Right,
}

/// A factored load on a member, in local axes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LoadTerm {
    /// Concentrated action at `x` on local DOF `dof`
    /// (0..=2 forces along x/y/z, 3..=5 moments about x/y/z)
    Concentrated { dof: usize, value: f64, x: f64 },
    /// Force intensity along local `axis` starting at `x` with value `w0`,
    /// changing by `slope` per unit length up to the member end
    Ramp {
        axis: usize,
        w0: f64,
        slope: f64,
        x: f64,
    },
}

impl LoadTerm {
    /// Start position of the term
    pub fn position(&self) -> f64 {
        match *self {
            Self::Concentrated { x, .. } | Self::Ramp { x, .. } => x,
        }
    }

    /// Local DOF slot (0..6) the term acts on
    pub fn dof(&self) -> usize {
        match *self {
            Self::Concentrated { dof, .. } => dof,
            Self::Ramp { axis, .. } => axis,
        }
    }

    /// Successive integrals of the term from its start to `x`
    ///
    /// `[0]` is the accumulated action, `[1]`..`[3]` its first to third
    /// integrals. All are zero before the start point.
    fn integrals(&self, x: f64, side: Side) -> [f64; 4] {
        let a = self.position();
        let u = x - a;
        let active = match side {
            Side::Left => u > 0.0,
            Side::Right => u >= 0.0,
        };
        if !active {
            return [0.0; 4];
        }

        match *self {
            Self::Concentrated { value, .. } => [
                value,
                value * u,
                value * u * u / 2.0,
                value * u.powi(3) / 6.0,
            ],
            Self::Ramp { w0, slope, .. } => [
                w0 * u + slope * u * u / 2.0,
                w0 * u * u / 2.0 + slope * u.powi(3) / 6.0,
                w0 * u.powi(3) / 6.0 + slope * u.powi(4) / 24.0,
                w0 * u.powi(4) / 24.0 + slope * u.powi(5) / 120.0,
            ],
        }
    }

    /// Distributed intensity contributed at `x` (zero for concentrated terms)
    fn intensity(&self, x: f64) -> f64 {
        match *self {
            Self::Ramp { w0, slope, x: a, .. } if x >= a => w0 + slope * (x - a),
            _ => 0.0,
        }
    }

    /// Resolve a member point load into local terms
    ///
    /// `r` is the member's direction cosine matrix (rows = local axes).
    pub fn from_point_load(load: &PointLoad, factor: f64, r: &Mat3) -> Vec<Self> {
        let offset = if load.direction.is_moment() { 3 } else { 0 };
        resolve(load.direction, load.magnitude * factor, r)
            .into_iter()
            .map(|(axis, value)| Self::Concentrated {
                dof: offset + axis,
                value,
                x: load.position,
            })
            .collect()
    }

    /// Resolve a member distributed load into local terms
    ///
    /// A trapezoid on `[x1, x2]` is a ramp starting at `x1` minus the same
    /// ramp continued from `x2`.
    pub fn from_distributed_load(
        load: &DistributedLoad,
        factor: f64,
        r: &Mat3,
        length: f64,
    ) -> Vec<Self> {
        let x1 = load.x1;
        let x2 = load.end(length);
        let span = x2 - x1;
        if span <= 0.0 {
            return Vec::new();
        }

        let unit = resolve(load.direction, 1.0, r);
        let mut terms = Vec::with_capacity(unit.len() * 2);
        for (axis, scale) in unit {
            let w1 = load.w1 * factor * scale;
            let w2 = load.w2 * factor * scale;
            let slope = (w2 - w1) / span;
            terms.push(Self::Ramp {
                axis,
                w0: w1,
                slope,
                x: x1,
            });
            terms.push(Self::Ramp {
                axis,
                w0: -w2,
                slope: -slope,
                x: x2,
            });
        }
        terms
    }
}

/// Split a load direction and magnitude into local axis components
fn resolve(direction: LoadDirection, magnitude: f64, r: &Mat3) -> Vec<(usize, f64)> {
    if direction.is_local() {
        return vec![(direction.axis(), magnitude)];
    }

    let mut global = Vec3::zeros();
    global[direction.axis()] = magnitude;
    let local = r * global;

    (0..3)
        .filter(|&axis| local[axis].abs() > COMPONENT_TOL * magnitude.abs())
        .map(|axis| (axis, local[axis]))
        .collect()
}

/// Integrals of all terms, grouped by local DOF slot
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadIntegrals {
    /// `sums[dof][k]` is the k-th integral of the terms acting on `dof`
    pub sums: [[f64; 4]; 6],
}

impl LoadIntegrals {
    /// Accumulate every term's integrals at `x`
    pub fn at(terms: &[LoadTerm], x: f64, side: Side) -> Self {
        let mut sums = [[0.0; 4]; 6];
        for term in terms {
            let values = term.integrals(x, side);
            let slot = &mut sums[term.dof()];
            for k in 0..4 {
                slot[k] += values[k];
            }
        }
        Self { sums }
    }

    #[inline]
    pub fn get(&self, dof: usize, order: usize) -> f64 {
        self.sums[dof][order]
    }
}

/// Total distributed intensity along a local axis at `x`
pub fn intensity(terms: &[LoadTerm], axis: usize, x: f64) -> f64 {
    terms
        .iter()
        .filter(|t| matches!(t, LoadTerm::Ramp { axis: a, .. } if *a == axis))
        .map(|t| t.intensity(x))
        .sum()
}

/// Fixed end reactions of a member carrying the given local load terms
///
/// The result holds the forces the two fixed supports exert on the member,
/// in local coordinates, ordered like the member DOFs. Each bending plane is
/// solved from zero end slope and deflection compatibility; axial force and
/// torque are split by zero relative end displacement.
pub fn fixed_end_reactions(terms: &[LoadTerm], length: f64) -> Vec12 {
    let l = length;
    let s = LoadIntegrals::at(terms, l, Side::Right);
    let mut fer = Vec12::zeros();

    // Axial
    fer[0] = -s.get(0, 1) / l;
    fer[6] = -(fer[0] + s.get(0, 0));

    // Torsion
    fer[3] = -s.get(3, 1) / l;
    fer[9] = -(fer[3] + s.get(3, 0));

    // Bending in the local x-y plane: Mz(x) = -Mz_i + Fy_i x + loads
    let a1 = s.get(1, 2) - s.get(5, 1);
    let a2 = s.get(1, 3) - s.get(5, 2);
    let fy_i = (12.0 * a2 - 6.0 * a1 * l) / l.powi(3);
    let mz_i = fy_i * l / 2.0 + a1 / l;
    fer[1] = fy_i;
    fer[5] = mz_i;
    fer[7] = -(fy_i + s.get(1, 0));
    fer[11] = -mz_i + fy_i * l + s.get(1, 1) - s.get(5, 0);

    // Bending in the local x-z plane: My(x) = My_i + Fz_i x + loads
    let b1 = s.get(2, 2) + s.get(4, 1);
    let b2 = s.get(2, 3) + s.get(4, 2);
    let fz_i = (12.0 * b2 - 6.0 * b1 * l) / l.powi(3);
    let my_i = -(fz_i * l / 2.0 + b1 / l);
    fer[2] = fz_i;
    fer[4] = my_i;
    fer[8] = -(fz_i + s.get(2, 0));
    fer[10] = -(my_i + fz_i * l + s.get(2, 1) + s.get(4, 0));

    fer
}
