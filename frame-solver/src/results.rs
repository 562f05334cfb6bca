//! Result types for frame analysis
//!
//! # Sign convention
//!
//! Member diagrams are expressed in the member's local axes:
//!
//! - axial force and torque are positive in tension / positive twist about +x
//! - shear is the running sum of the transverse loads from the i-end, so
//!   `d(shear)/dx` equals the applied load intensity
//! - `d(moment)/dx` equals the matching shear; a load toward -y (or -z) on
//!   a simply supported span gives a positive midspan moment
//! - deflections are absolute local displacements, `EI * d2(defl)/dx2 = moment`
//!
//! At the location of a concentrated load the left-hand limit is reported.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{FrameError, FrameResult};
use crate::math::beam::{LoadIntegrals, LoadTerm, Side};
use crate::math::Vec12;

/// Interior samples per segment when searching for extremes
const EXTREME_SAMPLES: usize = 64;
const GOLDEN_ITERATIONS: usize = 60;

/// Displacement results at a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeDisplacement {
    /// Displacement in X direction
    pub dx: f64,
    /// Displacement in Y direction
    pub dy: f64,
    /// Displacement in Z direction
    pub dz: f64,
    /// Rotation about X axis
    pub rx: f64,
    /// Rotation about Y axis
    pub ry: f64,
    /// Rotation about Z axis
    pub rz: f64,
}

impl NodeDisplacement {
    /// Create from array [DX, DY, DZ, RX, RY, RZ]
    pub fn from_array(arr: [f64; 6]) -> Self {
        Self {
            dx: arr[0],
            dy: arr[1],
            dz: arr[2],
            rx: arr[3],
            ry: arr[4],
            rz: arr[5],
        }
    }

    pub fn as_array(&self) -> [f64; 6] {
        [self.dx, self.dy, self.dz, self.rx, self.ry, self.rz]
    }
}

/// Reaction forces at a supported node
///
/// Components for unrestrained DOFs are zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reactions {
    /// Reaction force in X direction
    pub fx: f64,
    /// Reaction force in Y direction
    pub fy: f64,
    /// Reaction force in Z direction
    pub fz: f64,
    /// Reaction moment about X axis
    pub mx: f64,
    /// Reaction moment about Y axis
    pub my: f64,
    /// Reaction moment about Z axis
    pub mz: f64,
}

impl Reactions {
    /// Create from array [FX, FY, FZ, MX, MY, MZ]
    pub fn from_array(arr: [f64; 6]) -> Self {
        Self {
            fx: arr[0],
            fy: arr[1],
            fz: arr[2],
            mx: arr[3],
            my: arr[4],
            mz: arr[5],
        }
    }

    pub fn as_array(&self) -> [f64; 6] {
        [self.fx, self.fy, self.fz, self.mx, self.my, self.mz]
    }
}

/// Internal forces at one end of a member, in diagram sign convention
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemberForces {
    /// Axial force (positive = tension)
    pub axial: f64,
    /// Shear force in local y direction
    pub shear_y: f64,
    /// Shear force in local z direction
    pub shear_z: f64,
    /// Torsion
    pub torsion: f64,
    /// Bending moment about local y axis
    pub moment_y: f64,
    /// Bending moment about local z axis
    pub moment_z: f64,
}

impl MemberForces {
    /// Create from the local end force vector at the i-node
    pub fn from_i_node_forces(forces: &Vec12) -> Self {
        Self {
            axial: -forces[0],
            shear_y: forces[1],
            shear_z: forces[2],
            torsion: -forces[3],
            moment_y: forces[4],
            moment_z: -forces[5],
        }
    }

    /// Create from the local end force vector at the j-node
    pub fn from_j_node_forces(forces: &Vec12) -> Self {
        Self {
            axial: forces[6],
            shear_y: -forces[7],
            shear_z: -forces[8],
            torsion: forces[9],
            moment_y: -forces[10],
            moment_z: forces[11],
        }
    }
}

/// A continuous member result function of the distance from the i-node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Diagram {
    /// Axial force
    Axial,
    /// Shear along local y
    ShearY,
    /// Shear along local z
    ShearZ,
    /// Torque about local x
    Torque,
    /// Bending moment in the local x-z plane
    MomentY,
    /// Bending moment in the local x-y plane
    MomentZ,
    /// Axial displacement
    DeflectionX,
    /// Displacement along local y
    DeflectionY,
    /// Displacement along local z
    DeflectionZ,
}

impl Diagram {
    pub const ALL: [Diagram; 9] = [
        Self::Axial,
        Self::ShearY,
        Self::ShearZ,
        Self::Torque,
        Self::MomentY,
        Self::MomentZ,
        Self::DeflectionX,
        Self::DeflectionY,
        Self::DeflectionZ,
    ];

    /// Short label ("Fx", "Fy", "Mz", "dy", ...)
    pub fn label(&self) -> &'static str {
        match self {
            Self::Axial => "Fx",
            Self::ShearY => "Fy",
            Self::ShearZ => "Fz",
            Self::Torque => "Mx",
            Self::MomentY => "My",
            Self::MomentZ => "Mz",
            Self::DeflectionX => "dx",
            Self::DeflectionY => "dy",
            Self::DeflectionZ => "dz",
        }
    }

    /// Parse a short label
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.label() == label)
    }
}

/// A value of a diagram and where along the member it occurs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extreme {
    pub x: f64,
    pub value: f64,
}

/// Results for one member under one combination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberResults {
    /// Member length
    pub length: f64,
    /// Local end forces `k d + FER` (forces the nodes exert on the member)
    pub forces: Vec12,
    /// Local end displacements, released DOFs included
    pub displacements: Vec12,
    /// Factored member loads in local axes
    pub terms: Vec<LoadTerm>,
    /// E * A
    pub axial_rigidity: f64,
    /// E * Iy
    pub bending_rigidity_y: f64,
    /// E * Iz
    pub bending_rigidity_z: f64,
}

impl MemberResults {
    /// Internal forces at the i-end
    pub fn forces_i(&self) -> MemberForces {
        MemberForces::from_i_node_forces(&self.forces)
    }

    /// Internal forces at the j-end
    pub fn forces_j(&self) -> MemberForces {
        MemberForces::from_j_node_forces(&self.forces)
    }

    /// Value of `diagram` at distance `x` from the i-node
    pub fn value(&self, diagram: Diagram, x: f64) -> FrameResult<f64> {
        let x = self.check_position(x)?;
        Ok(self.eval(diagram, x, Side::Left))
    }

    /// `n` evenly spaced samples `(x, value)` including both ends
    pub fn sample(&self, diagram: Diagram, n: usize) -> FrameResult<Vec<(f64, f64)>> {
        if n < 2 {
            return Err(FrameError::InvalidInput(format!(
                "at least 2 sample points are required, got {}",
                n
            )));
        }
        let step = self.length / (n - 1) as f64;
        Ok((0..n)
            .map(|i| {
                let x = if i == n - 1 { self.length } else { i as f64 * step };
                (x, self.eval(diagram, x, Side::Left))
            })
            .collect())
    }

    /// Largest value of `diagram` along the member
    pub fn max(&self, diagram: Diagram) -> Extreme {
        self.extremes(diagram).1
    }

    /// Smallest value of `diagram` along the member
    pub fn min(&self, diagram: Diagram) -> Extreme {
        self.extremes(diagram).0
    }

    /// `(min, max)` of `diagram` along the member
    ///
    /// Every load position is checked from both sides, each segment between
    /// them is sampled and the best interior samples are refined by golden
    /// section search.
    pub fn extremes(&self, diagram: Diagram) -> (Extreme, Extreme) {
        let l = self.length;
        let mut breaks: Vec<f64> = vec![0.0, l];
        breaks.extend(
            self.terms
                .iter()
                .map(LoadTerm::position)
                .filter(|&x| x > 0.0 && x < l),
        );
        breaks.sort_by(f64::total_cmp);
        breaks.dedup_by(|a, b| (*a - *b).abs() <= 1e-12 * l);

        let first = Extreme {
            x: 0.0,
            value: self.eval(diagram, 0.0, Side::Left),
        };
        let mut lo = first;
        let mut hi = first;
        let mut consider = |x: f64, value: f64| {
            if value < lo.value {
                lo = Extreme { x, value };
            }
            if value > hi.value {
                hi = Extreme { x, value };
            }
        };

        for &x in &breaks {
            consider(x, self.eval(diagram, x, Side::Left));
            consider(x, self.eval(diagram, x, Side::Right));
        }

        for pair in breaks.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let h = (b - a) / (EXTREME_SAMPLES + 1) as f64;
            let samples: Vec<(f64, f64)> = (1..=EXTREME_SAMPLES)
                .map(|i| {
                    let x = a + h * i as f64;
                    (x, self.eval(diagram, x, Side::Left))
                })
                .collect();

            for sign in [1.0, -1.0] {
                let best = samples
                    .iter()
                    .copied()
                    .max_by(|p, q| (sign * p.1).total_cmp(&(sign * q.1)));
                if let Some((x, _)) = best {
                    let (lo_x, hi_x) = ((x - h).max(a), (x + h).min(b));
                    let x = self.golden_section(diagram, lo_x, hi_x, sign);
                    consider(x, self.eval(diagram, x, Side::Left));
                }
            }
        }

        (lo, hi)
    }

    /// Maximize `sign * diagram` on `[a, b]`
    fn golden_section(&self, diagram: Diagram, mut a: f64, mut b: f64, sign: f64) -> f64 {
        let ratio = (5.0_f64.sqrt() - 1.0) / 2.0;
        let f = |x: f64| sign * self.eval(diagram, x, Side::Left);

        let mut c = b - ratio * (b - a);
        let mut d = a + ratio * (b - a);
        let (mut fc, mut fd) = (f(c), f(d));
        for _ in 0..GOLDEN_ITERATIONS {
            if fc > fd {
                b = d;
                d = c;
                fd = fc;
                c = b - ratio * (b - a);
                fc = f(c);
            } else {
                a = c;
                c = d;
                fc = fd;
                d = a + ratio * (b - a);
                fd = f(d);
            }
        }
        (a + b) / 2.0
    }

    fn check_position(&self, x: f64) -> FrameResult<f64> {
        let tol = 1e-9 * self.length;
        if !x.is_finite() || x < -tol || x > self.length + tol {
            return Err(FrameError::InvalidInput(format!(
                "position {} is outside the member (length {})",
                x, self.length
            )));
        }
        Ok(x.clamp(0.0, self.length))
    }

    fn eval(&self, diagram: Diagram, x: f64, side: Side) -> f64 {
        let f = &self.forces;
        let d = &self.displacements;
        let s = LoadIntegrals::at(&self.terms, x, side);

        match diagram {
            Diagram::Axial => -(f[0] + s.get(0, 0)),
            Diagram::Torque => -(f[3] + s.get(3, 0)),
            Diagram::ShearY => f[1] + s.get(1, 0),
            Diagram::ShearZ => f[2] + s.get(2, 0),
            Diagram::MomentZ => -f[5] + f[1] * x + s.get(1, 1) - s.get(5, 0),
            Diagram::MomentY => f[4] + f[2] * x + s.get(2, 1) + s.get(4, 0),
            Diagram::DeflectionX => d[0] - (f[0] * x + s.get(0, 1)) / self.axial_rigidity,
            Diagram::DeflectionY => {
                d[1] + d[5] * x
                    + (-f[5] * x * x / 2.0 + f[1] * x.powi(3) / 6.0 + s.get(1, 3) - s.get(5, 2))
                        / self.bending_rigidity_z
            }
            Diagram::DeflectionZ => {
                d[2] - d[4] * x
                    + (f[4] * x * x / 2.0 + f[2] * x.powi(3) / 6.0 + s.get(2, 3) + s.get(4, 2))
                        / self.bending_rigidity_y
            }
        }
    }

    /// Bending moment about local z at `x`
    pub fn moment_z(&self, x: f64) -> FrameResult<f64> {
        self.value(Diagram::MomentZ, x)
    }

    /// Bending moment about local y at `x`
    pub fn moment_y(&self, x: f64) -> FrameResult<f64> {
        self.value(Diagram::MomentY, x)
    }

    /// Shear along local y at `x`
    pub fn shear_y(&self, x: f64) -> FrameResult<f64> {
        self.value(Diagram::ShearY, x)
    }

    /// Shear along local z at `x`
    pub fn shear_z(&self, x: f64) -> FrameResult<f64> {
        self.value(Diagram::ShearZ, x)
    }

    pub fn axial(&self, x: f64) -> FrameResult<f64> {
        self.value(Diagram::Axial, x)
    }

    pub fn torque(&self, x: f64) -> FrameResult<f64> {
        self.value(Diagram::Torque, x)
    }

    /// Local y deflection at `x`
    pub fn deflection_y(&self, x: f64) -> FrameResult<f64> {
        self.value(Diagram::DeflectionY, x)
    }

    /// Local z deflection at `x`
    pub fn deflection_z(&self, x: f64) -> FrameResult<f64> {
        self.value(Diagram::DeflectionZ, x)
    }

    pub fn moment_z_array(&self, n: usize) -> FrameResult<Vec<(f64, f64)>> {
        self.sample(Diagram::MomentZ, n)
    }

    pub fn shear_y_array(&self, n: usize) -> FrameResult<Vec<(f64, f64)>> {
        self.sample(Diagram::ShearY, n)
    }
}

/// Outcome of the global equilibrium check for one combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticsReport {
    pub combo: String,
    /// Applied loads, summed about the global origin
    pub applied_force: [f64; 3],
    pub applied_moment: [f64; 3],
    /// Support reactions, summed about the global origin
    pub reaction_force: [f64; 3],
    pub reaction_moment: [f64; 3],
    pub net_force: [f64; 3],
    pub net_moment: [f64; 3],
    /// Net force and moment vanish within the relative tolerance
    pub balanced: bool,
}

/// All results for one load combination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComboResults {
    pub name: String,
    pub displacements: BTreeMap<String, NodeDisplacement>,
    /// Only supported nodes appear here
    pub reactions: BTreeMap<String, Reactions>,
    pub members: BTreeMap<String, MemberResults>,
    /// Present when the statics check was requested
    pub statics: Option<StaticsReport>,
}

impl ComboResults {
    pub fn node_displacement(&self, node: &str) -> FrameResult<NodeDisplacement> {
        self.displacements
            .get(node)
            .copied()
            .ok_or_else(|| FrameError::NodeNotFound(node.to_string()))
    }

    /// Reactions at `node`; zero for a node without support
    pub fn node_reaction(&self, node: &str) -> FrameResult<Reactions> {
        if !self.displacements.contains_key(node) {
            return Err(FrameError::NodeNotFound(node.to_string()));
        }
        Ok(self
            .reactions
            .get(node)
            .copied()
            .unwrap_or_else(|| Reactions::from_array([0.0; 6])))
    }

    pub fn member(&self, member: &str) -> FrameResult<&MemberResults> {
        self.members
            .get(member)
            .ok_or_else(|| FrameError::MemberNotFound(member.to_string()))
    }
}

/// The immutable outcome of one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    /// Model revision the results were computed from
    revision: u64,
    total_dofs: usize,
    free_dofs: usize,
    combos: BTreeMap<String, ComboResults>,
}

impl Analysis {
    pub(crate) fn new(
        revision: u64,
        total_dofs: usize,
        free_dofs: usize,
        combos: BTreeMap<String, ComboResults>,
    ) -> Self {
        Self {
            revision,
            total_dofs,
            free_dofs,
            combos,
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn total_dofs(&self) -> usize {
        self.total_dofs
    }

    pub fn free_dofs(&self) -> usize {
        self.free_dofs
    }

    /// Analysed combination names, sorted
    pub fn combo_names(&self) -> Vec<&str> {
        self.combos.keys().map(String::as_str).collect()
    }

    pub fn combos(&self) -> impl Iterator<Item = &ComboResults> {
        self.combos.values()
    }

    pub fn combo(&self, name: &str) -> FrameResult<&ComboResults> {
        self.combos
            .get(name)
            .ok_or_else(|| FrameError::LoadCombinationNotFound(name.to_string()))
    }

    pub fn node_displacement(&self, node: &str, combo: &str) -> FrameResult<NodeDisplacement> {
        self.combo(combo)?.node_displacement(node)
    }

    pub fn node_reaction(&self, node: &str, combo: &str) -> FrameResult<Reactions> {
        self.combo(combo)?.node_reaction(node)
    }

    pub fn member_results(&self, member: &str, combo: &str) -> FrameResult<&MemberResults> {
        self.combo(combo)?.member(member)
    }

    /// Statics reports of every combination that was checked
    pub fn statics_reports(&self) -> Vec<&StaticsReport> {
        self.combos.values().filter_map(|c| c.statics.as_ref()).collect()
    }
}
