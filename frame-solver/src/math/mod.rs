//! Mathematical utilities for frame element calculations

pub mod beam;
pub mod sparse;

use nalgebra::{DMatrix, DVector, Matrix3, SMatrix, SVector, Vector3};

use crate::error::{FrameError, FrameResult};

// Re-export sparse utilities
pub use sparse::{reverse_cuthill_mckee, SkylineCholesky, SparseMatrixBuilder};

pub type Mat = DMatrix<f64>;
pub type Vec = DVector<f64>;
pub type Mat3 = Matrix3<f64>;
pub type Vec3 = Vector3<f64>;

/// 12x12 matrix for member stiffness
pub type Mat12 = SMatrix<f64, 12, 12>;
/// 12-element vector for member forces/displacements
pub type Vec12 = SVector<f64, 12>;

const GEOMETRY_TOL: f64 = 1e-10;

/// Direction cosine matrix of a frame member
///
/// Rows are the member's local x, y and z axes expressed in global
/// coordinates. Local x runs from the i-node to the j-node. Horizontal
/// members keep local y on global +Y, vertical members put local y on -X
/// (pointing up) or +X (pointing down) with local z on +Z, and inclined
/// members keep local z horizontal. `rotation` then rolls y and z about x.
pub fn member_rotation_matrix(
    i_node: &[f64; 3],
    j_node: &[f64; 3],
    rotation: f64,
) -> FrameResult<Mat3> {
    let d = Vec3::new(
        j_node[0] - i_node[0],
        j_node[1] - i_node[1],
        j_node[2] - i_node[2],
    );
    let length = d.norm();

    if !length.is_finite() {
        return Err(FrameError::InvalidGeometry(
            "member has non-finite end coordinates".to_string(),
        ));
    }
    if length < GEOMETRY_TOL {
        return Err(FrameError::InvalidGeometry(
            "member has zero length".to_string(),
        ));
    }

    let x = d / length;

    let (y, z) = if x[0].abs() < GEOMETRY_TOL && x[2].abs() < GEOMETRY_TOL {
        // Vertical member
        if x[1] > 0.0 {
            (Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0))
        } else {
            (Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0))
        }
    } else if x[1].abs() < GEOMETRY_TOL {
        // Horizontal member
        let y = Vec3::new(0.0, 1.0, 0.0);
        let z = x.cross(&y).normalize();
        (y, z)
    } else {
        // Inclined member: z lies in the global XZ plane
        let proj = Vec3::new(d[0], 0.0, d[2]);
        let z = if x[1] > 0.0 {
            proj.cross(&x)
        } else {
            x.cross(&proj)
        };
        let z_len = z.norm();
        if z_len < GEOMETRY_TOL {
            return Err(FrameError::InvalidGeometry(
                "member orientation is degenerate".to_string(),
            ));
        }
        let z = z / z_len;
        let y = z.cross(&x).normalize();
        (y, z)
    };

    let (y, z) = if rotation.abs() > GEOMETRY_TOL {
        let (sin_r, cos_r) = rotation.sin_cos();
        (y * cos_r + z * sin_r, -y * sin_r + z * cos_r)
    } else {
        (y, z)
    };

    Ok(Mat3::from_rows(&[x.transpose(), y.transpose(), z.transpose()]))
}

/// Expand a 3x3 direction cosine matrix into the 12x12 member transformation
pub fn expand_rotation(r: &Mat3) -> Mat12 {
    let mut t = Mat12::zeros();
    for block in 0..4 {
        let offset = block * 3;
        t.fixed_view_mut::<3, 3>(offset, offset).copy_from(r);
    }
    t
}

/// Compute the transformation matrix for a 3D frame element
///
/// # Arguments
/// * `i_node` - Start node coordinates [X, Y, Z]
/// * `j_node` - End node coordinates [X, Y, Z]
/// * `rotation` - Member rotation about its longitudinal axis (radians)
///
/// # Returns
/// 12x12 matrix `T` with `d_local = T * d_global`
pub fn member_transformation_matrix(
    i_node: &[f64; 3],
    j_node: &[f64; 3],
    rotation: f64,
) -> FrameResult<Mat12> {
    Ok(expand_rotation(&member_rotation_matrix(i_node, j_node, rotation)?))
}

/// Compute the local stiffness matrix for a 3D frame element
///
/// # Arguments
/// * `e` - Modulus of elasticity
/// * `g` - Shear modulus
/// * `a` - Cross-sectional area
/// * `iy` - Moment of inertia about local y-axis
/// * `iz` - Moment of inertia about local z-axis
/// * `j` - Torsional constant
/// * `length` - Member length
pub fn member_local_stiffness(
    e: f64,
    g: f64,
    a: f64,
    iy: f64,
    iz: f64,
    j: f64,
    length: f64,
) -> Mat12 {
    let l = length;
    let l2 = l * l;
    let l3 = l2 * l;

    let ea_l = e * a / l;
    let gj_l = g * j / l;

    let eiy_l3 = e * iy / l3;
    let eiy_l2 = e * iy / l2;
    let eiy_l = e * iy / l;

    let eiz_l3 = e * iz / l3;
    let eiz_l2 = e * iz / l2;
    let eiz_l = e * iz / l;

    #[rustfmt::skip]
    let data = [
        // Row 0: axial at i
        ea_l,      0.0,          0.0,           0.0,    0.0,           0.0,          -ea_l,     0.0,          0.0,           0.0,    0.0,           0.0,
        // Row 1: shear Fy at i
        0.0,       12.0*eiz_l3,  0.0,           0.0,    0.0,           6.0*eiz_l2,   0.0,       -12.0*eiz_l3, 0.0,           0.0,    0.0,           6.0*eiz_l2,
        // Row 2: shear Fz at i
        0.0,       0.0,          12.0*eiy_l3,   0.0,    -6.0*eiy_l2,   0.0,          0.0,       0.0,          -12.0*eiy_l3,  0.0,    -6.0*eiy_l2,   0.0,
        // Row 3: torsion at i
        0.0,       0.0,          0.0,           gj_l,   0.0,           0.0,          0.0,       0.0,          0.0,           -gj_l,  0.0,           0.0,
        // Row 4: moment My at i
        0.0,       0.0,          -6.0*eiy_l2,   0.0,    4.0*eiy_l,     0.0,          0.0,       0.0,          6.0*eiy_l2,    0.0,    2.0*eiy_l,     0.0,
        // Row 5: moment Mz at i
        0.0,       6.0*eiz_l2,   0.0,           0.0,    0.0,           4.0*eiz_l,    0.0,       -6.0*eiz_l2,  0.0,           0.0,    0.0,           2.0*eiz_l,
        // Row 6: axial at j
        -ea_l,     0.0,          0.0,           0.0,    0.0,           0.0,          ea_l,      0.0,          0.0,           0.0,    0.0,           0.0,
        // Row 7: shear Fy at j
        0.0,       -12.0*eiz_l3, 0.0,           0.0,    0.0,           -6.0*eiz_l2,  0.0,       12.0*eiz_l3,  0.0,           0.0,    0.0,           -6.0*eiz_l2,
        // Row 8: shear Fz at j
        0.0,       0.0,          -12.0*eiy_l3,  0.0,    6.0*eiy_l2,    0.0,          0.0,       0.0,          12.0*eiy_l3,   0.0,    6.0*eiy_l2,    0.0,
        // Row 9: torsion at j
        0.0,       0.0,          0.0,           -gj_l,  0.0,           0.0,          0.0,       0.0,          0.0,           gj_l,   0.0,           0.0,
        // Row 10: moment My at j
        0.0,       0.0,          -6.0*eiy_l2,   0.0,    2.0*eiy_l,     0.0,          0.0,       0.0,          6.0*eiy_l2,    0.0,    4.0*eiy_l,     0.0,
        // Row 11: moment Mz at j
        0.0,       6.0*eiz_l2,   0.0,           0.0,    0.0,           2.0*eiz_l,    0.0,       -6.0*eiz_l2,  0.0,           0.0,    0.0,           4.0*eiz_l,
    ];

    Mat12::from_row_slice(&data)
}

/// Released/unreleased partition of a member's 12 DOFs, with `inv(k22)`
struct Condensation {
    kept: std::vec::Vec<usize>,
    released: std::vec::Vec<usize>,
    k22_inv: Mat,
}

impl Condensation {
    fn new(k: &Mat12, releases: &[bool; 12]) -> FrameResult<Option<Self>> {
        let (released, kept): (std::vec::Vec<usize>, std::vec::Vec<usize>) =
            (0..12).partition(|&i| releases[i]);

        if released.is_empty() {
            return Ok(None);
        }

        let n2 = released.len();
        let k22 = Mat::from_fn(n2, n2, |r, c| k[(released[r], released[c])]);
        let k22_inv = k22.try_inverse().ok_or_else(|| {
            FrameError::InvalidInput(
                "member end releases leave the member unstable".to_string(),
            )
        })?;

        Ok(Some(Self {
            kept,
            released,
            k22_inv,
        }))
    }

    fn k12(&self, k: &Mat12) -> Mat {
        Mat::from_fn(self.kept.len(), self.released.len(), |r, c| {
            k[(self.kept[r], self.released[c])]
        })
    }

    fn gather(&self, v: &Vec12, dofs: &[usize]) -> Vec {
        Vec::from_iterator(dofs.len(), dofs.iter().map(|&i| v[i]))
    }
}

/// Apply static condensation for released DOFs
///
/// Returns `k11 - k12 * inv(k22) * k21` expanded back to 12x12 with zero
/// rows and columns at the released DOFs.
pub fn apply_releases(k: &Mat12, releases: &[bool; 12]) -> FrameResult<Mat12> {
    let Some(c) = Condensation::new(k, releases)? else {
        return Ok(*k);
    };

    let n1 = c.kept.len();
    let k11 = Mat::from_fn(n1, n1, |r, col| k[(c.kept[r], c.kept[col])]);
    let k12 = c.k12(k);
    let k_condensed = &k11 - &k12 * &c.k22_inv * k12.transpose();

    let mut k_result = Mat12::zeros();
    for (i, &ui) in c.kept.iter().enumerate() {
        for (j, &uj) in c.kept.iter().enumerate() {
            k_result[(ui, uj)] = k_condensed[(i, j)];
        }
    }

    Ok(k_result)
}

/// Apply static condensation to a fixed end reaction vector
///
/// `fer_condensed = fer1 - k12 * inv(k22) * fer2`, zero at released DOFs.
pub fn apply_fer_releases(fer: &Vec12, k: &Mat12, releases: &[bool; 12]) -> FrameResult<Vec12> {
    let Some(c) = Condensation::new(k, releases)? else {
        return Ok(*fer);
    };

    let fer1 = c.gather(fer, &c.kept);
    let fer2 = c.gather(fer, &c.released);
    let fer_condensed = fer1 - c.k12(k) * &c.k22_inv * fer2;

    let mut fer_result = Vec12::zeros();
    for (i, &ui) in c.kept.iter().enumerate() {
        fer_result[ui] = fer_condensed[i];
    }

    Ok(fer_result)
}

/// Recover the local displacements at released DOFs
///
/// Nodal displacements do not apply across a release, so the released
/// components are solved from the condition that their end forces vanish:
/// `d2 = inv(k22) * (-fer2 - k21 * d1)`.
pub fn recover_released_displacements(
    d_local: &Vec12,
    fer: &Vec12,
    k: &Mat12,
    releases: &[bool; 12],
) -> FrameResult<Vec12> {
    let Some(c) = Condensation::new(k, releases)? else {
        return Ok(*d_local);
    };

    let d1 = c.gather(d_local, &c.kept);
    let fer2 = c.gather(fer, &c.released);
    let k21 = c.k12(k).transpose();
    let d2 = &c.k22_inv * (-fer2 - k21 * d1);

    let mut d_result = *d_local;
    for (i, &ri) in c.released.iter().enumerate() {
        d_result[ri] = d2[i];
    }

    Ok(d_result)
}
