//! Boundary condition partitioning and the linear solve

use nalgebra::{Cholesky, DMatrix, Dyn};
use nalgebra_sparse::{CooMatrix, CsrMatrix};

use super::assembly::DofMap;
use crate::error::{FrameError, FrameResult};
use crate::math::{SkylineCholesky, Vec as FVec};
use crate::model::FrameModel;

/// Diagonal entries below this fraction of the largest one count as zero
const ZERO_STIFFNESS_TOL: f64 = 1e-12;

enum Factor {
    Skyline(SkylineCholesky),
    Dense(Cholesky<f64, Dyn>),
    /// Every DOF is restrained
    Empty,
}

/// The global stiffness with its free partition factorized
///
/// Built once per analysis and then only read, so combinations can be
/// solved against it from several threads.
pub(crate) struct LinearSystem {
    k: CsrMatrix<f64>,
    free: Vec<usize>,
    /// Prescribed displacement of every DOF (zero for free DOFs)
    prescribed: FVec,
    factor: Factor,
}

impl LinearSystem {
    /// Partition the DOFs by the model's supports and factorize `K_ff`
    pub fn factorize(
        model: &FrameModel,
        dofs: &DofMap,
        k: CsrMatrix<f64>,
        sparse: bool,
    ) -> FrameResult<Self> {
        let n = dofs.num_dofs();
        let mut restrained = vec![false; n];
        let mut prescribed = FVec::zeros(n);

        for (name, support) in model.supports() {
            let base = dofs.index_of(name)? * 6;
            for (i, fixed) in support.restraints().into_iter().enumerate() {
                if fixed {
                    restrained[base + i] = true;
                    prescribed[base + i] = support.enforced[i].unwrap_or(0.0);
                }
            }
        }

        let free: Vec<usize> = (0..n).filter(|&i| !restrained[i]).collect();
        check_free_stiffness(&k, &free, dofs)?;

        let factor = if free.is_empty() {
            Factor::Empty
        } else if sparse {
            let k_ff = free_partition(&k, &free, n);
            let skyline = SkylineCholesky::factorize(&k_ff).map_err(|row| {
                let (node, dof) = dofs.describe(free[row]);
                FrameError::Unstable { node, dof }
            })?;
            log::debug!(
                "Skyline factorization of {} free DOFs, profile {}",
                skyline.size(),
                skyline.profile()
            );
            Factor::Skyline(skyline)
        } else {
            let k_ff = free_partition(&k, &free, n);
            let mut dense = DMatrix::zeros(free.len(), free.len());
            for (row, col, &value) in k_ff.triplet_iter() {
                dense[(row, col)] = value;
            }
            Factor::Dense(Cholesky::new(dense).ok_or(FrameError::SingularMatrix)?)
        };

        Ok(Self {
            k,
            free,
            prescribed,
            factor,
        })
    }

    pub fn num_free(&self) -> usize {
        self.free.len()
    }

    /// Solve for one global load vector
    ///
    /// Returns the full displacement vector and `K d - F`, which holds the
    /// support reactions at restrained DOFs.
    pub fn solve(&self, loads: &FVec) -> (FVec, FVec) {
        let mut d = self.prescribed.clone();

        if !self.free.is_empty() {
            let k_d = multiply(&self.k, &self.prescribed);
            let rhs = FVec::from_iterator(
                self.free.len(),
                self.free.iter().map(|&i| loads[i] - k_d[i]),
            );
            let d_free = match &self.factor {
                Factor::Skyline(f) => f.solve(&rhs),
                Factor::Dense(f) => f.solve(&rhs),
                Factor::Empty => rhs,
            };
            for (i, &dof) in self.free.iter().enumerate() {
                d[dof] = d_free[i];
            }
        }

        let reactions = multiply(&self.k, &d) - loads;
        (d, reactions)
    }
}

/// A free DOF with no stiffness at all is a mechanism
fn check_free_stiffness(k: &CsrMatrix<f64>, free: &[usize], dofs: &DofMap) -> FrameResult<()> {
    let mut diagonal = vec![0.0; k.nrows()];
    for (row, col, &value) in k.triplet_iter() {
        if row == col {
            diagonal[row] += value;
        }
    }
    let scale = diagonal.iter().fold(0.0_f64, |m, v| m.max(v.abs()));

    for &dof in free {
        if diagonal[dof].abs() <= ZERO_STIFFNESS_TOL * scale {
            let (node, label) = dofs.describe(dof);
            return Err(FrameError::Unstable { node, dof: label });
        }
    }
    Ok(())
}

/// Extract `K_ff` as its own CSR matrix
fn free_partition(k: &CsrMatrix<f64>, free: &[usize], n: usize) -> CsrMatrix<f64> {
    let mut map = vec![None; n];
    for (i, &dof) in free.iter().enumerate() {
        map[dof] = Some(i);
    }

    let mut coo = CooMatrix::new(free.len(), free.len());
    for (row, col, &value) in k.triplet_iter() {
        if let (Some(r), Some(c)) = (map[row], map[col]) {
            coo.push(r, c, value);
        }
    }
    CsrMatrix::from(&coo)
}

fn multiply(k: &CsrMatrix<f64>, v: &FVec) -> FVec {
    let mut out = FVec::zeros(k.nrows());
    for (row, col, &value) in k.triplet_iter() {
        out[row] += value * v[col];
    }
    out
}
