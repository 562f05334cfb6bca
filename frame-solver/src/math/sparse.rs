//! Sparse matrix utilities for global assembly and the banded direct solve
//!
//! Frame stiffness matrices are mostly empty and banded once the nodes are
//! numbered sensibly, so the global matrix is assembled in COO form,
//! compressed to CSR and factorized in skyline (variable band) storage.

use std::collections::VecDeque;

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{CooMatrix, CsrMatrix};

use super::Mat12;

/// Sparse matrix builder using COO format
/// More efficient for incremental assembly
pub struct SparseMatrixBuilder {
    size: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl SparseMatrixBuilder {
    /// Create a new sparse matrix builder
    pub fn new(size: usize) -> Self {
        // 6 DOFs per node, a handful of members per node
        let estimated_nnz = size * 60;
        Self {
            size,
            entries: Vec::with_capacity(estimated_nnz),
        }
    }

    /// Add a value to the matrix (accumulates if already exists)
    #[inline]
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        if value != 0.0 {
            self.entries.push((row, col, value));
        }
    }

    /// Scatter a 12x12 member matrix using its global DOF indices
    pub fn add_member_matrix(&mut self, dofs: &[usize; 12], k_elem: &Mat12) {
        for (i, &di) in dofs.iter().enumerate() {
            for (j, &dj) in dofs.iter().enumerate() {
                self.add(di, dj, k_elem[(i, j)]);
            }
        }
    }

    /// Convert to CSR format; duplicate entries are summed
    pub fn to_csr(&self) -> CsrMatrix<f64> {
        let mut coo = CooMatrix::new(self.size, self.size);

        for &(row, col, val) in &self.entries {
            coo.push(row, col, val);
        }

        CsrMatrix::from(&coo)
    }

    /// Convert to dense matrix
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut mat = DMatrix::zeros(self.size, self.size);

        for &(row, col, val) in &self.entries {
            mat[(row, col)] += val;
        }

        mat
    }

    /// Number of stored (uncompressed) entries
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }
}

/// Cholesky factorization of a symmetric positive definite matrix in
/// skyline storage
///
/// Each row stores the entries from its first non-zero column up to the
/// diagonal. The factorization is computed once and then only read, so one
/// factor can serve any number of right-hand sides concurrently.
#[derive(Debug, Clone)]
pub struct SkylineCholesky {
    size: usize,
    skyline: Vec<Vec<f64>>,
    heights: Vec<usize>,
}

impl SkylineCholesky {
    /// Relative pivot size below which the matrix is treated as singular
    pub const PIVOT_TOLERANCE: f64 = 1e-11;

    /// Factorize a symmetric CSR matrix (only the lower triangle is read)
    ///
    /// On failure returns the row whose pivot vanished.
    pub fn factorize(csr: &CsrMatrix<f64>) -> Result<Self, usize> {
        let size = csr.nrows();

        // Skyline profile
        let mut heights = vec![0usize; size];
        for (row, col, _val) in csr.triplet_iter() {
            if col < row {
                heights[row] = heights[row].max(row - col);
            }
        }

        let mut skyline: Vec<Vec<f64>> = heights.iter().map(|&h| vec![0.0; h + 1]).collect();

        for (row, col, &val) in csr.triplet_iter() {
            if col <= row {
                let start = row - heights[row];
                skyline[row][col - start] += val;
            }
        }

        let mut factor = Self {
            size,
            skyline,
            heights,
        };
        factor.factorize_in_place()?;
        Ok(factor)
    }

    fn factorize_in_place(&mut self) -> Result<(), usize> {
        for i in 0..self.size {
            let hi = self.heights[i];
            let start_i = i - hi;
            let original_diag = self.skyline[i][hi];

            // L[i,j] for j < i
            for j in start_i..i {
                let start_j = j - self.heights[j];
                let start = start_i.max(start_j);

                let mut sum = 0.0;
                for k in start..j {
                    sum += self.get(i, k) * self.get(j, k);
                }

                let idx = j - start_i;
                self.skyline[i][idx] = (self.skyline[i][idx] - sum) / self.get(j, j);
            }

            // L[i,i]
            let sum: f64 = self.skyline[i][..hi].iter().map(|v| v * v).sum();
            let diag = original_diag - sum;
            if !(diag > Self::PIVOT_TOLERANCE * original_diag.abs()) || !diag.is_finite() {
                return Err(i);
            }
            self.skyline[i][hi] = diag.sqrt();
        }

        Ok(())
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> f64 {
        let start = row - self.heights[row];
        if col < start {
            return 0.0;
        }
        self.skyline[row][col - start]
    }

    /// Matrix dimension
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of stored factor entries (profile size)
    pub fn profile(&self) -> usize {
        self.skyline.iter().map(Vec::len).sum()
    }

    /// Solve L * L^T * x = b
    pub fn solve(&self, b: &DVector<f64>) -> DVector<f64> {
        let mut x = b.clone();

        // Forward substitution: L * y = b
        for i in 0..self.size {
            let start = i - self.heights[i];
            let mut sum = 0.0;
            for j in start..i {
                sum += self.get(i, j) * x[j];
            }
            x[i] = (x[i] - sum) / self.get(i, i);
        }

        // Backward substitution: L^T * x = y
        for i in (0..self.size).rev() {
            x[i] /= self.get(i, i);
            let start = i - self.heights[i];
            for j in start..i {
                x[j] -= self.get(i, j) * x[i];
            }
        }

        x
    }
}

/// Bandwidth reduction using Reverse Cuthill-McKee algorithm
///
/// `adjacency[i]` lists the neighbours of vertex `i`. Returns the vertices in
/// their new order (position -> original vertex).
pub fn reverse_cuthill_mckee(adjacency: &[Vec<usize>]) -> Vec<usize> {
    let n = adjacency.len();
    if n == 0 {
        return vec![];
    }

    let degrees: Vec<usize> = adjacency.iter().map(|v| v.len()).collect();

    let mut adj: Vec<Vec<usize>> = adjacency.to_vec();
    for neighbors in &mut adj {
        neighbors.sort_by_key(|&i| (degrees[i], i));
        neighbors.dedup();
    }

    let mut visited = vec![false; n];
    let mut result = Vec::with_capacity(n);
    let mut queue = VecDeque::new();

    while result.len() < n {
        // Start each component from its lowest-degree unvisited vertex
        let start = (0..n)
            .filter(|&i| !visited[i])
            .min_by_key(|&i| (degrees[i], i))
            .unwrap_or(0);
        queue.push_back(start);
        visited[start] = true;

        while let Some(vertex) = queue.pop_front() {
            result.push(vertex);
            for &neighbor in &adj[vertex] {
                if !visited[neighbor] {
                    visited[neighbor] = true;
                    queue.push_back(neighbor);
                }
            }
        }
    }

    result.reverse();
    result
}
