//! Sparse matrix utilities for the global stiffness system
//!
//! Frame stiffness matrices are banded and mostly empty. Assembly goes through
//! COO triplets (duplicates are summed on conversion), storage is CSR, and the
//! reduced system is factorized once with a skyline Cholesky after bandwidth
//! reduction.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{CooMatrix, CsrMatrix};

/// Sparse matrix builder using COO format
/// More efficient for incremental assembly
pub struct SparseMatrixBuilder {
    nrows: usize,
    ncols: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl SparseMatrixBuilder {
    /// Create a new square sparse matrix builder
    pub fn new(size: usize) -> Self {
        Self::rectangular(size, size)
    }

    pub fn rectangular(nrows: usize, ncols: usize) -> Self {
        // 3 DOFs per node, two or three neighbours per node
        let estimated_nnz = nrows * 27;
        Self {
            nrows,
            ncols,
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

    /// Add values from a small fixed-size matrix
    pub fn add_element_matrix<const N: usize>(
        &mut self,
        dofs: &[usize; N],
        k_elem: &nalgebra::SMatrix<f64, N, N>,
    ) {
        for (i, &di) in dofs.iter().enumerate() {
            for (j, &dj) in dofs.iter().enumerate() {
                self.add(di, dj, k_elem[(i, j)]);
            }
        }
    }

    /// Convert to CSR format for efficient solves
    pub fn to_csr(&self) -> CsrMatrix<f64> {
        let mut coo = CooMatrix::new(self.nrows, self.ncols);

        for &(row, col, val) in &self.entries {
            coo.push(row, col, val);
        }

        CsrMatrix::from(&coo)
    }

    /// Get estimated non-zero count
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }
}

/// Extract `csr[rows, cols]` into a new CSR matrix
///
/// `row_map[i]` / `col_map[j]` give the position of original row `i` / column `j`
/// in the submatrix, or `None` if it is not selected.
pub fn submatrix(
    csr: &CsrMatrix<f64>,
    row_map: &[Option<usize>],
    nrows: usize,
    col_map: &[Option<usize>],
    ncols: usize,
) -> CsrMatrix<f64> {
    let mut builder = SparseMatrixBuilder::rectangular(nrows, ncols);
    for (row, col, &val) in csr.triplet_iter() {
        if let (Some(r), Some(c)) = (row_map[row], col_map[col]) {
            builder.add(r, c, val);
        }
    }
    builder.to_csr()
}

/// Symmetric permutation `P A Pᵀ`: new index `i` holds old index `perm[i]`
pub fn permute_symmetric(csr: &CsrMatrix<f64>, perm: &[usize]) -> CsrMatrix<f64> {
    let inv = inverse_permutation(perm);
    let mut builder = SparseMatrixBuilder::new(csr.nrows());
    for (row, col, &val) in csr.triplet_iter() {
        builder.add(inv[row], inv[col], val);
    }
    builder.to_csr()
}

/// Factorization failure at a (permuted) equation index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PivotFailure {
    pub index: usize,
    pub pivot: f64,
}

/// Sparse Cholesky solver for symmetric positive definite matrices
///
/// Skyline (variable band) storage of the lower triangle. The factorization is
/// reused for every right-hand side column.
pub struct SparseCholeskySolver {
    size: usize,
    // Skyline storage: for each row, from first non-zero to diagonal
    skyline: Vec<Vec<f64>>,
    // Row heights (distance from diagonal to first non-zero on the left)
    heights: Vec<usize>,
    factorized: bool,
}

impl SparseCholeskySolver {
    /// Create solver from CSR matrix
    pub fn new(csr: &CsrMatrix<f64>) -> Self {
        let size = csr.nrows();

        // Compute row heights (skyline profile)
        let mut heights = vec![0usize; size];
        for (row, col, _val) in csr.triplet_iter() {
            if col < row {
                heights[row] = heights[row].max(row - col);
            }
        }

        let mut skyline: Vec<Vec<f64>> = heights.iter().map(|&h| vec![0.0; h + 1]).collect();

        // Copy lower-triangle values into skyline storage
        for (row, col, &val) in csr.triplet_iter() {
            if col <= row {
                let idx = col - (row - heights[row]);
                skyline[row][idx] += val;
            }
        }

        Self {
            size,
            skyline,
            heights,
            factorized: false,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Profile (number of stored entries)
    pub fn profile(&self) -> usize {
        self.skyline.iter().map(Vec::len).sum()
    }

    /// Factorize in place (L Lᵀ)
    ///
    /// A pivot that drops to `relative_tolerance` times its original diagonal
    /// value (or below) marks a singular matrix.
    pub fn factorize(&mut self, relative_tolerance: f64) -> Result<(), PivotFailure> {
        for i in 0..self.size {
            let hi = self.heights[i];
            let start_i = i - hi;

            // Compute L[i,j] for j < i
            for j in start_i..i {
                let hj = self.heights[j];
                let start_j = j - hj;

                let start = start_i.max(start_j);
                let mut sum = 0.0;
                for k in start..j {
                    sum += self.get(i, k) * self.get(j, k);
                }

                let diag_j = self.skyline[j][hj];
                let idx = j - start_i;
                self.skyline[i][idx] = (self.skyline[i][idx] - sum) / diag_j;
            }

            // Compute L[i,i] (diagonal)
            let mut sum = 0.0;
            for j in start_i..i {
                let val = self.get(i, j);
                sum += val * val;
            }

            let original = self.skyline[i][hi];
            let diag = original - sum;
            if !diag.is_finite() || original <= 0.0 || diag <= relative_tolerance * original {
                return Err(PivotFailure { index: i, pivot: diag });
            }
            self.skyline[i][hi] = diag.sqrt();
        }

        self.factorized = true;
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

    /// Solve L * L^T * x = b
    pub fn solve(&self, b: &DVector<f64>) -> DVector<f64> {
        debug_assert!(self.factorized, "solve called before factorize");
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

    /// Solve for every column of `b`
    pub fn solve_many(&self, b: &DMatrix<f64>) -> DMatrix<f64> {
        let mut x = DMatrix::zeros(b.nrows(), b.ncols());
        for (col, rhs) in b.column_iter().enumerate() {
            x.set_column(col, &self.solve(&rhs.into_owned()));
        }
        x
    }
}

/// Sparse matrix times dense matrix
pub fn sparse_matmul(csr: &CsrMatrix<f64>, x: &DMatrix<f64>) -> DMatrix<f64> {
    let mut y = DMatrix::zeros(csr.nrows(), x.ncols());

    let row_offsets = csr.row_offsets();
    let col_indices = csr.col_indices();
    let values = csr.values();

    for row in 0..csr.nrows() {
        for idx in row_offsets[row]..row_offsets[row + 1] {
            let val = values[idx];
            let col = col_indices[idx];
            for c in 0..x.ncols() {
                y[(row, c)] += val * x[(col, c)];
            }
        }
    }

    y
}

/// Bandwidth reduction using Reverse Cuthill-McKee algorithm
///
/// Returns a permutation vector that reorders equations to minimize bandwidth
pub fn reverse_cuthill_mckee(csr: &CsrMatrix<f64>) -> Vec<usize> {
    let n = csr.nrows();
    if n == 0 {
        return vec![];
    }

    // Build adjacency list
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (row, col, &val) in csr.triplet_iter() {
        if val != 0.0 && row != col {
            adj[row].push(col);
        }
    }

    let degrees: Vec<usize> = adj.iter().map(|v| v.len()).collect();

    // Sort adjacencies by degree (for tie-breaking)
    for neighbors in &mut adj {
        neighbors.sort_by_key(|&i| (degrees[i], i));
        neighbors.dedup();
    }

    let mut visited = vec![false; n];
    let mut result = Vec::with_capacity(n);
    let mut queue = std::collections::VecDeque::new();

    // Start from node with minimum degree
    let start = (0..n).min_by_key(|&i| degrees[i]).unwrap_or(0);

    queue.push_back(start);
    visited[start] = true;

    while let Some(node) = queue.pop_front() {
        result.push(node);

        for &neighbor in &adj[node] {
            if !visited[neighbor] {
                visited[neighbor] = true;
                queue.push_back(neighbor);
            }
        }

        // Handle disconnected components
        if queue.is_empty() && result.len() < n {
            if let Some(next) = (0..n).filter(|&i| !visited[i]).min_by_key(|&i| degrees[i]) {
                queue.push_back(next);
                visited[next] = true;
            }
        }
    }

    result.reverse();
    result
}

/// Create inverse permutation
pub fn inverse_permutation(perm: &[usize]) -> Vec<usize> {
    let mut inv = vec![0; perm.len()];
    for (new_idx, &old_idx) in perm.iter().enumerate() {
        inv[old_idx] = new_idx;
    }
    inv
}
