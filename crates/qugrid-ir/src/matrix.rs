//! Dense gate matrices and numeric helpers.

use std::fmt::Write as _;

use num_complex::Complex64;

use crate::error::{IrError, IrResult};

/// A square complex matrix stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct GateMatrix {
    dim: usize,
    data: Vec<Complex64>,
}

impl GateMatrix {
    /// Build a matrix from row-major data; `data.len()` must be a square.
    pub fn new(dim: usize, data: Vec<Complex64>) -> IrResult<Self> {
        if data.len() != dim * dim {
            return Err(IrError::InvalidMatrix(format!(
                "{} entries do not form a {dim}x{dim} matrix",
                data.len()
            )));
        }
        Ok(Self { dim, data })
    }

    /// Build a matrix from rows.
    pub fn from_rows(rows: &[Vec<Complex64>]) -> IrResult<Self> {
        let dim = rows.len();
        if let Some(row) = rows.iter().find(|r| r.len() != dim) {
            return Err(IrError::InvalidMatrix(format!(
                "row of length {} in a matrix with {dim} rows",
                row.len()
            )));
        }
        Ok(Self {
            dim,
            data: rows.iter().flatten().copied().collect(),
        })
    }

    /// The `dim × dim` identity.
    pub fn identity(dim: usize) -> Self {
        let mut data = vec![Complex64::new(0.0, 0.0); dim * dim];
        for i in 0..dim {
            data[i * dim + i] = Complex64::new(1.0, 0.0);
        }
        Self { dim, data }
    }

    /// Number of rows (and columns).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of qubits the matrix acts on, if `dim` is a power of two.
    pub fn num_qubits(&self) -> Option<usize> {
        self.dim
            .is_power_of_two()
            .then(|| self.dim.trailing_zeros() as usize)
    }

    /// Entry at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.data[row * self.dim + col]
    }

    /// Iterate over `(row, col, value)` for entries that are not exactly zero.
    pub fn nonzero_entries(&self) -> impl Iterator<Item = (usize, usize, Complex64)> + '_ {
        self.data
            .iter()
            .enumerate()
            .filter(|(_, v)| v.re != 0.0 || v.im != 0.0)
            .map(|(idx, v)| (idx / self.dim, idx % self.dim, *v))
    }

    /// Matrix product `self · other`.
    pub fn mul(&self, other: &GateMatrix) -> IrResult<GateMatrix> {
        if self.dim != other.dim {
            return Err(IrError::InvalidMatrix(format!(
                "cannot multiply {0}x{0} by {1}x{1}",
                self.dim, other.dim
            )));
        }
        let n = self.dim;
        let mut data = vec![Complex64::new(0.0, 0.0); n * n];
        for i in 0..n {
            for k in 0..n {
                let a = self.data[i * n + k];
                if a.re == 0.0 && a.im == 0.0 {
                    continue;
                }
                for j in 0..n {
                    data[i * n + j] += a * other.data[k * n + j];
                }
            }
        }
        Ok(GateMatrix { dim: n, data })
    }

    /// Conjugate transpose.
    pub fn adjoint(&self) -> GateMatrix {
        let n = self.dim;
        let mut data = vec![Complex64::new(0.0, 0.0); n * n];
        for i in 0..n {
            for j in 0..n {
                data[j * n + i] = self.data[i * n + j].conj();
            }
        }
        GateMatrix { dim: n, data }
    }

    /// Entry-wise comparison within `tolerance`.
    pub fn approx_eq(&self, other: &GateMatrix, tolerance: f64) -> bool {
        self.dim == other.dim
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| (a - b).norm() <= tolerance)
    }

    /// Whether `U†U = I` within `tolerance`.
    pub fn is_unitary(&self, tolerance: f64) -> bool {
        self.adjoint()
            .mul(self)
            .is_ok_and(|p| p.approx_eq(&GateMatrix::identity(self.dim), tolerance))
    }
}

/// Embed `u` as the target block of a singly controlled gate.
///
/// The result is twice the size of `u`: identity on the upper half (control
/// clear) and `u` on the lower-right block (control set). The control is the
/// first wire of the gate.
pub fn make_controlled<T: Clone>(u: &[Vec<T>], zero: &T, one: &T) -> Vec<Vec<T>> {
    let m = u.len();
    let mut c: Vec<Vec<T>> = (0..2 * m)
        .map(|i| {
            (0..2 * m)
                .map(|j| if i == j { one.clone() } else { zero.clone() })
                .collect()
        })
        .collect();
    for (i, row) in u.iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            c[i + m][j + m] = value.clone();
        }
    }
    c
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    #[allow(clippy::cast_possible_wrap)]
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Format a complex number as `±re±imi` with eight decimals.
///
/// A non-negative real part is padded with a space instead of `+` so the
/// columns of a state dump line up.
pub fn format_complex(value: Complex64) -> String {
    let re = round_to(value.re, 8);
    let im = round_to(value.im, 8);
    let mut out = String::with_capacity(24);
    out.push(if re >= 0.0 { ' ' } else { '-' });
    let _ = write!(out, "{:.8}", re.abs());
    out.push(if im >= 0.0 { '+' } else { '-' });
    let _ = write!(out, "{:.8}i", im.abs());
    out
}
