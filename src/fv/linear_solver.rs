use super::FvError;
use enum_dispatch::enum_dispatch;
use log::{debug, warn};
use nalgebra::{DMatrix, DVector};

const SMALL: f64 = 1e-300;

/// LDU view of a sparse matrix addressed by the mesh faces.
///
/// Row `owner[f]` holds `upper[f]` in column `neighbour[f]`, row `neighbour[f]` holds
/// `lower[f]` in column `owner[f]`.
pub struct LduSystem<'a> {
    pub owner: &'a [usize],
    pub neighbour: &'a [usize],
    pub diag: &'a [f64],
    pub upper: &'a [f64],
    pub lower: &'a [f64],
}

impl LduSystem<'_> {
    pub fn n(&self) -> usize {
        self.diag.len()
    }

    pub fn multiply(&self, x: &[f64]) -> Vec<f64> {
        let mut y: Vec<f64> = self.diag.iter().zip(x).map(|(d, xi)| d * xi).collect();
        for f in 0..self.owner.len() {
            let (o, n) = (self.owner[f], self.neighbour[f]);
            y[o] += self.upper[f] * x[n];
            y[n] += self.lower[f] * x[o];
        }
        y
    }

    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut a = DMatrix::from_diagonal(&DVector::from_column_slice(self.diag));
        for f in 0..self.owner.len() {
            let (o, n) = (self.owner[f], self.neighbour[f]);
            a[(o, n)] += self.upper[f];
            a[(n, o)] += self.lower[f];
        }
        a
    }

    /// `Σ|b - A x| / Σ|b|`
    pub fn residual(&self, x: &[f64], b: &[f64]) -> f64 {
        let ax = self.multiply(x);
        let r: f64 = b.iter().zip(&ax).map(|(bi, axi)| (bi - axi).abs()).sum();
        let norm: f64 = b.iter().map(|bi| bi.abs()).sum();
        r / (norm + SMALL)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolverPerformance {
    pub solver: String,
    pub field: String,
    pub initial_residual: f64,
    pub final_residual: f64,
    pub iterations: usize,
}

#[enum_dispatch]
pub trait LinearSolver {
    fn name(&self) -> &str;
    /// solves `A x = b` starting from the values already in `x`
    fn solve(
        &self,
        system: &LduSystem,
        b: &[f64],
        x: &mut [f64],
        field: &str,
    ) -> Result<SolverPerformance, FvError>;
}

/// dense LU through nalgebra, for small meshes and reference solutions
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DirectLu;

impl LinearSolver for DirectLu {
    fn name(&self) -> &str {
        "DirectLu"
    }
    fn solve(
        &self,
        system: &LduSystem,
        b: &[f64],
        x: &mut [f64],
        field: &str,
    ) -> Result<SolverPerformance, FvError> {
        let initial_residual = system.residual(x, b);
        let lu = system.to_dense().lu();
        let solution =
            lu.solve(&DVector::from_column_slice(b))
                .ok_or_else(|| FvError::SolverFailure {
                    field: field.to_string(),
                    reason: "singular matrix".to_string(),
                })?;
        x.copy_from_slice(solution.as_slice());
        Ok(SolverPerformance {
            solver: self.name().to_string(),
            field: field.to_string(),
            initial_residual,
            final_residual: system.residual(x, b),
            iterations: 1,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GaussSeidel {
    pub tolerance: f64,
    pub max_iterations: usize,
    /// return `NotConverged` instead of only logging it
    pub strict: bool,
}

impl Default for GaussSeidel {
    fn default() -> Self {
        GaussSeidel {
            tolerance: 1e-10,
            max_iterations: 1000,
            strict: false,
        }
    }
}

impl LinearSolver for GaussSeidel {
    fn name(&self) -> &str {
        "GaussSeidel"
    }
    fn solve(
        &self,
        system: &LduSystem,
        b: &[f64],
        x: &mut [f64],
        field: &str,
    ) -> Result<SolverPerformance, FvError> {
        let n = system.n();
        let mut diag = system.diag.to_vec();
        let mut rows: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        for f in 0..system.owner.len() {
            let (o, nb) = (system.owner[f], system.neighbour[f]);
            if o == nb {
                diag[o] += system.upper[f] + system.lower[f];
            } else {
                rows[o].push((nb, system.upper[f]));
                rows[nb].push((o, system.lower[f]));
            }
        }
        if let Some(i) = diag.iter().position(|d| *d == 0.0) {
            return Err(FvError::SolverFailure {
                field: field.to_string(),
                reason: format!("zero diagonal in row {}", i),
            });
        }
        let initial_residual = system.residual(x, b);
        let mut residual = initial_residual;
        let mut iterations = 0;
        while residual > self.tolerance && iterations < self.max_iterations {
            for i in 0..n {
                let off: f64 = rows[i].iter().map(|&(j, a)| a * x[j]).sum();
                x[i] = (b[i] - off) / diag[i];
            }
            iterations += 1;
            residual = system.residual(x, b);
        }
        if !residual.is_finite() {
            return Err(FvError::SolverFailure {
                field: field.to_string(),
                reason: format!("non-finite residual after {} iterations", iterations),
            });
        }
        debug!(
            "GaussSeidel: solving for {}, initial residual = {:e}, final residual = {:e}, no. iterations {}",
            field, initial_residual, residual, iterations
        );
        if residual > self.tolerance {
            warn!(
                "GaussSeidel: {} not converged after {} iterations, residual {:e}",
                field, iterations, residual
            );
            if self.strict {
                return Err(FvError::NotConverged {
                    field: field.to_string(),
                    iterations,
                    residual,
                });
            }
        }
        Ok(SolverPerformance {
            solver: self.name().to_string(),
            field: field.to_string(),
            initial_residual,
            final_residual: residual,
            iterations,
        })
    }
}

#[enum_dispatch(LinearSolver)]
#[derive(Debug, Clone, PartialEq)]
pub enum LinearSolverEnum {
    DirectLu(DirectLu),
    GaussSeidel(GaussSeidel),
}

impl Default for LinearSolverEnum {
    fn default() -> Self {
        LinearSolverEnum::GaussSeidel(GaussSeidel::default())
    }
}
