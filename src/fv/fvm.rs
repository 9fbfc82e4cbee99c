//! Implicit finite-volume operators assembled as LDU matrices.
//!
//! An `FvMatrix` stands for the residual `A x - s` of one transport equation, so solving it
//! means solving `A x = s`. Operators are combined with `+`, `-` and unary `-` the same way the
//! terms of the equation are written.
use super::FvError;
use super::fields::{BoundaryCondition, FieldValue, VolField};
use super::linear_solver::{LduSystem, LinearSolver, LinearSolverEnum, SolverPerformance};
use super::mesh::FvMesh;
use std::ops::{Add, Neg, Sub};

#[derive(Debug, Clone, PartialEq)]
pub struct FvMatrix<T> {
    pub name: String,
    pub diag: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
    pub source: Vec<T>,
}

impl<T: FieldValue> FvMatrix<T> {
    pub fn new(name: &str, mesh: &FvMesh) -> Self {
        FvMatrix {
            name: name.to_string(),
            diag: vec![0.0; mesh.n_cells()],
            upper: vec![0.0; mesh.n_internal_faces()],
            lower: vec![0.0; mesh.n_internal_faces()],
            source: vec![T::zero(); mesh.n_cells()],
        }
    }

    /// Implicit minus explicit Euler time derivative of `rho*x`.
    ///
    /// The explicit derivative has already been folded into `x`, so only `rho V (x - x*)/dt`
    /// remains, with `x*` the current values of `x`.
    pub fn ddt_correction(mesh: &FvMesh, rho: &VolField<f64>, x: &VolField<T>, dt: f64) -> Self {
        let mut m = FvMatrix::new(&x.name, mesh);
        for c in 0..mesh.n_cells() {
            let coeff = rho.internal[c] * mesh.volumes[c] / dt;
            m.diag[c] += coeff;
            m.source[c] = m.source[c] + x.internal[c] * coeff;
        }
        m
    }

    /// `div(gamma grad(x))` with linearly interpolated face diffusivity.
    ///
    /// Patches with a fixed or calculated value couple to the boundary value, zero-gradient
    /// patches carry no flux.
    pub fn laplacian(mesh: &FvMesh, gamma: &VolField<f64>, x: &VolField<T>) -> Self {
        let mut m = FvMatrix::new(&x.name, mesh);
        for f in 0..mesh.n_internal_faces() {
            let (o, n) = (mesh.owner[f], mesh.neighbour[f]);
            let w = mesh.weights[f];
            let gamma_f = gamma.internal[o] * w + gamma.internal[n] * (1.0 - w);
            let coeff = gamma_f * mesh.face_areas[f].norm() * mesh.delta_coeffs[f];
            m.diag[o] -= coeff;
            m.diag[n] -= coeff;
            m.upper[f] += coeff;
            m.lower[f] += coeff;
        }
        for (patch, condition) in mesh.patches.iter().zip(&x.conditions) {
            if matches!(condition, BoundaryCondition::ZeroGradient) {
                continue;
            }
            for f in patch.range() {
                let o = mesh.boundary_owner[f];
                let coeff =
                    gamma.boundary[f] * mesh.boundary_areas[f].norm() * mesh.boundary_delta_coeffs[f];
                m.diag[o] -= coeff;
                m.source[o] = m.source[o] - x.boundary[f] * coeff;
            }
        }
        m
    }

    /// `eqn -= q` for an explicit volumetric source `q`
    pub fn subtract_explicit(&mut self, mesh: &FvMesh, q: &VolField<T>) {
        for c in 0..mesh.n_cells() {
            self.source[c] = self.source[c] + q.internal[c] * mesh.volumes[c];
        }
    }

    /// Solves component by component, then re-applies the boundary conditions of `x`.
    pub fn solve(
        &self,
        mesh: &FvMesh,
        solver: &LinearSolverEnum,
        x: &mut VolField<T>,
    ) -> Result<Vec<SolverPerformance>, FvError> {
        for (what, len, expected) in [
            ("diagonal", self.diag.len(), mesh.n_cells()),
            ("source", self.source.len(), mesh.n_cells()),
            ("field", x.internal.len(), mesh.n_cells()),
            ("upper", self.upper.len(), mesh.n_internal_faces()),
            ("lower", self.lower.len(), mesh.n_internal_faces()),
        ] {
            if len != expected {
                return Err(FvError::SizeMismatch {
                    field: format!("{} {}", self.name, what),
                    expected,
                    found: len,
                });
            }
        }
        let system = LduSystem {
            owner: &mesh.owner,
            neighbour: &mesh.neighbour,
            diag: &self.diag,
            upper: &self.upper,
            lower: &self.lower,
        };
        let mut performance = Vec::with_capacity(T::N_COMPONENTS);
        for cmpt in 0..T::N_COMPONENTS {
            let b: Vec<f64> = self.source.iter().map(|s| s.component(cmpt)).collect();
            let mut values: Vec<f64> = x.internal.iter().map(|v| v.component(cmpt)).collect();
            let label = if T::N_COMPONENTS == 1 {
                self.name.clone()
            } else {
                format!("{}{}", self.name, ["x", "y", "z"][cmpt])
            };
            performance.push(solver.solve(&system, &b, &mut values, &label)?);
            for (v, value) in x.internal.iter_mut().zip(values) {
                v.set_component(cmpt, value);
            }
        }
        x.correct_boundary_conditions(mesh);
        Ok(performance)
    }
}

impl FvMatrix<f64> {
    /// Linearised source `Su + Sp x` as an operator, for the right-hand side of an equation.
    pub fn implicit_source(mesh: &FvMesh, name: &str, su: &[f64], sp: &[f64]) -> Self {
        let mut m = FvMatrix::new(name, mesh);
        for c in 0..mesh.n_cells() {
            m.diag[c] += sp[c] * mesh.volumes[c];
            m.source[c] -= su[c] * mesh.volumes[c];
        }
        m
    }
}

impl<T: FieldValue> Add for FvMatrix<T> {
    type Output = FvMatrix<T>;
    fn add(mut self, rhs: FvMatrix<T>) -> FvMatrix<T> {
        for (a, b) in self.diag.iter_mut().zip(&rhs.diag) {
            *a += b;
        }
        for (a, b) in self.upper.iter_mut().zip(&rhs.upper) {
            *a += b;
        }
        for (a, b) in self.lower.iter_mut().zip(&rhs.lower) {
            *a += b;
        }
        for (a, &b) in self.source.iter_mut().zip(&rhs.source) {
            *a = *a + b;
        }
        self
    }
}

impl<T: FieldValue> Neg for FvMatrix<T> {
    type Output = FvMatrix<T>;
    fn neg(mut self) -> FvMatrix<T> {
        for a in self
            .diag
            .iter_mut()
            .chain(self.upper.iter_mut())
            .chain(self.lower.iter_mut())
        {
            *a = -*a;
        }
        for s in self.source.iter_mut() {
            *s = -*s;
        }
        self
    }
}

impl<T: FieldValue> Sub for FvMatrix<T> {
    type Output = FvMatrix<T>;
    fn sub(self, rhs: FvMatrix<T>) -> FvMatrix<T> {
        self + (-rhs)
    }
}
