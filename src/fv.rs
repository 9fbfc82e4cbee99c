//! # Finite-volume substrate
//!
//! ## Aim
//! Minimal collocated finite-volume machinery the conservative update runs on: an
//! owner/neighbour face-addressed mesh, mesh-resident fields with per-patch boundary
//! conditions, explicit calculus (`fvc`), implicit LDU operators (`fvm`) and the linear
//! solvers that invert them.
//!
//! ## Main Data Structures and Logic
//! - `mesh::FvMesh`: cells, internal faces (owner < neighbour, area vector owner -> neighbour),
//!   boundary faces grouped in named patches, `solutionD` flags for degenerate directions
//! - `fields::VolField<T>` / `fields::SurfaceField<T>`: values per cell / per face, scalar or vector
//! - `fvm::FvMatrix<T>`: diagonal, upper, lower and source of `M x = s`
//! - `linear_solver::LinearSolverEnum`: dense LU or Gauss-Seidel, selected at configuration time
//!
//! ## Usage
//! ```rust, ignore
//! let mesh = FvMesh::cartesian([10, 1, 1], [1.0, 0.1, 0.1], [true, false, false])?;
//! let flux = SurfaceField::uniform("rhoPhi", &mesh, 1.0);
//! let d = fvc::div(&mesh, &flux, "deltaRho");
//! ```
pub mod fields;
pub mod fvc;
pub mod fvm;
pub mod linear_solver;
pub mod mesh;
/// tests
mod fv_tests;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FvError {
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),
    #[error("Size mismatch in '{field}': expected {expected}, found {found}")]
    SizeMismatch {
        field: String,
        expected: usize,
        found: usize,
    },
    #[error("Linear solver failed for '{field}': {reason}")]
    SolverFailure { field: String, reason: String },
    #[error(
        "Linear solver did not converge for '{field}' after {iterations} iterations, residual {residual:e}"
    )]
    NotConverged {
        field: String,
        iterations: usize,
        residual: f64,
    },
}
