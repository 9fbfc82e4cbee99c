use crate::Turbulence::turbulence_model::{TurbulenceClosure, TurbulenceEnum};
use crate::fv::FvError;
use crate::fv::fields::VolField;
use crate::fv::fvm::FvMatrix;
use crate::fv::linear_solver::{LinearSolverEnum, SolverPerformance};
use crate::fv::mesh::FvMesh;
use log::debug;
use nalgebra::Vector3;

/// Implicit diffusion corrections of velocity and internal energy.
///
/// Every equation is built as `ddt(rho, x) - explicit ddt(rho, x) + diffusion`: the explicit
/// update has already advanced `x`, the solve only adds the implicit diffusive part.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportCorrector {
    solver: LinearSolverEnum,
    /// Sc in D = muEff/(rho Sc)
    pub schmidt_number: f64,
}

fn log_performance(performance: &[SolverPerformance]) {
    for p in performance {
        debug!(
            "{}: solving for {}, initial residual = {:e}, final residual = {:e}, no. iterations {}",
            p.solver, p.field, p.initial_residual, p.final_residual, p.iterations
        );
    }
}

impl TransportCorrector {
    pub fn new(solver: LinearSolverEnum, schmidt_number: f64) -> Self {
        TransportCorrector {
            solver,
            schmidt_number,
        }
    }

    pub fn solver(&self) -> &LinearSolverEnum {
        &self.solver
    }

    /// `ddt(rho, U) - explicit ddt(rho, U) + divDevRhoReff(U) == 0`
    #[allow(non_snake_case)]
    pub fn solve_momentum(
        &self,
        mesh: &FvMesh,
        rho: &VolField<f64>,
        U: &mut VolField<Vector3<f64>>,
        turbulence: &TurbulenceEnum,
        mu: &VolField<f64>,
        dt: f64,
    ) -> Result<(), FvError> {
        let eqn = FvMatrix::ddt_correction(mesh, rho, U, dt)
            + turbulence.div_dev_rho_reff(mesh, mu, U);
        let performance = eqn.solve(mesh, &self.solver, U)?;
        log_performance(&performance);
        Ok(())
    }

    /// `ddt(rho, e) - explicit ddt(rho, e) - laplacian(alphaEff, e)`, left open so that sources
    /// can still be subtracted before `solve_energy`
    pub fn energy_equation(
        &self,
        mesh: &FvMesh,
        rho: &VolField<f64>,
        e: &VolField<f64>,
        alpha_eff: &VolField<f64>,
        dt: f64,
    ) -> FvMatrix<f64> {
        FvMatrix::ddt_correction(mesh, rho, e, dt) - FvMatrix::laplacian(mesh, alpha_eff, e)
    }

    pub fn solve_energy(
        &self,
        mesh: &FvMesh,
        eqn: &FvMatrix<f64>,
        e: &mut VolField<f64>,
    ) -> Result<(), FvError> {
        let performance = eqn.solve(mesh, &self.solver, e)?;
        log_performance(&performance);
        Ok(())
    }

    /// effective mass diffusivity rho D = muEff/Sc
    pub fn mass_diffusivity(&self, mu_eff: &VolField<f64>) -> VolField<f64> {
        let sc = self.schmidt_number;
        mu_eff.map("rhoD", |m| m / sc)
    }
}
