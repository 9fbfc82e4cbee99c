use super::conserved_state::SMALL_DENSITY;
use super::integration_system::{IntegrationError, Stage, StageHistory};
use crate::FluxSchemes::flux_engine::FluxEngine;
use crate::Kinetics::combustion_model::{CombustionInput, CombustionModel, CombustionModelEnum};
use crate::Kinetics::reaction_parser::KineticsError;
use crate::Thermodynamics::composition::Composition;
use crate::fv::FvError;
use crate::fv::fields::{SurfaceField, VolField};
use crate::fv::fvc;
use crate::fv::fvm::FvMatrix;
use crate::fv::linear_solver::LinearSolverEnum;
use crate::fv::mesh::FvMesh;

/// data of the explicit stage update shared with the species
pub struct SpeciesAdvection<'a> {
    pub mesh: &'a FvMesh,
    pub stage: &'a Stage,
    pub dt: f64,
    /// stage-blended density the step started from
    pub rho_old: &'a VolField<f64>,
    /// density after this stage's update
    pub rho: &'a VolField<f64>,
    pub rho_phi: &'a SurfaceField<f64>,
    pub flux_engine: &'a FluxEngine,
}

/// data of the implicit species correction
pub struct SpeciesCorrection<'a> {
    pub mesh: &'a FvMesh,
    pub dt: f64,
    pub rho: &'a VolField<f64>,
    /// effective mass diffusivity rho D, kg/(m s)
    pub diffusivity: &'a VolField<f64>,
    pub solver: &'a LinearSolverEnum,
}

/// Species transport: explicit advection with the same stage blending as the mixture, then an
/// implicit diffusion and reaction correction driven by the combustion model.
///
/// The inert specie is never transported. After every update it is reset to the complement of
/// the transported species and floored at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionCoupler {
    inert_index: usize,
    combustion: CombustionModelEnum,
    /// one per specie, unused for the inert and inactive ones
    histories: Vec<StageHistory<VolField<f64>>>,
}

impl ReactionCoupler {
    pub fn new(composition: &Composition, combustion: CombustionModelEnum) -> Self {
        let histories = composition
            .species()
            .iter()
            .map(|name| StageHistory::new(name))
            .collect();
        ReactionCoupler {
            inert_index: composition.inert_index(),
            combustion,
            histories,
        }
    }

    pub fn inert_index(&self) -> usize {
        self.inert_index
    }
    pub fn combustion(&self) -> &CombustionModelEnum {
        &self.combustion
    }

    /// Explicit stage update of every transported specie:
    /// `Y = (Y_old rho_old - dt div(Y_f rhoPhi))/rho`, floored at zero.
    /// Returns the number of clamped cells.
    #[allow(non_snake_case)]
    pub fn advance_explicit(
        &mut self,
        ctx: &SpeciesAdvection,
        composition: &Composition,
        Y: &mut [VolField<f64>],
    ) -> Result<usize, IntegrationError> {
        let mesh = ctx.mesh;
        let mut clamped = 0;
        let mut yt = Y[self.inert_index].map("Yt", |_| 0.0);
        for i in composition.transported() {
            let y_old = self.histories[i].store_and_blend_old(&Y[i], ctx.stage)?;
            let y_face = ctx.flux_engine.interpolate(mesh, &Y[i], "Yi");
            let delta = fvc::div(mesh, &y_face.multiply(ctx.rho_phi, "YiRhoPhi"), "deltaRhoY");
            let delta = self.histories[i].store_and_blend_delta(&delta, ctx.stage)?;
            let yi = &mut Y[i];
            for c in 0..mesh.n_cells() {
                let rho = ctx.rho.internal[c];
                yi.internal[c] = if rho > SMALL_DENSITY {
                    (y_old.internal[c] * ctx.rho_old.internal[c] - ctx.dt * delta.internal[c]) / rho
                } else {
                    0.0
                };
            }
            yi.correct_boundary_conditions(mesh);
            clamped += yi.clamp_min(0.0);
            yt.axpy(1.0, yi);
        }
        self.close_inert(Y, &yt);
        Ok(clamped)
    }

    /// Y_inert = max(1 - Yt, 0) on cells and boundary faces, Yt summed over the active species
    /// only. Inactive species keep their fractions and are left out of the complement.
    #[allow(non_snake_case)]
    fn close_inert(&self, Y: &mut [VolField<f64>], yt: &VolField<f64>) {
        let inert = &mut Y[self.inert_index];
        inert.assign_values(&yt.map("Yinert", |s| (1.0 - s).max(0.0)));
    }

    pub fn correct_combustion(&mut self, input: &CombustionInput) -> Result<(), KineticsError> {
        self.combustion.correct(input)
    }

    /// heat release of the last `correct_combustion`, W/m3
    pub fn qdot(&self, mesh: &FvMesh) -> VolField<f64> {
        self.combustion.qdot(mesh)
    }

    /// Implicit correction of every transported specie:
    /// `ddt(rho, Y) - explicit ddt(rho, Y) - laplacian(rho D, Y) == R(Y)`, floored at zero.
    /// Returns the number of clamped cells.
    #[allow(non_snake_case)]
    pub fn solve_species(
        &self,
        ctx: &SpeciesCorrection,
        composition: &Composition,
        Y: &mut [VolField<f64>],
    ) -> Result<usize, FvError> {
        let mesh = ctx.mesh;
        let mut clamped = 0;
        let mut yt = Y[self.inert_index].map("Yt", |_| 0.0);
        for i in composition.transported() {
            let source = self.combustion.reaction_source(i, &Y[i]);
            let yi = &mut Y[i];
            let eqn = FvMatrix::ddt_correction(mesh, ctx.rho, yi, ctx.dt)
                - FvMatrix::laplacian(mesh, ctx.diffusivity, yi)
                - FvMatrix::implicit_source(mesh, &yi.name, &source.su, &source.sp);
            eqn.solve(mesh, ctx.solver, yi)?;
            clamped += yi.clamp_min(0.0);
            yt.axpy(1.0, yi);
        }
        self.close_inert(Y, &yt);
        Ok(clamped)
    }

    /// empties every specie history
    pub fn clear(&mut self) {
        for history in &mut self.histories {
            history.clear();
        }
    }
}
