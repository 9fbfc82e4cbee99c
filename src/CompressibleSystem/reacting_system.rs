use super::SystemError;
use super::conserved_state::{ConservedStateStore, field_names};
use super::integration_system::{IntegrationSystem, Stage, StageHistory};
use super::primitive_closure::PrimitiveClosure;
use super::reaction_coupler::{ReactionCoupler, SpeciesAdvection, SpeciesCorrection};
use super::transport_corrector::TransportCorrector;
use crate::FluxSchemes::flux_engine::{FluxEngine, FluxInput};
use crate::FluxSchemes::flux_scheme::{FluxScheme, FluxSchemeEnum};
use crate::Kinetics::combustion_model::{
    CombustionInput, CombustionModel, CombustionModelEnum, NoCombustion,
};
use crate::Radiation::radiation_model::{RadiationEnum, RadiationModel};
use crate::Turbulence::turbulence_model::{
    Laminar, TurbulenceClosure, TurbulenceEnum, TurbulenceInput,
};
use crate::fv::FvError;
use crate::fv::fields::VolField;
use crate::fv::fvc;
use crate::fv::linear_solver::LinearSolverEnum;
use crate::fv::mesh::FvMesh;
use log::{info, warn};
use nalgebra::Vector3;
use prettytable::{Cell, Row, Table};
use serde_json::{Map, Value};

/// Runtime-selected collaborators of the system. Absent turbulence disables the implicit
/// correction, absent radiation falls back to `NoRadiation`.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemModels {
    pub flux_scheme: FluxSchemeEnum,
    pub turbulence: Option<TurbulenceEnum>,
    pub combustion: Option<CombustionModelEnum>,
    pub radiation: Option<RadiationEnum>,
    pub linear_solver: LinearSolverEnum,
    pub schmidt_number: f64,
}

impl Default for SystemModels {
    fn default() -> Self {
        SystemModels {
            flux_scheme: FluxSchemeEnum::default(),
            turbulence: None,
            combustion: None,
            radiation: None,
            linear_solver: LinearSolverEnum::default(),
            schmidt_number: 1.0,
        }
    }
}

/// Clamp counters. Negative density or mass fraction is floored, not raised; repeated clamping
/// means the time step is too large.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StabilityMonitor {
    /// cells clamped in the step under way
    pub density_clamps: usize,
    pub species_clamps: usize,
    /// counts of the last finished step
    pub last_density_clamps: usize,
    pub last_species_clamps: usize,
    /// finished steps in a row with at least one clamp
    pub consecutive_clamped_steps: usize,
    /// a stage has run since the last finished step
    step_open: bool,
}

impl StabilityMonitor {
    fn record_density(&mut self, clamped: usize) {
        self.step_open = true;
        self.density_clamps += clamped;
    }
    fn record_species(&mut self, clamped: usize) {
        self.species_clamps += clamped;
    }

    /// Closes the step under way. Nothing to close after `restore` dropped a rejected attempt.
    fn end_step(&mut self) {
        if !self.step_open {
            return;
        }
        self.step_open = false;
        if self.density_clamps + self.species_clamps > 0 {
            self.consecutive_clamped_steps += 1;
            warn!(
                "clamped {} density and {} mass fraction cells ({} steps in a row)",
                self.density_clamps, self.species_clamps, self.consecutive_clamped_steps
            );
        } else {
            self.consecutive_clamped_steps = 0;
        }
        self.last_density_clamps = self.density_clamps;
        self.last_species_clamps = self.species_clamps;
        self.density_clamps = 0;
        self.species_clamps = 0;
    }
}

/// Everything an outer controller needs to retry a step from an accepted state.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemSnapshot {
    state: ConservedStateStore,
    thermo: PrimitiveClosure,
    turbulence: Option<TurbulenceEnum>,
    qdot: VolField<f64>,
    monitor: StabilityMonitor,
}

/// Compressible reacting gas: conserved state, its stage histories and the collaborators that
/// close it. Driven through `IntegrationSystem` by a `TimeIntegrator`.
pub struct ReactingCompressibleSystem<'a> {
    mesh: &'a FvMesh,
    g: &'a Vector3<f64>,
    thermo: PrimitiveClosure,
    state: ConservedStateStore,
    rho_history: StageHistory<VolField<f64>>,
    rho_u_history: StageHistory<VolField<Vector3<f64>>>,
    rho_e_history: StageHistory<VolField<f64>>,
    flux_engine: FluxEngine,
    turbulence: Option<TurbulenceEnum>,
    reaction: Option<ReactionCoupler>,
    radiation: RadiationEnum,
    corrector: TransportCorrector,
    qdot: VolField<f64>,
    monitor: StabilityMonitor,
}

impl<'a> ReactingCompressibleSystem<'a> {
    /// Builds the system from a primitive state and encodes the conserved one.
    ///
    /// Species are transported when there is more than one of them or a combustion model is
    /// given; in that case a missing turbulence model becomes `Laminar`.
    #[allow(non_snake_case)]
    pub fn new(
        mesh: &'a FvMesh,
        g: &'a Vector3<f64>,
        thermo: PrimitiveClosure,
        U: VolField<Vector3<f64>>,
        models: SystemModels,
    ) -> Result<Self, SystemError> {
        if U.internal.len() != mesh.n_cells() || U.boundary.len() != mesh.n_boundary_faces() {
            return Err(FvError::SizeMismatch {
                field: U.name.clone(),
                expected: mesh.n_cells(),
                found: U.internal.len(),
            }
            .into());
        }
        if !(models.schmidt_number > 0.0) {
            return Err(SystemError::InvalidConfiguration(format!(
                "Schmidt number must be positive, got {}",
                models.schmidt_number
            )));
        }
        let state = ConservedStateStore::new(mesh, U, &thermo);

        let reacting = thermo.composition().len() > 1 || models.combustion.is_some();
        let mut turbulence = models.turbulence;
        let reaction = if reacting {
            if turbulence.is_none() {
                turbulence = Some(Laminar::new(mesh).into());
            }
            let combustion = models
                .combustion
                .unwrap_or_else(|| NoCombustion.into());
            info!(
                "Transporting species, inert specie {}, combustion model {}",
                thermo.composition().inert_specie(),
                combustion.name()
            );
            Some(ReactionCoupler::new(thermo.composition(), combustion))
        } else {
            None
        };
        if let Some(turbulence) = &turbulence {
            info!("Selecting turbulence model {}", turbulence.name());
        }
        let mut radiation = models.radiation.unwrap_or_else(|| {
            info!("No radiation model configured, using none");
            RadiationEnum::default()
        });
        radiation.correct(thermo.T());
        info!("Selecting flux scheme {}", models.flux_scheme.name());

        Ok(ReactingCompressibleSystem {
            mesh,
            g,
            thermo,
            state,
            rho_history: StageHistory::new(field_names::RHO),
            rho_u_history: StageHistory::new(field_names::RHO_U),
            rho_e_history: StageHistory::new(field_names::RHO_E),
            flux_engine: FluxEngine::new(models.flux_scheme),
            turbulence,
            reaction,
            radiation,
            corrector: TransportCorrector::new(models.linear_solver, models.schmidt_number),
            qdot: VolField::calculated(field_names::QDOT, mesh, 0.0),
            monitor: StabilityMonitor::default(),
        })
    }

    pub fn decode(&mut self) {
        self.state.decode(self.mesh, &mut self.thermo);
    }

    pub fn encode(&mut self) {
        self.state.encode(&self.thermo);
    }

    pub fn mesh(&self) -> &FvMesh {
        self.mesh
    }
    pub fn gravity(&self) -> &Vector3<f64> {
        self.g
    }
    pub fn state(&self) -> &ConservedStateStore {
        &self.state
    }
    pub fn thermo(&self) -> &PrimitiveClosure {
        &self.thermo
    }
    /// for externally altered primitives; call `encode` afterwards
    pub fn thermo_mut(&mut self) -> &mut PrimitiveClosure {
        &mut self.thermo
    }
    pub fn turbulence(&self) -> Option<&TurbulenceEnum> {
        self.turbulence.as_ref()
    }
    pub fn reaction(&self) -> Option<&ReactionCoupler> {
        self.reaction.as_ref()
    }
    pub fn radiation(&self) -> &RadiationEnum {
        &self.radiation
    }
    pub fn flux_engine(&self) -> &FluxEngine {
        &self.flux_engine
    }
    pub fn qdot(&self) -> &VolField<f64> {
        &self.qdot
    }
    pub fn monitor(&self) -> &StabilityMonitor {
        &self.monitor
    }

    /// radiative source on the current temperature, for consumers outside the energy equation
    pub fn correct_radiation(&mut self) -> VolField<f64> {
        self.radiation.correct(self.thermo.T());
        self.radiation.sh(self.mesh)
    }

    /// Largest stable step for the given Courant number,
    /// `cfl min_cells V / Σ_faces (|U_f·S| + c_f |S|)`, from the current primitive state.
    pub fn courant_time_step(&self, cfl: f64) -> Result<f64, SystemError> {
        if !(cfl > 0.0 && cfl.is_finite()) {
            return Err(SystemError::InvalidConfiguration(format!(
                "Courant number must be positive, got {}",
                cfl
            )));
        }
        let mesh = self.mesh;
        let c = self.thermo.speed_of_sound();
        let u = &self.state.U;
        let mut wave_sum = vec![0.0; mesh.n_cells()];
        for f in 0..mesh.n_internal_faces() {
            let (o, n) = (mesh.owner[f], mesh.neighbour[f]);
            let sf = mesh.face_areas[f];
            let u_f = (u.internal[o] + u.internal[n]) * 0.5;
            let c_f = 0.5 * (c.internal[o] + c.internal[n]);
            let rate = u_f.dot(&sf).abs() + c_f * sf.norm();
            wave_sum[o] += rate;
            wave_sum[n] += rate;
        }
        for f in 0..mesh.n_boundary_faces() {
            let o = mesh.boundary_owner[f];
            let sf = mesh.boundary_areas[f];
            wave_sum[o] += u.boundary[f].dot(&sf).abs() + c.boundary[f] * sf.norm();
        }
        let dt = wave_sum
            .iter()
            .zip(&mesh.volumes)
            .filter(|(w, _)| **w > 0.0)
            .map(|(w, v)| v / w)
            .fold(f64::INFINITY, f64::min);
        if !dt.is_finite() {
            return Err(SystemError::InvalidConfiguration(
                "no wave speed bounds the time step".to_string(),
            ));
        }
        Ok(cfl * dt)
    }

    pub fn snapshot(&self) -> SystemSnapshot {
        SystemSnapshot {
            state: self.state.clone(),
            thermo: self.thermo.clone(),
            turbulence: self.turbulence.clone(),
            qdot: self.qdot.clone(),
            monitor: self.monitor,
        }
    }

    /// Returns to a snapshot, clamp counts of the rejected attempt included. Stage histories are
    /// not part of it: call `clear_ode_fields` before retrying a step.
    pub fn restore(&mut self, snapshot: &SystemSnapshot) {
        self.state = snapshot.state.clone();
        self.thermo = snapshot.thermo.clone();
        self.turbulence = snapshot.turbulence.clone();
        self.qdot = snapshot.qdot.clone();
        self.monitor = snapshot.monitor;
    }

    /// The fields a restart needs, keyed by their fixed names; mass fractions as `Y.<specie>`.
    pub fn restart_fields(&self) -> Result<Value, SystemError> {
        let mut fields = Map::new();
        let state = &self.state;
        fields.insert(field_names::RHO.into(), serde_json::to_value(&state.rho)?);
        fields.insert(field_names::RHO_U.into(), serde_json::to_value(&state.rho_u)?);
        fields.insert(field_names::RHO_E.into(), serde_json::to_value(&state.rho_e)?);
        fields.insert(field_names::U.into(), serde_json::to_value(&state.U)?);
        fields.insert(field_names::P.into(), serde_json::to_value(self.thermo.p())?);
        fields.insert(field_names::T.into(), serde_json::to_value(self.thermo.T())?);
        fields.insert(field_names::E.into(), serde_json::to_value(self.thermo.e())?);
        for (name, y) in self.thermo.composition().species().iter().zip(self.thermo.Y()) {
            fields.insert(format!("Y.{}", name), serde_json::to_value(y)?);
        }
        fields.insert(field_names::PHI.into(), serde_json::to_value(&state.fluxes.phi)?);
        fields.insert(
            field_names::RHO_PHI.into(),
            serde_json::to_value(&state.fluxes.rho_phi)?,
        );
        fields.insert(
            field_names::RHO_U_PHI.into(),
            serde_json::to_value(&state.fluxes.rho_u_phi)?,
        );
        fields.insert(
            field_names::RHO_E_PHI.into(),
            serde_json::to_value(&state.fluxes.rho_e_phi)?,
        );
        fields.insert(field_names::QDOT.into(), serde_json::to_value(&self.qdot)?);
        fields.insert(field_names::MACH_NO.into(), serde_json::to_value(&state.mach_no)?);
        Ok(Value::Object(fields))
    }

    pub fn pretty_print_summary(&self) {
        let mut table = Table::new();
        table.add_row(Row::new(vec![
            Cell::new("field"),
            Cell::new("min"),
            Cell::new("max"),
        ]));
        let magnitude_u = self.state.U.map("magU", |u| u.norm());
        let mut rows: Vec<(&str, (f64, f64))> = vec![
            (field_names::RHO, self.state.rho.min_max()),
            ("mag(U)", magnitude_u.min_max()),
            (field_names::P, self.thermo.p().min_max()),
            (field_names::T, self.thermo.T().min_max()),
            (field_names::E, self.thermo.e().min_max()),
            (field_names::MACH_NO, self.state.mach_no.min_max()),
        ];
        if self.reaction.is_some() {
            rows.push((field_names::QDOT, self.qdot.min_max()));
        }
        for (name, (lo, hi)) in rows {
            table.add_row(Row::new(vec![
                Cell::new(name),
                Cell::new(&format!("{:.6e}", lo)),
                Cell::new(&format!("{:.6e}", hi)),
            ]));
        }
        for (name, y) in self.thermo.composition().species().iter().zip(self.thermo.Y()) {
            let (lo, hi) = y.min_max();
            table.add_row(Row::new(vec![
                Cell::new(&format!("Y.{}", name)),
                Cell::new(&format!("{:.6e}", lo)),
                Cell::new(&format!("{:.6e}", hi)),
            ]));
        }
        table.printstd();
    }

    // transport properties

    pub fn speed_of_sound(&self) -> VolField<f64> {
        self.thermo.speed_of_sound()
    }
    #[allow(non_snake_case)]
    pub fn Cv(&self) -> &VolField<f64> {
        self.thermo.cv()
    }
    pub fn mu(&self) -> &VolField<f64> {
        self.thermo.mu()
    }
    pub fn mu_patch(&self, patch: usize) -> Vec<f64> {
        self.thermo.mu_patch(self.mesh, patch)
    }
    pub fn nu(&self) -> VolField<f64> {
        self.thermo.nu()
    }
    pub fn nu_patch(&self, patch: usize) -> Vec<f64> {
        self.thermo.nu_patch(self.mesh, patch)
    }
    pub fn alpha(&self) -> VolField<f64> {
        self.thermo.alpha()
    }
    pub fn alpha_patch(&self, patch: usize) -> Vec<f64> {
        self.thermo.alpha_patch(self.mesh, patch)
    }
    pub fn alphahe(&self) -> VolField<f64> {
        self.thermo.alphahe()
    }
    pub fn alphahe_patch(&self, patch: usize) -> Vec<f64> {
        self.thermo.alphahe_patch(self.mesh, patch)
    }
    pub fn kappa(&self) -> &VolField<f64> {
        self.thermo.kappa()
    }
    pub fn kappa_patch(&self, patch: usize) -> Vec<f64> {
        self.thermo.kappa_patch(self.mesh, patch)
    }
    pub fn alpha_eff(&self, alphat: &VolField<f64>) -> VolField<f64> {
        self.thermo.alpha_eff(alphat)
    }
    pub fn alpha_eff_patch(&self, alphat: &[f64], patch: usize) -> Vec<f64> {
        self.thermo.alpha_eff_patch(self.mesh, alphat, patch)
    }
    pub fn kappa_eff(&self, alphat: &VolField<f64>) -> VolField<f64> {
        self.thermo.kappa_eff(alphat)
    }
    pub fn kappa_eff_patch(&self, alphat: &[f64], patch: usize) -> Vec<f64> {
        self.thermo.kappa_eff_patch(self.mesh, alphat, patch)
    }
}

impl IntegrationSystem for ReactingCompressibleSystem<'_> {
    type Error = SystemError;

    /// decodes, then hands the fresh primitives to the flux engine
    fn update(&mut self) -> Result<(), SystemError> {
        self.decode();
        let c = self.thermo.speed_of_sound();
        let input = FluxInput {
            rho: &self.state.rho,
            U: &self.state.U,
            e: self.thermo.e(),
            p: self.thermo.p(),
            c: &c,
        };
        self.flux_engine
            .update(self.mesh, &input, &mut self.state.fluxes);
        Ok(())
    }

    /// `Q = Q_old - dt ΔQ` with both terms blended over the stages, for rho, rhoU, rhoE and the
    /// transported species
    fn solve(&mut self, stage: &Stage, dt: f64) -> Result<(), SystemError> {
        let mesh = self.mesh;
        let g = *self.g;

        let rho_old = self.rho_history.store_and_blend_old(&self.state.rho, stage)?;
        let rho_u_old = self
            .rho_u_history
            .store_and_blend_old(&self.state.rho_u, stage)?;
        let rho_e_old = self
            .rho_e_history
            .store_and_blend_old(&self.state.rho_e, stage)?;

        let fluxes = &self.state.fluxes;
        let delta_rho = fvc::div(mesh, &fluxes.rho_phi, "deltaRho");
        let mut delta_rho_u = fvc::div(mesh, &fluxes.rho_u_phi, "deltaRhoU");
        delta_rho_u.axpy(-1.0, &self.state.rho.map("rhoG", |rho| g * rho));
        let mut delta_rho_e = fvc::div(mesh, &fluxes.rho_e_phi, "deltaRhoE");
        delta_rho_e.axpy(-1.0, &self.state.rho_u.map("rhoUG", |m| m.dot(&g)));

        let delta_rho = self.rho_history.store_and_blend_delta(&delta_rho, stage)?;
        let delta_rho_u = self
            .rho_u_history
            .store_and_blend_delta(&delta_rho_u, stage)?;
        let delta_rho_e = self
            .rho_e_history
            .store_and_blend_delta(&delta_rho_e, stage)?;

        let mut rho = rho_old.clone();
        rho.axpy(-dt, &delta_rho);
        let clamped = rho.clamp_min(0.0);
        self.monitor.record_density(clamped);

        let mut rho_u = rho_u_old;
        rho_u.axpy(-dt, &delta_rho_u);
        let solution_ds = mesh.solution_ds();
        rho_u.apply(|m| m.component_mul(&solution_ds));

        let mut rho_e = rho_e_old;
        rho_e.axpy(-dt, &delta_rho_e);

        if let Some(reaction) = self.reaction.as_mut() {
            let ctx = SpeciesAdvection {
                mesh,
                stage,
                dt,
                rho_old: &rho_old,
                rho: &rho,
                rho_phi: &self.state.fluxes.rho_phi,
                flux_engine: &self.flux_engine,
            };
            let (composition, y) = self.thermo.composition_and_mass_fractions_mut();
            let clamped = reaction.advance_explicit(&ctx, composition, y)?;
            self.monitor.record_species(clamped);
        }

        self.state.rho = rho;
        self.state.rho_u = rho_u;
        self.state.rho_e = rho_e;
        Ok(())
    }

    /// Implicit diffusion of momentum, energy and species with chemical sources. Runs only when
    /// a turbulence model is present.
    fn post_update(&mut self, dt: f64) -> Result<(), SystemError> {
        let Some(turbulence) = self.turbulence.as_mut() else {
            return Ok(());
        };
        let mesh = self.mesh;
        self.state.decode(mesh, &mut self.thermo);

        self.corrector.solve_momentum(
            mesh,
            &self.state.rho,
            &mut self.state.U,
            turbulence,
            self.thermo.mu(),
            dt,
        )?;
        self.state.rho_u = self
            .state
            .rho
            .zip_map(&self.state.U, field_names::RHO_U, |rho, u| u * rho);

        let alpha_eff = self.thermo.alpha_eff(turbulence.alphat());
        let mut e_eqn =
            self.corrector
                .energy_equation(mesh, &self.state.rho, self.thermo.e(), &alpha_eff, dt);

        if let Some(reaction) = self.reaction.as_mut() {
            info!("Solving reactions");
            reaction.correct_combustion(&CombustionInput {
                mesh,
                rho: &self.state.rho,
                T: self.thermo.T(),
                Y: self.thermo.Y(),
                turbulent_viscosity: turbulence.mut_field(),
            })?;
            self.qdot = reaction.qdot(mesh);
            self.qdot.name = field_names::QDOT.to_string();
            e_eqn.subtract_explicit(mesh, &self.qdot);

            let diffusivity = self
                .corrector
                .mass_diffusivity(&turbulence.mu_eff(self.thermo.mu()));
            let ctx = SpeciesCorrection {
                mesh,
                dt,
                rho: &self.state.rho,
                diffusivity: &diffusivity,
                solver: self.corrector.solver(),
            };
            let (composition, y) = self.thermo.composition_and_mass_fractions_mut();
            let clamped = reaction.solve_species(&ctx, composition, y)?;
            self.monitor.record_species(clamped);
        }

        self.corrector
            .solve_energy(mesh, &e_eqn, self.thermo.e_mut())?;
        let kinetic = self.state.U.mag_sqr("magSqrU");
        let total = self.thermo.e().zip_map(&kinetic, "E", |e, k| e + 0.5 * k);
        self.state.rho_e = self
            .state
            .rho
            .zip_map(&total, field_names::RHO_E, |rho, en| rho * en);

        self.thermo.correct(mesh);
        self.thermo.update_pressure(mesh, &self.state.rho);
        self.state.rho.boundary = self.thermo.boundary_density();

        turbulence.correct(&TurbulenceInput {
            mesh,
            rho: &self.state.rho,
            U: &self.state.U,
            rho_phi: &self.state.fluxes.rho_phi,
            mu: self.thermo.mu(),
        });
        Ok(())
    }

    fn clear_ode_fields(&mut self) {
        self.flux_engine.clear();
        self.rho_history.clear();
        self.rho_u_history.clear();
        self.rho_e_history.clear();
        if let Some(reaction) = self.reaction.as_mut() {
            reaction.clear();
        }
        self.monitor.end_step();
    }
}
