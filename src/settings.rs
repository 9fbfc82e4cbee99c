//! # Settings Module
//!
//! ## Purpose
//! Case description for a compressible reacting flow run, read from JSON. Turns the
//! description into the mesh, the primitive initial state and the runtime-selected models the
//! `ReactingCompressibleSystem` is built from.
//!
//! ## Key Features
//! - **Tagged model selection**: thermo, turbulence, radiation and linear solver are tagged enums
//! - **Optional collaborators**: no turbulence, no combustion, no radiation are all valid
//! - **Boundary patches**: a value given on a patch becomes a fixed value, anything else is
//!   zero gradient
//! - **Initial regions**: axis-aligned boxes overriding the uniform initial state
//! - **Inert complement**: the inert specie's initial fraction defaults to `1 - Σ others`
//!
//! ## Usage Pattern
//! ```rust, ignore
//! let settings = SystemSettings::from_file(Path::new("sod.json"))?;
//! let mesh = settings.build_mesh()?;
//! let g = settings.gravity();
//! let mut system = settings.build_system(&mesh, &g)?;
//! ```
#![allow(non_snake_case)]

use crate::CompressibleSystem::SystemError;
use crate::CompressibleSystem::integration_system::IntegrationScheme;
use crate::CompressibleSystem::primitive_closure::PrimitiveClosure;
use crate::CompressibleSystem::reacting_system::{ReactingCompressibleSystem, SystemModels};
use crate::FluxSchemes::flux_scheme::{FluxSchemeEnum, Hll, Rusanov};
use crate::Kinetics::combustion_model::LaminarFiniteRate;
use crate::Kinetics::reaction_parser::ElementaryReaction;
use crate::Radiation::radiation_model::{NoRadiation, OpticallyThinGrey, RadiationEnum};
use crate::Thermodynamics::composition::Composition;
use crate::Thermodynamics::perfect_gas::{CaloricallyPerfectGas, PerfectGasMixture, SpecieThermo};
use crate::Thermodynamics::thermo_closure::{ThermoClosureEnum, ThermodynamicClosure, TransportModel};
use crate::Turbulence::turbulence_model::{ConstantEddyViscosity, Laminar, TurbulenceEnum};
use crate::fv::fields::{BoundaryCondition, FieldValue, VolField};
use crate::fv::linear_solver::{DirectLu, GaussSeidel, LinearSolverEnum};
use crate::fv::mesh::FvMesh;
use log::info;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed settings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid settings: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ThermoSettings {
    CaloricallyPerfectGas {
        specie: String,
        W: f64,
        cv: f64,
        transport: TransportModel,
    },
    PerfectGasMixture {
        species: Vec<SpecieThermo>,
        transport: TransportModel,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FluxSchemeSettings {
    Rusanov,
    #[default]
    Hll,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TurbulenceSettings {
    Laminar,
    ConstantEddyViscosity { nut: f64, Prt: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombustionSettings {
    pub reactions: Vec<ElementaryReaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RadiationSettings {
    None,
    OpticallyThinGrey { absorption: f64, T_ambient: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LinearSolverSettings {
    DirectLu,
    GaussSeidel {
        tolerance: f64,
        max_iterations: usize,
        #[serde(default)]
        strict: bool,
    },
}

impl Default for LinearSolverSettings {
    fn default() -> Self {
        let gs = GaussSeidel::default();
        LinearSolverSettings::GaussSeidel {
            tolerance: gs.tolerance,
            max_iterations: gs.max_iterations,
            strict: gs.strict,
        }
    }
}

/// structured block mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshSettings {
    pub divisions: [usize; 3],
    pub lengths: [f64; 3],
    #[serde(default)]
    pub periodic: [bool; 3],
}

/// Values fixed on one patch; absent values are zero gradient.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PatchSettings {
    pub U: Option<[f64; 3]>,
    pub p: Option<f64>,
    pub T: Option<f64>,
    #[serde(default)]
    pub Y: HashMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialSettings {
    #[serde(default)]
    pub U: [f64; 3],
    pub p: f64,
    pub T: f64,
    #[serde(default)]
    pub Y: HashMap<String, f64>,
    /// applied in order, later boxes win
    #[serde(default)]
    pub regions: Vec<RegionSettings>,
}

/// box of cells whose centres lie in `[min, max]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSettings {
    pub min: [f64; 3],
    pub max: [f64; 3],
    pub U: Option<[f64; 3]>,
    pub p: Option<f64>,
    pub T: Option<f64>,
    #[serde(default)]
    pub Y: HashMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSettings {
    pub end_time: f64,
    pub cfl: f64,
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

fn default_max_steps() -> usize {
    100_000
}
fn default_schmidt_number() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSettings {
    pub mesh: MeshSettings,
    #[serde(default)]
    pub integration: IntegrationScheme,
    pub run: RunSettings,
    pub thermo: ThermoSettings,
    /// required for mixtures of more than one specie
    #[serde(default)]
    pub inert_specie: Option<String>,
    #[serde(default)]
    pub inactive_species: Vec<String>,
    #[serde(default)]
    pub flux_scheme: FluxSchemeSettings,
    #[serde(default)]
    pub turbulence: Option<TurbulenceSettings>,
    #[serde(default)]
    pub combustion: Option<CombustionSettings>,
    #[serde(default)]
    pub radiation: Option<RadiationSettings>,
    #[serde(default)]
    pub linear_solver: LinearSolverSettings,
    #[serde(default = "default_schmidt_number")]
    pub schmidt_number: f64,
    #[serde(default)]
    pub gravity: [f64; 3],
    #[serde(default)]
    pub boundary: HashMap<String, PatchSettings>,
    pub initial: InitialSettings,
}

fn check_positive(what: &str, value: f64) -> Result<(), SettingsError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SettingsError::Invalid(format!(
            "{} must be positive, got {}",
            what, value
        )))
    }
}

impl SystemSettings {
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: SystemSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        info!("Reading case settings from {}", path.display());
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn species_names(&self) -> Vec<String> {
        match &self.thermo {
            ThermoSettings::CaloricallyPerfectGas { specie, .. } => vec![specie.clone()],
            ThermoSettings::PerfectGasMixture { species, .. } => {
                species.iter().map(|s| s.name.clone()).collect()
            }
        }
    }

    /// checks everything that does not need the mesh or the closures
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_positive("end_time", self.run.end_time)?;
        check_positive("cfl", self.run.cfl)?;
        check_positive("schmidt_number", self.schmidt_number)?;
        check_positive("initial p", self.initial.p)?;
        check_positive("initial T", self.initial.T)?;
        let species = self.species_names();
        let known = |name: &str, context: &str| -> Result<(), SettingsError> {
            if species.iter().any(|s| s == name) {
                Ok(())
            } else {
                Err(SettingsError::Invalid(format!(
                    "unknown specie '{}' in {}",
                    name, context
                )))
            }
        };
        if let Some(inert) = &self.inert_specie {
            known(inert, "inert_specie")?;
        }
        for name in &self.inactive_species {
            known(name, "inactive_species")?;
        }
        for name in self.initial.Y.keys() {
            known(name, "initial")?;
        }
        for region in &self.initial.regions {
            for name in region.Y.keys() {
                known(name, "initial region")?;
            }
        }
        for (patch, values) in &self.boundary {
            for name in values.Y.keys() {
                known(name, &format!("boundary patch {}", patch))?;
            }
        }
        if let Some(TurbulenceSettings::ConstantEddyViscosity { nut, Prt }) = &self.turbulence {
            if *nut < 0.0 {
                return Err(SettingsError::Invalid(format!("nut must not be negative, got {}", nut)));
            }
            check_positive("Prt", *Prt)?;
        }
        if let LinearSolverSettings::GaussSeidel { tolerance, max_iterations, .. } = &self.linear_solver {
            check_positive("solver tolerance", *tolerance)?;
            if *max_iterations == 0 {
                return Err(SettingsError::Invalid("max_iterations must be at least 1".to_string()));
            }
        }
        Ok(())
    }

    pub fn gravity(&self) -> Vector3<f64> {
        Vector3::from(self.gravity)
    }

    pub fn build_mesh(&self) -> Result<FvMesh, SystemError> {
        let mesh = FvMesh::cartesian(self.mesh.divisions, self.mesh.lengths, self.mesh.periodic)?;
        for patch in self.boundary.keys() {
            if mesh.patch_index(patch).is_none() {
                return Err(SettingsError::Invalid(format!("mesh has no patch '{}'", patch)).into());
            }
        }
        Ok(mesh)
    }

    pub fn build_composition(&self) -> Result<Composition, SystemError> {
        let mut composition = Composition::new(self.species_names(), self.inert_specie.as_deref())?;
        for name in &self.inactive_species {
            composition.set_active(name, false)?;
        }
        Ok(composition)
    }

    pub fn build_closure(&self) -> Result<ThermoClosureEnum, SystemError> {
        let closure = match &self.thermo {
            ThermoSettings::CaloricallyPerfectGas {
                specie,
                W,
                cv,
                transport,
            } => CaloricallyPerfectGas::new(specie, *W, *cv, transport.clone())?.into(),
            ThermoSettings::PerfectGasMixture { species, transport } => {
                PerfectGasMixture::new(species.clone(), transport.clone())?.into()
            }
        };
        Ok(closure)
    }

    pub fn build_thermo(
        &self,
        mesh: &FvMesh,
        initial: InitialConditions,
    ) -> Result<PrimitiveClosure, SystemError> {
        PrimitiveClosure::new(
            mesh,
            self.build_closure()?,
            self.build_composition()?,
            initial.p,
            initial.T,
            initial.Y,
        )
    }

    /// Models as configured. Turbulence closures that depend on the flow are initialised
    /// from `thermo`.
    pub fn build_models(
        &self,
        mesh: &FvMesh,
        thermo: &PrimitiveClosure,
    ) -> Result<SystemModels, SystemError> {
        let flux_scheme = match self.flux_scheme {
            FluxSchemeSettings::Rusanov => FluxSchemeEnum::Rusanov(Rusanov),
            FluxSchemeSettings::Hll => FluxSchemeEnum::Hll(Hll),
        };
        let turbulence: Option<TurbulenceEnum> = self.turbulence.as_ref().map(|t| match t {
            TurbulenceSettings::Laminar => Laminar::new(mesh).into(),
            TurbulenceSettings::ConstantEddyViscosity { nut, Prt } => {
                ConstantEddyViscosity::new(mesh, thermo.rho(), *nut, *Prt).into()
            }
        });
        let combustion = match &self.combustion {
            Some(settings) => Some(
                LaminarFiniteRate::new(
                    settings.reactions.clone(),
                    thermo.composition().species(),
                    &thermo.closure().molar_masses(),
                )?
                .into(),
            ),
            None => None,
        };
        let radiation: Option<RadiationEnum> = self.radiation.as_ref().map(|r| match r {
            RadiationSettings::None => NoRadiation.into(),
            RadiationSettings::OpticallyThinGrey {
                absorption,
                T_ambient,
            } => OpticallyThinGrey::new(*absorption, *T_ambient).into(),
        });
        let linear_solver: LinearSolverEnum = match &self.linear_solver {
            LinearSolverSettings::DirectLu => DirectLu.into(),
            LinearSolverSettings::GaussSeidel {
                tolerance,
                max_iterations,
                strict,
            } => GaussSeidel {
                tolerance: *tolerance,
                max_iterations: *max_iterations,
                strict: *strict,
            }
            .into(),
        };
        Ok(SystemModels {
            flux_scheme,
            turbulence,
            combustion,
            radiation,
            linear_solver,
            schmidt_number: self.schmidt_number,
        })
    }

    pub fn build_system<'a>(
        &self,
        mesh: &'a FvMesh,
        g: &'a Vector3<f64>,
    ) -> Result<ReactingCompressibleSystem<'a>, SystemError> {
        let initial = InitialConditions::from_settings(self, mesh)?;
        let U = initial.U.clone();
        let thermo = self.build_thermo(mesh, initial)?;
        let models = self.build_models(mesh, &thermo)?;
        ReactingCompressibleSystem::new(mesh, g, thermo, U, models)
    }
}

/// Primitive initial fields with their boundary conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialConditions {
    pub U: VolField<Vector3<f64>>,
    pub p: VolField<f64>,
    pub T: VolField<f64>,
    pub Y: Vec<VolField<f64>>,
}

fn in_region(region: &RegionSettings, centre: &Vector3<f64>) -> bool {
    (0..3).all(|d| centre[d] >= region.min[d] && centre[d] <= region.max[d])
}

/// Mass fractions with the inert specie filled in as the complement when it is not given.
fn complete_fractions(
    given: &HashMap<String, f64>,
    species: &[String],
    inert: usize,
) -> Vec<f64> {
    let mut y: Vec<f64> = species
        .iter()
        .map(|s| given.get(s).copied().unwrap_or(0.0))
        .collect();
    if !given.contains_key(&species[inert]) {
        let others: f64 = y
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != inert)
            .map(|(_, v)| v)
            .sum();
        y[inert] = (1.0 - others).max(0.0);
    }
    y
}

fn patch_conditions<T: FieldValue>(
    mesh: &FvMesh,
    boundary: &HashMap<String, PatchSettings>,
    value: impl Fn(&PatchSettings) -> Option<T>,
) -> Vec<BoundaryCondition<T>> {
    mesh.patches
        .iter()
        .map(|patch| match boundary.get(&patch.name).and_then(&value) {
            Some(v) => BoundaryCondition::FixedValue(v),
            None => BoundaryCondition::ZeroGradient,
        })
        .collect()
}

impl InitialConditions {
    pub fn from_settings(settings: &SystemSettings, mesh: &FvMesh) -> Result<Self, SystemError> {
        let composition = settings.build_composition()?;
        let species = composition.species();
        let inert = composition.inert_index();
        let initial = &settings.initial;
        let n = mesh.n_cells();

        let mut u = vec![Vector3::from(initial.U); n];
        let mut p = vec![initial.p; n];
        let mut t = vec![initial.T; n];
        let uniform_y = complete_fractions(&initial.Y, species, inert);
        let mut y: Vec<Vec<f64>> = uniform_y.iter().map(|&v| vec![v; n]).collect();

        for region in &initial.regions {
            let region_y = if region.Y.is_empty() {
                None
            } else {
                Some(complete_fractions(&region.Y, species, inert))
            };
            for c in 0..n {
                if !in_region(region, &mesh.centres[c]) {
                    continue;
                }
                if let Some(value) = region.U {
                    u[c] = Vector3::from(value);
                }
                if let Some(value) = region.p {
                    p[c] = value;
                }
                if let Some(value) = region.T {
                    t[c] = value;
                }
                if let Some(values) = &region_y {
                    for (yi, v) in y.iter_mut().zip(values) {
                        yi[c] = *v;
                    }
                }
            }
        }

        let boundary = &settings.boundary;
        let U = VolField::from_internal(
            "U",
            mesh,
            u,
            patch_conditions(mesh, boundary, |s| s.U.map(Vector3::from)),
        )?;
        let p = VolField::from_internal("p", mesh, p, patch_conditions(mesh, boundary, |s| s.p))?;
        let T = VolField::from_internal("T", mesh, t, patch_conditions(mesh, boundary, |s| s.T))?;
        let mut Y = Vec::with_capacity(species.len());
        for (i, (name, values)) in species.iter().zip(y).enumerate() {
            let conditions = patch_conditions(mesh, boundary, |s| {
                if s.Y.is_empty() {
                    None
                } else {
                    Some(complete_fractions(&s.Y, species, inert)[i])
                }
            });
            Y.push(VolField::from_internal(name, mesh, values, conditions)?);
        }
        Ok(InitialConditions { U, p, T, Y })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompressibleSystem::integration_system::TimeIntegrator;
    use approx::assert_relative_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const REACTING_BOX: &str = r#"{
        "mesh": { "divisions": [4, 1, 1], "lengths": [1.0, 0.1, 0.1], "periodic": [true, false, false] },
        "integration": "SspRk2",
        "run": { "end_time": 1e-4, "cfl": 0.5 },
        "thermo": {
            "type": "PerfectGasMixture",
            "species": [
                { "name": "F", "W": 2.0, "cv": 10000.0 },
                { "name": "O", "W": 32.0, "cv": 650.0 },
                { "name": "P", "W": 34.0, "cv": 700.0 },
                { "name": "N2", "W": 28.0, "cv": 740.0 }
            ],
            "transport": { "Constant": { "mu": 1.8e-5, "Pr": 0.7 } }
        },
        "inert_specie": "N2",
        "combustion": { "reactions": [ { "eq": "F + O => P", "A": 1000.0, "n": 0.0, "E": 0.0, "Q": 2e8 } ] },
        "linear_solver": { "type": "DirectLu" },
        "initial": { "p": 1e5, "T": 300.0, "Y": { "F": 0.05, "O": 0.4 } }
    }"#;

    const SOD: &str = r#"{
        "mesh": { "divisions": [10, 1, 1], "lengths": [1.0, 0.1, 0.1] },
        "run": { "end_time": 2e-4, "cfl": 0.5 },
        "thermo": {
            "type": "CaloricallyPerfectGas", "specie": "air", "W": 28.96, "cv": 718.0,
            "transport": { "Constant": { "mu": 0.0, "Pr": 0.7 } }
        },
        "flux_scheme": "Rusanov",
        "boundary": { "xMin": { "T": 348.0 } },
        "initial": {
            "p": 1e4, "T": 278.0,
            "regions": [ { "min": [0.0, 0.0, 0.0], "max": [0.5, 1.0, 1.0], "p": 1e5, "T": 348.0 } ]
        }
    }"#;

    #[test]
    fn test_defaults_and_inert_complement() {
        let settings = SystemSettings::from_json_str(REACTING_BOX).unwrap();
        assert_eq!(settings.integration, IntegrationScheme::SspRk2);
        assert_eq!(settings.flux_scheme, FluxSchemeSettings::Hll);
        assert_eq!(settings.schmidt_number, 1.0);
        assert_eq!(settings.run.max_steps, 100_000);
        assert!(settings.radiation.is_none());
        let mesh = settings.build_mesh().unwrap();
        let initial = InitialConditions::from_settings(&settings, &mesh).unwrap();
        assert_relative_eq!(initial.Y[3].internal[0], 0.55, epsilon = 1e-15);
        assert_eq!(initial.Y[2].internal[0], 0.0);
    }

    #[test]
    fn test_regions_and_patches() {
        let settings = SystemSettings::from_json_str(SOD).unwrap();
        let mesh = settings.build_mesh().unwrap();
        let initial = InitialConditions::from_settings(&settings, &mesh).unwrap();
        assert_eq!(initial.p.internal[0], 1e5);
        assert_eq!(initial.p.internal[9], 1e4);
        let x_min = mesh.patch_index("xMin").unwrap();
        assert_eq!(initial.T.conditions[x_min], BoundaryCondition::FixedValue(348.0));
        assert_eq!(
            initial.T.conditions[mesh.patch_index("xMax").unwrap()],
            BoundaryCondition::ZeroGradient
        );
        assert_eq!(initial.p.conditions[x_min], BoundaryCondition::ZeroGradient);
    }

    #[test]
    fn test_from_file_builds_a_running_system() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(REACTING_BOX.as_bytes()).unwrap();
        let settings = SystemSettings::from_file(file.path()).unwrap();
        let mesh = settings.build_mesh().unwrap();
        let g = settings.gravity();
        let mut system = settings.build_system(&mesh, &g).unwrap();
        assert!(system.reaction().is_some());
        let integrator = TimeIntegrator::new(settings.integration);
        integrator.advance(&mut system, 1e-6).unwrap();
        assert!(system.qdot().internal[0] > 0.0);
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let unknown = REACTING_BOX.replace("\"inert_specie\": \"N2\"", "\"inert_specie\": \"Ar\"");
        assert!(matches!(
            SystemSettings::from_json_str(&unknown),
            Err(SettingsError::Invalid(_))
        ));
        let no_inert = REACTING_BOX.replace("\"inert_specie\": \"N2\",", "");
        let settings = SystemSettings::from_json_str(&no_inert).unwrap();
        assert!(settings.build_composition().is_err());
        let bad_patch = SOD.replace("xMin", "inlet");
        let settings = SystemSettings::from_json_str(&bad_patch).unwrap();
        assert!(settings.build_mesh().is_err());
        assert!(matches!(
            SystemSettings::from_json_str("{ \"mesh\": 1 }"),
            Err(SettingsError::Json(_))
        ));
        assert!(matches!(
            SystemSettings::from_file(Path::new("/nonexistent/case.json")),
            Err(SettingsError::Io(_))
        ));
    }
}
