//! # Compressible reacting system
//!
//! ## Aim
//! Owns the conserved state of a compressible, chemically reacting gas (mass, momentum, total
//! energy, species mass fractions) and advances it in time: explicit conservative flux update
//! blended over the stages of an SSP Runge-Kutta scheme, then an implicit deferred-correction
//! step for viscous, thermal and species diffusion with chemical sources.
//!
//! ## Main Data Structures and Logic
//! - `conserved_state::ConservedStateStore`: rho, rhoU, rhoE and the face fluxes; `decode`/`encode`
//! - `integration_system`: stage coefficients, per-quantity `HistoryBuffer`s of old values and
//!   increments, the `IntegrationSystem` trait and the `TimeIntegrator` that drives it
//! - `primitive_closure::PrimitiveClosure`: p, T, e, Y and transport properties from the closure
//! - `reaction_coupler::ReactionCoupler`: explicit species advection and the implicit
//!   diffusion + reaction correction
//! - `transport_corrector::TransportCorrector`: implicit momentum and energy corrections
//! - `reacting_system::ReactingCompressibleSystem`: sequences all of the above
//!
//! ## Usage
//! ```rust, ignore
//! let g = Vector3::zeros();
//! let mut system = ReactingCompressibleSystem::new(&mesh, &g, thermo, U, SystemModels::default())?;
//! let integrator = TimeIntegrator::new(IntegrationScheme::SspRk3);
//! let dt = system.courant_time_step(0.5)?;
//! integrator.advance(&mut system, dt)?;
//! ```
//!
//! ## Interesting Features
//! - stage weights live entirely in the history buffers, the update formula is the same for 1, 2
//!   or 3 stages
//! - density and mass fractions are floored at zero and the clamps are counted, not raised
//! - a failed implicit solve is propagated untouched; `snapshot`/`restore` plus
//!   `clear_ode_fields` let an outer controller retry the step
pub mod conserved_state;
pub mod integration_system;
pub mod primitive_closure;
pub mod reacting_system;
pub mod reaction_coupler;
pub mod transport_corrector;
/// tests
mod integration_tests;

use crate::Kinetics::reaction_parser::KineticsError;
use crate::Thermodynamics::thermo_closure::ThermoError;
use crate::fv::FvError;
use crate::settings::SettingsError;
use integration_system::IntegrationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SystemError {
    #[error(transparent)]
    Thermo(#[from] ThermoError),
    #[error(transparent)]
    Kinetics(#[from] KineticsError),
    #[error(transparent)]
    Fv(#[from] FvError),
    #[error(transparent)]
    Integration(#[from] IntegrationError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
