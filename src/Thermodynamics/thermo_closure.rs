use super::perfect_gas::{CaloricallyPerfectGas, PerfectGasMixture};
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// universal gas constant, J/(kmol K); molar masses are in kg/kmol
pub const R_UNIVERSAL: f64 = 8314.462618;

#[derive(Debug, Error)]
pub enum ThermoError {
    #[error("Composition has no species")]
    EmptyComposition,
    #[error("Specie '{0}' is listed more than once")]
    DuplicateSpecie(String),
    #[error("Malformed specie name '{0}'")]
    MalformedSpecieName(String),
    #[error("No inert specie given for a mixture of {0} species")]
    MissingInertSpecie(usize),
    #[error("Inert specie '{0}' is not in the composition")]
    UnknownInertSpecie(String),
    #[error("Unknown specie '{0}'")]
    UnknownSpecie(String),
    #[error("Invalid thermophysical data for '{name}': {reason}")]
    InvalidData { name: String, reason: String },
    #[error("Thermo model species {closure:?} do not match composition {composition:?}")]
    SpeciesMismatch {
        closure: Vec<String>,
        composition: Vec<String>,
    },
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// molecular transport, shared by all closures
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransportModel {
    Constant { mu: f64, Pr: f64 },
    /// mu = As sqrt(T)/(1 + Ts/T)
    Sutherland { As: f64, Ts: f64, Pr: f64 },
}

#[allow(non_snake_case)]
impl TransportModel {
    pub fn mu(&self, t: f64) -> f64 {
        match self {
            TransportModel::Constant { mu, .. } => *mu,
            TransportModel::Sutherland { As, Ts, .. } => As * t.sqrt() / (1.0 + Ts / t),
        }
    }
    /// modified Eucken: kappa = mu cp / Pr
    pub fn kappa(&self, t: f64, cp: f64) -> f64 {
        let pr = match self {
            TransportModel::Constant { Pr, .. } | TransportModel::Sutherland { Pr, .. } => *Pr,
        };
        self.mu(t) * cp / pr
    }
    pub fn validate(&self, name: &str) -> Result<(), ThermoError> {
        let ok = match self {
            TransportModel::Constant { mu, Pr } => *mu >= 0.0 && *Pr > 0.0,
            TransportModel::Sutherland { As, Ts, Pr } => *As >= 0.0 && *Ts >= 0.0 && *Pr > 0.0,
        };
        if ok {
            Ok(())
        } else {
            Err(ThermoError::InvalidData {
                name: name.to_string(),
                reason: format!("bad transport coefficients {:?}", self),
            })
        }
    }
}

/// Equation of state, caloric relation and transport of a gas.
///
/// Point-wise: every method takes the mass fractions `y` of one cell, ordered like
/// `species_names()`. Energies are sensible specific internal energies in J/kg.
#[enum_dispatch]
pub trait ThermodynamicClosure {
    fn name(&self) -> &str;
    fn species_names(&self) -> Vec<String>;
    /// kg/kmol
    fn molar_masses(&self) -> Vec<f64>;
    /// J/(kg K)
    fn cv(&self, y: &[f64]) -> f64;
    /// specific gas constant, J/(kg K)
    fn gas_constant(&self, y: &[f64]) -> f64;
    fn cp(&self, y: &[f64]) -> f64 {
        self.cv(y) + self.gas_constant(y)
    }
    fn internal_energy(&self, t: f64, y: &[f64]) -> f64 {
        self.cv(y) * t
    }
    fn temperature(&self, e: f64, y: &[f64]) -> f64 {
        e / self.cv(y)
    }
    /// compressibility d(rho)/dp at constant temperature, 1/(R T) for a perfect gas
    fn psi(&self, t: f64, y: &[f64]) -> f64 {
        1.0 / (self.gas_constant(y) * t)
    }
    fn mu(&self, t: f64, y: &[f64]) -> f64;
    fn kappa(&self, t: f64, y: &[f64]) -> f64;
}

#[enum_dispatch(ThermodynamicClosure)]
#[derive(Debug, Clone, PartialEq)]
pub enum ThermoClosureEnum {
    CaloricallyPerfectGas(CaloricallyPerfectGas),
    PerfectGasMixture(PerfectGasMixture),
}
