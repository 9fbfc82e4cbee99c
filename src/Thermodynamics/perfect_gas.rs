use super::thermo_closure::{R_UNIVERSAL, ThermoError, ThermodynamicClosure, TransportModel};
use serde::{Deserialize, Serialize};

fn check_positive(name: &str, what: &str, value: f64) -> Result<(), ThermoError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ThermoError::InvalidData {
            name: name.to_string(),
            reason: format!("{} must be positive, got {}", what, value),
        })
    }
}

/// single gas with constant heat capacities
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaloricallyPerfectGas {
    pub specie: String,
    /// kg/kmol
    pub W: f64,
    /// J/(kg K)
    pub cv: f64,
    pub transport: TransportModel,
}

impl CaloricallyPerfectGas {
    #[allow(non_snake_case)]
    pub fn new(
        specie: &str,
        W: f64,
        cv: f64,
        transport: TransportModel,
    ) -> Result<Self, ThermoError> {
        check_positive(specie, "molar mass", W)?;
        check_positive(specie, "cv", cv)?;
        transport.validate(specie)?;
        Ok(CaloricallyPerfectGas {
            specie: specie.to_string(),
            W,
            cv,
            transport,
        })
    }
}

impl ThermodynamicClosure for CaloricallyPerfectGas {
    fn name(&self) -> &str {
        "caloricallyPerfectGas"
    }
    fn species_names(&self) -> Vec<String> {
        vec![self.specie.clone()]
    }
    fn molar_masses(&self) -> Vec<f64> {
        vec![self.W]
    }
    fn cv(&self, _y: &[f64]) -> f64 {
        self.cv
    }
    fn gas_constant(&self, _y: &[f64]) -> f64 {
        R_UNIVERSAL / self.W
    }
    fn mu(&self, t: f64, _y: &[f64]) -> f64 {
        self.transport.mu(t)
    }
    fn kappa(&self, t: f64, y: &[f64]) -> f64 {
        self.transport.kappa(t, self.cp(y))
    }
}

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecieThermo {
    pub name: String,
    pub W: f64,
    pub cv: f64,
}

/// Ideal mixture of perfect gases: mass-weighted cv, R = R_u Σ Y_i/W_i.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerfectGasMixture {
    pub species: Vec<SpecieThermo>,
    pub transport: TransportModel,
}

impl PerfectGasMixture {
    pub fn new(species: Vec<SpecieThermo>, transport: TransportModel) -> Result<Self, ThermoError> {
        if species.is_empty() {
            return Err(ThermoError::EmptyComposition);
        }
        for s in &species {
            check_positive(&s.name, "molar mass", s.W)?;
            check_positive(&s.name, "cv", s.cv)?;
        }
        transport.validate("mixture")?;
        Ok(PerfectGasMixture { species, transport })
    }
}

impl ThermodynamicClosure for PerfectGasMixture {
    fn name(&self) -> &str {
        "perfectGasMixture"
    }
    fn species_names(&self) -> Vec<String> {
        self.species.iter().map(|s| s.name.clone()).collect()
    }
    fn molar_masses(&self) -> Vec<f64> {
        self.species.iter().map(|s| s.W).collect()
    }
    fn cv(&self, y: &[f64]) -> f64 {
        self.species.iter().zip(y).map(|(s, yi)| yi * s.cv).sum()
    }
    fn gas_constant(&self, y: &[f64]) -> f64 {
        R_UNIVERSAL * self.species.iter().zip(y).map(|(s, yi)| yi / s.W).sum::<f64>()
    }
    fn mu(&self, t: f64, _y: &[f64]) -> f64 {
        self.transport.mu(t)
    }
    fn kappa(&self, t: f64, y: &[f64]) -> f64 {
        self.transport.kappa(t, self.cp(y))
    }
}
