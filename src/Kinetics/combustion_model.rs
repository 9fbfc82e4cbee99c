use super::reaction_parser::{ElementaryReaction, KineticsError, ParsedReaction};
use crate::fv::fields::VolField;
use crate::fv::mesh::FvMesh;
use enum_dispatch::enum_dispatch;
use log::debug;

/// below this mass fraction consumption is applied explicitly instead of through Sp
const SMALL_Y: f64 = 1e-12;

/// what a combustion model reads from the flow on `correct`
#[allow(non_snake_case)]
pub struct CombustionInput<'a> {
    pub mesh: &'a FvMesh,
    pub rho: &'a VolField<f64>,
    pub T: &'a VolField<f64>,
    pub Y: &'a [VolField<f64>],
    /// turbulent viscosity of the active turbulence closure
    pub turbulent_viscosity: &'a VolField<f64>,
}

/// Linearised mass source of one specie, kg/(m3 s): `Su + Sp*Y`, with `Sp <= 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImplicitSource {
    pub su: Vec<f64>,
    pub sp: Vec<f64>,
}

impl ImplicitSource {
    pub fn zero(n_cells: usize) -> Self {
        ImplicitSource {
            su: vec![0.0; n_cells],
            sp: vec![0.0; n_cells],
        }
    }
}

#[enum_dispatch]
pub trait CombustionModel {
    fn name(&self) -> &str;
    /// re-evaluates reaction rates on the current state
    fn correct(&mut self, input: &CombustionInput) -> Result<(), KineticsError>;
    /// heat release rate, W/m3
    fn qdot(&self, mesh: &FvMesh) -> VolField<f64>;
    /// reaction source of specie `i` linearised around its current mass fraction `y`
    fn reaction_source(&self, i: usize, y: &VolField<f64>) -> ImplicitSource;
}

/// inert flow
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NoCombustion;

impl CombustionModel for NoCombustion {
    fn name(&self) -> &str {
        "none"
    }
    fn correct(&mut self, _input: &CombustionInput) -> Result<(), KineticsError> {
        Ok(())
    }
    fn qdot(&self, mesh: &FvMesh) -> VolField<f64> {
        VolField::calculated("Qdot", mesh, 0.0)
    }
    fn reaction_source(&self, _i: usize, y: &VolField<f64>) -> ImplicitSource {
        ImplicitSource::zero(y.internal.len())
    }
}

/// Finite-rate chemistry evaluated with cell-mean values, no turbulence-chemistry interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct LaminarFiniteRate {
    pub reactions: Vec<ParsedReaction>,
    molar_masses: Vec<f64>,
    heat_release: Vec<f64>,
    /// per specie, per cell, kg/(m3 s)
    production: Vec<Vec<f64>>,
    consumption: Vec<Vec<f64>>,
}

impl LaminarFiniteRate {
    pub fn new(
        reactions: Vec<ElementaryReaction>,
        species: &[String],
        molar_masses: &[f64],
    ) -> Result<Self, KineticsError> {
        let reactions = reactions
            .into_iter()
            .map(|r| ParsedReaction::new(r, species, molar_masses))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(LaminarFiniteRate {
            reactions,
            molar_masses: molar_masses.to_vec(),
            heat_release: Vec::new(),
            production: vec![Vec::new(); species.len()],
            consumption: vec![Vec::new(); species.len()],
        })
    }
}

impl CombustionModel for LaminarFiniteRate {
    fn name(&self) -> &str {
        "laminar"
    }

    fn correct(&mut self, input: &CombustionInput) -> Result<(), KineticsError> {
        let n_cells = input.mesh.n_cells();
        let n_species = self.molar_masses.len();
        self.heat_release = vec![0.0; n_cells];
        self.production = vec![vec![0.0; n_cells]; n_species];
        self.consumption = vec![vec![0.0; n_cells]; n_species];
        let mut concentrations = vec![0.0; n_species];
        for c in 0..n_cells {
            let rho = input.rho.internal[c];
            for (i, conc) in concentrations.iter_mut().enumerate() {
                *conc = (rho * input.Y[i].internal[c] / self.molar_masses[i]).max(0.0);
            }
            let t = input.T.internal[c];
            for reaction in &self.reactions {
                let r = reaction.rate(t, &concentrations);
                self.heat_release[c] += reaction.data.Q * r;
                for &(i, nu) in &reaction.reactants {
                    self.consumption[i][c] += nu * self.molar_masses[i] * r;
                }
                for &(i, nu) in &reaction.products {
                    self.production[i][c] += nu * self.molar_masses[i] * r;
                }
            }
        }
        debug!(
            "laminar combustion: max heat release {:e} W/m3",
            self.heat_release.iter().cloned().fold(0.0, f64::max)
        );
        Ok(())
    }

    fn qdot(&self, mesh: &FvMesh) -> VolField<f64> {
        if self.heat_release.len() != mesh.n_cells() {
            return VolField::calculated("Qdot", mesh, 0.0);
        }
        VolField::calculated_from_internal("Qdot", mesh, self.heat_release.clone())
    }

    fn reaction_source(&self, i: usize, y: &VolField<f64>) -> ImplicitSource {
        let n_cells = y.internal.len();
        if self.production[i].len() != n_cells {
            return ImplicitSource::zero(n_cells);
        }
        let mut source = ImplicitSource::zero(n_cells);
        for c in 0..n_cells {
            source.su[c] = self.production[i][c];
            let yc = y.internal[c];
            if yc > SMALL_Y {
                source.sp[c] = -self.consumption[i][c] / yc;
            } else {
                source.su[c] -= self.consumption[i][c];
            }
        }
        source
    }
}

#[enum_dispatch(CombustionModel)]
#[derive(Debug, Clone, PartialEq)]
pub enum CombustionModelEnum {
    NoCombustion(NoCombustion),
    LaminarFiniteRate(LaminarFiniteRate),
}
