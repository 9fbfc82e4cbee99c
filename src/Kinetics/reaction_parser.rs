use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// J/(mol K), activation energies are given in J/mol
pub const R_G: f64 = 8.314;

#[derive(Debug, Error)]
pub enum KineticsError {
    #[error("Malformed reaction equation '{0}'")]
    MalformedEquation(String),
    #[error("Unknown specie '{specie}' in reaction '{eq}'")]
    UnknownSpecie { specie: String, eq: String },
    #[error(
        "Reaction '{eq}' is not mass balanced: reactants {reactants} kg/kmol, products {products} kg/kmol"
    )]
    Unbalanced {
        eq: String,
        reactants: f64,
        products: f64,
    },
    #[error("Invalid kinetic data for '{eq}': {reason}")]
    InvalidData { eq: String, reason: String },
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// Arrhenius data of one irreversible reaction.
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementaryReaction {
    pub eq: String,
    /// pre-exponential factor, (kmol/m3)^(1 - order)/s
    pub A: f64,
    /// temperature exponent
    pub n: f64,
    /// activation energy, J/mol
    pub E: f64,
    /// heat released per kmol of reaction progress, J/kmol
    pub Q: f64,
}

impl ElementaryReaction {
    /// k = A T^n exp(-E/(R T))
    pub fn rate_constant(&self, t: f64) -> f64 {
        self.A * t.powf(self.n) * (-self.E / (R_G * t)).exp()
    }
}

/// reaction resolved against the species list: (specie index, stoichiometric coefficient)
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReaction {
    pub data: ElementaryReaction,
    pub reactants: Vec<(usize, f64)>,
    pub products: Vec<(usize, f64)>,
}

impl ParsedReaction {
    pub fn new(
        data: ElementaryReaction,
        species: &[String],
        molar_masses: &[f64],
    ) -> Result<Self, KineticsError> {
        if !(data.A >= 0.0) || !data.n.is_finite() || !data.E.is_finite() || !data.Q.is_finite() {
            return Err(KineticsError::InvalidData {
                eq: data.eq.clone(),
                reason: format!("A = {}, n = {}, E = {}, Q = {}", data.A, data.n, data.E, data.Q),
            });
        }
        let arrow = Regex::new(r"^\s*(.+?)\s*(?:=>|->|=)\s*(.+?)\s*$")?;
        let term = Regex::new(r"^\s*(\d+(?:\.\d+)?)?\s*\*?\s*([A-Za-z][A-Za-z0-9_()]*)\s*$")?;
        let caps = arrow
            .captures(&data.eq)
            .ok_or_else(|| KineticsError::MalformedEquation(data.eq.clone()))?;
        let parse_side = |side: &str| -> Result<Vec<(usize, f64)>, KineticsError> {
            let mut terms: Vec<(usize, f64)> = Vec::new();
            for token in side.split('+') {
                let t = term
                    .captures(token)
                    .ok_or_else(|| KineticsError::MalformedEquation(data.eq.clone()))?;
                let coefficient = match t.get(1) {
                    Some(m) => m
                        .as_str()
                        .parse::<f64>()
                        .map_err(|_| KineticsError::MalformedEquation(data.eq.clone()))?,
                    None => 1.0,
                };
                let name = &t[2];
                let index = species.iter().position(|s| s == name).ok_or_else(|| {
                    KineticsError::UnknownSpecie {
                        specie: name.to_string(),
                        eq: data.eq.clone(),
                    }
                })?;
                // "A + A" is the same as "2 A"
                match terms.iter_mut().find(|(i, _)| *i == index) {
                    Some((_, nu)) => *nu += coefficient,
                    None => terms.push((index, coefficient)),
                }
            }
            Ok(terms)
        };
        let reactants = parse_side(&caps[1])?;
        let products = parse_side(&caps[2])?;

        let mass = |side: &[(usize, f64)]| side.iter().map(|&(i, nu)| nu * molar_masses[i]).sum::<f64>();
        let (m_r, m_p) = (mass(&reactants), mass(&products));
        if (m_r - m_p).abs() > 1e-6 * m_r.max(m_p) {
            return Err(KineticsError::Unbalanced {
                eq: data.eq.clone(),
                reactants: m_r,
                products: m_p,
            });
        }
        Ok(ParsedReaction {
            data,
            reactants,
            products,
        })
    }

    /// Reaction progress rate, kmol/(m3 s), from molar concentrations in kmol/m3.
    pub fn rate(&self, t: f64, concentrations: &[f64]) -> f64 {
        let k = self.data.rate_constant(t);
        self.reactants
            .iter()
            .fold(k, |r, &(i, nu)| r * concentrations[i].max(0.0).powf(nu))
    }
}
