use super::thermo_closure::ThermoError;
use prettytable::{Cell, Row, Table};
use regex::Regex;
use std::collections::HashSet;

/// Ordered species of a mixture.
///
/// Exactly one specie is inert: its mass fraction is never transported but recovered as the
/// complement of the others. Inactive species keep their slot and are skipped by transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    species: Vec<String>,
    active: Vec<bool>,
    inert_index: usize,
}

impl Composition {
    /// A single-specie composition needs no inert name, the specie is its own complement.
    pub fn new(species: Vec<String>, inert: Option<&str>) -> Result<Self, ThermoError> {
        if species.is_empty() {
            return Err(ThermoError::EmptyComposition);
        }
        let name_pattern = Regex::new(r"^[A-Za-z][A-Za-z0-9_()]*$")?;
        let mut seen = HashSet::new();
        for name in &species {
            if !name_pattern.is_match(name) {
                return Err(ThermoError::MalformedSpecieName(name.clone()));
            }
            if !seen.insert(name.as_str()) {
                return Err(ThermoError::DuplicateSpecie(name.clone()));
            }
        }
        let inert_index = match inert {
            Some(inert) => species
                .iter()
                .position(|s| s == inert)
                .ok_or_else(|| ThermoError::UnknownInertSpecie(inert.to_string()))?,
            None if species.len() == 1 => 0,
            None => return Err(ThermoError::MissingInertSpecie(species.len())),
        };
        let active = vec![true; species.len()];
        Ok(Composition {
            species,
            active,
            inert_index,
        })
    }

    pub fn species(&self) -> &[String] {
        &self.species
    }
    pub fn len(&self) -> usize {
        self.species.len()
    }
    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.species.iter().position(|s| s == name)
    }
    pub fn inert_index(&self) -> usize {
        self.inert_index
    }
    pub fn inert_specie(&self) -> &str {
        &self.species[self.inert_index]
    }
    pub fn is_active(&self, i: usize) -> bool {
        self.active[i]
    }

    pub fn set_active(&mut self, name: &str, active: bool) -> Result<(), ThermoError> {
        let i = self
            .index_of(name)
            .ok_or_else(|| ThermoError::UnknownSpecie(name.to_string()))?;
        self.active[i] = active;
        Ok(())
    }

    /// indices of the species carried by transport equations: active and not inert
    pub fn transported(&self) -> Vec<usize> {
        (0..self.species.len())
            .filter(|&i| i != self.inert_index && self.active[i])
            .collect()
    }

    pub fn pretty_print(&self) {
        let mut table = Table::new();
        table.add_row(Row::new(vec![
            Cell::new("#"),
            Cell::new("specie"),
            Cell::new("role"),
        ]));
        for (i, name) in self.species.iter().enumerate() {
            let role = if i == self.inert_index {
                "inert"
            } else if self.active[i] {
                "transported"
            } else {
                "inactive"
            };
            table.add_row(Row::new(vec![
                Cell::new(&i.to_string()),
                Cell::new(name),
                Cell::new(role),
            ]));
        }
        table.printstd();
    }
}
