use super::SystemError;
use crate::Thermodynamics::composition::Composition;
use crate::Thermodynamics::thermo_closure::{ThermoClosureEnum, ThermoError, ThermodynamicClosure};
use crate::fv::FvError;
use crate::fv::fields::{BoundaryCondition, VolField};
use crate::fv::mesh::FvMesh;

/// Primitive thermodynamic state and the only caller of the thermodynamic closure.
///
/// Holds p, T, e, the mass fractions and the closure-derived properties on cells and boundary
/// faces. The internal energy carries zero-gradient conditions where T does and calculated ones
/// elsewhere, its boundary values following T through the closure.
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveClosure {
    closure: ThermoClosureEnum,
    composition: Composition,
    Y: Vec<VolField<f64>>,
    p: VolField<f64>,
    T: VolField<f64>,
    e: VolField<f64>,
    /// density seen by the closure, assigned on decode
    rho: VolField<f64>,
    psi: VolField<f64>,
    cp: VolField<f64>,
    cv: VolField<f64>,
    mu: VolField<f64>,
    kappa: VolField<f64>,
}

impl PrimitiveClosure {
    #[allow(non_snake_case)]
    pub fn new(
        mesh: &FvMesh,
        closure: ThermoClosureEnum,
        composition: Composition,
        p: VolField<f64>,
        T: VolField<f64>,
        Y: Vec<VolField<f64>>,
    ) -> Result<Self, SystemError> {
        let closure_species = closure.species_names();
        if closure_species.as_slice() != composition.species() {
            return Err(ThermoError::SpeciesMismatch {
                closure: closure_species,
                composition: composition.species().to_vec(),
            }
            .into());
        }
        if Y.len() != composition.len() {
            return Err(FvError::SizeMismatch {
                field: "Y".to_string(),
                expected: composition.len(),
                found: Y.len(),
            }
            .into());
        }
        for field in Y.iter().chain([&p, &T]) {
            if field.internal.len() != mesh.n_cells()
                || field.boundary.len() != mesh.n_boundary_faces()
            {
                return Err(FvError::SizeMismatch {
                    field: field.name.clone(),
                    expected: mesh.n_cells(),
                    found: field.internal.len(),
                }
                .into());
            }
        }
        let e_conditions = T
            .conditions
            .iter()
            .map(|bc| match bc {
                BoundaryCondition::ZeroGradient => BoundaryCondition::ZeroGradient,
                _ => BoundaryCondition::Calculated,
            })
            .collect();
        let mut e = VolField::calculated("e", mesh, 0.0);
        e.conditions = e_conditions;
        let mut thermo = PrimitiveClosure {
            closure,
            composition,
            Y,
            p,
            T,
            e,
            rho: VolField::calculated("thermo:rho", mesh, 0.0),
            psi: VolField::calculated("psi", mesh, 0.0),
            cp: VolField::calculated("Cp", mesh, 0.0),
            cv: VolField::calculated("Cv", mesh, 0.0),
            mu: VolField::calculated("mu", mesh, 0.0),
            kappa: VolField::calculated("kappa", mesh, 0.0),
        };
        let mut y = vec![0.0; thermo.Y.len()];
        for c in 0..mesh.n_cells() {
            thermo.cell_mass_fractions(c, &mut y);
            thermo.e.internal[c] = thermo.closure.internal_energy(thermo.T.internal[c], &y);
        }
        thermo.update_boundary_energy(mesh);
        thermo.correct_properties(mesh);
        thermo.rho = thermo.psi.zip_map(&thermo.p, "thermo:rho", |psi, p| psi * p);
        Ok(thermo)
    }

    fn cell_mass_fractions(&self, c: usize, y: &mut [f64]) {
        for (yi, field) in y.iter_mut().zip(&self.Y) {
            *yi = field.internal[c];
        }
    }

    fn face_mass_fractions(&self, f: usize, y: &mut [f64]) {
        for (yi, field) in y.iter_mut().zip(&self.Y) {
            *yi = field.boundary[f];
        }
    }

    fn update_boundary_energy(&mut self, mesh: &FvMesh) {
        let mut y = vec![0.0; self.Y.len()];
        for f in 0..mesh.n_boundary_faces() {
            self.face_mass_fractions(f, &mut y);
            self.e.boundary[f] = self.closure.internal_energy(self.T.boundary[f], &y);
        }
    }

    fn correct_properties(&mut self, mesh: &FvMesh) {
        let mut y = vec![0.0; self.Y.len()];
        for c in 0..mesh.n_cells() {
            self.cell_mass_fractions(c, &mut y);
            let t = self.T.internal[c];
            self.psi.internal[c] = self.closure.psi(t, &y);
            self.cp.internal[c] = self.closure.cp(&y);
            self.cv.internal[c] = self.closure.cv(&y);
            self.mu.internal[c] = self.closure.mu(t, &y);
            self.kappa.internal[c] = self.closure.kappa(t, &y);
        }
        for f in 0..mesh.n_boundary_faces() {
            self.face_mass_fractions(f, &mut y);
            let t = self.T.boundary[f];
            self.psi.boundary[f] = self.closure.psi(t, &y);
            self.cp.boundary[f] = self.closure.cp(&y);
            self.cv.boundary[f] = self.closure.cv(&y);
            self.mu.boundary[f] = self.closure.mu(t, &y);
            self.kappa.boundary[f] = self.closure.kappa(t, &y);
        }
    }

    /// T from e on the cells, T boundary conditions, e on the boundary from T, then the
    /// compressibility, heat capacities and transport properties.
    pub fn correct(&mut self, mesh: &FvMesh) {
        let mut y = vec![0.0; self.Y.len()];
        for c in 0..mesh.n_cells() {
            self.cell_mass_fractions(c, &mut y);
            self.T.internal[c] = self.closure.temperature(self.e.internal[c], &y);
        }
        self.T.correct_boundary_conditions(mesh);
        self.update_boundary_energy(mesh);
        self.correct_properties(mesh);
    }

    /// p = rho/psi on the cells, then the pressure boundary conditions
    pub fn update_pressure(&mut self, mesh: &FvMesh, rho: &VolField<f64>) {
        for c in 0..mesh.n_cells() {
            self.p.internal[c] = rho.internal[c] / self.psi.internal[c];
        }
        self.p.correct_boundary_conditions(mesh);
    }

    /// closure-consistent boundary density psi_b p_b
    pub fn boundary_density(&self) -> Vec<f64> {
        self.psi
            .boundary
            .iter()
            .zip(&self.p.boundary)
            .map(|(psi, p)| psi * p)
            .collect()
    }

    pub fn set_density(&mut self, rho: &VolField<f64>) {
        self.rho.assign_values(rho);
    }

    /// sqrt(Cp/(Cv psi))
    pub fn speed_of_sound(&self) -> VolField<f64> {
        let gamma = self.cp.zip_map(&self.cv, "gamma", |cp, cv| cp / cv);
        gamma.zip_map(&self.psi, "c", |g, psi| (g / psi).sqrt())
    }

    pub fn closure(&self) -> &ThermoClosureEnum {
        &self.closure
    }
    pub fn composition(&self) -> &Composition {
        &self.composition
    }
    #[allow(non_snake_case)]
    pub fn Y(&self) -> &[VolField<f64>] {
        &self.Y
    }
    /// species transport needs the composition while it rewrites the mass fractions
    pub fn composition_and_mass_fractions_mut(&mut self) -> (&Composition, &mut [VolField<f64>]) {
        (&self.composition, &mut self.Y)
    }
    pub fn p(&self) -> &VolField<f64> {
        &self.p
    }
    #[allow(non_snake_case)]
    pub fn T(&self) -> &VolField<f64> {
        &self.T
    }
    pub fn e(&self) -> &VolField<f64> {
        &self.e
    }
    pub fn e_mut(&mut self) -> &mut VolField<f64> {
        &mut self.e
    }
    pub fn rho(&self) -> &VolField<f64> {
        &self.rho
    }
    pub fn psi(&self) -> &VolField<f64> {
        &self.psi
    }
    pub fn cp(&self) -> &VolField<f64> {
        &self.cp
    }
    pub fn cv(&self) -> &VolField<f64> {
        &self.cv
    }

    // transport properties, fields and single patches

    pub fn mu(&self) -> &VolField<f64> {
        &self.mu
    }
    pub fn kappa(&self) -> &VolField<f64> {
        &self.kappa
    }
    /// kinematic viscosity mu/rho
    pub fn nu(&self) -> VolField<f64> {
        self.mu.zip_map(&self.rho, "nu", |mu, rho| mu / rho)
    }
    /// thermal diffusivity for enthalpy, kappa/Cp
    pub fn alpha(&self) -> VolField<f64> {
        self.kappa.zip_map(&self.cp, "alpha", |k, cp| k / cp)
    }
    /// thermal diffusivity for internal energy, kappa/Cv
    pub fn alphahe(&self) -> VolField<f64> {
        self.kappa.zip_map(&self.cv, "alphahe", |k, cv| k / cv)
    }
    /// effective diffusivity of internal energy, Cp/Cv (alpha + alphat)
    pub fn alpha_eff(&self, alphat: &VolField<f64>) -> VolField<f64> {
        let gamma = self.cp.zip_map(&self.cv, "gamma", |cp, cv| cp / cv);
        let alpha = self.alpha().zip_map(alphat, "alpha", |a, at| a + at);
        gamma.zip_map(&alpha, "alphaEff", |g, a| g * a)
    }
    /// effective conductivity kappa + Cp alphat
    pub fn kappa_eff(&self, alphat: &VolField<f64>) -> VolField<f64> {
        let cp_alphat = self.cp.zip_map(alphat, "CpAlphat", |cp, at| cp * at);
        self.kappa.zip_map(&cp_alphat, "kappaEff", |k, c| k + c)
    }

    pub fn mu_patch(&self, mesh: &FvMesh, patch: usize) -> Vec<f64> {
        self.mu.patch_values(mesh, patch).to_vec()
    }
    pub fn kappa_patch(&self, mesh: &FvMesh, patch: usize) -> Vec<f64> {
        self.kappa.patch_values(mesh, patch).to_vec()
    }
    pub fn nu_patch(&self, mesh: &FvMesh, patch: usize) -> Vec<f64> {
        self.nu().patch_values(mesh, patch).to_vec()
    }
    pub fn alpha_patch(&self, mesh: &FvMesh, patch: usize) -> Vec<f64> {
        self.alpha().patch_values(mesh, patch).to_vec()
    }
    pub fn alphahe_patch(&self, mesh: &FvMesh, patch: usize) -> Vec<f64> {
        self.alphahe().patch_values(mesh, patch).to_vec()
    }
    pub fn alpha_eff_patch(&self, mesh: &FvMesh, alphat: &[f64], patch: usize) -> Vec<f64> {
        let range = mesh.patches[patch].range();
        range
            .zip(alphat)
            .map(|(f, at)| self.cp.boundary[f] / self.cv.boundary[f] * (self.kappa.boundary[f] / self.cp.boundary[f] + at))
            .collect()
    }
    pub fn kappa_eff_patch(&self, mesh: &FvMesh, alphat: &[f64], patch: usize) -> Vec<f64> {
        let range = mesh.patches[patch].range();
        range
            .zip(alphat)
            .map(|(f, at)| self.kappa.boundary[f] + self.cp.boundary[f] * at)
            .collect()
    }
}
