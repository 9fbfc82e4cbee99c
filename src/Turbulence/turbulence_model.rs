use crate::fv::fields::{SurfaceField, VolField};
use crate::fv::fvm::FvMatrix;
use crate::fv::mesh::FvMesh;
use enum_dispatch::enum_dispatch;
use nalgebra::Vector3;

/// flow state a turbulence closure evolves on
#[allow(non_snake_case)]
pub struct TurbulenceInput<'a> {
    pub mesh: &'a FvMesh,
    pub rho: &'a VolField<f64>,
    pub U: &'a VolField<Vector3<f64>>,
    pub rho_phi: &'a SurfaceField<f64>,
    /// laminar viscosity
    pub mu: &'a VolField<f64>,
}

#[enum_dispatch]
pub trait TurbulenceClosure {
    fn name(&self) -> &str;
    /// turbulent dynamic viscosity, kg/(m s)
    fn mut_field(&self) -> &VolField<f64>;
    /// turbulent thermal diffusivity, kg/(m s)
    fn alphat(&self) -> &VolField<f64>;
    /// evolves the turbulence state on the corrected flow
    fn correct(&mut self, input: &TurbulenceInput);

    fn mu_eff(&self, mu: &VolField<f64>) -> VolField<f64> {
        mu.zip_map(self.mut_field(), "muEff", |m, mt| m + mt)
    }

    /// Implicit part of the effective stress divergence, `-div(muEff grad(U))`.
    #[allow(non_snake_case)]
    fn div_dev_rho_reff(
        &self,
        mesh: &FvMesh,
        mu: &VolField<f64>,
        U: &VolField<Vector3<f64>>,
    ) -> FvMatrix<Vector3<f64>> {
        -FvMatrix::laplacian(mesh, &self.mu_eff(mu), U)
    }
}

/// no turbulence: mut = alphat = 0, molecular transport only
#[derive(Debug, Clone, PartialEq)]
pub struct Laminar {
    mut_field: VolField<f64>,
    alphat: VolField<f64>,
}

impl Laminar {
    pub fn new(mesh: &FvMesh) -> Self {
        Laminar {
            mut_field: VolField::calculated("mut", mesh, 0.0),
            alphat: VolField::calculated("alphat", mesh, 0.0),
        }
    }
}

impl TurbulenceClosure for Laminar {
    fn name(&self) -> &str {
        "laminar"
    }
    fn mut_field(&self) -> &VolField<f64> {
        &self.mut_field
    }
    fn alphat(&self) -> &VolField<f64> {
        &self.alphat
    }
    fn correct(&mut self, _input: &TurbulenceInput) {}
}

/// Prescribed kinematic eddy viscosity: mut = rho nut, alphat = mut/Prt.
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantEddyViscosity {
    pub nut: f64,
    pub Prt: f64,
    mut_field: VolField<f64>,
    alphat: VolField<f64>,
}

impl ConstantEddyViscosity {
    #[allow(non_snake_case)]
    pub fn new(mesh: &FvMesh, rho: &VolField<f64>, nut: f64, Prt: f64) -> Self {
        let mut model = ConstantEddyViscosity {
            nut,
            Prt,
            mut_field: VolField::calculated("mut", mesh, 0.0),
            alphat: VolField::calculated("alphat", mesh, 0.0),
        };
        model.update_viscosity(rho);
        model
    }

    fn update_viscosity(&mut self, rho: &VolField<f64>) {
        let nut = self.nut;
        let prt = self.Prt;
        self.mut_field = rho.map("mut", |r| r * nut);
        self.alphat = self.mut_field.map("alphat", |m| m / prt);
    }
}

impl TurbulenceClosure for ConstantEddyViscosity {
    fn name(&self) -> &str {
        "constantEddyViscosity"
    }
    fn mut_field(&self) -> &VolField<f64> {
        &self.mut_field
    }
    fn alphat(&self) -> &VolField<f64> {
        &self.alphat
    }
    fn correct(&mut self, input: &TurbulenceInput) {
        self.update_viscosity(input.rho);
    }
}

#[enum_dispatch(TurbulenceClosure)]
#[derive(Debug, Clone, PartialEq)]
pub enum TurbulenceEnum {
    Laminar(Laminar),
    ConstantEddyViscosity(ConstantEddyViscosity),
}
