use super::primitive_closure::PrimitiveClosure;
use crate::FluxSchemes::flux_engine::FaceFluxes;
use crate::fv::fields::VolField;
use crate::fv::mesh::FvMesh;
use nalgebra::Vector3;

/// below this density velocity and energy are not recovered from the conserved state
pub const SMALL_DENSITY: f64 = 1e-12;

/// fixed names of the fields exchanged with restart storage
pub mod field_names {
    pub const RHO: &str = "rho";
    pub const U: &str = "U";
    pub const RHO_U: &str = "rhoU";
    pub const RHO_E: &str = "rhoE";
    pub const P: &str = "p";
    pub const T: &str = "T";
    pub const E: &str = "e";
    pub const PHI: &str = "phi";
    pub const RHO_PHI: &str = "rhoPhi";
    pub const RHO_U_PHI: &str = "rhoUPhi";
    pub const RHO_E_PHI: &str = "rhoEPhi";
    pub const QDOT: &str = "Qdot";
    pub const MACH_NO: &str = "MachNo";
}

/// Conserved fields rho, rhoU, rhoE with the velocity they imply and their face fluxes.
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct ConservedStateStore {
    pub rho: VolField<f64>,
    pub U: VolField<Vector3<f64>>,
    pub rho_u: VolField<Vector3<f64>>,
    pub rho_e: VolField<f64>,
    pub fluxes: FaceFluxes,
    pub mach_no: VolField<f64>,
}

impl ConservedStateStore {
    /// initialises the conserved fields from the primitive state through `encode`
    #[allow(non_snake_case)]
    pub fn new(mesh: &FvMesh, U: VolField<Vector3<f64>>, thermo: &PrimitiveClosure) -> Self {
        let mut state = ConservedStateStore {
            rho: VolField::calculated(field_names::RHO, mesh, 0.0),
            U,
            rho_u: VolField::calculated(field_names::RHO_U, mesh, Vector3::zeros()),
            rho_e: VolField::calculated(field_names::RHO_E, mesh, 0.0),
            fluxes: FaceFluxes::new(mesh),
            mach_no: VolField::calculated(field_names::MACH_NO, mesh, 1.0),
        };
        state.encode(thermo);
        state
    }

    /// Primitive state from the conserved one.
    ///
    /// U = rhoU/rho and e = rhoE/rho - |U|²/2 on the cells, boundary conditions of U and e,
    /// closure correction, p = rho/psi, then boundary rho, rhoU and rhoE re-derived from the
    /// closure-consistent boundary primitives.
    pub fn decode(&mut self, mesh: &FvMesh, thermo: &mut PrimitiveClosure) {
        thermo.set_density(&self.rho);

        for c in 0..mesh.n_cells() {
            let rho = self.rho.internal[c];
            if rho > SMALL_DENSITY {
                self.U.internal[c] = self.rho_u.internal[c] / rho;
            } else {
                self.U.internal[c] = Vector3::zeros();
            }
        }
        self.U.correct_boundary_conditions(mesh);

        {
            let e = thermo.e_mut();
            for c in 0..mesh.n_cells() {
                let rho = self.rho.internal[c];
                if rho > SMALL_DENSITY {
                    e.internal[c] =
                        self.rho_e.internal[c] / rho - 0.5 * self.U.internal[c].norm_squared();
                }
            }
            e.correct_boundary_conditions(mesh);
        }

        thermo.correct(mesh);
        thermo.update_pressure(mesh, &self.rho);
        self.rho.boundary = thermo.boundary_density();
        thermo.set_density(&self.rho);

        let e = thermo.e();
        for f in 0..mesh.n_boundary_faces() {
            let (rho_b, u_b) = (self.rho.boundary[f], self.U.boundary[f]);
            self.rho_u.boundary[f] = u_b * rho_b;
            self.rho_e.boundary[f] = rho_b * (e.boundary[f] + 0.5 * u_b.norm_squared());
        }
    }

    /// Conserved state from the primitive one: rho from the closure, rhoU = rho U,
    /// rhoE = rho (e + |U|²/2), plus the Mach number |U|/c.
    pub fn encode(&mut self, thermo: &PrimitiveClosure) {
        self.rho.assign_values(thermo.rho());
        self.rho_u = self.rho.zip_map(&self.U, field_names::RHO_U, |rho, u| u * rho);
        let kinetic = self.U.mag_sqr("magSqrU");
        let total = thermo.e().zip_map(&kinetic, "E", |e, k| e + 0.5 * k);
        self.rho_e = self.rho.zip_map(&total, field_names::RHO_E, |rho, en| rho * en);
        let c = thermo.speed_of_sound();
        self.mach_no = self
            .U
            .zip_map(&c, field_names::MACH_NO, |u, c| u.norm() / c);
    }

    /// Σ V (rho, rhoU, rhoE)
    pub fn totals(&self, mesh: &FvMesh) -> (f64, Vector3<f64>, f64) {
        (
            self.rho.volume_integral(mesh),
            self.rho_u.volume_integral(mesh),
            self.rho_e.volume_integral(mesh),
        )
    }
}
