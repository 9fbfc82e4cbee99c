/// approximate Riemann solvers producing conservative face fluxes from left/right primitive states
pub mod flux_scheme;
/// drives a flux scheme over all mesh faces and interpolates transported scalars consistently
///  # Examples
/// ```
/// use ReactingFV::FluxSchemes::flux_engine::{FaceFluxes, FluxEngine, FluxInput};
/// use ReactingFV::FluxSchemes::flux_scheme::{FluxSchemeEnum, Rusanov};
/// use ReactingFV::fv::fields::VolField;
/// use ReactingFV::fv::mesh::FvMesh;
/// use nalgebra::Vector3;
/// let mesh = FvMesh::cartesian([4, 1, 1], [1.0, 1.0, 1.0], [true, false, false]).unwrap();
/// let rho = VolField::calculated("rho", &mesh, 1.0);
/// let u = VolField::calculated("U", &mesh, Vector3::new(10.0, 0.0, 0.0));
/// let e = VolField::calculated("e", &mesh, 2.0e5);
/// let p = VolField::calculated("p", &mesh, 1.0e5);
/// let c = VolField::calculated("c", &mesh, 340.0);
/// let mut engine = FluxEngine::new(FluxSchemeEnum::Rusanov(Rusanov));
/// let mut fluxes = FaceFluxes::new(&mesh);
/// engine.update(&mesh, &FluxInput { rho: &rho, U: &u, e: &e, p: &p, c: &c }, &mut fluxes);
/// // uniform flow: mass flux rho U.S through every face
/// assert!((fluxes.rho_phi.internal[0] - 10.0).abs() < 1e-9);
/// ```
pub mod flux_engine;
/// tests
mod flux_tests;
