use super::flux_scheme::{FluxScheme, FluxSchemeEnum, PrimitiveState};
use crate::fv::fields::{SurfaceField, VolField};
use crate::fv::fvc;
use crate::fv::mesh::FvMesh;
use nalgebra::Vector3;

/// primitive fields handed to the flux scheme, freshly decoded
#[allow(non_snake_case)]
pub struct FluxInput<'a> {
    pub rho: &'a VolField<f64>,
    pub U: &'a VolField<Vector3<f64>>,
    pub e: &'a VolField<f64>,
    pub p: &'a VolField<f64>,
    /// speed of sound
    pub c: &'a VolField<f64>,
}

impl FluxInput<'_> {
    fn cell(&self, c: usize) -> PrimitiveState {
        PrimitiveState {
            rho: self.rho.internal[c],
            U: self.U.internal[c],
            e: self.e.internal[c],
            p: self.p.internal[c],
            c: self.c.internal[c],
        }
    }
    fn boundary_face(&self, f: usize) -> PrimitiveState {
        PrimitiveState {
            rho: self.rho.boundary[f],
            U: self.U.boundary[f],
            e: self.e.boundary[f],
            p: self.p.boundary[f],
            c: self.c.boundary[f],
        }
    }
}

/// the four face fluxes integrated by the explicit update
#[derive(Debug, Clone, PartialEq)]
pub struct FaceFluxes {
    pub phi: SurfaceField<f64>,
    pub rho_phi: SurfaceField<f64>,
    pub rho_u_phi: SurfaceField<Vector3<f64>>,
    pub rho_e_phi: SurfaceField<f64>,
}

impl FaceFluxes {
    pub fn new(mesh: &FvMesh) -> Self {
        FaceFluxes {
            phi: SurfaceField::uniform("phi", mesh, 0.0),
            rho_phi: SurfaceField::uniform("rhoPhi", mesh, 0.0),
            rho_u_phi: SurfaceField::uniform("rhoUPhi", mesh, Vector3::zeros()),
            rho_e_phi: SurfaceField::uniform("rhoEPhi", mesh, 0.0),
        }
    }
}

/// Evaluates a `FluxScheme` on every face and remembers the upwind direction of the mass flux
/// so that transported scalars are interpolated consistently with it until `clear`.
#[derive(Debug, Clone, PartialEq)]
pub struct FluxEngine {
    scheme: FluxSchemeEnum,
    /// owner weight per internal face: 1 where mass leaves the owner, 0 otherwise
    upwind_weights: Option<Vec<f64>>,
}

impl FluxEngine {
    pub fn new(scheme: FluxSchemeEnum) -> Self {
        FluxEngine {
            scheme,
            upwind_weights: None,
        }
    }

    pub fn scheme(&self) -> &FluxSchemeEnum {
        &self.scheme
    }

    pub fn has_cached_state(&self) -> bool {
        self.upwind_weights.is_some()
    }

    pub fn update(&mut self, mesh: &FvMesh, input: &FluxInput, fluxes: &mut FaceFluxes) {
        let mut weights = Vec::with_capacity(mesh.n_internal_faces());
        for f in 0..mesh.n_internal_faces() {
            let left = input.cell(mesh.owner[f]);
            let right = input.cell(mesh.neighbour[f]);
            let flux = self.scheme.face_flux(&left, &right, &mesh.face_areas[f]);
            fluxes.phi.internal[f] = flux.phi;
            fluxes.rho_phi.internal[f] = flux.mass;
            fluxes.rho_u_phi.internal[f] = flux.momentum;
            fluxes.rho_e_phi.internal[f] = flux.energy;
            weights.push(if flux.mass >= 0.0 { 1.0 } else { 0.0 });
        }
        for f in 0..mesh.n_boundary_faces() {
            let left = input.cell(mesh.boundary_owner[f]);
            let right = input.boundary_face(f);
            let flux = self.scheme.face_flux(&left, &right, &mesh.boundary_areas[f]);
            fluxes.phi.boundary[f] = flux.phi;
            fluxes.rho_phi.boundary[f] = flux.mass;
            fluxes.rho_u_phi.boundary[f] = flux.momentum;
            fluxes.rho_e_phi.boundary[f] = flux.energy;
        }
        self.upwind_weights = Some(weights);
    }

    /// Face values of a transported scalar: upwind along the last mass flux, linear when no flux
    /// has been computed since the last `clear`.
    pub fn interpolate(&self, mesh: &FvMesh, field: &VolField<f64>, name: &str) -> SurfaceField<f64> {
        match &self.upwind_weights {
            Some(weights) if weights.len() == mesh.n_internal_faces() => {
                let internal = weights
                    .iter()
                    .enumerate()
                    .map(|(f, w)| {
                        w * field.internal[mesh.owner[f]] + (1.0 - w) * field.internal[mesh.neighbour[f]]
                    })
                    .collect();
                SurfaceField {
                    name: name.to_string(),
                    internal,
                    boundary: field.boundary.clone(),
                }
            }
            _ => fvc::interpolate(mesh, field, name),
        }
    }

    /// drops the state cached by `update`
    pub fn clear(&mut self) {
        self.upwind_weights = None;
    }
}
