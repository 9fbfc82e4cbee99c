//! Explicit finite-volume calculus.
use super::fields::{FieldValue, SurfaceField, VolField};
use super::mesh::FvMesh;

/// Gauss divergence of an area-integrated face flux.
///
/// Each internal face adds its flux to the owner and subtracts it from the neighbour, boundary
/// faces add to their owner. The sum is divided by the cell volume, so `Σ V·div` equals the net
/// boundary flux and vanishes on a closed domain.
pub fn div<T: FieldValue>(mesh: &FvMesh, flux: &SurfaceField<T>, name: &str) -> VolField<T> {
    let mut acc = vec![T::zero(); mesh.n_cells()];
    for (f, &phi) in flux.internal.iter().enumerate() {
        let (o, n) = (mesh.owner[f], mesh.neighbour[f]);
        acc[o] = acc[o] + phi;
        acc[n] = acc[n] - phi;
    }
    for (f, &phi) in flux.boundary.iter().enumerate() {
        let o = mesh.boundary_owner[f];
        acc[o] = acc[o] + phi;
    }
    for (v, &vol) in acc.iter_mut().zip(&mesh.volumes) {
        *v = *v * (1.0 / vol);
    }
    VolField::calculated_from_internal(name, mesh, acc)
}

/// linear interpolation to faces, boundary faces take the field's boundary values
pub fn interpolate<T: FieldValue>(
    mesh: &FvMesh,
    field: &VolField<T>,
    name: &str,
) -> SurfaceField<T> {
    let internal = (0..mesh.n_internal_faces())
        .map(|f| {
            let w = mesh.weights[f];
            field.internal[mesh.owner[f]] * w + field.internal[mesh.neighbour[f]] * (1.0 - w)
        })
        .collect();
    SurfaceField {
        name: name.to_string(),
        internal,
        boundary: field.boundary.clone(),
    }
}
