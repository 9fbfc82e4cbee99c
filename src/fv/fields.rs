use super::FvError;
use super::mesh::FvMesh;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::ops::{Add, Mul, Neg, Sub};

/// value stored per cell or per face: a scalar or a 3-vector
pub trait FieldValue:
    Copy
    + Debug
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f64, Output = Self>
    + Neg<Output = Self>
{
    const N_COMPONENTS: usize;
    fn zero() -> Self;
    fn mag_sqr(&self) -> f64;
    fn component(&self, i: usize) -> f64;
    fn set_component(&mut self, i: usize, value: f64);
}

impl FieldValue for f64 {
    const N_COMPONENTS: usize = 1;
    fn zero() -> Self {
        0.0
    }
    fn mag_sqr(&self) -> f64 {
        self * self
    }
    fn component(&self, _i: usize) -> f64 {
        *self
    }
    fn set_component(&mut self, _i: usize, value: f64) {
        *self = value;
    }
}

impl FieldValue for Vector3<f64> {
    const N_COMPONENTS: usize = 3;
    fn zero() -> Self {
        Vector3::zeros()
    }
    fn mag_sqr(&self) -> f64 {
        self.norm_squared()
    }
    fn component(&self, i: usize) -> f64 {
        self[i]
    }
    fn set_component(&mut self, i: usize, value: f64) {
        self[i] = value;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BoundaryCondition<T> {
    /// boundary value copied from the adjacent cell
    ZeroGradient,
    FixedValue(T),
    /// boundary value assigned by whoever owns the field
    Calculated,
}

/// Cell-centred field with first-class boundary values.
///
/// `boundary` holds one value per boundary face of the mesh, `conditions` one condition per
/// patch. Operations that build new fields from old ones return `Calculated` fields whose
/// boundary values follow the same algebra as the internal ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolField<T> {
    pub name: String,
    pub internal: Vec<T>,
    pub boundary: Vec<T>,
    pub conditions: Vec<BoundaryCondition<T>>,
}

impl<T: FieldValue> VolField<T> {
    pub fn from_internal(
        name: &str,
        mesh: &FvMesh,
        internal: Vec<T>,
        conditions: Vec<BoundaryCondition<T>>,
    ) -> Result<Self, FvError> {
        if internal.len() != mesh.n_cells() {
            return Err(FvError::SizeMismatch {
                field: name.to_string(),
                expected: mesh.n_cells(),
                found: internal.len(),
            });
        }
        if conditions.len() != mesh.patches.len() {
            return Err(FvError::SizeMismatch {
                field: format!("{} boundary conditions", name),
                expected: mesh.patches.len(),
                found: conditions.len(),
            });
        }
        let boundary = mesh.boundary_owner.iter().map(|&o| internal[o]).collect();
        let mut field = VolField {
            name: name.to_string(),
            internal,
            boundary,
            conditions,
        };
        field.correct_boundary_conditions(mesh);
        Ok(field)
    }

    pub fn uniform(
        name: &str,
        mesh: &FvMesh,
        value: T,
        conditions: Vec<BoundaryCondition<T>>,
    ) -> Result<Self, FvError> {
        Self::from_internal(name, mesh, vec![value; mesh.n_cells()], conditions)
    }

    /// uniform field with `Calculated` conditions on every patch
    pub fn calculated(name: &str, mesh: &FvMesh, value: T) -> Self {
        VolField {
            name: name.to_string(),
            internal: vec![value; mesh.n_cells()],
            boundary: vec![value; mesh.n_boundary_faces()],
            conditions: vec![BoundaryCondition::Calculated; mesh.patches.len()],
        }
    }

    /// `Calculated` field whose boundary values are taken from the adjacent cells
    pub(crate) fn calculated_from_internal(name: &str, mesh: &FvMesh, internal: Vec<T>) -> Self {
        let boundary = mesh.boundary_owner.iter().map(|&o| internal[o]).collect();
        VolField {
            name: name.to_string(),
            internal,
            boundary,
            conditions: vec![BoundaryCondition::Calculated; mesh.patches.len()],
        }
    }

    pub fn correct_boundary_conditions(&mut self, mesh: &FvMesh) {
        for (patch, condition) in mesh.patches.iter().zip(&self.conditions) {
            match condition {
                BoundaryCondition::ZeroGradient => {
                    for f in patch.range() {
                        self.boundary[f] = self.internal[mesh.boundary_owner[f]];
                    }
                }
                BoundaryCondition::FixedValue(value) => {
                    for f in patch.range() {
                        self.boundary[f] = *value;
                    }
                }
                BoundaryCondition::Calculated => {}
            }
        }
    }

    pub fn patch_values<'a>(&'a self, mesh: &FvMesh, patch: usize) -> &'a [T] {
        &self.boundary[mesh.patches[patch].range()]
    }

    pub fn map<U: FieldValue>(&self, name: &str, f: impl Fn(T) -> U) -> VolField<U> {
        VolField {
            name: name.to_string(),
            internal: self.internal.iter().map(|&v| f(v)).collect(),
            boundary: self.boundary.iter().map(|&v| f(v)).collect(),
            conditions: vec![BoundaryCondition::Calculated; self.conditions.len()],
        }
    }

    pub fn zip_map<U: FieldValue, V: FieldValue>(
        &self,
        other: &VolField<U>,
        name: &str,
        f: impl Fn(T, U) -> V,
    ) -> VolField<V> {
        VolField {
            name: name.to_string(),
            internal: self
                .internal
                .iter()
                .zip(&other.internal)
                .map(|(&a, &b)| f(a, b))
                .collect(),
            boundary: self
                .boundary
                .iter()
                .zip(&other.boundary)
                .map(|(&a, &b)| f(a, b))
                .collect(),
            conditions: vec![BoundaryCondition::Calculated; self.conditions.len()],
        }
    }

    /// in place, internal and boundary values
    pub fn apply(&mut self, f: impl Fn(T) -> T) {
        for v in self.internal.iter_mut().chain(self.boundary.iter_mut()) {
            *v = f(*v);
        }
    }

    pub fn scale(&mut self, a: f64) {
        self.apply(|v| v * a);
    }

    /// `self += a*x`
    pub fn axpy(&mut self, a: f64, x: &VolField<T>) {
        for (v, &xv) in self.internal.iter_mut().zip(&x.internal) {
            *v = *v + xv * a;
        }
        for (v, &xv) in self.boundary.iter_mut().zip(&x.boundary) {
            *v = *v + xv * a;
        }
    }

    /// copies internal and boundary values, keeps own name and conditions
    pub fn assign_values(&mut self, other: &VolField<T>) {
        self.internal.clone_from(&other.internal);
        self.boundary.clone_from(&other.boundary);
    }

    pub fn volume_integral(&self, mesh: &FvMesh) -> T {
        self.internal
            .iter()
            .zip(&mesh.volumes)
            .fold(T::zero(), |acc, (&v, &vol)| acc + v * vol)
    }

    pub fn mag_sqr(&self, name: &str) -> VolField<f64> {
        self.map(name, |v| v.mag_sqr())
    }
}

impl VolField<f64> {
    /// Floors internal and boundary values at `floor`, returns the number of clamped cells.
    pub fn clamp_min(&mut self, floor: f64) -> usize {
        let mut clamped = 0;
        for v in self.internal.iter_mut() {
            if *v < floor {
                *v = floor;
                clamped += 1;
            }
        }
        for v in self.boundary.iter_mut() {
            *v = v.max(floor);
        }
        clamped
    }

    pub fn min_max(&self) -> (f64, f64) {
        self.internal
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }
}

/// Face field: one value per internal face and per boundary face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceField<T> {
    pub name: String,
    pub internal: Vec<T>,
    pub boundary: Vec<T>,
}

impl<T: FieldValue> SurfaceField<T> {
    pub fn uniform(name: &str, mesh: &FvMesh, value: T) -> Self {
        SurfaceField {
            name: name.to_string(),
            internal: vec![value; mesh.n_internal_faces()],
            boundary: vec![value; mesh.n_boundary_faces()],
        }
    }

    /// face-wise product with a scalar face field, e.g. an interpolated value times a mass flux
    pub fn multiply(&self, other: &SurfaceField<f64>, name: &str) -> SurfaceField<T> {
        SurfaceField {
            name: name.to_string(),
            internal: self
                .internal
                .iter()
                .zip(&other.internal)
                .map(|(&a, &b)| a * b)
                .collect(),
            boundary: self
                .boundary
                .iter()
                .zip(&other.boundary)
                .map(|(&a, &b)| a * b)
                .collect(),
        }
    }
}
