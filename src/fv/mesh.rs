use super::FvError;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::ops::Range;

const DIRECTION_NAMES: [&str; 3] = ["x", "y", "z"];

/// contiguous group of boundary faces sharing one boundary condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    pub name: String,
    /// index of the first boundary face of the patch
    pub start: usize,
    pub size: usize,
}

impl Patch {
    pub fn new(name: &str, start: usize, size: usize) -> Self {
        Patch {
            name: name.to_string(),
            start,
            size,
        }
    }
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.size
    }
}

/// Face-addressed finite-volume mesh.
///
/// Internal face `f` connects `owner[f]` and `neighbour[f]` with `owner[f] <= neighbour[f]`,
/// its area vector points from owner to neighbour. A face with `owner == neighbour` couples a
/// cell to itself (single-cell periodic direction) and cancels in every conservative sum.
/// Boundary faces are numbered from zero, grouped by patch, with outward area vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct FvMesh {
    pub volumes: Vec<f64>,
    pub centres: Vec<Vector3<f64>>,
    pub owner: Vec<usize>,
    pub neighbour: Vec<usize>,
    pub face_areas: Vec<Vector3<f64>>,
    /// 1/|d| between owner and neighbour centres
    pub delta_coeffs: Vec<f64>,
    /// linear interpolation weight of the owner value
    pub weights: Vec<f64>,
    pub boundary_owner: Vec<usize>,
    pub boundary_areas: Vec<Vector3<f64>>,
    /// 1/|d| between owner centre and boundary face centre
    pub boundary_delta_coeffs: Vec<f64>,
    pub patches: Vec<Patch>,
    /// +1 for solved directions, -1 for degenerate ones
    pub solution_d: [i8; 3],
}

impl FvMesh {
    /// takes an explicitly assembled topology and checks it
    #[allow(clippy::too_many_arguments)]
    pub fn from_topology(
        volumes: Vec<f64>,
        centres: Vec<Vector3<f64>>,
        owner: Vec<usize>,
        neighbour: Vec<usize>,
        face_areas: Vec<Vector3<f64>>,
        delta_coeffs: Vec<f64>,
        weights: Vec<f64>,
        boundary_owner: Vec<usize>,
        boundary_areas: Vec<Vector3<f64>>,
        boundary_delta_coeffs: Vec<f64>,
        patches: Vec<Patch>,
        solution_d: [i8; 3],
    ) -> Result<Self, FvError> {
        let mesh = FvMesh {
            volumes,
            centres,
            owner,
            neighbour,
            face_areas,
            delta_coeffs,
            weights,
            boundary_owner,
            boundary_areas,
            boundary_delta_coeffs,
            patches,
            solution_d,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    pub fn validate(&self) -> Result<(), FvError> {
        let n_cells = self.volumes.len();
        if n_cells == 0 {
            return Err(FvError::InvalidMesh("mesh has no cells".to_string()));
        }
        if self.centres.len() != n_cells {
            return Err(FvError::InvalidMesh(format!(
                "{} cell centres for {} cells",
                self.centres.len(),
                n_cells
            )));
        }
        if let Some(c) = self.volumes.iter().position(|v| !(*v > 0.0)) {
            return Err(FvError::InvalidMesh(format!(
                "cell {} has non-positive volume {}",
                c, self.volumes[c]
            )));
        }
        let n_faces = self.owner.len();
        if self.neighbour.len() != n_faces
            || self.face_areas.len() != n_faces
            || self.delta_coeffs.len() != n_faces
            || self.weights.len() != n_faces
        {
            return Err(FvError::InvalidMesh(
                "internal face arrays differ in length".to_string(),
            ));
        }
        for f in 0..n_faces {
            let (o, n) = (self.owner[f], self.neighbour[f]);
            if n >= n_cells {
                return Err(FvError::InvalidMesh(format!(
                    "face {} references cell {} of {}",
                    f, n, n_cells
                )));
            }
            if o > n {
                return Err(FvError::InvalidMesh(format!(
                    "face {} has owner {} above neighbour {}",
                    f, o, n
                )));
            }
        }
        let n_boundary = self.boundary_owner.len();
        if self.boundary_areas.len() != n_boundary || self.boundary_delta_coeffs.len() != n_boundary
        {
            return Err(FvError::InvalidMesh(
                "boundary face arrays differ in length".to_string(),
            ));
        }
        if let Some(f) = self.boundary_owner.iter().position(|&o| o >= n_cells) {
            return Err(FvError::InvalidMesh(format!(
                "boundary face {} references cell {} of {}",
                f, self.boundary_owner[f], n_cells
            )));
        }
        let mut next = 0;
        for patch in &self.patches {
            if patch.start != next {
                return Err(FvError::InvalidMesh(format!(
                    "patch '{}' starts at {} instead of {}",
                    patch.name, patch.start, next
                )));
            }
            next += patch.size;
        }
        if next != n_boundary {
            return Err(FvError::InvalidMesh(format!(
                "patches cover {} of {} boundary faces",
                next, n_boundary
            )));
        }
        Ok(())
    }

    /// Structured block of `divisions` cells spanning `lengths`.
    ///
    /// Periodic directions wrap the last cell onto the first through an internal face owned by
    /// the first cell. Non-periodic directions with more than one cell get `xMin`, `xMax`, ...
    /// patches. Non-periodic single-cell directions carry no faces and are flagged degenerate.
    pub fn cartesian(
        divisions: [usize; 3],
        lengths: [f64; 3],
        periodic: [bool; 3],
    ) -> Result<Self, FvError> {
        for d in 0..3 {
            if divisions[d] == 0 || !(lengths[d] > 0.0) {
                return Err(FvError::InvalidMesh(format!(
                    "direction {} needs a positive cell count and length, got {} cells over {}",
                    DIRECTION_NAMES[d], divisions[d], lengths[d]
                )));
            }
        }
        let [nx, ny, nz] = divisions;
        let h = [
            lengths[0] / nx as f64,
            lengths[1] / ny as f64,
            lengths[2] / nz as f64,
        ];
        let n_cells = nx * ny * nz;
        let strides = [1, nx, nx * ny];
        let index = |ijk: [usize; 3]| ijk[0] + nx * (ijk[1] + ny * ijk[2]);
        let ijk_of = |c: usize| [c % nx, (c / nx) % ny, c / (nx * ny)];

        let volumes = vec![h[0] * h[1] * h[2]; n_cells];
        let centres = (0..n_cells)
            .map(|c| {
                let ijk = ijk_of(c);
                Vector3::new(
                    (ijk[0] as f64 + 0.5) * h[0],
                    (ijk[1] as f64 + 0.5) * h[1],
                    (ijk[2] as f64 + 0.5) * h[2],
                )
            })
            .collect();

        let mut owner = Vec::new();
        let mut neighbour = Vec::new();
        let mut face_areas = Vec::new();
        let mut delta_coeffs = Vec::new();
        let mut boundary_owner = Vec::new();
        let mut boundary_areas = Vec::new();
        let mut boundary_delta_coeffs = Vec::new();
        let mut patches = Vec::new();
        let mut solution_d = [-1i8; 3];

        for d in 0..3 {
            let n = divisions[d];
            let area = volumes[0] / h[d];
            let mut normal = Vector3::zeros();
            normal[d] = area;
            if n > 1 || periodic[d] {
                solution_d[d] = 1;
            }
            for c in 0..n_cells {
                let ijk = ijk_of(c);
                if ijk[d] + 1 < n {
                    owner.push(c);
                    neighbour.push(c + strides[d]);
                    face_areas.push(normal);
                    delta_coeffs.push(1.0 / h[d]);
                }
            }
            if periodic[d] {
                for c in 0..n_cells {
                    let mut ijk = ijk_of(c);
                    if ijk[d] == 0 {
                        ijk[d] = n - 1;
                        // the wrap face lies on the low side of the owner
                        owner.push(c);
                        neighbour.push(index(ijk));
                        face_areas.push(-normal);
                        delta_coeffs.push(1.0 / h[d]);
                    }
                }
            } else if n > 1 {
                for (side, extreme, sign) in [("Min", 0, -1.0), ("Max", n - 1, 1.0)] {
                    let start = boundary_owner.len();
                    for c in 0..n_cells {
                        if ijk_of(c)[d] == extreme {
                            boundary_owner.push(c);
                            boundary_areas.push(normal * sign);
                            boundary_delta_coeffs.push(2.0 / h[d]);
                        }
                    }
                    let name = format!("{}{}", DIRECTION_NAMES[d], side);
                    patches.push(Patch::new(&name, start, boundary_owner.len() - start));
                }
            }
        }
        let weights = vec![0.5; owner.len()];
        FvMesh::from_topology(
            volumes,
            centres,
            owner,
            neighbour,
            face_areas,
            delta_coeffs,
            weights,
            boundary_owner,
            boundary_areas,
            boundary_delta_coeffs,
            patches,
            solution_d,
        )
    }

    pub fn n_cells(&self) -> usize {
        self.volumes.len()
    }
    pub fn n_internal_faces(&self) -> usize {
        self.owner.len()
    }
    pub fn n_boundary_faces(&self) -> usize {
        self.boundary_owner.len()
    }
    pub fn total_volume(&self) -> f64 {
        self.volumes.iter().sum()
    }
    pub fn patch_index(&self, name: &str) -> Option<usize> {
        self.patches.iter().position(|p| p.name == name)
    }
    /// `(solutionD + 1)/2`: 1 for solved directions, 0 for degenerate ones
    pub fn solution_ds(&self) -> Vector3<f64> {
        Vector3::new(
            (self.solution_d[0] as f64 + 1.0) / 2.0,
            (self.solution_d[1] as f64 + 1.0) / 2.0,
            (self.solution_d[2] as f64 + 1.0) / 2.0,
        )
    }
}
