use crate::fv::fields::VolField;
use crate::fv::mesh::FvMesh;
use enum_dispatch::enum_dispatch;

/// Stefan-Boltzmann constant, W/(m2 K4)
pub const SIGMA: f64 = 5.670374419e-8;

#[enum_dispatch]
pub trait RadiationModel {
    fn name(&self) -> &str;
    fn correct(&mut self, t: &VolField<f64>);
    /// radiative energy source, W/m3
    fn sh(&self, mesh: &FvMesh) -> VolField<f64>;
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NoRadiation;

impl RadiationModel for NoRadiation {
    fn name(&self) -> &str {
        "none"
    }
    fn correct(&mut self, _t: &VolField<f64>) {}
    fn sh(&self, mesh: &FvMesh) -> VolField<f64> {
        VolField::calculated("Sh", mesh, 0.0)
    }
}

/// Grey gas exchanging radiation with surroundings at `T_ambient`, no self-absorption:
/// Sh = 4 a sigma (T_ambient^4 - T^4).
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct OpticallyThinGrey {
    /// absorption coefficient, 1/m
    pub absorption: f64,
    pub T_ambient: f64,
    source: Vec<f64>,
}

impl OpticallyThinGrey {
    #[allow(non_snake_case)]
    pub fn new(absorption: f64, T_ambient: f64) -> Self {
        OpticallyThinGrey {
            absorption,
            T_ambient,
            source: Vec::new(),
        }
    }
}

impl RadiationModel for OpticallyThinGrey {
    fn name(&self) -> &str {
        "opticallyThinGrey"
    }
    fn correct(&mut self, t: &VolField<f64>) {
        let ambient = self.T_ambient.powi(4);
        self.source = t
            .internal
            .iter()
            .map(|tc| 4.0 * self.absorption * SIGMA * (ambient - tc.powi(4)))
            .collect();
    }
    fn sh(&self, mesh: &FvMesh) -> VolField<f64> {
        if self.source.len() != mesh.n_cells() {
            return VolField::calculated("Sh", mesh, 0.0);
        }
        VolField::calculated_from_internal("Sh", mesh, self.source.clone())
    }
}

#[enum_dispatch(RadiationModel)]
#[derive(Debug, Clone, PartialEq)]
pub enum RadiationEnum {
    NoRadiation(NoRadiation),
    OpticallyThinGrey(OpticallyThinGrey),
}

impl Default for RadiationEnum {
    fn default() -> Self {
        RadiationEnum::NoRadiation(NoRadiation)
    }
}
