use enum_dispatch::enum_dispatch;
use nalgebra::Vector3;
use std::ops::{Add, Mul, Sub};

/// primitive state on one side of a face
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimitiveState {
    pub rho: f64,
    pub U: Vector3<f64>,
    /// specific internal energy
    pub e: f64,
    pub p: f64,
    /// speed of sound
    pub c: f64,
}

impl PrimitiveState {
    fn conserved(&self) -> ConservativeFlux {
        ConservativeFlux {
            phi: 0.0,
            mass: self.rho,
            momentum: self.U * self.rho,
            energy: self.rho * (self.e + 0.5 * self.U.norm_squared()),
        }
    }

    /// physical flux per unit area through a face of unit normal `n`
    fn normal_flux(&self, n: &Vector3<f64>) -> ConservativeFlux {
        let un = self.U.dot(n);
        let rho_e = self.rho * (self.e + 0.5 * self.U.norm_squared());
        ConservativeFlux {
            phi: un,
            mass: self.rho * un,
            momentum: self.U * (self.rho * un) + n * self.p,
            energy: (rho_e + self.p) * un,
        }
    }
}

/// Area-integrated face fluxes: volumetric, mass, momentum (incl. pressure) and total energy
/// (incl. pressure work).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConservativeFlux {
    pub phi: f64,
    pub mass: f64,
    pub momentum: Vector3<f64>,
    pub energy: f64,
}

impl Add for ConservativeFlux {
    type Output = ConservativeFlux;
    fn add(self, rhs: ConservativeFlux) -> ConservativeFlux {
        ConservativeFlux {
            phi: self.phi + rhs.phi,
            mass: self.mass + rhs.mass,
            momentum: self.momentum + rhs.momentum,
            energy: self.energy + rhs.energy,
        }
    }
}

impl Sub for ConservativeFlux {
    type Output = ConservativeFlux;
    fn sub(self, rhs: ConservativeFlux) -> ConservativeFlux {
        self + rhs * -1.0
    }
}

impl Mul<f64> for ConservativeFlux {
    type Output = ConservativeFlux;
    fn mul(self, a: f64) -> ConservativeFlux {
        ConservativeFlux {
            phi: self.phi * a,
            mass: self.mass * a,
            momentum: self.momentum * a,
            energy: self.energy * a,
        }
    }
}

#[enum_dispatch]
pub trait FluxScheme {
    fn name(&self) -> &str;
    /// flux from `left` to `right` through a face with area vector `sf` pointing left -> right
    fn face_flux(
        &self,
        left: &PrimitiveState,
        right: &PrimitiveState,
        sf: &Vector3<f64>,
    ) -> ConservativeFlux;
}

/// local Lax-Friedrichs: central flux plus dissipation at the fastest local wave speed
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rusanov;

impl FluxScheme for Rusanov {
    fn name(&self) -> &str {
        "Rusanov"
    }
    fn face_flux(
        &self,
        left: &PrimitiveState,
        right: &PrimitiveState,
        sf: &Vector3<f64>,
    ) -> ConservativeFlux {
        let mag_sf = sf.norm();
        let n = sf / mag_sf;
        let a = (left.U.dot(&n).abs() + left.c).max(right.U.dot(&n).abs() + right.c);
        let mut flux = (left.normal_flux(&n) + right.normal_flux(&n)) * 0.5
            - (right.conserved() - left.conserved()) * (0.5 * a);
        flux.phi = 0.5 * (left.U.dot(&n) + right.U.dot(&n));
        flux * mag_sf
    }
}

/// Harten-Lax-van Leer with Davis wave-speed estimates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hll;

impl FluxScheme for Hll {
    fn name(&self) -> &str {
        "HLL"
    }
    fn face_flux(
        &self,
        left: &PrimitiveState,
        right: &PrimitiveState,
        sf: &Vector3<f64>,
    ) -> ConservativeFlux {
        let mag_sf = sf.norm();
        let n = sf / mag_sf;
        let (un_l, un_r) = (left.U.dot(&n), right.U.dot(&n));
        let s_l = (un_l - left.c).min(un_r - right.c);
        let s_r = (un_l + left.c).max(un_r + right.c);
        let flux = if s_l >= 0.0 {
            left.normal_flux(&n)
        } else if s_r <= 0.0 {
            right.normal_flux(&n)
        } else {
            (left.normal_flux(&n) * s_r - right.normal_flux(&n) * s_l
                + (right.conserved() - left.conserved()) * (s_l * s_r))
                * (1.0 / (s_r - s_l))
        };
        flux * mag_sf
    }
}

#[enum_dispatch(FluxScheme)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FluxSchemeEnum {
    Rusanov(Rusanov),
    Hll(Hll),
}

impl Default for FluxSchemeEnum {
    fn default() -> Self {
        FluxSchemeEnum::Hll(Hll)
    }
}
