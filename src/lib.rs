#[allow(non_snake_case)]
pub mod CompressibleSystem;
#[allow(non_snake_case)]
pub mod Examples;
#[allow(non_snake_case)]
pub mod FluxSchemes;
#[allow(non_snake_case)]
pub mod Kinetics;
#[allow(non_snake_case)]
pub mod Radiation;
#[allow(non_snake_case)]
pub mod Thermodynamics;
#[allow(non_snake_case)]
pub mod Turbulence;
#[allow(non_snake_case)]
pub mod Utils;
pub mod fv;
pub mod settings;
