/// turbulence closures: effective viscosity, turbulent heat diffusivity, stress divergence
pub mod turbulence_model;
/// tests
mod turbulence_tests;
