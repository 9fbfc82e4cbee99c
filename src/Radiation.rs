/// radiative heat transfer models; the no-op model stands in when radiation is not configured
pub mod radiation_model;
/// tests
mod radiation_tests;
