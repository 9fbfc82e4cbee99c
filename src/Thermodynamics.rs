/// species list, inert specie and active flags of a reacting mixture
pub mod composition;
/// calorically perfect gas and ideal-gas mixture closures with constant or Sutherland transport
pub mod perfect_gas;
/// the thermodynamic closure interface: energy <-> temperature, compressibility, transport
///  # Examples
/// ```
/// use ReactingFV::Thermodynamics::thermo_closure::{ThermoClosureEnum, ThermodynamicClosure, TransportModel};
/// use ReactingFV::Thermodynamics::perfect_gas::CaloricallyPerfectGas;
/// let air: ThermoClosureEnum = CaloricallyPerfectGas::new(
///     "air",
///     28.96,
///     718.0,
///     TransportModel::Constant { mu: 1.8e-5, Pr: 0.71 },
/// )
/// .unwrap()
/// .into();
/// let y = [1.0];
/// let e = air.internal_energy(300.0, &y);
/// let c = (air.cp(&y) / air.cv(&y) * air.gas_constant(&y) * 300.0).sqrt();
/// println!("e = {} J/kg, c = {} m/s", e, c);
/// assert!((air.temperature(e, &y) - 300.0).abs() < 1e-9);
/// ```
pub mod thermo_closure;
/// tests
mod thermo_tests;
