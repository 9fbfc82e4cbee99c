/// eng
/// Arrhenius reactions given as equation strings, e.g. "CH4 + 2 O2 => CO2 + 2 H2O", with the
/// kinetic data {A, n, E, Q}. Equations are checked against the mixture composition and for mass
/// balance, then evaluated with the law of mass action on molar concentrations.
///
///  # Examples
/// ```
/// use ReactingFV::Kinetics::reaction_parser::{ElementaryReaction, ParsedReaction};
/// let species = vec!["H2".to_string(), "O2".to_string(), "H2O".to_string(), "N2".to_string()];
/// let molar_masses = vec![2.016, 31.998, 18.015, 28.014];
/// let data = ElementaryReaction {
///     eq: "2 H2 + O2 => 2 H2O".to_string(),
///     A: 1e9,
///     n: 0.0,
///     E: 1.2e5,
///     Q: 4.8e8,
/// };
/// let reaction = ParsedReaction::new(data, &species, &molar_masses).unwrap();
/// println!("k(1500 K) = {}", reaction.data.rate_constant(1500.0));
/// assert_eq!(reaction.reactants, vec![(0, 2.0), (1, 1.0)]);
/// ```
pub mod reaction_parser;
/// the combustion model interface: heat release and per-specie reaction sources
pub mod combustion_model;
