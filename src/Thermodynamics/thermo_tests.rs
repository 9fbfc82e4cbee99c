#[cfg(test)]
mod tests {
    use crate::Thermodynamics::composition::Composition;
    use crate::Thermodynamics::perfect_gas::{CaloricallyPerfectGas, PerfectGasMixture, SpecieThermo};
    use crate::Thermodynamics::thermo_closure::{
        R_UNIVERSAL, ThermoClosureEnum, ThermoError, ThermodynamicClosure, TransportModel,
    };
    use approx::assert_relative_eq;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn air() -> ThermoClosureEnum {
        CaloricallyPerfectGas::new(
            "air",
            R_UNIVERSAL / 287.0,
            717.5,
            TransportModel::Constant { mu: 1.8e-5, Pr: 0.7 },
        )
        .unwrap()
        .into()
    }

    #[test]
    fn test_composition_roles() {
        let mut composition = Composition::new(names(&["CH4", "O2", "CO2", "N2"]), Some("N2")).unwrap();
        assert_eq!(composition.len(), 4);
        assert_eq!(composition.inert_index(), 3);
        assert_eq!(composition.inert_specie(), "N2");
        assert_eq!(composition.index_of("O2"), Some(1));
        assert_eq!(composition.transported(), vec![0, 1, 2]);
        composition.set_active("CO2", false).unwrap();
        assert!(!composition.is_active(2));
        assert_eq!(composition.transported(), vec![0, 1]);
        assert!(matches!(
            composition.set_active("Ar", false),
            Err(ThermoError::UnknownSpecie(_))
        ));
        composition.pretty_print();
    }

    #[test]
    fn test_composition_errors() {
        assert!(matches!(
            Composition::new(vec![], None),
            Err(ThermoError::EmptyComposition)
        ));
        assert!(matches!(
            Composition::new(names(&["O2", "O2"]), Some("O2")),
            Err(ThermoError::DuplicateSpecie(_))
        ));
        assert!(matches!(
            Composition::new(names(&["O2", "2N"]), Some("O2")),
            Err(ThermoError::MalformedSpecieName(_))
        ));
        assert!(matches!(
            Composition::new(names(&["O2", "N2"]), None),
            Err(ThermoError::MissingInertSpecie(2))
        ));
        assert!(matches!(
            Composition::new(names(&["O2", "N2"]), Some("Ar")),
            Err(ThermoError::UnknownInertSpecie(_))
        ));
        let single = Composition::new(names(&["air"]), None).unwrap();
        assert_eq!(single.inert_index(), 0);
        assert!(single.transported().is_empty());
    }

    #[test]
    fn test_energy_temperature_round_trip() {
        let gas = air();
        let y = [1.0];
        let e = gas.internal_energy(345.6, &y);
        assert_relative_eq!(e, 717.5 * 345.6, epsilon = 1e-9);
        assert_relative_eq!(gas.temperature(e, &y), 345.6, epsilon = 1e-12);
        assert_relative_eq!(gas.gas_constant(&y), 287.0, epsilon = 1e-9);
        assert_relative_eq!(gas.cp(&y), 1004.5, epsilon = 1e-9);
    }

    #[test]
    fn test_speed_of_sound_from_psi() {
        let gas = air();
        let y = [1.0];
        let t = 300.0;
        let psi = gas.psi(t, &y);
        let c = (gas.cp(&y) / (gas.cv(&y) * psi)).sqrt();
        let gamma = 1004.5 / 717.5;
        assert_relative_eq!(c, (gamma * 287.0 * t).sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_mixture_properties() {
        let mixture = PerfectGasMixture::new(
            vec![
                SpecieThermo { name: "H2".to_string(), W: 2.0, cv: 10000.0 },
                SpecieThermo { name: "N2".to_string(), W: 28.0, cv: 743.0 },
            ],
            TransportModel::Constant { mu: 2e-5, Pr: 0.72 },
        )
        .unwrap();
        let y = [0.25, 0.75];
        assert_relative_eq!(mixture.cv(&y), 0.25 * 10000.0 + 0.75 * 743.0, epsilon = 1e-9);
        assert_relative_eq!(
            mixture.gas_constant(&y),
            R_UNIVERSAL * (0.25 / 2.0 + 0.75 / 28.0),
            epsilon = 1e-9
        );
        assert_eq!(mixture.species_names(), names(&["H2", "N2"]));
        assert_eq!(mixture.molar_masses(), vec![2.0, 28.0]);
        assert_relative_eq!(
            mixture.kappa(300.0, &y),
            2e-5 * mixture.cp(&y) / 0.72,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_sutherland_viscosity() {
        let transport = TransportModel::Sutherland { As: 1.458e-6, Ts: 110.4, Pr: 0.7 };
        let mu = transport.mu(300.0);
        assert_relative_eq!(mu, 1.846e-5, epsilon = 1e-7);
        assert!(transport.mu(600.0) > mu);
    }

    #[test]
    fn test_invalid_thermo_data() {
        let bad = CaloricallyPerfectGas::new(
            "air",
            -1.0,
            717.5,
            TransportModel::Constant { mu: 0.0, Pr: 0.7 },
        );
        assert!(matches!(bad, Err(ThermoError::InvalidData { .. })));
        let bad = PerfectGasMixture::new(
            vec![SpecieThermo { name: "A".to_string(), W: 2.0, cv: 1.0 }],
            TransportModel::Constant { mu: 1e-5, Pr: 0.0 },
        );
        assert!(matches!(bad, Err(ThermoError::InvalidData { .. })));
    }
}
