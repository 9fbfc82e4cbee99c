#[cfg(test)]
mod tests {
    use crate::FluxSchemes::flux_engine::{FaceFluxes, FluxEngine, FluxInput};
    use crate::FluxSchemes::flux_scheme::{FluxScheme, FluxSchemeEnum, Hll, PrimitiveState, Rusanov};
    use crate::fv::fields::VolField;
    use crate::fv::fvc;
    use crate::fv::mesh::FvMesh;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn state(rho: f64, u: f64, p: f64) -> PrimitiveState {
        let gamma: f64 = 1.4;
        PrimitiveState {
            rho,
            U: Vector3::new(u, 0.0, 0.0),
            e: p / ((gamma - 1.0) * rho),
            p,
            c: (gamma * p / rho).sqrt(),
        }
    }

    #[test]
    fn test_consistency_with_physical_flux() {
        let s = state(1.2, 30.0, 1.0e5);
        let sf = Vector3::new(0.02, 0.0, 0.0);
        let rho_e = 1.2 * (s.e + 0.5 * 900.0);
        for scheme in [FluxSchemeEnum::Rusanov(Rusanov), FluxSchemeEnum::Hll(Hll)] {
            let f = scheme.face_flux(&s, &s, &sf);
            assert_relative_eq!(f.phi, 30.0 * 0.02, max_relative = 1e-12);
            assert_relative_eq!(f.mass, 1.2 * 30.0 * 0.02, max_relative = 1e-12);
            assert_relative_eq!(
                f.momentum.x,
                (1.2 * 900.0 + 1.0e5) * 0.02,
                max_relative = 1e-12
            );
            assert_relative_eq!(f.momentum.y, 0.0);
            assert_relative_eq!(f.energy, (rho_e + 1.0e5) * 30.0 * 0.02, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_supersonic_hll_is_upwind() {
        let left = state(1.0, 1000.0, 1.0e5);
        let right = state(0.5, 900.0, 0.5e5);
        let sf = Vector3::new(1.0, 0.0, 0.0);
        let hll = Hll.face_flux(&left, &right, &sf);
        let upwind = Hll.face_flux(&left, &left, &sf);
        assert_relative_eq!(hll.mass, upwind.mass, max_relative = 1e-12);
        assert_relative_eq!(hll.energy, upwind.energy, max_relative = 1e-12);
        // reversed orientation takes the right state
        let reversed = Hll.face_flux(&right, &left, &(-sf));
        assert_relative_eq!(reversed.mass, -upwind.mass, max_relative = 1e-12);
    }

    #[test]
    fn test_rusanov_dissipates_a_jump() {
        let left = state(1.0, 0.0, 1.0e5);
        let right = state(0.125, 0.0, 1.0e4);
        let f = Rusanov.face_flux(&left, &right, &Vector3::new(1.0, 0.0, 0.0));
        // mass moves from high to low density
        assert!(f.mass > 0.0);
        assert!(f.energy > 0.0);
    }

    fn uniform_input(mesh: &FvMesh) -> [VolField<f64>; 4] {
        [
            VolField::calculated("rho", mesh, 1.0),
            VolField::calculated("e", mesh, 2.5e5),
            VolField::calculated("p", mesh, 1.0e5),
            VolField::calculated("c", mesh, 374.0),
        ]
    }

    #[test]
    fn test_uniform_flow_has_zero_divergence_on_periodic_mesh() {
        let mesh = FvMesh::cartesian([5, 3, 1], [1.0, 1.0, 0.1], [true, true, false]).unwrap();
        let [rho, e, p, c] = uniform_input(&mesh);
        let u = VolField::calculated("U", &mesh, Vector3::new(12.0, -7.0, 0.0));
        let mut engine = FluxEngine::new(FluxSchemeEnum::default());
        let mut fluxes = FaceFluxes::new(&mesh);
        engine.update(
            &mesh,
            &FluxInput { rho: &rho, U: &u, e: &e, p: &p, c: &c },
            &mut fluxes,
        );
        assert!(engine.has_cached_state());
        let d_rho = fvc::div(&mesh, &fluxes.rho_phi, "deltaRho");
        let d_rho_u = fvc::div(&mesh, &fluxes.rho_u_phi, "deltaRhoU");
        let d_rho_e = fvc::div(&mesh, &fluxes.rho_e_phi, "deltaRhoE");
        for c in 0..mesh.n_cells() {
            assert_relative_eq!(d_rho.internal[c], 0.0, epsilon = 1e-9);
            assert_relative_eq!(d_rho_u.internal[c].norm(), 0.0, epsilon = 1e-6);
            assert_relative_eq!(d_rho_e.internal[c], 0.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_interpolation_follows_mass_flux_until_cleared() {
        let mesh = FvMesh::cartesian([3, 1, 1], [3.0, 1.0, 1.0], [true, false, false]).unwrap();
        let [rho, e, p, c] = uniform_input(&mesh);
        let u = VolField::calculated("U", &mesh, Vector3::new(-5.0, 0.0, 0.0));
        let mut y = VolField::calculated("Y", &mesh, 0.0);
        y.internal = vec![0.1, 0.2, 0.4];
        let mut engine = FluxEngine::new(FluxSchemeEnum::Rusanov(Rusanov));
        let mut fluxes = FaceFluxes::new(&mesh);
        // linear before any update
        assert_relative_eq!(engine.interpolate(&mesh, &y, "Yf").internal[0], 0.15);
        engine.update(
            &mesh,
            &FluxInput { rho: &rho, U: &u, e: &e, p: &p, c: &c },
            &mut fluxes,
        );
        // flow towards -x: face 0-1 takes cell 1, the wrap face 0-2 (normal -x) takes cell 0
        let yf = engine.interpolate(&mesh, &y, "Yf");
        assert_eq!(yf.internal, vec![0.2, 0.4, 0.1]);
        engine.clear();
        assert!(!engine.has_cached_state());
        let yf = engine.interpolate(&mesh, &y, "Yf");
        assert_relative_eq!(yf.internal[1], 0.3);
    }
}
