#[cfg(test)]
mod tests {
    use crate::Turbulence::turbulence_model::{
        ConstantEddyViscosity, Laminar, TurbulenceClosure, TurbulenceEnum, TurbulenceInput,
    };
    use crate::fv::fields::{BoundaryCondition, SurfaceField, VolField};
    use crate::fv::linear_solver::{DirectLu, LinearSolverEnum};
    use crate::fv::mesh::FvMesh;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn test_laminar_has_no_turbulent_transport() {
        let mesh = FvMesh::cartesian([3, 1, 1], [1.0, 1.0, 1.0], [true, false, false]).unwrap();
        let model: TurbulenceEnum = Laminar::new(&mesh).into();
        let mu = VolField::calculated("mu", &mesh, 1.8e-5);
        assert_eq!(model.mu_eff(&mu).internal, mu.internal);
        assert!(model.alphat().internal.iter().all(|a| *a == 0.0));
        assert_eq!(model.name(), "laminar");
    }

    #[test]
    fn test_constant_eddy_viscosity_follows_density() {
        let mesh = FvMesh::cartesian([2, 1, 1], [1.0, 1.0, 1.0], [true, false, false]).unwrap();
        let rho = VolField::calculated("rho", &mesh, 1.2);
        let mut model: TurbulenceEnum = ConstantEddyViscosity::new(&mesh, &rho, 1e-3, 0.85).into();
        assert_relative_eq!(model.mut_field().internal[0], 1.2e-3, epsilon = 1e-15);
        assert_relative_eq!(model.alphat().internal[1], 1.2e-3 / 0.85, epsilon = 1e-15);

        let rho = VolField::calculated("rho", &mesh, 2.0);
        let u = VolField::calculated("U", &mesh, Vector3::zeros());
        let rho_phi = SurfaceField::uniform("rhoPhi", &mesh, 0.0);
        let mu = VolField::calculated("mu", &mesh, 1e-5);
        model.correct(&TurbulenceInput {
            mesh: &mesh,
            rho: &rho,
            U: &u,
            rho_phi: &rho_phi,
            mu: &mu,
        });
        assert_relative_eq!(model.mut_field().internal[0], 2e-3, epsilon = 1e-15);
        assert_relative_eq!(model.mu_eff(&mu).internal[0], 2e-3 + 1e-5, epsilon = 1e-15);
    }

    #[test]
    fn test_stress_divergence_diffuses_momentum() {
        let mesh = FvMesh::cartesian([4, 1, 1], [1.0, 0.1, 0.1], [false, false, false]).unwrap();
        let rho = VolField::calculated("rho", &mesh, 1.0);
        let model: TurbulenceEnum = ConstantEddyViscosity::new(&mesh, &rho, 0.05, 1.0).into();
        let mu = VolField::calculated("mu", &mesh, 0.0);
        let mut u = VolField::from_internal(
            "U",
            &mesh,
            vec![
                Vector3::zeros(),
                Vector3::new(0.0, 1.0, 0.0),
                Vector3::zeros(),
                Vector3::zeros(),
            ],
            vec![BoundaryCondition::ZeroGradient; 2],
        )
        .unwrap();
        let before = u.volume_integral(&mesh);
        let eqn = crate::fv::fvm::FvMatrix::ddt_correction(&mesh, &rho, &u, 0.01)
            + model.div_dev_rho_reff(&mesh, &mu, &u);
        eqn.solve(&mesh, &LinearSolverEnum::DirectLu(DirectLu), &mut u)
            .unwrap();
        assert!(u.internal[1].y < 1.0);
        assert!(u.internal[0].y > 0.0);
        assert_relative_eq!(u.volume_integral(&mesh).y, before.y, epsilon = 1e-12);
    }
}
