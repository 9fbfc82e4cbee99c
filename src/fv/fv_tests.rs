#[cfg(test)]
mod tests {
    use crate::fv::FvError;
    use crate::fv::fields::{BoundaryCondition, SurfaceField, VolField};
    use crate::fv::fvc;
    use crate::fv::fvm::FvMatrix;
    use crate::fv::linear_solver::{DirectLu, GaussSeidel, LinearSolverEnum};
    use crate::fv::mesh::{FvMesh, Patch};
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn line(n: usize, periodic: bool) -> FvMesh {
        FvMesh::cartesian([n, 1, 1], [1.0, 0.1, 0.1], [periodic, false, false]).unwrap()
    }

    #[test]
    fn test_cartesian_counts() {
        let mesh = line(4, false);
        assert_eq!(mesh.n_cells(), 4);
        assert_eq!(mesh.n_internal_faces(), 3);
        assert_eq!(mesh.n_boundary_faces(), 2);
        assert_eq!(mesh.patches.len(), 2);
        assert_eq!(mesh.patches[0].name, "xMin");
        assert_eq!(mesh.patches[1].name, "xMax");
        assert_eq!(mesh.solution_d, [1, -1, -1]);
        assert_eq!(mesh.solution_ds(), Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(mesh.total_volume(), 0.01, epsilon = 1e-15);
        // outward normals
        assert!(mesh.boundary_areas[0].x < 0.0);
        assert!(mesh.boundary_areas[1].x > 0.0);

        let mesh = FvMesh::cartesian([3, 2, 1], [3.0, 2.0, 1.0], [false, false, false]).unwrap();
        assert_eq!(mesh.n_cells(), 6);
        assert_eq!(mesh.n_internal_faces(), 2 * 2 + 3);
        assert_eq!(mesh.n_boundary_faces(), 2 * 2 + 3 * 2);
        assert_eq!(mesh.solution_d, [1, 1, -1]);
    }

    #[test]
    fn test_periodic_single_cell_has_self_faces() {
        let mesh = FvMesh::cartesian([1, 1, 1], [1.0, 1.0, 1.0], [true, true, true]).unwrap();
        assert_eq!(mesh.n_internal_faces(), 3);
        assert_eq!(mesh.n_boundary_faces(), 0);
        assert!(mesh.patches.is_empty());
        for f in 0..3 {
            assert_eq!(mesh.owner[f], mesh.neighbour[f]);
        }
        assert_eq!(mesh.solution_d, [1, 1, 1]);
        let flux = SurfaceField::uniform("rhoPhi", &mesh, 3.5);
        let d = fvc::div(&mesh, &flux, "deltaRho");
        assert_eq!(d.internal, vec![0.0]);
    }

    #[test]
    fn test_periodic_wrap_face_orientation() {
        let mesh = line(3, true);
        assert_eq!(mesh.n_internal_faces(), 3);
        let wrap = 2;
        assert_eq!(mesh.owner[wrap], 0);
        assert_eq!(mesh.neighbour[wrap], 2);
        assert!(mesh.face_areas[wrap].x < 0.0);
    }

    #[test]
    fn test_divergence_conserves_on_closed_domain() {
        let mesh = line(5, true);
        let mut flux = SurfaceField::uniform("phi", &mesh, 0.0);
        for (f, v) in flux.internal.iter_mut().enumerate() {
            *v = (f as f64 + 1.0).powi(2) - 3.0;
        }
        let d = fvc::div(&mesh, &flux, "div");
        assert_relative_eq!(d.volume_integral(&mesh), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_divergence_of_uniform_flux_through_open_line() {
        let mesh = line(4, false);
        // a uniform velocity of 2 along x through faces of area 0.01
        let mut flux = SurfaceField::uniform("phi", &mesh, 0.02);
        flux.boundary = vec![-0.02, 0.02];
        let d = fvc::div(&mesh, &flux, "div");
        for v in &d.internal {
            assert_relative_eq!(*v, 0.0, epsilon = 1e-12);
        }
        flux.boundary[1] = 0.05;
        let d = fvc::div(&mesh, &flux, "div");
        assert_relative_eq!(d.volume_integral(&mesh), 0.05 - 0.02, epsilon = 1e-14);
    }

    #[test]
    fn test_boundary_conditions() {
        let mesh = line(3, false);
        let mut t = VolField::from_internal(
            "T",
            &mesh,
            vec![300.0, 310.0, 320.0],
            vec![
                BoundaryCondition::FixedValue(290.0),
                BoundaryCondition::ZeroGradient,
            ],
        )
        .unwrap();
        assert_eq!(t.boundary, vec![290.0, 320.0]);
        t.internal[2] = 400.0;
        t.correct_boundary_conditions(&mesh);
        assert_eq!(t.patch_values(&mesh, 1), &[400.0]);
        assert_eq!(t.patch_values(&mesh, 0), &[290.0]);

        let wrong = VolField::from_internal("T", &mesh, vec![1.0; 2], vec![]);
        assert!(matches!(wrong, Err(FvError::SizeMismatch { .. })));
    }

    #[test]
    fn test_clamp_min_counts_cells() {
        let mesh = line(4, false);
        let mut y = VolField::from_internal(
            "Y",
            &mesh,
            vec![0.1, -0.2, 0.0, -1e-12],
            vec![BoundaryCondition::ZeroGradient; 2],
        )
        .unwrap();
        assert_eq!(y.clamp_min(0.0), 2);
        assert_eq!(y.internal, vec![0.1, 0.0, 0.0, 0.0]);
        assert!(y.boundary.iter().all(|v| *v >= 0.0));
        assert_eq!(y.min_max(), (0.0, 0.1));
    }

    #[test]
    fn test_linear_interpolation() {
        let mesh = line(3, false);
        let x = VolField::from_internal(
            "x",
            &mesh,
            vec![1.0, 3.0, 7.0],
            vec![BoundaryCondition::ZeroGradient; 2],
        )
        .unwrap();
        let xf = fvc::interpolate(&mesh, &x, "xf");
        assert_eq!(xf.internal, vec![2.0, 5.0]);
        assert_eq!(xf.boundary, vec![1.0, 7.0]);
    }

    fn diffuse(solver: &LinearSolverEnum) -> (FvMesh, VolField<f64>, f64) {
        let mesh = line(6, false);
        let rho = VolField::calculated("rho", &mesh, 1.2);
        let mut x = VolField::from_internal(
            "x",
            &mesh,
            vec![0.0, 0.0, 1.0, 4.0, 0.0, 0.0],
            vec![BoundaryCondition::ZeroGradient; 2],
        )
        .unwrap();
        let before = x.volume_integral(&mesh);
        let gamma = VolField::calculated("gamma", &mesh, 0.05);
        let eqn = FvMatrix::ddt_correction(&mesh, &rho, &x, 0.1) - FvMatrix::laplacian(&mesh, &gamma, &x);
        let performance = eqn.solve(&mesh, solver, &mut x).unwrap();
        assert_eq!(performance.len(), 1);
        (mesh, x, before)
    }

    #[test]
    fn test_implicit_diffusion_conserves_and_smooths() {
        let (mesh, x, before) = diffuse(&LinearSolverEnum::DirectLu(DirectLu));
        assert_relative_eq!(x.volume_integral(&mesh), before, epsilon = 1e-12);
        assert!(x.internal[3] < 4.0);
        assert!(x.internal[1] > 0.0);
        assert!(x.internal.iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn test_gauss_seidel_matches_direct_solution() {
        let (_, direct, _) = diffuse(&LinearSolverEnum::DirectLu(DirectLu));
        let (_, iterative, _) = diffuse(&LinearSolverEnum::GaussSeidel(GaussSeidel {
            tolerance: 1e-13,
            max_iterations: 500,
            strict: true,
        }));
        for (a, b) in direct.internal.iter().zip(&iterative.internal) {
            assert_relative_eq!(*a, *b, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_fixed_value_boundary_drives_diffusion() {
        let mesh = line(4, false);
        let rho = VolField::calculated("rho", &mesh, 1.0);
        let mut t = VolField::uniform(
            "T",
            &mesh,
            300.0,
            vec![
                BoundaryCondition::FixedValue(400.0),
                BoundaryCondition::ZeroGradient,
            ],
        )
        .unwrap();
        let gamma = VolField::calculated("alpha", &mesh, 1e-3);
        let eqn = FvMatrix::ddt_correction(&mesh, &rho, &t, 1.0) - FvMatrix::laplacian(&mesh, &gamma, &t);
        eqn.solve(&mesh, &LinearSolverEnum::DirectLu(DirectLu), &mut t)
            .unwrap();
        assert!(t.internal[0] > 300.0);
        assert!(t.internal[0] > t.internal[1]);
        assert!(t.internal[0] < 400.0);
    }

    #[test]
    fn test_vector_solve_and_explicit_source() {
        let mesh = line(2, true);
        let rho = VolField::calculated("rho", &mesh, 2.0);
        let mut u = VolField::calculated("U", &mesh, Vector3::new(1.0, 0.0, 0.0));
        let mut eqn = FvMatrix::ddt_correction(&mesh, &rho, &u, 0.5);
        let q = VolField::calculated("q", &mesh, Vector3::new(0.0, 4.0, 0.0));
        eqn.subtract_explicit(&mesh, &q);
        let performance = eqn
            .solve(&mesh, &LinearSolverEnum::DirectLu(DirectLu), &mut u)
            .unwrap();
        assert_eq!(performance.len(), 3);
        // rho (u - u*)/dt = q
        for v in &u.internal {
            assert_relative_eq!(v.x, 1.0, epsilon = 1e-12);
            assert_relative_eq!(v.y, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_implicit_source_balances() {
        let mesh = line(1, true);
        let rho = VolField::calculated("rho", &mesh, 1.0);
        let mut y = VolField::calculated("Y", &mesh, 0.5);
        // dY/dt = -2 Y, backward Euler over dt = 0.5 gives Y/(1 + 1)
        let eqn = FvMatrix::ddt_correction(&mesh, &rho, &y, 0.5)
            - FvMatrix::implicit_source(&mesh, "R", &[0.0], &[-2.0]);
        eqn.solve(&mesh, &LinearSolverEnum::default(), &mut y).unwrap();
        assert_relative_eq!(y.internal[0], 0.25, epsilon = 1e-9);
    }

    #[test]
    fn test_strict_gauss_seidel_reports_non_convergence() {
        let mesh = line(6, false);
        let rho = VolField::calculated("rho", &mesh, 1.0);
        let mut x = VolField::from_internal(
            "x",
            &mesh,
            vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0],
            vec![BoundaryCondition::ZeroGradient; 2],
        )
        .unwrap();
        let gamma = VolField::calculated("gamma", &mesh, 10.0);
        let eqn = FvMatrix::ddt_correction(&mesh, &rho, &x, 1.0) - FvMatrix::laplacian(&mesh, &gamma, &x);
        let solver = LinearSolverEnum::GaussSeidel(GaussSeidel {
            tolerance: 1e-14,
            max_iterations: 1,
            strict: true,
        });
        let result = eqn.solve(&mesh, &solver, &mut x);
        assert!(matches!(
            result,
            Err(FvError::NotConverged { iterations: 1, .. })
        ));
    }

    #[test]
    fn test_gauss_seidel_rejects_non_finite_values() {
        let mesh = line(3, false);
        let rho = VolField::calculated("rho", &mesh, 1.0);
        let gamma = VolField::calculated("gamma", &mesh, 1.0);
        let mut x = VolField::from_internal(
            "x",
            &mesh,
            vec![0.0, f64::NAN, 0.0],
            vec![BoundaryCondition::ZeroGradient; 2],
        )
        .unwrap();
        let eqn = FvMatrix::ddt_correction(&mesh, &rho, &x, 1.0) - FvMatrix::laplacian(&mesh, &gamma, &x);
        for strict in [true, false] {
            let solver = LinearSolverEnum::GaussSeidel(GaussSeidel {
                tolerance: 1e-10,
                max_iterations: 50,
                strict,
            });
            let result = eqn.solve(&mesh, &solver, &mut x);
            assert!(matches!(result, Err(FvError::SolverFailure { .. })));
        }
    }

    #[test]
    fn test_singular_matrix_is_a_solver_failure() {
        let mesh = line(3, false);
        let mut x = VolField::calculated("x", &mesh, 1.0);
        let eqn: FvMatrix<f64> = FvMatrix::new("x", &mesh);
        let result = eqn.solve(&mesh, &LinearSolverEnum::DirectLu(DirectLu), &mut x);
        assert!(matches!(result, Err(FvError::SolverFailure { .. })));
    }

    #[test]
    fn test_invalid_topology() {
        let v = Vector3::new(1.0, 0.0, 0.0);
        let result = FvMesh::from_topology(
            vec![1.0, 1.0],
            vec![Vector3::zeros(), v],
            vec![1],
            vec![0],
            vec![v],
            vec![1.0],
            vec![0.5],
            vec![],
            vec![],
            vec![],
            vec![],
            [1, -1, -1],
        );
        assert!(matches!(result, Err(FvError::InvalidMesh(_))));

        let result = FvMesh::from_topology(
            vec![1.0],
            vec![Vector3::zeros()],
            vec![],
            vec![],
            vec![],
            vec![],
            vec![],
            vec![0],
            vec![v],
            vec![2.0],
            vec![Patch::new("wall", 0, 2)],
            [1, -1, -1],
        );
        assert!(matches!(result, Err(FvError::InvalidMesh(_))));

        assert!(FvMesh::cartesian([0, 1, 1], [1.0, 1.0, 1.0], [false; 3]).is_err());
        assert!(FvMesh::cartesian([2, 1, 1], [-1.0, 1.0, 1.0], [false; 3]).is_err());
    }
}
