#[cfg(test)]
mod tests {
    use crate::CompressibleSystem::integration_system::{
        Blendable, HistoryBuffer, IntegrationError, IntegrationScheme, IntegrationSystem, Stage,
        StageHistory, TimeIntegrator,
    };
    use crate::fv::fields::VolField;
    use crate::fv::mesh::FvMesh;
    use approx::assert_relative_eq;

    impl Blendable for f64 {
        fn scale(&mut self, a: f64) {
            *self *= a;
        }
        fn axpy(&mut self, a: f64, x: &Self) {
            *self += a * x;
        }
    }

    /// dy/dt = -y, advanced through the same store-and-blend path as the flow solver
    struct Decay {
        y: f64,
        rate: f64,
        history: StageHistory<f64>,
        post_updates: usize,
        clears: usize,
    }

    impl Decay {
        fn new(y: f64) -> Self {
            Decay {
                y,
                rate: 0.0,
                history: StageHistory::new("y"),
                post_updates: 0,
                clears: 0,
            }
        }
    }

    impl IntegrationSystem for Decay {
        type Error = IntegrationError;
        fn update(&mut self) -> Result<(), IntegrationError> {
            self.rate = self.y;
            Ok(())
        }
        fn solve(&mut self, stage: &Stage, dt: f64) -> Result<(), IntegrationError> {
            let old = self.history.store_and_blend_old(&self.y, stage)?;
            let delta = self.history.store_and_blend_delta(&self.rate, stage)?;
            self.y = old - dt * delta;
            Ok(())
        }
        fn post_update(&mut self, _dt: f64) -> Result<(), IntegrationError> {
            self.post_updates += 1;
            Ok(())
        }
        fn clear_ode_fields(&mut self) {
            self.history.clear();
            self.clears += 1;
        }
    }

    #[test]
    fn test_stage_coefficients_are_consistent() {
        for scheme in [
            IntegrationScheme::Euler,
            IntegrationScheme::SspRk2,
            IntegrationScheme::SspRk3,
        ] {
            for index in 1..=scheme.n_stages() {
                let stage = scheme.stage(index).unwrap();
                assert_eq!(stage.a.len(), index);
                assert_eq!(stage.b.len(), index);
                // blending old values keeps a constant constant
                assert_relative_eq!(stage.a.iter().sum::<f64>(), 1.0, epsilon = 1e-15);
            }
        }
        assert_eq!(
            IntegrationScheme::SspRk2.stage(3),
            Err(IntegrationError::StageOutOfRange {
                scheme: IntegrationScheme::SspRk2,
                stage: 3,
                n_stages: 2
            })
        );
        assert!(IntegrationScheme::Euler.stage(0).is_err());
    }

    #[test]
    fn test_single_stage_is_explicit_euler() {
        let mut decay = Decay::new(2.0);
        let integrator = TimeIntegrator::new(IntegrationScheme::Euler);
        integrator.advance(&mut decay, 0.1).unwrap();
        assert_relative_eq!(decay.y, 2.0 * (1.0 - 0.1), epsilon = 1e-15);
        assert_eq!(decay.post_updates, 1);
        assert_eq!(decay.clears, 1);
        assert!(decay.history.old.is_empty());
    }

    #[test]
    fn test_ssp_rk2_matches_taylor_expansion() {
        let dt = 0.1;
        let mut decay = Decay::new(1.0);
        TimeIntegrator::new(IntegrationScheme::SspRk2)
            .advance(&mut decay, dt)
            .unwrap();
        assert_relative_eq!(decay.y, 1.0 - dt + dt * dt / 2.0, epsilon = 1e-14);
    }

    #[test]
    fn test_ssp_rk3_matches_taylor_expansion() {
        let dt = 0.1;
        let mut decay = Decay::new(1.0);
        TimeIntegrator::new(IntegrationScheme::SspRk3)
            .advance(&mut decay, dt)
            .unwrap();
        let expected = 1.0 - dt + dt * dt / 2.0 - dt * dt * dt / 6.0;
        assert_relative_eq!(decay.y, expected, epsilon = 1e-14);
    }

    #[test]
    fn test_history_blends_stored_fields() {
        let mesh = FvMesh::cartesian([2, 1, 1], [1.0, 1.0, 1.0], [true, false, false]).unwrap();
        let mut buffer: HistoryBuffer<VolField<f64>> = HistoryBuffer::new("rhoOld");
        let first = VolField::calculated("rho", &mesh, 1.0);
        let second = VolField::calculated("rho", &mesh, 3.0);
        let stage1 = IntegrationScheme::SspRk2.stage(1).unwrap();
        let stage2 = IntegrationScheme::SspRk2.stage(2).unwrap();
        let blended = buffer.store_and_blend(&first, 1, &stage1.a).unwrap();
        assert_eq!(blended.internal, vec![1.0, 1.0]);
        let blended = buffer.store_and_blend(&second, 2, &stage2.a).unwrap();
        assert_relative_eq!(blended.internal[0], 2.0);
        assert_relative_eq!(blended.internal[1], 2.0);
        assert_eq!(blended.name, "rho");
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_storing_twice_for_a_stage_is_rejected() {
        let mut history: StageHistory<f64> = StageHistory::new("rho");
        let stage = IntegrationScheme::Euler.stage(1).unwrap();
        history.store_and_blend_old(&1.0, &stage).unwrap();
        let err = history.store_and_blend_old(&1.0, &stage).unwrap_err();
        assert_eq!(
            err,
            IntegrationError::StageMismatch {
                field: "rhoOld".to_string(),
                stage: 1,
                stored: 1
            }
        );
        // skipping a stage is rejected as well
        let stage3 = IntegrationScheme::SspRk3.stage(3).unwrap();
        assert!(history.store_and_blend_delta(&1.0, &stage3).is_err());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut history: StageHistory<f64> = StageHistory::new("rhoE");
        history.clear();
        let stage = IntegrationScheme::Euler.stage(1).unwrap();
        history.store_and_blend_old(&4.0, &stage).unwrap();
        history.store_and_blend_delta(&1.0, &stage).unwrap();
        history.clear();
        history.clear();
        assert!(history.old.is_empty());
        assert!(history.delta.is_empty());
        assert_eq!(history.delta.name(), "deltarhoE");
        // a fresh step can start again
        assert_relative_eq!(history.store_and_blend_old(&5.0, &stage).unwrap(), 5.0);
    }

    #[test]
    fn test_invalid_time_step_is_rejected_before_any_stage() {
        let mut decay = Decay::new(1.0);
        let integrator = TimeIntegrator::default();
        for dt in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                integrator.advance(&mut decay, dt),
                Err(IntegrationError::InvalidTimeStep(_))
            ));
        }
        assert_eq!(decay.y, 1.0);
        assert!(decay.history.old.is_empty());
    }
}
