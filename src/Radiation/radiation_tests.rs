#[cfg(test)]
mod tests {
    use crate::Radiation::radiation_model::{
        NoRadiation, OpticallyThinGrey, RadiationEnum, RadiationModel, SIGMA,
    };
    use crate::fv::fields::VolField;
    use crate::fv::mesh::FvMesh;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_radiation_is_a_no_op() {
        let mesh = FvMesh::cartesian([2, 1, 1], [1.0, 1.0, 1.0], [true, false, false]).unwrap();
        let mut model = RadiationEnum::default();
        assert_eq!(model, RadiationEnum::NoRadiation(NoRadiation));
        model.correct(&VolField::calculated("T", &mesh, 2000.0));
        assert_eq!(model.sh(&mesh).internal, vec![0.0, 0.0]);
        assert_eq!(model.name(), "none");
    }

    #[test]
    fn test_optically_thin_grey_cools_hot_gas() {
        let mesh = FvMesh::cartesian([2, 1, 1], [1.0, 1.0, 1.0], [true, false, false]).unwrap();
        let mut model: RadiationEnum = OpticallyThinGrey::new(0.5, 300.0).into();
        // not corrected yet
        assert_eq!(model.sh(&mesh).internal, vec![0.0, 0.0]);
        let mut t = VolField::calculated("T", &mesh, 300.0);
        t.internal[1] = 1500.0;
        model.correct(&t);
        let sh = model.sh(&mesh);
        assert_relative_eq!(sh.internal[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(
            sh.internal[1],
            4.0 * 0.5 * SIGMA * (300.0f64.powi(4) - 1500.0f64.powi(4)),
            max_relative = 1e-12
        );
        assert!(sh.internal[1] < 0.0);
    }
}
