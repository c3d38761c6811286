    use super::*;

    #[test]
    fn identical_scalars_do_not_differ() {
        assert!(!MeasurementValue::Scalar(1.0).differs_from(&MeasurementValue::Scalar(1.0)));
    }

    #[test]
    fn arrays_differ_on_any_element() {
        let a = MeasurementValue::FloatArray(vec![1.0, 2.0]);
        let b = MeasurementValue::FloatArray(vec![1.0, 3.0]);
        assert!(a.differs_from(&b));
    }

    #[test]
    fn arrays_of_different_length_differ() {
        let a = MeasurementValue::FloatArray(vec![1.0]);
        let b = MeasurementValue::FloatArray(vec![1.0, 2.0]);
        assert!(a.differs_from(&b));
    }
