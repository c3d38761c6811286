    use super::*;

    #[test]
    fn image_number_displays_as_plain_integer() {
        assert_eq!(ImageNumber::new(7).to_string(), "7");
    }

    #[test]
    fn ordering_follows_numeric_value() {
        assert!(ImageNumber::new(1) < ImageNumber::new(2));
    }
