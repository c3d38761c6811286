// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

    use super::*;

    crate::define_id! {
        pub struct TestId("tst-");
    }

    #[test]
    fn generated_ids_carry_the_prefix() {
        let id = TestId::new();
        assert!(id.as_str().starts_with("tst-"));
        assert_eq!(id.as_str().len(), ID_MAX_LEN);
    }

    #[test]
    fn suffix_strips_the_prefix() {
        let id = TestId::from_string("tst-abc123");
        assert_eq!(id.suffix(), "abc123");
    }

    #[test]
    fn short_truncates_the_suffix() {
        let id = TestId::from_string("tst-abcdefgh");
        assert_eq!(id.short(3), "abc");
    }

    #[test]
    fn idbuf_rejects_oversized_strings_in_debug() {
        let s = "x".repeat(ID_MAX_LEN);
        let buf = IdBuf::new(&s);
        assert_eq!(buf.as_str(), s);
    }
