    use super::*;
    use proptest::prelude::*;
    use ProcessingStatus::*;

    #[test]
    fn forward_transitions_are_legal() {
        assert!(Unprocessed.can_transition_to(InProcess));
        assert!(InProcess.can_transition_to(FinishedWaiting));
        assert!(FinishedWaiting.can_transition_to(Done));
    }

    #[test]
    fn backward_transitions_are_illegal_except_reset() {
        assert!(!Done.can_transition_to(InProcess));
        assert!(!FinishedWaiting.can_transition_to(InProcess));
        assert!(Done.can_transition_to(Unprocessed));
    }

    #[test]
    fn round_trips_through_str() {
        for s in [Unprocessed, InProcess, FinishedWaiting, Done] {
            assert_eq!(ProcessingStatus::parse(s.as_str()), Some(s));
        }
    }

    fn any_status() -> impl Strategy<Value = ProcessingStatus> {
        proptest::sample::select(vec![Unprocessed, InProcess, FinishedWaiting, Done])
    }

    /// Position along the forward chain, for asserting monotonicity.
    fn rank(s: ProcessingStatus) -> u8 {
        match s {
            Unprocessed => 0,
            InProcess => 1,
            FinishedWaiting => 2,
            Done => 3,
        }
    }

    proptest! {
        /// `can_transition_to` matches the state machine definition exactly,
        /// for every pair of statuses, not just the hand-picked cases above.
        #[test]
        fn transition_legality_matches_state_machine_definition(from in any_status(), to in any_status()) {
            let legal = from.can_transition_to(to);
            let expected = matches!(
                (from, to),
                (Unprocessed, InProcess) | (InProcess, FinishedWaiting) | (FinishedWaiting, Done)
            ) || to == Unprocessed
                || from == to;
            prop_assert_eq!(legal, expected);
        }

        /// Monotonicity (§8 Testable Property 2): any transition `can_transition_to`
        /// allows, other than an idempotent re-write or a replan reset back to
        /// `Unprocessed`, moves strictly forward along the chain — never backward.
        #[test]
        fn legal_non_reset_transitions_never_move_backward(from in any_status(), to in any_status()) {
            if from.can_transition_to(to) && to != Unprocessed && from != to {
                prop_assert!(rank(to) > rank(from));
            }
        }
    }
