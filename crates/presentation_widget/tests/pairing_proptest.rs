//! Property-based tests for the proximity fallback

use presentation_widget::{Position, nearest};
use proptest::prelude::*;

fn position() -> impl Strategy<Value = Position> {
    (-5000.0f64..5000.0, -5000.0f64..5000.0).prop_map(|(top, left)| Position::new(top, left))
}

proptest! {
    #[test]
    fn picks_a_minimum_distance_candidate(
        candidates in prop::collection::vec(position(), 1..20),
        reference in position()
    ) {
        let picked = nearest(candidates.iter().copied().enumerate(), reference).unwrap();
        let best = candidates[picked].distance(&reference);
        for candidate in &candidates {
            prop_assert!(best <= candidate.distance(&reference));
        }
    }

    #[test]
    fn ties_go_to_the_first_candidate(
        candidates in prop::collection::vec(position(), 1..20),
        reference in position()
    ) {
        let picked = nearest(candidates.iter().copied().enumerate(), reference).unwrap();
        let best = candidates[picked].distance(&reference);
        for earlier in &candidates[..picked] {
            prop_assert!(earlier.distance(&reference) > best);
        }
    }

    #[test]
    fn duplicated_candidate_keeps_first_index(p in position(), reference in position()) {
        let candidates = vec![(0, p), (1, p)];
        prop_assert_eq!(nearest(candidates, reference), Some(0));
    }

    #[test]
    fn empty_candidates_yield_nothing(reference in position()) {
        prop_assert_eq!(nearest(Vec::<(usize, Position)>::new(), reference), None);
    }
}
