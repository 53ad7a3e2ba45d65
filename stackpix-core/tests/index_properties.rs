use proptest::prelude::*;
use stackpix_core::{
    bool_mask_to_indices, index_generator, indices_to_bool_mask, indices_to_index_array,
};
use std::collections::BTreeSet;

fn shape_strategy() -> impl Strategy<Value = Vec<usize>> {
    proptest::collection::vec(0_usize..5, 0..4)
}

/// A shape together with a (possibly repeating) list of valid indices into it.
fn shape_and_indices() -> impl Strategy<Value = (Vec<usize>, Vec<Vec<usize>>)> {
    proptest::collection::vec(1_usize..5, 0..4).prop_flat_map(|shape| {
        let index = shape
            .iter()
            .map(|&size| 0..size)
            .collect::<Vec<_>>();
        let indices = proptest::collection::vec(index, 0..12);
        (Just(shape), indices)
    })
}

proptest! {
    #[test]
    fn generator_count_is_product(shape in shape_strategy()) {
        let expected: usize = shape.iter().product();
        let generator = index_generator(&shape);
        prop_assert_eq!(generator.total(), Some(expected));
        prop_assert_eq!(generator.size_hint(), (expected, Some(expected)));
        prop_assert_eq!(generator.count(), expected);
    }

    #[test]
    fn generator_stays_in_bounds_and_is_sorted(shape in shape_strategy()) {
        let all: Vec<_> = index_generator(&shape).collect();
        for index in &all {
            prop_assert_eq!(index.len(), shape.len());
            for (coord, size) in index.iter().zip(&shape) {
                prop_assert!(coord < size);
            }
        }
        // row-major order is lexicographic order
        for pair in all.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn mask_round_trip_recovers_index_set((shape, indices) in shape_and_indices()) {
        let mask = indices_to_bool_mask(&indices, &shape).unwrap();
        let recovered: BTreeSet<_> = bool_mask_to_indices(&mask).into_iter().collect();
        let expected: BTreeSet<_> = indices.iter().cloned().collect();
        prop_assert_eq!(recovered, expected);
    }

    #[test]
    fn mask_is_idempotent((shape, indices) in shape_and_indices()) {
        let once = indices_to_bool_mask(&indices, &shape).unwrap();
        let doubled: Vec<_> = indices.iter().chain(indices.iter()).cloned().collect();
        let twice = indices_to_bool_mask(&doubled, &shape).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn index_array_transposes_tuples((shape, indices) in shape_and_indices()) {
        let arrays = indices_to_index_array(&indices).unwrap();
        if indices.is_empty() {
            prop_assert!(arrays.is_empty());
        } else {
            prop_assert_eq!(arrays.len(), shape.len());
            for (i, index) in indices.iter().enumerate() {
                for (axis, &coord) in index.iter().enumerate() {
                    prop_assert_eq!(arrays[axis][i], coord);
                }
            }
        }
    }
}

#[test]
fn test_mask_of_generated_indices_is_full() {
    let shape = [2, 3, 2];
    let all: Vec<_> = index_generator(&shape).collect();
    let mask = indices_to_bool_mask(&all, &shape).unwrap();
    assert!(mask.iter().all(|&set| set));
}
