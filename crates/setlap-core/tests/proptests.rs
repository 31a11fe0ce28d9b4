//! Property tests for the index and count encodings.

use proptest::prelude::*;
use setlap_core::codec::{
    compress_counts, compress_indices, decompress_counts_within, decompress_indices,
    decompress_indices_within, from_indices_array, to_counts_array, to_indices_array, Compress,
};

/// Sorted, distinct indices below 200, scattered at random.
fn arb_sorted_indices() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::btree_set(0usize..200, 0..60).prop_map(|set| set.into_iter().collect())
}

/// Sorted indices built from runs of length 1 to 5 separated by gaps, so
/// short runs (including pairs) show up in most cases.
fn arb_runs() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec((1usize..4, 1usize..6), 0..12).prop_map(|runs| {
        let mut out = Vec::new();
        let mut next = 0;
        for (gap, len) in runs {
            next += gap;
            out.extend(next..next + len);
            next += len;
        }
        out
    })
}

fn arb_compress() -> impl Strategy<Value = Compress> {
    prop_oneof![Just(Compress::Auto), Just(Compress::Yes), Just(Compress::No)]
}

fn universe() -> Vec<String> {
    (0..200).map(|i| format!("e{i}")).collect()
}

proptest! {
    #[test]
    fn prop_indices_resolve_against_universe(
        xs in prop_oneof![arb_sorted_indices(), arb_runs()],
        compress in arb_compress(),
    ) {
        let universe = universe();
        let encoded = to_indices_array(&xs, compress);
        let decoded = from_indices_array(&encoded, &universe).unwrap();
        let expected: Vec<String> = xs.iter().map(|&i| universe[i].clone()).collect();
        prop_assert_eq!(decoded, expected);
    }

    #[test]
    fn prop_compressed_string_round_trips(xs in arb_runs()) {
        let encoded = compress_indices(&xs);
        prop_assert_eq!(decompress_indices(&encoded).unwrap(), xs.clone());
        prop_assert!(!encoded.contains("+1,") && !encoded.ends_with("+1"));
    }

    #[test]
    fn prop_bounded_decode_rejects_indices_past_len(xs in arb_runs()) {
        prop_assume!(!xs.is_empty());
        let encoded = compress_indices(&xs);
        let max = *xs.last().unwrap();
        prop_assert_eq!(decompress_indices_within(&encoded, max + 1).unwrap(), xs);
        prop_assert!(decompress_indices_within(&encoded, max).is_err());
    }

    #[test]
    fn prop_counts_round_trip(
        row in prop::collection::vec(0usize..4, 0..80),
        compress in arb_compress(),
    ) {
        let encoded = to_counts_array(&row, compress);
        prop_assert_eq!(encoded.to_counts().unwrap(), row.clone());
        prop_assert_eq!(encoded.to_counts_within(row.len()).unwrap(), row.clone());
        if !row.is_empty() {
            prop_assert!(encoded.to_counts_within(row.len() - 1).is_err());
        }
        prop_assert_eq!(decompress_counts_within(&compress_counts(&row), row.len()).unwrap(), row);
    }
}
