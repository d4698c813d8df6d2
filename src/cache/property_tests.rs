//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the invariants tag invalidation relies on.

use proptest::prelude::*;
use serde_json::json;
use std::collections::HashMap;

use crate::cache::{key_index, CacheStore, Envelope, Payload, TagState, Tags, Verdict};

// == Strategies ==
fn tag_strategy() -> impl Strategy<Value = String> {
    prop_oneof![Just("a".to_string()), Just("b".to_string()), Just("c".to_string())]
}

/// A local invalidation, or a publish round that fails or is cut short.
#[derive(Debug, Clone)]
enum TagOp {
    Invalidate { tag: String, instant: u64 },
    FailedPublish,
    CancelledPublish,
    SuccessfulPublish,
}

fn tag_op_strategy() -> impl Strategy<Value = TagOp> {
    prop_oneof![
        (tag_strategy(), 0u64..1_000).prop_map(|(tag, instant)| TagOp::Invalidate { tag, instant }),
        Just(TagOp::FailedPublish),
        Just(TagOp::CancelledPublish),
        Just(TagOp::SuccessfulPublish),
    ]
}

fn snapshot_strategy() -> impl Strategy<Value = HashMap<String, u64>> {
    prop::collection::hash_map(tag_strategy(), 0u64..1_000, 0..3)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Key index is a pure function ending in the byte length.
    #[test]
    fn prop_key_index_deterministic(input in ".{0,64}") {
        let index = key_index(&input);
        prop_assert_eq!(&index, &key_index(input.as_bytes()));
        let length = format!(":{}", input.len());
        prop_assert!(index.ends_with(&length));
    }

    // Known instants only move forward, whatever the order of invalidations.
    #[test]
    fn prop_invalidation_never_regresses(
        ops in prop::collection::vec((tag_strategy(), 0u64..1_000), 1..40)
    ) {
        let mut state = TagState::new(0);
        let mut expected: HashMap<String, u64> = HashMap::new();

        for (tag, instant) in ops {
            state.invalidate(&tag, instant, true);
            let max = expected.entry(tag.clone()).or_insert(instant);
            *max = (*max).max(instant);
            prop_assert_eq!(state.instant(&tag), Some(*max));
        }
    }

    // Failed or cancelled publishes never lose an update nor surface an
    // older instant than the latest local invalidation.
    #[test]
    fn prop_pending_survives_failed_publishes(
        ops in prop::collection::vec(tag_op_strategy(), 1..60)
    ) {
        let mut state = TagState::new(0);
        let mut unpublished: HashMap<String, u64> = HashMap::new();

        for op in ops {
            match op {
                TagOp::Invalidate { tag, instant } => {
                    state.invalidate(&tag, instant, true);
                    let max = unpublished.entry(tag).or_insert(instant);
                    *max = (*max).max(instant);
                }
                TagOp::FailedPublish => {
                    // snapshot taken, every write rejected: nothing confirmed
                    let _ = state.pending_snapshot();
                }
                TagOp::CancelledPublish => {
                    // snapshot taken, then a newer invalidation, then the
                    // cycle is dropped before confirming
                    let snapshot = state.pending_snapshot();
                    if let Some((tag, instant)) = snapshot.into_iter().next() {
                        state.invalidate(&tag, instant + 1, true);
                        let max = unpublished.entry(tag).or_insert(instant + 1);
                        *max = (*max).max(instant + 1);
                    }
                }
                TagOp::SuccessfulPublish => {
                    for (tag, instant) in state.pending_snapshot() {
                        state.confirm_pending(&tag, instant);
                    }
                    unpublished.clear();
                }
            }
        }

        prop_assert_eq!(state.pending_len(), unpublished.len());
        for (tag, instant) in &unpublished {
            prop_assert_eq!(state.pending_instant(tag), Some(*instant));
        }
    }

    // Merging keeper snapshots in any order ends at the per-tag maximum.
    #[test]
    fn prop_merge_order_independent(snapshots in prop::collection::vec(snapshot_strategy(), 1..6)) {
        let mut forward = TagState::new(0);
        let mut backward = TagState::new(0);

        for snapshot in &snapshots {
            forward.merge(snapshot);
        }
        for snapshot in snapshots.iter().rev() {
            backward.merge(snapshot);
        }

        for tag in ["a", "b", "c"] {
            let expected = snapshots.iter().filter_map(|s| s.get(tag).copied()).max();
            prop_assert_eq!(forward.instant(tag), expected);
            prop_assert_eq!(backward.instant(tag), expected);
        }
    }

    // A live entry is invalidated exactly when it was written at or before
    // the invalidation of one of its tags.
    #[test]
    fn prop_verdict_follows_insertion_order(
        inserted in 1u64..1_000,
        invalidated in 1u64..1_000,
        tagged in any::<bool>()
    ) {
        let tags = if tagged { Tags::from("a") } else { Tags::new() };
        let envelope = Envelope::new("k", json!(1), inserted, 10_000, tags);
        let mut state = TagState::new(0);
        state.invalidate("a", invalidated, false);

        let verdict = envelope.verdict("k", inserted, &state);
        if tagged && inserted <= invalidated {
            prop_assert_eq!(verdict, Verdict::Invalidated { tag: "a".to_string() });
        } else {
            prop_assert!(verdict.is_valid());
        }
    }

    // Normalized tag sets hold no blanks, no padding and no duplicates.
    #[test]
    fn prop_tags_normalized(raw in prop::collection::vec("[ a-c]{0,3}", 0..10)) {
        let tags = Tags::from(raw);
        let collected: Vec<&str> = tags.iter().collect();
        for (position, tag) in collected.iter().enumerate() {
            prop_assert!(!tag.is_empty());
            prop_assert_eq!(tag.trim(), *tag);
            prop_assert!(!collected[..position].contains(tag));
        }
    }

    // The in-memory store never holds more slots than its capacity.
    #[test]
    fn prop_capacity_enforcement(keys in prop::collection::vec("[a-z0-9]{1,8}", 1..200)) {
        let max_entries = 50;
        let mut store = CacheStore::new(max_entries, None);

        for key in keys {
            store.set(key.clone(), Payload::Encoded(key), None).unwrap();
            prop_assert!(
                store.len() <= max_entries,
                "Store size {} exceeds max {}",
                store.len(),
                max_entries
            );
        }
    }
}
