//! Property-based test generators using proptest.
//!
//! Provides strategies for generating card records and decks that the
//! document decoder accepts.

use cardsync_codec::CardRecord;
use proptest::prelude::*;

/// Strategy for generating card text: one to three trimmed lines that never
/// form a delimiter line.
pub fn card_text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::string::string_regex("[A-Za-z0-9?][A-Za-z0-9 ?.,+()`]{0,30}").expect("Invalid regex"),
        1..4,
    )
    .prop_map(|lines| lines.join("\n").trim().to_string())
}

/// Strategy for generating a tag list (may contain repeats).
pub fn tags_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop::string::string_regex("[a-z][a-z0-9_]{0,8}").expect("Invalid regex"),
        0..4,
    )
}

/// Strategy for generating a pending card record.
pub fn card_record_strategy() -> impl Strategy<Value = CardRecord> {
    (
        card_text_strategy(),
        card_text_strategy(),
        tags_strategy(),
        any::<bool>(),
    )
        .prop_map(|(question, answer, tags, archived)| {
            CardRecord::new(question, answer)
                .with_tags(tags)
                .with_archived(archived)
        })
}

/// Strategy for generating a local deck: some cards carry distinct ids
/// `c0`, `c1`, ..., the rest are pending.
pub fn local_deck_strategy(max_cards: usize) -> impl Strategy<Value = Vec<CardRecord>> {
    prop::collection::vec((card_record_strategy(), any::<bool>()), 0..max_cards).prop_map(
        |cards| {
            cards
                .into_iter()
                .enumerate()
                .map(|(i, (card, known))| {
                    if known {
                        card.with_remote_id(format!("c{}", i))
                    } else {
                        card
                    }
                })
                .collect()
        },
    )
}

/// Strategy for generating a remote deck: every card has a distinct id
/// `r0`, `r1`, ....
pub fn remote_deck_strategy(max_cards: usize) -> impl Strategy<Value = Vec<CardRecord>> {
    prop::collection::vec(card_record_strategy(), 0..max_cards).prop_map(|cards| {
        cards
            .into_iter()
            .enumerate()
            .map(|(i, card)| card.with_remote_id(format!("r{}", i)))
            .collect()
    })
}

/// Strategy for generating a local deck that references a remote deck:
/// each card either reuses an id `r0`..`r{id_space}` or is pending.
pub fn referencing_deck_strategy(
    max_cards: usize,
    id_space: usize,
) -> impl Strategy<Value = Vec<CardRecord>> {
    prop::collection::vec(
        (card_record_strategy(), prop::option::of(0..id_space.max(1))),
        0..max_cards,
    )
    .prop_map(|cards| {
        cards
            .into_iter()
            .map(|(card, id)| match id {
                Some(id) => card.with_remote_id(format!("r{}", id)),
                None => card,
            })
            .collect()
    })
}

/// Strategy for generating one line of remote card text, including lines
/// that resemble document syntax (`#`, `key: value`, inline or escaped
/// `---`).
pub fn remote_line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => prop::string::string_regex("[A-Za-z0-9?#:`\\\\][A-Za-z0-9 ?#:`\\\\-]{0,24}")
            .expect("Invalid regex"),
        1 => Just("card_id: c0".to_string()),
        1 => Just("tags: [\"x\"]".to_string()),
        1 => Just("# heading".to_string()),
        1 => Just("a---b".to_string()),
        1 => Just("\\---".to_string()),
    ]
}

/// Strategy for generating one side of a remote card.
pub fn remote_side_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(remote_line_strategy(), 1..4)
        .prop_map(|lines| lines.join("\n").trim().to_string())
}

/// Strategy for generating raw remote card content: a question side
/// followed by one or more sides, joined by `---` separator lines.
pub fn remote_content_strategy() -> impl Strategy<Value = String> {
    (
        remote_side_strategy(),
        prop::collection::vec(remote_side_strategy(), 1..4),
    )
        .prop_map(|(question, sides)| {
            std::iter::once(question)
                .chain(sides)
                .collect::<Vec<_>>()
                .join("\n---\n")
        })
}

/// Strategy for generating a remote deck from raw content, the way a
/// service listing produces it. Ids are distinct: `r0`, `r1`, ....
pub fn remote_content_deck_strategy(max_cards: usize) -> impl Strategy<Value = Vec<CardRecord>> {
    prop::collection::vec(
        (remote_content_strategy(), tags_strategy(), any::<bool>()),
        0..max_cards,
    )
    .prop_map(|cards| {
        cards
            .into_iter()
            .enumerate()
            .map(|(i, (content, tags, archived))| {
                CardRecord::from_remote(format!("r{}", i), &content, tags, archived)
            })
            .collect()
    })
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 64,
            max_shrink_iters: 200,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::seeded_service;
    use cardsync_codec::{decode_document, encode_document, join_content, split_content};
    use cardsync_engine::{plan, Operation, OperationKind, SyncEngine};
    use std::collections::HashSet;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn document_round_trip(records in local_deck_strategy(8)) {
            let document = encode_document(&records);
            let decoded = decode_document(&document).unwrap();
            prop_assert_eq!(decoded, records);
        }

        #[test]
        fn push_after_pull_is_empty(remote in remote_deck_strategy(12)) {
            let engine = SyncEngine::new(seeded_service("d1", &remote)).with_page_size(5);
            let pulled = engine.pull("d1").unwrap();
            let planned = engine.plan_push("d1", &pulled.document, false).unwrap();
            prop_assert!(planned.is_empty());
        }

        #[test]
        fn push_after_pull_of_raw_content_is_empty(remote in remote_content_deck_strategy(8)) {
            let engine = SyncEngine::new(seeded_service("d1", &remote)).with_page_size(3);
            let pulled = engine.pull("d1").unwrap();
            prop_assert_eq!(decode_document(&pulled.document).unwrap(), remote);
            let planned = engine.plan_push("d1", &pulled.document, false).unwrap();
            prop_assert!(planned.is_empty());
        }

        #[test]
        fn raw_content_round_trips_through_split(content in remote_content_strategy()) {
            let (question, answer) = split_content(&content);
            let card = CardRecord::from_remote("r0", &content, Vec::<String>::new(), false);
            prop_assert_eq!(join_content(question, answer), card.content());
            prop_assert!(!answer.is_empty());
            let card_content = card.content();
            let (question_again, answer_again) = split_content(&card_content);
            prop_assert_eq!((question_again, answer_again), (question, answer));
        }

        #[test]
        fn pending_copy_of_remote_card(
            remote in remote_deck_strategy(8).prop_filter("non-empty", |r| !r.is_empty()),
            pick in any::<prop::sample::Index>(),
        ) {
            let original = &remote[pick.index(remote.len())];
            let copy = CardRecord::new(original.question.clone(), original.answer.clone());
            let local = vec![copy];

            let suppressed = plan(&local, &remote, false);
            prop_assert_eq!(suppressed.summary().creates, 0);
            prop_assert_eq!(suppressed.duplicates.len(), 1);

            let forced = plan(&local, &remote, true);
            prop_assert_eq!(forced.summary().creates, 1);
            prop_assert!(forced.duplicates.is_empty());
        }

        #[test]
        fn unreferenced_remote_cards_are_deleted_once(
            remote in remote_deck_strategy(10),
            keep in prop::collection::vec(any::<bool>(), 10),
        ) {
            let local: Vec<CardRecord> = remote
                .iter()
                .zip(&keep)
                .filter(|(_, keep)| **keep)
                .map(|(card, _)| card.clone())
                .collect();
            let expected: Vec<&str> = remote
                .iter()
                .zip(&keep)
                .filter(|(_, keep)| !**keep)
                .filter_map(|(card, _)| card.remote_id.as_deref())
                .collect();

            let plan = plan(&local, &remote, false);
            let deleted: Vec<&str> = plan
                .operations
                .iter()
                .filter_map(|op| match op {
                    Operation::Delete { remote_id } => Some(remote_id.as_str()),
                    _ => None,
                })
                .collect();
            prop_assert_eq!(deleted, expected);
            prop_assert_eq!(plan.len(), plan.summary().deletes);
        }

        #[test]
        fn deletes_never_precede_writes(
            remote in remote_deck_strategy(8),
            local in referencing_deck_strategy(8, 10),
            force in any::<bool>(),
        ) {
            let plan = plan(&local, &remote, force);
            let kinds: Vec<OperationKind> = plan.operations.iter().map(|op| op.kind()).collect();
            let mut sorted = kinds.clone();
            sorted.sort();
            prop_assert_eq!(kinds, sorted);

            let ids: Vec<&str> = plan.operations.iter().filter_map(|op| op.remote_id()).collect();
            let distinct: HashSet<&str> = ids.iter().copied().collect();
            prop_assert_eq!(ids.len(), distinct.len());
        }
    }

    #[test]
    fn generated_text_is_trimmed() {
        use proptest::strategy::ValueTree;
        use proptest::test_runner::TestRunner;

        let mut runner = TestRunner::default();
        for _ in 0..32 {
            let text = card_text_strategy().new_tree(&mut runner).unwrap().current();
            assert!(!text.is_empty());
            assert_eq!(text.trim(), text);
        }
    }
}
