//! Property-based tests for rotation and session driving
//!
//! These tests verify invariants that must hold for any roster, seed and
//! stop condition:
//! - Random rotation never picks the persona who just spoke
//! - Round-robin always advances to the roster successor
//! - A turn limit of n yields exactly n turns and n snapshots
//! - The same seed reproduces the same speaker order

use super::rotation::{Decision, Rotation, RotationPolicy, StopReason};
use super::session::Session;
use super::state::{ConversationState, StopCondition, Transcript};
use super::turn::TurnExecutor;
use crate::persona::{Persona, PersonaRegistry};
use crate::testing::MockLlmClient;
use futures::StreamExt;
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

// ============================================================================
// Test Helpers
// ============================================================================

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
}

/// Drive a rotation for `steps` decisions, committing a turn for each speaker.
fn speaker_sequence(policy: RotationPolicy, seed: u64, steps: u32) -> Vec<Persona> {
    let mut rotation = Rotation::seeded(policy, Persona::ALL.to_vec(), seed);
    let now = Instant::now();
    let mut state =
        ConversationState::new("Widget", Persona::Ceo, StopCondition::TurnLimit(u32::MAX));
    let mut speakers = vec![Persona::Ceo];

    for _ in 0..steps {
        let speaker = *speakers.last().unwrap();
        state.commit_turn(speaker, state.transcript.with_turn(speaker, "ok"));
        match rotation.next(&state, now).unwrap() {
            Decision::Speak(next) => speakers.push(next),
            Decision::Terminate(reason) => panic!("unexpected stop: {reason:?}"),
        }
    }
    speakers
}

fn session(seed: u64, limit: u32, llm: Arc<MockLlmClient>) -> Session {
    let executor = TurnExecutor::new(
        llm,
        Arc::new(PersonaRegistry::default()),
        Duration::from_secs(5),
    );
    let rotation = Rotation::seeded(RotationPolicy::Random, Persona::ALL.to_vec(), seed);
    Session::new(executor, rotation, "Widget", StopCondition::TurnLimit(limit))
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_policy() -> impl Strategy<Value = RotationPolicy> {
    prop_oneof![Just(RotationPolicy::Random), Just(RotationPolicy::RoundRobin)]
}

fn arb_utterance() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,!?]{1,60}".prop_map(|s| s.trim().to_string())
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn random_rotation_never_repeats_speaker(seed in any::<u64>(), steps in 1u32..60) {
        let speakers = speaker_sequence(RotationPolicy::Random, seed, steps);
        for pair in speakers.windows(2) {
            prop_assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn round_robin_follows_roster_order(seed in any::<u64>(), steps in 1u32..30) {
        let speakers = speaker_sequence(RotationPolicy::RoundRobin, seed, steps);
        for (i, speaker) in speakers.iter().enumerate() {
            prop_assert_eq!(*speaker, Persona::ALL[i % Persona::ALL.len()]);
        }
    }

    #[test]
    fn same_seed_same_order(policy in arb_policy(), seed in any::<u64>(), steps in 1u32..40) {
        prop_assert_eq!(
            speaker_sequence(policy, seed, steps),
            speaker_sequence(policy, seed, steps)
        );
    }

    #[test]
    fn turn_limit_stops_exactly_at_limit(
        policy in arb_policy(),
        seed in any::<u64>(),
        limit in 1u32..20,
        taken in 0u32..30,
    ) {
        let mut rotation = Rotation::seeded(policy, Persona::ALL.to_vec(), seed);
        let mut state =
            ConversationState::new("Widget", Persona::Ceo, StopCondition::TurnLimit(limit));
        state.turns_taken = taken;

        let decision = rotation.next(&state, Instant::now()).unwrap();
        if taken >= limit {
            prop_assert_eq!(decision, Decision::Terminate(StopReason::TurnLimitReached));
        } else {
            prop_assert!(matches!(decision, Decision::Speak(_)));
        }
    }

    #[test]
    fn transcript_is_append_only(utterances in prop::collection::vec(arb_utterance(), 1..10)) {
        let mut transcript = Transcript::new("Widget");
        for (i, utterance) in utterances.iter().enumerate() {
            let persona = Persona::ALL[i % Persona::ALL.len()];
            let next = transcript.with_turn(persona, utterance);
            prop_assert!(next.as_str().starts_with(transcript.as_str()));
            let expected_suffix = format!("\n**{}**: {}\n", persona.display_name(), utterance);
            prop_assert!(next.as_str().ends_with(&expected_suffix));
            transcript = next;
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn count_bounded_session_takes_exactly_n_turns(seed in any::<u64>(), limit in 0u32..12) {
        let llm = Arc::new(MockLlmClient::repeating("ok"));
        let snapshots: Vec<_> = runtime()
            .block_on(session(seed, limit, llm.clone()).stream().collect::<Vec<_>>())
            .into_iter()
            .map(Result::unwrap)
            .collect();

        prop_assert_eq!(llm.recorded_requests().len(), limit as usize);
        let last = snapshots.last().unwrap();
        prop_assert!(last.finished);
        prop_assert_eq!(last.turns_taken, limit);
        prop_assert_eq!(last.transcript.matches(": ok\n").count(), limit as usize);

        if limit == 0 {
            prop_assert_eq!(snapshots.len(), 1);
            prop_assert_eq!(last.transcript.as_str(), "**Product**: Widget\n");
        } else {
            prop_assert_eq!(snapshots.len(), limit as usize);
            prop_assert!(snapshots[..snapshots.len() - 1].iter().all(|s| !s.finished));
            for (i, snapshot) in snapshots.iter().enumerate() {
                prop_assert_eq!(snapshot.turns_taken as usize, i + 1);
            }
        }
    }
}
