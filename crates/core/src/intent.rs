use std::cmp::Ordering;

use crate::models::{Intent, IntentScore};

pub const RELEVANCE_THRESHOLD: f32 = 0.3;
pub const MAX_RELEVANT_INTENTS: usize = 2;

/// Picks the intents worth answering from a multi-label score set.
///
/// Scores must be strictly above `threshold`. Actionable intents rank ahead of
/// courteous ones; within each group the higher score wins.
pub fn select_relevant_intents(
    scores: &[IntentScore],
    threshold: f32,
    limit: usize,
) -> Vec<IntentScore> {
    let mut candidates = scores
        .iter()
        .copied()
        .filter(|entry| entry.score > threshold)
        .collect::<Vec<_>>();

    candidates.sort_by(|lhs, rhs| {
        rhs.intent
            .is_actionable()
            .cmp(&lhs.intent.is_actionable())
            .then_with(|| rhs.score.partial_cmp(&lhs.score).unwrap_or(Ordering::Equal))
    });
    candidates.truncate(limit);
    candidates
}

pub fn primary_intent(relevant: &[IntentScore]) -> Intent {
    relevant
        .first()
        .map(|entry| entry.intent)
        .unwrap_or(Intent::Other)
}
