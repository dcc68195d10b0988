// ABOUTME: Folds dish interaction events into a user's virtual taste profile
// ABOUTME: Applies decay, weighted increments, clamping and pruning of negligible scores
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use chrono::{DateTime, Utc};
use mealmate_core::constants::profile::{DECAY, MAX_SCORE, PRUNE_EPSILON};
use mealmate_core::models::{Dish, InteractionKind, VirtualProfile};
use std::collections::BTreeMap;

/// Apply one interaction with `dish` to `profile`
///
/// Existing scores decay by [`DECAY`] first, then the interaction weight is
/// added to the dish's origin and category. All scores stay within
/// `[-MAX_SCORE, MAX_SCORE]` and entries that decay to near zero are removed.
pub fn apply_interaction(
    profile: &mut VirtualProfile,
    dish: &Dish,
    kind: InteractionKind,
    now: DateTime<Utc>,
) {
    decay(&mut profile.origin_scores);
    decay(&mut profile.category_scores);

    let weight = kind.weight();
    *profile
        .origin_scores
        .entry(Dish::normalize_origin(&dish.origin))
        .or_insert(0.0) += weight;
    *profile.category_scores.entry(dish.category).or_insert(0.0) += weight;

    clamp_and_prune(&mut profile.origin_scores);
    clamp_and_prune(&mut profile.category_scores);

    profile.interactions = profile.interactions.saturating_add(1);
    profile.updated_at = now;
}

/// Highest-scoring origins with a positive score, best first
#[must_use]
pub fn top_origins(profile: &VirtualProfile, n: usize) -> Vec<(String, f64)> {
    let mut origins: Vec<(String, f64)> = profile
        .origin_scores
        .iter()
        .filter(|(_, score)| **score > 0.0)
        .map(|(origin, score)| (origin.clone(), *score))
        .collect();
    origins.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    origins.truncate(n);
    origins
}

fn decay<K: Ord>(scores: &mut BTreeMap<K, f64>) {
    for score in scores.values_mut() {
        *score *= DECAY;
    }
}

fn clamp_and_prune<K: Ord>(scores: &mut BTreeMap<K, f64>) {
    for score in scores.values_mut() {
        *score = score.clamp(-MAX_SCORE, MAX_SCORE);
    }
    scores.retain(|_, score| score.abs() >= PRUNE_EPSILON);
}
