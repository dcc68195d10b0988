// ABOUTME: Recommended-dishes flow: the model picks from the top of the heuristic ranking
// ABOUTME: Picks are resolved against candidates, deduplicated and topped up from the ranking
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use mealmate_core::constants::limits::{DEFAULT_RECOMMENDATIONS, MAX_RECOMMENDATIONS};
use mealmate_core::models::Dish;
use mealmate_intelligence::{heuristic_reason, rank_dishes, ScoredDish};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use uuid::Uuid;

use super::context::{candidates_json, UserContext};
use super::{parse_response, FlowError, FlowResult, FlowRunner};
use crate::errors::{AppError, AppResult};
use crate::llm::prompts::{render, system_prompt, RECOMMEND_DISHES_TEMPLATE};
use crate::llm::ChatMessage;

/// One recommended dish
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DishRecommendation {
    /// Catalogue dish
    pub dish: Dish,
    /// Heuristic score
    pub score: f64,
    /// Why it was picked
    pub reason: String,
}

impl DishRecommendation {
    fn heuristic(scored: &ScoredDish) -> Self {
        Self {
            dish: scored.dish.clone(),
            score: scored.score,
            reason: heuristic_reason(scored),
        }
    }
}

/// Recommended-dishes payload
#[derive(Debug, Clone, Serialize)]
pub struct RecommendedDishes {
    /// Best first
    pub recommendations: Vec<DishRecommendation>,
}

#[derive(Deserialize)]
struct ModelRecommendations {
    recommendations: Vec<ModelPick>,
}

#[derive(Deserialize)]
struct ModelPick {
    name: String,
    #[serde(default)]
    reason: Option<String>,
}

fn validate_picks(
    value: Value,
    candidates: &[ScoredDish],
    limit: usize,
) -> Result<Vec<DishRecommendation>, FlowError> {
    let response: ModelRecommendations = parse_response(value)?;

    let mut seen: HashSet<Uuid> = HashSet::new();
    let mut unknown = Vec::new();
    let mut picks = Vec::new();

    for pick in response.recommendations {
        let Some(scored) = candidates.iter().find(|s| s.dish.name_matches(&pick.name)) else {
            unknown.push(format!("\"{}\" is not one of the candidate dishes", pick.name));
            continue;
        };
        if !seen.insert(scored.dish.id) || picks.len() >= limit {
            continue;
        }
        let reason = pick
            .reason
            .map(|r| r.trim().to_owned())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| heuristic_reason(scored));
        picks.push(DishRecommendation {
            dish: scored.dish.clone(),
            score: scored.score,
            reason,
        });
    }

    if picks.is_empty() {
        if unknown.is_empty() {
            unknown.push("no dishes were recommended".to_owned());
        }
        return Err(FlowError::Validation(unknown));
    }
    Ok(picks)
}

fn top_up(picks: &mut Vec<DishRecommendation>, ranked: &[ScoredDish], limit: usize) {
    let chosen: HashSet<Uuid> = picks.iter().map(|p| p.dish.id).collect();
    let missing = limit.saturating_sub(picks.len());
    picks.extend(
        ranked
            .iter()
            .filter(|s| !chosen.contains(&s.dish.id))
            .take(missing)
            .map(DishRecommendation::heuristic),
    );
}

impl FlowRunner {
    /// Recommend up to `limit` dishes for the user
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` when `limit` is outside `1..=20`
    pub async fn suggest_recommended_dishes(
        &self,
        ctx: &UserContext,
        limit: Option<usize>,
    ) -> AppResult<FlowResult<RecommendedDishes>> {
        let limit = limit.unwrap_or(DEFAULT_RECOMMENDATIONS);
        if !(1..=MAX_RECOMMENDATIONS).contains(&limit) {
            return Err(AppError::out_of_range(format!(
                "limit must be between 1 and {MAX_RECOMMENDATIONS}"
            )));
        }

        let ranked = rank_dishes(&ctx.catalogue, &ctx.scoring());
        if ranked.is_empty() {
            return Ok(FlowResult::fallback(
                0,
                RecommendedDishes {
                    recommendations: Vec::new(),
                },
            ));
        }

        let pool = (limit * 3).max(self.config().max_candidates).min(ranked.len());
        let candidates = &ranked[..pool];

        let task = render(RECOMMEND_DISHES_TEMPLATE, &[("limit", limit.to_string())]);
        let messages = vec![
            ChatMessage::system(system_prompt(&task)),
            ChatMessage::user(format!(
                "{}\nCandidate dishes:\n{}",
                ctx.user_summary(None),
                candidates_json(candidates)
            )),
        ];

        let (picked, attempts) = self
            .run("recommended_dishes", messages, |value| {
                validate_picks(value, candidates, limit)
            })
            .await;

        Ok(match picked {
            Some(mut recommendations) => {
                top_up(&mut recommendations, &ranked, limit);
                FlowResult::ai(attempts, RecommendedDishes { recommendations })
            }
            None => FlowResult::fallback(
                attempts,
                RecommendedDishes {
                    recommendations: ranked
                        .iter()
                        .take(limit)
                        .map(DishRecommendation::heuristic)
                        .collect(),
                },
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mealmate_core::models::{DishCategory, VirtualProfile};
    use mealmate_intelligence::ScoringContext;
    use serde_json::json;

    fn ranked() -> Vec<ScoredDish> {
        let now = Utc::now();
        let dishes: Vec<Dish> = ["Pho Bo", "Bun Cha", "Com Tam"]
            .iter()
            .map(|name| Dish {
                id: Uuid::new_v4(),
                name: (*name).to_owned(),
                category: DishCategory::MainCourse,
                origin: "vietnamese".to_owned(),
                calories: 600,
                description: None,
                image_url: None,
                ingredients: vec![],
                tags: vec![],
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .collect();
        let profile = VirtualProfile::empty(Uuid::new_v4(), now);
        rank_dishes(&dishes, &ScoringContext::new(&profile))
    }

    #[test]
    fn test_picks_dedupe_and_keep_model_reasons() {
        let ranked = ranked();
        let value = json!({"recommendations": [
            {"name": "pho bo", "reason": "Warm and light"},
            {"name": "Pho Bo", "reason": "again"},
            {"name": "Pizza"},
        ]});

        let picks = validate_picks(value, &ranked, 5).unwrap_or_default();
        assert_eq!(picks.len(), 1);
        assert_eq!(picks[0].dish.name, "Pho Bo");
        assert_eq!(picks[0].reason, "Warm and light");
    }

    #[test]
    fn test_all_unknown_picks_are_rejected() {
        let value = json!({"recommendations": [{"name": "Pizza"}]});
        let Err(FlowError::Validation(violations)) = validate_picks(value, &ranked(), 5) else {
            unreachable!("expected validation failure");
        };
        assert!(violations[0].contains("Pizza"));
    }

    #[test]
    fn test_top_up_fills_from_ranking_without_duplicates() {
        let ranked = ranked();
        let mut picks = vec![DishRecommendation::heuristic(&ranked[2])];
        top_up(&mut picks, &ranked, 3);

        let ids: HashSet<Uuid> = picks.iter().map(|p| p.dish.id).collect();
        assert_eq!(picks.len(), 3);
        assert_eq!(ids.len(), 3);
    }
}
