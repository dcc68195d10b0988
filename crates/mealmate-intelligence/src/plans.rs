// ABOUTME: Day and multi-day meal plan structures with catalogue validation
// ABOUTME: Resolves proposed plans against the dish catalogue and builds randomized fallback plans
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealmate contributors

use chrono::{Days, NaiveDate};
use mealmate_core::constants::nutrition::DAY_PLAN_TOLERANCE;
use mealmate_core::constants::scoring::FALLBACK_POOL;
use mealmate_core::models::{Dish, DishCategory, MealType};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use uuid::Uuid;

use crate::nutrition::meal_calorie_target;
use crate::scoring::{heuristic_reason, rank_for_meal, ScoredDish, ScoringContext};

/// One meal slot filled with a catalogue dish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedMeal {
    /// Slot
    pub meal_type: MealType,
    /// Catalogue dish
    pub dish_id: Uuid,
    /// Dish name
    pub dish_name: String,
    /// Calories per serving
    pub calories: u32,
    /// Why this dish was chosen
    pub reason: String,
}

impl PlannedMeal {
    fn from_dish(meal_type: MealType, dish: &Dish, reason: String) -> Self {
        Self {
            meal_type,
            dish_id: dish.id,
            dish_name: dish.name.clone(),
            calories: dish.calories,
            reason,
        }
    }
}

/// Meals for a single day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPlan {
    /// Calendar day
    pub date: NaiveDate,
    /// Meals in slot order
    pub meals: Vec<PlannedMeal>,
    /// Sum of meal calories
    pub total_calories: u32,
    /// Free-form notes
    pub notes: Option<String>,
}

impl DayPlan {
    /// Build a plan, sorting meals into slot order and totalling calories
    #[must_use]
    pub fn new(date: NaiveDate, mut meals: Vec<PlannedMeal>, notes: Option<String>) -> Self {
        meals.sort_by_key(|m| m.meal_type);
        let total_calories = meals.iter().fold(0u32, |acc, m| acc.saturating_add(m.calories));
        Self {
            date,
            meals,
            total_calories,
            notes,
        }
    }

    /// Meal planned for `meal_type`
    #[must_use]
    pub fn meal(&self, meal_type: MealType) -> Option<&PlannedMeal> {
        self.meals.iter().find(|m| m.meal_type == meal_type)
    }
}

/// Consecutive day plans
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealPlan {
    /// Days in date order
    pub days: Vec<DayPlan>,
}

/// A meal as proposed by the model, before resolution against the catalogue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposedMeal {
    /// Slot name as written by the model
    pub meal_type: String,
    /// Dish name as written by the model
    pub name: String,
    /// Optional reason
    #[serde(default)]
    pub reason: Option<String>,
}

/// A day as proposed by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposedDay {
    /// 1-based day number
    pub day: u32,
    /// Proposed meals
    #[serde(default)]
    pub meals: Vec<ProposedMeal>,
    /// Optional notes
    #[serde(default)]
    pub notes: Option<String>,
}

/// Reason a proposed plan was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanViolation {
    /// Slot name that is not a meal type
    UnknownMealType(String),
    /// Slot not filled
    MissingMealType(MealType),
    /// Slot filled more than once
    DuplicateMealType(MealType),
    /// Name not found among active dishes
    UnknownDish {
        /// Slot
        meal_type: MealType,
        /// Proposed name
        name: String,
    },
    /// Dish category not accepted by the slot
    CategoryMismatch {
        /// Slot
        meal_type: MealType,
        /// Dish name
        name: String,
        /// Dish category
        category: DishCategory,
    },
    /// Day total too far from target
    CaloriesOutOfRange {
        /// Planned total
        total: u32,
        /// Target
        target: u32,
    },
    /// Number of days differs from the request
    WrongDayCount {
        /// Requested
        expected: u32,
        /// Proposed
        actual: usize,
    },
    /// Day numbers are not exactly `1..=n`
    BadDayNumbering,
    /// Day falls past the last representable date
    DateOutOfRange {
        /// 1-based day number
        day: u32,
    },
    /// Same dish in the same slot on consecutive days
    RepeatedDish {
        /// Second of the two days
        day: u32,
        /// Slot
        meal_type: MealType,
        /// Dish name
        name: String,
    },
    /// Violation inside one day of a multi-day plan
    InDay {
        /// 1-based day number
        day: u32,
        /// Underlying violation
        violation: Box<PlanViolation>,
    },
}

impl fmt::Display for PlanViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownMealType(value) => write!(f, "unknown meal_type \"{value}\""),
            Self::MissingMealType(meal_type) => write!(f, "missing {meal_type}"),
            Self::DuplicateMealType(meal_type) => write!(f, "{meal_type} appears more than once"),
            Self::UnknownDish { meal_type, name } => {
                write!(f, "{meal_type}: \"{name}\" is not an available dish")
            }
            Self::CategoryMismatch {
                meal_type,
                name,
                category,
            } => write!(f, "{meal_type}: \"{name}\" is a {category} and cannot be served as {meal_type}"),
            Self::CaloriesOutOfRange { total, target } => write!(
                f,
                "total {total} kcal is not within {:.0}% of the {target} kcal target",
                DAY_PLAN_TOLERANCE * 100.0
            ),
            Self::WrongDayCount { expected, actual } => {
                write!(f, "expected {expected} days but got {actual}")
            }
            Self::BadDayNumbering => f.write_str("days must be numbered 1..n without gaps"),
            Self::DateOutOfRange { day } => write!(f, "day {day} is past the last supported date"),
            Self::RepeatedDish {
                day,
                meal_type,
                name,
            } => write!(f, "day {day}: \"{name}\" repeats the previous day's {meal_type}"),
            Self::InDay { day, violation } => write!(f, "day {day}: {violation}"),
        }
    }
}

/// Whether `total` is within the allowed deviation of `target`
#[must_use]
pub fn within_tolerance(total: u32, target: u32) -> bool {
    let allowed = f64::from(target) * DAY_PLAN_TOLERANCE;
    (f64::from(total) - f64::from(target)).abs() <= allowed
}

fn find_active<'d>(catalogue: &'d [Dish], name: &str) -> Option<&'d Dish> {
    catalogue.iter().find(|d| d.is_active && d.name_matches(name))
}

/// Resolve and validate a proposed day
///
/// # Errors
///
/// Returns every violation found
pub fn validate_day_plan(
    proposed: &[ProposedMeal],
    notes: Option<String>,
    catalogue: &[Dish],
    target: u32,
    date: NaiveDate,
) -> Result<DayPlan, Vec<PlanViolation>> {
    let mut violations = Vec::new();
    let mut seen: HashSet<MealType> = HashSet::new();
    let mut meals = Vec::with_capacity(proposed.len());

    for meal in proposed {
        let Ok(meal_type) = MealType::parse(&meal.meal_type) else {
            violations.push(PlanViolation::UnknownMealType(meal.meal_type.clone()));
            continue;
        };
        if !seen.insert(meal_type) {
            violations.push(PlanViolation::DuplicateMealType(meal_type));
            continue;
        }
        let Some(dish) = find_active(catalogue, &meal.name) else {
            violations.push(PlanViolation::UnknownDish {
                meal_type,
                name: meal.name.clone(),
            });
            continue;
        };
        if !meal_type.accepts(dish.category) {
            violations.push(PlanViolation::CategoryMismatch {
                meal_type,
                name: dish.name.clone(),
                category: dish.category,
            });
            continue;
        }
        let reason = meal.reason.clone().unwrap_or_default();
        meals.push(PlannedMeal::from_dish(meal_type, dish, reason));
    }

    for meal_type in MealType::ALL {
        if !seen.contains(&meal_type) {
            violations.push(PlanViolation::MissingMealType(meal_type));
        }
    }

    let plan = DayPlan::new(date, meals, notes);
    if violations.is_empty() && !within_tolerance(plan.total_calories, target) {
        violations.push(PlanViolation::CaloriesOutOfRange {
            total: plan.total_calories,
            target,
        });
    }

    if violations.is_empty() {
        Ok(plan)
    } else {
        Err(violations)
    }
}

/// Resolve and validate a proposed multi-day plan starting at `start_date`
///
/// # Errors
///
/// Returns every violation found across all days
pub fn validate_meal_plan(
    proposed: &[ProposedDay],
    catalogue: &[Dish],
    target: u32,
    start_date: NaiveDate,
    expected_days: u32,
) -> Result<MealPlan, Vec<PlanViolation>> {
    if proposed.len() != expected_days as usize {
        return Err(vec![PlanViolation::WrongDayCount {
            expected: expected_days,
            actual: proposed.len(),
        }]);
    }

    let mut ordered: Vec<&ProposedDay> = proposed.iter().collect();
    ordered.sort_by_key(|d| d.day);
    if ordered.iter().zip(1..).any(|(d, n)| d.day != n) {
        return Err(vec![PlanViolation::BadDayNumbering]);
    }

    let mut violations = Vec::new();
    let mut days: Vec<DayPlan> = Vec::with_capacity(ordered.len());
    for day in ordered {
        let Some(date) = start_date.checked_add_days(Days::new(u64::from(day.day - 1))) else {
            violations.push(PlanViolation::DateOutOfRange { day: day.day });
            continue;
        };
        match validate_day_plan(&day.meals, day.notes.clone(), catalogue, target, date) {
            Ok(plan) => {
                if let Some(previous) = days.last().filter(|p| p.date.succ_opt() == Some(date)) {
                    for meal in &plan.meals {
                        if previous
                            .meal(meal.meal_type)
                            .is_some_and(|m| m.dish_id == meal.dish_id)
                        {
                            violations.push(PlanViolation::RepeatedDish {
                                day: day.day,
                                meal_type: meal.meal_type,
                                name: meal.dish_name.clone(),
                            });
                        }
                    }
                }
                days.push(plan);
            }
            Err(day_violations) => {
                violations.extend(day_violations.into_iter().map(|v| PlanViolation::InDay {
                    day: day.day,
                    violation: Box::new(v),
                }));
            }
        }
    }

    if violations.is_empty() {
        Ok(MealPlan { days })
    } else {
        Err(violations)
    }
}

/// Pick uniformly among the top candidates, skipping `exclude` when possible
///
/// Falls back to the unfiltered top candidates when every one is excluded.
pub fn choose_random_top<'a>(
    ranked: &'a [ScoredDish],
    exclude: &HashSet<Uuid>,
    rng: &mut impl Rng,
) -> Option<&'a ScoredDish> {
    let pool: Vec<&ScoredDish> = ranked
        .iter()
        .filter(|s| !exclude.contains(&s.dish.id))
        .take(FALLBACK_POOL)
        .collect();
    if pool.is_empty() {
        let top: Vec<&ScoredDish> = ranked.iter().take(FALLBACK_POOL).collect();
        return top.choose(rng).copied();
    }
    pool.choose(rng).copied()
}

fn fill_day(
    catalogue: &[Dish],
    ctx: &ScoringContext<'_>,
    day_target: u32,
    date: NaiveDate,
    previous: Option<&HashMap<MealType, Uuid>>,
    rng: &mut impl Rng,
) -> DayPlan {
    let mut used: HashSet<Uuid> = HashSet::new();
    let mut meals = Vec::with_capacity(MealType::ALL.len());

    for meal_type in MealType::ALL {
        let slot_ctx = ctx
            .clone()
            .with_calorie_target(Some(meal_calorie_target(day_target, meal_type)));
        let ranked = rank_for_meal(catalogue, &slot_ctx, meal_type);

        let mut exclude = used.clone();
        if let Some(prev) = previous.and_then(|p| p.get(&meal_type)) {
            exclude.insert(*prev);
        }
        if let Some(choice) = choose_random_top(&ranked, &exclude, rng) {
            used.insert(choice.dish.id);
            meals.push(PlannedMeal::from_dish(
                meal_type,
                &choice.dish,
                heuristic_reason(choice),
            ));
        }
    }

    DayPlan::new(date, meals, None)
}

/// Deterministic-given-`rng` day plan built from slot rankings
///
/// Slots with no eligible dish are left out.
pub fn fallback_day_plan(
    catalogue: &[Dish],
    ctx: &ScoringContext<'_>,
    day_target: u32,
    date: NaiveDate,
    rng: &mut impl Rng,
) -> DayPlan {
    fill_day(catalogue, ctx, day_target, date, None, rng)
}

/// Multi-day fallback that avoids repeating a slot's dish on consecutive days
///
/// Stops early at the last representable date.
pub fn fallback_meal_plan(
    catalogue: &[Dish],
    ctx: &ScoringContext<'_>,
    day_target: u32,
    start_date: NaiveDate,
    days: u32,
    rng: &mut impl Rng,
) -> MealPlan {
    let mut plans: Vec<DayPlan> = Vec::with_capacity(days as usize);
    let mut previous: Option<HashMap<MealType, Uuid>> = None;
    for offset in 0..days {
        let Some(date) = start_date.checked_add_days(Days::new(u64::from(offset))) else {
            break;
        };
        let plan = fill_day(catalogue, ctx, day_target, date, previous.as_ref(), rng);
        previous = Some(plan.meals.iter().map(|m| (m.meal_type, m.dish_id)).collect());
        plans.push(plan);
    }
    MealPlan { days: plans }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mealmate_core::models::VirtualProfile;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn dish(name: &str, category: DishCategory, calories: u32) -> Dish {
        let now = Utc::now();
        Dish {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            category,
            origin: "vietnamese".to_owned(),
            calories,
            description: None,
            image_url: None,
            ingredients: vec![],
            tags: vec![],
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn catalogue() -> Vec<Dish> {
        vec![
            dish("Banh Mi", DishCategory::Breakfast, 500),
            dish("Egg Coffee", DishCategory::Drink, 150),
            dish("Pho Bo", DishCategory::Soup, 650),
            dish("Com Tam", DishCategory::MainCourse, 700),
            dish("Bun Cha", DishCategory::MainCourse, 600),
            dish("Goi Cuon", DishCategory::Salad, 300),
            dish("Che Ba Mau", DishCategory::Dessert, 250),
            dish("Banh Flan", DishCategory::Dessert, 200),
        ]
    }

    fn proposed(meal_type: &str, name: &str) -> ProposedMeal {
        ProposedMeal {
            meal_type: meal_type.to_owned(),
            name: name.to_owned(),
            reason: None,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap_or_default()
    }

    fn good_day() -> Vec<ProposedMeal> {
        vec![
            proposed("breakfast", "banh mi"),
            proposed("lunch", "Pho Bo"),
            proposed("dinner", "Bun Cha"),
            proposed("snack", "Che Ba Mau"),
        ]
    }

    #[test]
    fn test_valid_day_resolves_names_case_insensitively() {
        let plan = validate_day_plan(&good_day(), None, &catalogue(), 2000, date());
        let plan = plan.unwrap_or_else(|v| panic!("unexpected violations: {v:?}"));
        assert_eq!(plan.meals.len(), 4);
        assert_eq!(plan.meals[0].dish_name, "Banh Mi");
        assert_eq!(plan.total_calories, 2000);
    }

    #[test]
    fn test_day_plan_violations_are_collected() {
        let meals = vec![
            proposed("breakfast", "Pho Bo"),
            proposed("lunch", "Pizza"),
            proposed("lunch", "Com Tam"),
            proposed("brunch", "Banh Mi"),
        ];
        let Err(violations) = validate_day_plan(&meals, None, &catalogue(), 2000, date()) else {
            panic!("expected violations");
        };

        assert!(violations.contains(&PlanViolation::CategoryMismatch {
            meal_type: MealType::Breakfast,
            name: "Pho Bo".to_owned(),
            category: DishCategory::Soup,
        }));
        assert!(violations.contains(&PlanViolation::UnknownDish {
            meal_type: MealType::Lunch,
            name: "Pizza".to_owned(),
        }));
        assert!(violations.contains(&PlanViolation::DuplicateMealType(MealType::Lunch)));
        assert!(violations.contains(&PlanViolation::UnknownMealType("brunch".to_owned())));
        assert!(violations.contains(&PlanViolation::MissingMealType(MealType::Dinner)));
        assert!(violations.contains(&PlanViolation::MissingMealType(MealType::Snack)));
    }

    #[test]
    fn test_day_plan_calorie_tolerance() {
        assert!(validate_day_plan(&good_day(), None, &catalogue(), 2600, date()).is_ok());
        let Err(violations) = validate_day_plan(&good_day(), None, &catalogue(), 3000, date()) else {
            panic!("expected calorie violation");
        };
        assert_eq!(
            violations,
            vec![PlanViolation::CaloriesOutOfRange {
                total: 2000,
                target: 3000
            }]
        );
    }

    #[test]
    fn test_inactive_dish_is_unknown() {
        let mut dishes = catalogue();
        for d in &mut dishes {
            if d.name == "Bun Cha" {
                d.is_active = false;
            }
        }
        let result = validate_day_plan(&good_day(), None, &dishes, 2000, date());
        assert!(result.is_err());
    }

    #[test]
    fn test_meal_plan_rejects_consecutive_repeat() {
        let days = vec![
            ProposedDay {
                day: 2,
                meals: good_day(),
                notes: None,
            },
            ProposedDay {
                day: 1,
                meals: vec![
                    proposed("breakfast", "Banh Mi"),
                    proposed("lunch", "Com Tam"),
                    proposed("dinner", "Goi Cuon"),
                    proposed("snack", "Banh Flan"),
                ],
                notes: None,
            },
        ];
        let Err(violations) = validate_meal_plan(&days, &catalogue(), 1850, date(), 2) else {
            panic!("expected repeat violation");
        };
        assert_eq!(
            violations,
            vec![PlanViolation::RepeatedDish {
                day: 2,
                meal_type: MealType::Breakfast,
                name: "Banh Mi".to_owned(),
            }]
        );
    }

    #[test]
    fn test_meal_plan_day_count_and_numbering() {
        let one = vec![ProposedDay {
            day: 1,
            meals: good_day(),
            notes: None,
        }];
        assert_eq!(
            validate_meal_plan(&one, &catalogue(), 2000, date(), 2).err(),
            Some(vec![PlanViolation::WrongDayCount {
                expected: 2,
                actual: 1
            }])
        );

        let gap = vec![ProposedDay {
            day: 3,
            meals: good_day(),
            notes: None,
        }];
        assert_eq!(
            validate_meal_plan(&gap, &catalogue(), 2000, date(), 1).err(),
            Some(vec![PlanViolation::BadDayNumbering])
        );
    }

    #[test]
    fn test_meal_plan_past_last_date_is_a_violation() {
        let days = vec![
            ProposedDay {
                day: 1,
                meals: good_day(),
                notes: None,
            },
            ProposedDay {
                day: 2,
                meals: good_day(),
                notes: None,
            },
        ];
        assert_eq!(
            validate_meal_plan(&days, &catalogue(), 2000, NaiveDate::MAX, 2).err(),
            Some(vec![PlanViolation::DateOutOfRange { day: 2 }])
        );
    }

    #[test]
    fn test_fallback_meal_plan_stops_at_last_date() {
        let profile = VirtualProfile::empty(Uuid::new_v4(), Utc::now());
        let ctx = ScoringContext::new(&profile);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let plan = fallback_meal_plan(&catalogue(), &ctx, 2000, NaiveDate::MAX, 3, &mut rng);
        assert_eq!(plan.days.len(), 1);
        assert_eq!(plan.days[0].date, NaiveDate::MAX);
    }

    #[test]
    fn test_choose_random_top_skips_excluded() {
        let profile = VirtualProfile::empty(Uuid::new_v4(), Utc::now());
        let ctx = ScoringContext::new(&profile);
        let dishes = catalogue();
        let ranked = crate::scoring::rank_dishes(dishes.iter(), &ctx);
        let excluded: HashSet<Uuid> = ranked.iter().take(4).map(|s| s.dish.id).collect();

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..20 {
            let pick = choose_random_top(&ranked, &excluded, &mut rng);
            let pick = pick.map(|s| s.dish.id).unwrap_or_default();
            assert!(!excluded.contains(&pick));
            let position = ranked.iter().position(|s| s.dish.id == pick).unwrap_or(usize::MAX);
            assert!(position < 4 + FALLBACK_POOL);
        }

        let all: HashSet<Uuid> = ranked.iter().map(|s| s.dish.id).collect();
        assert!(choose_random_top(&ranked, &all, &mut rng).is_some());
        assert!(choose_random_top(&[], &HashSet::new(), &mut rng).is_none());
    }

    #[test]
    fn test_fallback_meal_plan_fills_slots_without_consecutive_repeats() {
        let profile = VirtualProfile::empty(Uuid::new_v4(), Utc::now());
        let ctx = ScoringContext::new(&profile);
        let dishes = catalogue();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let plan = fallback_meal_plan(&dishes, &ctx, 2000, date(), 5, &mut rng);
        assert_eq!(plan.days.len(), 5);
        for pair in plan.days.windows(2) {
            assert_eq!(pair[1].date, pair[0].date + Days::new(1));
            for meal in &pair[1].meals {
                assert!(meal.meal_type.accepts(
                    dishes
                        .iter()
                        .find(|d| d.id == meal.dish_id)
                        .map_or(DishCategory::Side, |d| d.category)
                ));
                assert_ne!(pair[0].meal(meal.meal_type).map(|m| m.dish_id), Some(meal.dish_id));
            }
        }
        for day in &plan.days {
            assert_eq!(day.meals.len(), 4);
            let unique: HashSet<Uuid> = day.meals.iter().map(|m| m.dish_id).collect();
            assert_eq!(unique.len(), 4);
        }
    }

    #[test]
    fn test_fallback_is_reproducible_with_same_seed() {
        let profile = VirtualProfile::empty(Uuid::new_v4(), Utc::now());
        let ctx = ScoringContext::new(&profile);
        let dishes = catalogue();

        let a = fallback_day_plan(&dishes, &ctx, 2000, date(), &mut ChaCha8Rng::seed_from_u64(1));
        let b = fallback_day_plan(&dishes, &ctx, 2000, date(), &mut ChaCha8Rng::seed_from_u64(1));
        assert_eq!(a, b);
    }
}
