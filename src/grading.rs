use crate::models::{Grade, NutritionProfile};
use tracing::debug;

const MAX_LIST_ENTRIES: usize = 5;

/// Ingredient fragments that lower the heuristic score.
const UNHEALTHY_INGREDIENTS: &[&str] = &[
    "partially hydrogenated",
    "high fructose corn syrup",
    "artificial",
    "msg",
    "monosodium glutamate",
    "yellow",
    "red dye",
    "blue",
];

/// Ingredient fragments that raise the heuristic score.
const HEALTHY_INGREDIENTS: &[&str] = &[
    "whole grain",
    "organic",
    "probiotic",
    "fiber",
    "vitamin",
    "mineral",
    "fruit",
    "vegetable",
    "legume",
    "nut",
    "seed",
];

/// The two variants of the grading strategy. An externally supplied grade
/// (e.g. a Nutri-Score from the data source) always wins over the internal
/// heuristic score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeSource {
    External(Grade),
    Heuristic(i32),
}

pub fn resolve_grade(source: GradeSource) -> Grade {
    match source {
        GradeSource::External(grade) => grade,
        GradeSource::Heuristic(score) => grade_from_score(score),
    }
}

fn grade_from_score(score: i32) -> Grade {
    match score {
        s if s >= 8 => Grade::A,
        s if s >= 4 => Grade::B,
        s if s >= 0 => Grade::C,
        s if s >= -4 => Grade::D,
        _ => Grade::F,
    }
}

/// Grade plus the capped concern/positive lists shown on the result card.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeAnalysis {
    pub grade: Grade,
    pub concerns: Vec<String>,
    pub positives: Vec<String>,
}

/// Pure grading pass over normalized nutrition plus the ordered ingredient
/// list. Concerns and positives keep a stable order: ingredient-derived
/// entries first, then the nutrient threshold entries in their fixed
/// evaluation order.
pub fn analyze(
    nutrition: &NutritionProfile,
    ingredients: &[String],
    external_grade: Option<&str>,
) -> GradeAnalysis {
    let mut score: i32 = 0;
    let mut concerns: Vec<String> = Vec::new();
    let mut positives: Vec<String> = Vec::new();

    for ingredient in ingredients {
        let lower = ingredient.to_lowercase();
        if UNHEALTHY_INGREDIENTS.iter().any(|term| lower.contains(term)) {
            score -= 2;
            concerns.push(format!("Contains {}", ingredient.trim()));
        }
        if HEALTHY_INGREDIENTS.iter().any(|term| lower.contains(term)) {
            score += 2;
            positives.push(format!("Contains {}", ingredient.trim()));
        }
    }

    // Each nutrient has one concern branch and one positive branch that
    // cannot both fire for the same value; each is applied once.
    if nutrition.saturated_fat > 5.0 {
        score -= 3;
        concerns.push("High in saturated fat".to_string());
    } else if nutrition.saturated_fat <= 2.0 {
        positives.push("Low saturated fat".to_string());
    }

    if nutrition.sodium > 500.0 {
        score -= 3;
        concerns.push("High sodium content".to_string());
    } else if nutrition.sodium < 140.0 {
        positives.push("Low sodium content".to_string());
    }

    if nutrition.sugar > 10.0 {
        score -= 3;
        concerns.push("High sugar content".to_string());
    } else if nutrition.sugar <= 5.0 {
        positives.push("Low sugar content".to_string());
    }

    if nutrition.fiber > 5.0 {
        score += 2;
        positives.push("Good source of fiber".to_string());
    } else if nutrition.fiber < 2.0 {
        concerns.push("Low fiber content".to_string());
    }

    if nutrition.protein > 10.0 {
        score += 2;
        positives.push("Excellent source of protein".to_string());
    }

    concerns.truncate(MAX_LIST_ENTRIES);
    positives.truncate(MAX_LIST_ENTRIES);
    if concerns.is_empty() {
        concerns.push("No significant nutritional concerns detected".to_string());
    }
    if positives.is_empty() {
        positives.push("Few nutritional benefits".to_string());
    }

    let source = external_grade
        .and_then(Grade::from_external)
        .map(GradeSource::External)
        .unwrap_or(GradeSource::Heuristic(score));
    let grade = resolve_grade(source);
    debug!(score, ?grade, external = external_grade.is_some(), "grading pass complete");

    GradeAnalysis {
        grade,
        concerns,
        positives,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingredients(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn score_breakpoints_map_to_grades() {
        assert_eq!(grade_from_score(8), Grade::A);
        assert_eq!(grade_from_score(4), Grade::B);
        assert_eq!(grade_from_score(0), Grade::C);
        assert_eq!(grade_from_score(-4), Grade::D);
        assert_eq!(grade_from_score(-5), Grade::F);
    }

    #[test]
    fn external_grade_takes_precedence_over_heuristic() {
        assert_eq!(resolve_grade(GradeSource::External(Grade::B)), Grade::B);
        assert_eq!(resolve_grade(GradeSource::Heuristic(10)), Grade::A);

        // A terrible heuristic profile still grades A when the source says so.
        let nutrition = NutritionProfile {
            saturated_fat: 20.0,
            sodium: 900.0,
            sugar: 40.0,
            ..Default::default()
        };
        let analysis = analyze(&nutrition, &[], Some("a"));
        assert_eq!(analysis.grade, Grade::A);
        // The concern list is still heuristic-derived.
        assert!(analysis.concerns.iter().any(|c| c.contains("saturated fat")));
    }

    #[test]
    fn external_e_grade_becomes_f() {
        let analysis = analyze(&NutritionProfile::default(), &[], Some("e"));
        assert_eq!(analysis.grade, Grade::F);
    }

    #[test]
    fn unknown_external_grade_falls_back_to_heuristic() {
        let analysis = analyze(&NutritionProfile::default(), &[], Some("x"));
        // fiber 0 -> low-fiber concern only, score 0 -> C.
        assert_eq!(analysis.grade, Grade::C);
    }

    #[test]
    fn high_fat_and_sodium_profile_grades_poorly() {
        let nutrition = NutritionProfile {
            saturated_fat: 9.0,
            sodium: 600.0,
            sugar: 2.0,
            fiber: 1.0,
            protein: 2.0,
            ..Default::default()
        };
        let analysis = analyze(&nutrition, &[], None);
        assert!(matches!(analysis.grade, Grade::D | Grade::F));
        assert!(analysis.concerns.iter().any(|c| c.contains("saturated fat")));
        assert!(analysis.concerns.iter().any(|c| c.contains("sodium")));
    }

    #[test]
    fn lean_protein_product_grades_well() {
        let nutrition = NutritionProfile {
            saturated_fat: 1.5,
            sodium: 65.0,
            sugar: 5.0,
            fiber: 0.0,
            protein: 22.0,
            ..Default::default()
        };
        let list = ingredients(&["Organic pasteurized milk", "Live active cultures"]);
        let analysis = analyze(&nutrition, &list, None);
        assert!(matches!(analysis.grade, Grade::A | Grade::B));
        assert!(analysis.positives.iter().any(|p| p.contains("sodium")));
        assert!(analysis.positives.iter().any(|p| p.contains("protein")));
    }

    #[test]
    fn lexicon_matching_is_case_insensitive_and_cites_ingredient() {
        let list = ingredients(&["High Fructose Corn Syrup", "Whole Grain Wheat"]);
        let analysis = analyze(&NutritionProfile::default(), &list, None);
        assert!(
            analysis
                .concerns
                .contains(&"Contains High Fructose Corn Syrup".to_string())
        );
        assert!(
            analysis
                .positives
                .contains(&"Contains Whole Grain Wheat".to_string())
        );
    }

    #[test]
    fn lists_are_capped_at_five_in_stable_order() {
        let list = ingredients(&[
            "Yellow 5",
            "Blue 1",
            "Red dye 40",
            "Artificial flavors",
            "MSG",
            "Partially hydrogenated oil",
        ]);
        let nutrition = NutritionProfile {
            saturated_fat: 9.0,
            sodium: 600.0,
            fiber: 3.0,
            ..Default::default()
        };
        let analysis = analyze(&nutrition, &list, None);
        assert_eq!(analysis.concerns.len(), 5);
        // Ingredient-derived entries come before threshold entries.
        assert_eq!(analysis.concerns[0], "Contains Yellow 5");
        assert!(analysis.concerns.iter().all(|c| !c.contains("sodium")));
        assert_eq!(analysis.grade, Grade::F);
    }

    #[test]
    fn empty_lists_get_single_filler_entries() {
        let nutrition = NutritionProfile {
            saturated_fat: 3.0,
            sodium: 300.0,
            sugar: 7.0,
            fiber: 3.0,
            ..Default::default()
        };
        let analysis = analyze(&nutrition, &[], None);
        assert_eq!(
            analysis.concerns,
            vec!["No significant nutritional concerns detected".to_string()]
        );
        assert_eq!(
            analysis.positives,
            vec!["Few nutritional benefits".to_string()]
        );
    }

    #[test]
    fn grading_is_idempotent() {
        let nutrition = NutritionProfile {
            sugar: 12.0,
            fiber: 6.0,
            ..Default::default()
        };
        let list = ingredients(&["Dried fruit", "Artificial color"]);
        let first = analyze(&nutrition, &list, None);
        let second = analyze(&nutrition, &list, None);
        assert_eq!(first, second);
    }

    #[test]
    fn more_sugar_never_improves_the_grade() {
        let base = NutritionProfile {
            sugar: 4.0,
            fiber: 3.0,
            ..Default::default()
        };
        let mut sweeter = base.clone();
        sweeter.sugar = 12.0;
        let low = analyze(&base, &[], None);
        let high = analyze(&sweeter, &[], None);
        assert!(rank(high.grade) >= rank(low.grade));
    }

    #[test]
    fn more_fiber_never_worsens_the_grade() {
        let base = NutritionProfile {
            fiber: 1.0,
            ..Default::default()
        };
        let mut fibrous = base.clone();
        fibrous.fiber = 8.0;
        let low = analyze(&base, &[], None);
        let high = analyze(&fibrous, &[], None);
        assert!(rank(high.grade) <= rank(low.grade));
    }

    fn rank(grade: Grade) -> u8 {
        match grade {
            Grade::A => 0,
            Grade::B => 1,
            Grade::C => 2,
            Grade::D => 3,
            Grade::F => 4,
        }
    }
}
