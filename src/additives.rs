use crate::models::RawNutriments;
use tracing::debug;

/// Known-harmful additive codes and their health-risk descriptions.
/// Codes are stored normalized (no language prefix, uppercase).
const HARMFUL_ADDITIVES: &[(&str, &str)] = &[
    ("E102", "Tartrazine - artificial color linked to hyperactivity in children"),
    ("E104", "Quinoline Yellow - artificial color restricted in several countries"),
    ("E110", "Sunset Yellow - artificial color linked to hyperactivity in children"),
    ("E122", "Carmoisine - artificial color linked to hyperactivity in children"),
    ("E124", "Ponceau 4R - artificial color linked to hyperactivity in children"),
    ("E129", "Allura Red - artificial color linked to hyperactivity in children"),
    ("E211", "Sodium Benzoate - preservative that can form benzene with vitamin C"),
    ("E220", "Sulfur Dioxide - preservative that can trigger asthma and allergies"),
    ("E250", "Sodium Nitrite - preservative linked to increased cancer risk in processed meats"),
    ("E251", "Sodium Nitrate - preservative linked to increased cancer risk in processed meats"),
    ("E320", "BHA - preservative classified as a possible human carcinogen"),
    ("E321", "BHT - preservative with suspected endocrine-disrupting effects"),
    ("E621", "Monosodium Glutamate - flavor enhancer that can cause headaches in sensitive people"),
    ("E951", "Aspartame - artificial sweetener unsuitable for people with phenylketonuria"),
];

/// Category fragments that trigger a generic warning even for codes missing
/// from the table above.
const SUSPECT_FRAGMENTS: &[&str] = &["COLOR", "ARTIFICIAL", "PRESERVATIVE", "SWEETENER"];

#[derive(Debug, Clone, PartialEq)]
pub struct AdditiveReport {
    pub harmful: bool,
    pub details: Vec<String>,
}

/// Strips any language prefix ("en:E250" -> "E250") and uppercases.
fn normalize_tag(tag: &str) -> String {
    tag.rsplit(':').next().unwrap_or(tag).trim().to_uppercase()
}

/// Screens additive tags against the harmful-additive table. Advisory only;
/// the result never influences the grade.
pub fn check_harmful_additives(tags: &[String]) -> AdditiveReport {
    if tags.is_empty() {
        return AdditiveReport {
            harmful: false,
            details: vec!["No additives listed.".to_string()],
        };
    }

    let mut details = Vec::new();
    for tag in tags {
        let code = normalize_tag(tag);
        if let Some((_, description)) = HARMFUL_ADDITIVES.iter().find(|(known, _)| *known == code) {
            details.push((*description).to_string());
        } else if SUSPECT_FRAGMENTS.iter().any(|frag| code.contains(frag)) {
            details.push(format!(
                "{} - additive category commonly associated with health concerns",
                code
            ));
        }
    }
    debug!(tags = tags.len(), flagged = details.len(), "additive screening complete");

    if details.is_empty() {
        return AdditiveReport {
            harmful: false,
            details: vec!["No harmful additives detected.".to_string()],
        };
    }
    AdditiveReport {
        harmful: true,
        details,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NutritionValidation {
    pub valid: bool,
    pub message: String,
}

/// Checks the raw nutrition map for the four fields grading cannot do
/// without. Absence of the map itself also fails. Advisory only.
pub fn validate_nutrition(nutriments: Option<&RawNutriments>) -> NutritionValidation {
    let Some(raw) = nutriments else {
        return NutritionValidation {
            valid: false,
            message: "No nutrition data available for this product.".to_string(),
        };
    };

    let mut missing = Vec::new();
    if raw.energy().is_none() {
        missing.push("energy");
    }
    if raw.fat.is_none() {
        missing.push("fat");
    }
    if raw.sugars.is_none() {
        missing.push("sugars");
    }
    if raw.proteins.is_none() {
        missing.push("proteins");
    }

    if missing.is_empty() {
        NutritionValidation {
            valid: true,
            message: "Nutrition data is complete.".to_string(),
        }
    } else {
        NutritionValidation {
            valid: false,
            message: format!("Missing nutrition fields: {}", missing.join(", ")),
        }
    }
}
