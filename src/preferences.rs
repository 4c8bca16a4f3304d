use crate::models::NutritionProfile;
use crate::storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const PREFERENCES_KEY: &str = "user_preferences";

/// Dietary preference flags, all off by default. Mutated only by explicit
/// user action; persisted best-effort through the storage port.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    pub is_vegan: bool,
    pub is_vegetarian: bool,
    pub is_gluten_free: bool,
    pub is_lactose_free: bool,
    pub is_low_sugar: bool,
    pub is_low_sodium: bool,
    pub is_high_protein: bool,
    pub is_organic_only: bool,
    pub no_palm_oil: bool,
    pub no_artificial_colors: bool,
    pub no_artificial_flavors: bool,
    pub no_preservatives: bool,
}

impl UserPreferences {
    /// Loads saved preferences, falling back to defaults when nothing is
    /// stored or the stored value cannot be read.
    pub fn load(store: &dyn KeyValueStore) -> UserPreferences {
        match store.get(PREFERENCES_KEY) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
                warn!("Failed to parse stored preferences: {}. Using defaults.", e);
                UserPreferences::default()
            }),
            Ok(None) => UserPreferences::default(),
            Err(e) => {
                warn!("Failed to load preferences: {}. Using defaults.", e);
                UserPreferences::default()
            }
        }
    }

    /// Best-effort save; storage failures are logged and swallowed.
    pub fn save(&self, store: &dyn KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(json) => {
                if let Err(e) = store.set(PREFERENCES_KEY, &json) {
                    warn!("Failed to persist preferences: {}", e);
                }
            }
            Err(e) => warn!("Failed to serialize preferences: {}", e),
        }
    }
}

const NON_VEGAN: &[&str] = &[
    "milk", "cheese", "butter", "cream", "yogurt", "egg", "honey", "meat", "beef", "chicken",
    "pork", "fish", "gelatin", "whey", "casein", "lactose",
];

const NON_VEGETARIAN: &[&str] = &[
    "meat", "beef", "chicken", "pork", "fish", "gelatin", "lard", "tallow", "rennet",
];

const GLUTEN_SOURCES: &[&str] = &["wheat", "barley", "rye", "oats", "malt", "gluten"];

const LACTOSE_SOURCES: &[&str] = &[
    "milk", "cream", "cheese", "butter", "yogurt", "whey", "lactose", "casein",
];

const ARTIFICIAL_COLORS: &[&str] = &[
    "yellow 5", "yellow 6", "red 40", "blue 1", "blue 2", "e102", "e104", "e110", "e122", "e124",
    "e129", "e133",
];

const PRESERVATIVES: &[&str] = &[
    "sodium benzoate",
    "potassium sorbate",
    "bha",
    "bht",
    "e200",
    "e211",
    "e212",
    "e220",
    "e250",
    "e251",
];

#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceResult {
    pub matches: bool,
    pub warnings: Vec<String>,
}

fn any_ingredient_contains(ingredients: &[String], terms: &[&str]) -> bool {
    ingredients
        .iter()
        .any(|i| terms.iter().any(|term| i.contains(term)))
}

/// Evaluates a product against the active preference flags. Each violated
/// rule contributes exactly one warning regardless of how many ingredients
/// triggered it.
pub fn check_product_preferences(
    ingredients: &[String],
    nutrition: &NutritionProfile,
    preferences: &UserPreferences,
) -> PreferenceResult {
    let mut warnings = Vec::new();
    let lower: Vec<String> = ingredients.iter().map(|i| i.to_lowercase()).collect();

    if preferences.is_vegan && any_ingredient_contains(&lower, NON_VEGAN) {
        warnings.push("Contains non-vegan ingredients".to_string());
    }
    if preferences.is_vegetarian && any_ingredient_contains(&lower, NON_VEGETARIAN) {
        warnings.push("Contains non-vegetarian ingredients".to_string());
    }
    if preferences.is_gluten_free && any_ingredient_contains(&lower, GLUTEN_SOURCES) {
        warnings.push("Contains gluten".to_string());
    }
    if preferences.is_lactose_free && any_ingredient_contains(&lower, LACTOSE_SOURCES) {
        warnings.push("Contains lactose".to_string());
    }
    if preferences.is_low_sugar && nutrition.sugar > 5.0 {
        warnings.push("Contains more than 5g of sugar per 100g".to_string());
    }
    if preferences.is_low_sodium && nutrition.sodium > 120.0 {
        warnings.push("Contains more than 120mg of sodium per 100g".to_string());
    }
    if preferences.is_high_protein && nutrition.protein < 10.0 {
        warnings.push("Contains less than 10g of protein per 100g".to_string());
    }
    if preferences.is_organic_only && !any_ingredient_contains(&lower, &["organic"]) {
        warnings.push("Product may not be organic".to_string());
    }
    if preferences.no_palm_oil && any_ingredient_contains(&lower, &["palm oil", "palm kernel oil"])
    {
        warnings.push("Contains palm oil".to_string());
    }
    if preferences.no_artificial_colors && any_ingredient_contains(&lower, ARTIFICIAL_COLORS) {
        warnings.push("Contains artificial colors".to_string());
    }
    if preferences.no_artificial_flavors
        && any_ingredient_contains(&lower, &["artificial flavor", "artificial flavour"])
    {
        warnings.push("Contains artificial flavors".to_string());
    }
    if preferences.no_preservatives && any_ingredient_contains(&lower, PRESERVATIVES) {
        warnings.push("Contains preservatives".to_string());
    }

    debug!(warnings = warnings.len(), "preference check complete");
    PreferenceResult {
        matches: warnings.is_empty(),
        warnings,
    }
}
