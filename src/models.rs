use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Five-level health grade shown to the user.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Maps an externally supplied quality grade (Nutri-Score style A-E)
    /// onto the internal scale. E collapses into F; this mirrors the
    /// behavior users already see and is kept deliberately.
    pub fn from_external(raw: &str) -> Option<Grade> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "a" => Some(Grade::A),
            "b" => Some(Grade::B),
            "c" => Some(Grade::C),
            "d" => Some(Grade::D),
            "e" => Some(Grade::F),
            _ => None,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        write!(f, "{}", letter)
    }
}

/// Origin of a product record, used for trust scoring and cache entries.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Primary,
    Secondary,
    Tertiary,
    Community,
}

impl DataSource {
    /// Unrecognized labels fall back to the lowest-trust tier.
    pub fn parse(label: &str) -> DataSource {
        match label.trim().to_ascii_lowercase().as_str() {
            "primary" => DataSource::Primary,
            "secondary" => DataSource::Secondary,
            "community" => DataSource::Community,
            _ => DataSource::Tertiary,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DataSource::Primary => "primary",
            DataSource::Secondary => "secondary",
            DataSource::Tertiary => "tertiary",
            DataSource::Community => "community",
        }
    }
}

/// Raw per-100g nutrition map as delivered by the data source. Every field
/// is optional so that "not reported" stays distinguishable from an
/// explicit zero; `validate_nutrition` relies on that distinction.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct RawNutriments {
    #[serde(rename = "energy_100g", skip_serializing_if = "Option::is_none")]
    pub energy_kj: Option<f64>,
    #[serde(rename = "energy-kcal_100g", skip_serializing_if = "Option::is_none")]
    pub energy_kcal: Option<f64>,
    #[serde(rename = "fat_100g", skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
    #[serde(rename = "saturated-fat_100g", skip_serializing_if = "Option::is_none")]
    pub saturated_fat: Option<f64>,
    #[serde(rename = "carbohydrates_100g", skip_serializing_if = "Option::is_none")]
    pub carbohydrates: Option<f64>,
    #[serde(rename = "sugars_100g", skip_serializing_if = "Option::is_none")]
    pub sugars: Option<f64>,
    #[serde(rename = "proteins_100g", skip_serializing_if = "Option::is_none")]
    pub proteins: Option<f64>,
    #[serde(rename = "fiber_100g", skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    #[serde(rename = "salt_100g", skip_serializing_if = "Option::is_none")]
    pub salt: Option<f64>,
    #[serde(rename = "sodium_100g", skip_serializing_if = "Option::is_none")]
    pub sodium: Option<f64>,
}

impl RawNutriments {
    /// Energy in whichever unit was reported; kcal wins when both exist.
    pub fn energy(&self) -> Option<f64> {
        self.energy_kcal.or(self.energy_kj)
    }

    /// Salt-family presence, either as salt (g) or sodium (g).
    pub fn salt_or_sodium(&self) -> Option<f64> {
        self.salt.or(self.sodium)
    }
}

/// Normalized nutrition values per 100g reference serving. All fields are
/// non-negative; fields the source did not report default to 0.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NutritionProfile {
    pub calories: f64,
    pub fat: f64,
    pub saturated_fat: f64,
    pub carbs: f64,
    pub sugar: f64,
    pub protein: f64,
    pub fiber: f64,
    /// Milligrams per 100g, unlike the gram-denominated fields above.
    pub sodium: f64,
}

const KCAL_PER_KJ: f64 = 1.0 / 4.184;
// 1g of salt contains 400mg of sodium.
const SODIUM_MG_PER_G_SALT: f64 = 400.0;

fn non_negative(value: Option<f64>) -> f64 {
    value.unwrap_or(0.0).max(0.0)
}

impl NutritionProfile {
    /// Normalizes the raw source map: kcal preferred over kJ, sodium in mg
    /// derived from either a sodium (g) or salt (g) figure.
    pub fn from_raw(raw: &RawNutriments) -> NutritionProfile {
        let calories = match (raw.energy_kcal, raw.energy_kj) {
            (Some(kcal), _) => kcal,
            (None, Some(kj)) => kj * KCAL_PER_KJ,
            (None, None) => 0.0,
        };
        let sodium_mg = match (raw.sodium, raw.salt) {
            (Some(sodium_g), _) => sodium_g * 1000.0,
            (None, Some(salt_g)) => salt_g * SODIUM_MG_PER_G_SALT,
            (None, None) => 0.0,
        };
        NutritionProfile {
            calories: calories.max(0.0),
            fat: non_negative(raw.fat),
            saturated_fat: non_negative(raw.saturated_fat),
            carbs: non_negative(raw.carbohydrates),
            sugar: non_negative(raw.sugars),
            protein: non_negative(raw.proteins),
            fiber: non_negative(raw.fiber),
            sodium: sodium_mg.max(0.0),
        }
    }
}

/// Raw external representation of a product, immutable once built.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub product_name: Option<String>,
    pub brand: Option<String>,
    pub ingredients_text: Option<String>,
    /// Structured ingredient list when the source provides one; empty when
    /// only the free-text field exists.
    #[serde(default)]
    pub ingredients: Vec<String>,
    pub nutriments: Option<RawNutriments>,
    #[serde(default)]
    pub allergens_tags: Vec<String>,
    #[serde(default)]
    pub additives_tags: Vec<String>,
    /// Externally computed nutrition-quality grade on an A-E scale.
    pub nutriscore_grade: Option<String>,
    /// Externally computed environmental grade on an A-E scale.
    pub ecoscore_grade: Option<String>,
    pub image_url: Option<String>,
    /// Unix seconds of the source's last edit, when reported.
    pub last_modified_t: Option<i64>,
}

impl ProductRecord {
    /// Ordered ingredient names: the structured list when present,
    /// otherwise the comma-joined free text split apart.
    pub fn ingredient_list(&self) -> Vec<String> {
        if !self.ingredients.is_empty() {
            return self.ingredients.clone();
        }
        self.ingredients_text
            .as_deref()
            .map(|text| {
                text.split(',')
                    .map(|item| item.trim().to_string())
                    .filter(|item| !item.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn nutrition_profile(&self) -> NutritionProfile {
        self.nutriments
            .as_ref()
            .map(NutritionProfile::from_raw)
            .unwrap_or_default()
    }
}

/// Derived analysis of a scanned product; computed once per successful
/// lookup and never mutated afterwards.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FoodAnalysis {
    pub product_name: String,
    pub brand: Option<String>,
    pub grade: Grade,
    pub nutrition: NutritionProfile,
    pub concerns: Vec<String>,
    pub positives: Vec<String>,
    pub ingredients: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// One cached product lookup, keyed by barcode in the store.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub timestamp: DateTime<Utc>,
    pub data: ProductRecord,
    pub source: DataSource,
    pub trust_score: u8,
}
