use crate::models::{DataSource, ProductRecord};
use chrono::{DateTime, Utc};
use tracing::debug;

const COMPLETENESS_CAP: u32 = 30;

fn base_score(source: DataSource) -> u32 {
    match source {
        DataSource::Primary => 70,
        DataSource::Secondary => 50,
        DataSource::Community => 40,
        DataSource::Tertiary => 30,
    }
}

fn completeness_bonus(record: &ProductRecord) -> u32 {
    let mut bonus = 0;

    if record.product_name.as_deref().is_some_and(|n| !n.is_empty()) {
        bonus += 3;
    }
    if record.brand.as_deref().is_some_and(|b| !b.is_empty()) {
        bonus += 2;
    }
    if record
        .ingredients_text
        .as_deref()
        .is_some_and(|t| !t.is_empty())
    {
        bonus += 4;
        // A structured ingredient list is worth as much again.
        if !record.ingredients.is_empty() {
            bonus += 4;
        }
    }

    if let Some(raw) = &record.nutriments {
        let fields = [
            raw.energy(),
            raw.fat,
            raw.saturated_fat,
            raw.carbohydrates,
            raw.sugars,
            raw.proteins,
            raw.fiber,
            raw.salt_or_sodium(),
        ];
        bonus += fields.iter().filter(|f| f.is_some()).count() as u32;
    }

    if record.image_url.is_some() {
        bonus += 3;
    }
    if record.nutriscore_grade.is_some() {
        bonus += 3;
    }
    if record.ecoscore_grade.is_some() {
        bonus += 3;
    }
    bonus
}

/// Recency bonus only applies to the primary source, which is the only one
/// reporting edit timestamps.
fn recency_bonus(record: &ProductRecord, source: DataSource, now: DateTime<Utc>) -> u32 {
    if source != DataSource::Primary {
        return 0;
    }
    let Some(edited) = record
        .last_modified_t
        .and_then(|t| DateTime::<Utc>::from_timestamp(t, 0))
    else {
        return 0;
    };
    let months = (now - edited).num_days().max(0) / 30;
    match months {
        m if m < 3 => 5,
        m if m < 6 => 3,
        m if m < 12 => 1,
        _ => 0,
    }
}

/// Confidence score in [0,100] for a product record. Pure; deterministic
/// for a fixed `now`.
pub fn score_at(record: &ProductRecord, source: DataSource, now: DateTime<Utc>) -> u8 {
    let bonus = completeness_bonus(record) + recency_bonus(record, source, now);
    let total = base_score(source) + bonus.min(COMPLETENESS_CAP);
    let clamped = total.min(100) as u8;
    debug!(
        source = source.label(),
        bonus, score = clamped,
        "trust score computed"
    );
    clamped
}

pub fn calculate_trust_score(record: &ProductRecord, source: DataSource) -> u8 {
    score_at(record, source, Utc::now())
}
