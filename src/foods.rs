use crate::errors::StorageError;
use crate::lookup::ScanResult;
use crate::storage::KeyValueStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const USER_FOODS_KEY: &str = "user_foods";
const MISSING_FOOD_REQUESTS_KEY: &str = "missing_food_requests";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FoodCategory {
    Dairy,
    Protein,
    Fruits,
    Vegetables,
    Grains,
    Beverages,
    #[default]
    Other,
}

/// One entry in the user's personal food database. Macros are per 100g,
/// matching the scanned products they are usually derived from.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    pub id: String,
    pub name: String,
    pub category: FoodCategory,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub sugar: f64,
    pub fat: f64,
    pub fiber: f64,
    pub serving_size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub date_added: DateTime<Utc>,
}

/// A user request to add a product no source knows about; backs the
/// "add this product" action on the not-found card.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MissingFoodRequest {
    pub name: String,
    pub details: Option<String>,
    pub request_date: DateTime<Utc>,
    pub status: RequestStatus,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

fn read_list<T: for<'de> Deserialize<'de>>(store: &dyn KeyValueStore, key: &str) -> Vec<T> {
    match store.get(key) {
        Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
            warn!(key = %key, "Failed to parse stored list: {}. Starting fresh.", e);
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(key = %key, "Failed to read stored list: {}", e);
            Vec::new()
        }
    }
}

fn write_list<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    list: &[T],
) -> Result<(), StorageError> {
    let json = serde_json::to_string(list).map_err(|e| StorageError::Corrupt {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    store.set(key, &json)
}

pub fn user_foods(store: &dyn KeyValueStore) -> Vec<FoodItem> {
    read_list(store, USER_FOODS_KEY)
}

pub fn add_food(store: &dyn KeyValueStore, food: FoodItem) -> Result<FoodItem, StorageError> {
    let mut foods = user_foods(store);
    foods.push(food.clone());
    write_list(store, USER_FOODS_KEY, &foods)?;
    info!(name = %food.name, "Added food to personal database");
    Ok(food)
}

/// Converts a completed scan into a personal food entry.
pub fn add_scanned_product(
    store: &dyn KeyValueStore,
    result: &ScanResult,
) -> Result<FoodItem, StorageError> {
    let now = Utc::now();
    let nutrition = &result.analysis.nutrition;
    let food = FoodItem {
        id: format!("scanned-{}", now.timestamp_millis()),
        name: result.analysis.product_name.clone(),
        category: FoodCategory::Other,
        calories: nutrition.calories,
        protein: nutrition.protein,
        carbs: nutrition.carbs,
        sugar: nutrition.sugar,
        fat: nutrition.fat,
        fiber: nutrition.fiber,
        serving_size: "100g".to_string(),
        notes: Some(format!(
            "Added from scan. Brand: {}",
            result.analysis.brand.as_deref().unwrap_or("Unknown")
        )),
        source: Some("scan".to_string()),
        date_added: now,
    };
    add_food(store, food)
}

pub fn missing_food_requests(store: &dyn KeyValueStore) -> Vec<MissingFoodRequest> {
    read_list(store, MISSING_FOOD_REQUESTS_KEY)
}

pub fn request_missing_food(
    store: &dyn KeyValueStore,
    name: &str,
    details: Option<&str>,
) -> Result<(), StorageError> {
    let mut requests = missing_food_requests(store);
    requests.push(MissingFoodRequest {
        name: name.to_string(),
        details: details.map(|d| d.to_string()),
        request_date: Utc::now(),
        status: RequestStatus::Pending,
    });
    write_list(store, MISSING_FOOD_REQUESTS_KEY, &requests)?;
    info!(name = %name, "Recorded missing food request");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn item(name: &str) -> FoodItem {
        FoodItem {
            id: format!("test-{}", name),
            name: name.to_string(),
            category: FoodCategory::Grains,
            calories: 210.0,
            protein: 5.0,
            carbs: 42.0,
            sugar: 8.0,
            fat: 2.5,
            fiber: 7.0,
            serving_size: "100g".to_string(),
            notes: None,
            source: None,
            date_added: Utc::now(),
        }
    }

    #[test]
    fn foods_append_and_read_back_in_order() {
        let store = MemoryStore::new();
        add_food(&store, item("Cereal")).unwrap();
        add_food(&store, item("Oats")).unwrap();
        let foods = user_foods(&store);
        assert_eq!(foods.len(), 2);
        assert_eq!(foods[0].name, "Cereal");
        assert_eq!(foods[1].name, "Oats");
    }

    #[test]
    fn empty_store_yields_empty_lists() {
        let store = MemoryStore::new();
        assert!(user_foods(&store).is_empty());
        assert!(missing_food_requests(&store).is_empty());
    }

    #[test]
    fn missing_food_requests_start_pending() {
        let store = MemoryStore::new();
        request_missing_food(&store, "Local sourdough", Some("From the market")).unwrap();
        let requests = missing_food_requests(&store);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].name, "Local sourdough");
        assert_eq!(requests[0].status, RequestStatus::Pending);
    }

    #[test]
    fn corrupt_list_restarts_fresh_instead_of_failing() {
        let store = MemoryStore::new();
        store.set("user_foods", "{broken").unwrap();
        assert!(user_foods(&store).is_empty());
        add_food(&store, item("Rice")).unwrap();
        assert_eq!(user_foods(&store).len(), 1);
    }
}
