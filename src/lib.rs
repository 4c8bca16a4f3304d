//! Core grading, trust-scoring and scan-history engine behind the
//! FoodGrade Genius barcode scanner.
//!
//! The crate is pure application logic with two injected ports: a
//! [`storage::KeyValueStore`] for device-local persistence and a
//! [`sources::ProductSource`] for remote product data. Camera capture and
//! rendering live in the host application; the orchestrator only consumes
//! validated barcode strings and produces terminal
//! [`lookup::LookupOutcome`] states.

pub mod additives;
pub mod cache;
pub mod errors;
pub mod foods;
pub mod grading;
pub mod lookup;
pub mod models;
pub mod preferences;
pub mod sources;
pub mod storage;
pub mod trust;

pub use errors::{AppError, Result, StorageError};
pub use models::{
    CacheEntry, DataSource, FoodAnalysis, Grade, NutritionProfile, ProductRecord, RawNutriments,
};
pub use preferences::{PreferenceResult, UserPreferences};

pub use cache::ProductCache;
pub use lookup::{LookupOrchestrator, LookupOutcome, ScanResult, is_valid_barcode};
pub use sources::{CommunitySource, OpenFoodFactsSource, ProductSource};
pub use storage::{KeyValueStore, MemoryStore};
