use crate::additives::{check_harmful_additives, validate_nutrition};
use crate::cache::ProductCache;
use crate::errors::AppError;
use crate::grading;
use crate::models::{DataSource, FoodAnalysis, ProductRecord};
use crate::preferences::{PreferenceResult, UserPreferences, check_product_preferences};
use crate::sources::ProductSource;
use crate::trust::calculate_trust_score;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything the result card needs for one successful lookup.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub barcode: String,
    pub analysis: FoodAnalysis,
    pub trust_score: u8,
    pub source: DataSource,
    pub from_cache: bool,
    /// Advisory banners: incomplete nutrition data, harmful additives.
    /// These never block grading or display.
    pub advisories: Vec<String>,
    pub preference: PreferenceResult,
}

impl ScanResult {
    pub fn source_label(&self) -> String {
        if self.from_cache {
            format!("{} (Cached)", self.source.label())
        } else {
            self.source.label().to_string()
        }
    }
}

/// Terminal state of one scan. Failures are folded into `Error`; the UI
/// shows the not-found card with the message layered on top.
#[derive(Debug)]
pub enum LookupOutcome {
    Found(Box<ScanResult>),
    NotFound { barcode: String },
    /// A newer scan started while this one was in flight; the result must
    /// not be applied.
    Superseded,
    Error { message: String },
}

/// Accepted scan triggers are all-digit EAN-8 through EAN-13/UPC codes.
pub fn is_valid_barcode(code: &str) -> bool {
    (8..=13).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_digit())
}

/// Coordinates cache lookup, primary fetch, fallback fetch, grading, trust
/// scoring and the cache write for each scanned barcode. Stateless apart
/// from the active-scan generation used for last-scan-wins ordering.
pub struct LookupOrchestrator {
    cache: ProductCache,
    primary: Arc<dyn ProductSource>,
    fallback: Arc<dyn ProductSource>,
    fetch_timeout: Duration,
    active_scan: AtomicU64,
}

impl LookupOrchestrator {
    pub fn new(
        cache: ProductCache,
        primary: Arc<dyn ProductSource>,
        fallback: Arc<dyn ProductSource>,
    ) -> Self {
        Self {
            cache,
            primary,
            fallback,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            active_scan: AtomicU64::new(0),
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn cache(&self) -> &ProductCache {
        &self.cache
    }

    #[instrument(skip(self, preferences), fields(code = %barcode))]
    pub async fn scan(&self, barcode: &str, preferences: &UserPreferences) -> LookupOutcome {
        if !is_valid_barcode(barcode) {
            warn!("Rejected invalid barcode");
            return LookupOutcome::Error {
                message: AppError::InvalidBarcode(barcode.to_string()).to_string(),
            };
        }

        // Each scan invalidates every older in-flight scan.
        let generation = self.active_scan.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(entry) = self.cache.get(barcode) {
            info!(code = %barcode, "Cache hit, short-circuiting lookup");
            let result =
                self.build_result(barcode, &entry.data, entry.source, entry.trust_score, true, preferences);
            return LookupOutcome::Found(Box::new(result));
        }

        debug!(code = %barcode, "Cache miss, fetching from primary source");
        match self.fetch_from(&*self.primary, barcode).await {
            Ok(Some(record)) => {
                if self.superseded(generation) {
                    return LookupOutcome::Superseded;
                }
                self.commit(barcode, record, self.primary.source(), preferences)
            }
            Ok(None) => {
                debug!(code = %barcode, "Primary miss, consulting fallback source");
                match self.fetch_from(&*self.fallback, barcode).await {
                    Ok(Some(record)) => {
                        if self.superseded(generation) {
                            return LookupOutcome::Superseded;
                        }
                        self.commit(barcode, record, self.fallback.source(), preferences)
                    }
                    Ok(None) => {
                        if self.superseded(generation) {
                            return LookupOutcome::Superseded;
                        }
                        info!(code = %barcode, "Product not found in any source");
                        LookupOutcome::NotFound {
                            barcode: barcode.to_string(),
                        }
                    }
                    Err(e) => self.fail(generation, barcode, e),
                }
            }
            Err(e) => self.fail(generation, barcode, e),
        }
    }

    async fn fetch_from(
        &self,
        source: &dyn ProductSource,
        barcode: &str,
    ) -> Result<Option<ProductRecord>, AppError> {
        match tokio::time::timeout(self.fetch_timeout, source.fetch(barcode)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::FetchTimeout(self.fetch_timeout.as_secs())),
        }
    }

    fn superseded(&self, generation: u64) -> bool {
        let current = self.active_scan.load(Ordering::SeqCst);
        if current != generation {
            info!(generation, current, "Discarding result of superseded scan");
            return true;
        }
        false
    }

    fn fail(&self, generation: u64, barcode: &str, e: AppError) -> LookupOutcome {
        error!(code = %barcode, "Lookup failed: {}", e);
        if self.superseded(generation) {
            return LookupOutcome::Superseded;
        }
        LookupOutcome::Error {
            message: e.to_string(),
        }
    }

    fn commit(
        &self,
        barcode: &str,
        record: ProductRecord,
        source: DataSource,
        preferences: &UserPreferences,
    ) -> LookupOutcome {
        let trust_score = calculate_trust_score(&record, source);
        let result = self.build_result(barcode, &record, source, trust_score, false, preferences);
        self.cache.put(barcode, record, source, trust_score);
        info!(
            code = %barcode,
            grade = %result.analysis.grade,
            trust_score,
            "Lookup complete"
        );
        LookupOutcome::Found(Box::new(result))
    }

    fn build_result(
        &self,
        barcode: &str,
        record: &ProductRecord,
        source: DataSource,
        trust_score: u8,
        from_cache: bool,
        preferences: &UserPreferences,
    ) -> ScanResult {
        let ingredients = record.ingredient_list();
        let nutrition = record.nutrition_profile();
        let graded = grading::analyze(
            &nutrition,
            &ingredients,
            record.nutriscore_grade.as_deref(),
        );

        let mut advisories = Vec::new();
        let validation = validate_nutrition(record.nutriments.as_ref());
        if !validation.valid {
            advisories.push(validation.message);
        }
        let additive_report = check_harmful_additives(&record.additives_tags);
        if additive_report.harmful {
            advisories.extend(additive_report.details);
        }

        let preference = check_product_preferences(&ingredients, &nutrition, preferences);

        let analysis = FoodAnalysis {
            product_name: record
                .product_name
                .clone()
                .unwrap_or_else(|| "Unknown Product".to_string()),
            brand: record.brand.clone(),
            grade: graded.grade,
            nutrition,
            concerns: graded.concerns,
            positives: graded.positives,
            ingredients,
            image: record.image_url.clone(),
        };

        ScanResult {
            barcode: barcode.to_string(),
            analysis,
            trust_score,
            source,
            from_cache,
            advisories,
            preference,
        }
    }
}
