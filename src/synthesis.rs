//! Result synthesis: a plausible value for every (sample, test) pair.
//!
//! Values are drawn uniformly from the test's reference range, so freshly
//! generated results are always normal. Regenerating overwrites the stored
//! value and clears its sent flag.

use rand::Rng;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::core_state::CoreError;
use crate::db::repository;
use crate::registry;

/// Decimal places kept in generated values.
const VALUE_PRECISION: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedResult {
    pub result_id: i64,
    pub sample_id: i64,
    pub sample_number: String,
    pub test_code: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationOutcome {
    /// The analyzer has no tests; nothing was written.
    NoTests,
    Generated {
        results: Vec<GeneratedResult>,
        /// Requested sample numbers with no stored sample.
        missing_samples: Vec<String>,
    },
}

impl GenerationOutcome {
    pub fn results(&self) -> &[GeneratedResult] {
        match self {
            GenerationOutcome::NoTests => &[],
            GenerationOutcome::Generated { results, .. } => results,
        }
    }

    pub fn result_ids(&self) -> Vec<i64> {
        self.results().iter().map(|r| r.result_id).collect()
    }
}

/// Round to three decimals without leaving `[lower, upper]`.
pub fn round_within(value: f64, lower: f64, upper: f64) -> f64 {
    let rounded = (value * VALUE_PRECISION).round() / VALUE_PRECISION;
    if rounded > upper {
        let floor = (upper * VALUE_PRECISION).floor() / VALUE_PRECISION;
        if floor >= lower {
            return floor;
        }
    } else if rounded < lower {
        let ceil = (lower * VALUE_PRECISION).ceil() / VALUE_PRECISION;
        if ceil <= upper {
            return ceil;
        }
    } else {
        return rounded;
    }
    // Range narrower than the precision step
    value.clamp(lower, upper)
}

pub fn generate<R: Rng + ?Sized>(
    conn: &Connection,
    analyzer_id: i64,
    sample_numbers: &[String],
    rng: &mut R,
) -> Result<GenerationOutcome, CoreError> {
    registry::get_analyzer(conn, analyzer_id)?;
    let tests = repository::list_tests(conn, analyzer_id)?;
    if tests.is_empty() {
        tracing::info!(analyzer_id, "No tests defined; skipping result generation");
        return Ok(GenerationOutcome::NoTests);
    }
    // Sampling needs a finite width; stored rows may predate validation.
    if let Some(test) = tests.iter().find(|t| !(t.upper - t.lower).is_finite()) {
        return Err(CoreError::validation(format!(
            "Test '{}' has an unusable range {} to {}",
            test.code, test.lower, test.upper
        )));
    }

    let mut results = Vec::with_capacity(sample_numbers.len() * tests.len());
    let mut missing_samples = Vec::new();

    for number in sample_numbers {
        let Some(sample_id) = repository::find_sample_id(conn, number)? else {
            tracing::warn!(sample = %number, "Sample not found; no results generated");
            missing_samples.push(number.clone());
            continue;
        };

        for test in &tests {
            let drawn = rng.gen_range(test.lower..=test.upper);
            let value = round_within(drawn, test.lower, test.upper);

            let result_id = match repository::find_result_id(conn, sample_id, test.id)? {
                Some(id) => {
                    repository::update_result_value(conn, id, value)?;
                    id
                }
                None => repository::insert_result(conn, sample_id, test.id, value)?,
            };

            results.push(GeneratedResult {
                result_id,
                sample_id,
                sample_number: number.clone(),
                test_code: test.code.clone(),
                value,
            });
        }
    }

    tracing::info!(
        analyzer_id,
        samples = sample_numbers.len() - missing_samples.len(),
        results = results.len(),
        missing = missing_samples.len(),
        "Results generated"
    );

    Ok(GenerationOutcome::Generated {
        results,
        missing_samples,
    })
}
