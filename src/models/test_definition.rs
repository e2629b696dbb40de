use serde::{Deserialize, Serialize};

/// One test an analyzer can run, with its reference range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestDefinition {
    pub id: i64,
    pub analyzer_id: i64,
    pub code: String,
    pub unit: String,
    pub lower: f64,
    pub upper: f64,
}

/// Catalog row as typed by the user. Bounds stay text until validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDraft {
    pub code: String,
    pub unit: String,
    pub lower: String,
    pub upper: String,
}

impl TestDraft {
    pub fn new(code: &str, unit: &str, lower: &str, upper: &str) -> Self {
        Self {
            code: code.into(),
            unit: unit.into(),
            lower: lower.into(),
            upper: upper.into(),
        }
    }
}

/// Validated catalog row, ready to insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTest {
    pub code: String,
    pub unit: String,
    pub lower: f64,
    pub upper: f64,
}
