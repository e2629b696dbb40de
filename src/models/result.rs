use serde::{Deserialize, Serialize};

use super::enums::AbnormalFlag;

/// Raw `results` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResult {
    pub id: i64,
    pub sample_id: i64,
    pub test_id: i64,
    pub value: f64,
    pub sent: bool,
}

/// Result joined with its test definition, as shown in the results view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub result_id: i64,
    pub test_code: String,
    pub value: f64,
    pub unit: String,
    pub lower: f64,
    pub upper: f64,
    pub sent: bool,
    pub abnormal: AbnormalFlag,
}

impl ResultRow {
    /// Text form of the reference range, e.g. `0.5 - 5`.
    pub fn normal_range(&self) -> String {
        format!("{} - {}", self.lower, self.upper)
    }

    pub fn is_abnormal(&self) -> bool {
        self.abnormal != AbnormalFlag::Normal
    }
}

impl AbnormalFlag {
    /// Outside `[lower, upper]` is abnormal; the bounds themselves are normal.
    pub fn classify(value: f64, lower: f64, upper: f64) -> Self {
        if value < lower {
            AbnormalFlag::Low
        } else if value > upper {
            AbnormalFlag::High
        } else {
            AbnormalFlag::Normal
        }
    }
}
