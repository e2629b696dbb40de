use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub id: i64,
    pub sample_number: String,
    pub patient_id: String,
    pub patient_name: String,
    /// Last store time, UTC.
    pub date_time: NaiveDateTime,
}

impl Sample {
    /// Store time in the host's local zone, for display.
    pub fn local_date_time(&self) -> DateTime<Local> {
        Local.from_utc_datetime(&self.date_time)
    }
}

/// One row of the sample input form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SampleEntry {
    pub sample_number: String,
    pub patient_id: String,
    pub patient_name: String,
}

impl SampleEntry {
    pub fn new(sample_number: &str, patient_id: &str, patient_name: &str) -> Self {
        Self {
            sample_number: sample_number.into(),
            patient_id: patient_id.into(),
            patient_name: patient_name.into(),
        }
    }
}
