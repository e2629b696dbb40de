use serde::{Deserialize, Serialize};

/// A simulated instrument profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analyzer {
    pub id: i64,
    pub name: String,
}
