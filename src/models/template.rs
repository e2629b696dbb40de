use serde::{Deserialize, Serialize};

use super::enums::TemplateType;

/// ASTM message template. The content is never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstmTemplate {
    pub analyzer_id: i64,
    pub template_type: TemplateType,
    pub content: String,
}
