//! ASTM message templates. Content is stored and shown as written; nothing
//! here parses or sends it.

use rusqlite::Connection;

use crate::core_state::CoreError;
use crate::db::repository;
use crate::models::enums::{MessageDirection, TemplateField, TemplateType};
use crate::models::AstmTemplate;
use crate::registry;

pub const DEFAULT_SAMPLE_INFO_TEMPLATE: &str = "Send: <ENQ>\n\
Read: <ACK>\n\
\n\
Send: <STX>1H|\\^&|||1^Analyzer_1^|||||||||P||20101118101825<CR><ETX>A1\n\
Read: <ACK>\n\
\n\
Send: <STX>2Q|1|^SampleID_03^^||^^^ALL^||||||O<CR><ETX>FF\n\
Read: <ACK>\n\
\n\
Send: <STX>3L|1|N<CR><ETX>06\n\
Read: <ACK>\n\
\n\
Send: <EOT>";

pub const DEFAULT_RESULT_SEND_TEMPLATE: &str = "Send: <ENQ>\n\
Read: <ACK>\n\
Send: <STX>1H|\\^&|||1^Analyzer 1^7.0|||||||P||20190801124640<CR><ETX>E4\n\
Read: <ACK>\n\
\n\
Send: <STX>2P|1|PatientID_07|||Patient Name_7|||U<CR><ETX>67\n\
Read: <ACK>\n\
\n\
Send: <STX>3O|1|SampleID_07^0.0^5^1|||^^^Test_1^0.0|R||||||X|||3|||||||1|F<CR><ETX>2C\n\
Read: <ACK>\n\
\n\
Send: <STX>4R|1|^^^Test_1^0.0|2.4|mmol/l||N||F||||20190801124608|Analyzer 1<CR><ETX>3F\n\
Read: <ACK>\n\
\n\
Send: <STX>5L|1|N<CR><ETX>04\n\
Read: <ACK>\n\
\n\
Send: <EOT>";

pub fn default_content(template_type: TemplateType) -> &'static str {
    match template_type {
        TemplateType::SampleInfo => DEFAULT_SAMPLE_INFO_TEMPLATE,
        TemplateType::ResultSend => DEFAULT_RESULT_SEND_TEMPLATE,
    }
}

pub fn get_templates(conn: &Connection, analyzer_id: i64) -> Result<Vec<AstmTemplate>, CoreError> {
    Ok(repository::get_templates(conn, analyzer_id)?)
}

/// One template per type, falling back to the stock text for types never saved.
pub fn effective_templates(
    conn: &Connection,
    analyzer_id: i64,
) -> Result<Vec<AstmTemplate>, CoreError> {
    let stored = get_templates(conn, analyzer_id)?;
    Ok(TemplateType::ALL
        .iter()
        .map(|&template_type| {
            stored
                .iter()
                .find(|t| t.template_type == template_type)
                .cloned()
                .unwrap_or_else(|| AstmTemplate {
                    analyzer_id,
                    template_type,
                    content: default_content(template_type).to_string(),
                })
        })
        .collect())
}

pub fn save_template(
    conn: &Connection,
    analyzer_id: i64,
    template_type: TemplateType,
    content: &str,
) -> Result<AstmTemplate, CoreError> {
    registry::get_analyzer(conn, analyzer_id)?;
    let template = AstmTemplate {
        analyzer_id,
        template_type,
        content: content.to_string(),
    };
    repository::upsert_template(conn, &template)?;
    tracing::info!(analyzer_id, template = %template_type, "Template saved");
    Ok(template)
}

/// Render one editor line, e.g. `Send: <ENQ>` or `Read: R 1|^^^Test_1`.
pub fn field_line(direction: MessageDirection, field: TemplateField, text: &str) -> String {
    if field.is_control() {
        format!("{direction}: <{field}>")
    } else {
        format!("{direction}: {field} {text}")
    }
}

/// Append a field line as a new paragraph of `content`.
pub fn append_field(
    content: &str,
    direction: MessageDirection,
    field: TemplateField,
    text: &str,
) -> String {
    let line = field_line(direction, field, text);
    if content.is_empty() {
        line
    } else {
        format!("{content}\n{line}")
    }
}
