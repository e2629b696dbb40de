use std::str::FromStr;

use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::enums::TemplateType;
use crate::models::AstmTemplate;

pub fn get_templates(conn: &Connection, analyzer_id: i64) -> Result<Vec<AstmTemplate>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT template_type, template_content FROM astm_templates
         WHERE analyzer_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map(params![analyzer_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut templates = Vec::with_capacity(rows.len());
    for (template_type, content) in rows {
        templates.push(AstmTemplate {
            analyzer_id,
            template_type: TemplateType::from_str(&template_type)?,
            content,
        });
    }
    Ok(templates)
}

/// Insert or overwrite the template of the given type for an analyzer.
pub fn upsert_template(conn: &Connection, template: &AstmTemplate) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO astm_templates (analyzer_id, template_type, template_content)
         VALUES (?1, ?2, ?3)
         ON CONFLICT (analyzer_id, template_type)
         DO UPDATE SET template_content = excluded.template_content",
        params![
            template.analyzer_id,
            template.template_type.as_str(),
            template.content,
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(())
}
