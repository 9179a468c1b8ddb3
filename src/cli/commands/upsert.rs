use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::{FieldValue, Identity, Record};
use crate::ui::messages::{info, success, warning};

/// Parse repeated `COLUMN=VALUE` arguments, keeping their order.
pub fn parse_fields(raw: &[String]) -> AppResult<Record<FieldValue>> {
    let mut fields = Record::new();
    for item in raw {
        let (key, value) = item.split_once('=').ok_or_else(|| {
            AppError::Validation(format!("field '{item}' must look like COLUMN=VALUE"))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(AppError::Validation(format!(
                "field '{item}' has an empty column name"
            )));
        }
        fields.insert(key, FieldValue::from(value));
    }
    Ok(fields)
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Upsert {
        table,
        name,
        phone,
        fields,
        mirror,
    } = cmd
    {
        let fields = parse_fields(fields)?;
        let store = super::open_store(cfg)?;
        let outcome = store.upsert(table, &Identity::new(name, phone), &fields, *mirror)?;

        success(format!(
            "{} ('{}', row {})",
            outcome.description, outcome.table, outcome.row
        ));
        if let Some(m) = &outcome.mirrored {
            info(format!("Mirrored into '{}': {} (row {})", m.table, m.action, m.row));
        }
        for d in &outcome.degradations {
            warning(d);
        }
    }
    Ok(())
}
