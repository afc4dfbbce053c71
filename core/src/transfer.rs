use crate::error::{GalleryError, Result};
use crate::settings::{Settings, SettingsPatch};
use serde_json::Value;

pub const EXPORT_FILE_NAME: &str = "hakkani_extension_settings.json";

/// Pretty-printed JSON holding exactly the settings fields.
pub fn export_settings(settings: &Settings) -> Result<String> {
    Ok(serde_json::to_string_pretty(settings)?)
}

/// Parses an exported document into a partial update. Fields the document
/// leaves out stay untouched when the patch is applied.
pub fn parse_settings_import(document: &str) -> Result<SettingsPatch> {
    let value: Value = serde_json::from_str(document)?;
    match value {
        Value::Object(object) => SettingsPatch::from_json_object(&object),
        other => Err(GalleryError::UnexpectedShape(format!(
            "expected a JSON object, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
