use crate::error::CurascanError;
use crate::ranges::schema::ReferenceTableDef;

const WHO_RANGES_JSON: &str = include_str!("../../../../ranges/who-ranges.json");

/// Available predefined reference tables.
pub const PRESETS: &[&str] = &["who"];

/// Load a predefined reference table by name.
pub fn load_preset(name: &str) -> Result<ReferenceTableDef, CurascanError> {
    match name.trim().to_lowercase().as_str() {
        "who" => {
            let table: ReferenceTableDef = serde_json::from_str(WHO_RANGES_JSON)?;
            Ok(table)
        }
        _ => Err(CurascanError::UnknownPreset {
            name: name.to_string(),
            available: PRESETS.join(", "),
        }),
    }
}
