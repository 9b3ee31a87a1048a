use serde::Deserialize;

use crate::{error::ApiError, validation::validate_non_empty};

/// Color given to categories created without one
pub const DEFAULT_COLOR: &str = "#3B82F6";

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// Accept `#RGB` or `#RRGGBB`.
pub fn validate_color(color: &str) -> Result<(), ApiError> {
    let hex = color.strip_prefix('#').unwrap_or_default();
    if matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(ApiError::Validation(format!(
            "Invalid color '{color}', expected a hex value like #FF5733"
        )))
    }
}

pub fn validate_name(name: &str) -> Result<(), ApiError> {
    validate_non_empty("name", name)
}
