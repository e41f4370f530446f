use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::country;
use crate::error::AppError;

/// Longest accepted country name, in characters.
pub const MAX_NAME_CHARS: usize = 256;

pub const NAME_AND_IMAGE_REQUIRED: &str = "Country name and image are required";

/// A collection entry as returned by the list endpoint.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CountryResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Japan")]
    pub name: String,
    /// Filename under `/uploads/`.
    #[schema(example = "1718000000000-482913375.jpg")]
    pub image_path: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CountryListResponse {
    pub countries: Vec<CountryResponse>,
}

/// Response to a successful create.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CreateCountryResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Japan")]
    pub name: String,
    #[schema(example = "1718000000000-482913375.jpg")]
    pub image_path: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Country deleted successfully")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

impl From<country::Model> for CountryResponse {
    fn from(model: country::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            image_path: model.image_path,
            created_at: model.created_at,
        }
    }
}

impl From<country::Model> for CreateCountryResponse {
    fn from(model: country::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            image_path: model.image_path,
        }
    }
}

/// Trim a submitted name, returning `None` when nothing is left.
pub fn normalize_name(raw: &str) -> Option<&str> {
    let name = raw.trim();
    (!name.is_empty()).then_some(name)
}

/// Validate a trimmed name's length.
pub fn validate_name_length(name: &str) -> Result<(), AppError> {
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(AppError::Validation(format!(
            "Country name must be at most {MAX_NAME_CHARS} characters"
        )));
    }
    Ok(())
}
