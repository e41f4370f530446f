use atlas_common::storage::ImageStore;
use axum::Json;
use axum::extract::{DefaultBodyLimit, Path, State};
use tracing::{info, instrument, warn};

use crate::error::{AppError, ErrorBody};
use crate::extractors::country_form::CountryForm;
use crate::models::country::*;
use crate::state::AppState;
use crate::store::{CountryChanges, CountryStore};

/// Headroom over the per-image limit for the other multipart parts.
const FORM_OVERHEAD: u64 = 1024 * 1024;

/// Body limit layer for the multipart routes.
pub fn upload_body_limit(max_upload_size: u64) -> DefaultBodyLimit {
    let limit = max_upload_size.saturating_add(FORM_OVERHEAD);
    DefaultBodyLimit::max(usize::try_from(limit).unwrap_or(usize::MAX))
}

#[utoipa::path(
    get,
    path = "/api/countries",
    tag = "Countries",
    operation_id = "listCountries",
    summary = "List the collection",
    description = "Returns every country in the collection, newest first.",
    responses(
        (status = 200, description = "All countries", body = CountryListResponse),
        (status = 500, description = "Store failure (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_countries(
    State(state): State<AppState>,
) -> Result<Json<CountryListResponse>, AppError> {
    let countries = CountryStore::new(&state.db).list().await?;

    Ok(Json(CountryListResponse {
        countries: countries.into_iter().map(CountryResponse::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/countries",
    tag = "Countries",
    operation_id = "createCountry",
    summary = "Add a country",
    description = "Adds a country with its photo. Both the `name` text field and the `image` \
        file field are required. Images must be JPEG, PNG, GIF or WebP (by extension and \
        declared content type) and no larger than the configured limit (5 MiB by default).",
    request_body(content_type = "multipart/form-data", description = "`name` text field and `image` file field"),
    responses(
        (status = 200, description = "Country created", body = CreateCountryResponse),
        (status = 400, description = "Missing name or image (VALIDATION_ERROR)", body = ErrorBody),
        (status = 413, description = "Image too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
        (status = 415, description = "Image type not allowed (FILE_TYPE_NOT_ALLOWED)", body = ErrorBody),
        (status = 500, description = "Store failure (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, form))]
pub async fn create_country(
    State(state): State<AppState>,
    form: CountryForm,
) -> Result<Json<CreateCountryResponse>, AppError> {
    let name = form.name.as_deref().and_then(normalize_name);
    let (Some(name), Some(image)) = (name, form.image) else {
        return Err(AppError::Validation(NAME_AND_IMAGE_REQUIRED.into()));
    };
    validate_name_length(name)?;

    let size = image.size();
    let image_path = image.commit(&*state.image_store).await?;

    let model = match CountryStore::new(&state.db).insert(name, &image_path).await {
        Ok(model) => model,
        Err(e) => {
            remove_image(&*state.image_store, &image_path).await;
            return Err(e.into());
        }
    };

    info!(id = model.id, image_path = %model.image_path, size, "Country created");
    Ok(Json(CreateCountryResponse::from(model)))
}

#[utoipa::path(
    put,
    path = "/api/countries/{id}",
    tag = "Countries",
    operation_id = "updateCountry",
    summary = "Update a country",
    description = "Replaces the name, the image, or both. When a new image is supplied the \
        previous image file is removed after the row is updated.",
    params(("id" = i32, Path, description = "Country ID")),
    request_body(content_type = "multipart/form-data", description = "Optional `name` text field and optional `image` file field"),
    responses(
        (status = 200, description = "Country updated", body = MessageResponse),
        (status = 400, description = "Nothing to update or blank name (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Country not found (NOT_FOUND)", body = ErrorBody),
        (status = 413, description = "Image too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
        (status = 415, description = "Image type not allowed (FILE_TYPE_NOT_ALLOWED)", body = ErrorBody),
        (status = 500, description = "Store failure (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, form), fields(id))]
pub async fn update_country(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    form: CountryForm,
) -> Result<Json<MessageResponse>, AppError> {
    let name = match form.name.as_deref() {
        Some(raw) => {
            let name = normalize_name(raw)
                .ok_or_else(|| AppError::Validation("Country name cannot be empty".into()))?;
            validate_name_length(name)?;
            Some(name.to_string())
        }
        None => None,
    };
    if name.is_none() && form.image.is_none() {
        return Err(AppError::Validation(
            "Provide a name or an image to update".into(),
        ));
    }

    let store = CountryStore::new(&state.db);
    let existing = store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Country not found".into()))?;

    let new_image = match form.image {
        Some(staged) => Some(staged.commit(&*state.image_store).await?),
        None => None,
    };

    let changes = CountryChanges {
        name,
        image_path: new_image.clone(),
    };
    let updated = match store.update(id, changes).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            if let Some(path) = &new_image {
                remove_image(&*state.image_store, path).await;
            }
            return Err(AppError::NotFound("Country not found".into()));
        }
        Err(e) => {
            if let Some(path) = &new_image {
                remove_image(&*state.image_store, path).await;
            }
            return Err(e.into());
        }
    };

    if new_image.is_some() && existing.image_path != updated.image_path {
        remove_image(&*state.image_store, &existing.image_path).await;
    }

    info!(id, image_path = %updated.image_path, "Country updated");
    Ok(Json(MessageResponse::new("Country updated successfully")))
}

#[utoipa::path(
    delete,
    path = "/api/countries/{id}",
    tag = "Countries",
    operation_id = "deleteCountry",
    summary = "Remove a country",
    description = "Removes the country and its image file. Removing an ID that does not exist \
        also succeeds, so the operation is idempotent. A missing image file does not prevent \
        the row from being deleted.",
    params(("id" = i32, Path, description = "Country ID")),
    responses(
        (status = 200, description = "Country deleted (or already absent)", body = MessageResponse),
        (status = 500, description = "Store failure (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn delete_country(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    let store = CountryStore::new(&state.db);

    if let Some(existing) = store.get(id).await? {
        remove_image(&*state.image_store, &existing.image_path).await;
        store.delete(id).await?;
        info!(id, "Country deleted");
    }

    Ok(Json(MessageResponse::new("Country deleted successfully")))
}

/// Delete an image file, logging instead of failing.
async fn remove_image(store: &dyn ImageStore, image_path: &str) {
    match store.delete(image_path).await {
        Ok(true) => {}
        Ok(false) => warn!(image_path, "Image file already missing"),
        Err(e) => warn!(image_path, error = %e, "Failed to remove image file"),
    }
}
