pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

use std::time::Duration;

use axum::http::HeaderValue;
use axum::routing::get;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Atlas API",
        version = "1.0.0",
        description = "API for a personal gallery of visited countries"
    ),
    paths(
        handlers::country::list_countries,
        handlers::country::create_country,
        handlers::country::update_country,
        handlers::country::delete_country,
    ),
    components(schemas(
        models::country::CountryResponse,
        models::country::CountryListResponse,
        models::country::CreateCountryResponse,
        models::country::MessageResponse,
        error::ErrorBody,
    )),
    tags(
        (name = "Countries", description = "Collection entries and their photos"),
    ),
)]
struct ApiDoc;

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let public_dir = state.config.server.public_dir.clone();
    let cors = cors_layer(&state.config.server.cors);

    let api = ApiDoc::openapi();

    axum::Router::new()
        .nest("/api", routes::api_routes(&state.config))
        .route("/uploads/{filename}", get(handlers::uploads::serve_upload))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
        .fallback_service(ServeDir::new(public_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = if config.allow_origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            config
                .allow_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(config.max_age))
}
