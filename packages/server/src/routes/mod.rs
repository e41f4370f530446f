use axum::{
    Router,
    routing::{get, put},
};

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn api_routes(config: &AppConfig) -> Router<AppState> {
    Router::new().nest("/countries", country_routes(config))
}

fn country_routes(config: &AppConfig) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::country::list_countries).post(handlers::country::create_country),
        )
        .route(
            "/{id}",
            put(handlers::country::update_country).delete(handlers::country::delete_country),
        )
        .layer(handlers::country::upload_body_limit(
            config.storage.max_upload_size,
        ))
}
