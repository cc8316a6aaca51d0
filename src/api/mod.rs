mod handlers;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::services::Services;

pub fn create_router(services: Services) -> Router {
    let api = Router::new()
        // Cats
        .route("/cats", get(handlers::list_cats).post(handlers::create_cat))
        .route(
            "/cats/{id}",
            get(handlers::get_cat)
                .put(handlers::update_cat)
                .delete(handlers::delete_cat),
        )
        // Missions
        .route(
            "/missions",
            get(handlers::list_missions).post(handlers::create_mission),
        )
        .route(
            "/missions/{id}",
            get(handlers::get_mission)
                .put(handlers::update_mission)
                .delete(handlers::delete_mission),
        )
        .route("/missions/{id}/assign", put(handlers::assign_cat))
        .route("/missions/{id}/complete", put(handlers::complete_mission))
        // Targets (always addressed through their mission)
        .route("/missions/{id}/targets", post(handlers::add_target))
        .route(
            "/missions/{id}/targets/{target_id}",
            put(handlers::update_target).delete(handlers::delete_target),
        )
        .route(
            "/missions/{id}/targets/{target_id}/complete",
            put(handlers::complete_target),
        )
        .route(
            "/missions/{id}/targets/{target_id}/notes",
            put(handlers::update_target_notes),
        )
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(services)
}
