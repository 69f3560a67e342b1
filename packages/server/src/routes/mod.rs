use axum::middleware::from_fn_with_state;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::extractors::auth::require_auth;
use crate::handlers;
use crate::state::AppState;

/// Every route under `/api`. Protected routers carry the auth middleware as a
/// route layer so unmatched paths still 404 instead of 401.
pub fn api_routes(state: &AppState) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/user", user_routes(state))
        .nest("/try-on", try_on_routes(state))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes(state))
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
}

fn user_routes(state: &AppState) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::user::get_profile,
            handlers::user::update_profile
        ))
        .routes(routes!(
            handlers::user::get_body_profile,
            handlers::user::update_body_profile
        ))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

fn try_on_routes(state: &AppState) -> OpenApiRouter<AppState> {
    let upload = OpenApiRouter::new()
        .routes(routes!(handlers::try_on::upload_photo))
        .layer(handlers::try_on::upload_body_limit(
            state.config.storage.max_photo_size,
        ));

    OpenApiRouter::new()
        .routes(routes!(handlers::try_on::process_try_on))
        .routes(routes!(handlers::try_on::get_history))
        .routes(routes!(handlers::try_on::delete_try_on))
        .routes(routes!(handlers::try_on::get_try_on))
        .routes(routes!(handlers::try_on::get_try_on_image))
        .merge(upload)
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

fn product_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::product::list_products))
        .routes(routes!(handlers::product::get_product))
}

fn cart_routes(state: &AppState) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::cart::add_to_cart, handlers::cart::get_cart))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}
