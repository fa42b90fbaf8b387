use axum::{middleware, routing::get, Router};
use tower_http::cors::CorsLayer;

use crate::{
    app_state::AppState,
    middleware::{language_middleware, observability_middleware},
    modules::i18n::create_i18n_routes,
};

pub fn create_router(state: AppState) -> Router {
    let base_path = state.i18n_config.base_path.clone();
    let i18n_routes = create_i18n_routes();

    let router = Router::new().route("/", get(hello));
    // axum refuses to nest at the root
    let router = if base_path.is_empty() {
        router.merge(i18n_routes)
    } else {
        router.nest(&base_path, i18n_routes)
    };

    router
        .layer(middleware::from_fn_with_state(
            state.clone(),
            language_middleware,
        ))
        .layer(middleware::from_fn(observability_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn hello() -> &'static str {
    "Locale Hub says hello!\n"
}
