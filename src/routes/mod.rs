pub mod docs;
pub mod proxy;

use std::sync::Arc;

use axum::middleware;
use axum::routing::{any, get};
use axum::Router;

use crate::config::Config;
use crate::csrf::{self, CsrfKey};

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub csrf: CsrfKey,
    pub http: reqwest::Client,
}

pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/", get(docs::root_redirect))
        .route("/docs/", get(docs::docs_page));

    // Widget calls are only forwarded when an upstream API is configured
    if state.config.upstream.is_some() {
        app = app.route(
            "/api/{*path}",
            any(proxy::forward).layer(middleware::from_fn_with_state(
                state.csrf.clone(),
                csrf::require_token,
            )),
        );
    }

    app.with_state(state)
}
