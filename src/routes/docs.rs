use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;

use super::AppState;
use crate::csrf;
use crate::viewer::{DocViewerBootstrapper, PageShell, ScriptWidget, ViewerSettings};

/// GET /: send visitors to the docs page
pub async fn root_redirect() -> Redirect {
    Redirect::permanent("/docs/")
}

/// GET /docs/: render the documentation page with the visitor's CSRF token
pub async fn docs_page(State(state): State<AppState>, jar: CookieJar) -> Response {
    let viewer = &state.config.viewer;
    let token = state
        .csrf
        .reuse_or_issue(jar.get(csrf::CSRF_COOKIE).map(|c| c.value()));

    let bootstrapper = DocViewerBootstrapper::new(
        viewer.schema_url.clone(),
        token.clone(),
        ViewerSettings::new(viewer.settings.clone()),
    )
    .mount_point(viewer.mount_point.clone());

    let page = bootstrapper
        .bootstrap(ScriptWidget::new(PageShell::from_config(viewer)))
        .and_then(ScriptWidget::render);

    match page {
        Ok(html) => {
            let secure = state.config.server.public_url.starts_with("https://");
            (
                jar.add(csrf::token_cookie(token, secure)),
                [(header::CACHE_CONTROL, "no-store")],
                Html(html),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to render documentation page");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "documentation page unavailable",
            )
                .into_response()
        }
    }
}
