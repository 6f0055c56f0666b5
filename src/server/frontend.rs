//! The environment page served on `/`
//!
//! Resolves the backend Service once, then queries each pod in turn and
//! streams its fragment as soon as it is rendered. A failing pod only costs
//! its own fragment; the page as a whole still answers 200.
//!
//! The body is produced lazily, so the request deadline is enforced here:
//! once it passes, the pending backend is reported as failed and the page ends.

use super::health::INTERNAL_ERROR;
use super::AppState;
use crate::render::{render_backend, render_fetch_error};
use axum::{
    body::Body,
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{Html, IntoResponse, Response},
};
use std::convert::Infallible;
use tokio::time::{timeout_at, Instant};
use tracing::{error, info, warn};

pub async fn home_page(State(state): State<AppState>) -> Response {
    let deadline = Instant::now() + state.request_timeout;
    let settings = &state.settings;

    let targets = match state
        .resolver
        .resolve(&settings.backend_service, &settings.pod_namespace)
        .await
    {
        Ok(targets) => targets,
        Err(e) => {
            error!(
                error = %e,
                service = %settings.backend_service,
                namespace = %settings.pod_namespace,
                "Failed to resolve backend endpoints"
            );
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(INTERNAL_ERROR)).into_response();
        }
    };

    info!(
        service = %settings.backend_service,
        backends = targets.len(),
        "Rendering backend environments"
    );

    let fetcher = state.fetcher.clone();
    let fragments = futures::stream::unfold(targets.into_iter(), move |mut pending| {
        let fetcher = fetcher.clone();
        async move {
            let target = pending.next()?;

            let fetch = fetcher.fetch_env(&target.ip, target.port);
            let Ok(result) = timeout_at(deadline, fetch).await else {
                warn!(
                    backend = %target.name,
                    ip = %target.ip,
                    skipped = pending.len(),
                    "Request deadline exceeded, ending page"
                );
                let fragment = render_fetch_error(&target);
                return Some((Ok::<_, Infallible>(fragment), Vec::new().into_iter()));
            };

            if let Err(e) = &result {
                warn!(
                    error = %e,
                    backend = %target.name,
                    ip = %target.ip,
                    port = target.port,
                    "Failed to fetch backend environment"
                );
            }
            Some((Ok(render_backend(&target, &result)), pending))
        }
    });

    (
        [(CONTENT_TYPE, "text/html; charset=utf-8")],
        Body::from_stream(fragments),
    )
        .into_response()
}
