//! Static file serving for the embedded web UI
//!
//! Uses rust-embed to bundle the dist/ folder into the binary so the
//! service ships as a single executable.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;

/// Embedded UI assets from the dist/ folder
#[derive(Embed)]
#[folder = "dist/"]
struct FrontendAssets;

/// Serve embedded static files, falling back to index.html for page routes
pub async fn serve_static(req: Request<Body>) -> Response {
    if req.method() != Method::GET && req.method() != Method::HEAD {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }

    let path = req.uri().path().trim_start_matches('/');
    let path = if path.is_empty() { "index.html" } else { path };

    if let Some(response) = serve_file(path) {
        return response;
    }

    // Page routes without an extension get the app shell
    if !path.contains('.') {
        if let Some(response) = serve_file("index.html") {
            return response;
        }
    }

    (StatusCode::NOT_FOUND, "Not found").into_response()
}

/// Serve a specific file from embedded assets
fn serve_file(path: &str) -> Option<Response> {
    let file = FrontendAssets::get(path)?;

    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string();

    // Assets are not content-hashed, so always revalidate
    let cache_control = "public, max-age=0, must-revalidate";

    Some(
        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, mime_type),
                (header::CACHE_CONTROL, cache_control.to_string()),
            ],
            file.data.into_owned(),
        )
            .into_response(),
    )
}

/// Check if UI assets are embedded (i.e., dist/index.html was present at compile time)
pub fn has_embedded_frontend() -> bool {
    FrontendAssets::get("index.html").is_some()
}
