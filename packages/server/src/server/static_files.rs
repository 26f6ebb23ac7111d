use axum::{
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

use crate::server::error::ApiError;

// Operator UI, embedded at compile time from packages/server/public
#[derive(RustEmbed)]
#[folder = "public"]
pub struct OperatorAssets;

/// Serve the operator UI from embedded assets with fallback to index.html
///
/// Unknown `/api/*` paths get a JSON 404 instead of the page.
pub async fn serve_operator_ui(uri: Uri) -> Response {
    if uri.path().starts_with("/api/") {
        return ApiError::NotFound(uri.path().to_string()).into_response();
    }
    serve_embedded::<OperatorAssets>(uri).await
}

async fn serve_embedded<E: RustEmbed>(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    // If path is empty, serve index.html
    let path = if path.is_empty() { "index.html" } else { path };

    match E::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.as_ref())], content.data).into_response()
        }
        None => match E::get("index.html") {
            Some(content) => {
                ([(header::CONTENT_TYPE, "text/html")], content.data).into_response()
            }
            None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
        },
    }
}
