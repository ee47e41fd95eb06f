// HTTP response utilities for JSON endpoint replies
use axum::{
    body::Body,
    http::{header, HeaderValue, Response, StatusCode},
};

/// Build a response with the given headers and JSON body; an empty string
/// sends no body.
pub fn json_response(
    status: StatusCode,
    headers: &[(&'static str, &'static str)],
    body: String,
) -> Result<Response<Body>, StatusCode> {
    let body_bytes = body.into_bytes();

    let mut response_builder = Response::builder().status(status).header(
        header::CONTENT_LENGTH,
        HeaderValue::from(body_bytes.len()),
    );

    for (name, value) in headers {
        response_builder = response_builder.header(*name, *value);
    }

    response_builder
        .body(Body::from(body_bytes))
        .map_err(|e| {
            tracing::error!("Response build error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}
