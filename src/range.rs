//! Range Serving Module
//!
//! Serves an in-memory payload with single-range `Range: bytes=` support so
//! audio players can seek and resume.

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::error::AppError;

/// How a request's range header resolves against a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOutcome {
    /// No range header: serve everything with 200
    Full,
    /// Serve the inclusive span `start..=end` with 206
    Partial { start: u64, end: u64 },
    /// Malformed, inverted or out of bounds: 416
    Unsatisfiable,
}

/// Resolves a raw `Range` header value against a payload of `size` bytes.
///
/// Only `bytes=<start>-<end>` with an optional end is accepted. Presence of
/// the header decides between 200 and 206, even if it spans everything.
pub fn resolve(range: Option<&str>, size: u64) -> RangeOutcome {
    let Some(range) = range else {
        return RangeOutcome::Full;
    };

    let Some(spec) = range.trim().strip_prefix("bytes=") else {
        return RangeOutcome::Unsatisfiable;
    };
    let Some((start, end)) = spec.split_once('-') else {
        return RangeOutcome::Unsatisfiable;
    };

    let Some(start) = position(start) else {
        return RangeOutcome::Unsatisfiable;
    };
    let end = match end {
        "" => match size.checked_sub(1) {
            Some(last) => last,
            None => return RangeOutcome::Unsatisfiable,
        },
        end => match position(end) {
            Some(end) => end,
            None => return RangeOutcome::Unsatisfiable,
        },
    };

    if start > end || start >= size || end >= size {
        return RangeOutcome::Unsatisfiable;
    }

    RangeOutcome::Partial { start, end }
}

/// A byte position: plain ASCII digits only, no sign or whitespace.
fn position(digits: &str) -> Option<u64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Builds the response for `bytes` given the request headers.
pub fn serve_bytes(bytes: Bytes, content_type: &str, headers: &HeaderMap) -> Response {
    let range = headers
        .get(header::RANGE)
        .map(|value| value.to_str().unwrap_or(""));
    serve_range(bytes, content_type, range)
}

/// Builds a 200, 206 or 416 response for `bytes` and a raw range header.
pub fn serve_range(bytes: Bytes, content_type: &str, range: Option<&str>) -> Response {
    let size = bytes.len() as u64;
    let content_type = HeaderValue::from_str(content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

    match resolve(range, size) {
        RangeOutcome::Full => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, content_type),
                (header::CONTENT_LENGTH, HeaderValue::from(size)),
                (header::ACCEPT_RANGES, HeaderValue::from_static("bytes")),
            ],
            Body::from(bytes),
        )
            .into_response(),
        RangeOutcome::Partial { start, end } => {
            let chunk = bytes.slice(start as usize..=end as usize);
            let content_range = format!("bytes {}-{}/{}", start, end, size);
            (
                StatusCode::PARTIAL_CONTENT,
                [
                    (header::CONTENT_TYPE, content_type),
                    (header::CONTENT_LENGTH, HeaderValue::from(chunk.len() as u64)),
                    (header::ACCEPT_RANGES, HeaderValue::from_static("bytes")),
                    (
                        header::CONTENT_RANGE,
                        HeaderValue::from_str(&content_range)
                            .unwrap_or_else(|_| HeaderValue::from_static("bytes */0")),
                    ),
                ],
                Body::from(chunk),
            )
                .into_response()
        }
        RangeOutcome::Unsatisfiable => AppError::RangeNotSatisfiable { size }.into_response(),
    }
}
