use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method},
    middleware::Next,
    response::Response,
};

use crate::AppState;

pub const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type";

/// Origin allow-list for the clock API.
///
/// A listed `Origin` is echoed back; anything else (including no origin)
/// gets the first listed entry. Browsers on other origins therefore see a
/// mismatched header, but the request itself is still handled, so this is
/// not an access control.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_origins: Vec<HeaderValue>,
}

impl CorsPolicy {
    /// Origins that are not valid header values are dropped; an empty list is an error.
    pub fn new(origins: &[String]) -> anyhow::Result<Self> {
        let allowed_origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!("Ignoring invalid allowed origin: {o}");
                    None
                }
            })
            .collect();
        if allowed_origins.is_empty() {
            anyhow::bail!("CORS policy needs at least one allowed origin");
        }
        Ok(Self { allowed_origins })
    }

    pub fn allow_origin(&self, request_origin: Option<&HeaderValue>) -> HeaderValue {
        request_origin
            .and_then(|o| self.allowed_origins.iter().find(|allowed| *allowed == o))
            .unwrap_or(&self.allowed_origins[0])
            .clone()
    }

    pub fn apply(&self, request_origin: Option<&HeaderValue>, headers: &mut HeaderMap) {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            self.allow_origin(request_origin),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
        headers.append(header::VARY, HeaderValue::from_static("origin"));
    }
}

/// True when all three CORS preflight headers are present.
pub fn is_preflight(headers: &HeaderMap) -> bool {
    headers.contains_key(header::ORIGIN)
        && headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
        && headers.contains_key(header::ACCESS_CONTROL_REQUEST_HEADERS)
}

/// Adds the CORS header set to every response except a plain (non-preflight) OPTIONS.
pub async fn apply_cors(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let bare_options = req.method() == Method::OPTIONS && !is_preflight(req.headers());
    let origin = req.headers().get(header::ORIGIN).cloned();

    let mut response = next.run(req).await;
    if !bare_options {
        state.cors.apply(origin.as_ref(), response.headers_mut());
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> CorsPolicy {
        CorsPolicy::new(&[
            "https://caregiver-tools-dayclock.pages.dev".to_string(),
            "http://localhost:8788".to_string(),
        ])
        .unwrap()
    }

    #[test]
    fn test_listed_origin_is_echoed() {
        let origin = HeaderValue::from_static("http://localhost:8788");
        assert_eq!(policy().allow_origin(Some(&origin)), "http://localhost:8788");
    }

    #[test]
    fn test_unknown_origin_gets_first_entry() {
        let origin = HeaderValue::from_static("https://evil.example");
        assert_eq!(
            policy().allow_origin(Some(&origin)),
            "https://caregiver-tools-dayclock.pages.dev"
        );
        assert_eq!(
            policy().allow_origin(None),
            "https://caregiver-tools-dayclock.pages.dev"
        );
    }

    #[test]
    fn test_empty_policy_rejected() {
        assert!(CorsPolicy::new(&[]).is_err());
        assert!(CorsPolicy::new(&["bad\norigin".to_string()]).is_err());
    }

    #[test]
    fn test_preflight_needs_all_three_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ORIGIN, HeaderValue::from_static("http://localhost:8788"));
        headers.insert(
            header::ACCESS_CONTROL_REQUEST_METHOD,
            HeaderValue::from_static("POST"),
        );
        assert!(!is_preflight(&headers));
        headers.insert(
            header::ACCESS_CONTROL_REQUEST_HEADERS,
            HeaderValue::from_static("content-type"),
        );
        assert!(is_preflight(&headers));
    }
}
