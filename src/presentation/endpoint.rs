// Insights endpoint - shared by the HTTP server and the function adapter
use crate::application::insights_service::{InsightsError, InsightsService};
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

/// Transport-neutral response: status, optional JSON body, CORS headers.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointResponse {
    pub status: StatusCode,
    pub body: Option<Value>,
}

impl EndpointResponse {
    fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    fn empty(status: StatusCode) -> Self {
        Self { status, body: None }
    }

    fn from_error(err: &InsightsError) -> Self {
        let mut body = json!({ "error": err.to_string() });
        if let Some(details) = err.details() {
            body["details"] = Value::String(details);
        }
        Self::json(status_for(err), body)
    }

    /// Headers every response carries, plus the content type when there is a body.
    pub fn headers(&self) -> Vec<(&'static str, &'static str)> {
        let mut headers = CORS_HEADERS.to_vec();
        if self.body.is_some() {
            headers.push(("Content-Type", "application/json"));
        }
        headers
    }

    pub fn body_string(&self) -> String {
        self.body.as_ref().map(Value::to_string).unwrap_or_default()
    }
}

pub fn status_for(err: &InsightsError) -> StatusCode {
    match err {
        InsightsError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        InsightsError::MissingData => StatusCode::BAD_REQUEST,
        InsightsError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        InsightsError::Configuration | InsightsError::Unknown(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// `received -> validated -> remote call -> classified response`; never panics
/// on client input.
pub async fn handle_generate_insights(
    service: &InsightsService,
    method: &Method,
    body: &[u8],
) -> EndpointResponse {
    if let Some(response) = answer_method(method) {
        return response;
    }

    let Some(data) = extract_data(body) else {
        tracing::debug!("Insights request without dashboard data");
        return EndpointResponse::from_error(&InsightsError::MissingData);
    };

    match service.generate_insights(&data).await {
        Ok(insights) => EndpointResponse::json(
            StatusCode::OK,
            json!({
                "success": true,
                "insights": insights.html,
                "timestamp": insights.timestamp_iso(),
            }),
        ),
        Err(err) => EndpointResponse::from_error(&err),
    }
}

/// The request body could not be read (too large, aborted); answered in the
/// same JSON shape as every other failure.
pub fn handle_unreadable_body(method: &Method, reason: String) -> EndpointResponse {
    if let Some(response) = answer_method(method) {
        return response;
    }
    tracing::warn!("Unreadable insights request body: {}", reason);
    EndpointResponse::from_error(&InsightsError::Unknown(Some(reason)))
}

/// Preflight and unsupported verbs; `None` means carry on with a POST.
fn answer_method(method: &Method) -> Option<EndpointResponse> {
    if *method == Method::OPTIONS {
        return Some(EndpointResponse::empty(StatusCode::OK));
    }
    if *method != Method::POST {
        tracing::debug!("Rejecting {} on insights endpoint", method);
        return Some(EndpointResponse::from_error(&InsightsError::MethodNotAllowed));
    }
    None
}

/// The truthy `data` member of a JSON body; anything else counts as missing.
fn extract_data(body: &[u8]) -> Option<Value> {
    let mut payload: Value = serde_json::from_slice(body).ok()?;
    let data = payload.get_mut("data")?.take();
    is_truthy(&data).then_some(data)
}

/// `null`, `false`, `0` and `""` are falsy; arrays and objects are truthy even when empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::insights_generator::GenerationError;
    use crate::application::insights_service::tests::MockGenerator;
    use std::sync::Arc;
    use std::time::Duration;

    fn service(reply: Result<String, GenerationError>) -> InsightsService {
        InsightsService::new(
            Arc::new(MockGenerator::replying(reply)),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_is_truthy() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!(-1)));
    }

    #[tokio::test]
    async fn test_options_is_empty_ok_with_cors() {
        let svc = service(Ok("unused".to_string()));
        let response = handle_generate_insights(&svc, &Method::OPTIONS, b"").await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, None);
        assert_eq!(response.headers(), CORS_HEADERS.to_vec());
    }

    #[tokio::test]
    async fn test_other_methods_are_rejected() {
        let svc = service(Ok("unused".to_string()));
        for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
            let response = handle_generate_insights(&svc, &method, b"").await;
            assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(response.body, Some(json!({ "error": "Method not allowed" })));
        }
    }

    #[tokio::test]
    async fn test_missing_or_falsy_data() {
        let svc = service(Ok("unused".to_string()));
        let bodies: [&[u8]; 6] = [
            b"{}",
            b"{\"data\": null}",
            b"{\"data\": false}",
            b"{\"data\": 0}",
            b"not json",
            b"",
        ];
        for body in bodies {
            let response = handle_generate_insights(&svc, &Method::POST, body).await;
            assert_eq!(response.status, StatusCode::BAD_REQUEST);
            assert_eq!(
                response.body,
                Some(json!({ "error": "Dashboard data is required" }))
            );
        }
    }

    #[test]
    fn test_unreadable_body() {
        let response = handle_unreadable_body(
            &Method::POST,
            "Failed to buffer the request body: length limit exceeded".to_string(),
        );
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.body,
            Some(json!({
                "error": "Failed to generate insights",
                "details": "Failed to buffer the request body: length limit exceeded"
            }))
        );
        assert!(response.headers().contains(&("Access-Control-Allow-Origin", "*")));

        let response = handle_unreadable_body(&Method::GET, "ignored".to_string());
        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_success_shape() {
        let svc = service(Ok("<p>insight</p>".to_string()));
        let response =
            handle_generate_insights(&svc, &Method::POST, br#"{"data":{"metrics":[]}}"#).await;

        assert_eq!(response.status, StatusCode::OK);
        let body = response.body.unwrap();
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["insights"], json!("<p>insight</p>"));
        let timestamp = body["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[tokio::test]
    async fn test_error_mapping() {
        let cases = [
            (
                GenerationError::MissingCredential,
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "AI service configuration error", "details": "API key not configured" }),
            ),
            (
                GenerationError::Remote("Resource has been exhausted (e.g. check quota).".to_string()),
                StatusCode::TOO_MANY_REQUESTS,
                json!({ "error": "AI service rate limit exceeded", "details": "Please try again later" }),
            ),
            (
                GenerationError::Remote("socket hang up".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Failed to generate insights", "details": "socket hang up" }),
            ),
            (
                GenerationError::Remote(String::new()),
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Failed to generate insights", "details": "Unknown error occurred" }),
            ),
        ];

        for (error, status, body) in cases {
            let svc = service(Err(error));
            let response =
                handle_generate_insights(&svc, &Method::POST, br#"{"data":{"a":1}}"#).await;
            assert_eq!(response.status, status);
            assert_eq!(response.body, Some(body));
            assert!(response.headers().contains(&("Access-Control-Allow-Origin", "*")));
        }
    }
}
