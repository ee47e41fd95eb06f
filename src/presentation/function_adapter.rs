// Serverless function adapter - one JSON event in, one JSON response out
use crate::application::insights_service::InsightsService;
use crate::presentation::endpoint::handle_generate_insights;
use axum::http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Invocation event handed to the function by its host.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationEvent {
    pub http_method: String,
    /// Raw JSON text, or an already-parsed object on hosts that decode bodies.
    #[serde(default)]
    pub body: Option<Value>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub async fn handle_invocation(service: &InsightsService, event: InvocationEvent) -> InvocationResponse {
    // Unparseable verbs are answered like any other unsupported method.
    let method = Method::from_bytes(event.http_method.to_uppercase().as_bytes())
        .unwrap_or(Method::TRACE);

    let body = match event.body {
        Some(Value::String(raw)) => raw.into_bytes(),
        Some(Value::Null) | None => Vec::new(),
        Some(parsed) => parsed.to_string().into_bytes(),
    };

    let response = handle_generate_insights(service, &method, &body).await;

    InvocationResponse {
        status_code: response.status.as_u16(),
        headers: response
            .headers()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        body: response.body_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::insights_generator::GenerationError;
    use crate::application::insights_service::tests::MockGenerator;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn service(reply: Result<String, GenerationError>) -> InsightsService {
        InsightsService::new(Arc::new(MockGenerator::replying(reply)), Duration::from_secs(5))
    }

    fn event(value: Value) -> InvocationEvent {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_string_body() {
        let svc = service(Ok("<p>hi</p>".to_string()));
        let response = handle_invocation(
            &svc,
            event(json!({ "httpMethod": "POST", "body": "{\"data\":{\"metrics\":[]}}" })),
        )
        .await;

        assert_eq!(response.status_code, 200);
        assert_eq!(response.headers["Access-Control-Allow-Origin"], "*");
        assert_eq!(response.headers["Content-Type"], "application/json");
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["insights"], json!("<p>hi</p>"));
    }

    #[tokio::test]
    async fn test_object_body_and_lowercase_method() {
        let svc = service(Err(GenerationError::MissingCredential));
        let response = handle_invocation(
            &svc,
            event(json!({ "httpMethod": "post", "body": { "data": { "metrics": [] } } })),
        )
        .await;

        assert_eq!(response.status_code, 500);
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(
            body,
            json!({ "error": "AI service configuration error", "details": "API key not configured" })
        );
    }

    #[tokio::test]
    async fn test_options_and_unknown_methods() {
        let svc = service(Ok("x".to_string()));
        let response = handle_invocation(&svc, event(json!({ "httpMethod": "OPTIONS" }))).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, "");
        assert!(!response.headers.contains_key("Content-Type"));

        let response = handle_invocation(&svc, event(json!({ "httpMethod": "BAD VERB" }))).await;
        assert_eq!(response.status_code, 405);
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let response = InvocationResponse {
            status_code: 200,
            headers: BTreeMap::new(),
            body: String::new(),
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "statusCode": 200, "headers": {}, "body": "" })
        );
    }
}
