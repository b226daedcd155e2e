//! Request handlers.
//!
//! Engines are synchronous, potentially blocking (file reads + fitting), so
//! each invocation is moved off the async runtime with `spawn_blocking`.
//! Every engine outcome produces a well-formed JSON body; modeling failures
//! are data (`{"error": ...}`), not transport errors. Malformed request
//! bodies are the one exception: those never reach an engine and keep axum's
//! rejection response.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request, State};
use axum::{Json, async_trait};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::domain::SimulationParams;
use crate::engines;
use crate::error::EngineError;
use crate::server::AppState;

/// JSON body that may legitimately be absent.
///
/// A request without a JSON content type resolves to `None`, which sends the
/// engines down the file-dataset fallback path. A body that is present but
/// malformed (invalid JSON, mistyped fields) is a transport-level failure
/// and keeps the [`Json`] extractor's rejection.
pub struct MaybeJson<T>(pub Option<T>);

#[async_trait]
impl<S, T> FromRequest<S> for MaybeJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = JsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(MaybeJson(Some(value))),
            Err(JsonRejection::MissingJsonContentType(_)) => Ok(MaybeJson(None)),
            Err(rejection) => Err(rejection),
        }
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok", "service": "insight-engines"}))
}

pub async fn forecast(
    State(state): State<Arc<AppState>>,
    MaybeJson(payload): MaybeJson<Value>,
) -> Json<Value> {
    let data = state.data.clone();
    run_engine(move || {
        engines::run_forecast(payload.as_ref().and_then(Value::as_object), &data)
    })
    .await
}

pub async fn elasticity(
    State(state): State<Arc<AppState>>,
    MaybeJson(payload): MaybeJson<Value>,
) -> Json<Value> {
    let data = state.data.clone();
    run_engine(move || {
        engines::run_elasticity(payload.as_ref().and_then(Value::as_object), &data)
    })
    .await
}

pub async fn roi(
    State(state): State<Arc<AppState>>,
    MaybeJson(payload): MaybeJson<Value>,
) -> Json<Value> {
    let data = state.data.clone();
    run_engine(move || engines::run_roi(payload.as_ref().and_then(Value::as_object), &data)).await
}

pub async fn simulate(
    State(state): State<Arc<AppState>>,
    MaybeJson(body): MaybeJson<SimulationParams>,
) -> Json<Value> {
    let data = state.data.clone();
    let params = body.unwrap_or_default();
    run_engine(move || engines::run_simulation(&params, &data)).await
}

/// The combined report never fails wholesale; each section carries its own
/// value or error.
pub async fn analyze(State(state): State<Arc<AppState>>) -> Json<Value> {
    let data = state.data.clone();
    let joined = tokio::task::spawn_blocking(move || engines::run_analysis(&data)).await;
    match joined {
        Ok(report) => Json(to_body(&report)),
        Err(e) => Json(json!({"error": format!("Analysis task failed: {e}")})),
    }
}

async fn run_engine<T, F>(f: F) -> Json<Value>
where
    T: Serialize,
    F: FnOnce() -> Result<T, EngineError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(Ok(value)) => Json(to_body(&value)),
        Ok(Err(err)) => {
            tracing::debug!(error = %err, "engine returned an error section");
            Json(json!({"error": err.to_string()}))
        }
        Err(e) => Json(json!({"error": format!("Engine task failed: {e}")})),
    }
}

fn to_body<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value)
        .unwrap_or_else(|e| json!({"error": format!("Serialization failed: {e}")}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, header};

    fn json_request(body: &'static str) -> Request {
        HttpRequest::builder()
            .method("POST")
            .uri("/simulate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn malformed_json_body_is_a_transport_rejection() {
        let outcome = MaybeJson::<Value>::from_request(json_request("{not valid json"), &()).await;
        assert!(outcome.is_err());
    }

    #[tokio::test]
    async fn mistyped_fields_are_a_transport_rejection() {
        let outcome =
            MaybeJson::<SimulationParams>::from_request(json_request(r#"{"price": "twelve"}"#), &())
                .await;
        assert!(outcome.is_err());
    }

    #[tokio::test]
    async fn absent_body_resolves_to_none() {
        let request = HttpRequest::builder()
            .method("POST")
            .uri("/simulate")
            .body(Body::empty())
            .unwrap();
        let MaybeJson(body) = MaybeJson::<Value>::from_request(request, &()).await.unwrap();
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn valid_body_deserializes() {
        let request = json_request(r#"{"price": 12.5, "cost": 4.0}"#);
        let MaybeJson(body) = MaybeJson::<SimulationParams>::from_request(request, &())
            .await
            .unwrap();
        let params = body.unwrap();
        assert_eq!(params.price, 12.5);
        assert_eq!(params.cost, 4.0);
        assert_eq!(params.marketing_spend, 0.0);
    }
}
