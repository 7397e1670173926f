use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tower_http::cors::CorsLayer;

use crate::dispatch::Dispatcher;
use crate::entrypoints::EntrypointDefinition;
use crate::error::{DispatchError, ValidationError, Violation};

pub const PRICE_HEADER: &str = "x-entrypoint-price";

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/entrypoints", get(list_entrypoints))
        .route("/entrypoints/{key}/invoke", post(invoke))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let status = match &self {
            DispatchError::NotFound { .. } => StatusCode::NOT_FOUND,
            DispatchError::Validation(_) => StatusCode::BAD_REQUEST,
            DispatchError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };
        (status, Json(self.to_envelope())).into_response()
    }
}

async fn list_entrypoints(State(state): State<AppState>) -> Json<Vec<EntrypointDefinition>> {
    Json(state.dispatcher.registry().definitions().to_vec())
}

#[derive(Deserialize)]
struct InvokeReq {
    #[serde(default)]
    input: Value,
}

/// Body is optional; an empty body means "no input".
fn parse_input(body: &[u8]) -> Result<Value, ValidationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice::<InvokeReq>(body)
        .map(|req| req.input)
        .map_err(|e| ValidationError::new("input", Violation::Malformed(e.to_string())))
}

async fn invoke(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Bytes,
) -> Response {
    let dispatcher = &state.dispatcher;
    let def = dispatcher.registry().get(&key);

    // Unknown keys report NotFound even when the body is also broken.
    let result = match (parse_input(&body), def) {
        (Ok(input), _) => dispatcher.dispatch(&key, input).await,
        (Err(e), Some(def)) => Err(dispatcher.reject(def, e)),
        (Err(_), None) => dispatcher.dispatch(&key, Value::Null).await,
    };

    let mut resp = match result {
        Ok(envelope) => Json(envelope).into_response(),
        Err(e) => e.into_response(),
    };
    if let Some(def) = def {
        resp.headers_mut()
            .insert(PRICE_HEADER, HeaderValue::from(def.price));
    }
    resp
}
