use axum::{
    async_trait,
    extract::{FromRequest, Request, State},
    http::{header, StatusCode},
    routing::post,
    Form, Json, Router,
};
use researchdesk_agent::facade::{ERR_EMPTY_QUERY, ERR_NOT_INITIALIZED};
use researchdesk_agent::ResponseEnvelope;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::error::AppError;
use crate::state::AppState;

/// Research query from a JSON body or an urlencoded form.
///
/// A missing `query` field is treated as empty and rejected by the facade.
#[derive(Debug, Deserialize)]
pub struct ResearchRequest {
    #[serde(default)]
    pub query: String,
}

#[async_trait]
impl<S> FromRequest<S> for ResearchRequest
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("application/json"))
            .unwrap_or(false);

        if is_json {
            let Json(body) = Json::<ResearchRequest>::from_request(req, state)
                .await
                .map_err(|e| AppError::bad_request(e.body_text()))?;
            Ok(body)
        } else {
            let Form(body) = Form::<ResearchRequest>::from_request(req, state)
                .await
                .map_err(|e| AppError::bad_request(e.body_text()))?;
            Ok(body)
        }
    }
}

pub fn research_router() -> Router<AppState> {
    Router::new().route("/research", post(research))
}

fn status_for(envelope: &ResponseEnvelope) -> StatusCode {
    match envelope.error() {
        None => StatusCode::OK,
        Some(ERR_EMPTY_QUERY) => StatusCode::BAD_REQUEST,
        Some(ERR_NOT_INITIALIZED) => StatusCode::SERVICE_UNAVAILABLE,
        Some(_) => StatusCode::BAD_GATEWAY,
    }
}

#[instrument(skip_all)]
async fn research(
    State(state): State<AppState>,
    request: ResearchRequest,
) -> (StatusCode, Json<ResponseEnvelope>) {
    let envelope = state.facade().search(&request.query).await;
    let status = status_for(&envelope);

    info!(
        success = envelope.is_success(),
        status = status.as_u16(),
        "research request handled"
    );

    (status, Json(envelope))
}
