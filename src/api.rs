// src/api.rs
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::curate::{CuratedData, CurationPipeline, CurationRequest};
use crate::error::CurateError;
use crate::llm::{DynLlm, ModelRoles};
use crate::post::condense_post;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<CurationPipeline>,
    pub llm: DynLlm,
    pub roles: Arc<ModelRoles>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/curate", post(curate))
        .route("/condense", post(condense))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Missing state/config → 422, everything else → 502 (an upstream failed).
struct ApiError(anyhow::Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match CurateError::find(&self.0) {
            Some(
                CurateError::MissingState(_)
                | CurateError::MissingConfig(_)
                | CurateError::InvalidConfig(_)
                | CurateError::MissingCredential(_),
            ) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::BAD_GATEWAY,
        };
        warn!(target: "api", error = ?self.0, %status, "request failed");
        (
            status,
            Json(ErrorBody {
                error: format!("{:#}", self.0),
            }),
        )
            .into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

async fn curate(
    State(state): State<AppState>,
    Json(req): Json<CurationRequest>,
) -> Result<Json<CuratedData>, ApiError> {
    Ok(Json(state.pipeline.run(req).await?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CondenseReq {
    #[serde(default)]
    post: String,
    #[serde(default)]
    report: String,
    #[serde(default)]
    relevant_links: Vec<String>,
}

#[derive(Serialize)]
struct CondenseResp {
    post: String,
}

async fn condense(
    State(state): State<AppState>,
    Json(body): Json<CondenseReq>,
) -> Result<Json<CondenseResp>, ApiError> {
    let post = condense_post(
        state.llm.as_ref(),
        &state.roles.generation,
        &body.post,
        &body.report,
        &body.relevant_links,
    )
    .await?;
    Ok(Json(CondenseResp { post }))
}
