//! Tag revalidation endpoint handler.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::RequestId;
use crate::state::AppState;

/// Response para la revalidacion de un tag.
#[derive(Debug, Serialize)]
pub struct RevalidateResponse {
    /// Tag revalidado.
    pub tag: String,
    /// Mensaje descriptivo.
    pub message: String,
    /// Peticion que disparo la revalidacion, para cruzar con los logs.
    #[serde(rename = "requestId")]
    pub request_id: String,
}

/// POST /tags/{tag}/revalidate
#[instrument(skip_all, fields(tag = %tag, request_id = %request_id))]
pub async fn revalidate_tag(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(tag): Path<String>,
) -> Result<Json<RevalidateResponse>, AppError> {
    state.handler().revalidate_tag(&tag).await?;

    tracing::info!(tag = %tag, "Tag revalidated");

    Ok(Json(RevalidateResponse {
        message: format!("Tag '{}' revalidated", tag),
        tag,
        request_id: request_id.to_string(),
    }))
}
