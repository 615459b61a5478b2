//! Cache entry endpoint handlers.
//!
//! La clave es el resto de la ruta. Claves que empiezan por `/` se envian
//! codificadas: `GET /entries/%2Fblog` lee la clave `/blog`.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;
use vortex_cache_core::{CacheEntry, GetContext};

use crate::error::AppError;
use crate::state::AppState;

/// Query de lectura.
#[derive(Debug, Default, Deserialize)]
pub struct GetEntryQuery {
    /// Tags implicitos separados por comas.
    #[serde(default, rename = "implicitTags")]
    pub implicit_tags: Option<String>,
}

impl GetEntryQuery {
    fn context(&self) -> GetContext {
        let tags = self
            .implicit_tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty());

        GetContext::with_implicit_tags(tags)
    }
}

/// GET /entries/{*key}
#[instrument(skip_all, fields(key = %key))]
pub async fn get_entry(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<GetEntryQuery>,
) -> Result<Json<CacheEntry>, AppError> {
    match state.handler().get(&key, &query.context()).await? {
        Some(entry) => Ok(Json(entry)),
        None => Err(AppError::NotFound { key }),
    }
}

/// PUT /entries/{*key}
#[instrument(skip_all, fields(key = %key))]
pub async fn put_entry(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(entry): Json<CacheEntry>,
) -> Result<StatusCode, AppError> {
    state.handler().set(&key, &entry).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /entries/{*key}
#[instrument(skip_all, fields(key = %key))]
pub async fn delete_entry(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, AppError> {
    state.handler().delete(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}
