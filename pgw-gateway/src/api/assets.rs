//! Asset endpoints
//!
//! `GET /assets` lists one page from the asset store and enriches it;
//! `DELETE /assets` forwards a bulk delete.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    Extension, Json,
};
use pgw_common::api::{AssetsResponse, DeleteAssetsResponse};
use serde::Deserialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::services::auth_gate::AuthenticatedCaller;
use crate::AppState;

const DEFAULT_SKIP: u64 = 0;
const DEFAULT_LIMIT: u64 = 100;

/// Raw paging parameters; parsed by [`parse_paging`]
#[derive(Debug, Default, Deserialize)]
pub struct AssetsQuery {
    pub skip: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAssetsRequest {
    pub asset_ids: Vec<String>,
}

/// Parse `skip` and `limit`
///
/// Both accept any finite decimal number; fractions truncate toward zero.
/// `skip` must end up >= 0 and `limit` >= 1.
pub fn parse_paging(query: &AssetsQuery) -> Result<(u64, u64), ApiError> {
    let skip = parse_count(query.skip.as_deref(), DEFAULT_SKIP, 0).ok_or_else(|| {
        ApiError::Validation("skip must be a non-negative number".to_string())
    })?;
    let limit = parse_count(query.limit.as_deref(), DEFAULT_LIMIT, 1)
        .ok_or_else(|| ApiError::Validation("limit must be a positive number".to_string()))?;
    Ok((skip, limit))
}

fn parse_count(raw: Option<&str>, default: u64, min: u64) -> Option<u64> {
    let Some(raw) = raw else {
        return Some(default);
    };

    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }

    let truncated = value.trunc();
    if truncated < min as f64 {
        return None;
    }
    Some(truncated as u64)
}

/// GET /assets?skip&limit
pub async fn get_assets(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedCaller>,
    query: Result<Query<AssetsQuery>, QueryRejection>,
) -> ApiResult<Json<AssetsResponse>> {
    let Query(query) = query.map_err(|e| ApiError::Validation(e.body_text()))?;
    let (skip, limit) = parse_paging(&query)?;

    let assets = state.assets.get_assets(&caller.token, skip, limit).await?;
    let enriched = state.enrichment.enrich(&assets).await?;

    info!(
        user_id = %caller.identity.user_id,
        skip,
        limit,
        count = enriched.len(),
        "Served asset page"
    );

    Ok(Json(AssetsResponse { assets: enriched }))
}

/// DELETE /assets with body `{assetIds: [..]}`
pub async fn delete_assets(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedCaller>,
    payload: Result<Json<DeleteAssetsRequest>, JsonRejection>,
) -> ApiResult<Json<DeleteAssetsResponse>> {
    let Json(request) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;

    if request.asset_ids.is_empty() {
        return Err(ApiError::Validation(
            "assetIds must be a non-empty array".to_string(),
        ));
    }
    if request.asset_ids.iter().any(|id| id.trim().is_empty()) {
        return Err(ApiError::Validation(
            "assetIds must contain only non-empty strings".to_string(),
        ));
    }

    state
        .assets
        .delete_assets(&caller.token, &request.asset_ids)
        .await?;

    info!(
        user_id = %caller.identity.user_id,
        count = request.asset_ids.len(),
        "Deleted assets"
    );

    Ok(Json(DeleteAssetsResponse {
        success: true,
        deleted_count: request.asset_ids.len(),
    }))
}
