//! Assets API endpoints.

use api_types::{
    Created,
    asset::{AssetNew, AssetUpdate, AssetView, AssetsResponse},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    ServerError,
    convert::{asset_kind, asset_view},
    server::{ServerState, Session},
};

pub async fn list(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<AssetsResponse>, ServerError> {
    let assets = state.engine.assets(session.user_id()).await?;
    Ok(Json(AssetsResponse {
        assets: assets.into_iter().map(asset_view).collect(),
    }))
}

pub async fn asset_new(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Json(payload): Json<AssetNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let asset = state
        .engine
        .new_asset(
            &payload.name,
            asset_kind(payload.kind),
            payload.current_value,
            session.user_id(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(Created { id: asset.id })))
}

pub async fn get(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(asset_id): Path<Uuid>,
) -> Result<Json<AssetView>, ServerError> {
    let asset = state.engine.asset(asset_id, session.user_id()).await?;
    Ok(Json(asset_view(asset)))
}

pub async fn update(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(asset_id): Path<Uuid>,
    Json(payload): Json<AssetUpdate>,
) -> Result<Json<AssetView>, ServerError> {
    if payload.name.is_none() && payload.kind.is_none() && payload.current_value.is_none() {
        return Err(ServerError::Generic(
            "provide at least one of name, kind or current_value".to_string(),
        ));
    }

    let update = engine::AssetUpdate {
        name: payload.name,
        kind: payload.kind.map(asset_kind),
        current_value: payload.current_value,
    };
    let asset = state
        .engine
        .update_asset(asset_id, update, session.user_id())
        .await?;
    Ok(Json(asset_view(asset)))
}

pub async fn delete(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(asset_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_asset(asset_id, session.user_id())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
