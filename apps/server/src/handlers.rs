use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use vista::domain::catalog::LayerCatalog;
use vista::domain::document::MapConfiguration;
use vista::domain::identity::Identity;
use vista::features::layers::NormalizedLayer;
use vista::features::maps::{ExportReport, ThemeMap};

use crate::error::ApiError;
use crate::state::{AppState, RequestIdentity};

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
pub(crate) struct WashQuery {
    #[serde(default = "washed_by_default")]
    wash: bool,
}

const fn washed_by_default() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub(crate) struct UsersQuery {
    /// Comma-separated user names.
    #[serde(default)]
    users: String,
}

pub(crate) async fn map_config(
    State(state): State<AppState>,
    RequestIdentity(identity): RequestIdentity,
    Path(map): Path<String>,
    Query(query): Query<WashQuery>,
) -> ApiResult<MapConfiguration> {
    Ok(Json(state.service.get_map_config(&map, &identity, query.wash).await?))
}

pub(crate) async fn normalized_layer(
    State(state): State<AppState>,
    RequestIdentity(identity): RequestIdentity,
    Path((map, layer)): Path<(String, String)>,
) -> ApiResult<NormalizedLayer> {
    Ok(Json(state.service.get_normalized_layer(&map, &layer, &identity).await?))
}

pub(crate) async fn layers_store(
    State(state): State<AppState>,
    RequestIdentity(identity): RequestIdentity,
) -> ApiResult<LayerCatalog> {
    Ok(Json(state.service.get_layers_store(&identity).await?))
}

pub(crate) async fn export(
    State(state): State<AppState>,
    RequestIdentity(identity): RequestIdentity,
    Path((map, format)): Path<(String, String)>,
) -> ApiResult<ExportReport> {
    Ok(Json(state.service.export_map_config(&map, &format, &identity).await?))
}

pub(crate) async fn available_maps(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    Ok(Json(state.service.get_available_maps().await?))
}

pub(crate) async fn user_maps(
    State(state): State<AppState>,
    RequestIdentity(identity): RequestIdentity,
) -> ApiResult<Vec<ThemeMap>> {
    Ok(Json(state.service.get_user_specific_maps(&identity).await?))
}

pub(crate) async fn create_map(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.service.create_new_map(&name).await?;
    Ok(StatusCode::CREATED)
}

pub(crate) async fn duplicate_map(
    State(state): State<AppState>,
    Path((src, dest)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.service.duplicate_map(&src, &dest).await?;
    Ok(StatusCode::CREATED)
}

pub(crate) async fn delete_map(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_map(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn available_groups(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    Ok(Json(state.service.get_available_groups().await?))
}

pub(crate) async fn common_groups(
    State(state): State<AppState>,
    Query(query): Query<UsersQuery>,
) -> ApiResult<Vec<String>> {
    let users: Vec<Identity> = query
        .users
        .split(',')
        .map(str::trim)
        .filter(|user| !user.is_empty())
        .map(Identity::from)
        .collect();

    Ok(Json(state.service.find_common_groups(&users).await?))
}
