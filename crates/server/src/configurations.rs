//! User preference endpoints

use api_types::config::{ConfigListResponse, ConfigUpdate, ConfigView};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::Utc;
use engine::{ConfigValue, Configuration, User};

use crate::{ServerError, extract::ValidJson, server::ServerState};

fn view(configuration: Configuration) -> ConfigView {
    ConfigView {
        key: configuration.key,
        value: configuration.value.to_json(),
        updated_at: configuration.updated_at,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<ConfigListResponse>, ServerError> {
    let configurations = state.engine.list_configurations(user.id).await?;
    Ok(Json(ConfigListResponse {
        configurations: configurations.into_iter().map(view).collect(),
    }))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(key): Path<String>,
) -> Result<Json<ConfigView>, ServerError> {
    let configuration = state.engine.configuration(user.id, &key).await?;
    Ok(Json(view(configuration)))
}

/// Overwrite an existing key; unknown keys answer 404.
pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(key): Path<String>,
    ValidJson(payload): ValidJson<ConfigUpdate>,
) -> Result<Json<ConfigView>, ServerError> {
    let value = ConfigValue::try_from(payload.value)?;
    let configuration = state
        .engine
        .update_configuration(user.id, &key, value, Utc::now())
        .await?;

    Ok(Json(view(configuration)))
}
