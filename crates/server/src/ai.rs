use api_types::ai::{ParseRequest, ParseResponse};
use axum::{Extension, Json, extract::State};
use engine::{ConfigValue, EngineError, User};

use crate::{ServerError, extract::ValidJson, server::ServerState};

const AI_PREFERENCE: &str = "ia_habilitada";

/// Parse free-form text into entry drafts. Nothing is stored; clients save
/// the result through the batch endpoint.
pub async fn parse_entries(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ValidJson(payload): ValidJson<ParseRequest>,
) -> Result<Json<ParseResponse>, ServerError> {
    if !ai_allowed(&state, &user).await? {
        let warnings = vec!["ai disabled in user preferences".to_string()];
        return Ok(Json(assistant::fallback(
            &payload.text,
            &payload.month,
            warnings,
        )));
    }

    let response = state.assistant.parse(&payload.text, &payload.month).await;
    tracing::debug!(
        user_id = %user.id,
        count = response.entries.len(),
        source = ?response.source,
        "text parsed"
    );
    Ok(Json(response))
}

async fn ai_allowed(state: &ServerState, user: &User) -> Result<bool, ServerError> {
    match state.engine.configuration(user.id, AI_PREFERENCE).await {
        Ok(configuration) => Ok(configuration.value != ConfigValue::Bool(false)),
        Err(EngineError::KeyNotFound(_)) => Ok(true),
        Err(err) => Err(err.into()),
    }
}
