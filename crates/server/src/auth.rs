//! Account and session endpoints

use api_types::auth::{Login, Register, SessionView, UserView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::Utc;
use engine::{Session, User};

use crate::{
    ServerError,
    extract::ValidJson,
    server::{ServerState, SessionToken},
};

fn user_view(user: User) -> UserView {
    UserView {
        id: user.id,
        name: user.name,
        email: user.email,
    }
}

fn session_view(user: User, session: Session) -> SessionView {
    SessionView {
        token: session.token,
        expires_at: session.expires_at,
        user: user_view(user),
    }
}

/// Create an account and log it in.
pub async fn register(
    State(state): State<ServerState>,
    ValidJson(payload): ValidJson<Register>,
) -> Result<(StatusCode, Json<SessionView>), ServerError> {
    let now = Utc::now();
    let user = state
        .engine
        .register_user(&payload.name, &payload.email, &payload.password, now)
        .await?;
    let session = state.engine.create_session(user.id, now).await?;

    Ok((StatusCode::CREATED, Json(session_view(user, session))))
}

pub async fn login(
    State(state): State<ServerState>,
    ValidJson(payload): ValidJson<Login>,
) -> Result<Json<SessionView>, ServerError> {
    let (user, session) = state
        .engine
        .login(&payload.email, &payload.password, Utc::now())
        .await?;
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(session_view(user, session)))
}

pub async fn logout(
    State(state): State<ServerState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> Result<StatusCode, ServerError> {
    state.engine.logout(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(Extension(user): Extension<User>) -> Json<UserView> {
    Json(user_view(user))
}
