use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post, put},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use chrono::Utc;

use std::sync::Arc;

use crate::{
    ServerError, ai, auth, categories, configurations, dashboard, entries, health,
};
use assistant::Assistant;
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub assistant: Arc<Assistant>,
}

/// Bearer token of the request, available to handlers behind [`require_session`].
#[derive(Clone, Debug)]
pub(crate) struct SessionToken(pub String);

/// Resolve `Authorization: Bearer <token>` to a user before any body is read.
async fn require_session(
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(Authorization(bearer)) = request.headers().typed_get::<Authorization<Bearer>>()
    else {
        return Err(ServerError::Unauthorized(
            "missing bearer token".to_string(),
        ));
    };
    let token = bearer.token().to_string();
    if token.is_empty() {
        return Err(ServerError::Unauthorized(
            "missing bearer token".to_string(),
        ));
    }

    let user = state.engine.authenticate(&token, Utc::now()).await?;
    tracing::debug!(user_id = %user.id, path = %request.uri().path(), "authenticated request");

    request.extensions_mut().insert(user);
    request.extensions_mut().insert(SessionToken(token));
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/lancamentos", get(entries::list).post(entries::create))
        .route("/api/lancamentos/lote", post(entries::create_batch))
        .route("/api/lancamentos/copiar", post(entries::copy_month))
        .route(
            "/api/lancamentos/{id}",
            get(entries::get).put(entries::update).delete(entries::delete),
        )
        .route("/api/lancamentos/{id}/concluido", patch(entries::set_completed))
        .route(
            "/api/categorias",
            get(categories::list).post(categories::create),
        )
        .route(
            "/api/categorias/{id}",
            put(categories::update).delete(categories::delete),
        )
        .route("/api/configuracoes", get(configurations::list))
        .route(
            "/api/configuracoes/{chave}",
            get(configurations::get).put(configurations::update),
        )
        .route("/api/dashboard", get(dashboard::get))
        .route("/api/ai/parse-lancamentos", post(ai::parse_entries))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .route("/health", get(health::get))
        .route("/api/auth/registro", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .merge(protected)
        .with_state(state)
}

pub async fn run(engine: Engine, assistant: Assistant, addr: &str) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    run_with_listener(engine, assistant, listener).await
}

pub async fn run_with_listener(
    engine: Engine,
    assistant: Assistant,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        assistant: Arc::new(assistant),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    assistant: Assistant,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, assistant, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
