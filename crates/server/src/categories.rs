//! Category endpoints

use api_types::category::{
    CategoryListResponse, CategoryNew, CategoryQuery, CategoryUpdate, CategoryView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Category, CategoryChanges, CategoryDraft, User};

use crate::{
    ServerError,
    entries::{map_kind, map_kind_back},
    extract::{ValidJson, ValidQuery, parse_id},
    server::ServerState,
};

fn view(category: Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        kind: map_kind_back(category.kind),
        icon: category.icon,
        color: category.color,
        order: category.order,
        is_default: category.is_default,
    }
}

/// Default categories followed by the user's own.
pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ValidQuery(query): ValidQuery<CategoryQuery>,
) -> Result<Json<CategoryListResponse>, ServerError> {
    let categories = state
        .engine
        .list_categories(user.id, query.kind.map(map_kind))
        .await?;

    Ok(Json(CategoryListResponse {
        categories: categories.into_iter().map(view).collect(),
    }))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ValidJson(payload): ValidJson<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let category = state
        .engine
        .create_category(
            user.id,
            CategoryDraft {
                name: payload.name,
                kind: map_kind(payload.kind),
                icon: payload.icon,
                color: payload.color,
                order: payload.order,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(view(category))))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    ValidJson(payload): ValidJson<CategoryUpdate>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state
        .engine
        .update_category(
            user.id,
            parse_id(&id)?,
            CategoryChanges {
                name: payload.name,
                icon: payload.icon,
                color: payload.color,
                order: payload.order,
            },
        )
        .await?;

    Ok(Json(view(category)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_category(user.id, parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
