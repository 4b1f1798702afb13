//! Entry ("lançamento") endpoints

use api_types::{
    Amount, EntryKind as ApiKind,
    entry::{
        EntryBatch, EntryCompleted, EntryListResponse, EntryNew, EntryQuery, EntryUpdate,
        EntryView, MonthCopied, MonthCopy,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{NaiveDate, Utc};
use engine::{Entry, EntryChanges, EntryDraft, EntryFilter, EntryKind, Money, Month, User};

use crate::{
    ServerError,
    extract::{ValidJson, ValidQuery, parse_id},
    server::ServerState,
};

pub(crate) fn map_kind(kind: ApiKind) -> EntryKind {
    match kind {
        ApiKind::Income => EntryKind::Income,
        ApiKind::Expense => EntryKind::Expense,
    }
}

pub(crate) fn map_kind_back(kind: EntryKind) -> ApiKind {
    match kind {
        EntryKind::Income => ApiKind::Income,
        EntryKind::Expense => ApiKind::Expense,
    }
}

pub(crate) fn parse_month(value: &str) -> Result<Month, ServerError> {
    Ok(value.parse::<Month>()?)
}

fn parse_amount(amount: &Amount) -> Result<Money, ServerError> {
    Ok(Money::parse_positive(amount.as_str())?)
}

fn parse_date(value: &str) -> Result<NaiveDate, ServerError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ServerError::Validation(format!("invalid date '{value}'")))
}

fn draft(payload: EntryNew) -> Result<EntryDraft, ServerError> {
    Ok(EntryDraft {
        kind: map_kind(payload.kind),
        amount: parse_amount(&payload.amount)?,
        month: parse_month(&payload.month)?,
        completed: payload.completed.unwrap_or(false),
        expected_date: payload.expected_date.as_deref().map(parse_date).transpose()?,
        category_id: payload.category_id,
        name: payload.name,
    })
}

fn view(entry: Entry) -> EntryView {
    EntryView {
        id: entry.id,
        kind: map_kind_back(entry.kind),
        name: entry.name,
        amount: Amount::new(entry.amount.to_string()),
        month: entry.month.to_string(),
        completed: entry.completed,
        expected_date: entry.expected_date,
        category_id: entry.category_id,
        created_at: entry.created_at,
        updated_at: entry.updated_at,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ValidQuery(query): ValidQuery<EntryQuery>,
) -> Result<Json<EntryListResponse>, ServerError> {
    let filter = EntryFilter {
        month: query.month.as_deref().map(parse_month).transpose()?,
        kind: query.kind.map(map_kind),
        completed: query.completed,
    };
    let entries = state.engine.list_entries(user.id, filter).await?;

    Ok(Json(EntryListResponse {
        entries: entries.into_iter().map(view).collect(),
    }))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ValidJson(payload): ValidJson<EntryNew>,
) -> Result<(StatusCode, Json<EntryView>), ServerError> {
    let entry = state
        .engine
        .create_entry(user.id, draft(payload)?, Utc::now())
        .await?;

    Ok((StatusCode::CREATED, Json(view(entry))))
}

/// Create every entry of the batch in one transaction.
pub async fn create_batch(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ValidJson(payload): ValidJson<EntryBatch>,
) -> Result<(StatusCode, Json<EntryListResponse>), ServerError> {
    let drafts = payload
        .entries
        .into_iter()
        .map(draft)
        .collect::<Result<Vec<_>, _>>()?;
    let entries = state
        .engine
        .create_entries(user.id, drafts, Utc::now())
        .await?;
    tracing::info!(user_id = %user.id, count = entries.len(), "entry batch created");

    Ok((
        StatusCode::CREATED,
        Json(EntryListResponse {
            entries: entries.into_iter().map(view).collect(),
        }),
    ))
}

pub async fn copy_month(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ValidJson(payload): ValidJson<MonthCopy>,
) -> Result<Json<MonthCopied>, ServerError> {
    let copies = state
        .engine
        .copy_month(
            user.id,
            parse_month(&payload.from)?,
            parse_month(&payload.to)?,
            Utc::now(),
        )
        .await?;

    Ok(Json(MonthCopied {
        copied: copies.len(),
    }))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<EntryView>, ServerError> {
    let entry = state.engine.entry(user.id, parse_id(&id)?).await?;
    Ok(Json(view(entry)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    ValidJson(payload): ValidJson<EntryUpdate>,
) -> Result<Json<EntryView>, ServerError> {
    let changes = EntryChanges {
        kind: payload.kind.map(map_kind),
        name: payload.name,
        amount: payload.amount.as_ref().map(parse_amount).transpose()?,
        month: payload.month.as_deref().map(parse_month).transpose()?,
        completed: payload.completed,
        expected_date: payload
            .expected_date
            .map(|date| date.as_deref().map(parse_date).transpose())
            .transpose()?,
        category_id: payload.category_id,
    };
    let entry = state
        .engine
        .update_entry(user.id, parse_id(&id)?, changes, Utc::now())
        .await?;

    Ok(Json(view(entry)))
}

pub async fn set_completed(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    ValidJson(payload): ValidJson<EntryCompleted>,
) -> Result<Json<EntryView>, ServerError> {
    let entry = state
        .engine
        .set_entry_completed(user.id, parse_id(&id)?, payload.completed, Utc::now())
        .await?;
    Ok(Json(view(entry)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_entry(user.id, parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
