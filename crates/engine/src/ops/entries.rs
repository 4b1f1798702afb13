use chrono::{DateTime, Datelike, Utc};
use sea_orm::{
    ActiveValue, Condition, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, Entry, EntryChanges, EntryDraft, EntryFilter, EntryKind, MAX_ENTRY_NAME, Money,
    Month, ResultEngine, categories, entries,
    util::normalize_required_name,
};

use super::{Engine, with_tx};

impl Engine {
    /// Entries of the user, ordered by month then creation time.
    pub async fn list_entries(
        &self,
        user_id: Uuid,
        filter: EntryFilter,
    ) -> ResultEngine<Vec<Entry>> {
        let mut query =
            entries::Entity::find().filter(entries::Column::UserId.eq(user_id.to_string()));
        if let Some(month) = filter.month {
            query = query.filter(entries::Column::Month.eq(month.to_string()));
        }
        if let Some(kind) = filter.kind {
            query = query.filter(entries::Column::Kind.eq(kind.as_str()));
        }
        if let Some(completed) = filter.completed {
            query = query.filter(entries::Column::Completed.eq(completed));
        }

        query
            .order_by_asc(entries::Column::Month)
            .order_by_asc(entries::Column::CreatedAt)
            .order_by_asc(entries::Column::Name)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Entry::try_from)
            .collect()
    }

    pub async fn entry(&self, user_id: Uuid, entry_id: Uuid) -> ResultEngine<Entry> {
        let model = require_entry(&self.database, user_id, entry_id).await?;
        Entry::try_from(model)
    }

    pub async fn create_entry(
        &self,
        user_id: Uuid,
        draft: EntryDraft,
        now: DateTime<Utc>,
    ) -> ResultEngine<Entry> {
        let entry = new_entry(user_id, draft, now)?;
        if let Some(category_id) = entry.category_id {
            check_category(&self.database, user_id, category_id, entry.kind).await?;
        }
        entries::ActiveModel::from(&entry)
            .insert(&self.database)
            .await?;
        tracing::debug!(entry_id = %entry.id, month = %entry.month, "entry created");
        Ok(entry)
    }

    /// Creates all the entries or none of them.
    pub async fn create_entries(
        &self,
        user_id: Uuid,
        drafts: Vec<EntryDraft>,
        now: DateTime<Utc>,
    ) -> ResultEngine<Vec<Entry>> {
        let entries = drafts
            .into_iter()
            .map(|draft| new_entry(user_id, draft, now))
            .collect::<ResultEngine<Vec<_>>>()?;

        with_tx!(self, |db_tx| {
            for entry in &entries {
                if let Some(category_id) = entry.category_id {
                    check_category(&db_tx, user_id, category_id, entry.kind).await?;
                }
                entries::ActiveModel::from(entry).insert(&db_tx).await?;
            }
            tracing::debug!(count = entries.len(), "entries created");
            Ok(entries)
        })
    }

    pub async fn update_entry(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        changes: EntryChanges,
        now: DateTime<Utc>,
    ) -> ResultEngine<Entry> {
        let model = require_entry(&self.database, user_id, entry_id).await?;
        let current = Entry::try_from(model.clone())?;

        let kind = changes.kind.unwrap_or(current.kind);
        let category_id = changes.category_id.unwrap_or(current.category_id);
        if let Some(category_id) = category_id {
            check_category(&self.database, user_id, category_id, kind).await?;
        }

        let mut active: entries::ActiveModel = model.into();
        if let Some(kind) = changes.kind {
            active.kind = ActiveValue::Set(kind.as_str().to_string());
        }
        if let Some(name) = changes.name {
            active.name =
                ActiveValue::Set(normalize_required_name(&name, "entry", MAX_ENTRY_NAME)?);
        }
        if let Some(amount) = changes.amount {
            active.amount_minor = ActiveValue::Set(require_positive(amount)?.cents());
        }
        if let Some(month) = changes.month {
            active.month = ActiveValue::Set(month.to_string());
        }
        if let Some(completed) = changes.completed {
            active.completed = ActiveValue::Set(completed);
        }
        if let Some(expected_date) = changes.expected_date {
            active.expected_date = ActiveValue::Set(expected_date);
        }
        if changes.category_id.is_some() {
            active.category_id = ActiveValue::Set(category_id.map(|id| id.to_string()));
        }
        active.updated_at = ActiveValue::Set(now);

        let model = active.update(&self.database).await?;
        Entry::try_from(model)
    }

    pub async fn set_entry_completed(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        completed: bool,
        now: DateTime<Utc>,
    ) -> ResultEngine<Entry> {
        self.update_entry(
            user_id,
            entry_id,
            EntryChanges {
                completed: Some(completed),
                ..Default::default()
            },
            now,
        )
        .await
    }

    pub async fn delete_entry(&self, user_id: Uuid, entry_id: Uuid) -> ResultEngine<()> {
        let model = require_entry(&self.database, user_id, entry_id).await?;
        entries::Entity::delete_by_id(model.id)
            .exec(&self.database)
            .await?;
        tracing::debug!(%entry_id, "entry deleted");
        Ok(())
    }

    /// Duplicates every entry of `from` into `to` as pending entries.
    ///
    /// Expected dates keep their day of month; a day that does not exist in
    /// the target month (e.g. 31 in April) is dropped.
    pub async fn copy_month(
        &self,
        user_id: Uuid,
        from: Month,
        to: Month,
        now: DateTime<Utc>,
    ) -> ResultEngine<Vec<Entry>> {
        if from == to {
            return Err(EngineError::InvalidMonth(
                "source and target months must differ".to_string(),
            ));
        }

        let sources = self
            .list_entries(
                user_id,
                EntryFilter {
                    month: Some(from),
                    ..Default::default()
                },
            )
            .await?;

        let copies: Vec<Entry> = sources
            .into_iter()
            .map(|source| Entry {
                id: Uuid::new_v4(),
                month: to,
                completed: false,
                expected_date: source.expected_date.and_then(|date| to.day(date.day())),
                created_at: now,
                updated_at: now,
                ..source
            })
            .collect();

        with_tx!(self, |db_tx| {
            for entry in &copies {
                entries::ActiveModel::from(entry).insert(&db_tx).await?;
            }
            tracing::info!(%from, %to, count = copies.len(), "month copied");
            Ok(copies)
        })
    }
}

fn require_positive(amount: Money) -> ResultEngine<Money> {
    if !amount.is_positive() {
        return Err(EngineError::InvalidAmount(
            "amount must be greater than zero".to_string(),
        ));
    }
    Ok(amount)
}

fn new_entry(user_id: Uuid, draft: EntryDraft, now: DateTime<Utc>) -> ResultEngine<Entry> {
    Ok(Entry {
        id: Uuid::new_v4(),
        user_id,
        kind: draft.kind,
        name: normalize_required_name(&draft.name, "entry", MAX_ENTRY_NAME)?,
        amount: require_positive(draft.amount)?,
        month: draft.month,
        completed: draft.completed,
        expected_date: draft.expected_date,
        category_id: draft.category_id,
        created_at: now,
        updated_at: now,
    })
}

async fn require_entry<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    entry_id: Uuid,
) -> ResultEngine<entries::Model> {
    entries::Entity::find_by_id(entry_id.to_string())
        .filter(entries::Column::UserId.eq(user_id.to_string()))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("entry '{entry_id}'")))
}

/// The category must be a default or belong to the user, and share the
/// entry's kind.
async fn check_category<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    category_id: Uuid,
    kind: EntryKind,
) -> ResultEngine<()> {
    let category = categories::Entity::find_by_id(category_id.to_string())
        .filter(
            Condition::any()
                .add(categories::Column::UserId.eq(user_id.to_string()))
                .add(categories::Column::UserId.is_null()),
        )
        .one(db)
        .await?
        .ok_or_else(|| {
            EngineError::InvalidCategory(format!("category '{category_id}' not found"))
        })?;

    if category.kind != kind.as_str() {
        return Err(EngineError::InvalidCategory(format!(
            "category '{}' is for {} entries",
            category.name, category.kind
        )));
    }
    Ok(())
}
