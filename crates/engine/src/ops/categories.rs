use sea_orm::{
    ActiveValue, Condition, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait,
    sea_query::Expr, prelude::*,
};
use uuid::Uuid;

use crate::{
    Category, CategoryChanges, CategoryDraft, EngineError, EntryKind, MAX_CATEGORY_NAME,
    ResultEngine, categories, entries,
    util::{normalize_optional_text, normalize_required_name},
};

use super::{Engine, with_tx};

fn visible_to(user_id: Uuid) -> Condition {
    Condition::any()
        .add(categories::Column::UserId.eq(user_id.to_string()))
        .add(categories::Column::UserId.is_null())
}

impl Engine {
    /// Default categories plus the user's own, ordered by `order` then name.
    pub async fn list_categories(
        &self,
        user_id: Uuid,
        kind: Option<EntryKind>,
    ) -> ResultEngine<Vec<Category>> {
        let mut query = categories::Entity::find().filter(visible_to(user_id));
        if let Some(kind) = kind {
            query = query.filter(categories::Column::Kind.eq(kind.as_str()));
        }
        query
            .order_by_asc(categories::Column::SortOrder)
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Category::try_from)
            .collect()
    }

    pub async fn create_category(
        &self,
        user_id: Uuid,
        draft: CategoryDraft,
    ) -> ResultEngine<Category> {
        let name = normalize_required_name(&draft.name, "category", MAX_CATEGORY_NAME)?;
        ensure_unique_name(&self.database, user_id, draft.kind, &name, None).await?;

        let order = match draft.order {
            Some(order) => order,
            None => next_order(&self.database, user_id, draft.kind).await?,
        };

        let category = Category {
            id: Uuid::new_v4(),
            user_id: Some(user_id),
            name,
            kind: draft.kind,
            icon: normalize_optional_text(draft.icon.as_deref()),
            color: normalize_optional_text(draft.color.as_deref()),
            order,
            is_default: false,
        };
        categories::ActiveModel::from(&category)
            .insert(&self.database)
            .await?;
        tracing::debug!(category_id = %category.id, "category created");
        Ok(category)
    }

    /// Only the user's own categories can change; defaults read as not found.
    pub async fn update_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        changes: CategoryChanges,
    ) -> ResultEngine<Category> {
        let model = require_own_category(&self.database, user_id, category_id).await?;
        let kind = EntryKind::try_from(model.kind.as_str())?;

        let mut active: categories::ActiveModel = model.into();
        if let Some(name) = changes.name {
            let name = normalize_required_name(&name, "category", MAX_CATEGORY_NAME)?;
            ensure_unique_name(&self.database, user_id, kind, &name, Some(category_id)).await?;
            active.name = ActiveValue::Set(name);
        }
        if let Some(icon) = changes.icon {
            active.icon = ActiveValue::Set(normalize_optional_text(icon.as_deref()));
        }
        if let Some(color) = changes.color {
            active.color = ActiveValue::Set(normalize_optional_text(color.as_deref()));
        }
        if let Some(order) = changes.order {
            active.sort_order = ActiveValue::Set(order);
        }

        let model = active.update(&self.database).await?;
        Category::try_from(model)
    }

    /// Deletes one of the user's categories; entries pointing at it become
    /// uncategorized.
    pub async fn delete_category(&self, user_id: Uuid, category_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = require_own_category(&db_tx, user_id, category_id).await?;
            let cleared = entries::Entity::update_many()
                .col_expr(
                    entries::Column::CategoryId,
                    Expr::value(Option::<String>::None),
                )
                .filter(entries::Column::UserId.eq(user_id.to_string()))
                .filter(entries::Column::CategoryId.eq(model.id.clone()))
                .exec(&db_tx)
                .await?;
            categories::Entity::delete_by_id(model.id)
                .exec(&db_tx)
                .await?;
            tracing::debug!(
                %category_id,
                cleared = cleared.rows_affected,
                "category deleted"
            );
            Ok(())
        })
    }
}

async fn require_own_category<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    category_id: Uuid,
) -> ResultEngine<categories::Model> {
    categories::Entity::find_by_id(category_id.to_string())
        .filter(categories::Column::UserId.eq(user_id.to_string()))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("category '{category_id}'")))
}

/// Names are unique (case-insensitive) among the categories a user sees for
/// one kind, defaults included.
async fn ensure_unique_name<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    kind: EntryKind,
    name: &str,
    except: Option<Uuid>,
) -> ResultEngine<()> {
    let wanted = name.to_lowercase();
    let clash = categories::Entity::find()
        .filter(visible_to(user_id))
        .filter(categories::Column::Kind.eq(kind.as_str()))
        .all(db)
        .await?
        .into_iter()
        .filter(|model| except.is_none_or(|id| model.id != id.to_string()))
        .any(|model| model.name.to_lowercase() == wanted);

    if clash {
        return Err(EngineError::ExistingKey(format!("category '{name}'")));
    }
    Ok(())
}

async fn next_order<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    kind: EntryKind,
) -> ResultEngine<i32> {
    let last = categories::Entity::find()
        .filter(visible_to(user_id))
        .filter(categories::Column::Kind.eq(kind.as_str()))
        .order_by_desc(categories::Column::SortOrder)
        .one(db)
        .await?;
    Ok(last.map_or(0, |model| model.sort_order + 1))
}
