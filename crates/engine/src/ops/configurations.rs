use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    ConfigValue, Configuration, EngineError, ResultEngine,
    configurations::{self, default_configurations, encode_value},
};

use super::Engine;

impl Engine {
    pub async fn list_configurations(&self, user_id: Uuid) -> ResultEngine<Vec<Configuration>> {
        configurations::Entity::find()
            .filter(configurations::Column::UserId.eq(user_id.to_string()))
            .order_by_asc(configurations::Column::Key)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Configuration::try_from)
            .collect()
    }

    pub async fn configuration(&self, user_id: Uuid, key: &str) -> ResultEngine<Configuration> {
        let model = require_configuration(&self.database, user_id, key).await?;
        Configuration::try_from(model)
    }

    /// Overwrites the value of an existing key. Unknown keys are an error,
    /// never an implicit insert.
    pub async fn update_configuration(
        &self,
        user_id: Uuid,
        key: &str,
        value: ConfigValue,
        now: DateTime<Utc>,
    ) -> ResultEngine<Configuration> {
        let model = require_configuration(&self.database, user_id, key).await?;

        let mut active: configurations::ActiveModel = model.into();
        active.value = ActiveValue::Set(encode_value(&value));
        active.updated_at = ActiveValue::Set(now);
        let model = active.update(&self.database).await?;

        tracing::debug!(%key, "configuration updated");
        Configuration::try_from(model)
    }
}

async fn require_configuration<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    key: &str,
) -> ResultEngine<configurations::Model> {
    configurations::Entity::find()
        .filter(configurations::Column::UserId.eq(user_id.to_string()))
        .filter(configurations::Column::Key.eq(key))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("configuration '{key}'")))
}

/// Inserts the default keys the user does not have yet.
pub(super) async fn ensure_default_configurations<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> ResultEngine<()> {
    let existing: Vec<String> = configurations::Entity::find()
        .filter(configurations::Column::UserId.eq(user_id.to_string()))
        .all(db)
        .await?
        .into_iter()
        .map(|model| model.key)
        .collect();

    for (key, value) in default_configurations() {
        if existing.iter().any(|k| k == key) {
            continue;
        }
        configurations::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            user_id: ActiveValue::Set(user_id.to_string()),
            key: ActiveValue::Set(key.to_string()),
            value: ActiveValue::Set(encode_value(&value)),
            updated_at: ActiveValue::Set(now),
        }
        .insert(db)
        .await?;
    }
    Ok(())
}
