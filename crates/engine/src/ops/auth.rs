use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Session, User,
    sessions::{self, generate_token},
    users::{self, hash_password, verify_password},
    util::{normalize_email, normalize_required_name},
};

use super::{Engine, configurations::ensure_default_configurations, with_tx};

const MAX_USER_NAME: usize = 80;

impl Engine {
    /// Creates the account together with its default configurations.
    pub async fn register_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<User> {
        let name = normalize_required_name(name, "user", MAX_USER_NAME)?;
        let email = normalize_email(email);
        if self.user_by_email(&email).await?.is_some() {
            return Err(EngineError::ExistingKey(format!("user '{email}'")));
        }
        let password_hash = hash_password(password)?;

        with_tx!(self, |db_tx| {
            let model = users::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                name: ActiveValue::Set(name),
                email: ActiveValue::Set(email),
                password_hash: ActiveValue::Set(password_hash),
                created_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            let user = User::try_from(model)?;
            ensure_default_configurations(&db_tx, user.id, now).await?;
            tracing::info!(user_id = %user.id, "user registered");
            Ok(user)
        })
    }

    /// Checks the credentials and opens a new session.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<(User, Session)> {
        let email = normalize_email(email);
        let Some(model) = users::Entity::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .one(&self.database)
            .await?
        else {
            return Err(invalid_credentials());
        };
        if !verify_password(password, &model.password_hash)? {
            tracing::debug!(%email, "wrong password");
            return Err(invalid_credentials());
        }

        let user = User::try_from(model)?;
        let session = self.create_session(user.id, now).await?;
        Ok((user, session))
    }

    pub async fn create_session(&self, user_id: Uuid, now: DateTime<Utc>) -> ResultEngine<Session> {
        let expires_at = now.checked_add_signed(self.session_ttl).ok_or_else(|| {
            EngineError::InvalidConfig(format!("session ttl out of range: {}", self.session_ttl))
        })?;
        let model = sessions::ActiveModel {
            token: ActiveValue::Set(generate_token()),
            user_id: ActiveValue::Set(user_id.to_string()),
            created_at: ActiveValue::Set(now),
            expires_at: ActiveValue::Set(expires_at),
        }
        .insert(&self.database)
        .await?;
        Session::try_from(model)
    }

    /// Resolves a bearer token to its user. Expired sessions are removed on sight.
    pub async fn authenticate(&self, token: &str, now: DateTime<Utc>) -> ResultEngine<User> {
        let Some(model) = sessions::Entity::find_by_id(token.to_string())
            .one(&self.database)
            .await?
        else {
            return Err(EngineError::Unauthorized("unknown session".to_string()));
        };
        let session = Session::try_from(model)?;
        if session.is_expired(now) {
            sessions::Entity::delete_by_id(session.token)
                .exec(&self.database)
                .await?;
            return Err(EngineError::Unauthorized("session expired".to_string()));
        }

        users::Entity::find_by_id(session.user_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::Unauthorized("unknown user".to_string()))
            .and_then(User::try_from)
    }

    /// Ends the session. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) -> ResultEngine<()> {
        sessions::Entity::delete_by_id(token.to_string())
            .exec(&self.database)
            .await?;
        Ok(())
    }

    /// Drops every session of the user, returning how many were removed.
    pub async fn revoke_sessions(&self, user_id: Uuid) -> ResultEngine<u64> {
        let result = sessions::Entity::delete_many()
            .filter(sessions::Column::UserId.eq(user_id.to_string()))
            .exec(&self.database)
            .await?;
        tracing::info!(%user_id, count = result.rows_affected, "sessions revoked");
        Ok(result.rows_affected)
    }

    pub async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> ResultEngine<u64> {
        let result = sessions::Entity::delete_many()
            .filter(sessions::Column::ExpiresAt.lte(now))
            .exec(&self.database)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn user_by_email(&self, email: &str) -> ResultEngine<Option<User>> {
        users::Entity::find()
            .filter(users::Column::Email.eq(normalize_email(email)))
            .one(&self.database)
            .await?
            .map(User::try_from)
            .transpose()
    }
}

fn invalid_credentials() -> EngineError {
    EngineError::Unauthorized("invalid credentials".to_string())
}
