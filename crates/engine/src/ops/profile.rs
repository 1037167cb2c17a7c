use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, SqlErr, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ProfileUpdate, ResultEngine, User, users, util::normalize_text,
    validation::validate_profile_update,
};

use super::{Engine, with_tx};

impl Engine {
    /// Return the profile of `user_id`.
    pub async fn profile(&self, user_id: Uuid) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, user_id).await?;
            User::try_from(model)
        })
    }

    /// Update name, email or date of birth. Emails are unique across users.
    pub async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> ResultEngine<User> {
        validate_profile_update(&update, Utc::now().date_naive())?;

        let _lock = self.locks.lock(user_id).await;
        let user = with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, user_id).await?;
            if update.name.is_none() && update.email.is_none() && update.date_of_birth.is_none() {
                return User::try_from(model);
            }
            let mut active: users::ActiveModel = model.into();

            if let Some(name) = update.name.as_deref() {
                active.name = ActiveValue::Set(normalize_text(name));
            }
            if let Some(email) = update.email.as_deref() {
                let email = email.trim().to_lowercase();
                let taken = users::Entity::find()
                    .filter(users::Column::Email.eq(email.clone()))
                    .filter(users::Column::Id.ne(user_id.to_string()))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if taken {
                    return Err(email_in_use());
                }
                active.email = ActiveValue::Set(email);
            }
            if let Some(date_of_birth) = update.date_of_birth {
                active.date_of_birth = ActiveValue::Set(Some(date_of_birth));
            }

            let model = active.update(&db_tx).await.map_err(unique_email)?;
            User::try_from(model)
        })?;

        tracing::info!(%user_id, "profile updated");
        Ok(user)
    }
}

fn email_in_use() -> EngineError {
    EngineError::Validation(vec!["email is already in use".to_string()])
}

/// Another user can claim the email between the lookup and the write; the
/// unique index then rejects the update.
fn unique_email(err: DbErr) -> EngineError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => email_in_use(),
        _ => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{ConnectionTrait, Database};

    use super::*;

    #[tokio::test]
    async fn unique_violation_becomes_email_in_use() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.execute_unprepared("CREATE TABLE people (email TEXT NOT NULL UNIQUE)")
            .await
            .unwrap();
        db.execute_unprepared("INSERT INTO people (email) VALUES ('ana@example.com')")
            .await
            .unwrap();
        let Err(err) = db
            .execute_unprepared("INSERT INTO people (email) VALUES ('ana@example.com')")
            .await
        else {
            panic!("duplicate email accepted");
        };

        assert_eq!(unique_email(err), email_in_use());
    }

    #[test]
    fn other_database_errors_pass_through() {
        let err = unique_email(DbErr::Custom("disk on fire".to_string()));
        assert!(matches!(err, EngineError::Database(_)));
    }
}
