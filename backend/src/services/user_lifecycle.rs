//! Account state transitions performed by administrators.
//!
//! Every transition is refused when the administrator targets their own
//! account, before any statement runs. Deletion is a single transaction that
//! releases the user's alerts, applies the activity-log retention policy,
//! removes the row and records who did it.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use utoipa::ToSchema;

use crate::config::LogRetentionPolicy;
use crate::error::AppError;
use crate::models::activity_log::actions;
use crate::models::session::Session;
use crate::models::user::{User, UserRole};
use crate::repositories::{
    activity_log as activity_repo, alert as alert_repo, session as session_repo,
    transaction::{begin_transaction, commit_transaction, rollback_transaction},
    user as user_repo,
};
use crate::types::UserId;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("No puede {0} su propia cuenta")]
    SelfTarget(&'static str),
    #[error("Usuario no encontrado")]
    NotFound,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("No se pudo completar la transacción")]
    Transaction(AppError),
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::SelfTarget(_) => AppError::BadRequest(err.to_string()),
            LifecycleError::NotFound => AppError::NotFound(err.to_string()),
            LifecycleError::Database(db) => db.into(),
            LifecycleError::Transaction(app) => app,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeletionSummary {
    pub released_alerts: u64,
    pub affected_log_rows: u64,
}

pub struct UserLifecycle<'a> {
    pool: &'a PgPool,
    log_policy: LogRetentionPolicy,
}

impl<'a> UserLifecycle<'a> {
    pub fn new(pool: &'a PgPool, log_policy: LogRetentionPolicy) -> Self {
        Self { pool, log_policy }
    }

    pub async fn deactivate(
        &self,
        actor: &Session,
        target: UserId,
        ip: Option<&str>,
    ) -> Result<User, LifecycleError> {
        self.set_active(actor, target, false, ip).await
    }

    pub async fn activate(
        &self,
        actor: &Session,
        target: UserId,
        ip: Option<&str>,
    ) -> Result<User, LifecycleError> {
        self.set_active(actor, target, true, ip).await
    }

    async fn set_active(
        &self,
        actor: &Session,
        target: UserId,
        active: bool,
        ip: Option<&str>,
    ) -> Result<User, LifecycleError> {
        let verb = if active { "activar" } else { "desactivar" };
        ensure_not_self(actor, target, verb)?;
        let mut user = self.load_target(target).await?;

        if user_repo::set_user_active(self.pool, target, active).await? == 0 {
            return Err(LifecycleError::NotFound);
        }
        if !active {
            let revoked = session_repo::delete_sessions_for_user(self.pool, target).await?;
            tracing::debug!(user_id = %target, revoked, "Revoked sessions of deactivated user");
        }

        let (action, description) = if active {
            (actions::USER_ACTIVATED, format!("Activó la cuenta de {}", user.email))
        } else {
            (actions::USER_DEACTIVATED, format!("Desactivó la cuenta de {}", user.email))
        };
        activity_repo::insert_activity_log(self.pool, actor.user_id, action, &description, ip)
            .await?;

        tracing::info!(actor = %actor.user_id, target = %target, active, "User activation changed");
        user.active = active;
        Ok(user)
    }

    pub async fn change_role(
        &self,
        actor: &Session,
        target: UserId,
        role: UserRole,
        ip: Option<&str>,
    ) -> Result<User, LifecycleError> {
        ensure_not_self(actor, target, "cambiar el rol de")?;
        let mut user = self.load_target(target).await?;

        if user_repo::set_user_role(self.pool, target, role).await? == 0 {
            return Err(LifecycleError::NotFound);
        }

        let description = format!(
            "Cambió el rol de {} de {} a {}",
            user.email,
            user.role.as_str(),
            role.as_str()
        );
        activity_repo::insert_activity_log(
            self.pool,
            actor.user_id,
            actions::USER_ROLE_CHANGED,
            &description,
            ip,
        )
        .await?;

        user.role = role;
        Ok(user)
    }

    pub async fn delete(
        &self,
        actor: &Session,
        target: UserId,
        ip: Option<&str>,
    ) -> Result<DeletionSummary, LifecycleError> {
        ensure_not_self(actor, target, "eliminar")?;
        let user = self.load_target(target).await?;

        let mut tx = begin_transaction(self.pool)
            .await
            .map_err(LifecycleError::Transaction)?;

        let released_alerts = alert_repo::release_alerts_for_user(&mut *tx, target).await?;

        let affected_log_rows = match self.log_policy {
            LogRetentionPolicy::Annotate => {
                activity_repo::annotate_deleted_user(&mut *tx, target).await?
            }
            LogRetentionPolicy::Purge => activity_repo::purge_user_activity(&mut *tx, target).await?,
        };

        let deleted = user_repo::delete_user(&mut *tx, target).await?;
        if deleted != 1 {
            rollback_transaction(tx)
                .await
                .map_err(LifecycleError::Transaction)?;
            return Err(LifecycleError::NotFound);
        }

        activity_repo::insert_activity_log(
            &mut *tx,
            actor.user_id,
            actions::USER_DELETED,
            &format!("Eliminó la cuenta de {}", user.email),
            ip,
        )
        .await?;

        commit_transaction(tx)
            .await
            .map_err(LifecycleError::Transaction)?;

        tracing::info!(
            actor = %actor.user_id,
            target = %target,
            released_alerts,
            affected_log_rows,
            "User deleted"
        );
        Ok(DeletionSummary {
            released_alerts,
            affected_log_rows,
        })
    }

    async fn load_target(&self, target: UserId) -> Result<User, LifecycleError> {
        user_repo::find_user_by_id(self.pool, target)
            .await?
            .ok_or(LifecycleError::NotFound)
    }
}

fn ensure_not_self(actor: &Session, target: UserId, verb: &'static str) -> Result<(), LifecycleError> {
    if actor.user_id == target {
        return Err(LifecycleError::SelfTarget(verb));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin_session() -> Session {
        let user = User::new(
            "Admin".into(),
            "admin@figgerenergy.gov.co".into(),
            "hash".into(),
            UserRole::Admin,
            true,
        );
        Session::from_user(&user, "jti")
    }

    #[test]
    fn self_target_is_rejected_with_message() {
        let actor = admin_session();
        let err = ensure_not_self(&actor, actor.user_id, "eliminar").unwrap_err();
        assert_eq!(err.to_string(), "No puede eliminar su propia cuenta");
        assert!(ensure_not_self(&actor, UserId::new(), "eliminar").is_ok());
    }

    #[test]
    fn lifecycle_errors_map_to_http_errors() {
        let err: AppError = LifecycleError::SelfTarget("desactivar").into();
        assert!(matches!(err, AppError::BadRequest(_)));
        let err: AppError = LifecycleError::NotFound.into();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
