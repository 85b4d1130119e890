//! Per-identifier login lockout backed by the `login_attempts` table.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use crate::config::Config;
use crate::error::AppError;
use crate::models::login_attempt::LoginAttempt;
use crate::repositories::login_attempt as attempt_repo;

pub const LOCKOUT_MESSAGE: &str =
    "Demasiados intentos fallidos. Espere unos minutos antes de volver a intentar.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottlePolicy {
    pub max_attempts: u32,
    pub lockout: Duration,
}

impl ThrottlePolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.login_max_attempts.max(1),
            lockout: Duration::minutes(config.login_lockout_minutes as i64),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    Allowed,
    Locked { retry_after_seconds: u64 },
}

/// Decides whether another attempt may proceed.
///
/// `attempts` must be newest first and already limited to the lockout window.
/// Only failures after the most recent success count. The lock lifts once the
/// `max_attempts`-th most recent failure leaves the window.
pub fn evaluate(
    attempts: &[LoginAttempt],
    now: DateTime<Utc>,
    policy: ThrottlePolicy,
) -> ThrottleDecision {
    let failures: Vec<&LoginAttempt> = attempts
        .iter()
        .take_while(|attempt| !attempt.succeeded)
        .filter(|attempt| now - attempt.attempted_at < policy.lockout)
        .collect();

    let max = policy.max_attempts as usize;
    if failures.len() < max {
        return ThrottleDecision::Allowed;
    }

    let unlocks_at = failures[max - 1].attempted_at + policy.lockout;
    let retry_after_seconds = (unlocks_at - now).num_seconds().max(1) as u64;
    ThrottleDecision::Locked {
        retry_after_seconds,
    }
}

#[derive(Debug, Clone)]
pub struct LoginThrottle {
    pool: PgPool,
    policy: ThrottlePolicy,
}

impl LoginThrottle {
    pub fn new(pool: PgPool, policy: ThrottlePolicy) -> Self {
        Self { pool, policy }
    }

    /// Rejects with [`AppError::TooManyRequests`] while `identifier` is locked.
    pub async fn check(&self, identifier: &str) -> Result<(), AppError> {
        let now = Utc::now();
        let attempts =
            attempt_repo::recent_login_attempts(&self.pool, identifier, now - self.policy.lockout)
                .await?;

        match evaluate(&attempts, now, self.policy) {
            ThrottleDecision::Allowed => Ok(()),
            ThrottleDecision::Locked {
                retry_after_seconds,
            } => {
                tracing::warn!(identifier, retry_after_seconds, "Login locked out");
                Err(AppError::TooManyRequests {
                    message: LOCKOUT_MESSAGE.to_string(),
                    retry_after: retry_after_seconds,
                })
            }
        }
    }

    pub async fn record(
        &self,
        identifier: &str,
        ip: Option<&str>,
        succeeded: bool,
    ) -> Result<(), AppError> {
        attempt_repo::record_login_attempt(&self.pool, identifier, ip, succeeded).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ThrottlePolicy {
        ThrottlePolicy {
            max_attempts: 3,
            lockout: Duration::minutes(15),
        }
    }

    fn attempt(minutes_ago: i64, succeeded: bool, now: DateTime<Utc>) -> LoginAttempt {
        LoginAttempt {
            identifier: "admin@figgerenergy.gov.co".into(),
            succeeded,
            attempted_at: now - Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn allows_below_the_threshold() {
        let now = Utc::now();
        let attempts = vec![attempt(1, false, now), attempt(2, false, now)];
        assert_eq!(evaluate(&attempts, now, policy()), ThrottleDecision::Allowed);
    }

    #[test]
    fn locks_after_three_failures_within_window() {
        let now = Utc::now();
        let attempts = vec![
            attempt(1, false, now),
            attempt(2, false, now),
            attempt(5, false, now),
        ];
        match evaluate(&attempts, now, policy()) {
            ThrottleDecision::Locked {
                retry_after_seconds,
            } => {
                // third most recent failure was 5 minutes ago
                assert!((590..=600).contains(&retry_after_seconds));
            }
            other => panic!("expected lock, got {other:?}"),
        }
    }

    #[test]
    fn success_resets_the_count() {
        let now = Utc::now();
        let attempts = vec![
            attempt(1, false, now),
            attempt(2, false, now),
            attempt(3, true, now),
            attempt(4, false, now),
        ];
        assert_eq!(evaluate(&attempts, now, policy()), ThrottleDecision::Allowed);
    }

    #[test]
    fn failures_outside_window_do_not_count() {
        let now = Utc::now();
        let attempts = vec![
            attempt(1, false, now),
            attempt(2, false, now),
            attempt(20, false, now),
        ];
        assert_eq!(evaluate(&attempts, now, policy()), ThrottleDecision::Allowed);
    }
}
