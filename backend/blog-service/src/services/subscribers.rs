/// Subscriber service - newsletter subscriptions
///
/// Duplicate detection relies on the unique index on `subscribers.email`;
/// the unique-violation error from the insert is the Conflict signal, so
/// there is no check-then-insert race.
use crate::error::{is_unique_violation, AppError, Result};
use crate::models::Subscriber;
use crate::validators::{normalize_email, validate_email};
use sqlx::{PgPool, Row};

const SUBSCRIBER_COLUMNS: &str = "id, email, is_active, subscribed_at";

/// Subscriber counts for the newsletter stats endpoint
#[derive(Debug, Clone, Copy)]
pub struct SubscriberStats {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
}

pub struct SubscriberService {
    pool: PgPool,
}

impl SubscriberService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Subscribe an email address
    pub async fn subscribe(&self, email: &str) -> Result<Subscriber> {
        let email = normalize_email(email);
        if !validate_email(&email) {
            return Err(AppError::InvalidInput("Valid email is required".to_string()));
        }

        let subscriber = sqlx::query_as::<_, Subscriber>(&format!(
            "INSERT INTO subscribers (email) VALUES ($1) RETURNING {}",
            SUBSCRIBER_COLUMNS
        ))
        .bind(&email)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                AppError::Conflict("Email already subscribed".to_string())
            } else {
                AppError::from(err)
            }
        })?;

        tracing::info!(subscriber_id = %subscriber.id, "new newsletter subscriber");
        Ok(subscriber)
    }

    /// All subscribers, newest first
    pub async fn list_all(&self) -> Result<Vec<Subscriber>> {
        let subscribers = sqlx::query_as::<_, Subscriber>(&format!(
            "SELECT {} FROM subscribers ORDER BY subscribed_at DESC",
            SUBSCRIBER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(subscribers)
    }

    /// Active subscribers only (newsletter recipients)
    pub async fn list_active(&self) -> Result<Vec<Subscriber>> {
        let subscribers = sqlx::query_as::<_, Subscriber>(&format!(
            "SELECT {} FROM subscribers WHERE is_active = TRUE ORDER BY subscribed_at DESC",
            SUBSCRIBER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(subscribers)
    }

    /// Total/active/inactive counts
    pub async fn stats(&self) -> Result<SubscriberStats> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total, COUNT(*) FILTER (WHERE is_active) AS active FROM subscribers",
        )
        .fetch_one(&self.pool)
        .await?;

        let total: i64 = row.get("total");
        let active: i64 = row.get("active");

        Ok(SubscriberStats {
            total,
            active,
            inactive: total - active,
        })
    }
}
